//! Errors raised while generating IR for units and programs.

use kiln_ir::ExprId;
use kiln_types::HierarchyError;

/// A symbol was requested with a shape that contradicts an earlier request.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IrError {
    #[error("symbol `{symbol}` already has type `{existing}`, requested `{requested}`")]
    SymbolConflict {
        symbol: String,
        existing: String,
        requested: String,
    },

    #[error("function `{symbol}` is defined twice in one module")]
    FunctionRedefined { symbol: String },
}

/// Failure while lowering one compilation unit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error("`{name}` is not a reference type and cannot be tested with instanceof")]
    NotAReferenceType { name: String },

    #[error("`{class}` has no static method `{method}`")]
    UnknownMethod { class: String, method: String },

    #[error("`{class}` has no static field `{field}`")]
    UnknownField { class: String, field: String },

    #[error("unknown local `{name}`")]
    UnknownLocal { name: String },

    #[error("`this` used outside an instance method")]
    ThisOutsideInstance,

    #[error("{context}: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    #[error("`{method}` takes {expected} argument(s), {found} supplied")]
    ArgCount {
        method: String,
        expected: usize,
        found: usize,
    },

    /// A node was visited before one of its operands.
    #[error("internal error: operand {id:?} used before it was translated")]
    Untranslated { id: ExprId },

    /// The value and literal descriptor builders disagreed.
    #[error("internal error: descriptor `{symbol}` differs between emission paths")]
    DescriptorPathMismatch { symbol: String },

    #[error("descriptor `{symbol}` lists {len} types, more than its count field holds")]
    DescriptorTooLarge { symbol: String, len: usize },

    /// LLVM refused to build an instruction.
    #[error("LLVM builder error: {0}")]
    Builder(String),

    #[error("module `{module}` failed verification: {message}")]
    InvalidModule { module: String, message: String },
}

/// Cross-unit consistency failure found after every unit compiled.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("identity cell `{symbol}` is defined by both `{first}` and `{second}`")]
    DuplicateDefinition {
        symbol: String,
        first: String,
        second: String,
    },

    #[error("identity cell `{symbol}` is referenced by `{unit}` but defined nowhere")]
    UndefinedIdentityCell { symbol: String, unit: String },

    #[error("identity cell `{symbol}` in `{unit}` has type `{found}`, expected `i8`")]
    BadCellSize {
        symbol: String,
        unit: String,
        found: String,
    },
}

/// Failure of a whole-program build.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("in unit `{unit}`: {source}")]
    Unit {
        unit: String,
        #[source]
        source: CodegenError,
    },

    #[error(transparent)]
    Link(#[from] LinkError),
}

impl ProgramError {
    pub fn in_unit(unit: &str, source: CodegenError) -> Self {
        ProgramError::Unit {
            unit: unit.to_owned(),
            source,
        }
    }
}
