//! Expression nodes.

use crate::{ExprId, ExprRange, Name, Span};

use super::ParsedType;

/// Expression node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    #[inline]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// Expression variants.
///
/// A closed set: every lowering rule is one arm of an exhaustive match, and
/// a new construct is a new variant here.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// `true` / `false`
    Bool(bool),

    /// Integer literal.
    Int(i64),

    /// String literal (interned contents).
    Str(Name),

    /// Reference to a method parameter.
    Local(Name),

    /// The receiver of an instance method.
    This,

    /// Logical negation: `!expr`
    Not(ExprId),

    /// Dynamic type test: `expr instanceof Type`
    InstanceOf { expr: ExprId, ty: ParsedType },

    /// Static method call: `Class.method(args)`
    ///
    /// `class` is the fully qualified name of the target type.
    StaticCall {
        class: Name,
        method: Name,
        args: ExprRange,
    },

    /// Static field read: `Class.field`
    StaticField { class: Name, field: Name },
}

impl ExprKind {
    /// Get a short name for this expression kind, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Bool(_) => "bool literal",
            ExprKind::Int(_) => "int literal",
            ExprKind::Str(_) => "string literal",
            ExprKind::Local(_) => "local",
            ExprKind::This => "this",
            ExprKind::Not(_) => "not",
            ExprKind::InstanceOf { .. } => "instanceof",
            ExprKind::StaticCall { .. } => "static call",
            ExprKind::StaticField { .. } => "static field",
        }
    }
}
