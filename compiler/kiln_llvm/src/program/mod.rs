//! Whole-program driver: parallel unit compilation plus cross-unit checks.
//!
//! Units compile independently, fanned out with `rayon`. LLVM contexts are
//! not shareable across threads, so each task lowers its unit into a
//! context of its own and hands back the printed module together with a
//! summary of its globals. A [`DefinitionLedger`] then checks the
//! one-definition rule over those summaries: each identity cell referenced
//! anywhere is defined by exactly one unit, and every copy is one byte.

use inkwell::context::Context;
use inkwell::module::Module;
use rayon::prelude::*;

use kiln_codegen::decl::GlobalVarDecl;
use kiln_codegen::{CodegenConfig, CodegenCx, DefinitionLedger, GlobalRecord, ProgramError};
use kiln_ir::{CompilationUnit, Name, StringInterner};
use kiln_types::{ClassRegistry, TypeIdx};

use crate::unit::{compile_unit, CompiledUnit};

/// One lowered unit, detached from the LLVM context that built it.
#[derive(Clone, Debug)]
pub struct UnitIr {
    pub name: Name,
    /// Textual LLVM IR of the unit's module.
    pub ir: String,
    pub rtti_decls: Vec<GlobalVarDecl>,
    pub defined_types: Vec<TypeIdx>,
    /// Every global of the module, in module order.
    pub globals: Vec<GlobalRecord>,
}

impl UnitIr {
    fn new(unit: &CompiledUnit<'_>) -> Self {
        UnitIr {
            name: unit.name,
            ir: unit.module.print_to_string().to_string(),
            rtti_decls: unit.rtti_decls.clone(),
            defined_types: unit.defined_types.clone(),
            globals: global_records(&unit.module),
        }
    }
}

/// Every unit of a program, lowered.
#[derive(Debug)]
pub struct Program {
    pub units: Vec<UnitIr>,
    pub ledger: DefinitionLedger,
}

/// Compile every unit, then check identity cells across units.
///
/// Units are returned in input order. The first failing unit (in input
/// order) is reported.
pub fn compile_program(
    units: &[CompilationUnit],
    registry: &ClassRegistry,
    interner: &StringInterner,
    config: &CodegenConfig,
) -> Result<Program, ProgramError> {
    let _span = tracing::debug_span!("compile_program", units = units.len()).entered();
    let cx = CodegenCx::new(registry, interner, config);

    let compiled = units
        .par_iter()
        .map(|unit| {
            let llcx = Context::create();
            let lowered = compile_unit(&cx, &llcx, unit).map(|compiled| UnitIr::new(&compiled));
            lowered.map_err(|e| ProgramError::in_unit(interner.lookup(unit.name), e))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let mut ledger = DefinitionLedger::new();
    for unit in &compiled {
        ledger.record(interner.lookup(unit.name), &unit.globals)?;
    }
    ledger.check_complete()?;
    tracing::debug!(cells = ledger.defined_count(), "identity cells verified");

    Ok(Program {
        units: compiled,
        ledger,
    })
}

/// Symbol, value type and definedness of every global in `module`.
pub fn global_records(module: &Module<'_>) -> Vec<GlobalRecord> {
    module
        .get_globals()
        .map(|global| GlobalRecord {
            symbol: global.get_name().to_string_lossy().into_owned(),
            ty: global.get_value_type().print_to_string().to_string(),
            defined: global.get_initializer().is_some(),
        })
        .collect()
}
