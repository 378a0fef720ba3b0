//! Cross-unit check of the identity-cell one-definition rule.
//!
//! Units lower independently, so no unit can tell whether another unit
//! also defines a cell it defines, or whether anyone defines a cell it only
//! references. After every unit has lowered, its globals are summarized as
//! [`GlobalRecord`]s and fed to a [`DefinitionLedger`], which checks that
//! each referenced cell is defined by exactly one unit and that every copy
//! of it is one byte.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::mangle::{demangle, SymbolKind};
use crate::LinkError;

/// Backend-neutral summary of one module-level variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalRecord {
    pub symbol: String,
    /// Value type as printed by the backend, e.g. `i8`.
    pub ty: String,
    /// Carries an initializer in this unit.
    pub defined: bool,
}

/// Which unit defines and which units reference each identity cell.
#[derive(Debug, Default)]
pub struct DefinitionLedger {
    definitions: FxHashMap<String, String>,
    /// Sorted so diagnostics are deterministic.
    references: BTreeMap<String, Vec<String>>,
}

impl DefinitionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the identity cells among `globals`, emitted by `unit`.
    /// Other globals are ignored.
    pub fn record(&mut self, unit: &str, globals: &[GlobalRecord]) -> Result<(), LinkError> {
        let cells = globals.iter().filter(|g| {
            demangle(&g.symbol).is_some_and(|d| d.kind == SymbolKind::ClassId)
        });
        for cell in cells {
            if cell.ty != "i8" {
                return Err(LinkError::BadCellSize {
                    symbol: cell.symbol.clone(),
                    unit: unit.to_owned(),
                    found: cell.ty.clone(),
                });
            }
            if cell.defined {
                if let Some(first) = self.definitions.get(&cell.symbol) {
                    return Err(LinkError::DuplicateDefinition {
                        symbol: cell.symbol.clone(),
                        first: first.clone(),
                        second: unit.to_owned(),
                    });
                }
                tracing::trace!(symbol = %cell.symbol, unit, "identity cell defined");
                self.definitions.insert(cell.symbol.clone(), unit.to_owned());
            } else {
                self.references
                    .entry(cell.symbol.clone())
                    .or_default()
                    .push(unit.to_owned());
            }
        }
        Ok(())
    }

    /// Fail on the first referenced cell no unit defines.
    pub fn check_complete(&self) -> Result<(), LinkError> {
        for (symbol, units) in &self.references {
            if !self.definitions.contains_key(symbol) {
                return Err(LinkError::UndefinedIdentityCell {
                    symbol: symbol.clone(),
                    unit: units.first().cloned().unwrap_or_default(),
                });
            }
        }
        Ok(())
    }

    /// Unit that defines `symbol`.
    pub fn owner(&self, symbol: &str) -> Option<&str> {
        self.definitions.get(symbol).map(String::as_str)
    }

    /// Units that reference `symbol` without defining it.
    pub fn referrers(&self, symbol: &str) -> &[String] {
        self.references.get(symbol).map_or(&[], Vec::as_slice)
    }

    /// Number of identity cells defined across the program.
    pub fn defined_count(&self) -> usize {
        self.definitions.len()
    }
}
