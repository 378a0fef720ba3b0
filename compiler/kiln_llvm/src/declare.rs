//! Get-or-add declarations of module-level symbols.
//!
//! Every lookup coalesces by symbol: requesting a symbol twice with the
//! same type returns the same global or function, requesting it with a
//! different type is an [`IrError::SymbolConflict`].

use inkwell::builder::BuilderError;
use inkwell::types::{AnyType, BasicType, BasicTypeEnum, FunctionType};
use inkwell::values::{FunctionValue, GlobalValue};

use kiln_codegen::{CodegenError, IrError};

use crate::context::SimpleCx;

impl<'ll> SimpleCx<'ll> {
    /// The global `name` of type `ty`, added as an external declaration if
    /// the module does not have it yet.
    pub fn get_or_add_global(
        &self,
        name: &str,
        ty: BasicTypeEnum<'ll>,
    ) -> Result<GlobalValue<'ll>, CodegenError> {
        if let Some(global) = self.llmod.get_global(name) {
            let existing = global.get_value_type();
            if existing != ty.as_any_type_enum() {
                return Err(IrError::SymbolConflict {
                    symbol: name.to_owned(),
                    existing: existing.print_to_string().to_string(),
                    requested: ty.print_to_string().to_string(),
                }
                .into());
            }
            return Ok(global);
        }
        Ok(self.llmod.add_global(ty, None, name))
    }

    /// The function `name` of type `fn_type`, declared external if the
    /// module does not have it yet.
    pub fn get_or_declare_function(
        &self,
        name: &str,
        fn_type: FunctionType<'ll>,
    ) -> Result<FunctionValue<'ll>, CodegenError> {
        if let Some(function) = self.llmod.get_function(name) {
            if function.get_type() != fn_type {
                return Err(IrError::SymbolConflict {
                    symbol: name.to_owned(),
                    existing: function.get_type().print_to_string().to_string(),
                    requested: fn_type.print_to_string().to_string(),
                }
                .into());
            }
            return Ok(function);
        }
        Ok(self.llmod.add_function(name, fn_type, None))
    }

    /// Like [`SimpleCx::get_or_declare_function`], for a function about to
    /// receive its body. A second definition is an error.
    pub fn declare_for_definition(
        &self,
        name: &str,
        fn_type: FunctionType<'ll>,
    ) -> Result<FunctionValue<'ll>, CodegenError> {
        let function = self.get_or_declare_function(name, fn_type)?;
        if function.count_basic_blocks() > 0 {
            return Err(IrError::FunctionRedefined {
                symbol: name.to_owned(),
            }
            .into());
        }
        Ok(function)
    }

    /// `fn(params) -> ret`, with `None` for a `void` result.
    pub fn fn_type(
        &self,
        ret: Option<BasicTypeEnum<'ll>>,
        params: &[BasicTypeEnum<'ll>],
    ) -> FunctionType<'ll> {
        let params: Vec<_> = params.iter().map(|&p| p.into()).collect();
        match ret {
            Some(ret) => ret.fn_type(&params, false),
            None => self.llcx.void_type().fn_type(&params, false),
        }
    }
}

/// Builder failures surface as [`CodegenError::Builder`].
pub(crate) fn builder_error(err: BuilderError) -> CodegenError {
    CodegenError::Builder(err.to_string())
}
