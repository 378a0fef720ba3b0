//! Lowering of declaration literals into an LLVM module.
//!
//! A [`GlobalVarDecl`] denotes one global. [`SimpleCx::declare_literal`]
//! adds that global to the module, and [`SimpleCx::matches_literal`] checks
//! an existing global against it. LLVM uniques types and constants per
//! context, so a literal and a value that describe the same global lower
//! to the same handles and compare equal.

use inkwell::module::Linkage as LlvmLinkage;
use inkwell::types::{AnyType, BasicType, BasicTypeEnum};
use inkwell::values::{ArrayValue, BasicValueEnum, GlobalValue};

use kiln_codegen::decl::{GlobalVarDecl, Linkage, Operand, TypeNode};
use kiln_codegen::CodegenError;

use crate::context::SimpleCx;

fn llvm_linkage(linkage: Linkage) -> LlvmLinkage {
    match linkage {
        Linkage::External => LlvmLinkage::External,
        Linkage::LinkOnceOdr => LlvmLinkage::LinkOnceODR,
    }
}

impl<'ll> SimpleCx<'ll> {
    /// LLVM type a [`TypeNode`] denotes.
    pub fn literal_type(&self, node: &TypeNode) -> BasicTypeEnum<'ll> {
        match node {
            TypeNode::Int(bits) => self.llcx.custom_width_int_type(*bits).into(),
            TypeNode::Pointer(_) => self.type_ptr().into(),
            TypeNode::Array { elem, len } => self.literal_type(elem).array_type(*len).into(),
            TypeNode::Structure(fields) => {
                let fields: Vec<_> = fields.iter().map(|f| self.literal_type(f)).collect();
                self.llcx.struct_type(&fields, false).into()
            }
        }
    }

    /// Constant an [`Operand`] denotes. Addresses of globals the module
    /// lacks are added as external declarations.
    pub fn literal_value(&self, operand: &Operand) -> Result<BasicValueEnum<'ll>, CodegenError> {
        match operand {
            Operand::IntLit { ty, value } => match self.literal_type(ty) {
                BasicTypeEnum::IntType(int) => Ok(int.const_int(*value as u64, *value < 0).into()),
                _ => Err(literal_mismatch("integer literal", "an integer type", ty)),
            },
            Operand::Variable { name, ty } => {
                let TypeNode::Pointer(pointee) = ty else {
                    return Err(literal_mismatch(&format!("address of `@{name}`"), "ptr", ty));
                };
                let global = self.get_or_add_global(name, self.literal_type(pointee))?;
                Ok(global.as_pointer_value().into())
            }
            Operand::ArrayLit { elem, elems } => {
                let values = elems
                    .iter()
                    .map(|e| self.literal_value(&e.operand))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(const_array(self.literal_type(elem), &values)?.into())
            }
            Operand::StructLit { fields } => {
                let values = fields
                    .iter()
                    .map(|f| self.literal_value(&f.operand))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.llcx.const_struct(&values, false).into())
            }
        }
    }

    /// Add the global `decl` denotes to the module.
    pub fn declare_literal(&self, decl: &GlobalVarDecl) -> Result<GlobalValue<'ll>, CodegenError> {
        let global = self.get_or_add_global(&decl.name, self.literal_type(&decl.ty))?;
        global.set_constant(decl.is_constant);
        if let Some(init) = decl.initializer() {
            global.set_initializer(&self.literal_value(init)?);
            global.set_linkage(llvm_linkage(decl.linkage));
        }
        Ok(global)
    }

    /// Whether `global` is exactly the global `decl` denotes.
    pub fn matches_literal(
        &self,
        decl: &GlobalVarDecl,
        global: GlobalValue<'ll>,
    ) -> Result<bool, CodegenError> {
        let init = decl
            .initializer()
            .map(|init| self.literal_value(init))
            .transpose()?;
        Ok(global.get_name().to_bytes() == decl.name.as_bytes()
            && global.get_value_type() == self.literal_type(&decl.ty).as_any_type_enum()
            && global.is_constant() == decl.is_constant
            && global.get_linkage() == llvm_linkage(decl.effective_linkage())
            && global.get_initializer() == init)
    }
}

/// `[values]` with elements of type `elem`.
fn const_array<'ll>(
    elem: BasicTypeEnum<'ll>,
    values: &[BasicValueEnum<'ll>],
) -> Result<ArrayValue<'ll>, CodegenError> {
    let mismatch = |found: String| CodegenError::TypeMismatch {
        context: "array element".to_owned(),
        expected: elem.print_to_string().to_string(),
        found,
    };
    if let Some(other) = values.iter().find(|v| v.get_type() != elem) {
        return Err(mismatch(other.get_type().print_to_string().to_string()));
    }
    Ok(match elem {
        BasicTypeEnum::PointerType(ty) => {
            let values: Vec<_> = values.iter().map(|v| v.into_pointer_value()).collect();
            ty.const_array(&values)
        }
        BasicTypeEnum::IntType(ty) => {
            let values: Vec<_> = values.iter().map(|v| v.into_int_value()).collect();
            ty.const_array(&values)
        }
        BasicTypeEnum::StructType(ty) => {
            let values: Vec<_> = values.iter().map(|v| v.into_struct_value()).collect();
            ty.const_array(&values)
        }
        BasicTypeEnum::ArrayType(ty) => {
            let values: Vec<_> = values.iter().map(|v| v.into_array_value()).collect();
            ty.const_array(&values)
        }
        other => return Err(mismatch(other.print_to_string().to_string())),
    })
}

fn literal_mismatch(context: &str, expected: &str, found: &TypeNode) -> CodegenError {
    CodegenError::TypeMismatch {
        context: context.to_owned(),
        expected: expected.to_owned(),
        found: found.to_string(),
    }
}
