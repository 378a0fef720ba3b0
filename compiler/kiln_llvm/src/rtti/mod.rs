//! Runtime type information, built directly as LLVM values.
//!
//! Identity cells are one-byte constants whose address is the type's
//! runtime identity. The unit declaring a type defines its cell; every other
//! reference declares it external. Class objects are
//! `{ i32 count, [count x ptr] ids }` constants with `linkonce_odr` linkage,
//! listing cells in [`CodegenCx::descriptor_entries`] order.
//!
//! [`CodegenCx::class_id_decl`] and [`CodegenCx::class_obj_decl`] describe
//! the same globals as declaration literals.
//!
//! [`CodegenCx::descriptor_entries`]: kiln_codegen::CodegenCx::descriptor_entries
//! [`CodegenCx::class_id_decl`]: kiln_codegen::CodegenCx::class_id_decl
//! [`CodegenCx::class_obj_decl`]: kiln_codegen::CodegenCx::class_obj_decl

use inkwell::module::Linkage;
use inkwell::types::{BasicType, StructType};
use inkwell::values::{GlobalValue, PointerValue};

use kiln_codegen::CodegenError;
use kiln_types::TypeIdx;

use crate::context::UnitCx;

impl<'ll> UnitCx<'ll, '_> {
    /// Identity cell of `ty`.
    ///
    /// Repeat requests return the same global. A defining request upgrades
    /// an earlier external declaration in place; a non-defining request
    /// never downgrades a definition.
    pub fn identity_cell_decl(
        &self,
        ty: TypeIdx,
        defining: bool,
    ) -> Result<GlobalValue<'ll>, CodegenError> {
        let symbol = self.cx.class_id_symbol(ty)?;
        let cell = self.scx.get_or_add_global(&symbol, self.scx.type_i8().into())?;
        cell.set_constant(true);
        if defining && cell.get_initializer().is_none() {
            cell.set_initializer(&self.scx.type_i8().const_zero());
            cell.set_linkage(Linkage::External);
            tracing::trace!(symbol = %symbol, "defining identity cell");
        }
        Ok(cell)
    }

    /// Address of the identity cell of `ty`, declaring it if needed.
    pub fn identity_cell_address(&self, ty: TypeIdx) -> Result<PointerValue<'ll>, CodegenError> {
        Ok(self.identity_cell_decl(ty, false)?.as_pointer_value())
    }

    /// `{ i32, [len x ptr] }`
    pub fn descriptor_type(&self, len: u32) -> StructType<'ll> {
        self.scx.llcx.struct_type(
            &[
                self.scx.type_i32().into(),
                self.scx.type_ptr().array_type(len).into(),
            ],
            false,
        )
    }

    /// Class-object descriptor of `ty`, with an external declaration of
    /// every identity cell it lists.
    pub fn class_obj_ref(&self, ty: TypeIdx) -> Result<GlobalValue<'ll>, CodegenError> {
        let entries = self.cx.descriptor_entries(ty)?;
        let count = self.cx.descriptor_count(ty, entries.len())?;
        let ids = entries
            .iter()
            .map(|&entry| self.identity_cell_address(entry))
            .collect::<Result<Vec<_>, _>>()?;

        let symbol = self.cx.class_obj_symbol(ty)?;
        let descriptor = self
            .scx
            .get_or_add_global(&symbol, self.descriptor_type(count).into())?;
        if descriptor.get_initializer().is_none() {
            let init = self.scx.llcx.const_struct(
                &[
                    self.scx.type_i32().const_int(u64::from(count), false).into(),
                    self.scx.type_ptr().const_array(&ids).into(),
                ],
                false,
            );
            descriptor.set_initializer(&init);
            descriptor.set_linkage(Linkage::LinkOnceODR);
            descriptor.set_constant(true);
            tracing::trace!(symbol = %symbol, entries = count, "building class object");
        }
        Ok(descriptor)
    }
}
