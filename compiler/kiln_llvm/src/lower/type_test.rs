//! `instanceof` lowering.
//!
//! `x instanceof T` becomes a runtime call:
//!
//! ```text
//! @_kiln_cid$T = external constant i8
//! %isa = call i1 @instanceof(ptr %x, ptr @_kiln_cid$T)
//! ```
//!
//! The tested operand is the value already lowered for `x`; it is never
//! re-emitted. It is cast to the opaque pointer type first, which under
//! opaque pointers folds to the operand itself.

use kiln_codegen::CodegenError;
use kiln_ir::ParsedType;
use kiln_types::ValueType;

use super::{ExprLowerer, Typed};
use crate::declare::builder_error;
use crate::runtime_decl::declare_instanceof;

impl<'ll> ExprLowerer<'_, 'll, '_> {
    pub(super) fn lower_instanceof(
        &mut self,
        object: Typed<'ll>,
        ty: ParsedType,
    ) -> Result<Typed<'ll>, CodegenError> {
        let cx = self.ucx.cx;
        let target = match cx.registry.resolve_parsed(ty, cx.interner)? {
            ValueType::Ref(target) => target,
            other => {
                return Err(CodegenError::NotAReferenceType {
                    name: cx.type_text(other),
                })
            }
        };
        // Only object references carry a descriptor to test.
        let (ValueType::Ref(_), Some(operand)) = (object.ty, object.value) else {
            return Err(CodegenError::TypeMismatch {
                context: "instanceof operand".to_owned(),
                expected: "an object reference".to_owned(),
                found: cx.type_text(object.ty),
            });
        };

        let class_id = self.ucx.identity_cell_address(target)?;
        tracing::trace!(target = cx.full_name(target)?, "lowering instanceof");

        let erased = self
            .builder
            .build_bit_cast(operand, self.ucx.scx.type_ptr(), "obj")
            .map_err(builder_error)?;
        let instanceof = declare_instanceof(&self.ucx.scx, cx.config)?;
        let call = self
            .builder
            .build_call(instanceof, &[erased.into(), class_id.into()], "isa")
            .map_err(builder_error)?;
        Ok(Typed {
            ty: ValueType::Bool,
            value: call.try_as_basic_value().basic(),
        })
    }
}
