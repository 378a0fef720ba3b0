//! Runtime function declarations.
//!
//! Declares the extern functions the Kiln runtime provides. They are
//! resolved at link time.

use inkwell::values::FunctionValue;

use kiln_codegen::{CodegenConfig, CodegenError};

use crate::context::SimpleCx;

/// Declare the subtype test, `i1 (ptr object, ptr class_id)`.
///
/// The runtime reads the descriptor of `object`'s dynamic type and reports
/// whether `class_id` appears in it. Repeat declarations coalesce.
pub fn declare_instanceof<'ll>(
    scx: &SimpleCx<'ll>,
    config: &CodegenConfig,
) -> Result<FunctionValue<'ll>, CodegenError> {
    let ptr = scx.type_ptr().into();
    let fn_type = scx.fn_type(Some(scx.type_i1().into()), &[ptr, ptr]);
    scx.get_or_declare_function(&config.runtime_instanceof, fn_type)
}
