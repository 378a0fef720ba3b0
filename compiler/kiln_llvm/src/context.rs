//! LLVM context hierarchy.
//!
//! - `SimpleCx`: the LLVM context, one module, and the basic types
//! - `UnitCx`: a `SimpleCx` plus the shared [`CodegenCx`] of the program
//!
//! One `UnitCx` lowers one compilation unit into its own module. Values
//! built through it never leave the `'ll` context they were created in.

use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::{BasicTypeEnum, IntType, PointerType};
use inkwell::values::BasicValueEnum;
use inkwell::AddressSpace;

use kiln_codegen::{CodegenCx, CodegenError};
use kiln_types::ValueType;

/// Minimal LLVM state: context, module, and cached basic types.
pub struct SimpleCx<'ll> {
    pub llcx: &'ll Context,
    pub llmod: Module<'ll>,
    pub ptr_type: PointerType<'ll>,
}

impl<'ll> SimpleCx<'ll> {
    pub fn new(llcx: &'ll Context, module_name: &str) -> Self {
        SimpleCx {
            llcx,
            llmod: llcx.create_module(module_name),
            ptr_type: llcx.ptr_type(AddressSpace::default()),
        }
    }

    #[inline]
    pub fn type_i1(&self) -> IntType<'ll> {
        self.llcx.bool_type()
    }

    #[inline]
    pub fn type_i8(&self) -> IntType<'ll> {
        self.llcx.i8_type()
    }

    #[inline]
    pub fn type_i32(&self) -> IntType<'ll> {
        self.llcx.i32_type()
    }

    #[inline]
    pub fn type_i64(&self) -> IntType<'ll> {
        self.llcx.i64_type()
    }

    /// The opaque pointer type. Object references and identity-cell
    /// addresses both lower to it.
    #[inline]
    pub fn type_ptr(&self) -> PointerType<'ll> {
        self.ptr_type
    }
}

/// LLVM state for one unit, plus the program-wide codegen context.
pub struct UnitCx<'ll, 'a> {
    pub scx: SimpleCx<'ll>,
    pub cx: &'a CodegenCx<'a>,
}

impl<'ll, 'a> UnitCx<'ll, 'a> {
    pub fn new(llcx: &'ll Context, cx: &'a CodegenCx<'a>, module_name: &str) -> Self {
        UnitCx {
            scx: SimpleCx::new(llcx, module_name),
            cx,
        }
    }

    #[inline]
    pub fn llmod(&self) -> &Module<'ll> {
        &self.scx.llmod
    }

    /// LLVM type of a source value type; `None` for `void`.
    pub fn ir_type(&self, ty: ValueType) -> Option<BasicTypeEnum<'ll>> {
        match ty {
            ValueType::Void => None,
            ValueType::Bool => Some(self.scx.type_i1().into()),
            ValueType::Int => Some(self.scx.type_i64().into()),
            ValueType::Str | ValueType::Ref(_) => Some(self.scx.type_ptr().into()),
        }
    }

    /// LLVM type of a value of type `ty`, where `void` is not allowed.
    pub fn value_type(&self, context: &str, ty: ValueType) -> Result<BasicTypeEnum<'ll>, CodegenError> {
        self.ir_type(ty).ok_or_else(|| CodegenError::TypeMismatch {
            context: context.to_owned(),
            expected: "a value type".to_owned(),
            found: self.cx.type_text(ty),
        })
    }

    /// The all-zero value of a source value type; `None` for `void`.
    pub fn zero_value(&self, ty: ValueType) -> Option<BasicValueEnum<'ll>> {
        match ty {
            ValueType::Void => None,
            ValueType::Bool => Some(self.scx.type_i1().const_zero().into()),
            ValueType::Int => Some(self.scx.type_i64().const_zero().into()),
            ValueType::Str | ValueType::Ref(_) => Some(self.scx.type_ptr().const_null().into()),
        }
    }
}
