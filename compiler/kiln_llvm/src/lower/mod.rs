//! Expression lowering from the arena AST to LLVM instructions.
//!
//! `ExprLowerer` visits a body's nodes in post-order
//! ([`kiln_ir::visitor::post_order`]) and records each node's result in a
//! [`Translations`] map. A node's lowering reads its operands' results from
//! the map instead of re-lowering them, so every operand is emitted exactly
//! once and deep expressions never recurse on the native stack.
//!
//! # Architecture
//!
//! ```text
//! ExprLowerer
//!   ├── mod.rs       literals, locals, not, static calls and fields
//!   └── type_test.rs instanceof
//! ```

mod type_test;

use inkwell::builder::Builder;
use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum};

use kiln_codegen::CodegenError;
use kiln_ir::visitor::post_order;
use kiln_ir::{ExprArena, ExprId, ExprKind, ExprRange, Name};
use kiln_types::ValueType;
use rustc_hash::FxHashMap;

use crate::context::UnitCx;
use crate::declare::builder_error;

/// A lowered value with its source type. `void` results carry no value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Typed<'ll> {
    pub ty: ValueType,
    pub value: Option<BasicValueEnum<'ll>>,
}

impl<'ll> Typed<'ll> {
    pub fn new(ty: ValueType, value: impl Into<BasicValueEnum<'ll>>) -> Self {
        Typed {
            ty,
            value: Some(value.into()),
        }
    }
}

/// Lowered value of every node visited so far in one body.
#[derive(Debug, Default)]
pub struct Translations<'ll> {
    values: FxHashMap<ExprId, Typed<'ll>>,
}

impl<'ll> Translations<'ll> {
    pub fn new() -> Self {
        Translations {
            values: FxHashMap::default(),
        }
    }

    /// Lowered value of `id`.
    ///
    /// Post-order guarantees operands are translated first; a miss is an
    /// internal error.
    pub fn get(&self, id: ExprId) -> Result<Typed<'ll>, CodegenError> {
        self.values
            .get(&id)
            .copied()
            .ok_or(CodegenError::Untranslated { id })
    }

    pub fn insert(&mut self, id: ExprId, value: Typed<'ll>) {
        self.values.insert(id, value);
    }

    pub fn contains(&self, id: ExprId) -> bool {
        self.values.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Lowers the expressions of one function body at the builder's position.
pub struct ExprLowerer<'a, 'll, 'cx> {
    pub(crate) ucx: &'a UnitCx<'ll, 'cx>,
    pub(crate) builder: &'a Builder<'ll>,
    pub(crate) arena: &'a ExprArena,
    /// Receiver of an instance method.
    pub(crate) this: Option<Typed<'ll>>,
    /// Parameters in scope, by source name.
    pub(crate) locals: FxHashMap<Name, Typed<'ll>>,
}

impl<'a, 'll, 'cx> ExprLowerer<'a, 'll, 'cx> {
    pub fn new(ucx: &'a UnitCx<'ll, 'cx>, builder: &'a Builder<'ll>, arena: &'a ExprArena) -> Self {
        ExprLowerer {
            ucx,
            builder,
            arena,
            this: None,
            locals: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_this(mut self, this: Typed<'ll>) -> Self {
        self.this = Some(this);
        self
    }

    pub fn bind_local(&mut self, name: Name, value: Typed<'ll>) {
        self.locals.insert(name, value);
    }

    /// Lower the expression rooted at `root` and return its value.
    pub fn lower(&mut self, root: ExprId) -> Result<Typed<'ll>, CodegenError> {
        let mut translations = Translations::new();
        self.lower_into(root, &mut translations)?;
        translations.get(root)
    }

    /// Lower every node under `root` not yet in `translations`.
    pub fn lower_into(
        &mut self,
        root: ExprId,
        translations: &mut Translations<'ll>,
    ) -> Result<(), CodegenError> {
        for id in post_order(self.arena, root) {
            if translations.contains(id) {
                continue;
            }
            let value = self.lower_node(id, translations)?;
            translations.insert(id, value);
        }
        Ok(())
    }

    fn lower_node(
        &mut self,
        id: ExprId,
        translations: &Translations<'ll>,
    ) -> Result<Typed<'ll>, CodegenError> {
        let scx = &self.ucx.scx;
        match *self.arena.kind(id) {
            ExprKind::Bool(value) => Ok(Typed::new(
                ValueType::Bool,
                scx.type_i1().const_int(u64::from(value), false),
            )),
            ExprKind::Int(value) => Ok(Typed::new(
                ValueType::Int,
                scx.type_i64().const_int(value as u64, value < 0),
            )),
            ExprKind::Str(text) => {
                let global = self
                    .builder
                    .build_global_string_ptr(self.ucx.cx.text(text), ".str")
                    .map_err(builder_error)?;
                Ok(Typed::new(ValueType::Str, global.as_pointer_value()))
            }
            ExprKind::Local(name) => {
                self.locals
                    .get(&name)
                    .copied()
                    .ok_or_else(|| CodegenError::UnknownLocal {
                        name: self.ucx.cx.text(name).to_owned(),
                    })
            }
            ExprKind::This => self.this.ok_or(CodegenError::ThisOutsideInstance),
            ExprKind::Not(operand) => self.lower_not(translations.get(operand)?),
            ExprKind::InstanceOf { expr, ty } => self.lower_instanceof(translations.get(expr)?, ty),
            ExprKind::StaticCall {
                class,
                method,
                args,
            } => self.lower_static_call(class, method, args, translations),
            ExprKind::StaticField { class, field } => self.lower_static_field(class, field),
        }
    }

    fn lower_not(&mut self, operand: Typed<'ll>) -> Result<Typed<'ll>, CodegenError> {
        let value = self.expect_value("operand of `!`", ValueType::Bool, operand)?;
        let not = self
            .builder
            .build_not(value.into_int_value(), "not")
            .map_err(builder_error)?;
        Ok(Typed::new(ValueType::Bool, not))
    }

    fn lower_static_call(
        &mut self,
        class: Name,
        method: Name,
        args: ExprRange,
        translations: &Translations<'ll>,
    ) -> Result<Typed<'ll>, CodegenError> {
        let cx = self.ucx.cx;
        let owner = cx.resolve_class(class)?;
        let sig = cx
            .registry
            .find_method(owner, method)?
            .filter(|sig| sig.is_static)
            .ok_or_else(|| CodegenError::UnknownMethod {
                class: cx.text(class).to_owned(),
                method: cx.text(method).to_owned(),
            })?;

        let arg_ids = self.arena.get_expr_list(args);
        if arg_ids.len() != sig.params.len() {
            return Err(CodegenError::ArgCount {
                method: format!("{}.{}", cx.text(class), cx.text(method)),
                expected: sig.params.len(),
                found: arg_ids.len(),
            });
        }

        let mut param_types = Vec::with_capacity(sig.params.len());
        let mut values: Vec<BasicMetadataValueEnum<'ll>> = Vec::with_capacity(arg_ids.len());
        for (&arg, &param) in arg_ids.iter().zip(&sig.params) {
            param_types.push(self.ucx.value_type("parameter", param)?);
            let value = self.expect_value("argument", param, translations.get(arg)?)?;
            values.push(value.into());
        }

        let symbol = cx.mangler.method_name(cx.binary_name(owner)?, cx.text(method));
        let fn_type = self.ucx.scx.fn_type(self.ucx.ir_type(sig.ret), &param_types);
        let callee = self.ucx.scx.get_or_declare_function(&symbol, fn_type)?;
        let name = if sig.ret == ValueType::Void { "" } else { "call" };
        let call = self
            .builder
            .build_call(callee, &values, name)
            .map_err(builder_error)?;
        Ok(Typed {
            ty: sig.ret,
            value: call.try_as_basic_value().basic(),
        })
    }

    fn lower_static_field(&mut self, class: Name, field: Name) -> Result<Typed<'ll>, CodegenError> {
        let cx = self.ucx.cx;
        let owner = cx.resolve_class(class)?;
        let sig = cx
            .registry
            .find_static_field(owner, field)?
            .ok_or_else(|| CodegenError::UnknownField {
                class: cx.text(class).to_owned(),
                field: cx.text(field).to_owned(),
            })?;

        let ty = self.ucx.value_type("static field", sig.ty)?;
        let symbol = cx
            .mangler
            .static_field_name(cx.binary_name(owner)?, cx.text(field));
        let global = self.ucx.scx.get_or_add_global(&symbol, ty)?;
        let value = self
            .builder
            .build_load(ty, global.as_pointer_value(), cx.text(field))
            .map_err(builder_error)?;
        Ok(Typed::new(sig.ty, value))
    }

    /// The value of `found`, which must have type `expected`.
    pub(crate) fn expect_value(
        &self,
        context: &str,
        expected: ValueType,
        found: Typed<'ll>,
    ) -> Result<BasicValueEnum<'ll>, CodegenError> {
        match found.value {
            Some(value) if found.ty == expected => Ok(value),
            _ => Err(CodegenError::TypeMismatch {
                context: context.to_owned(),
                expected: self.ucx.cx.type_text(expected),
                found: self.ucx.cx.type_text(found.ty),
            }),
        }
    }
}

#[cfg(test)]
mod tests;
