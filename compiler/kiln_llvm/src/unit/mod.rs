//! Lowering of one compilation unit to one LLVM module.
//!
//! For each class declared in the unit (nested classes included), the
//! module receives:
//!
//! - the type's identity cell, defined
//! - its class-object descriptor, plus extern declarations of every cell
//!   the descriptor lists
//! - a global per static field, and a static initializer function storing
//!   every static field initializer
//! - a function per method with a body
//!
//! The descriptor is built as LLVM values and checked against its
//! declaration literal, so a divergence surfaces as an error instead of a
//! miscompile.

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::BasicTypeEnum;

use kiln_codegen::decl::GlobalVarDecl;
use kiln_codegen::{CodegenCx, CodegenError};
use kiln_ir::{ClassDecl, ClassKind, CompilationUnit, FieldDecl, Member, MethodDecl, Name};
use kiln_types::{TypeIdx, ValueType};

use crate::context::UnitCx;
use crate::declare::builder_error;
use crate::lower::{ExprLowerer, Typed};

/// The lowered form of one compilation unit.
#[derive(Debug)]
pub struct CompiledUnit<'ll> {
    pub name: Name,
    pub module: Module<'ll>,
    /// Declaration literals of every identity cell and descriptor the unit
    /// defines, in emission order.
    pub rtti_decls: Vec<GlobalVarDecl>,
    /// Types whose identity cells this unit defines.
    pub defined_types: Vec<TypeIdx>,
}

/// Lower `unit` into a fresh module of `llcx`.
pub fn compile_unit<'ll>(
    cx: &CodegenCx<'_>,
    llcx: &'ll Context,
    unit: &CompilationUnit,
) -> Result<CompiledUnit<'ll>, CodegenError> {
    let unit_name = cx.text(unit.name);
    let _span = tracing::debug_span!("compile_unit", unit = unit_name).entered();

    let mut compiler = UnitCompiler {
        ucx: UnitCx::new(llcx, cx, unit_name),
        builder: llcx.create_builder(),
        unit,
        rtti_decls: Vec::new(),
        defined_types: Vec::new(),
    };

    // Explicit stack keeps declaration order without recursing per nesting level.
    let mut pending: Vec<&ClassDecl> = unit.classes.iter().rev().collect();
    while let Some(class) = pending.pop() {
        compiler.compile_class(class)?;
        pending.extend(
            class
                .body
                .members
                .iter()
                .rev()
                .filter_map(|m| match m {
                    Member::Class(nested) => Some(nested),
                    Member::Field(_) | Member::Method(_) => None,
                }),
        );
    }

    let UnitCompiler {
        ucx,
        rtti_decls,
        defined_types,
        ..
    } = compiler;
    let module = ucx.scx.llmod;

    if cx.config.dump_ir {
        tracing::debug!(unit = unit_name, ir = %module.print_to_string().to_string(), "lowered unit");
    }
    module.verify().map_err(|message| CodegenError::InvalidModule {
        module: unit_name.to_owned(),
        message: message.to_string(),
    })?;

    Ok(CompiledUnit {
        name: unit.name,
        module,
        rtti_decls,
        defined_types,
    })
}

struct UnitCompiler<'a, 'll> {
    ucx: UnitCx<'ll, 'a>,
    builder: Builder<'ll>,
    unit: &'a CompilationUnit,
    rtti_decls: Vec<GlobalVarDecl>,
    defined_types: Vec<TypeIdx>,
}

impl<'ll> UnitCompiler<'_, 'll> {
    fn compile_class(&mut self, class: &ClassDecl) -> Result<(), CodegenError> {
        let cx = self.ucx.cx;
        let ty = cx.resolve_class(class.name)?;
        tracing::trace!(class = cx.text(class.name), "compiling class");

        self.emit_rtti(ty)?;

        let mut initializers = Vec::new();
        for member in &class.body.members {
            match member {
                Member::Field(field) if field.flags.is_static() => {
                    self.define_static_field(ty, field)?;
                    if field.init.is_some() {
                        initializers.push(field);
                    }
                }
                Member::Method(method) if method.body.is_some() => {
                    if class.kind == ClassKind::Interface && !method.flags.is_static() {
                        continue;
                    }
                    self.compile_method(ty, method)?;
                }
                Member::Field(_) | Member::Method(_) | Member::Class(_) => {}
            }
        }

        if !initializers.is_empty() {
            self.compile_static_init(ty, &initializers)?;
        }
        Ok(())
    }

    /// Identity cell and descriptor of `ty`, checked against their literals.
    fn emit_rtti(&mut self, ty: TypeIdx) -> Result<(), CodegenError> {
        let cx = self.ucx.cx;

        let cell = self.ucx.identity_cell_decl(ty, true)?;
        let descriptor = self.ucx.class_obj_ref(ty)?;

        let cell_decl = cx.class_id_decl(ty, true)?;
        let descriptor_decl = cx.class_obj_decl(ty)?;
        for (decl, emitted) in [(&cell_decl, cell), (&descriptor_decl, descriptor)] {
            if !self.ucx.scx.matches_literal(decl, emitted)? {
                return Err(CodegenError::DescriptorPathMismatch {
                    symbol: decl.name.clone(),
                });
            }
        }

        self.rtti_decls.push(cell_decl);
        self.rtti_decls.push(descriptor_decl);
        self.defined_types.push(ty);
        Ok(())
    }

    /// Type and symbol of the static field `name` of `owner`.
    fn static_slot(&self, owner: TypeIdx, name: Name) -> Result<(ValueType, String), CodegenError> {
        let cx = self.ucx.cx;
        let sig = cx
            .registry
            .find_static_field(owner, name)?
            .ok_or_else(|| CodegenError::UnknownField {
                class: cx.full_name(owner).map(str::to_owned).unwrap_or_default(),
                field: cx.text(name).to_owned(),
            })?;
        let symbol = cx
            .mangler
            .static_field_name(cx.binary_name(owner)?, cx.text(name));
        Ok((sig.ty, symbol))
    }

    fn define_static_field(&mut self, owner: TypeIdx, field: &FieldDecl) -> Result<(), CodegenError> {
        let (ty, symbol) = self.static_slot(owner, field.name)?;
        let ir_ty = self.ucx.value_type("static field", ty)?;
        let global = self.ucx.scx.get_or_add_global(&symbol, ir_ty)?;
        global.set_constant(false);
        if let Some(zero) = self.ucx.zero_value(ty) {
            global.set_initializer(&zero);
        }
        Ok(())
    }

    fn compile_static_init(&mut self, owner: TypeIdx, fields: &[&FieldDecl]) -> Result<(), CodegenError> {
        let cx = self.ucx.cx;
        let symbol = cx.mangler.static_init_name(cx.binary_name(owner)?);
        let function = self
            .ucx
            .scx
            .declare_for_definition(&symbol, self.ucx.scx.fn_type(None, &[]))?;
        let entry = self.ucx.scx.llcx.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        let mut lowerer = ExprLowerer::new(&self.ucx, &self.builder, &self.unit.arena);
        for field in fields {
            let Some(init) = field.init else { continue };
            let (ty, field_symbol) = self.static_slot(owner, field.name)?;
            let value = lowerer.lower(init)?;
            let value = lowerer.expect_value(
                &format!("initializer of `{}`", cx.text(field.name)),
                ty,
                value,
            )?;
            let slot = self.ucx.scx.get_or_add_global(&field_symbol, value.get_type())?;
            self.builder
                .build_store(slot.as_pointer_value(), value)
                .map_err(builder_error)?;
        }
        self.builder.build_return(None).map_err(builder_error)?;
        Ok(())
    }

    fn compile_method(&mut self, owner: TypeIdx, method: &MethodDecl) -> Result<(), CodegenError> {
        let cx = self.ucx.cx;
        let Some(body) = method.body else {
            return Ok(());
        };
        let ret = cx.registry.resolve_parsed(method.ret, cx.interner)?;

        // (source name, type); the receiver comes first.
        let mut params: Vec<(Option<Name>, ValueType)> = Vec::with_capacity(method.params.len() + 1);
        if !method.flags.is_static() {
            params.push((None, ValueType::Ref(owner)));
        }
        for param in &method.params {
            params.push((
                Some(param.name),
                cx.registry.resolve_parsed(param.ty, cx.interner)?,
            ));
        }
        let param_types = params
            .iter()
            .map(|&(_, ty)| self.ucx.value_type("parameter", ty))
            .collect::<Result<Vec<BasicTypeEnum<'ll>>, _>>()?;

        let symbol = cx
            .mangler
            .method_name(cx.binary_name(owner)?, cx.text(method.name));
        let fn_type = self.ucx.scx.fn_type(self.ucx.ir_type(ret), &param_types);
        let function = self.ucx.scx.declare_for_definition(&symbol, fn_type)?;
        let entry = self.ucx.scx.llcx.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        let mut lowerer = ExprLowerer::new(&self.ucx, &self.builder, &self.unit.arena);
        for (value, &(name, ty)) in function.get_param_iter().zip(&params) {
            let bound = Typed::new(ty, value);
            match name {
                Some(name) => {
                    value.set_name(cx.text(name));
                    lowerer.bind_local(name, bound);
                }
                None => {
                    value.set_name("this");
                    lowerer = lowerer.with_this(bound);
                }
            }
        }
        let result = lowerer.lower(body)?;

        if ret == ValueType::Void {
            self.builder.build_return(None).map_err(builder_error)?;
        } else {
            let value = lowerer.expect_value(
                &format!("result of `{}`", cx.text(method.name)),
                ret,
                result,
            )?;
            self.builder
                .build_return(Some(&value))
                .map_err(builder_error)?;
        }
        Ok(())
    }
}
