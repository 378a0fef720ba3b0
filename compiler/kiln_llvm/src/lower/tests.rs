use pretty_assertions::assert_eq;

use inkwell::context::Context;
use inkwell::values::InstructionOpcode;

use kiln_ir::{Expr, ParsedType, Span};

use super::*;
use crate::test_helpers::Lattice;

fn alloc(arena: &mut ExprArena, kind: ExprKind) -> ExprId {
    arena.alloc_expr(Expr::new(kind, Span::DUMMY))
}

/// What lowering one expression in a fresh `f(x)` produced.
struct Lowered {
    result: Result<ValueType, CodegenError>,
    /// Text of `f`.
    function: String,
    /// Text of the whole module.
    module: String,
    opcodes: Vec<InstructionOpcode>,
}

impl Lowered {
    fn calls_to(&self, callee: &str) -> usize {
        self.function.matches(&format!(" @{callee}(")).count()
    }
}

fn lower_with_param(lattice: &Lattice, arena: &ExprArena, param_ty: ValueType, root: ExprId) -> Lowered {
    let cx = lattice.cx();
    let context = Context::create();
    let ucx = UnitCx::new(&context, &cx, "test");

    let param = ucx.ir_type(param_ty).unwrap();
    let fn_type = ucx.scx.fn_type(Some(ucx.scx.type_i1().into()), &[param]);
    let function = ucx.llmod().add_function("f", fn_type, None);
    let entry = context.append_basic_block(function, "entry");
    let builder = context.create_builder();
    builder.position_at_end(entry);
    let x = function.get_nth_param(0).unwrap();
    x.set_name("x");

    let result = {
        let mut lowerer = ExprLowerer::new(&ucx, &builder, arena);
        lowerer.bind_local(lattice.name("x"), Typed::new(param_ty, x));
        lowerer.lower(root).map(|value| value.ty)
    };

    let mut opcodes = Vec::new();
    let mut next = entry.get_first_instruction();
    while let Some(instr) = next {
        opcodes.push(instr.get_opcode());
        next = instr.get_next_instruction();
    }
    Lowered {
        result,
        function: function.print_to_string().to_string(),
        module: ucx.llmod().print_to_string().to_string(),
        opcodes,
    }
}

fn instanceof_x(lattice: &Lattice, arena: &mut ExprArena, target: &str) -> ExprId {
    let x = alloc(arena, ExprKind::Local(lattice.name("x")));
    alloc(
        arena,
        ExprKind::InstanceOf {
            expr: x,
            ty: ParsedType::Named(lattice.name(target)),
        },
    )
}

#[test]
fn instanceof_calls_runtime_with_operand_and_cell() {
    let (lattice, [.., a, _]) = Lattice::b_extends_a();
    let mut arena = ExprArena::new();
    let test = instanceof_x(&lattice, &mut arena, "I1");

    let out = lower_with_param(&lattice, &arena, ValueType::Ref(a), test);
    assert_eq!(out.result, Ok(ValueType::Bool));
    assert!(out.module.contains("@_kiln_cid$I1 = external constant i8"));
    assert!(out.module.contains("declare i1 @instanceof(ptr, ptr)"));
    // The pointer cast folds away; the call takes the parameter itself.
    assert!(out
        .function
        .contains("%isa = call i1 @instanceof(ptr %x, ptr @_kiln_cid$I1)"));
    assert_eq!(out.opcodes, [InstructionOpcode::Call]);
}

#[test]
fn instanceof_uses_configured_runtime_symbol() {
    let (mut lattice, [.., a, _]) = Lattice::b_extends_a();
    lattice.config = lattice.config.clone().with_runtime_instanceof("kiln_isa");
    let mut arena = ExprArena::new();
    let test = instanceof_x(&lattice, &mut arena, "A");

    let out = lower_with_param(&lattice, &arena, ValueType::Ref(a), test);
    assert_eq!(out.result, Ok(ValueType::Bool));
    assert_eq!(out.calls_to("kiln_isa"), 1);
    assert_eq!(out.calls_to("instanceof"), 0);
}

#[test]
fn shared_subexpression_is_lowered_once() {
    let (mut lattice, [object, .., a, _]) = Lattice::b_extends_a();
    let util = lattice.class("Util", object, &[]);
    lattice.static_method(
        util,
        "both",
        &[ValueType::Bool, ValueType::Bool],
        ValueType::Bool,
    );

    let mut arena = ExprArena::new();
    let test = instanceof_x(&lattice, &mut arena, "B");
    let args = arena.alloc_expr_list([test, test]);
    let call = alloc(
        &mut arena,
        ExprKind::StaticCall {
            class: lattice.name("Util"),
            method: lattice.name("both"),
            args,
        },
    );

    let out = lower_with_param(&lattice, &arena, ValueType::Ref(a), call);
    assert_eq!(out.result, Ok(ValueType::Bool));
    assert_eq!(out.calls_to("instanceof"), 1);
    assert!(out
        .function
        .contains("%call = call i1 @_kiln_m$Util$$both(i1 %isa, i1 %isa)"));
    assert!(out.module.contains("declare i1 @_kiln_m$Util$$both(i1, i1)"));
}

#[test]
fn negated_instanceof() {
    let (lattice, [.., a, _]) = Lattice::b_extends_a();
    let mut arena = ExprArena::new();
    let test = instanceof_x(&lattice, &mut arena, "I2");
    let not = alloc(&mut arena, ExprKind::Not(test));

    let out = lower_with_param(&lattice, &arena, ValueType::Ref(a), not);
    assert_eq!(out.result, Ok(ValueType::Bool));
    assert_eq!(out.opcodes, [InstructionOpcode::Call, InstructionOpcode::Xor]);
}

#[test]
fn instanceof_rejects_primitive_target() {
    let (lattice, [.., a, _]) = Lattice::b_extends_a();
    let mut arena = ExprArena::new();
    let x = alloc(&mut arena, ExprKind::Local(lattice.name("x")));
    let test = alloc(
        &mut arena,
        ExprKind::InstanceOf {
            expr: x,
            ty: ParsedType::Int,
        },
    );

    let out = lower_with_param(&lattice, &arena, ValueType::Ref(a), test);
    assert_eq!(
        out.result,
        Err(CodegenError::NotAReferenceType { name: "int".into() })
    );
}

#[test]
fn instanceof_rejects_primitive_operand() {
    let lattice = Lattice::new();
    let mut arena = ExprArena::new();
    let x = alloc(&mut arena, ExprKind::Int(3));
    let test = alloc(
        &mut arena,
        ExprKind::InstanceOf {
            expr: x,
            ty: ParsedType::Named(lattice.name("Object")),
        },
    );

    let out = lower_with_param(&lattice, &arena, ValueType::Int, test);
    assert!(matches!(out.result, Err(CodegenError::TypeMismatch { .. })));
    assert!(!out.module.contains("@instanceof"));
}

#[test]
fn instanceof_rejects_string_operand() {
    let lattice = Lattice::new();
    let mut arena = ExprArena::new();
    let literal = alloc(&mut arena, ExprKind::Str(lattice.name("text")));
    let on_literal = alloc(
        &mut arena,
        ExprKind::InstanceOf {
            expr: literal,
            ty: ParsedType::Named(lattice.name("Object")),
        },
    );
    let on_param = instanceof_x(&lattice, &mut arena, "Object");

    let expected = Err(CodegenError::TypeMismatch {
        context: "instanceof operand".into(),
        expected: "an object reference".into(),
        found: "string".into(),
    });
    for root in [on_literal, on_param] {
        let out = lower_with_param(&lattice, &arena, ValueType::Str, root);
        assert_eq!(out.result, expected);
        assert!(!out.module.contains("@instanceof"));
        assert!(!out.module.contains("_kiln_cid$Object"));
    }
}

#[test]
fn instanceof_unknown_type() {
    let lattice = Lattice::new();
    let mut arena = ExprArena::new();
    let test = instanceof_x(&lattice, &mut arena, "Nope");

    let out = lower_with_param(&lattice, &arena, ValueType::Ref(lattice.object()), test);
    assert_eq!(
        out.result,
        Err(CodegenError::Hierarchy(
            kiln_types::HierarchyError::UnknownTypeName { name: "Nope".into() }
        ))
    );
}

#[test]
fn static_field_is_loaded_from_its_global() {
    let (mut lattice, [object, ..]) = Lattice::b_extends_a();
    let config = lattice.class("Config", object, &[]);
    lattice.static_field(config, "limit", ValueType::Int);

    let mut arena = ExprArena::new();
    let field = alloc(
        &mut arena,
        ExprKind::StaticField {
            class: lattice.name("Config"),
            field: lattice.name("limit"),
        },
    );

    let out = lower_with_param(&lattice, &arena, ValueType::Int, field);
    assert_eq!(out.result, Ok(ValueType::Int));
    assert!(out.module.contains("@_kiln_sf$Config$$limit = external global i64"));
    assert!(out
        .function
        .contains("%limit = load i64, ptr @_kiln_sf$Config$$limit"));
    assert_eq!(out.opcodes, [InstructionOpcode::Load]);
}

#[test]
fn static_call_checks_arguments() {
    let (mut lattice, [object, ..]) = Lattice::b_extends_a();
    let util = lattice.class("Util", object, &[]);
    lattice.static_method(util, "twice", &[ValueType::Int], ValueType::Int);

    let mut arena = ExprArena::new();
    let arg = alloc(&mut arena, ExprKind::Bool(true));
    let args = arena.alloc_expr_list([arg]);
    let call = alloc(
        &mut arena,
        ExprKind::StaticCall {
            class: lattice.name("Util"),
            method: lattice.name("twice"),
            args,
        },
    );
    let out = lower_with_param(&lattice, &arena, ValueType::Int, call);
    assert_eq!(
        out.result,
        Err(CodegenError::TypeMismatch {
            context: "argument".into(),
            expected: "int".into(),
            found: "boolean".into(),
        })
    );

    let none = arena.alloc_expr_list([]);
    let call = alloc(
        &mut arena,
        ExprKind::StaticCall {
            class: lattice.name("Util"),
            method: lattice.name("twice"),
            args: none,
        },
    );
    let out = lower_with_param(&lattice, &arena, ValueType::Int, call);
    assert_eq!(
        out.result,
        Err(CodegenError::ArgCount {
            method: "Util.twice".into(),
            expected: 1,
            found: 0,
        })
    );
}

#[test]
fn void_static_call_has_no_value() {
    let (mut lattice, [object, ..]) = Lattice::b_extends_a();
    let log = lattice.class("Log", object, &[]);
    lattice.static_method(log, "flush", &[], ValueType::Void);

    let mut arena = ExprArena::new();
    let args = arena.alloc_expr_list([]);
    let call = alloc(
        &mut arena,
        ExprKind::StaticCall {
            class: lattice.name("Log"),
            method: lattice.name("flush"),
            args,
        },
    );

    let out = lower_with_param(&lattice, &arena, ValueType::Int, call);
    assert_eq!(out.result, Ok(ValueType::Void));
    assert!(out.function.contains("call void @_kiln_m$Log$$flush()"));
}

#[test]
fn string_literal_is_pointer_to_private_global() {
    let lattice = Lattice::new();
    let mut arena = ExprArena::new();
    let s = alloc(&mut arena, ExprKind::Str(lattice.name("B")));

    let out = lower_with_param(&lattice, &arena, ValueType::Int, s);
    assert_eq!(out.result, Ok(ValueType::Str));
    assert!(out.opcodes.is_empty());
    assert!(out.module.contains("private unnamed_addr constant [2 x i8] c\"B\\00\""));
}

#[test]
fn scope_errors() {
    let lattice = Lattice::new();
    let mut arena = ExprArena::new();
    let this = alloc(&mut arena, ExprKind::This);
    let y = alloc(&mut arena, ExprKind::Local(lattice.name("y")));
    let not_y = alloc(&mut arena, ExprKind::Not(y));
    let x = alloc(&mut arena, ExprKind::Local(lattice.name("x")));
    let not_x = alloc(&mut arena, ExprKind::Not(x));

    let out = lower_with_param(&lattice, &arena, ValueType::Int, this);
    assert_eq!(out.result, Err(CodegenError::ThisOutsideInstance));

    let out = lower_with_param(&lattice, &arena, ValueType::Int, not_y);
    assert_eq!(out.result, Err(CodegenError::UnknownLocal { name: "y".into() }));

    let out = lower_with_param(&lattice, &arena, ValueType::Int, not_x);
    assert_eq!(
        out.result,
        Err(CodegenError::TypeMismatch {
            context: "operand of `!`".into(),
            expected: "boolean".into(),
            found: "int".into(),
        })
    );
}

#[test]
fn deep_negation_chain_does_not_recurse() {
    let lattice = Lattice::new();
    let mut arena = ExprArena::new();
    let mut root = alloc(&mut arena, ExprKind::Local(lattice.name("x")));
    for _ in 0..100_000 {
        root = alloc(&mut arena, ExprKind::Not(root));
    }

    let out = lower_with_param(&lattice, &arena, ValueType::Bool, root);
    assert_eq!(out.result, Ok(ValueType::Bool));
    assert_eq!(out.opcodes.len(), 100_000);
}

#[test]
fn missing_translation_is_internal_error() {
    let translations = Translations::new();
    let id = ExprId::new(7);
    assert_eq!(translations.get(id), Err(CodegenError::Untranslated { id }));
    assert!(translations.is_empty());
    assert_eq!(translations.len(), 0);
}
