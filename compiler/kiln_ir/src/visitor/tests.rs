use pretty_assertions::assert_eq;

use super::*;
use crate::ast::{Expr, ParsedType};
use crate::{Name, Span};

fn expr(arena: &mut ExprArena, kind: ExprKind) -> ExprId {
    arena.alloc_expr(Expr::new(kind, Span::DUMMY))
}

#[test]
fn leaf_is_its_own_order() {
    let mut arena = ExprArena::new();
    let lit = expr(&mut arena, ExprKind::Int(7));
    assert_eq!(post_order(&arena, lit), vec![lit]);
}

#[test]
fn operand_precedes_instanceof() {
    let mut arena = ExprArena::new();
    let this = expr(&mut arena, ExprKind::This);
    let test = expr(
        &mut arena,
        ExprKind::InstanceOf {
            expr: this,
            ty: ParsedType::Named(Name::from_raw(9)),
        },
    );
    let not = expr(&mut arena, ExprKind::Not(test));
    assert_eq!(post_order(&arena, not), vec![this, test, not]);
}

#[test]
fn call_arguments_in_source_order() {
    let mut arena = ExprArena::new();
    let a = expr(&mut arena, ExprKind::Int(1));
    let inner = expr(&mut arena, ExprKind::Bool(true));
    let b = expr(&mut arena, ExprKind::Not(inner));
    let c = expr(&mut arena, ExprKind::Str(Name::EMPTY));
    let args = arena.alloc_expr_list([a, b, c]);
    let call = expr(
        &mut arena,
        ExprKind::StaticCall {
            class: Name::from_raw(1),
            method: Name::from_raw(2),
            args,
        },
    );
    assert_eq!(post_order(&arena, call), vec![a, inner, b, c, call]);
}

#[test]
fn shared_operand_visited_once() {
    let mut arena = ExprArena::new();
    let shared = expr(&mut arena, ExprKind::This);
    let args = arena.alloc_expr_list([shared, shared]);
    let call = expr(
        &mut arena,
        ExprKind::StaticCall {
            class: Name::from_raw(1),
            method: Name::from_raw(2),
            args,
        },
    );
    assert_eq!(post_order(&arena, call), vec![shared, call]);
}

#[test]
fn deep_chain_does_not_recurse() {
    let mut arena = ExprArena::new();
    let mut cur = expr(&mut arena, ExprKind::Bool(false));
    for _ in 0..100_000 {
        cur = expr(&mut arena, ExprKind::Not(cur));
    }
    let order = post_order(&arena, cur);
    assert_eq!(order.len(), 100_001);
    assert_eq!(order.last().copied(), Some(cur));
}
