//! Explicit post-order traversal of expression trees.
//!
//! Lowering rules read the translations of their operands, so every
//! operand must be visited before the node that uses it. The order is
//! produced up front with an explicit stack instead of recursion, which
//! makes the contract visible to the driver and keeps deep expression
//! chains off the native call stack.

use crate::ast::ExprKind;
use crate::{ExprArena, ExprId};

/// Call `f` on each direct child of `kind`, left to right.
pub fn for_each_child(kind: &ExprKind, arena: &ExprArena, mut f: impl FnMut(ExprId)) {
    match *kind {
        ExprKind::Bool(_)
        | ExprKind::Int(_)
        | ExprKind::Str(_)
        | ExprKind::Local(_)
        | ExprKind::This
        | ExprKind::StaticField { .. } => {}
        ExprKind::Not(inner) => f(inner),
        ExprKind::InstanceOf { expr, .. } => f(expr),
        ExprKind::StaticCall { args, .. } => {
            for &arg in arena.get_expr_list(args) {
                f(arg);
            }
        }
    }
}

/// Compute the post-order sequence of the tree rooted at `root`.
///
/// Children appear before their parent, siblings in source order, and the
/// root last. A node reachable twice appears once, at its first position.
pub fn post_order(arena: &ExprArena, root: ExprId) -> Vec<ExprId> {
    let mut order = Vec::new();
    let mut seen = vec![false; arena.len()];
    // (node, children already pushed)
    let mut stack = vec![(root, false)];

    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            order.push(id);
            continue;
        }
        if seen[id.index()] {
            continue;
        }
        seen[id.index()] = true;
        stack.push((id, true));

        let mut children = Vec::new();
        for_each_child(arena.kind(id), arena, |child| children.push(child));
        for child in children.into_iter().rev() {
            if !seen[child.index()] {
                stack.push((child, false));
            }
        }
    }

    order
}

#[cfg(test)]
mod tests;
