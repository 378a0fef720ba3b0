//! Arena storage for expressions.

use crate::ast::{Expr, ExprKind};
use crate::{ExprId, ExprRange, Span};

/// Contiguous storage for a unit's expressions and argument lists.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    expr_lists: Vec<ExprId>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression, returning its ID.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "arena sizes never exceed u32"
    )]
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    /// Allocate a list of expression IDs (call arguments).
    ///
    /// # Panics
    /// Panics if the list is longer than `u16::MAX`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "arena sizes never exceed u32"
    )]
    pub fn alloc_expr_list(&mut self, ids: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = self.expr_lists.len();
        self.expr_lists.extend(ids);
        let len = self.expr_lists.len() - start;
        let len = u16::try_from(len)
            .unwrap_or_else(|_| panic!("expression list of {len} elements exceeds u16::MAX"));
        ExprRange::new(start as u32, len)
    }

    #[inline]
    pub fn get_expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.exprs[id.index()].span
    }

    pub fn get_expr_list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        &self.expr_lists[start..start + range.len()]
    }

    /// Whether `id` refers to an allocated expression.
    #[inline]
    pub fn contains(&self, id: ExprId) -> bool {
        id.index() < self.exprs.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}
