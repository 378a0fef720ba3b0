//! Flat AST types using arena allocation.
//!
//! - No `Box<Expr>`, use `ExprId(u32)` indices
//! - Contiguous arrays for cache locality
//!
//! # Module Structure
//!
//! - `expr`: Core expression types (`Expr`, `ExprKind`)
//! - `items`: Unit-level items (`CompilationUnit`, `ClassDecl`, members)

mod expr;
mod items;

pub use expr::{Expr, ExprKind};
pub use items::{
    ClassBody, ClassDecl, ClassKind, CompilationUnit, FieldDecl, Member, MethodDecl,
    ModifierFlags, Param, ParsedType,
};
