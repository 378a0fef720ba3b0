//! Kiln IR - core data structures shared by every compiler phase.
//!
//! This crate contains:
//! - Spans for source locations
//! - Names for interned identifiers and qualified names
//! - AST nodes (`CompilationUnit`, `ClassDecl`, `Expr`, ...)
//! - Arena allocation for expressions
//! - Explicit post-order traversal
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → `Name(u32)`
//! - **Flatten Everything**: No `Box<Expr>`, use `ExprId(u32)` indices
//! - **Close the Node Set**: `ExprKind` is an enum; passes match on it

mod arena;
pub mod ast;
mod expr_id;
mod interner;
mod name;
mod span;
pub mod visitor;

pub use arena::ExprArena;
pub use ast::{
    ClassBody, ClassDecl, ClassKind, CompilationUnit, Expr, ExprKind, FieldDecl, Member,
    MethodDecl, ModifierFlags, Param, ParsedType,
};
pub use expr_id::{ExprId, ExprRange};
pub use interner::{InternError, StringInterner};
pub use name::Name;
pub use span::Span;
