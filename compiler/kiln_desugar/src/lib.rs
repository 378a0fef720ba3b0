//! Desugaring passes for the Kiln compiler.
//!
//! Passes here rewrite the arena AST of one [`CompilationUnit`] in place,
//! before code generation sees it. Each pass owns one construct:
//!
//! - [`declare_class_objects`]: give every class a static field holding
//!   its runtime class object.
//!
//! [`CompilationUnit`]: kiln_ir::CompilationUnit

mod class_objects;

pub use class_objects::{declare_class_objects, ClassObjectConfig, DesugarError};
