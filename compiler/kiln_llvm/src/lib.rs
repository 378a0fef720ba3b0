//! LLVM backend for Kiln runtime type information.
//!
//! This crate lowers Kiln compilation units to LLVM modules through
//! `inkwell`. It builds identity cells and class-object descriptors as LLVM
//! constants, lowers `instanceof` to a call into the runtime, and checks the
//! cell one-definition rule across a whole program.
//!
//! # Debug Environment Variables
//!
//! - `KILN_DEBUG_IR`: Log every lowered module at debug level.
//!   Example: `KILN_DEBUG_IR=1 RUST_LOG=kiln_llvm=debug cargo test`
//!
//! - `RUST_LOG=kiln_llvm=trace`: Follow class, cell and `instanceof`
//!   lowering step by step.
//!
//! # Architecture
//!
//! - **Context hierarchy** (`context.rs`): `SimpleCx` → `UnitCx`
//! - **Declare** (`declare.rs`): get-or-add of globals and functions
//! - **RTTI** (`rtti/`): identity cells and descriptors as LLVM values
//! - **Literals** (`literal/`): declaration literals lowered into a module
//! - **Lowering** (`lower/`): post-order expression lowering
//! - **Drivers** (`unit/`, `program/`): one unit per module, units in parallel
//!
//! # Building
//!
//! Requires LLVM 17. The crate is excluded from the workspace; build it with
//! `cargo test --manifest-path compiler/kiln_llvm/Cargo.toml`.

// LLVM constants take u64; Kiln integers are i64
#![allow(clippy::cast_sign_loss)]

pub mod context;
mod declare;
pub mod literal;
pub mod lower;
pub mod program;
pub mod rtti;
pub mod runtime_decl;
pub mod unit;

#[cfg(test)]
mod test_helpers;

pub use context::{SimpleCx, UnitCx};
pub use lower::{ExprLowerer, Translations, Typed};
pub use program::{compile_program, global_records, Program, UnitIr};
pub use runtime_decl::declare_instanceof;
pub use unit::{compile_unit, CompiledUnit};
