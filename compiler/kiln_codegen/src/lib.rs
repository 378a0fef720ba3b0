//! Backend-neutral code generation state for Kiln.
//!
//! Everything here is independent of LLVM, so it builds and tests with the
//! rest of the workspace. The `kiln_llvm` crate builds the IR itself on top
//! of it.
//!
//! # Debug Environment Variables
//!
//! - `KILN_DEBUG_IR`: Log every lowered module at `debug` level, via
//!   [`CodegenConfig::from_env`].
//!   Example: `KILN_DEBUG_IR=1 RUST_LOG=kiln_llvm=debug cargo test`
//!
//! - `RUST_LOG=kiln_llvm=trace`: Trace identity cells, descriptors, and
//!   type tests as they are emitted.
//!
//! # Architecture
//!
//! - **Context** (`context.rs`): [`CodegenCx`], the read-only state every
//!   unit shares
//! - **Declaration literals** (`decl/`): runtime type information globals
//!   as syntax trees, printed as LLVM assembly
//! - **RTTI** (`rtti/`): symbols, descriptor entries, and the literal
//!   builders for identity cells and class-object descriptors
//! - **Mangling** (`mangle/`): linker symbols derived from binary names
//! - **Ledger** (`ledger/`): the cross-unit one-definition check for
//!   identity cells

pub mod config;
pub mod context;
pub mod decl;
mod error;
pub mod ledger;
pub mod mangle;
pub mod rtti;

#[cfg(test)]
mod test_helpers;

use std::sync::Once;

pub use config::CodegenConfig;
pub use context::CodegenCx;
pub use error::{CodegenError, IrError, LinkError, ProgramError};
pub use ledger::{DefinitionLedger, GlobalRecord};
pub use mangle::{demangle, Mangler};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing from `RUST_LOG`. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
