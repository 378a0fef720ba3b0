//! Code generation options.

use kiln_types::InterfaceClosure;

/// Environment variable that turns on IR dumps at `debug` level.
pub const DEBUG_IR_ENV: &str = "KILN_DEBUG_IR";

/// Default symbol of the runtime subtype test, `i1 (ptr, ptr)`.
pub const DEFAULT_INSTANCEOF: &str = "instanceof";

/// Options shared by every unit of one program build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodegenConfig {
    /// Which interfaces descriptors list after the ancestor chain.
    pub interface_closure: InterfaceClosure,
    /// Symbol of the runtime function that answers `instanceof`.
    pub runtime_instanceof: String,
    /// Log each finished module at `debug` level.
    pub dump_ir: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        CodegenConfig {
            interface_closure: InterfaceClosure::default(),
            runtime_instanceof: DEFAULT_INSTANCEOF.to_owned(),
            dump_ir: false,
        }
    }
}

impl CodegenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with `dump_ir` set when `KILN_DEBUG_IR` is present.
    pub fn from_env() -> Self {
        CodegenConfig {
            dump_ir: std::env::var_os(DEBUG_IR_ENV).is_some(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_interface_closure(mut self, closure: InterfaceClosure) -> Self {
        self.interface_closure = closure;
        self
    }

    #[must_use]
    pub fn with_runtime_instanceof(mut self, symbol: impl Into<String>) -> Self {
        self.runtime_instanceof = symbol.into();
        self
    }

    #[must_use]
    pub fn with_dump_ir(mut self, dump_ir: bool) -> Self {
        self.dump_ir = dump_ir;
        self
    }
}
