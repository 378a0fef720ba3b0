//! Read-only state shared by every unit of a program build.
//!
//! `CodegenCx` borrows the finished class registry and interner; lowering
//! never mutates them, so one context can drive many units in parallel.

use kiln_ir::{Name, StringInterner};
use kiln_types::{ClassRegistry, TypeIdx, ValueType};

use crate::mangle::Mangler;
use crate::{CodegenConfig, CodegenError};

pub struct CodegenCx<'a> {
    pub registry: &'a ClassRegistry,
    pub interner: &'a StringInterner,
    pub config: &'a CodegenConfig,
    pub mangler: Mangler,
}

impl<'a> CodegenCx<'a> {
    pub fn new(
        registry: &'a ClassRegistry,
        interner: &'a StringInterner,
        config: &'a CodegenConfig,
    ) -> Self {
        CodegenCx {
            registry,
            interner,
            config,
            mangler: Mangler::new(),
        }
    }

    #[inline]
    pub fn text(&self, name: Name) -> &'a str {
        self.interner.lookup(name)
    }

    /// Binary name of `ty` as text.
    pub fn binary_name(&self, ty: TypeIdx) -> Result<&'a str, CodegenError> {
        Ok(self.text(self.registry.binary_name(ty)?))
    }

    /// Full source name of `ty` as text, for diagnostics.
    pub fn full_name(&self, ty: TypeIdx) -> Result<&'a str, CodegenError> {
        Ok(self.text(self.registry.get(ty)?.full_name))
    }

    /// Resolve a fully qualified class name.
    pub fn resolve_class(&self, name: Name) -> Result<TypeIdx, CodegenError> {
        Ok(self.registry.resolve_name(name, self.interner)?)
    }

    /// Source spelling of a value type, for diagnostics.
    pub fn type_text(&self, ty: ValueType) -> String {
        match ty {
            ValueType::Void => "void".to_owned(),
            ValueType::Bool => "boolean".to_owned(),
            ValueType::Int => "int".to_owned(),
            ValueType::Str => "string".to_owned(),
            ValueType::Ref(class) => self
                .full_name(class)
                .map_or_else(|_| format!("{class:?}"), str::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use kiln_types::{TypeIdx, ValueType};

    use crate::test_helpers::Lattice;

    #[test]
    fn type_text_names_classes_by_source_name() {
        let (lattice, [.., b]) = Lattice::b_extends_a();
        let cx = lattice.cx();
        assert_eq!(cx.type_text(ValueType::Ref(b)), "B");
        assert_eq!(cx.type_text(ValueType::Bool), "boolean");
        assert_eq!(cx.type_text(ValueType::Str), "string");
        assert_eq!(
            cx.type_text(ValueType::Ref(TypeIdx::from_raw(99))),
            format!("{:?}", TypeIdx::from_raw(99))
        );
    }
}
