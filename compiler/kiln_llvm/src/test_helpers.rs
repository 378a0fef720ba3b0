//! Shared fixtures for unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use kiln_codegen::{CodegenConfig, CodegenCx};
use kiln_ir::{Name, StringInterner};
use kiln_types::{ClassDef, ClassRegistry, FieldSig, MethodSig, TypeIdx, ValueType};

/// A registry rooted at `Object`, with helpers to grow the lattice.
pub struct Lattice {
    pub interner: StringInterner,
    pub registry: ClassRegistry,
    pub config: CodegenConfig,
}

impl Lattice {
    pub fn new() -> Self {
        let interner = StringInterner::new();
        let mut registry = ClassRegistry::new();
        let object = interner.intern("Object");
        registry
            .define(ClassDef::class(object, object), &interner)
            .unwrap();
        Lattice {
            interner,
            registry,
            config: CodegenConfig::default(),
        }
    }

    pub fn cx(&self) -> CodegenCx<'_> {
        CodegenCx::new(&self.registry, &self.interner, &self.config)
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn object(&self) -> TypeIdx {
        self.registry.root().unwrap()
    }

    pub fn class(&mut self, name: &str, sup: TypeIdx, ifaces: &[TypeIdx]) -> TypeIdx {
        let n = self.name(name);
        let mut def = ClassDef::class(n, n).extends(sup);
        for &i in ifaces {
            def = def.implements(i);
        }
        self.registry.define(def, &self.interner).unwrap()
    }

    pub fn iface(&mut self, name: &str) -> TypeIdx {
        let n = self.name(name);
        self.registry
            .define(ClassDef::interface(n, n), &self.interner)
            .unwrap()
    }

    /// `Outer.simple`, nested in `outer`.
    pub fn nested(&mut self, outer: TypeIdx, simple: &str) -> TypeIdx {
        let outer_name = self.interner.lookup(self.registry.get(outer).unwrap().full_name);
        let full = self.name(&format!("{outer_name}.{simple}"));
        let simple = self.name(simple);
        let object = self.object();
        self.registry
            .define(ClassDef::class(full, simple).extends(object).nested_in(outer), &self.interner)
            .unwrap()
    }

    pub fn static_method(&mut self, class: TypeIdx, name: &str, params: &[ValueType], ret: ValueType) {
        let sig = MethodSig {
            name: self.name(name),
            params: params.to_vec(),
            ret,
            is_static: true,
        };
        self.registry.add_method(class, sig).unwrap();
    }

    pub fn static_field(&mut self, class: TypeIdx, name: &str, ty: ValueType) {
        let field = FieldSig {
            name: self.name(name),
            ty,
            is_static: true,
        };
        self.registry.add_field(class, field, &self.interner).unwrap();
    }

    /// `B extends A implements I1, I2`, `A extends Object`.
    pub fn b_extends_a() -> (Self, [TypeIdx; 5]) {
        let mut lattice = Lattice::new();
        let object = lattice.object();
        let i1 = lattice.iface("I1");
        let i2 = lattice.iface("I2");
        let a = lattice.class("A", object, &[]);
        let b = lattice.class("B", a, &[i1, i2]);
        (lattice, [object, i1, i2, a, b])
    }
}
