//! Class-object field injection.
//!
//! Every class body gets a new first member:
//!
//! ```text
//! public static final kiln.lang.Class class$ = kiln.lang.Class.forName("pkg.Outer$Inner");
//! ```
//!
//! The string is the class's binary name, which is what the runtime
//! lookup keys on. Interfaces are left alone.

use kiln_ir::{
    ClassDecl, ClassKind, Expr, ExprArena, ExprKind, FieldDecl, Member, ModifierFlags, Name,
    ParsedType, StringInterner,
};
use kiln_types::{ClassRegistry, FieldSig, HierarchyError, TypeIdx, ValueType};

/// Names the injected field and its initializer refer to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClassObjectConfig {
    /// Fully qualified name of the reflection-handle class.
    pub reflection_class: Name,
    /// Static lookup method on the reflection class: `(String) -> Class`.
    pub lookup_method: Name,
    /// Reserved name of the injected field.
    pub field_name: Name,
}

impl ClassObjectConfig {
    pub const DEFAULT_REFLECTION_CLASS: &'static str = "kiln.lang.Class";
    pub const DEFAULT_LOOKUP_METHOD: &'static str = "forName";
    pub const DEFAULT_FIELD_NAME: &'static str = "class$";

    /// The standard library's names.
    pub fn new(interner: &StringInterner) -> Self {
        ClassObjectConfig {
            reflection_class: interner.intern(Self::DEFAULT_REFLECTION_CLASS),
            lookup_method: interner.intern(Self::DEFAULT_LOOKUP_METHOD),
            field_name: interner.intern(Self::DEFAULT_FIELD_NAME),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DesugarError {
    #[error("reflection class `{name}` is not registered")]
    MissingReflectionClass { name: String },

    #[error("`{class}` has no static method `{method}(String)` returning `{class}`")]
    MissingLookupMethod { class: String, method: String },

    #[error("`{class}` declares a member named `{field}`, which is reserved for its class object")]
    ReservedFieldName { class: String, field: String },

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

/// Inject the class-object field into every class body of a unit.
///
/// Nested class bodies are visited too. The injected field is also added
/// to the registry so later phases can resolve `C.class$`. Returns the
/// number of fields injected.
pub fn declare_class_objects(
    unit: &mut kiln_ir::CompilationUnit,
    registry: &mut ClassRegistry,
    interner: &StringInterner,
    config: &ClassObjectConfig,
) -> Result<usize, DesugarError> {
    let reflection = check_lookup_method(registry, interner, config)?;
    let mut pass = DeclareClassObjects {
        arena: &mut unit.arena,
        registry,
        interner,
        config,
        reflection,
        injected: 0,
    };
    for decl in &mut unit.classes {
        pass.class_decl(decl)?;
    }
    Ok(pass.injected)
}

/// The reflection class must exist and offer `static Class forName(String)`.
fn check_lookup_method(
    registry: &ClassRegistry,
    interner: &StringInterner,
    config: &ClassObjectConfig,
) -> Result<TypeIdx, DesugarError> {
    let class_name = || interner.lookup(config.reflection_class).to_owned();
    let reflection = registry
        .lookup_full_name(config.reflection_class)
        .ok_or_else(|| DesugarError::MissingReflectionClass { name: class_name() })?;

    let found = registry
        .find_method(reflection, config.lookup_method)?
        .is_some_and(|sig| {
            sig.is_static && sig.params == [ValueType::Str] && sig.ret == ValueType::Ref(reflection)
        });
    if !found {
        return Err(DesugarError::MissingLookupMethod {
            class: class_name(),
            method: interner.lookup(config.lookup_method).to_owned(),
        });
    }
    Ok(reflection)
}

struct DeclareClassObjects<'a> {
    arena: &'a mut ExprArena,
    registry: &'a mut ClassRegistry,
    interner: &'a StringInterner,
    config: &'a ClassObjectConfig,
    reflection: TypeIdx,
    injected: usize,
}

impl DeclareClassObjects<'_> {
    fn class_decl(&mut self, decl: &mut ClassDecl) -> Result<(), DesugarError> {
        for member in &mut decl.body.members {
            if let Member::Class(nested) = member {
                self.class_decl(nested)?;
            }
        }
        if decl.kind == ClassKind::Class {
            self.inject(decl)?;
        }
        Ok(())
    }

    fn inject(&mut self, decl: &mut ClassDecl) -> Result<(), DesugarError> {
        let field_name = self.config.field_name;
        let reserved = decl.body.members.iter().any(|member| match member {
            Member::Field(f) => f.name == field_name,
            Member::Method(m) => m.name == field_name,
            Member::Class(_) => false,
        });
        if reserved {
            return Err(DesugarError::ReservedFieldName {
                class: self.interner.lookup(decl.name).to_owned(),
                field: self.interner.lookup(field_name).to_owned(),
            });
        }

        let ty = self.registry.resolve_name(decl.name, self.interner)?;
        let binary_name = self.registry.binary_name(ty)?;
        let span = decl.span;

        let name_lit = self.arena.alloc_expr(Expr::new(ExprKind::Str(binary_name), span));
        let args = self.arena.alloc_expr_list([name_lit]);
        let init = self.arena.alloc_expr(Expr::new(
            ExprKind::StaticCall {
                class: self.config.reflection_class,
                method: self.config.lookup_method,
                args,
            },
            span,
        ));

        decl.body.members.insert(
            0,
            Member::Field(FieldDecl {
                name: field_name,
                ty: ParsedType::Named(self.config.reflection_class),
                flags: ModifierFlags::PUBLIC | ModifierFlags::STATIC | ModifierFlags::FINAL,
                init: Some(init),
                span,
            }),
        );
        self.registry.add_field(
            ty,
            FieldSig {
                name: field_name,
                ty: ValueType::Ref(self.reflection),
                is_static: true,
            },
            self.interner,
        )?;

        tracing::debug!(
            class = self.interner.lookup(decl.name),
            binary = self.interner.lookup(binary_name),
            "declared class object field"
        );
        self.injected += 1;
        Ok(())
    }
}
