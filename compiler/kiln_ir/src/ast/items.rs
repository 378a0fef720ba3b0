//! Unit-level items: compilation units, class declarations, and members.

use bitflags::bitflags;

use crate::{ExprArena, ExprId, Name, Span};

bitflags! {
    /// Declaration modifiers on a class member.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ModifierFlags: u8 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const STATIC = 1 << 2;
        const FINAL = 1 << 3;
    }
}

impl ModifierFlags {
    #[inline]
    pub fn is_static(self) -> bool {
        self.contains(ModifierFlags::STATIC)
    }
}

/// Whether a reference type is a class or an interface.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ClassKind {
    Class,
    Interface,
}

/// A type as written in source, before resolution against the registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParsedType {
    Void,
    Bool,
    Int,
    Str,
    /// A reference type, by fully qualified name.
    Named(Name),
}

/// One source file's worth of declarations.
#[derive(Clone, Debug)]
pub struct CompilationUnit {
    /// Unit name, used in diagnostics and for the definition ledger.
    pub name: Name,
    /// Top-level type declarations, in source order.
    pub classes: Vec<ClassDecl>,
    /// Storage for every expression in the unit.
    pub arena: ExprArena,
}

impl CompilationUnit {
    pub fn new(name: Name) -> Self {
        CompilationUnit {
            name,
            classes: Vec::new(),
            arena: ExprArena::new(),
        }
    }
}

/// A class or interface declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDecl {
    /// Fully qualified source name (`pkg.Outer.Inner`).
    pub name: Name,
    pub kind: ClassKind,
    pub body: ClassBody,
    pub span: Span,
}

/// The member list of a class or interface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassBody {
    pub members: Vec<Member>,
}

/// A member of a class body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    /// Nested type declaration.
    Class(ClassDecl),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: ParsedType,
    pub flags: ModifierFlags,
    pub init: Option<ExprId>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: Name,
    pub ty: ParsedType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: Name,
    pub flags: ModifierFlags,
    pub params: Vec<Param>,
    pub ret: ParsedType,
    /// Body expression; `None` for abstract and native methods.
    pub body: Option<ExprId>,
    pub span: Span,
}
