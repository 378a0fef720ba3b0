//! Declaration literals: module-level variables as syntax trees.
//!
//! Passes that emit IR text rather than building an LLVM module describe
//! runtime type information with these nodes. A node tree prints the LLVM 17
//! assembly of the global it denotes, and `kiln_llvm` lowers it into a module
//! the same way it lowers the values it builds directly.

use std::fmt::{self, Display, Formatter};

/// Symbol linkage of a declared global.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Linkage {
    #[default]
    External,
    /// Merged across units; every copy must be identical.
    LinkOnceOdr,
}

/// A type as written in a declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeNode {
    Int(u32),
    /// Pointer to the given pointee. Pointers print opaque (`ptr`); the
    /// pointee types the global an address refers to.
    Pointer(Box<TypeNode>),
    Array { elem: Box<TypeNode>, len: u32 },
    Structure(Vec<TypeNode>),
}

impl TypeNode {
    pub fn i8() -> Self {
        TypeNode::Int(8)
    }

    pub fn i32() -> Self {
        TypeNode::Int(32)
    }

    /// Pointer to one byte: the address of an identity cell.
    pub fn byte_ptr() -> Self {
        TypeNode::Pointer(Box::new(TypeNode::i8()))
    }
}

/// A constant operand.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    IntLit { ty: TypeNode, value: i64 },
    /// Address of a global; `ty` is the pointer type.
    Variable { name: String, ty: TypeNode },
    ArrayLit { elem: TypeNode, elems: Vec<TypedOperand> },
    StructLit { fields: Vec<TypedOperand> },
}

/// An operand with its type written out, as aggregate elements appear.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypedOperand {
    pub ty: TypeNode,
    pub operand: Operand,
}

impl TypedOperand {
    pub fn new(ty: TypeNode, operand: Operand) -> Self {
        TypedOperand { ty, operand }
    }
}

/// A module-level variable declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalVarDecl {
    pub name: String,
    /// Declared here, defined in another unit.
    pub is_extern: bool,
    pub linkage: Linkage,
    pub is_constant: bool,
    pub ty: TypeNode,
    pub init: Option<Operand>,
}

impl GlobalVarDecl {
    /// Initializer as emitted. Extern declarations drop theirs.
    pub fn initializer(&self) -> Option<&Operand> {
        self.init.as_ref().filter(|_| !self.is_extern)
    }

    /// Linkage as emitted. Extern declarations are always external.
    pub fn effective_linkage(&self) -> Linkage {
        if self.initializer().is_some() {
            self.linkage
        } else {
            Linkage::External
        }
    }
}

impl Display for Linkage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Linkage::External => Ok(()),
            Linkage::LinkOnceOdr => f.write_str("linkonce_odr"),
        }
    }
}

impl Display for TypeNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Int(bits) => write!(f, "i{bits}"),
            TypeNode::Pointer(_) => f.write_str("ptr"),
            TypeNode::Array { elem, len } => write!(f, "[{len} x {elem}]"),
            TypeNode::Structure(fields) if fields.is_empty() => f.write_str("{}"),
            TypeNode::Structure(fields) => {
                f.write_str("{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(" }")
            }
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operand::IntLit { value, .. } => write!(f, "{value}"),
            Operand::Variable { name, .. } => write!(f, "@{name}"),
            Operand::ArrayLit { elems, .. } => {
                f.write_str("[")?;
                write_list(f, elems)?;
                f.write_str("]")
            }
            Operand::StructLit { fields } => {
                f.write_str("{ ")?;
                write_list(f, fields)?;
                f.write_str(" }")
            }
        }
    }
}

fn write_list(f: &mut Formatter<'_>, items: &[TypedOperand]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{} {}", item.ty, item.operand)?;
    }
    Ok(())
}

impl Display for GlobalVarDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "@{} = ", self.name)?;
        match self.initializer() {
            None => f.write_str("external ")?,
            Some(_) if self.linkage != Linkage::External => write!(f, "{} ", self.linkage)?,
            Some(_) => {}
        }
        let kind = if self.is_constant { "constant" } else { "global" };
        write!(f, "{kind} {}", self.ty)?;
        if let Some(init) = self.initializer() {
            write!(f, " {init}")?;
        }
        Ok(())
    }
}
