//! Runtime type information: identity cells and class-object descriptors.
//!
//! # Identity cells
//!
//! Every reference type owns a one-byte constant global, its identity
//! cell. The cell's address is the type's runtime identity; its contents
//! are never read. Exactly one unit in a program defines a given cell (the
//! unit that declares the type); every other unit declares it external.
//!
//! # Descriptors
//!
//! The class object of a type `T` is a constant
//!
//! ```text
//! { i32 count, [count x ptr] ids }
//! ```
//!
//! where `ids` holds the identity-cell addresses of
//! [`ClassRegistry::descriptor_entries`](kiln_types::ClassRegistry::descriptor_entries):
//! `T`, its ancestors up to the root, then its interfaces. The runtime
//! answers `x instanceof S` by scanning the descriptor of `x`'s dynamic type
//! for the address of `S`'s cell.
//!
//! This module holds the literal builders ([`CodegenCx::class_id_decl`],
//! [`CodegenCx::class_obj_decl`]). The value builders live in `kiln_llvm`
//! and walk the same [`CodegenCx::descriptor_entries`], so both lower to
//! identical globals.

use kiln_types::{TypeIdx, TypeList};

use crate::context::CodegenCx;
use crate::decl::{GlobalVarDecl, Linkage, Operand, TypeNode, TypedOperand};
use crate::CodegenError;

/// `{ i32, [len x ptr] }` as a declaration type.
pub fn descriptor_type_node(len: u32) -> TypeNode {
    TypeNode::Structure(vec![
        TypeNode::i32(),
        TypeNode::Array {
            elem: Box::new(TypeNode::byte_ptr()),
            len,
        },
    ])
}

impl CodegenCx<'_> {
    /// Symbol of the identity cell of `ty`.
    pub fn class_id_symbol(&self, ty: TypeIdx) -> Result<String, CodegenError> {
        Ok(self.mangler.class_id_name(self.binary_name(ty)?))
    }

    /// Symbol of the class-object descriptor of `ty`.
    pub fn class_obj_symbol(&self, ty: TypeIdx) -> Result<String, CodegenError> {
        Ok(self.mangler.class_obj_name(self.binary_name(ty)?))
    }

    /// Declaration literal of the identity cell of `ty`.
    pub fn class_id_decl(&self, ty: TypeIdx, defining: bool) -> Result<GlobalVarDecl, CodegenError> {
        Ok(GlobalVarDecl {
            name: self.class_id_symbol(ty)?,
            is_extern: !defining,
            linkage: Linkage::External,
            is_constant: true,
            ty: TypeNode::i8(),
            init: defining.then(|| Operand::IntLit {
                ty: TypeNode::i8(),
                value: 0,
            }),
        })
    }

    /// Declaration-literal operand addressing the identity cell of `ty`.
    pub fn class_id_var(&self, ty: TypeIdx) -> Result<TypedOperand, CodegenError> {
        Ok(TypedOperand::new(
            TypeNode::byte_ptr(),
            Operand::Variable {
                name: self.class_id_symbol(ty)?,
                ty: TypeNode::byte_ptr(),
            },
        ))
    }

    /// Types listed by the descriptor of `ty`, under the configured
    /// interface closure.
    pub fn descriptor_entries(&self, ty: TypeIdx) -> Result<TypeList, CodegenError> {
        Ok(self
            .registry
            .descriptor_entries(ty, self.config.interface_closure)?)
    }

    /// Entry count of the descriptor of `ty`.
    pub fn descriptor_length(&self, ty: TypeIdx) -> Result<usize, CodegenError> {
        Ok(self
            .registry
            .descriptor_length(ty, self.config.interface_closure)?)
    }

    /// `len` as the descriptor's `i32` count field.
    pub fn descriptor_count(&self, ty: TypeIdx, len: usize) -> Result<u32, CodegenError> {
        i32::try_from(len)
            .ok()
            .and_then(|count| u32::try_from(count).ok())
            .ok_or_else(|| CodegenError::DescriptorTooLarge {
                symbol: self.class_obj_symbol(ty).unwrap_or_default(),
                len,
            })
    }

    /// Declaration literal of the descriptor of `ty`.
    pub fn class_obj_decl(&self, ty: TypeIdx) -> Result<GlobalVarDecl, CodegenError> {
        let entries = self.descriptor_entries(ty)?;
        let count = self.descriptor_count(ty, entries.len())?;

        let ids = entries
            .iter()
            .map(|&entry| self.class_id_var(entry))
            .collect::<Result<Vec<_>, _>>()?;
        let init = Operand::StructLit {
            fields: vec![
                TypedOperand::new(
                    TypeNode::i32(),
                    Operand::IntLit {
                        ty: TypeNode::i32(),
                        value: i64::from(count),
                    },
                ),
                TypedOperand::new(
                    TypeNode::Array {
                        elem: Box::new(TypeNode::byte_ptr()),
                        len: count,
                    },
                    Operand::ArrayLit {
                        elem: TypeNode::byte_ptr(),
                        elems: ids,
                    },
                ),
            ],
        };

        let name = self.class_obj_symbol(ty)?;
        tracing::trace!(symbol = %name, entries = count, "building class object literal");
        Ok(GlobalVarDecl {
            name,
            is_extern: false,
            linkage: Linkage::LinkOnceOdr,
            is_constant: true,
            ty: descriptor_type_node(count),
            init: Some(init),
        })
    }
}

#[cfg(test)]
mod tests;
