use pretty_assertions::assert_eq;

use kiln_types::InterfaceClosure;

use super::*;
use crate::test_helpers::Lattice;

fn ids_of(decl: &GlobalVarDecl) -> Vec<String> {
    let Some(Operand::StructLit { fields }) = &decl.init else {
        panic!("descriptor without struct initializer: {decl}");
    };
    let Operand::ArrayLit { elems, .. } = &fields[1].operand else {
        panic!("descriptor without ids array: {decl}");
    };
    elems
        .iter()
        .map(|e| match &e.operand {
            Operand::Variable { name, .. } => name.clone(),
            other => panic!("unexpected id {other:?}"),
        })
        .collect()
}

fn count_of(decl: &GlobalVarDecl) -> i64 {
    match &decl.init {
        Some(Operand::StructLit { fields }) => match fields[0].operand {
            Operand::IntLit { value, .. } => value,
            ref other => panic!("unexpected count {other:?}"),
        },
        other => panic!("unexpected initializer {other:?}"),
    }
}

#[test]
fn defining_cell_literal_is_zero_byte_constant() {
    let (lattice, [.., a, _]) = Lattice::b_extends_a();
    let cx = lattice.cx();

    let decl = cx.class_id_decl(a, true).unwrap();
    assert_eq!(decl.to_string(), "@_kiln_cid$A = constant i8 0");
    let decl = cx.class_id_decl(a, false).unwrap();
    assert_eq!(decl.to_string(), "@_kiln_cid$A = external constant i8");
    assert!(decl.is_extern);
}

#[test]
fn cell_variable_is_byte_pointer() {
    let (lattice, [.., a, _]) = Lattice::b_extends_a();
    let cx = lattice.cx();

    assert_eq!(
        cx.class_id_var(a).unwrap(),
        TypedOperand::new(
            TypeNode::byte_ptr(),
            Operand::Variable {
                name: "_kiln_cid$A".into(),
                ty: TypeNode::byte_ptr(),
            },
        )
    );
}

#[test]
fn descriptor_of_b_lists_chain_then_interfaces() {
    let (lattice, [.., b]) = Lattice::b_extends_a();
    let cx = lattice.cx();

    let decl = cx.class_obj_decl(b).unwrap();
    assert_eq!(count_of(&decl), 5);
    assert_eq!(
        ids_of(&decl),
        [
            "_kiln_cid$B",
            "_kiln_cid$A",
            "_kiln_cid$Object",
            "_kiln_cid$I1",
            "_kiln_cid$I2"
        ]
    );
    assert_eq!(decl.ty, descriptor_type_node(5));
    assert_eq!(decl.linkage, Linkage::LinkOnceOdr);
    assert!(decl.is_constant);
    assert!(!decl.is_extern);
    assert_eq!(
        decl.to_string(),
        "@_kiln_cobj$B = linkonce_odr constant { i32, [5 x ptr] } \
         { i32 5, [5 x ptr] [ptr @_kiln_cid$B, ptr @_kiln_cid$A, ptr @_kiln_cid$Object, \
         ptr @_kiln_cid$I1, ptr @_kiln_cid$I2] }"
    );
}

#[test]
fn root_descriptor_lists_only_itself() {
    let lattice = Lattice::new();
    let cx = lattice.cx();

    let decl = cx.class_obj_decl(lattice.object()).unwrap();
    assert_eq!(count_of(&decl), 1);
    assert_eq!(ids_of(&decl), ["_kiln_cid$Object"]);
}

#[test]
fn transitive_closure_appends_inherited_interfaces() {
    let mut lattice = Lattice::new();
    let object = lattice.object();
    let base = lattice.iface("Base", &[]);
    let derived = lattice.iface("Derived", &[base]);
    let a = lattice.class("A", object, &[derived]);
    let b = lattice.class("B", a, &[]);

    assert_eq!(
        ids_of(&lattice.cx().class_obj_decl(b).unwrap()),
        ["_kiln_cid$B", "_kiln_cid$A", "_kiln_cid$Object"]
    );

    lattice.config = lattice
        .config
        .clone()
        .with_interface_closure(InterfaceClosure::Transitive);
    let cx = lattice.cx();
    assert_eq!(
        ids_of(&cx.class_obj_decl(b).unwrap()),
        [
            "_kiln_cid$B",
            "_kiln_cid$A",
            "_kiln_cid$Object",
            "_kiln_cid$Derived",
            "_kiln_cid$Base"
        ]
    );
    assert_eq!(cx.descriptor_length(b), Ok(5));
}

#[test]
fn descriptor_count_fits_its_field() {
    let lattice = Lattice::new();
    let cx = lattice.cx();
    let object = lattice.object();

    assert_eq!(cx.descriptor_count(object, 3), Ok(3));
    assert_eq!(
        cx.descriptor_count(object, usize::MAX),
        Err(CodegenError::DescriptorTooLarge {
            symbol: "_kiln_cobj$Object".into(),
            len: usize::MAX,
        })
    );
}

#[test]
fn nested_type_symbols_use_binary_name() {
    let mut lattice = Lattice::new();
    let object = lattice.object();
    let outer = lattice.class("Outer", object, &[]);
    let inner = lattice.nested(outer, "Inner");
    let leaf = lattice.nested(inner, "Leaf");

    let cx = lattice.cx();
    assert_eq!(cx.binary_name(leaf), Ok("Outer$Inner$Leaf"));
    assert_eq!(
        cx.class_id_symbol(leaf).unwrap(),
        "_kiln_cid$Outer$24Inner$24Leaf"
    );
    assert_eq!(
        cx.class_obj_symbol(leaf).unwrap(),
        "_kiln_cobj$Outer$24Inner$24Leaf"
    );
}

#[test]
fn unknown_type_is_reported() {
    let lattice = Lattice::new();
    let cx = lattice.cx();
    let bogus = kiln_types::TypeIdx::from_raw(99);

    assert_eq!(
        cx.class_id_decl(bogus, true),
        Err(CodegenError::Hierarchy(kiln_types::HierarchyError::UnknownType(bogus)))
    );
    assert_eq!(
        cx.class_obj_decl(bogus),
        Err(CodegenError::Hierarchy(kiln_types::HierarchyError::UnknownType(bogus)))
    );
}
