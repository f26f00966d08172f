//! Integration tests for the universal `Value` properties (spec.md
//! section 8): totality of `is_null`/`kind`, `size_of` defined for every
//! non-`Null` value, and the polymorphic-setter no-op law on non-mappable
//! kinds.

use std::rc::Rc;

use pvm_core::{ArgType, ClosureData, EntryPoint, Kind, TypeDesc, Value};

fn sample_values() -> Vec<Value> {
    vec![
        Value::null(),
        Value::make_int(-7, 16).unwrap(),
        Value::make_uint(200, 8).unwrap(),
        Value::make_long(-1, 48).unwrap(),
        Value::make_ulong(12345, 40).unwrap(),
        Value::make_string(b"hola"),
        Value::make_array(3, Rc::new(TypeDesc::Int { width: 32 })),
        Value::make_struct(
            Rc::new(TypeDesc::Struct {
                name: None,
                fields: vec![],
            }),
            0,
            0,
        ),
        Value::make_type(Rc::new(TypeDesc::Any)),
        Value::make_offset(Value::make_uint(4, 32).unwrap(), 8).unwrap(),
        Value::make_closure(
            EntryPoint(0),
            Rc::from(Vec::<Value>::new()),
            Rc::new(TypeDesc::Closure {
                return_type: Rc::new(TypeDesc::Int { width: 32 }),
                args: Vec::<ArgType>::new(),
            }),
        ),
    ]
}

#[test]
fn is_null_and_kind_are_total() {
    for v in sample_values() {
        let k = v.kind();
        assert_eq!(v.is_null(), k == Kind::Null);
    }
}

#[test]
fn size_of_is_defined_for_every_non_null_value() {
    for v in sample_values() {
        match v.size_of() {
            None => assert!(v.is_null(), "only Null may have no size"),
            Some(_) => assert!(!v.is_null()),
        }
    }
}

#[test]
fn size_of_integrals_equals_declared_width() {
    assert_eq!(Value::make_int(1, 9).unwrap().size_of(), Some(9));
    assert_eq!(Value::make_uint(1, 17).unwrap().size_of(), Some(17));
    assert_eq!(Value::make_long(1, 40).unwrap().size_of(), Some(40));
    assert_eq!(Value::make_ulong(1, 64).unwrap().size_of(), Some(64));
}

#[test]
fn size_of_string_is_byte_length_plus_nul_in_bits() {
    let s = Value::make_string(b"abc");
    assert_eq!(s.size_of(), Some(8 * 4));
    assert_eq!(s.elem_count(), 3);
}

#[test]
fn setters_are_total_no_ops_on_non_mappable_kinds() {
    for v in sample_values() {
        if v.is_mappable() {
            continue;
        }
        v.set_mapper(Value::make_int(1, 32).unwrap());
        v.set_writer(Value::make_int(1, 32).unwrap());
        v.set_offset(Value::make_int(1, 32).unwrap());
        v.set_ios(Value::make_int(1, 32).unwrap());
        v.set_elems_bound(Value::make_int(1, 32).unwrap());
        v.set_size_bound(Value::make_int(1, 32).unwrap());

        assert!(v.mapper().is_null());
        assert!(v.writer().is_null());
        assert!(v.offset().is_null());
        assert!(v.ios().is_null());
        assert!(v.elems_bound().is_null());
        assert!(v.size_bound().is_null());
    }
}

#[test]
fn array_mapping_fields_round_trip() {
    let arr = Value::make_array(2, Rc::new(TypeDesc::Int { width: 8 }));
    assert!(!arr.as_array().unwrap().is_mapped());

    let ios = Value::make_int(3, 32).unwrap();
    arr.set_ios(ios.clone());
    arr.set_offset(Value::make_uint(0, 64).unwrap());
    arr.set_elems_bound(Value::make_uint(2, 64).unwrap());

    assert_eq!(arr.ios(), ios);
    assert!(arr.as_array().unwrap().is_mapped());
    assert!(arr.size_bound().is_null());
}

#[test]
fn clone_shares_the_box_array_identity_is_preserved() {
    let arr = Value::make_array(1, Rc::new(TypeDesc::Int { width: 8 }));
    let arr2 = arr.clone();
    arr.set_ios(Value::make_int(9, 32).unwrap());
    assert_eq!(arr2.ios(), Value::make_int(9, 32).unwrap());
    assert_eq!(arr, arr2);
}

#[test]
fn type_of_round_trips_for_integrals_and_offsets() {
    let i = Value::make_int(1, 12).unwrap();
    let ty = i.type_of();
    assert_eq!(format!("{}", ty.as_type().unwrap()), "int<12>");

    let off = Value::make_offset(Value::make_uint(0, 64).unwrap(), 8).unwrap();
    let ty = off.type_of();
    assert_eq!(format!("{}", ty.as_type().unwrap()), "offset<uint<64>, 8>");
}

#[test]
fn closure_data_eq_ignores_captured_contents_but_not_identity() {
    let ty = Rc::new(TypeDesc::Closure {
        return_type: Rc::new(TypeDesc::Int { width: 32 }),
        args: vec![],
    });
    let captured: Rc<[Value]> = Rc::from(Vec::<Value>::new());
    let a = ClosureData {
        entry: EntryPoint(4),
        captured: captured.clone(),
        ty: ty.clone(),
    };
    let b = ClosureData {
        entry: EntryPoint(4),
        captured,
        ty,
    };
    assert_eq!(a, b);
}
