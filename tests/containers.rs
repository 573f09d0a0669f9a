//! Tuple, sequence, mapping and text casters through the demonstration module

mod common;

use bridgecast::demo::FloatVec;
use bridgecast::host::{Dict, ErrorKind, Object};
use common::{counted, lettered, module, new, stats, ten, value};
use serial_test::serial;

// ============================================================================
// Tuples
// ============================================================================

#[test]
#[serial]
fn test_tuple_return_moves_element() {
    let m = module();
    let counts = counted(|| {
        let out = m.call("tuple_return_movable", &[]).expect("call");
        let items = out.as_tuple().expect("tuple").to_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(value(&items[0]), 5);
    });
    assert_eq!(counts, stats(1, 0, 0, 1, 2));
}

#[test]
#[serial]
fn test_tuple_arguments() {
    let m = module();
    for (name, copies) in [
        ("tuple_movable_in_value", 1),
        ("tuple_movable_in_lvalue_ref", 0),
        ("tuple_movable_in_lvalue_ref_2", 1),
        ("tuple_movable_in_ptr", 0),
    ] {
        let counts = counted(|| {
            let arg = Object::tuple(vec![new(&m, "Movable", None)]);
            m.call(name, &[arg]).expect("call");
        });
        assert_eq!(counts, stats(1, 0, copies, 0, 1 + copies), "{name}");
    }
}

#[test]
#[serial]
fn test_tuple_rvalue_arguments() {
    let m = module();
    let counts = counted(|| {
        let obj = new(&m, "Movable", None);
        m.call("tuple_movable_in_rvalue_ref", &[Object::tuple(vec![obj.clone()])])
            .expect("call");
        assert_eq!(value(&obj), 0);
    });
    assert_eq!(counts, stats(1, 0, 0, 1, 2));

    let counts = counted(|| {
        let obj = new(&m, "Movable", None);
        m.call("tuple_movable_in_rvalue_ref_2", &[Object::tuple(vec![obj.clone()])])
            .expect("call");
        assert_eq!(value(&obj), 5);
    });
    assert_eq!(counts, stats(1, 0, 1, 1, 3));
}

#[test]
fn test_tuple_values() {
    let m = module();
    let empty = Object::tuple(Vec::new());
    assert_eq!(m.call("empty_tuple", &[empty.clone()]), Ok(empty));

    let pair = Object::tuple(vec![Object::Int(1), Object::Float(2.5)]);
    let swapped = Object::tuple(vec![Object::Float(2.5), Object::Int(1)]);
    assert_eq!(m.call("swap_tuple", &[pair.clone()]), Ok(swapped.clone()));
    // Lists are accepted where a tuple is expected.
    let as_list = Object::list(vec![Object::Int(1), Object::Float(2.5)]);
    assert_eq!(m.call("swap_pair", &[as_list]), Ok(swapped));

    let err = m
        .call("swap_pair", &[Object::tuple(vec![Object::Int(1)])])
        .unwrap_err();
    assert!(err.is_type_error());
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
#[serial]
fn test_vec_returns() {
    let m = module();
    let counts = counted(|| {
        let out = m.call("vec_return_movable", &[]).expect("call");
        let items = out.as_list().expect("list").to_vec();
        let values: Vec<i32> = items.iter().map(value).collect();
        assert_eq!(values, (0..10).collect::<Vec<_>>());
    });
    assert_eq!(counts, stats(0, 10, 0, 10, 20));

    let counts = counted(|| {
        m.call("vec_return_copyable", &[]).expect("call");
    });
    assert_eq!(counts, stats(0, 10, 20, 0, 30));
}

#[test]
#[serial]
fn test_vec_arguments() {
    let m = module();
    for (name, copies) in [
        ("vec_movable_in_value", 10),
        ("vec_movable_in_lvalue_ref", 0),
        ("vec_movable_in_ptr_2", 0),
    ] {
        let counts = counted(|| {
            m.call(name, &[Object::list(ten(&m, "Movable"))]).expect("call");
        });
        assert_eq!(counts, stats(0, 10, copies, 0, 10 + copies), "{name}");
    }

    let counts = counted(|| {
        m.call("vec_copyable_in_value", &[Object::list(ten(&m, "Copyable"))])
            .expect("call");
    });
    assert_eq!(counts, stats(0, 10, 10, 0, 20));
}

#[test]
#[serial]
fn test_vec_rvalue_argument() {
    let m = module();
    let counts = counted(|| {
        let items = ten(&m, "Movable");
        m.call("vec_movable_in_rvalue_ref", &[Object::list(items.clone())])
            .expect("call");
        assert!(items.iter().all(|obj| value(obj) == 0));
    });
    assert_eq!(counts, stats(0, 10, 0, 10, 20));
}

#[test]
#[serial]
fn test_failed_element_constructs_nothing() {
    let m = module();
    let counts = counted(|| {
        let mut items = ten(&m, "Movable");
        items.push(Object::Int(3));
        let err = m.call("vec_movable_in_value", &[Object::list(items)]).unwrap_err();
        assert!(err.is_type_error());
    });
    assert_eq!(counts, stats(0, 10, 0, 0, 10));
}

#[test]
fn test_identity_list() {
    let m = module();
    let list = Object::list(vec![Object::Int(1), Object::Int(2)]);
    let out = m.call("identity_list", &[list.clone()]).expect("call");
    assert_eq!(out, list);
    // A new host list, not the argument.
    assert!(!out.is(&list));
    assert_eq!(
        m.call("identity_list", &[Object::tuple(vec![Object::Int(3)])]),
        Ok(Object::list(vec![Object::Int(3)]))
    );
    assert!(m.call("identity_list", &[Object::Int(3)]).is_err());
    assert!(m.call("identity_list", &[Object::str("12")]).is_err());
}

// ============================================================================
// Mappings
// ============================================================================

#[test]
#[serial]
fn test_map_returns() {
    let m = module();
    for (name, copies, moves) in [
        ("map_return_movable_value", 0, 10),
        ("map_return_copyable_value", 10, 0),
    ] {
        let counts = counted(|| {
            let out = m.call(name, &[]).expect("call");
            let dict = out.as_dict().expect("dict");
            assert_eq!(dict.len(), 10);
            for (key, item) in dict.items() {
                let letter = char::from(b'a' + value(&item) as u8).to_string();
                assert_eq!(key.as_str(), Some(letter.as_str()));
            }
        });
        assert_eq!(counts, stats(0, 10, copies, moves, 20), "{name}");
    }
}

#[test]
#[serial]
fn test_map_arguments() {
    let m = module();
    for (class, name, copies, moves) in [
        ("Movable", "map_movable_in_value", 10, 0),
        ("Copyable", "map_copyable_in_value", 10, 0),
        ("Movable", "map_movable_in_lvalue_ref", 0, 0),
        ("Movable", "map_movable_in_ptr", 0, 0),
        ("Movable", "map_movable_in_rvalue_ref", 0, 10),
    ] {
        let counts = counted(|| {
            let dict = lettered(&m, class);
            m.call_kw(name, &[], &[("x", Object::Dict(dict))]).expect("call");
        });
        assert_eq!(counts, stats(0, 10, copies, moves, 10 + copies + moves), "{name}");
    }
}

#[test]
#[serial]
fn test_map_failure_names_the_key() {
    let m = module();
    let counts = counted(|| {
        let dict = lettered(&m, "Movable");
        dict.set_item(Object::str("k"), Object::Int(1)).expect("set");
        let err = m.call("map_movable_in_value", &[Object::Dict(dict)]).unwrap_err();
        assert!(err.is_type_error());
        assert!(err.message.contains("Invoked with types: dict"));
    });
    assert_eq!(counts.copy_constructed, 0);

    let not_a_dict = Object::list(Vec::new());
    assert!(m.call("map_movable_in_value", &[not_a_dict]).is_err());
    let empty = Object::Dict(Dict::new());
    assert_eq!(m.call("map_movable_in_value", &[empty]), Ok(Object::None));
}

#[test]
#[serial]
fn test_mismatched_payloads_raise_value_errors() {
    let m = module();
    let dict = lettered(&m, "Movable");
    dict.set_item(Object::str("z"), new(&m, "Movable", Some(1)))
        .expect("str keys are hashable");
    let err = m.call("map_movable_in_lvalue_ref", &[Object::Dict(dict)]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ValueError);
    assert_eq!(err.message, "key \"z\" does not match payload 1");

    let big = Dict::new();
    big.set_item(Object::str("a"), new(&m, "Movable", Some(200)))
        .expect("str keys are hashable");
    let err = m.call("map_movable_in_value", &[Object::Dict(big)]).unwrap_err();
    assert_eq!(err.message, "payload 200 has no letter key");

    let mut items = ten(&m, "Movable");
    items.swap(0, 1);
    let err = m.call("vec_movable_in_ptr_2", &[Object::list(items)]).unwrap_err();
    assert_eq!(err.message, "expected payload 0, got 1");
}

// ============================================================================
// Opaque container
// ============================================================================

fn floats(v: &Object) -> Vec<f64> {
    v.as_instance()
        .and_then(|inst| inst.borrow::<FloatVec>().map(|f| f.0.clone()))
        .expect("a float_vec instance")
}

#[test]
fn test_opaque_vector_crosses_by_reference() {
    let m = module();
    let v = m.call("float_vec", &[]).expect("construct");
    assert_eq!(v.type_name(), "test_stl_ext.float_vec");
    assert!(v.as_list().is_none());
    assert_eq!(m.call("size", &[v.clone()]), Ok(Object::Int(0)));

    m.call("push_back", &[v.clone(), Object::Float(1.0)]).expect("push");
    m.call("push_back", &[v.clone(), Object::Int(2)]).expect("push");
    assert_eq!(m.call("size", &[v.clone()]), Ok(Object::Int(2)));
    assert_eq!(floats(&v), vec![1.0, 2.0]);

    assert_eq!(m.doc("size"), Some("size(v: test_stl_ext.float_vec) -> int"));
    let err = m.call("size", &[Object::list(vec![Object::Float(1.0)])]).unwrap_err();
    assert!(err.message.starts_with("size(): incompatible function arguments"));
}

// ============================================================================
// Text
// ============================================================================

#[test]
fn test_strings() {
    let m = module();
    for text in ["", "orange", "橘子", "ส้ม", "البرتقالي", "🍊", "héllo"] {
        let s = Object::str(text);
        assert_eq!(m.call("identity_string", &[s.clone()]), Ok(s.clone()), "{text}");
        assert_eq!(m.call("identity_string_view", &[s.clone()]), Ok(s), "{text}");
    }
    let err = m.call("identity_string", &[Object::Int(1)]).unwrap_err();
    assert_eq!(
        err.message,
        "identity_string(): incompatible function arguments. The following argument types are supported:\n    1. identity_string(arg: str, /) -> str\n\nInvoked with types: int"
    );
}
