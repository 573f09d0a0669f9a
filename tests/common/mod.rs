//! Shared helpers for the demonstration module tests

#![allow(dead_code)]

use bridgecast::demo::{self, Stats};
use bridgecast::host::{Dict, Object};
use bridgecast::Module;

pub fn module() -> Module {
    demo::module().expect("build demo module")
}

/// Counters reset, run `f`, counters read after everything `f` held is gone.
pub fn counted<F: FnOnce()>(f: F) -> Stats {
    demo::reset();
    f();
    demo::stats()
}

pub fn stats(default: usize, value: usize, copy: usize, moves: usize, destructed: usize) -> Stats {
    Stats {
        default_constructed: default,
        value_constructed: value,
        copy_constructed: copy,
        move_constructed: moves,
        destructed,
    }
}

/// Construct a bound class instance through its host constructor.
pub fn new(m: &Module, class: &str, value: Option<i64>) -> Object {
    let args: Vec<Object> = value.map(Object::Int).into_iter().collect();
    m.call(class, &args).expect("construct instance")
}

/// Payload of a Movable or Copyable instance.
pub fn value(obj: &Object) -> i32 {
    demo::value_of(obj).expect("a demo class instance")
}

/// Ten instances with payloads 0 through 9.
pub fn ten(m: &Module, class: &str) -> Vec<Object> {
    (0..10).map(|i| new(m, class, Some(i))).collect()
}

/// {'a': 0, 'b': 1, ...} with instance values.
pub fn lettered(m: &Module, class: &str) -> Dict {
    let dict = Dict::new();
    for i in 0..10u8 {
        let key = char::from(b'a' + i).to_string();
        dict.set_item(Object::str(&key), new(m, class, Some(i64::from(i))))
            .expect("str keys are hashable");
    }
    dict
}
