//! Demonstration module
//!
//! `test_stl_ext` exercises every caster with two instrumented classes whose
//! lifecycle operations are tallied in process-wide counters:
//!
//! - [`Movable`] has a dedicated move that resets the source to 0.
//! - [`Copyable`] only copies; moving it falls back to a copy.
//!
//! Both default to a payload of 5. A function handed an unexpected payload
//! raises a `ValueError`.
//!
//! [`FloatVec`] is a container bound as an opaque class: it crosses by
//! reference, so mutations made natively stay visible to the host.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::cast::{CastError, Class, Function, Ptr, Ref, RvRef, StrView, Union2, Union3};
use crate::host::{HostError, List, Object, Tuple};
use crate::module::{BindingError, Module, ModuleBuilder, Params};

static DEFAULT_CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);
static VALUE_CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);
static COPY_CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);
static MOVE_CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);
static DESTRUCTED: AtomicUsize = AtomicUsize::new(0);

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

/// Snapshot of the lifecycle counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub default_constructed: usize,
    pub value_constructed: usize,
    pub copy_constructed: usize,
    pub move_constructed: usize,
    pub destructed: usize,
}

pub fn stats() -> Stats {
    Stats {
        default_constructed: DEFAULT_CONSTRUCTED.load(Ordering::SeqCst),
        value_constructed: VALUE_CONSTRUCTED.load(Ordering::SeqCst),
        copy_constructed: COPY_CONSTRUCTED.load(Ordering::SeqCst),
        move_constructed: MOVE_CONSTRUCTED.load(Ordering::SeqCst),
        destructed: DESTRUCTED.load(Ordering::SeqCst),
    }
}

pub fn reset() {
    for counter in [
        &DEFAULT_CONSTRUCTED,
        &VALUE_CONSTRUCTED,
        &COPY_CONSTRUCTED,
        &MOVE_CONSTRUCTED,
        &DESTRUCTED,
    ] {
        counter.store(0, Ordering::SeqCst);
    }
}

// ============================================================================
// Instrumented classes
// ============================================================================

/// Copy- and move-constructible.
#[derive(Debug, PartialEq)]
pub struct Movable {
    pub value: i32,
}

impl Movable {
    pub fn new(value: i32) -> Self {
        bump(&VALUE_CONSTRUCTED);
        Self { value }
    }
}

impl Default for Movable {
    fn default() -> Self {
        bump(&DEFAULT_CONSTRUCTED);
        Self { value: 5 }
    }
}

impl Drop for Movable {
    fn drop(&mut self) {
        bump(&DESTRUCTED);
    }
}

impl Class for Movable {
    fn copy_construct(&self) -> Self {
        bump(&COPY_CONSTRUCTED);
        Self { value: self.value }
    }

    fn move_construct(&mut self) -> Self {
        bump(&MOVE_CONSTRUCTED);
        Self {
            value: std::mem::take(&mut self.value),
        }
    }
}

/// Copy-constructible only.
#[derive(Debug, PartialEq)]
pub struct Copyable {
    pub value: i32,
}

impl Copyable {
    pub fn new(value: i32) -> Self {
        bump(&VALUE_CONSTRUCTED);
        Self { value }
    }
}

impl Default for Copyable {
    fn default() -> Self {
        bump(&DEFAULT_CONSTRUCTED);
        Self { value: 5 }
    }
}

impl Drop for Copyable {
    fn drop(&mut self) {
        bump(&DESTRUCTED);
    }
}

impl Class for Copyable {
    fn copy_construct(&self) -> Self {
        bump(&COPY_CONSTRUCTED);
        Self { value: self.value }
    }
}

/// A vector of floats bound as the class `float_vec`. A bare `Vec<f64>`
/// always goes through the list caster; the newtype is what selects the
/// registered path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatVec(pub Vec<f64>);

impl Class for FloatVec {
    fn copy_construct(&self) -> Self {
        self.clone()
    }

    fn move_construct(&mut self) -> Self {
        FloatVec(std::mem::take(&mut self.0))
    }
}

crate::impl_class!(Movable, Copyable, FloatVec);

/// Payload of a host object wrapping a [`Movable`] or [`Copyable`].
pub fn value_of(obj: &Object) -> Option<i32> {
    let inst = obj.as_instance()?;
    inst.borrow::<Movable>()
        .map(|m| m.value)
        .or_else(|| inst.borrow::<Copyable>().map(|c| c.value))
}

fn letter(i: i32) -> Result<String, HostError> {
    u8::try_from(i)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'a' + i).to_string())
        .ok_or_else(|| HostError::value_error(format!("payload {i} has no letter key")))
}

fn check(got: i32, expected: i32) -> Result<(), HostError> {
    if got == expected {
        Ok(())
    } else {
        Err(HostError::value_error(format!("expected payload {expected}, got {got}")))
    }
}

fn check_int(got: i64, expected: i64) -> Result<(), HostError> {
    if got == expected {
        Ok(())
    } else {
        Err(HostError::value_error(format!("expected {expected}, got {got}")))
    }
}

fn check_key(key: &str, payload: i32) -> Result<(), HostError> {
    if key == letter(payload)? {
        Ok(())
    } else {
        Err(HostError::value_error(format!("key {key:?} does not match payload {payload}")))
    }
}

fn non_null<T>(value: Option<T>) -> Result<T, HostError> {
    value.ok_or_else(|| HostError::value_error("unexpected null pointer"))
}

fn check_ptr(p: &Ptr<Movable>, expected: i32) -> Result<(), HostError> {
    check(non_null(p.get())?.value, expected)
}

fn check_copyable_ptr(p: &Ptr<Copyable>, expected: i32) -> Result<(), HostError> {
    check(non_null(p.get())?.value, expected)
}

// ============================================================================
// Module
// ============================================================================

/// Build the `test_stl_ext` module.
pub fn module() -> Result<Module, BindingError> {
    let mut m = ModuleBuilder::new("test_stl_ext");
    m.class::<Movable>("Movable")?
        .class::<Copyable>("Copyable")?
        .class::<FloatVec>("float_vec")?;

    // Constructors
    m.def_with(
        "Movable",
        Params::new().arg("value").default(Object::None),
        |value: Option<i32>| Box::new(value.map_or_else(Movable::default, Movable::new)),
    )?
    .def_with(
        "Copyable",
        Params::new().arg("value").default(Object::None),
        |value: Option<i32>| Box::new(value.map_or_else(Copyable::default, Copyable::new)),
    )?;

    // Single values in every convention
    m.def("return_movable", Movable::default)?
        .def("return_movable_ptr", || Box::new(Movable::default()))?
        .def("movable_in_value", |x: Movable| check(x.value, 5))?
        .def("movable_in_lvalue_ref", |x: Ref<Movable>| check(x.get().value, 5))?
        .def("movable_in_ptr", |x: Ptr<Movable>| check_ptr(&x, 5))?
        .def("movable_in_rvalue_ref", |x: RvRef<Movable>| -> Result<(), CastError> {
            let moved = x.take()?;
            Ok(check(moved.value, 5)?)
        })?
        .def("return_copyable", Copyable::default)?
        .def("return_copyable_ptr", || Box::new(Copyable::default()))?
        .def("copyable_in_value", |x: Copyable| check(x.value, 5))?
        .def("copyable_in_lvalue_ref", |x: Ref<Copyable>| check(x.get().value, 5))?
        .def("copyable_in_ptr", |x: Ptr<Copyable>| check_copyable_ptr(&x, 5))?
        .def("copyable_in_rvalue_ref", |x: RvRef<Copyable>| -> Result<(), CastError> {
            let moved = x.take()?;
            Ok(check(moved.value, 5)?)
        })?;

    // Fixed arity
    m.def("tuple_return_movable", || (Movable::default(),))?
        .def("tuple_movable_in_value", |x: (Movable,)| check(x.0.value, 5))?
        .def("tuple_movable_in_lvalue_ref", |x: (Ref<Movable>,)| check(x.0.get().value, 5))?
        .def("tuple_movable_in_lvalue_ref_2", |x: (Movable,)| {
            let held = &x;
            check(held.0.value, 5)
        })?
        .def("tuple_movable_in_ptr", |x: (Ptr<Movable>,)| check_ptr(&x.0, 5))?
        .def("tuple_movable_in_rvalue_ref", |x: (RvRef<Movable>,)| -> Result<(), CastError> {
            let moved = x.0.take()?;
            Ok(check(moved.value, 5)?)
        })?
        .def("tuple_movable_in_rvalue_ref_2", |mut x: (Movable,)| {
            let moved = x.0.move_construct();
            check(moved.value, 5)
        })?
        .def("empty_tuple", |x: Tuple| x)?
        .def("swap_tuple", |x: (i64, f64)| (x.1, x.0))?
        .def("swap_pair", |x: (i64, f64)| (x.1, x.0))?;

    // Sequences
    m.def("vec_return_movable", || (0..10).map(Movable::new).collect::<Vec<_>>())?
        .def("vec_return_copyable", || {
            let held: Vec<Copyable> = (0..10).map(Copyable::new).collect();
            held.iter().map(Copyable::copy_construct).collect::<Vec<_>>()
        })?
        .def("vec_movable_in_value", |x: Vec<Movable>| {
            (0..).zip(&x).try_for_each(|(i, m)| check(m.value, i))
        })?
        .def("vec_copyable_in_value", |x: Vec<Copyable>| {
            (0..).zip(&x).try_for_each(|(i, c)| check(c.value, i))
        })?
        .def("vec_movable_in_lvalue_ref", |x: Vec<Ref<Movable>>| {
            (0..).zip(&x).try_for_each(|(i, m)| check(m.get().value, i))
        })?
        .def("vec_movable_in_ptr_2", |x: Vec<Ptr<Movable>>| {
            (0..).zip(&x).try_for_each(|(i, m)| check_ptr(m, i))
        })?
        .def("vec_movable_in_rvalue_ref", |x: Vec<RvRef<Movable>>| -> Result<(), CastError> {
            for (i, m) in (0..).zip(&x) {
                check(m.take()?.value, i)?;
            }
            Ok(())
        })?
        .def("identity_list", |x: Vec<i64>| x)?;

    // Opaque container
    m.def("float_vec", || Box::new(FloatVec::default()))?
        .def_with("size", Params::new().arg("v"), |v: Ref<FloatVec>| v.get().0.len())?
        .def_with(
            "push_back",
            Params::new().arg("v").arg("x"),
            |v: Ref<FloatVec>, x: f64| -> Result<(), CastError> {
                v.try_get_mut()?.0.push(x);
                Ok(())
            },
        )?;

    // Text
    m.def("identity_string", |x: String| x)?
        .def("identity_string_view", |x: StrView| x)?;

    // Optionals
    m.def_with("optional_copyable", Params::new().arg("x"), |x: Option<Copyable>| {
        check(non_null(x)?.value, 5)
    })?
    .def_with("optional_copyable_ptr", Params::new().arg("x"), |x: Option<Ptr<Copyable>>| {
        check_copyable_ptr(&non_null(x)?, 5)
    })?
    .def_with("optional_none", Params::new().arg("x"), |x: Option<Copyable>| match x {
        None => Ok(()),
        Some(c) => Err(HostError::value_error(format!("expected None, got payload {}", c.value))),
    })?
    .def("optional_ret_opt_movable", || Some(Movable::default()))?
    .def("optional_ret_opt_movable_ptr", || Some(Box::new(Movable::default())))?
    .def("optional_ret_opt_none", || None::<Movable>)?
    .def_with(
        "optional_unbound_type",
        Params::new().arg("x").default(Object::None),
        |x: Option<i64>| x,
    )?;

    // Sum types
    m.def("variant_copyable", |x: Union2<Copyable, i64>| match x {
        Union2::A(c) => check(c.value, 5),
        Union2::B(i) => check_int(i, 5),
    })?
    .def_with(
        "variant_copyable_none",
        Params::new().arg("x"),
        |x: Option<Union2<Copyable, i64>>| match x {
            Some(Union2::A(c)) => check(c.value, 5),
            Some(Union2::B(i)) => check_int(i, 5),
            None => Ok(()),
        },
    )?
    .def("variant_copyable_ptr", |x: Union2<Ptr<Copyable>, i64>| match x {
        Union2::A(p) => check_copyable_ptr(&p, 5),
        Union2::B(i) => check_int(i, 5),
    })?
    .def_with(
        "variant_copyable_ptr_none",
        Params::new().arg("x"),
        |x: Option<Union2<Ptr<Copyable>, i64>>| match x {
            Some(Union2::A(p)) => check_copyable_ptr(&p, 5),
            Some(Union2::B(i)) => check_int(i, 5),
            None => Ok(()),
        },
    )?
    .def("variant_ret_var_copyable", || {
        Union2::<Copyable, i64>::A(Copyable::default())
    })?
    .def("variant_ret_var_none", || Union3::<(), Copyable, i64>::A(()))?
    .def_with(
        "variant_unbound_type",
        Params::new().arg("x").default(Object::None),
        |x: Option<Union3<List, Tuple, i64>>| x,
    )?;

    // Mappings
    m.def("map_return_movable_value", || {
        (0..10)
            .map(|i| -> Result<_, HostError> { Ok((letter(i)?, Movable::new(i))) })
            .collect::<Result<HashMap<_, _>, HostError>>()
    })?
    .def("map_return_copyable_value", || {
        (0..10)
            .map(|i| -> Result<_, HostError> { Ok((letter(i)?, Copyable::new(i))) })
            .collect::<Result<HashMap<_, _>, HostError>>()
    })?
    .def_with(
        "map_movable_in_value",
        Params::new().arg("x"),
        |x: HashMap<String, Movable>| x.iter().try_for_each(|(k, v)| check_key(k, v.value)),
    )?
    .def_with(
        "map_copyable_in_value",
        Params::new().arg("x"),
        |x: HashMap<String, Copyable>| x.iter().try_for_each(|(k, v)| check_key(k, v.value)),
    )?
    .def_with(
        "map_movable_in_lvalue_ref",
        Params::new().arg("x"),
        |x: HashMap<String, Ref<Movable>>| {
            x.iter().try_for_each(|(k, v)| check_key(k, v.get().value))
        },
    )?
    .def_with(
        "map_movable_in_rvalue_ref",
        Params::new().arg("x"),
        |x: HashMap<String, RvRef<Movable>>| -> Result<(), CastError> {
            for (k, v) in &x {
                check_key(k, v.take()?.value)?;
            }
            Ok(())
        },
    )?
    .def_with(
        "map_movable_in_ptr",
        Params::new().arg("x"),
        |x: HashMap<String, Ptr<Movable>>| {
            x.iter().try_for_each(|(k, v)| -> Result<(), HostError> {
                check_key(k, non_null(v.get())?.value)
            })
        },
    )?;

    // Callables
    m.def("return_empty_function", Function::<(i64,), i64>::empty)?
        .def("return_function", || Function::<(i64,), i64>::new(|x: i64| x + 5))?
        .def_with(
            "call_function",
            Params::new().arg("f").arg("x"),
            |f: Function<(i64,), i64>, x: i64| -> Result<i64, CastError> { f.call((x,)) },
        )?;

    Ok(m.build())
}
