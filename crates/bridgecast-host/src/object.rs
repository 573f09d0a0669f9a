//! Host object handles

use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::callable::Callable;
use crate::dict::Dict;
use crate::error::HostError;

/// A reference to a host object.
///
/// Cloning an `Object` takes a new reference; the referent is released when
/// the last reference is dropped.
#[derive(Clone)]
pub enum Object {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Tuple(Tuple),
    List(List),
    Dict(Dict),
    Instance(Instance),
    Function(Rc<dyn Callable>),
}

impl Object {
    pub fn str(s: &str) -> Self {
        Object::Str(Rc::from(s))
    }

    pub fn tuple(items: Vec<Object>) -> Self {
        Object::Tuple(Tuple::new(items))
    }

    pub fn list(items: Vec<Object>) -> Self {
        Object::List(List::new(items))
    }

    pub fn function(callable: impl Callable + 'static) -> Self {
        Object::Function(Rc::new(callable))
    }

    /// Name of the object's host type, as it appears in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Object::None => "NoneType",
            Object::Bool(_) => "bool",
            Object::Int(_) => "int",
            Object::Float(_) => "float",
            Object::Str(_) => "str",
            Object::Tuple(_) => "tuple",
            Object::List(_) => "list",
            Object::Dict(_) => "dict",
            Object::Instance(inst) => inst.type_name(),
            Object::Function(_) => "function",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Object::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Object::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Object::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Object::Str(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&Tuple> {
        match self {
            Object::Tuple(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Object::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Object::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Rc<dyn Callable>> {
        match self {
            Object::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Items of an ordered sequence, accepting both tuples and lists.
    ///
    /// Lists are snapshotted, so later mutation of the list does not affect
    /// the returned items.
    pub fn sequence_items(&self) -> Option<Vec<Object>> {
        match self {
            Object::Tuple(t) => Some(t.to_vec()),
            Object::List(l) => Some(l.to_vec()),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Object::Function(_))
    }

    /// Call the object with positional and keyword arguments.
    pub fn call(&self, args: &[Object], kwargs: &[(&str, Object)]) -> Result<Object, HostError> {
        match self {
            Object::Function(f) => f.call(args, kwargs),
            other => Err(HostError::type_error(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }

    /// Whether the object can be used as a dict key.
    pub fn is_hashable(&self) -> bool {
        match self {
            Object::List(_) | Object::Dict(_) => false,
            Object::Tuple(t) => t.iter().all(Object::is_hashable),
            _ => true,
        }
    }

    /// Identity comparison: true when both handles refer to the same object.
    pub fn is(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::None, Object::None) => true,
            (Object::Str(a), Object::Str(b)) => Rc::ptr_eq(a, b),
            (Object::Tuple(a), Object::Tuple(b)) => Rc::ptr_eq(&a.0, &b.0),
            (Object::List(a), Object::List(b)) => a.ptr_eq(b),
            (Object::Dict(a), Object::Dict(b)) => a.ptr_eq(b),
            (Object::Instance(a), Object::Instance(b)) => a.ptr_eq(b),
            (Object::Function(a), Object::Function(b)) => same_callable(a, b),
            _ => false,
        }
    }
}

fn same_callable(a: &Rc<dyn Callable>, b: &Rc<dyn Callable>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::None, Object::None) => true,
            (Object::Bool(a), Object::Bool(b)) => a == b,
            (Object::Int(a), Object::Int(b)) => a == b,
            (Object::Float(a), Object::Float(b)) => a == b,
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::Tuple(a), Object::Tuple(b)) => a == b,
            (Object::List(a), Object::List(b)) => a == b,
            (Object::Dict(a), Object::Dict(b)) => a == b,
            (Object::Instance(a), Object::Instance(b)) => a.ptr_eq(b),
            (Object::Function(a), Object::Function(b)) => same_callable(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::None => f.write_str("None"),
            Object::Bool(true) => f.write_str("True"),
            Object::Bool(false) => f.write_str("False"),
            Object::Int(i) => write!(f, "{i}"),
            Object::Float(v) if v.is_nan() => f.write_str("nan"),
            Object::Float(v) => write!(f, "{v:?}"),
            Object::Str(s) => write_str_repr(f, s),
            Object::Tuple(t) => write!(f, "{t}"),
            Object::List(l) => write!(f, "{l}"),
            Object::Dict(d) => write!(f, "{d}"),
            Object::Instance(inst) => write!(f, "<{} object>", inst.type_name()),
            Object::Function(c) => write!(f, "<function {}>", c.name()),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn write_str_repr(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\'' => f.write_str("\\'")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) < 0x20 || c as u32 == 0x7f => write!(f, "\\x{:02x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Object]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

// ============================================================================
// From implementations
// ============================================================================

impl From<()> for Object {
    fn from(_: ()) -> Self {
        Object::None
    }
}

impl From<bool> for Object {
    fn from(v: bool) -> Self {
        Object::Bool(v)
    }
}

impl From<i64> for Object {
    fn from(v: i64) -> Self {
        Object::Int(v)
    }
}

impl From<i32> for Object {
    fn from(v: i32) -> Self {
        Object::Int(i64::from(v))
    }
}

impl From<f64> for Object {
    fn from(v: f64) -> Self {
        Object::Float(v)
    }
}

impl From<&str> for Object {
    fn from(v: &str) -> Self {
        Object::str(v)
    }
}

impl From<String> for Object {
    fn from(v: String) -> Self {
        Object::Str(Rc::from(v))
    }
}

impl From<Tuple> for Object {
    fn from(v: Tuple) -> Self {
        Object::Tuple(v)
    }
}

impl From<List> for Object {
    fn from(v: List) -> Self {
        Object::List(v)
    }
}

impl From<Dict> for Object {
    fn from(v: Dict) -> Self {
        Object::Dict(v)
    }
}

impl From<Instance> for Object {
    fn from(v: Instance) -> Self {
        Object::Instance(v)
    }
}

impl<T: Into<Object>> From<Option<T>> for Object {
    fn from(v: Option<T>) -> Self {
        v.map_or(Object::None, Into::into)
    }
}

// ============================================================================
// Tuple
// ============================================================================

/// An immutable, fixed-length host sequence.
#[derive(Clone, PartialEq)]
pub struct Tuple(Rc<[Object]>);

impl Tuple {
    pub fn new(items: Vec<Object>) -> Self {
        Tuple(Rc::from(items))
    }

    pub fn empty() -> Self {
        Tuple::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Object> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Object> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Object] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<Object> {
        self.0.to_vec()
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        write_items(f, &self.0)?;
        if self.0.len() == 1 {
            f.write_str(",")?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ============================================================================
// List
// ============================================================================

/// A mutable host sequence shared by reference.
#[derive(Clone)]
pub struct List(Rc<RefCell<Vec<Object>>>);

impl List {
    pub fn new(items: Vec<Object>) -> Self {
        List(Rc::new(RefCell::new(items)))
    }

    pub fn empty() -> Self {
        List::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Object> {
        self.0.borrow().get(index).cloned()
    }

    pub fn push(&self, item: Object) {
        self.0.borrow_mut().push(item);
    }

    pub fn to_vec(&self) -> Vec<Object> {
        self.0.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &List) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        write_items(f, &self.0.borrow())?;
        f.write_str("]")
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ============================================================================
// Instance
// ============================================================================

/// A host object wrapping exactly one native value.
///
/// The value lives in shared storage; it is destructed when the last
/// reference to the storage goes away, whether that reference is held by a
/// host object or by a native alias.
#[derive(Clone)]
pub struct Instance {
    type_id: TypeId,
    type_name: Rc<str>,
    value: Rc<dyn Any>,
}

impl Instance {
    pub fn new<T: 'static>(type_name: impl Into<Rc<str>>, value: T) -> Self {
        Self::from_cell(type_name, Rc::new(RefCell::new(value)))
    }

    /// Wrap existing native storage without constructing anything.
    pub fn from_cell<T: 'static>(type_name: impl Into<Rc<str>>, cell: Rc<RefCell<T>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name.into(),
            value: cell,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Shared storage of the wrapped value, if it has type `T`.
    pub fn cell<T: 'static>(&self) -> Option<Rc<RefCell<T>>> {
        Rc::clone(&self.value).downcast::<RefCell<T>>().ok()
    }

    pub fn borrow<T: 'static>(&self) -> Option<Ref<'_, T>> {
        self.value.downcast_ref::<RefCell<T>>().map(RefCell::borrow)
    }

    pub fn borrow_mut<T: 'static>(&self) -> Option<RefMut<'_, T>> {
        self.value.downcast_ref::<RefCell<T>>().map(RefCell::borrow_mut)
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::as_ptr(&self.value) as *const () == Rc::as_ptr(&other.value) as *const ()
    }

    /// Number of live references to the wrapped storage.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} object>", self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repr_matches_host_conventions() {
        assert_eq!(Object::None.to_string(), "None");
        assert_eq!(Object::Bool(true).to_string(), "True");
        assert_eq!(Object::Float(2.5).to_string(), "2.5");
        assert_eq!(Object::Float(1.0).to_string(), "1.0");
        assert_eq!(Object::str("it's").to_string(), "'it\\'s'");
        assert_eq!(Object::tuple(vec![Object::Int(1)]).to_string(), "(1,)");
        assert_eq!(Object::tuple(vec![]).to_string(), "()");
        assert_eq!(
            Object::list(vec![Object::Int(1), Object::str("a")]).to_string(),
            "[1, 'a']"
        );
        assert_eq!(Object::str("🍊").to_string(), "'🍊'");
    }

    #[test]
    fn equality_is_same_kind() {
        assert_eq!(Object::Int(1), Object::Int(1));
        assert_ne!(Object::Int(1), Object::Float(1.0));
        assert_ne!(Object::Int(1), Object::Bool(true));
        assert_ne!(
            Object::tuple(vec![Object::Int(1)]),
            Object::list(vec![Object::Int(1)])
        );
        assert_eq!(
            Object::list(vec![Object::Int(1)]),
            Object::list(vec![Object::Int(1)])
        );
    }

    #[test]
    fn sequence_items_accepts_tuple_and_list() {
        let t = Object::tuple(vec![Object::Int(1), Object::Int(2)]);
        let l = Object::list(vec![Object::Int(1), Object::Int(2)]);
        assert_eq!(t.sequence_items(), l.sequence_items());
        assert!(Object::Int(3).sequence_items().is_none());
        assert!(Object::str("ab").sequence_items().is_none());
    }

    #[test]
    fn list_is_shared_by_reference() {
        let list = List::empty();
        let alias = Object::List(list.clone());
        list.push(Object::Int(7));
        assert_eq!(alias.as_list().map(List::len), Some(1));
        assert!(alias.is(&Object::List(list)));
    }

    #[test]
    fn instance_identity_and_storage() {
        let inst = Instance::new("demo.Point", (1, 2));
        let other = Instance::new("demo.Point", (1, 2));
        assert!(inst.is::<(i32, i32)>());
        assert!(!inst.is::<i32>());
        assert_eq!(Object::Instance(inst.clone()), Object::Instance(inst.clone()));
        assert_ne!(Object::Instance(inst.clone()), Object::Instance(other));

        let cell = inst.cell::<(i32, i32)>().expect("typed storage");
        cell.borrow_mut().0 = 10;
        assert_eq!(inst.borrow::<(i32, i32)>().map(|v| v.0), Some(10));
        assert!(inst.cell::<String>().is_none());
        assert_eq!(Object::Instance(inst).to_string(), "<demo.Point object>");
    }

    #[test]
    fn instance_value_dropped_with_last_reference() {
        struct Flag(Rc<RefCell<bool>>);
        impl Drop for Flag {
            fn drop(&mut self) {
                *self.0.borrow_mut() = true;
            }
        }

        let dropped = Rc::new(RefCell::new(false));
        let obj = Object::Instance(Instance::new("Flag", Flag(Rc::clone(&dropped))));
        let second = obj.clone();
        drop(obj);
        assert!(!*dropped.borrow());
        drop(second);
        assert!(*dropped.borrow());
    }

    #[test]
    fn calling_non_callable_is_type_error() {
        let err = Object::Int(1).call(&[], &[]).unwrap_err();
        assert!(err.is_type_error());
        assert_eq!(err.message, "'int' object is not callable");
    }

    #[test]
    fn hashability() {
        assert!(Object::Int(1).is_hashable());
        assert!(Object::tuple(vec![Object::str("a")]).is_hashable());
        assert!(!Object::list(vec![]).is_hashable());
        assert!(!Object::tuple(vec![Object::list(vec![])]).is_hashable());
    }
}
