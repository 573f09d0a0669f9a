//! Insertion-ordered host mapping

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::HostError;
use crate::object::Object;

/// A mutable host mapping shared by reference.
///
/// Entries keep insertion order; assigning an existing key replaces its value
/// in place.
#[derive(Clone, Default)]
pub struct Dict(Rc<RefCell<Vec<(Object, Object)>>>);

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dict from key/value pairs; later duplicates overwrite earlier
    /// ones.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, HostError>
    where
        I: IntoIterator<Item = (Object, Object)>,
    {
        let dict = Dict::new();
        for (key, value) in pairs {
            dict.set_item(key, value)?;
        }
        Ok(dict)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn set_item(&self, key: Object, value: Object) -> Result<(), HostError> {
        if !key.is_hashable() {
            return Err(HostError::type_error(format!(
                "unhashable type: '{}'",
                key.type_name()
            )));
        }
        let mut entries = self.0.borrow_mut();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
        Ok(())
    }

    pub fn get_item(&self, key: &Object) -> Option<Object> {
        self.0
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn contains_key(&self, key: &Object) -> bool {
        self.0.borrow().iter().any(|(k, _)| k == key)
    }

    /// Snapshot of the entries in insertion order.
    pub fn items(&self) -> Vec<(Object, Object)> {
        self.0.borrow().clone()
    }

    pub fn keys(&self) -> Vec<Object> {
        self.0.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn ptr_eq(&self, other: &Dict) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let ours = self.0.borrow();
        ours.len() == other.len()
            && ours
                .iter()
                .all(|(k, v)| other.get_item(k).is_some_and(|theirs| theirs == *v))
    }
}

impl fmt::Display for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.0.borrow().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_replaces_in_place() {
        let d = Dict::new();
        d.set_item(Object::str("b"), Object::Int(1)).unwrap();
        d.set_item(Object::str("a"), Object::Int(2)).unwrap();
        d.set_item(Object::str("b"), Object::Int(3)).unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(d.to_string(), "{'b': 3, 'a': 2}");
        assert_eq!(d.get_item(&Object::str("b")), Some(Object::Int(3)));
        assert!(d.get_item(&Object::str("c")).is_none());
    }

    #[test]
    fn rejects_unhashable_keys() {
        let d = Dict::new();
        let err = d.set_item(Object::list(vec![]), Object::None).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: unhashable type: 'list'");
        assert!(d.is_empty());
    }

    #[test]
    fn equality_ignores_order() {
        let a = Dict::from_pairs([
            (Object::Int(1), Object::str("x")),
            (Object::Int(2), Object::str("y")),
        ])
        .unwrap();
        let b = Dict::from_pairs([
            (Object::Int(2), Object::str("y")),
            (Object::Int(1), Object::str("x")),
        ])
        .unwrap();
        assert_eq!(a, b);
        b.set_item(Object::Int(3), Object::None).unwrap();
        assert_ne!(a, b);
    }
}
