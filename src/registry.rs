//! Registered Type Table
//!
//! Associates a native type identity with the name the host sees. The table
//! is filled while a module is being built and is read-only afterwards; the
//! casters only ever ask "is this type registered, and under what name".

use std::any::TypeId;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

/// One registered native type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub type_id: TypeId,
    /// Host-visible name, qualified by the owning module (`test_stl_ext.Movable`).
    pub name: Rc<str>,
    /// `std::any::type_name` of the native type.
    pub rust_name: &'static str,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("type {rust_name} is already registered as {existing}")]
    AlreadyRegistered {
        rust_name: &'static str,
        existing: String,
    },
}

/// Native type identity → display name.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    entries: HashMap<TypeId, TypeEntry>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under the fully qualified display name `name`.
    pub fn register<T: 'static>(&mut self, name: impl Into<Rc<str>>) -> Result<&TypeEntry, RegistryError> {
        let type_id = TypeId::of::<T>();
        let rust_name = std::any::type_name::<T>();
        if let Some(existing) = self.entries.get(&type_id) {
            return Err(RegistryError::AlreadyRegistered {
                rust_name,
                existing: existing.name.to_string(),
            });
        }
        let entry = TypeEntry {
            type_id,
            name: name.into(),
            rust_name,
        };
        tracing::debug!(rust = rust_name, name = %entry.name, "registered type");
        Ok(self.entries.entry(type_id).or_insert(entry))
    }

    pub fn lookup(&self, type_id: TypeId) -> Option<&TypeEntry> {
        self.entries.get(&type_id)
    }

    pub fn get<T: 'static>(&self) -> Option<&TypeEntry> {
        self.lookup(TypeId::of::<T>())
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Display name of a type, or `None` when it is unbound.
    pub fn display_name(&self, type_id: TypeId) -> Option<&str> {
        self.lookup(type_id).map(|e| &*e.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point;
    struct Unbound;

    #[test]
    fn register_and_lookup() {
        let mut registry = TypeRegistry::new();
        registry.register::<Point>("geo.Point").unwrap();
        assert_eq!(registry.get::<Point>().map(|e| &*e.name), Some("geo.Point"));
        assert_eq!(registry.display_name(TypeId::of::<Point>()), Some("geo.Point"));
        assert!(registry.get::<Unbound>().is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register::<Point>("geo.Point").unwrap();
        let err = registry.register::<Point>("geo.Other").unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered { .. }));
        assert_eq!(registry.get::<Point>().map(|e| &*e.name), Some("geo.Point"));
    }
}
