//! Casters
//!
//! A caster converts one native type to and from host objects. Casters are
//! plain trait impls on the native type, so composite casters (`Vec<T>`,
//! `Option<T>`, tuples, maps, unions, callables) are built by the type system
//! from the casters of their parts.
//!
//! Decoding an argument happens in two phases:
//!
//! 1. [`FromHost::load`] inspects the host object and fills a boundary slot.
//!    Slots only hold aliases of host storage; no native value is constructed.
//! 2. [`FromHost::take`] materializes the native value from the slot. This is
//!    where by-value arguments are copy-constructed.
//!
//! A call loads every argument before it takes any, so a conversion failure
//! anywhere in the argument list never constructs a native value.

pub mod args;
mod class;
mod function;
mod map;
mod optional;
mod sequence;
mod tuple;
mod value;
mod variant;

use std::rc::Rc;

use thiserror::Error;

use crate::host::{HostError, Object};
use crate::registry::TypeRegistry;
use crate::signature::{Descr, Position};

pub use args::{ArgList, HostArgs, NativeArgs, NativeFn};
pub use class::{into_host_by_value, load_by_value, Class, Ptr, Ref, RvRef};
pub use function::Function;
pub use value::StrView;
pub use variant::{Union2, Union3, Union4, Union5, Union6};

/// Default cap on the length of decoded sequences and mappings.
pub const DEFAULT_MAX_SEQUENCE_LEN: usize = 1_000_000;

/// A failed boundary crossing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CastError {
    #[error("expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("expected a sequence of length {expected}, got length {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("{value} is out of range for {target}")]
    Overflow { value: i128, target: &'static str },

    #[error("{0} cannot be passed by value: it is not copyable")]
    NotCopyable(&'static str),

    #[error("type {0} has no host binding")]
    Unregistered(&'static str),

    #[error("{0} is already borrowed")]
    Borrowed(&'static str),

    #[error("length {len} exceeds the limit of {max}")]
    TooLong { len: usize, max: usize },

    #[error("at index {0}: {1}")]
    Index(usize, Box<CastError>),

    #[error("at key {key}: {error}")]
    Entry { key: String, error: Box<CastError> },

    #[error("no alternative of {expected} accepts {got}")]
    NoMatchingAlternative { expected: String, got: String },

    #[error("called an empty function")]
    EmptyFunction,

    /// An exception raised by host code during the crossing.
    #[error(transparent)]
    Raised(#[from] HostError),
}

impl CastError {
    /// Attribute this error to element `index` of a sequence.
    pub fn at(self, index: usize) -> Self {
        CastError::Index(index, Box::new(self))
    }

    /// Attribute this error to the entry with host key `key`.
    pub fn at_key(self, key: &Object) -> Self {
        CastError::Entry {
            key: key.to_string(),
            error: Box::new(self),
        }
    }
}

impl From<CastError> for HostError {
    fn from(err: CastError) -> Self {
        match err {
            CastError::Raised(e) => e,
            err @ CastError::Borrowed(_) => HostError::runtime_error(err.to_string()),
            other => HostError::type_error(other.to_string()),
        }
    }
}

/// Resource limits applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Longest host sequence or mapping accepted by a container caster.
    pub max_sequence_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
        }
    }
}

/// Everything a caster may consult during a crossing.
#[derive(Debug, Clone, Default)]
pub struct Context {
    registry: Rc<TypeRegistry>,
    limits: Limits,
}

impl Context {
    pub fn new(registry: Rc<TypeRegistry>, limits: Limits) -> Self {
        Self { registry, limits }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn check_len(&self, len: usize) -> Result<(), CastError> {
        let max = self.limits.max_sequence_len;
        if len > max {
            return Err(CastError::TooLong { len, max });
        }
        Ok(())
    }

    /// Rendered host type name of `T`.
    pub fn expected<T: HostType + ?Sized>(&self) -> String {
        T::descr().render(&self.registry, Position::Argument)
    }

    /// A [`CastError::TypeMismatch`] for decoding `got` as `T`.
    pub fn mismatch<T: HostType + ?Sized>(&self, got: &Object) -> CastError {
        CastError::TypeMismatch {
            expected: self.expected::<T>(),
            got: got.type_name().to_string(),
        }
    }
}

// ============================================================================
// Caster traits
// ============================================================================

/// A native type with a host-facing shape.
pub trait HostType {
    fn descr() -> Descr;
}

/// Host → native conversion.
pub trait FromHost: HostType + Sized {
    /// Boundary slot filled by [`FromHost::load`].
    type Slot;

    /// Check `src` and alias whatever the native value will be built from.
    fn load(src: &Object, cx: &Context) -> Result<Self::Slot, CastError>;

    /// Build the native value. Cannot fail: everything that can go wrong is
    /// detected by `load`.
    fn take(slot: Self::Slot) -> Self;

    fn from_host(src: &Object, cx: &Context) -> Result<Self, CastError> {
        Self::load(src, cx).map(Self::take)
    }
}

/// Native → host conversion.
pub trait IntoHost: HostType {
    fn into_host(self, cx: &Context) -> Result<Object, CastError>;
}

/// What a native function may return: a convertible value, or a `Result`
/// whose error is raised on the host side.
pub trait IntoReturn {
    type Value: IntoHost;

    fn into_value(self) -> Result<Self::Value, CastError>;
}

impl<T: IntoHost> IntoReturn for T {
    type Value = T;

    fn into_value(self) -> Result<T, CastError> {
        Ok(self)
    }
}

impl<T: IntoHost, E: Into<CastError>> IntoReturn for Result<T, E> {
    type Value = T;

    fn into_value(self) -> Result<T, CastError> {
        self.map_err(Into::into)
    }
}
