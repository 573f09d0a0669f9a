//! Host runtime objects
//!
//! The dynamically typed side of the bridge. Every host value is an [`Object`]:
//! a cheap handle where cloning takes a new reference and dropping the last
//! reference releases whatever the object owns, including any native value
//! wrapped by an [`Instance`].
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  Object                      │
//! │   None | Bool | Int | Float  │
//! │   Str  | Tuple | List | Dict │
//! │   Instance  ── native value  │
//! │   Function  ── Callable      │
//! └──────────────────────────────┘
//! ```
//!
//! Host callables raise [`HostError`]s; the argument binding helpers in
//! [`callable`] produce the same messages for host lambdas and bound native
//! functions.

pub mod callable;
mod dict;
mod error;
mod object;
#[cfg(feature = "serde")]
mod ser;

pub use callable::{Callable, Lambda, Parameter};
pub use dict::Dict;
pub use error::{ErrorKind, HostError};
pub use object::{Instance, List, Object, Tuple};
