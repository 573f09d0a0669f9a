//! Bridgecast: container casters between native code and a host object model
//!
//! Native functions are bound into a host [`Module`] and called with host
//! objects. Their argument and return types are converted by casters: one
//! trait impl per native type, composed by the type system for containers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Host module                │
//! │                                         │
//! │  module    - Binding, dispatch, errors  │
//! │  cast      - Casters per native type    │
//! │  signature - Rendered descriptors       │
//! │  registry  - Bound class names          │
//! │                                         │
//! ├─────────────────────────────────────────┤
//! │    Host object model (bridgecast-host)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use bridgecast::host::Object;
//! use bridgecast::{ModuleBuilder, Params};
//!
//! let mut m = ModuleBuilder::new("demo");
//! m.def_with("add", Params::new().arg("a").arg("b").default(10i64), |a: i64, b: i64| a + b)
//!     .unwrap();
//! let module = m.build();
//!
//! assert_eq!(module.doc("add"), Some("add(a: int, b: int = 10) -> int"));
//! assert_eq!(module.call("add", &[Object::Int(1)]).unwrap(), Object::Int(11));
//! ```

pub mod cast;
pub mod demo;
pub mod module;
pub mod registry;
pub mod signature;

pub use bridgecast_host as host;

pub use cast::{
    CastError, Class, Context, FromHost, Function, HostType, IntoHost, IntoReturn, Limits, Ptr,
    Ref, RvRef, StrView,
};
pub use module::{
    BindingError, BoundFunction, FunctionError, FunctionErrorKind, Module, ModuleBuilder, Params,
};
pub use registry::{RegistryError, TypeRegistry};
pub use signature::{Descr, Position, Signature};
