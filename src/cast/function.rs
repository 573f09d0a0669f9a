//! Callable caster
//!
//! [`Function<Args, R>`] is a native handle to something callable with
//! `Args` and producing `R`. It is backed either by a host callable, in which
//! case every call encodes the arguments, calls into the host and decodes the
//! result, or by a native closure, which encodes to a host callable that does
//! the reverse. An empty function encodes to None and None decodes to an
//! empty function.

use std::fmt;
use std::rc::Rc;

use super::args::{ArgList, HostArgs, NativeArgs, NativeFn};
use super::{CastError, Context, FromHost, HostType, IntoHost, IntoReturn};
use crate::host::callable::{bind_arguments, incompatible_arguments, Parameter};
use crate::host::{Callable, HostError, Object};
use crate::module::RETURN_CONVERSION_FAILED;
use crate::signature::{Descr, ParamSig, Signature};

type NativeBody<A, R> = Rc<dyn Fn(A) -> Result<R, CastError>>;

enum Repr<A, R> {
    Host { callable: Object, cx: Context },
    Native(NativeBody<A, R>),
}

/// A callable crossing the boundary.
pub struct Function<A, R> {
    repr: Option<Repr<A, R>>,
}

impl<A, R> Function<A, R> {
    pub fn empty() -> Self {
        Self { repr: None }
    }

    pub fn is_empty(&self) -> bool {
        self.repr.is_none()
    }

    /// The host callable behind this function, if it is host-backed.
    pub fn host_callable(&self) -> Option<&Object> {
        match &self.repr {
            Some(Repr::Host { callable, .. }) => Some(callable),
            _ => None,
        }
    }
}

impl<A: 'static, R: 'static> Function<A, R> {
    /// Wrap a native closure.
    pub fn new<F>(f: F) -> Self
    where
        F: NativeFn<A>,
        F::Output: IntoReturn<Value = R>,
    {
        let body: NativeBody<A, R> = Rc::new(move |args| f.call(args).into_value());
        Self {
            repr: Some(Repr::Native(body)),
        }
    }
}

impl<A: HostArgs, R: FromHost> Function<A, R> {
    pub fn call(&self, args: A) -> Result<R, CastError> {
        match &self.repr {
            None => Err(CastError::EmptyFunction),
            Some(Repr::Native(body)) => body(args),
            Some(Repr::Host { callable, cx }) => {
                let objects = args.into_objects(cx)?;
                let out = callable.call(&objects, &[])?;
                R::from_host(&out, cx)
            }
        }
    }
}

impl<A, R> Clone for Function<A, R> {
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            None => None,
            Some(Repr::Host { callable, cx }) => Some(Repr::Host {
                callable: callable.clone(),
                cx: cx.clone(),
            }),
            Some(Repr::Native(body)) => Some(Repr::Native(Rc::clone(body))),
        };
        Self { repr }
    }
}

impl<A, R> Default for Function<A, R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A, R> fmt::Debug for Function<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            None => f.write_str("Function(empty)"),
            Some(Repr::Host { callable, .. }) => write!(f, "Function({callable})"),
            Some(Repr::Native(_)) => f.write_str("Function(native)"),
        }
    }
}

impl<A: ArgList, R: HostType> HostType for Function<A, R> {
    fn descr() -> Descr {
        Descr::callable(A::descrs(), R::descr())
    }
}

impl<A: ArgList + 'static, R: HostType + 'static> FromHost for Function<A, R> {
    type Slot = Self;

    fn load(src: &Object, cx: &Context) -> Result<Self, CastError> {
        match src {
            Object::None => Ok(Self::empty()),
            Object::Function(_) => Ok(Self {
                repr: Some(Repr::Host {
                    callable: src.clone(),
                    cx: cx.clone(),
                }),
            }),
            other => Err(cx.mismatch::<Self>(other)),
        }
    }

    fn take(slot: Self) -> Self {
        slot
    }
}

impl<A: NativeArgs + 'static, R: IntoHost + 'static> IntoHost for Function<A, R> {
    fn into_host(self, cx: &Context) -> Result<Object, CastError> {
        match self.repr {
            None => Ok(Object::None),
            Some(Repr::Host { callable, .. }) => Ok(callable),
            Some(Repr::Native(body)) => {
                let signature = Signature {
                    name: NATIVE_NAME.to_string(),
                    params: A::descrs()
                        .into_iter()
                        .map(|descr| ParamSig {
                            name: None,
                            descr,
                            default: None,
                        })
                        .collect(),
                    ret: R::descr(),
                };
                Ok(Object::function(NativeCallable {
                    params: (0..A::ARITY)
                        .map(|i| Parameter::positional_only(Signature::positional_name(i, A::ARITY)))
                        .collect(),
                    doc: signature.render(cx.registry()),
                    body,
                    cx: cx.clone(),
                }))
            }
        }
    }
}

const NATIVE_NAME: &str = "function";

/// Host view of a native closure.
struct NativeCallable<A, R> {
    params: Vec<Parameter>,
    doc: String,
    body: NativeBody<A, R>,
    cx: Context,
}

impl<A: NativeArgs, R: IntoHost> Callable for NativeCallable<A, R> {
    fn name(&self) -> &str {
        NATIVE_NAME
    }

    fn call(&self, args: &[Object], kwargs: &[(&str, Object)]) -> Result<Object, HostError> {
        let bound = bind_arguments(NATIVE_NAME, &self.params, args, kwargs)?;
        let slots = A::load(&bound, &self.cx)
            .map_err(|_| incompatible_arguments(NATIVE_NAME, &self.doc, args, kwargs))?;
        let out = (self.body)(A::take(slots))?;
        out.into_host(&self.cx)
            .map_err(|_| HostError::type_error(RETURN_CONVERSION_FAILED))
    }

    fn doc(&self) -> Option<&str> {
        Some(&self.doc)
    }
}
