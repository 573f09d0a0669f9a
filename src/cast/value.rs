//! Scalar casters and host-native pass-through types

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use super::{CastError, Context, FromHost, HostType, IntoHost};
use crate::host::{Dict, List, Object, Tuple};
use crate::signature::Descr;

/// Implements the three caster traits for types whose slot is the value
/// itself.
macro_rules! scalar_caster {
    ($ty:ty, $name:literal, |$src:ident, $cx:ident| $load:expr, |$v:ident| $encode:expr) => {
        impl HostType for $ty {
            fn descr() -> Descr {
                Descr::Name($name)
            }
        }

        impl FromHost for $ty {
            type Slot = $ty;

            fn load($src: &Object, $cx: &Context) -> Result<Self::Slot, CastError> {
                $load
            }

            fn take(slot: Self::Slot) -> Self {
                slot
            }
        }

        impl IntoHost for $ty {
            fn into_host(self, _cx: &Context) -> Result<Object, CastError> {
                let $v = self;
                $encode
            }
        }
    };
}

scalar_caster!(
    (),
    "None",
    |src, cx| match src {
        Object::None => Ok(()),
        other => Err(cx.mismatch::<()>(other)),
    },
    |_v| Ok(Object::None)
);

scalar_caster!(
    bool,
    "bool",
    |src, cx| src.as_bool().ok_or_else(|| cx.mismatch::<bool>(src)),
    |v| Ok(Object::Bool(v))
);

scalar_caster!(
    String,
    "str",
    |src, cx| src
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| cx.mismatch::<String>(src)),
    |v| Ok(Object::from(v))
);

scalar_caster!(
    Object,
    "object",
    |src, _cx| Ok(src.clone()),
    |v| Ok(v)
);

scalar_caster!(
    List,
    "list",
    |src, cx| src.as_list().cloned().ok_or_else(|| cx.mismatch::<List>(src)),
    |v| Ok(Object::List(v))
);

scalar_caster!(
    Tuple,
    "tuple",
    |src, cx| src.as_tuple().cloned().ok_or_else(|| cx.mismatch::<Tuple>(src)),
    |v| Ok(Object::Tuple(v))
);

scalar_caster!(
    Dict,
    "dict",
    |src, cx| src.as_dict().cloned().ok_or_else(|| cx.mismatch::<Dict>(src)),
    |v| Ok(Object::Dict(v))
);

/// Integers accept host ints only (not bools) and are range checked in
/// both directions.
macro_rules! int_caster {
    ($($ty:ty),+) => {$(
        scalar_caster!(
            $ty,
            "int",
            |src, cx| match src {
                Object::Int(v) => <$ty>::try_from(*v).map_err(|_| CastError::Overflow {
                    value: i128::from(*v),
                    target: stringify!($ty),
                }),
                other => Err(cx.mismatch::<$ty>(other)),
            },
            |v| i64::try_from(v).map(Object::Int).map_err(|_| CastError::Overflow {
                value: v as i128,
                target: "int",
            })
        );
    )+};
}

int_caster!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Floats accept host floats and ints.
macro_rules! float_caster {
    ($($ty:ty),+) => {$(
        scalar_caster!(
            $ty,
            "float",
            |src, cx| match src {
                Object::Float(v) => Ok(*v as $ty),
                Object::Int(v) => Ok(*v as $ty),
                other => Err(cx.mismatch::<$ty>(other)),
            },
            |v| Ok(Object::Float(f64::from(v)))
        );
    )+};
}

float_caster!(f32, f64);

impl HostType for &str {
    fn descr() -> Descr {
        Descr::Name("str")
    }
}

impl IntoHost for &str {
    fn into_host(self, _cx: &Context) -> Result<Object, CastError> {
        Ok(Object::str(self))
    }
}

/// A borrowed view of host text.
///
/// Decoding shares the host string's storage instead of copying it, and
/// encoding hands the same storage back.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StrView(Rc<str>);

impl StrView {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for StrView {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for StrView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq<&str> for StrView {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

scalar_caster!(
    StrView,
    "str",
    |src, cx| match src {
        Object::Str(s) => Ok(StrView(Rc::clone(s))),
        other => Err(cx.mismatch::<StrView>(other)),
    },
    |v| Ok(Object::Str(v.0))
);
