//! Sum-type casters
//!
//! `UnionN` enums decode by trying their alternatives in declaration order
//! and keeping the first that accepts the host object. When alternatives
//! overlap, the earlier one always wins: `Union2<List, Vec<i64>>` keeps a
//! host list as a `List`, while `Union2<Vec<i64>, List>` converts it.

use super::{CastError, Context, FromHost, HostType, IntoHost};
use crate::host::Object;
use crate::signature::Descr;

macro_rules! union_caster {
    ($(#[$meta:meta])* $name:ident; $($V:ident),+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name<$($V),+> {
            $($V($V)),+
        }

        impl<$($V: HostType),+> HostType for $name<$($V),+> {
            fn descr() -> Descr {
                Descr::Union(vec![$($V::descr()),+])
            }
        }

        impl<$($V: FromHost),+> FromHost for $name<$($V),+> {
            type Slot = $name<$($V::Slot),+>;

            fn load(src: &Object, cx: &Context) -> Result<Self::Slot, CastError> {
                $(
                    if let Ok(slot) = $V::load(src, cx) {
                        return Ok($name::$V(slot));
                    }
                )+
                Err(CastError::NoMatchingAlternative {
                    expected: cx.expected::<Self>(),
                    got: src.type_name().to_string(),
                })
            }

            fn take(slot: Self::Slot) -> Self {
                match slot {
                    $($name::$V(s) => $name::$V($V::take(s))),+
                }
            }
        }

        impl<$($V: IntoHost),+> IntoHost for $name<$($V),+> {
            fn into_host(self, cx: &Context) -> Result<Object, CastError> {
                match self {
                    $($name::$V(v) => v.into_host(cx)),+
                }
            }
        }
    };
}

union_caster!(
    /// A value of one of two types.
    Union2; A, B
);
union_caster!(
    /// A value of one of three types.
    Union3; A, B, C
);
union_caster!(
    /// A value of one of four types.
    Union4; A, B, C, D
);
union_caster!(
    /// A value of one of five types.
    Union5; A, B, C, D, E
);
union_caster!(
    /// A value of one of six types.
    Union6; A, B, C, D, E, F
);
