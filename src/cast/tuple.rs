//! Fixed-arity casters
//!
//! Rust tuples decode from any host tuple or list of exactly the right
//! length and always encode to a host tuple.

use super::{CastError, Context, FromHost, HostType, IntoHost};
use crate::host::Object;
use crate::signature::Descr;

macro_rules! tuple_caster {
    ($len:literal; $($T:ident $idx:tt),+) => {
        impl<$($T: HostType),+> HostType for ($($T,)+) {
            fn descr() -> Descr {
                Descr::Tuple(vec![$($T::descr()),+])
            }
        }

        impl<$($T: FromHost),+> FromHost for ($($T,)+) {
            type Slot = ($($T::Slot,)+);

            fn load(src: &Object, cx: &Context) -> Result<Self::Slot, CastError> {
                let items = src.sequence_items().ok_or_else(|| cx.mismatch::<Self>(src))?;
                if items.len() != $len {
                    return Err(CastError::LengthMismatch {
                        expected: $len,
                        got: items.len(),
                    });
                }
                Ok(($($T::load(&items[$idx], cx).map_err(|e| e.at($idx))?,)+))
            }

            fn take(slot: Self::Slot) -> Self {
                ($($T::take(slot.$idx),)+)
            }
        }

        impl<$($T: IntoHost),+> IntoHost for ($($T,)+) {
            fn into_host(self, cx: &Context) -> Result<Object, CastError> {
                Ok(Object::tuple(vec![$(self.$idx.into_host(cx)?),+]))
            }
        }
    };
}

tuple_caster!(1; A 0);
tuple_caster!(2; A 0, B 1);
tuple_caster!(3; A 0, B 1, C 2);
tuple_caster!(4; A 0, B 1, C 2, D 3);
tuple_caster!(5; A 0, B 1, C 2, D 3, E 4);
tuple_caster!(6; A 0, B 1, C 2, D 3, E 4, F 5);
tuple_caster!(7; A 0, B 1, C 2, D 3, E 4, F 5, G 6);
tuple_caster!(8; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
