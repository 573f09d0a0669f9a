//! Variable-length sequence casters
//!
//! `Vec<T>` and `VecDeque<T>` decode from host tuples and lists alike and
//! encode to a host list.

use std::collections::VecDeque;

use super::{CastError, Context, FromHost, HostType, IntoHost};
use crate::host::Object;
use crate::signature::Descr;

fn load_items<T: FromHost, S: HostType>(src: &Object, cx: &Context) -> Result<Vec<T::Slot>, CastError> {
    let items = src.sequence_items().ok_or_else(|| cx.mismatch::<S>(src))?;
    cx.check_len(items.len())?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| T::load(item, cx).map_err(|e| e.at(i)))
        .collect()
}

fn encode_items<T: IntoHost>(items: impl IntoIterator<Item = T>, cx: &Context) -> Result<Object, CastError> {
    let objects = items
        .into_iter()
        .map(|item| item.into_host(cx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Object::list(objects))
}

impl<T: HostType> HostType for Vec<T> {
    fn descr() -> Descr {
        Descr::list(T::descr())
    }
}

impl<T: FromHost> FromHost for Vec<T> {
    type Slot = Vec<T::Slot>;

    fn load(src: &Object, cx: &Context) -> Result<Self::Slot, CastError> {
        load_items::<T, Self>(src, cx)
    }

    fn take(slot: Self::Slot) -> Self {
        slot.into_iter().map(T::take).collect()
    }
}

impl<T: IntoHost> IntoHost for Vec<T> {
    fn into_host(self, cx: &Context) -> Result<Object, CastError> {
        encode_items(self, cx)
    }
}

impl<T: HostType> HostType for VecDeque<T> {
    fn descr() -> Descr {
        Descr::list(T::descr())
    }
}

impl<T: FromHost> FromHost for VecDeque<T> {
    type Slot = Vec<T::Slot>;

    fn load(src: &Object, cx: &Context) -> Result<Self::Slot, CastError> {
        load_items::<T, Self>(src, cx)
    }

    fn take(slot: Self::Slot) -> Self {
        slot.into_iter().map(T::take).collect()
    }
}

impl<T: IntoHost> IntoHost for VecDeque<T> {
    fn into_host(self, cx: &Context) -> Result<Object, CastError> {
        encode_items(self, cx)
    }
}
