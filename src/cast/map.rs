//! Associative casters
//!
//! Maps decode from host dicts; a failure on any entry aborts the whole
//! decode. Encoding inserts entries in the native container's iteration
//! order and does not sort: a `HashMap` yields an arbitrary host order, a
//! `BTreeMap` yields key order.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use super::{CastError, Context, FromHost, HostType, IntoHost};
use crate::host::{Dict, Object};
use crate::signature::Descr;

type Entries<K, V> = Vec<(<K as FromHost>::Slot, <V as FromHost>::Slot)>;

fn load_entries<K, V, M>(src: &Object, cx: &Context) -> Result<Entries<K, V>, CastError>
where
    K: FromHost,
    V: FromHost,
    M: HostType,
{
    let dict = src.as_dict().ok_or_else(|| cx.mismatch::<M>(src))?;
    let items = dict.items();
    cx.check_len(items.len())?;
    items
        .iter()
        .map(|(k, v)| {
            let key = K::load(k, cx).map_err(|e| e.at_key(k))?;
            let value = V::load(v, cx).map_err(|e| e.at_key(k))?;
            Ok((key, value))
        })
        .collect()
}

fn encode_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>, cx: &Context) -> Result<Object, CastError>
where
    K: IntoHost,
    V: IntoHost,
{
    let dict = Dict::new();
    for (k, v) in entries {
        dict.set_item(k.into_host(cx)?, v.into_host(cx)?)?;
    }
    Ok(Object::Dict(dict))
}

impl<K: HostType, V: HostType, S> HostType for HashMap<K, V, S> {
    fn descr() -> Descr {
        Descr::dict(K::descr(), V::descr())
    }
}

impl<K, V, S> FromHost for HashMap<K, V, S>
where
    K: FromHost + Eq + Hash,
    V: FromHost,
    S: BuildHasher + Default,
{
    type Slot = Entries<K, V>;

    fn load(src: &Object, cx: &Context) -> Result<Self::Slot, CastError> {
        load_entries::<K, V, Self>(src, cx)
    }

    fn take(slot: Self::Slot) -> Self {
        slot.into_iter().map(|(k, v)| (K::take(k), V::take(v))).collect()
    }
}

impl<K: IntoHost, V: IntoHost, S> IntoHost for HashMap<K, V, S> {
    fn into_host(self, cx: &Context) -> Result<Object, CastError> {
        encode_entries(self, cx)
    }
}

impl<K: HostType, V: HostType, S> HostType for hashbrown::HashMap<K, V, S> {
    fn descr() -> Descr {
        Descr::dict(K::descr(), V::descr())
    }
}

impl<K, V, S> FromHost for hashbrown::HashMap<K, V, S>
where
    K: FromHost + Eq + Hash,
    V: FromHost,
    S: BuildHasher + Default,
{
    type Slot = Entries<K, V>;

    fn load(src: &Object, cx: &Context) -> Result<Self::Slot, CastError> {
        load_entries::<K, V, Self>(src, cx)
    }

    fn take(slot: Self::Slot) -> Self {
        slot.into_iter().map(|(k, v)| (K::take(k), V::take(v))).collect()
    }
}

impl<K: IntoHost, V: IntoHost, S> IntoHost for hashbrown::HashMap<K, V, S> {
    fn into_host(self, cx: &Context) -> Result<Object, CastError> {
        encode_entries(self, cx)
    }
}

impl<K: HostType, V: HostType> HostType for BTreeMap<K, V> {
    fn descr() -> Descr {
        Descr::dict(K::descr(), V::descr())
    }
}

impl<K: FromHost + Ord, V: FromHost> FromHost for BTreeMap<K, V> {
    type Slot = Entries<K, V>;

    fn load(src: &Object, cx: &Context) -> Result<Self::Slot, CastError> {
        load_entries::<K, V, Self>(src, cx)
    }

    fn take(slot: Self::Slot) -> Self {
        slot.into_iter().map(|(k, v)| (K::take(k), V::take(v))).collect()
    }
}

impl<K: IntoHost, V: IntoHost> IntoHost for BTreeMap<K, V> {
    fn into_host(self, cx: &Context) -> Result<Object, CastError> {
        encode_entries(self, cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Position;

    fn sample() -> Object {
        let dict = Dict::new();
        for (i, key) in ["a", "b", "c"].into_iter().enumerate() {
            dict.set_item(Object::str(key), Object::Int(i as i64)).unwrap();
        }
        Object::Dict(dict)
    }

    #[test]
    fn decodes_every_map_kind() {
        let cx = Context::default();
        let std_map = HashMap::<String, i64>::from_host(&sample(), &cx).unwrap();
        assert_eq!(std_map.get("b"), Some(&1));
        let tree = BTreeMap::<String, i64>::from_host(&sample(), &cx).unwrap();
        assert_eq!(tree.keys().map(String::as_str).collect::<Vec<_>>(), ["a", "b", "c"]);
        let brown = hashbrown::HashMap::<String, i64>::from_host(&sample(), &cx).unwrap();
        assert_eq!(brown.len(), 3);
    }

    #[test]
    fn encode_preserves_native_order() {
        let cx = Context::default();
        let tree: BTreeMap<i64, String> = [(2, "y".to_string()), (1, "x".to_string())].into();
        let obj = tree.into_host(&cx).unwrap();
        assert_eq!(obj.to_string(), "{1: 'x', 2: 'y'}");
    }

    #[test]
    fn entry_failure_aborts_decode() {
        let cx = Context::default();
        let dict = Dict::new();
        dict.set_item(Object::str("ok"), Object::Int(1)).unwrap();
        dict.set_item(Object::str("bad"), Object::str("no")).unwrap();
        let err = HashMap::<String, i64>::from_host(&Object::Dict(dict), &cx).unwrap_err();
        assert_eq!(err.to_string(), "at key 'bad': expected int, got str");
        assert!(HashMap::<String, i64>::from_host(&Object::list(vec![]), &cx).is_err());
    }

    #[test]
    fn descr_renders_dict() {
        let cx = Context::default();
        assert_eq!(
            HashMap::<String, Vec<f64>>::descr().render(cx.registry(), Position::Return),
            "dict[str, list[float]]"
        );
    }
}
