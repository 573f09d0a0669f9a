//! Serialization of host objects to JSON-compatible data

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::object::Object;

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Object::None => serializer.serialize_unit(),
            Object::Bool(b) => serializer.serialize_bool(*b),
            Object::Int(i) => serializer.serialize_i64(*i),
            Object::Float(f) => serializer.serialize_f64(*f),
            Object::Str(s) => serializer.serialize_str(s),
            Object::Tuple(t) => serialize_items(serializer, t.as_slice()),
            Object::List(l) => serialize_items(serializer, &l.to_vec()),
            Object::Dict(d) => {
                let items = d.items();
                let mut map = serializer.serialize_map(Some(items.len()))?;
                for (k, v) in &items {
                    match k {
                        Object::Str(s) => map.serialize_entry(&**s, v)?,
                        other => map.serialize_entry(&other.to_string(), v)?,
                    }
                }
                map.end()
            }
            Object::Instance(_) | Object::Function(_) => {
                serializer.serialize_str(&self.to_string())
            }
        }
    }
}

fn serialize_items<S: Serializer>(serializer: S, items: &[Object]) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    seq.end()
}
