//! Serde view over runtime values
//!
//! Nil references serialize as `null`, structs as objects of their public
//! fields, maps as objects keyed by the key's display form.
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use super::{Data, Types, Value};
use serde::ser::{self, Serialize, SerializeMap, SerializeSeq, Serializer};

/// A value paired with the table that describes it
#[derive(Debug, Clone, Copy)]
pub struct ValueView<'a> {
    types: &'a Types,
    value: &'a Value,
}

impl Types {
    /// Serializable view of `value`
    pub fn view<'a>(&'a self, value: &'a Value) -> ValueView<'a> {
        ValueView { types: self, value }
    }
}

impl Serialize for ValueView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value.data() {
            Data::Bool(value) => serializer.serialize_bool(*value),
            Data::Int(value) => serializer.serialize_i64(*value),
            Data::Uint(value) => serializer.serialize_u64(*value),
            Data::Float(value) => serializer.serialize_f64(*value),
            Data::Str(value) => serializer.serialize_str(value),
            Data::Pointer(None) | Data::Sequence(None) | Data::Map(None) | Data::Channel(None) => {
                serializer.serialize_none()
            }
            Data::Pointer(Some(cell)) => {
                let pointee = cell.borrow();
                self.types.view(&pointee).serialize(serializer)
            }
            Data::Struct(values) => {
                let fields = self
                    .types
                    .fields(self.value.ty())
                    .map_err(<S::Error as ser::Error>::custom)?;
                let visible: Vec<_> = fields
                    .iter()
                    .zip(values)
                    .filter(|(field, _)| field.public)
                    .collect();
                let mut map = serializer.serialize_map(Some(visible.len()))?;
                for (field, value) in visible {
                    map.serialize_entry(&field.name, &self.types.view(value))?;
                }
                map.end()
            }
            Data::Sequence(Some(cell)) => {
                let items = cell.borrow();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(&self.types.view(item))?;
                }
                seq.end()
            }
            Data::Channel(Some(cell)) => {
                let items = cell.borrow();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(&self.types.view(item))?;
                }
                seq.end()
            }
            Data::Map(Some(cell)) => {
                let entries = cell.borrow();
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries.iter() {
                    map.serialize_entry(&key.to_string(), &self.types.view(value))?;
                }
                map.end()
            }
        }
    }
}
