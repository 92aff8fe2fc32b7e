//! Runtime values described by the type table
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use super::{Kind, TypeId, Types};
use crate::{Error, Result};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;

/// Shared mutable cell behind every reference payload
///
/// Cloning a [`Value`] clones the `Rc`, so pointers, sequences, maps and
/// channels alias their target instead of copying it.
pub type Shared<T> = Rc<RefCell<T>>;

/// Key of a map entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Str(String),
}

impl Key {
    /// Kind a map's key type must have to hold this key
    pub fn kind(&self) -> Kind {
        match self {
            Key::Bool(_) => Kind::Bool,
            Key::Int(_) => Kind::Int,
            Key::Uint(_) => Kind::Uint,
            Key::Str(_) => Kind::String,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(value) => write!(f, "{}", value),
            Key::Int(value) => write!(f, "{}", value),
            Key::Uint(value) => write!(f, "{}", value),
            Key::Str(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<u64> for Key {
    fn from(value: u64) -> Self {
        Key::Uint(value)
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Key::Bool(value)
    }
}

/// Payload of a value; `None` marks a nil reference
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Pointer(Option<Shared<Value>>),
    /// Field values in declaration order
    Struct(Vec<Value>),
    Sequence(Option<Shared<Vec<Value>>>),
    Map(Option<Shared<BTreeMap<Key, Value>>>),
    /// Buffered elements of a channel
    Channel(Option<Shared<VecDeque<Value>>>),
}

/// A typed runtime value
///
/// Values are built through the checked constructors on [`Types`], or the
/// shortcuts below for predeclared scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    ty: TypeId,
    data: Data,
}

impl Value {
    pub(crate) fn from_parts(ty: TypeId, data: Data) -> Self {
        Self { ty, data }
    }

    pub fn bool(value: bool) -> Self {
        Self::from_parts(TypeId::BOOL, Data::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::from_parts(TypeId::INT, Data::Int(value))
    }

    pub fn int32(value: i32) -> Self {
        Self::from_parts(TypeId::INT32, Data::Int(value.into()))
    }

    pub fn int64(value: i64) -> Self {
        Self::from_parts(TypeId::INT64, Data::Int(value))
    }

    pub fn uint64(value: u64) -> Self {
        Self::from_parts(TypeId::UINT64, Data::Uint(value))
    }

    pub fn float64(value: f64) -> Self {
        Self::from_parts(TypeId::FLOAT64, Data::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::from_parts(TypeId::STRING, Data::Str(value.into()))
    }

    /// Type of this value
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// Raw payload
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Whether this is a pointer, sequence, map or channel with no target
    pub fn is_nil(&self) -> bool {
        matches!(
            self.data,
            Data::Pointer(None) | Data::Sequence(None) | Data::Map(None) | Data::Channel(None)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.data {
            Data::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.data {
            Data::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self.data {
            Data::Uint(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.data {
            Data::Float(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            Data::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Field of a struct value by position
    pub fn field(&self, index: usize) -> Option<&Value> {
        match &self.data {
            Data::Struct(fields) => fields.get(index),
            _ => None,
        }
    }

    pub(crate) fn field_mut(&mut self, index: usize) -> Option<&mut Value> {
        match &mut self.data {
            Data::Struct(fields) => fields.get_mut(index),
            _ => None,
        }
    }

    /// Borrow the target of a non-nil pointer
    pub fn pointee(&self) -> Option<Ref<'_, Value>> {
        match &self.data {
            Data::Pointer(Some(cell)) => Some(cell.borrow()),
            _ => None,
        }
    }

    /// Mutably borrow the target of a non-nil pointer
    pub fn pointee_mut(&self) -> Option<RefMut<'_, Value>> {
        match &self.data {
            Data::Pointer(Some(cell)) => Some(cell.borrow_mut()),
            _ => None,
        }
    }

    /// Number of elements of a sequence, map or channel; zero when nil
    pub fn len(&self) -> usize {
        match &self.data {
            Data::Sequence(Some(cell)) => cell.borrow().len(),
            Data::Map(Some(cell)) => cell.borrow().len(),
            Data::Channel(Some(cell)) => cell.borrow().len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of a sequence's or channel's elements
    pub fn elements(&self) -> Vec<Value> {
        match &self.data {
            Data::Sequence(Some(cell)) => cell.borrow().clone(),
            Data::Channel(Some(cell)) => cell.borrow().iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Value stored under `key` in a map
    pub fn entry(&self, key: &Key) -> Option<Value> {
        match &self.data {
            Data::Map(Some(cell)) => cell.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// Keys of a map in ascending order
    pub fn keys(&self) -> Vec<Key> {
        match &self.data {
            Data::Map(Some(cell)) => cell.borrow().keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Whether both values are references to the same cell
    pub fn shares_reference_with(&self, other: &Value) -> bool {
        match (&self.data, &other.data) {
            (Data::Pointer(Some(a)), Data::Pointer(Some(b))) => Rc::ptr_eq(a, b),
            (Data::Sequence(Some(a)), Data::Sequence(Some(b))) => Rc::ptr_eq(a, b),
            (Data::Map(Some(a)), Data::Map(Some(b))) => Rc::ptr_eq(a, b),
            (Data::Channel(Some(a)), Data::Channel(Some(b))) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Walk a field index path, dereferencing pointers met along the way
    ///
    /// The value at the end of the path is handed to `visit` as is. Returns
    /// `None` when a nil pointer sits on the path.
    pub(crate) fn visit_path<R>(
        &self,
        path: &[usize],
        visit: impl FnOnce(&Value) -> R,
    ) -> Option<R> {
        let Some((index, rest)) = path.split_first() else {
            return Some(visit(self));
        };
        match &self.data {
            Data::Pointer(Some(cell)) => cell.borrow().visit_path(path, visit),
            Data::Struct(fields) => fields.get(*index)?.visit_path(rest, visit),
            _ => None,
        }
    }

    pub(crate) fn set_pointer(&mut self, pointee: Value) {
        self.data = Data::Pointer(Some(Rc::new(RefCell::new(pointee))));
    }

    pub(crate) fn set_sequence(&mut self, items: Vec<Value>) {
        self.data = Data::Sequence(Some(Rc::new(RefCell::new(items))));
    }

    pub(crate) fn set_map(&mut self, entries: BTreeMap<Key, Value>) {
        self.data = Data::Map(Some(Rc::new(RefCell::new(entries))));
    }
}

impl Types {
    fn invalid(&self, ty: TypeId, message: impl Into<String>) -> Error {
        Error::InvalidValue {
            type_name: self.name(ty).to_string(),
            message: message.into(),
        }
    }

    fn expect_type(&self, expected: TypeId, value: &Value) -> Result<()> {
        if value.ty() == expected {
            Ok(())
        } else {
            Err(self.invalid(
                expected,
                format!("got a value of type {}", self.name(value.ty())),
            ))
        }
    }

    fn checked_elem(&self, ty: TypeId, kind: Kind) -> Result<TypeId> {
        if self.kind(ty) != kind {
            return Err(self.invalid(ty, format!("not a {} type", kind)));
        }
        self.expect_elem(ty)
    }

    /// Scalar value of a predeclared or named scalar type
    pub fn new_scalar(&self, ty: TypeId, data: Data) -> Result<Value> {
        let kind = self.kind(ty);
        let fits = matches!(
            (kind, &data),
            (Kind::Bool, Data::Bool(_))
                | (Kind::Int, Data::Int(_))
                | (Kind::Uint, Data::Uint(_))
                | (Kind::Float, Data::Float(_))
                | (Kind::String, Data::Str(_))
        );
        if !fits {
            return Err(self.invalid(ty, format!("expected a {} payload", kind)));
        }
        Ok(Value::from_parts(ty, data))
    }

    /// Non-nil pointer to a fresh cell holding `pointee`
    pub fn new_pointer(&self, ty: TypeId, pointee: Value) -> Result<Value> {
        let elem = self.checked_elem(ty, Kind::Pointer)?;
        self.expect_type(elem, &pointee)?;
        let mut value = Value::from_parts(ty, Data::Pointer(None));
        value.set_pointer(pointee);
        Ok(value)
    }

    /// Non-nil sequence holding `items`
    pub fn new_sequence(&self, ty: TypeId, items: impl IntoIterator<Item = Value>) -> Result<Value> {
        let elem = self.checked_elem(ty, Kind::Sequence)?;
        let items: Vec<Value> = items.into_iter().collect();
        for item in &items {
            self.expect_type(elem, item)?;
        }
        let mut value = Value::from_parts(ty, Data::Sequence(None));
        value.set_sequence(items);
        Ok(value)
    }

    /// Non-nil channel with `items` already buffered
    pub fn new_channel(&self, ty: TypeId, items: impl IntoIterator<Item = Value>) -> Result<Value> {
        let elem = self.checked_elem(ty, Kind::Channel)?;
        let mut buffer = VecDeque::new();
        for item in items {
            self.expect_type(elem, &item)?;
            buffer.push_back(item);
        }
        Ok(Value::from_parts(
            ty,
            Data::Channel(Some(Rc::new(RefCell::new(buffer)))),
        ))
    }

    /// Non-nil map holding `entries`
    pub fn new_map(
        &self,
        ty: TypeId,
        entries: impl IntoIterator<Item = (Key, Value)>,
    ) -> Result<Value> {
        let (key_ty, value_ty) = self
            .map_types(ty)
            .ok_or_else(|| self.invalid(ty, "not a map type"))?;
        let key_kind = self.kind(key_ty);

        let mut map = BTreeMap::new();
        for (key, value) in entries {
            if key.kind() != key_kind {
                return Err(self.invalid(
                    ty,
                    format!("key '{}' is not a {}", key, self.name(key_ty)),
                ));
            }
            self.expect_type(value_ty, &value)?;
            map.insert(key, value);
        }

        let mut value = Value::from_parts(ty, Data::Map(None));
        value.set_map(map);
        Ok(value)
    }

    /// Struct value with the named fields set and every other field zeroed
    ///
    /// Only fields declared directly on the struct can be named here.
    pub fn new_struct<'a>(
        &self,
        ty: TypeId,
        values: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<Value> {
        let fields = self.fields(ty)?;
        let mut target = self.zero(ty)?;

        for (name, value) in values {
            let index = fields
                .iter()
                .position(|field| field.name == name)
                .ok_or_else(|| self.invalid(ty, format!("no field named '{}'", name)))?;
            self.expect_type(fields[index].ty, &value)?;
            if let Some(slot) = target.field_mut(index) {
                *slot = value;
            }
        }
        Ok(target)
    }

    /// Append an element to a non-nil sequence, visible through every alias
    pub fn push(&self, sequence: &Value, item: Value) -> Result<()> {
        let elem = self.checked_elem(sequence.ty(), Kind::Sequence)?;
        self.expect_type(elem, &item)?;
        match sequence.data() {
            Data::Sequence(Some(cell)) => {
                cell.borrow_mut().push(item);
                Ok(())
            }
            _ => Err(self.invalid(sequence.ty(), "cannot append to a nil sequence")),
        }
    }

    /// Read a field by name, following promotion and a leading pointer
    ///
    /// Returns `None` when the field does not exist or sits behind a nil
    /// embedded pointer.
    pub fn get(&self, value: &Value, name: &str) -> Option<Value> {
        if let Data::Pointer(Some(cell)) = value.data() {
            return self.get(&cell.borrow(), name);
        }
        let path = self.field_by_name(value.ty(), name)?;
        value.visit_path(&path, Value::clone)
    }

    /// Replace a field declared directly on a struct value
    pub fn set(&self, target: &mut Value, name: &str, value: Value) -> Result<()> {
        let fields = self.fields(target.ty())?;
        let index = fields
            .iter()
            .position(|field| field.name == name)
            .ok_or_else(|| self.invalid(target.ty(), format!("no field named '{}'", name)))?;
        self.expect_type(fields[index].ty, &value)?;
        match target.field_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(self.invalid(target.ty(), "value does not match its struct type")),
        }
    }
}
