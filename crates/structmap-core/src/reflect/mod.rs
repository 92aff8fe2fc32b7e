//! Runtime type table for the structmap engine
//!
//! Rust carries no runtime reflection, so every value the engine touches is
//! described by an entry in a [`Types`] registry. A [`TypeId`] is an index into
//! that registry and equality of ids is type identity: two struct types with
//! the same fields but different names are distinct, exactly like nominal
//! types in a compiled language.
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

mod serialize;
mod value;

pub use serialize::ValueView;
pub use value::{Data, Key, Shared, Value};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Identifier of a type registered in a [`Types`] table
///
/// Ids are only meaningful for the table that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl TypeId {
    pub const BOOL: TypeId = TypeId(0);
    pub const INT: TypeId = TypeId(1);
    pub const INT8: TypeId = TypeId(2);
    pub const INT16: TypeId = TypeId(3);
    pub const INT32: TypeId = TypeId(4);
    pub const INT64: TypeId = TypeId(5);
    pub const UINT: TypeId = TypeId(6);
    pub const UINT8: TypeId = TypeId(7);
    pub const UINT16: TypeId = TypeId(8);
    pub const UINT32: TypeId = TypeId(9);
    pub const UINT64: TypeId = TypeId(10);
    pub const FLOAT32: TypeId = TypeId(11);
    pub const FLOAT64: TypeId = TypeId(12);
    pub const STRING: TypeId = TypeId(13);
}

const BUILTINS: [(&str, Kind); 14] = [
    ("bool", Kind::Bool),
    ("int", Kind::Int),
    ("int8", Kind::Int),
    ("int16", Kind::Int),
    ("int32", Kind::Int),
    ("int64", Kind::Int),
    ("uint", Kind::Uint),
    ("uint8", Kind::Uint),
    ("uint16", Kind::Uint),
    ("uint32", Kind::Uint),
    ("uint64", Kind::Uint),
    ("float32", Kind::Float),
    ("float64", Kind::Float),
    ("string", Kind::String),
];

/// Shape of a type, the unit the engine dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Pointer,
    Struct,
    Sequence,
    Map,
    Channel,
}

impl Kind {
    /// Whether values of this kind carry no nested values
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Kind::Bool | Kind::Int | Kind::Uint | Kind::Float | Kind::String
        )
    }

    /// Whether this kind may key a map
    pub fn is_hashable(self) -> bool {
        matches!(self, Kind::Bool | Kind::Int | Kind::Uint | Kind::String)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => write!(f, "bool"),
            Kind::Int => write!(f, "int"),
            Kind::Uint => write!(f, "uint"),
            Kind::Float => write!(f, "float"),
            Kind::String => write!(f, "string"),
            Kind::Pointer => write!(f, "pointer"),
            Kind::Struct => write!(f, "struct"),
            Kind::Sequence => write!(f, "sequence"),
            Kind::Map => write!(f, "map"),
            Kind::Channel => write!(f, "channel"),
        }
    }
}

/// Field declaration handed to [`Types::define_struct`]
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: Option<String>,
    ty: TypeId,
    public: bool,
}

impl FieldDef {
    /// A named field other types can read and write
    pub fn public(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            public: true,
        }
    }

    /// A named field only reachable through the identical-type path
    pub fn private(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            public: false,
        }
    }

    /// An anonymous member whose fields are promoted into the parent
    ///
    /// `ty` must be a struct or a pointer to a struct; the field takes the
    /// struct's name.
    pub fn embedded(ty: TypeId) -> Self {
        Self {
            name: None,
            ty,
            public: true,
        }
    }

    /// Turn this declaration into a private one
    pub fn into_private(mut self) -> Self {
        self.public = false;
        self
    }
}

/// Resolved field descriptor of a defined struct
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Field name; embedded members use their struct's name
    pub name: String,
    /// Declared type
    pub ty: TypeId,
    /// Whether the field is visible to other types
    pub public: bool,
    /// Whether the field is an anonymous member
    pub embedded: bool,
}

impl Field {
    /// Whether a mapping between distinct types may write this field
    pub fn is_settable(&self) -> bool {
        self.public
    }
}

#[derive(Debug, Clone)]
enum TypeDef {
    Scalar(Kind),
    Pointer(TypeId),
    Struct(Option<Vec<Field>>),
    Sequence(TypeId),
    Map { key: TypeId, value: TypeId },
    Channel(TypeId),
}

impl TypeDef {
    fn kind(&self) -> Kind {
        match self {
            TypeDef::Scalar(kind) => *kind,
            TypeDef::Pointer(_) => Kind::Pointer,
            TypeDef::Struct(_) => Kind::Struct,
            TypeDef::Sequence(_) => Kind::Sequence,
            TypeDef::Map { .. } => Kind::Map,
            TypeDef::Channel(_) => Kind::Channel,
        }
    }
}

#[derive(Debug, Clone)]
struct TypeInfo {
    name: String,
    def: TypeDef,
}

/// Registry of every type values can take
///
/// Composite types are interned: asking twice for `pointer(t)` returns the
/// same id. Struct and named scalar names must be unique.
#[derive(Debug, Clone)]
pub struct Types {
    entries: Vec<TypeInfo>,
    by_name: HashMap<String, TypeId>,
}

impl Default for Types {
    fn default() -> Self {
        Self::new()
    }
}

impl Types {
    /// Create a table holding only the predeclared scalar types
    pub fn new() -> Self {
        let mut types = Self {
            entries: Vec::with_capacity(BUILTINS.len()),
            by_name: HashMap::new(),
        };
        for (name, kind) in BUILTINS {
            types.register(name.to_string(), TypeDef::Scalar(kind));
        }
        types
    }

    fn register(&mut self, name: String, def: TypeDef) -> TypeId {
        let id = TypeId(self.entries.len());
        self.by_name.insert(name.clone(), id);
        self.entries.push(TypeInfo { name, def });
        id
    }

    fn info(&self, ty: TypeId) -> &TypeInfo {
        &self.entries[ty.0]
    }

    /// Whether `ty` was issued by this table
    ///
    /// Every other query panics on an id from a different table.
    pub fn contains(&self, ty: TypeId) -> bool {
        ty.0 < self.entries.len()
    }

    /// Look a type up by its name (`string`, `*User`, `[]int`, `map[string]User`)
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Display name of a type
    pub fn name(&self, ty: TypeId) -> &str {
        &self.info(ty).name
    }

    /// Shape of a type
    pub fn kind(&self, ty: TypeId) -> Kind {
        self.info(ty).def.kind()
    }

    /// Register a distinct named type over a scalar kind
    pub fn named_scalar(&mut self, name: &str, kind: Kind) -> Result<TypeId> {
        if !kind.is_scalar() {
            return Err(Error::Definition {
                message: format!("named scalar '{}' cannot have kind {}", name, kind),
            });
        }
        self.claim_name(name)?;
        Ok(self.register(name.to_string(), TypeDef::Scalar(kind)))
    }

    /// Pointer to `elem`, named `*T`
    pub fn pointer(&mut self, elem: TypeId) -> TypeId {
        let name = format!("*{}", self.name(elem));
        self.intern(name, TypeDef::Pointer(elem))
    }

    /// Growable sequence of `elem`, named `[]T`
    pub fn sequence(&mut self, elem: TypeId) -> TypeId {
        let name = format!("[]{}", self.name(elem));
        self.intern(name, TypeDef::Sequence(elem))
    }

    /// Channel of `elem`, named `chan T`
    pub fn channel(&mut self, elem: TypeId) -> TypeId {
        let name = format!("chan {}", self.name(elem));
        self.intern(name, TypeDef::Channel(elem))
    }

    /// Map from `key` to `value`, named `map[K]V`
    ///
    /// Keys are restricted to bool, integer and string kinds.
    pub fn map(&mut self, key: TypeId, value: TypeId) -> Result<TypeId> {
        let key_kind = self.kind(key);
        if !key_kind.is_hashable() {
            return Err(Error::Definition {
                message: format!(
                    "invalid map key type {} (kind {})",
                    self.name(key),
                    key_kind
                ),
            });
        }
        let name = format!("map[{}]{}", self.name(key), self.name(value));
        Ok(self.intern(name, TypeDef::Map { key, value }))
    }

    fn intern(&mut self, name: String, def: TypeDef) -> TypeId {
        match self.by_name.get(&name) {
            Some(id) => *id,
            None => self.register(name, def),
        }
    }

    fn claim_name(&self, name: &str) -> Result<()> {
        let mut chars = name.chars();
        let valid = chars
            .next()
            .is_some_and(|first| first.is_alphabetic() || first == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.');
        if !valid {
            return Err(Error::Definition {
                message: format!("invalid type name '{}'", name),
            });
        }
        if self.by_name.contains_key(name) {
            return Err(Error::Definition {
                message: format!("type '{}' is already registered", name),
            });
        }
        Ok(())
    }

    /// Reserve a struct name so it can be referenced before its fields exist
    pub fn declare_struct(&mut self, name: &str) -> Result<TypeId> {
        self.claim_name(name)?;
        Ok(self.register(name.to_string(), TypeDef::Struct(None)))
    }

    /// Give a declared struct its fields
    pub fn define_struct(
        &mut self,
        ty: TypeId,
        fields: impl IntoIterator<Item = FieldDef>,
    ) -> Result<()> {
        if !matches!(self.info(ty).def, TypeDef::Struct(None)) {
            return Err(Error::Definition {
                message: format!("'{}' is not an undefined struct", self.name(ty)),
            });
        }

        let mut resolved: Vec<Field> = Vec::new();
        for def in fields {
            let embedded = def.name.is_none();
            let name = match def.name {
                Some(name) => name,
                None => self.embedded_name(def.ty)?,
            };
            if resolved.iter().any(|field| field.name == name) {
                return Err(Error::Definition {
                    message: format!("duplicate field '{}' in struct {}", name, self.name(ty)),
                });
            }
            if self.contains_by_value(def.ty, ty, &mut HashSet::new()) {
                return Err(Error::Definition {
                    message: format!(
                        "invalid recursive type {}: field '{}' contains it by value",
                        self.name(ty),
                        name
                    ),
                });
            }
            resolved.push(Field {
                name,
                ty: def.ty,
                public: def.public,
                embedded,
            });
        }

        self.entries[ty.0].def = TypeDef::Struct(Some(resolved));
        Ok(())
    }

    /// Declare and define a struct in one step
    pub fn structure(
        &mut self,
        name: &str,
        fields: impl IntoIterator<Item = FieldDef>,
    ) -> Result<TypeId> {
        let ty = self.declare_struct(name)?;
        self.define_struct(ty, fields)?;
        Ok(ty)
    }

    fn embedded_name(&self, ty: TypeId) -> Result<String> {
        match self.embedded_struct(ty) {
            Some(inner) => Ok(self.name(inner).to_string()),
            None => Err(Error::Definition {
                message: format!(
                    "embedded field type {} must be a struct or a pointer to a struct",
                    self.name(ty)
                ),
            }),
        }
    }

    /// Struct reached through an embedded member of type `ty`
    fn embedded_struct(&self, ty: TypeId) -> Option<TypeId> {
        match &self.info(ty).def {
            TypeDef::Struct(_) => Some(ty),
            TypeDef::Pointer(elem) if self.kind(*elem) == Kind::Struct => Some(*elem),
            _ => None,
        }
    }

    fn contains_by_value(&self, ty: TypeId, target: TypeId, seen: &mut HashSet<TypeId>) -> bool {
        if ty == target {
            return true;
        }
        if !seen.insert(ty) {
            return false;
        }
        match &self.info(ty).def {
            TypeDef::Struct(Some(fields)) => fields
                .iter()
                .any(|field| self.contains_by_value(field.ty, target, seen)),
            _ => false,
        }
    }

    /// Fields of a defined struct, in declaration order
    pub fn fields(&self, ty: TypeId) -> Result<&[Field]> {
        match &self.info(ty).def {
            TypeDef::Struct(Some(fields)) => Ok(fields),
            TypeDef::Struct(None) => Err(Error::Definition {
                message: format!("struct {} is declared but not defined", self.name(ty)),
            }),
            other => Err(Error::Definition {
                message: format!("{} is a {}, not a struct", self.name(ty), other.kind()),
            }),
        }
    }

    /// Element type of a pointer, sequence or channel
    pub fn elem(&self, ty: TypeId) -> Option<TypeId> {
        match &self.info(ty).def {
            TypeDef::Pointer(elem) | TypeDef::Sequence(elem) | TypeDef::Channel(elem) => {
                Some(*elem)
            }
            _ => None,
        }
    }

    /// Key and value types of a map
    pub fn map_types(&self, ty: TypeId) -> Option<(TypeId, TypeId)> {
        match &self.info(ty).def {
            TypeDef::Map { key, value } => Some((*key, *value)),
            _ => None,
        }
    }

    pub(crate) fn expect_elem(&self, ty: TypeId) -> Result<TypeId> {
        self.elem(ty).ok_or_else(|| Error::Definition {
            message: format!("{} has no element type", self.name(ty)),
        })
    }

    pub(crate) fn expect_map_types(&self, ty: TypeId) -> Result<(TypeId, TypeId)> {
        self.map_types(ty).ok_or_else(|| Error::Definition {
            message: format!("{} is not a map type", self.name(ty)),
        })
    }

    /// Resolve a field by name, including fields promoted from embedded members
    ///
    /// Returns the index path from `ty` to the field. The shallowest match
    /// wins; two matches at the same depth make the name ambiguous and the
    /// lookup fails. Embedded pointers are followed into their struct.
    pub fn field_by_name(&self, ty: TypeId, name: &str) -> Option<Vec<usize>> {
        self.resolve_field(ty, name, false)
    }

    /// Like [`Types::field_by_name`], restricted to what another type can see
    ///
    /// Private fields never match and private embedded members are not
    /// searched, so every step of the returned path is public.
    pub fn visible_field_by_name(&self, ty: TypeId, name: &str) -> Option<Vec<usize>> {
        self.resolve_field(ty, name, true)
    }

    fn resolve_field(&self, ty: TypeId, name: &str, visible_only: bool) -> Option<Vec<usize>> {
        let mut level: Vec<(TypeId, Vec<usize>)> = vec![(ty, Vec::new())];
        let mut visited = HashSet::new();

        while !level.is_empty() {
            let mut matches: Vec<Vec<usize>> = Vec::new();
            let mut next = Vec::new();

            for (struct_ty, path) in level {
                if !visited.insert(struct_ty) {
                    continue;
                }
                let Ok(fields) = self.fields(struct_ty) else {
                    continue;
                };
                for (index, field) in fields.iter().enumerate() {
                    if visible_only && !field.public {
                        continue;
                    }
                    let mut field_path = path.clone();
                    field_path.push(index);
                    if field.name == name {
                        matches.push(field_path);
                    } else if field.embedded {
                        if let Some(inner) = self.embedded_struct(field.ty) {
                            next.push((inner, field_path));
                        }
                    }
                }
            }

            match matches.len() {
                0 => level = next,
                1 => return matches.pop(),
                _ => return None,
            }
        }
        None
    }

    /// Zero value of a type: false, 0, "", nil references, zeroed structs
    pub fn zero(&self, ty: TypeId) -> Result<Value> {
        let data = match &self.info(ty).def {
            TypeDef::Scalar(Kind::Bool) => Data::Bool(false),
            TypeDef::Scalar(Kind::Int) => Data::Int(0),
            TypeDef::Scalar(Kind::Uint) => Data::Uint(0),
            TypeDef::Scalar(Kind::Float) => Data::Float(0.0),
            TypeDef::Scalar(_) => Data::Str(String::new()),
            TypeDef::Pointer(_) => Data::Pointer(None),
            TypeDef::Sequence(_) => Data::Sequence(None),
            TypeDef::Map { .. } => Data::Map(None),
            TypeDef::Channel(_) => Data::Channel(None),
            TypeDef::Struct(_) => Data::Struct(
                self.fields(ty)?
                    .iter()
                    .map(|field| self.zero(field.ty))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        Ok(Value::from_parts(ty, data))
    }
}
