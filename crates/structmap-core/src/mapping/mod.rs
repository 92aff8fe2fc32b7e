//! Mapping engine for transferring values between structurally related types
//!
//! This module implements the recursive copy that fills a destination value
//! from a source value of a different but related type, matching struct
//! fields by name and containers by shape.
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

mod associative;
mod copier;
mod fields;
mod probe;
mod sequence;

use crate::nil::is_any_nil;
use crate::reflect::{Kind, Types, Value};
use crate::{Error, MapOptions, Result};
use copier::Copier;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Main mapping function that fills `destination` from `source`
///
/// The destination must be a non-nil pointer; its target is overwritten in
/// place. A pointer source is dereferenced once before mapping.
///
/// Values of identical type are assigned directly, so pointers, sequences,
/// maps and channels reached through such an assignment are shared between
/// source and destination rather than cloned. Mutating one afterwards is
/// visible through the other.
///
/// # Arguments
///
/// * `types` - The type table both values were built from
/// * `source` - The value to read from
/// * `destination` - A pointer to the value to fill
/// * `options` - At most one [`MapOptions`]; none means loose mode
///
/// # Errors
///
/// Returns an error if:
/// - More than one options value is given
/// - Either argument is missing or a nil reference
/// - Either value's type was not issued by `types`
/// - The destination is not a pointer
/// - The two shapes cannot be mapped, or, in strict mode, a destination
///   field cannot be filled
/// - A fault is raised while mapping
///
/// On error the destination may be partially written.
///
/// # Example
///
/// ```
/// use structmap_core::{map, FieldDef, MapOptions, TypeId, Types, Value};
///
/// # fn example() -> structmap_core::Result<()> {
/// let mut types = Types::new();
/// let user = types.structure(
///     "User",
///     [FieldDef::public("Name", TypeId::STRING), FieldDef::public("Age", TypeId::INT)],
/// )?;
/// let dto = types.structure("UserDto", [FieldDef::public("Name", TypeId::STRING)])?;
/// let dto_ptr = types.pointer(dto);
///
/// let source = types.new_struct(user, [("Name", Value::string("ada")), ("Age", Value::int(36))])?;
/// let target = types.new_pointer(dto_ptr, types.zero(dto)?)?;
///
/// map(&types, Some(&source), Some(&target), &[MapOptions::strict()])?;
/// assert_eq!(types.get(&target, "Name").and_then(|v| v.as_str().map(String::from)), Some("ada".to_string()));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub fn map(
    types: &Types,
    source: Option<&Value>,
    destination: Option<&Value>,
    options: &[MapOptions],
) -> Result<()> {
    let options = MapOptions::resolve(options)?;
    Mapper::new(types, options).map(source, destination)
}

/// Like [`map`], but panics with the error message on failure
pub fn must_map(
    types: &Types,
    source: Option<&Value>,
    destination: Option<&Value>,
    options: &[MapOptions],
) {
    if let Err(err) = map(types, source, destination, options) {
        panic!("{}", err);
    }
}

/// Reusable mapping handle bound to one type table and one policy
#[derive(Debug, Clone, Copy)]
pub struct Mapper<'t> {
    types: &'t Types,
    options: MapOptions,
}

impl<'t> Mapper<'t> {
    pub fn new(types: &'t Types, options: MapOptions) -> Self {
        Self { types, options }
    }

    pub fn options(&self) -> MapOptions {
        self.options
    }

    /// Fill the target of `destination` from `source`
    ///
    /// See [`map`] for the contract.
    pub fn map(&self, source: Option<&Value>, destination: Option<&Value>) -> Result<()> {
        let source = match source {
            Some(value) if !is_any_nil(Some(value)) => value,
            _ => return Err(Error::NilSource),
        };
        let destination = match destination {
            Some(value) if !is_any_nil(Some(value)) => value,
            _ => return Err(Error::NilDestination),
        };
        for value in [source, destination] {
            if !self.types.contains(value.ty()) {
                return Err(Error::Definition {
                    message: format!("{:?} is not registered in this type table", value.ty()),
                });
            }
        }
        if self.types.kind(destination.ty()) != Kind::Pointer {
            return Err(Error::DestinationNotPointer {
                type_name: self.types.name(destination.ty()).to_string(),
            });
        }

        log::debug!(
            "mapping {} into {} ({})",
            self.types.name(source.ty()),
            self.types.name(destination.ty()),
            self.options
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.map_root(source, destination)));
        match outcome {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::warn!("caught fault mapping root value: {}", message);
                Err(Error::Fault {
                    field: None,
                    source_type: self.types.name(source.ty()).to_string(),
                    dest_type: self.types.name(destination.ty()).to_string(),
                    message,
                })
            }
        }
    }

    fn map_root(&self, source: &Value, destination: &Value) -> Result<()> {
        let copier = Copier::new(self.types, self.options.exact);
        let mut target = destination.pointee_mut().ok_or(Error::NilDestination)?;
        match source.pointee() {
            Some(inner) => copier.copy(&inner, &mut target),
            None => copier.copy(source, &mut target),
        }
    }
}

/// Text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{FieldDef, TypeId};

    #[test]
    fn test_preconditions_are_checked_in_order() {
        let mut types = Types::new();
        let ptr = types.pointer(TypeId::INT);
        let nil = types.zero(ptr).unwrap();
        let target = types.new_pointer(ptr, Value::int(1)).unwrap();

        let err = map(&types, None, None, &[MapOptions::loose(), MapOptions::strict()]);
        assert_eq!(err, Err(Error::TooManyOptions { count: 2 }));
        assert_eq!(map(&types, None, Some(&target), &[]), Err(Error::NilSource));
        assert_eq!(map(&types, Some(&nil), Some(&target), &[]), Err(Error::NilSource));
        assert_eq!(map(&types, Some(&Value::int(2)), None, &[]), Err(Error::NilDestination));
        assert_eq!(map(&types, Some(&Value::int(2)), Some(&nil), &[]), Err(Error::NilDestination));
        assert_eq!(
            map(&types, Some(&Value::int(2)), Some(&Value::int(0)), &[]),
            Err(Error::DestinationNotPointer {
                type_name: "int".to_string()
            })
        );
        assert_eq!(target.pointee().unwrap().as_int(), Some(1));
    }

    #[test]
    fn test_values_from_another_table_are_rejected() {
        let mut other = Types::new();
        let user = other
            .structure("User", [FieldDef::public("Name", TypeId::STRING)])
            .unwrap();
        let user_ptr = other.pointer(user);
        let foreign = other.new_pointer(user_ptr, other.zero(user).unwrap()).unwrap();

        let mut types = Types::new();
        let ptr = types.pointer(TypeId::INT);
        let target = types.new_pointer(ptr, Value::int(1)).unwrap();
        let local = Value::int(2);

        for (source, dest) in [(&local, &foreign), (&foreign, &target)] {
            let err = map(&types, Some(source), Some(dest), &[]).unwrap_err();
            assert!(matches!(err, Error::Definition { .. }));
        }
        assert_eq!(target.pointee().unwrap().as_int(), Some(1));
    }

    #[test]
    fn test_pointer_source_is_dereferenced() {
        let mut types = Types::new();
        let ptr = types.pointer(TypeId::STRING);
        let source = types.new_pointer(ptr, Value::string("x")).unwrap();
        let target = types.new_pointer(ptr, Value::string("")).unwrap();

        map(&types, Some(&source), Some(&target), &[]).unwrap();
        assert_eq!(target.pointee().unwrap().as_str(), Some("x"));
        assert!(!target.shares_reference_with(&source));
    }

    #[test]
    fn test_mapping_a_pointer_onto_itself_is_a_root_fault() {
        let mut types = Types::new();
        let node = types
            .structure("Node", [FieldDef::public("Name", TypeId::STRING)])
            .unwrap();
        let node_ptr = types.pointer(node);
        let target = types.new_pointer(node_ptr, types.zero(node).unwrap()).unwrap();

        let err = map(&types, Some(&target), Some(&target), &[]).unwrap_err();
        assert!(matches!(err, Error::Fault { field: None, .. }));
    }

    #[test]
    #[should_panic(expected = "Destination must not be nil")]
    fn test_must_map_panics_with_error_message() {
        let types = Types::new();
        must_map(&types, Some(&Value::int(1)), None, &[]);
    }

    #[test]
    fn test_mapper_keeps_options() {
        let types = Types::new();
        let mapper = Mapper::new(&types, MapOptions::strict());
        assert!(mapper.options().exact);
    }

    #[test]
    fn test_panic_message_extracts_text() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
