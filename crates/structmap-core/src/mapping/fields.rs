//! Struct field mapper
//!
//! Walks the destination struct's fields in declaration order and resolves
//! each one against the source by name. Embedded destination members are
//! filled from the whole source value, so promoted fields line up with the
//! source's flat or embedded layout alike.
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use super::copier::Copier;
use super::panic_message;
use crate::reflect::{Field, Value};
use crate::{Error, Result};
use std::panic::{self, AssertUnwindSafe};

/// Copy every destination field of `dest` from the struct `source`
pub(crate) fn map_fields(copier: &Copier<'_>, source: &Value, dest: &mut Value) -> Result<()> {
    let types = copier.types();
    let dest_ty = dest.ty();
    let dest_name = types.name(dest_ty);
    let fields = types.fields(dest_ty)?;

    for (index, field) in fields.iter().enumerate() {
        let slot = dest.field_mut(index).ok_or_else(|| Error::InvalidValue {
            type_name: dest_name.to_string(),
            message: format!("value has no slot for field '{}'", field.name),
        })?;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            map_field(copier, source, field, dest_name, slot)
        }));
        match outcome {
            Ok(result) => result?,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::warn!(
                    "caught fault mapping field {} of {}: {}",
                    field.name,
                    dest_name,
                    message
                );
                return Err(Error::Fault {
                    field: Some(field.name.clone()),
                    source_type: types.name(source.ty()).to_string(),
                    dest_type: dest_name.to_string(),
                    message,
                });
            }
        }
    }
    Ok(())
}

fn map_field(
    copier: &Copier<'_>,
    source: &Value,
    field: &Field,
    dest_type: &str,
    slot: &mut Value,
) -> Result<()> {
    let types = copier.types();

    if !field.is_settable() {
        return copier.skip_or_fail(Error::UnsettableField {
            field: field.name.clone(),
            source_type: types.name(source.ty()).to_string(),
            dest_type: dest_type.to_string(),
        });
    }

    if field.embedded {
        return copier.copy(source, slot);
    }

    let Some(path) = types.visible_field_by_name(source.ty(), &field.name) else {
        return copier.skip_or_fail(Error::FieldNotFound {
            field: field.name.clone(),
            source_type: types.name(source.ty()).to_string(),
            dest_type: dest_type.to_string(),
        });
    };

    match source.visit_path(&path, |value| copier.copy(value, slot)) {
        Some(result) => result,
        None => {
            log::debug!(
                "field {} sits behind a nil embedded pointer in {}, skipping",
                field.name,
                types.name(source.ty())
            );
            Ok(())
        }
    }
}
