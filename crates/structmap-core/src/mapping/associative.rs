//! Associative mapper
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use super::copier::Copier;
use super::probe;
use crate::reflect::{Data, Kind, Value};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Copy a map value by value into a fresh destination map
///
/// Key types must have the same name; keys are carried over unchanged.
pub(crate) fn map_entries(copier: &Copier<'_>, source: &Value, dest: &mut Value) -> Result<()> {
    let types = copier.types();
    let (source_key, _) = types.expect_map_types(source.ty())?;
    let (dest_key, dest_value) = types.expect_map_types(dest.ty())?;

    if types.name(source_key) != types.name(dest_key) {
        return Err(Error::MapKeyMismatch {
            source_key: types.name(source_key).to_string(),
            dest_key: types.name(dest_key).to_string(),
        });
    }

    let Data::Map(cell) = source.data() else {
        return Err(copier.shape_mismatch(source, dest, Kind::Map));
    };

    let mut target = BTreeMap::new();
    if let Some(cell) = cell {
        for (key, value) in cell.borrow().iter() {
            let mut slot = types.zero(dest_value)?;
            copier.copy(value, &mut slot)?;
            target.insert(key.clone(), slot);
        }
    }

    if target.is_empty() {
        probe::verify_compatible(copier, source.ty(), dest.ty())?;
    }

    dest.set_map(target);
    Ok(())
}
