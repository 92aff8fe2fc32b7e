//! Sequence mapper
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use super::copier::Copier;
use super::probe;
use crate::reflect::{Data, Kind, Value};
use crate::Result;

/// Copy a sequence element by element into a fresh destination sequence
///
/// The destination is only replaced once every element has been copied. An
/// empty (or nil) source still has its element types probed and yields an
/// empty, non-nil destination.
pub(crate) fn map_elements(copier: &Copier<'_>, source: &Value, dest: &mut Value) -> Result<()> {
    let types = copier.types();
    let elem = types.expect_elem(dest.ty())?;
    let Data::Sequence(cell) = source.data() else {
        return Err(copier.shape_mismatch(source, dest, Kind::Sequence));
    };

    let mut target = Vec::new();
    if let Some(cell) = cell {
        let items = cell.borrow();
        target.reserve(items.len());
        for item in items.iter() {
            let mut slot = types.zero(elem)?;
            copier.copy(item, &mut slot)?;
            target.push(slot);
        }
    }

    if target.is_empty() {
        probe::verify_compatible(copier, source.ty(), dest.ty())?;
    }

    log::trace!(
        "mapped {} elements of {} into {}",
        target.len(),
        types.name(source.ty()),
        types.name(dest.ty())
    );
    dest.set_sequence(target);
    Ok(())
}
