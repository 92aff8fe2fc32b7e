//! Compatibility probe for empty containers
//!
//! An empty sequence or map has no element to learn from, so one zero-valued
//! source element is mapped into one zero-valued destination slot instead.
//! Empty and populated containers thereby fail the same way. A zero value
//! can still pass where particular data would not.
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use super::copier::Copier;
use crate::reflect::{Kind, TypeId, Types};
use crate::Result;

/// Check that elements of `source_container` can map into `dest_container`
pub(crate) fn verify_compatible(
    copier: &Copier<'_>,
    source_container: TypeId,
    dest_container: TypeId,
) -> Result<()> {
    let types = copier.types();
    let pair = (
        element_type(types, source_container)?,
        element_type(types, dest_container)?,
    );

    // A pair already under probe is assumed compatible; recursive element
    // types would otherwise probe forever.
    if !copier.probing().borrow_mut().insert(pair) {
        log::trace!(
            "probe of {} into {} already running",
            types.name(pair.0),
            types.name(pair.1)
        );
        return Ok(());
    }

    log::debug!(
        "probing empty {} against {}",
        types.name(source_container),
        types.name(dest_container)
    );
    let outcome = probe_pair(copier, pair.0, pair.1);
    copier.probing().borrow_mut().remove(&pair);
    outcome
}

fn probe_pair(copier: &Copier<'_>, source_elem: TypeId, dest_elem: TypeId) -> Result<()> {
    let types = copier.types();
    let sample = types.zero(source_elem)?;
    let mut slot = types.zero(dest_elem)?;
    copier.copy(&sample, &mut slot)
}

/// Element type of a sequence, or value type of a map
fn element_type(types: &Types, container: TypeId) -> Result<TypeId> {
    match types.kind(container) {
        Kind::Map => types.expect_map_types(container).map(|(_, value)| value),
        _ => types.expect_elem(container),
    }
}
