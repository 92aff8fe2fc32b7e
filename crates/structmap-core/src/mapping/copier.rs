//! Recursive value copier
//!
//! The dispatcher every other mapper recurses into. Destination shape picks
//! the rule, in a fixed priority: identical type, pointer, struct, sequence,
//! map, and finally the incompatible-leaf error.
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use super::{associative, fields, sequence};
use crate::nil::is_nil_pointer;
use crate::reflect::{Data, Kind, TypeId, Types, Value};
use crate::{Error, Result};
use std::cell::RefCell;
use std::collections::HashSet;

/// State of one top-level mapping call
pub(crate) struct Copier<'t> {
    types: &'t Types,
    exact: bool,
    /// Element pairs whose compatibility probe is running further up the stack
    probing: RefCell<HashSet<(TypeId, TypeId)>>,
}

impl<'t> Copier<'t> {
    pub(crate) fn new(types: &'t Types, exact: bool) -> Self {
        Self {
            types,
            exact,
            probing: RefCell::new(HashSet::new()),
        }
    }

    pub(crate) fn types(&self) -> &'t Types {
        self.types
    }

    pub(crate) fn probing(&self) -> &RefCell<HashSet<(TypeId, TypeId)>> {
        &self.probing
    }

    /// Copy `source` into `dest`
    pub(crate) fn copy(&self, source: &Value, dest: &mut Value) -> Result<()> {
        let types = self.types;

        // Reference payloads end up shared between source and destination.
        if dest.ty() == source.ty() {
            log::trace!("assigning {} directly", types.name(dest.ty()));
            *dest = source.clone();
            return Ok(());
        }

        match types.kind(dest.ty()) {
            Kind::Pointer => self.copy_into_pointer(source, dest),
            Kind::Struct => self.copy_into_struct(source, dest),
            Kind::Sequence => self.copy_into_container(source, dest, Kind::Sequence),
            Kind::Map => self.copy_into_container(source, dest, Kind::Map),
            _ => Err(Error::IncompatibleTypes {
                source_type: types.name(source.ty()).to_string(),
                dest_type: types.name(dest.ty()).to_string(),
            }),
        }
    }

    fn copy_into_pointer(&self, source: &Value, dest: &mut Value) -> Result<()> {
        if is_nil_pointer(source) {
            log::trace!(
                "nil {} leaves {} unset",
                self.types.name(source.ty()),
                self.types.name(dest.ty())
            );
            return Ok(());
        }

        let elem = self.types.expect_elem(dest.ty())?;
        let mut pointee = self.types.zero(elem)?;
        self.copy(source, &mut pointee)?;
        dest.set_pointer(pointee);
        Ok(())
    }

    fn copy_into_struct(&self, source: &Value, dest: &mut Value) -> Result<()> {
        match source.data() {
            Data::Pointer(None) => {
                let elem = self.types.expect_elem(source.ty())?;
                let zero = self.types.zero(elem)?;
                self.copy_struct_from(&zero, dest)
            }
            Data::Pointer(Some(cell)) => self.copy_struct_from(&cell.borrow(), dest),
            _ => self.copy_struct_from(source, dest),
        }
    }

    fn copy_struct_from(&self, source: &Value, dest: &mut Value) -> Result<()> {
        self.expect_kind(source, dest, Kind::Struct)?;
        fields::map_fields(self, source, dest)
    }

    fn copy_into_container(&self, source: &Value, dest: &mut Value, kind: Kind) -> Result<()> {
        match source.data() {
            Data::Pointer(None) => Ok(()),
            Data::Pointer(Some(cell)) => self.copy_container_from(&cell.borrow(), dest, kind),
            _ => self.copy_container_from(source, dest, kind),
        }
    }

    fn copy_container_from(&self, source: &Value, dest: &mut Value, kind: Kind) -> Result<()> {
        self.expect_kind(source, dest, kind)?;
        match kind {
            Kind::Map => associative::map_entries(self, source, dest),
            _ => sequence::map_elements(self, source, dest),
        }
    }

    fn expect_kind(&self, source: &Value, dest: &Value, expected: Kind) -> Result<()> {
        if self.types.kind(source.ty()) == expected {
            Ok(())
        } else {
            Err(self.shape_mismatch(source, dest, expected))
        }
    }

    pub(crate) fn shape_mismatch(&self, source: &Value, dest: &Value, expected: Kind) -> Error {
        Error::ShapeMismatch {
            expected,
            source_type: self.types.name(source.ty()).to_string(),
            dest_type: self.types.name(dest.ty()).to_string(),
        }
    }

    /// Loose mode turns an optional-field error into a skip
    pub(crate) fn skip_or_fail(&self, error: Error) -> Result<()> {
        if self.exact {
            Err(error)
        } else {
            log::debug!("skipping field in loose mode: {}", error);
            Ok(())
        }
    }
}
