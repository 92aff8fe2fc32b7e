//! Mapping configuration
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy for destination fields the source cannot fill
///
/// With `exact = false` (the default) a destination field missing from the
/// source, or one that cannot be written, is skipped. With `exact = true`
/// either case fails the mapping. Shape mismatches fail in both modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Require every destination field to be resolvable and writable
    pub exact: bool,
}

impl MapOptions {
    /// Skip destination fields the source cannot fill
    pub fn loose() -> Self {
        Self { exact: false }
    }

    /// Fail on destination fields the source cannot fill
    pub fn strict() -> Self {
        Self { exact: true }
    }

    /// Pick the options for one call out of the caller-supplied list
    ///
    /// An empty list means the default; more than one entry is rejected.
    pub fn resolve(options: &[MapOptions]) -> Result<MapOptions> {
        match options {
            [] => Ok(MapOptions::default()),
            [only] => Ok(*only),
            _ => Err(Error::TooManyOptions {
                count: options.len(),
            }),
        }
    }
}

impl fmt::Display for MapOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exact {
            write!(f, "exact")
        } else {
            write!(f, "loose")
        }
    }
}
