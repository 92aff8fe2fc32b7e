//! Structmap Core - Structural value transfer between related types
//!
//! This crate copies data from a source value into a destination value of a
//! different but structurally related type, matching struct fields by name
//! and containers by shape. It keeps a wire or DTO shape and an internal
//! domain shape in sync without hand-written conversion code.
//!
//! # Main Components
//!
//! - **Type Table**: [`Types`] describes every type values can take
//! - **Values**: [`Value`] carries runtime data; references are shared cells
//! - **Mapping Engine**: [`map`], [`must_map`] and [`Mapper`]
//! - **Configuration**: [`MapOptions`] selects loose or strict mode
//! - **Error Handling**: one [`Error`] enum built with `thiserror`
//!
//! # Example
//!
//! ```
//! use structmap_core::{map, FieldDef, MapOptions, TypeId, Types, Value};
//!
//! fn example() -> structmap_core::Result<()> {
//!     let mut types = Types::new();
//!     let order = types.structure(
//!         "Order",
//!         [FieldDef::public("Id", TypeId::UINT64), FieldDef::public("Note", TypeId::STRING)],
//!     )?;
//!     let summary = types.structure("OrderSummary", [FieldDef::public("Id", TypeId::UINT64)])?;
//!     let summary_ptr = types.pointer(summary);
//!
//!     let source = types.new_struct(order, [("Id", Value::uint64(7))])?;
//!     let target = types.new_pointer(summary_ptr, types.zero(summary)?)?;
//!     map(&types, Some(&source), Some(&target), &[MapOptions::loose()])?;
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod error;
pub mod mapping;
pub mod nil;
pub mod options;
pub mod reflect;

// Re-export main types for convenience
pub use error::{Error, ErrorKind, Result};
pub use mapping::{map, must_map, Mapper};
pub use nil::{is_any_nil, is_nil_pointer};
pub use options::MapOptions;
pub use reflect::{Data, Field, FieldDef, Key, Kind, TypeId, Types, Value, ValueView};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
