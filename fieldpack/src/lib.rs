//! # RedLilium Field Packing
//!
//! Packs a chosen subset of a struct's fields into one contiguous byte buffer
//! plus a compact offset table, and restores them on reload.
//!
//! ## Core Types
//!
//! - [`SerializableFields`]: Registers a type's packable fields (usually derived)
//! - [`fields_of`]: Process-wide, build-once cache of a type's [`FieldSet`]
//! - [`pack`] / [`unpack`]: Encode fields into [`PackedFields`] and back
//! - [`SerializationCallbacks`]: `on_before_serialize` / `on_after_deserialize` hooks
//!
//! ## Field Strategies
//!
//! Each `#[serialize_field]` field gets one [`Capability`], resolved once when
//! the type's descriptor list is built:
//!
//! - [`HierarchicalNode`] fields are stored as the UTF-8 text of their [`ConfigNode`]
//! - [`NodeLoadable`] fields save into a node named after the field
//! - serde types are encoded with bincode via [`format`]
//!
//! Null (`None`) fields and empty encodings are omitted from the buffer.
//!
//! ```ignore
//! #[derive(SerializableFields, Default)]
//! struct FuelTank {
//!     #[serialize_field]
//!     config: Option<ConfigNode>,
//!     #[serialize_field]
//!     capacity: f64,
//!     #[packed_fields]
//!     packed: PackedFields,
//! }
//!
//! tank.on_before_serialize()?;
//! // host persists `tank.packed`, later restores it into a fresh instance
//! restored.on_after_deserialize()?;
//! ```

extern crate self as redlilium_fieldpack;

pub mod error;
pub mod field;
mod field_set;
pub mod format;
pub mod node;
mod pack;
mod registry;

pub use error::{NodeError, PackError};
pub use field::{Accessor, Capability, FieldCodec};
pub use field_set::{FieldDescriptor, FieldSet, FieldSetBuilder};
pub use fieldpack_macro::SerializableFields;
pub use node::{ConfigNode, HierarchicalNode, NodeLoadable};
pub use pack::{OffsetEntry, PackedFields, SerializationCallbacks, pack, unpack};
pub use registry::{SerializableFields, fields_of, is_cached};
