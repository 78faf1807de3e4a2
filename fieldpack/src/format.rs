//! Generic binary encoding for fields without node support.
//!
//! Wraps bincode with its default options (fixed-width little-endian
//! integers). Any `serde` type can be encoded; the decoder must be asked for
//! the same type that was written.

use crate::error::PackError;

/// Encode a serde-serializable value to bytes.
pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, PackError> {
    Ok(bincode::serialize(value)?)
}

/// Decode bytes produced by [`encode`] back into a value.
pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, PackError> {
    Ok(bincode::deserialize(bytes)?)
}
