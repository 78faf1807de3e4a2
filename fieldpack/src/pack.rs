//! Packing fields into one buffer and restoring them from it.
//!
//! [`pack`] walks the cached descriptor list of a type, encodes every field
//! that holds a value, and concatenates the encodings into a single buffer.
//! An offset table records, per included field, the exclusive end of its byte
//! range and its index in the descriptor list. Null fields and fields whose
//! encoding is empty are left out of both.
//!
//! [`unpack`] replays the offset table, slicing the buffer back into per-field
//! ranges and decoding each one with the inverse of its strategy.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::PackError;
use crate::field::FieldCodec;
use crate::field_set::FieldDescriptor;
use crate::node::ConfigNode;
use crate::registry::{SerializableFields, fields_of};

/// One offset table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffsetEntry {
    /// Exclusive end of the field's byte range. The start is the previous
    /// entry's end, or 0 for the first entry.
    pub end: usize,
    /// Index of the field in the type's descriptor list.
    pub field: usize,
}

/// A packed buffer together with its offset table.
///
/// This is the state a host persists alongside the rest of an instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedFields {
    buffer: Vec<u8>,
    offsets: Vec<OffsetEntry>,
}

impl PackedFields {
    /// Rebuild packed state from persisted parts. The parts are validated
    /// when unpacked, not here.
    pub fn from_parts(buffer: Vec<u8>, offsets: Vec<OffsetEntry>) -> Self {
        Self { buffer, offsets }
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<OffsetEntry>) {
        (self.buffer, self.offsets)
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn offsets(&self) -> &[OffsetEntry] {
        &self.offsets
    }

    /// `true` when no field produced data.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of packed fields.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.offsets.clear();
    }

    /// `(field index, byte range)` for every entry, in table order.
    pub fn field_ranges(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        let mut start = 0;
        self.offsets.iter().map(move |entry| {
            let range = start..entry.end;
            start = entry.end;
            (entry.field, range)
        })
    }
}

/// Encode the current values of `target`'s packable fields.
pub fn pack<T: SerializableFields>(target: &T) -> Result<PackedFields, PackError> {
    let fields = fields_of::<T>();
    let mut chunks: Vec<Vec<u8>> = Vec::with_capacity(fields.len());
    let mut offsets = Vec::with_capacity(fields.len());
    let mut total = 0;

    for (index, descriptor) in fields.iter().enumerate() {
        let Some(bytes) = encode_field(descriptor, target)? else {
            log::trace!("{}: field '{}' is unset", type_name::<T>(), descriptor.name());
            continue;
        };
        if bytes.is_empty() {
            log::trace!(
                "{}: field '{}' encoded to nothing",
                type_name::<T>(),
                descriptor.name()
            );
            continue;
        }
        total += bytes.len();
        offsets.push(OffsetEntry {
            end: total,
            field: index,
        });
        chunks.push(bytes);
    }

    let buffer = match chunks.len() {
        0 => Vec::new(),
        1 => chunks.swap_remove(0),
        _ => {
            let mut buffer = Vec::with_capacity(total);
            for chunk in &chunks {
                buffer.extend_from_slice(chunk);
            }
            buffer
        }
    };

    log::debug!(
        "{}: packed {} of {} fields into {} bytes",
        type_name::<T>(),
        offsets.len(),
        fields.len(),
        buffer.len()
    );
    Ok(PackedFields { buffer, offsets })
}

/// Restore `target`'s fields from packed state.
///
/// An empty buffer leaves `target` untouched. Fields absent from the offset
/// table keep whatever value they hold.
pub fn unpack<T: SerializableFields>(
    target: &mut T,
    packed: &PackedFields,
) -> Result<(), PackError> {
    if packed.buffer.is_empty() {
        return Ok(());
    }
    let fields = fields_of::<T>();
    let len = packed.buffer.len();

    for (index, range) in packed.field_ranges() {
        if range.end <= range.start || range.end > len {
            return Err(PackError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }
        let descriptor = fields.get(index).ok_or(PackError::UnknownField {
            index,
            count: fields.len(),
        })?;
        decode_field(descriptor, target, &packed.buffer[range])?;
    }

    log::debug!(
        "{}: unpacked {} fields from {} bytes",
        type_name::<T>(),
        packed.offsets.len(),
        len
    );
    Ok(())
}

fn encode_field<T>(
    descriptor: &FieldDescriptor<T>,
    target: &T,
) -> Result<Option<Vec<u8>>, PackError> {
    match descriptor.codec() {
        FieldCodec::Node(slot) => Ok(slot
            .node(target)
            .map(|node| node.to_text().into_bytes())),
        FieldCodec::Loadable(slot) => Ok(slot.loadable(target).map(|value| {
            let mut node = ConfigNode::new(descriptor.name());
            value.save(&mut node);
            node.to_text().into_bytes()
        })),
        FieldCodec::Binary(slot) => slot.encode(target).transpose(),
    }
}

fn decode_field<T>(
    descriptor: &FieldDescriptor<T>,
    target: &mut T,
    bytes: &[u8],
) -> Result<(), PackError> {
    match descriptor.codec() {
        FieldCodec::Node(slot) => {
            let node = ConfigNode::parse_first(std::str::from_utf8(bytes)?)?;
            slot.assign(target, node);
        }
        FieldCodec::Loadable(slot) => {
            let node = ConfigNode::parse_first(std::str::from_utf8(bytes)?)?;
            match slot.loadable_mut(target) {
                Some(existing) => existing.load(&node)?,
                None => {
                    if !slot.construct(target, &node)? {
                        log::debug!(
                            "{}: field '{}' is unset and {} has no constructor, left unset",
                            type_name::<T>(),
                            descriptor.name(),
                            descriptor.type_name()
                        );
                    }
                }
            }
        }
        FieldCodec::Binary(slot) => slot.decode(target, bytes)?,
    }
    Ok(())
}

fn type_name<T>() -> &'static str {
    std::any::type_name::<T>()
}

/// Host lifecycle hooks.
///
/// The host calls [`on_before_serialize`](Self::on_before_serialize) right
/// before it persists an instance and
/// [`on_after_deserialize`](Self::on_after_deserialize) right after it has
/// restored the instance's other state, including the [`PackedFields`] this
/// trait points at. The two are never called concurrently on one instance.
///
/// `#[derive(SerializableFields)]` implements this trait when one field of
/// type [`PackedFields`] is marked `#[packed_fields]`.
pub trait SerializationCallbacks: SerializableFields {
    fn packed_fields(&self) -> &PackedFields;

    fn packed_fields_mut(&mut self) -> &mut PackedFields;

    /// Repack the stored state from current field values.
    fn on_before_serialize(&mut self) -> Result<(), PackError> {
        self.packed_fields_mut().clear();
        let packed = pack(&*self)?;
        *self.packed_fields_mut() = packed;
        Ok(())
    }

    /// Restore field values from the stored state. The state itself is kept.
    fn on_after_deserialize(&mut self) -> Result<(), PackError> {
        let packed = std::mem::take(self.packed_fields_mut());
        let result = unpack(self, &packed);
        *self.packed_fields_mut() = packed;
        result
    }
}
