//! Process-wide cache of field descriptor lists, keyed by type.
//!
//! Each type's list is built the first time it is requested and then lives
//! for the rest of the process. Every later request, from any thread, returns
//! the same `&'static` list.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::RwLock;

use crate::field_set::{FieldSet, FieldSetBuilder};

/// Types whose fields can be packed into a single buffer.
///
/// Usually implemented with `#[derive(SerializableFields)]`, which registers
/// every `#[serialize_field]` field whose type is a node, node-loadable, or
/// serde-serializable, in declaration order.
///
/// The derive only accepts non-generic structs:
///
/// ```compile_fail
/// use redlilium_fieldpack::SerializableFields;
///
/// #[derive(SerializableFields)]
/// struct Wrapper<T> {
///     #[serialize_field]
///     value: Option<T>,
/// }
/// ```
///
/// ```compile_fail
/// use redlilium_fieldpack::SerializableFields;
///
/// #[derive(SerializableFields)]
/// enum Mode {
///     Idle,
///     Burn(u32),
/// }
/// ```
///
/// ```compile_fail
/// use redlilium_fieldpack::SerializableFields;
///
/// #[derive(SerializableFields)]
/// union Bits {
///     int: u32,
///     float: f32,
/// }
/// ```
///
/// and at most one `#[packed_fields]` field, which is never packed itself:
///
/// ```compile_fail
/// use redlilium_fieldpack::{PackedFields, SerializableFields};
///
/// #[derive(SerializableFields)]
/// struct Tank {
///     #[serialize_field]
///     #[packed_fields]
///     packed: PackedFields,
/// }
/// ```
///
/// ```compile_fail
/// use redlilium_fieldpack::{PackedFields, SerializableFields};
///
/// #[derive(SerializableFields)]
/// struct Tank {
///     #[packed_fields]
///     first: PackedFields,
///     #[packed_fields]
///     second: PackedFields,
/// }
/// ```
pub trait SerializableFields: Sized + 'static {
    /// Register this type's packable fields, in index order.
    fn describe_fields(fields: &mut FieldSetBuilder<Self>);
}

type Entry = &'static (dyn Any + Send + Sync);

static FIELD_CACHE: LazyLock<RwLock<HashMap<TypeId, Entry>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// The cached descriptor list for `T`, built on first use.
///
/// The list is built outside the cache lock, so `describe_fields` may itself
/// query the cache. If two threads race on the first request, one list wins
/// and the other is dropped before anyone sees it.
pub fn fields_of<T: SerializableFields>() -> &'static FieldSet<T> {
    let id = TypeId::of::<T>();
    let cached = FIELD_CACHE.read().get(&id).copied();
    let entry = match cached {
        Some(entry) => entry,
        None => {
            let mut builder = FieldSetBuilder::new();
            T::describe_fields(&mut builder);
            let built = builder.build();
            let mut cache = FIELD_CACHE.write();
            *cache.entry(id).or_insert_with(|| {
                log::debug!(
                    "cached {} packable fields for {}",
                    built.len(),
                    std::any::type_name::<T>()
                );
                let leaked: Entry = Box::leak(Box::new(built));
                leaked
            })
        }
    };
    entry
        .downcast_ref::<FieldSet<T>>()
        .expect("field cache entry stored under a foreign TypeId")
}

/// `true` once the descriptor list for `T` has been built.
pub fn is_cached<T: 'static>() -> bool {
    FIELD_CACHE.read().contains_key(&TypeId::of::<T>())
}
