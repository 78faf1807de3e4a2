//! Ordered field descriptor lists.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::field::{Accessor, Capability, FieldCodec};
use crate::node::{HierarchicalNode, NodeLoadable};

/// One packable field of `T`.
pub struct FieldDescriptor<T> {
    name: &'static str,
    type_name: &'static str,
    codec: FieldCodec<T>,
}

impl<T> FieldDescriptor<T> {
    /// The field name. Node-loadable fields save into a node of this name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared type of the field (the inner type for `Option` fields).
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn capability(&self) -> Capability {
        self.codec.capability()
    }

    pub fn codec(&self) -> &FieldCodec<T> {
        &self.codec
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("capability", &self.capability())
            .finish()
    }
}

/// The ordered packable fields of `T`.
///
/// Positions in this list are the field indices recorded in an offset table.
pub struct FieldSet<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> FieldSet<T> {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FieldDescriptor<T>> {
        self.fields.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor<T>> {
        self.fields.iter()
    }

    /// Index of the field called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl<'a, T> IntoIterator for &'a FieldSet<T> {
    type Item = &'a FieldDescriptor<T>;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl<T> fmt::Debug for FieldSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.fields).finish()
    }
}

/// Collects descriptors in registration order.
///
/// The derive macro calls [`push`](Self::push) with a probed codec for every
/// `#[serialize_field]` field. Manual registrations pick the strategy
/// explicitly:
///
/// ```ignore
/// impl SerializableFields for Part {
///     fn describe_fields(fields: &mut FieldSetBuilder<Self>) {
///         fields.node("config", Accessor::new(
///             |p| p.config.as_ref(),
///             |p| p.config.as_mut(),
///             |p, v| p.config = Some(v),
///         ));
///     }
/// }
/// ```
pub struct FieldSetBuilder<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T: 'static> FieldSetBuilder<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a field whose codec was resolved elsewhere. `None` marks an
    /// ineligible field, which is skipped.
    pub fn push(
        &mut self,
        name: &'static str,
        type_name: &'static str,
        codec: Option<FieldCodec<T>>,
    ) -> &mut Self {
        match codec {
            Some(codec) => {
                log::trace!(
                    "{}: field '{name}' packs as {}",
                    std::any::type_name::<T>(),
                    codec.capability()
                );
                self.fields.push(FieldDescriptor {
                    name,
                    type_name,
                    codec,
                });
            }
            None => log::trace!(
                "{}: field '{name}' of type {type_name} has no packing strategy, skipped",
                std::any::type_name::<T>()
            ),
        }
        self
    }

    pub fn node<F: HierarchicalNode>(
        &mut self,
        name: &'static str,
        access: Accessor<T, F>,
    ) -> &mut Self {
        self.push(name, std::any::type_name::<F>(), Some(FieldCodec::node(access)))
    }

    pub fn loadable<F: NodeLoadable>(
        &mut self,
        name: &'static str,
        access: Accessor<T, F>,
    ) -> &mut Self {
        self.push(
            name,
            std::any::type_name::<F>(),
            Some(FieldCodec::loadable(access)),
        )
    }

    pub fn binary<F>(&mut self, name: &'static str, access: Accessor<T, F>) -> &mut Self
    where
        F: Serialize + DeserializeOwned + 'static,
    {
        self.push(
            name,
            std::any::type_name::<F>(),
            Some(FieldCodec::binary(access)),
        )
    }

    pub fn build(self) -> FieldSet<T> {
        FieldSet {
            fields: self.fields,
        }
    }
}

impl<T: 'static> Default for FieldSetBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ConfigNode;

    struct Sample {
        config: Option<ConfigNode>,
        count: u32,
    }

    fn config_access() -> Accessor<Sample, ConfigNode> {
        Accessor::<Sample, ConfigNode>::new(
            |s| s.config.as_ref(),
            |s| s.config.as_mut(),
            |s, v| s.config = Some(v),
        )
    }

    fn count_access() -> Accessor<Sample, u32> {
        Accessor::<Sample, u32>::new(
            |s| Some(&s.count),
            |s| Some(&mut s.count),
            |s, v| s.count = v,
        )
    }

    #[test]
    fn builder_keeps_order_and_skips_ineligible() {
        let mut builder = FieldSetBuilder::<Sample>::new();
        builder
            .binary("count", count_access())
            .push("ignored", "std::fs::File", None)
            .node("config", config_access());
        let set = builder.build();

        assert_eq!(set.len(), 2);
        let names: Vec<_> = set.iter().map(FieldDescriptor::name).collect();
        assert_eq!(names, ["count", "config"]);
        assert_eq!(set.position("config"), Some(1));
        assert_eq!(
            set.get(0).map(FieldDescriptor::capability),
            Some(Capability::GenericBinary)
        );
        assert_eq!(
            set.get(1).map(FieldDescriptor::type_name),
            Some(std::any::type_name::<ConfigNode>())
        );
        assert!(set.get(2).is_none());
    }

    #[test]
    fn accessors_reach_the_instance() {
        let access = config_access();
        let mut sample = Sample {
            config: None,
            count: 0,
        };
        assert!(access.get(&sample).is_none());
        access.set(&mut sample, ConfigNode::new("X"));
        assert_eq!(access.get(&sample).map(ConfigNode::name), Some("X"));
        assert_eq!(sample.count, 0);
    }
}
