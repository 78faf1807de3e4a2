//! Field accessors, capability tags and per-strategy slots.
//!
//! A packable field is described by an [`Accessor`] (plain function pointers
//! that read, borrow mutably and overwrite one field of one struct) and a
//! [`FieldCodec`], the tagged variant that fixes the field's encoding strategy
//! when the descriptor list is built.
//!
//! # Capability probing
//!
//! `#[derive(SerializableFields)]` cannot ask the type system "does `F`
//! implement this trait?" at runtime, so it resolves the tag through method
//! resolution priority on a [`Probe`] wrapper. Each strategy trait is
//! implemented one reference level deeper than the next, so
//!
//! ```ignore
//! (&&&&Probe::<F>::new()).codec(access)
//! ```
//!
//! picks [`ViaHierarchicalNode`] first, then [`ViaNodeLoadable`], then
//! [`ViaGenericBinary`], and finally [`Ineligible`] (which returns `None`).
//! All four traits must be in scope and `F` must be a concrete type.
//!
//! Constructor detection works the same way with two levels:
//! `(&&Probe::<F>::new()).constructor()` yields `Some(F::default)` for types
//! implementing `Default` and `None` otherwise.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{NodeError, PackError};
use crate::format;
use crate::node::{ConfigNode, HierarchicalNode, NodeLoadable};

/// Encoding strategy of a field, decided once per field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The field is a [`ConfigNode`] (or wraps one) and is stored as its text.
    HierarchicalNode,
    /// The field saves into / loads from a node named after the field.
    NodeLoadable,
    /// The field is encoded with the generic binary encoder.
    GenericBinary,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HierarchicalNode => "hierarchical node",
            Self::NodeLoadable => "node loadable",
            Self::GenericBinary => "generic binary",
        })
    }
}

/// Typed access to one field `F` of struct `T`.
///
/// `get` returning `None` means the field is null (an `Option` field holding
/// `None`). `construct` is the no-argument constructor used when a
/// node-loadable field is null at unpack time.
pub struct Accessor<T, F> {
    get: fn(&T) -> Option<&F>,
    get_mut: fn(&mut T) -> Option<&mut F>,
    set: fn(&mut T, F),
    construct: Option<fn() -> F>,
}

impl<T, F> Clone for Accessor<T, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, F> Copy for Accessor<T, F> {}

impl<T, F> Accessor<T, F> {
    pub fn new(
        get: fn(&T) -> Option<&F>,
        get_mut: fn(&mut T) -> Option<&mut F>,
        set: fn(&mut T, F),
    ) -> Self {
        Self {
            get,
            get_mut,
            set,
            construct: None,
        }
    }

    pub fn with_constructor(mut self, construct: Option<fn() -> F>) -> Self {
        self.construct = construct;
        self
    }

    pub fn get<'a>(&self, target: &'a T) -> Option<&'a F> {
        (self.get)(target)
    }

    pub fn get_mut<'a>(&self, target: &'a mut T) -> Option<&'a mut F> {
        (self.get_mut)(target)
    }

    pub fn set(&self, target: &mut T, value: F) {
        (self.set)(target, value)
    }

    pub fn constructor(&self) -> Option<fn() -> F> {
        self.construct
    }
}

/// Access to a field stored as a node.
pub trait NodeSlot<T>: Send + Sync {
    fn node<'a>(&self, target: &'a T) -> Option<&'a ConfigNode>;

    fn assign(&self, target: &mut T, node: ConfigNode);
}

/// Access to a field that loads from and saves into a node.
pub trait LoadableSlot<T>: Send + Sync {
    fn loadable<'a>(&self, target: &'a T) -> Option<&'a dyn NodeLoadable>;

    fn loadable_mut<'a>(&self, target: &'a mut T) -> Option<&'a mut dyn NodeLoadable>;

    /// Build a fresh value, load `node` into it and assign it to the field.
    ///
    /// Returns `Ok(false)` without touching the field when the type has no
    /// constructor.
    fn construct(&self, target: &mut T, node: &ConfigNode) -> Result<bool, NodeError>;
}

/// Access to a field encoded with the generic binary encoder.
pub trait BinarySlot<T>: Send + Sync {
    /// `None` when the field is null.
    fn encode(&self, target: &T) -> Option<Result<Vec<u8>, PackError>>;

    fn decode(&self, target: &mut T, bytes: &[u8]) -> Result<(), PackError>;
}

struct Typed<T, F> {
    access: Accessor<T, F>,
}

impl<T: 'static, F: HierarchicalNode> NodeSlot<T> for Typed<T, F> {
    fn node<'a>(&self, target: &'a T) -> Option<&'a ConfigNode> {
        self.access.get(target).map(HierarchicalNode::as_node)
    }

    fn assign(&self, target: &mut T, node: ConfigNode) {
        self.access.set(target, F::from_node(node));
    }
}

impl<T: 'static, F: NodeLoadable> LoadableSlot<T> for Typed<T, F> {
    fn loadable<'a>(&self, target: &'a T) -> Option<&'a dyn NodeLoadable> {
        self.access.get(target).map(|v| v as &dyn NodeLoadable)
    }

    fn loadable_mut<'a>(&self, target: &'a mut T) -> Option<&'a mut dyn NodeLoadable> {
        self.access
            .get_mut(target)
            .map(|v| v as &mut dyn NodeLoadable)
    }

    fn construct(&self, target: &mut T, node: &ConfigNode) -> Result<bool, NodeError> {
        let Some(construct) = self.access.constructor() else {
            return Ok(false);
        };
        let mut value = construct();
        value.load(node)?;
        self.access.set(target, value);
        Ok(true)
    }
}

impl<T, F> BinarySlot<T> for Typed<T, F>
where
    T: 'static,
    F: Serialize + DeserializeOwned + 'static,
{
    fn encode(&self, target: &T) -> Option<Result<Vec<u8>, PackError>> {
        self.access.get(target).map(format::encode)
    }

    fn decode(&self, target: &mut T, bytes: &[u8]) -> Result<(), PackError> {
        let value: F = format::decode(bytes)?;
        self.access.set(target, value);
        Ok(())
    }
}

/// The encoding strategy of one field, with typed access erased behind the
/// matching slot trait.
pub enum FieldCodec<T> {
    Node(Box<dyn NodeSlot<T>>),
    Loadable(Box<dyn LoadableSlot<T>>),
    Binary(Box<dyn BinarySlot<T>>),
}

impl<T: 'static> FieldCodec<T> {
    pub fn node<F: HierarchicalNode>(access: Accessor<T, F>) -> Self {
        Self::Node(Box::new(Typed { access }))
    }

    pub fn loadable<F: NodeLoadable>(access: Accessor<T, F>) -> Self {
        Self::Loadable(Box::new(Typed { access }))
    }

    pub fn binary<F>(access: Accessor<T, F>) -> Self
    where
        F: Serialize + DeserializeOwned + 'static,
    {
        Self::Binary(Box::new(Typed { access }))
    }
}

impl<T> FieldCodec<T> {
    pub fn capability(&self) -> Capability {
        match self {
            Self::Node(_) => Capability::HierarchicalNode,
            Self::Loadable(_) => Capability::NodeLoadable,
            Self::Binary(_) => Capability::GenericBinary,
        }
    }
}

impl<T> fmt::Debug for FieldCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldCodec").field(&self.capability()).finish()
    }
}

// ---------------------------------------------------------------------------
// Probing
// ---------------------------------------------------------------------------

/// Zero-sized receiver for capability and constructor probing.
pub struct Probe<F>(PhantomData<fn() -> F>);

impl<F> Probe<F> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<F> Default for Probe<F> {
    fn default() -> Self {
        Self::new()
    }
}

pub trait ViaHierarchicalNode<F> {
    fn codec<T: 'static>(&self, access: Accessor<T, F>) -> Option<FieldCodec<T>>;
}

impl<F: HierarchicalNode> ViaHierarchicalNode<F> for &&&Probe<F> {
    fn codec<T: 'static>(&self, access: Accessor<T, F>) -> Option<FieldCodec<T>> {
        Some(FieldCodec::node(access))
    }
}

pub trait ViaNodeLoadable<F> {
    fn codec<T: 'static>(&self, access: Accessor<T, F>) -> Option<FieldCodec<T>>;
}

impl<F: NodeLoadable> ViaNodeLoadable<F> for &&Probe<F> {
    fn codec<T: 'static>(&self, access: Accessor<T, F>) -> Option<FieldCodec<T>> {
        Some(FieldCodec::loadable(access))
    }
}

pub trait ViaGenericBinary<F> {
    fn codec<T: 'static>(&self, access: Accessor<T, F>) -> Option<FieldCodec<T>>;
}

impl<F> ViaGenericBinary<F> for &Probe<F>
where
    F: Serialize + DeserializeOwned + 'static,
{
    fn codec<T: 'static>(&self, access: Accessor<T, F>) -> Option<FieldCodec<T>> {
        Some(FieldCodec::binary(access))
    }
}

pub trait Ineligible<F> {
    fn codec<T: 'static>(&self, access: Accessor<T, F>) -> Option<FieldCodec<T>>;
}

impl<F> Ineligible<F> for Probe<F> {
    fn codec<T: 'static>(&self, _access: Accessor<T, F>) -> Option<FieldCodec<T>> {
        None
    }
}

pub trait ViaDefault<F> {
    fn constructor(&self) -> Option<fn() -> F>;
}

impl<F: Default> ViaDefault<F> for &Probe<F> {
    fn constructor(&self) -> Option<fn() -> F> {
        Some(F::default as fn() -> F)
    }
}

pub trait NoConstructor<F> {
    fn constructor(&self) -> Option<fn() -> F>;
}

impl<F> NoConstructor<F> for Probe<F> {
    fn constructor(&self) -> Option<fn() -> F> {
        None
    }
}
