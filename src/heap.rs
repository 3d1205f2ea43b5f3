use super::classify::ClassKind;
use std::borrow::Cow;
use std::fmt::Debug;
use std::hash::Hash;

/// Identity of a heap object as seen by the bridge processor.
///
/// Implemented for every `Copy + Eq + Hash + Debug` type, typically an
/// address or a handle index.
pub trait BridgeObject: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> BridgeObject for T {}

/// Receives the outgoing references of an object.
pub trait RefVisitor<O> {
    fn visit(&mut self, referent: O);
}

impl<O, F: FnMut(O)> RefVisitor<O> for F {
    fn visit(&mut self, referent: O) {
        self(referent)
    }
}

/// The view of the collector's heap that bridge processing needs.
///
/// All methods are called with the world stopped. The processor never
/// writes to the heap, it only reads the object graph through this trait.
pub trait BridgeHeap {
    type Object: BridgeObject;

    /// Calls `visitor` once for every non null reference held by `object`.
    /// Must be exhaustive and free of side effects.
    fn trace_refs<V: RefVisitor<Self::Object>>(&self, object: Self::Object, visitor: &mut V);

    /// True if ordinary reachability already proves `object` alive.
    fn is_otherwise_live(&self, object: Self::Object) -> bool;

    /// The classification of `object`'s class.
    fn class_kind(&self, object: Self::Object) -> ClassKind;

    /// Resolves an object that was moved by the current collection.
    fn forward(&self, object: Self::Object) -> Self::Object {
        object
    }

    fn class_name(&self, _object: Self::Object) -> Cow<'_, str> {
        Cow::Borrowed("object")
    }
}
