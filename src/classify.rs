use fxhash::FxHashMap;
use log::trace;
use std::hash::Hash;

/// How instances of a class take part in bridge processing.
#[repr(u8)]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum ClassKind {
    /// Instances can never reach a bridge object, they are skipped without
    /// being recorded.
    Opaque,
    /// Instances may hold references that lead to a bridge object.
    Transparent,
    /// Instances are bridge objects themselves.
    Bridge,
}

impl ClassKind {
    pub fn is_bridge(&self) -> bool {
        *self == Self::Bridge
    }

    pub fn is_opaque(&self) -> bool {
        *self == Self::Opaque
    }
}

/// The class metadata consulted when refining an embedder's verdict.
pub trait ClassInfo {
    fn name(&self) -> &str;

    /// True if instance layouts contain at least one reference field.
    fn has_references(&self) -> bool;

    fn is_sealed(&self) -> bool;

    /// The element class if this is a single dimensional array class.
    fn array_element(&self) -> Option<&Self>;
}

/// Combines the embedder's verdict for `class` with what the class layout
/// proves about it.
///
/// `embedder_kind` is only asked about classes, it never sees objects. A
/// `Bridge` or `Opaque` answer is final, a `Transparent` answer is narrowed
/// to `Opaque` when no instance could ever point at a bridge.
pub fn refine_class_kind<C, F>(class: &C, embedder_kind: F) -> ClassKind
where
    C: ClassInfo,
    F: Fn(&C) -> ClassKind,
{
    let kind = embedder_kind(class);

    if kind != ClassKind::Transparent {
        return kind;
    }

    if !class.has_references() {
        trace!(target: "tarjan_bridge", "class {} is opaque", class.name());
        return ClassKind::Opaque;
    }

    // an array of a sealed type that is not a bridge will never get to a bridge
    if let Some(element) = class.array_element() {
        if element.is_sealed() && !element.has_references() && !embedder_kind(element).is_bridge() {
            trace!(target: "tarjan_bridge", "class {} is opaque", class.name());
            return ClassKind::Opaque;
        }
    }

    ClassKind::Transparent
}

/// Memoizes class verdicts so the per object check during the DFS is a
/// single lookup.
pub struct ClassKindCache<K> {
    kinds: FxHashMap<K, ClassKind>,
}

impl<K: Hash + Eq> ClassKindCache<K> {
    pub fn new() -> Self {
        Self {
            kinds: FxHashMap::default(),
        }
    }

    pub fn get(&self, key: &K) -> Option<ClassKind> {
        self.kinds.get(key).copied()
    }

    pub fn get_or_insert_with<F: FnOnce() -> ClassKind>(&mut self, key: K, f: F) -> ClassKind {
        *self.kinds.entry(key).or_insert_with(f)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl<K: Hash + Eq> Default for ClassKindCache<K> {
    fn default() -> Self {
        Self::new()
    }
}
