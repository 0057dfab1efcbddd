//! Layer sets and canonical subset identities.
//!
//! A [`LayerSubset`] is a bitmask over the name-sorted [`LayerSet`]: bit `i` is set when the
//! i-th layer is a member. Two subsets with the same members have the same bits no matter in
//! which order the members were discovered, so the mask is the cache key.

use crate::{
    error::{LayerCentralityError, Result},
    types::{LayerName, MultilayerNetwork},
};
use std::fmt::{Display, Formatter};

/// Largest supported layer count (mask width guard)
pub const MAX_LAYERS: usize = 20;

/// The name-sorted layers of one network, fixed for one computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSet {
    names: Vec<LayerName>,
}

impl LayerSet {
    /// Names are sorted and deduplicated
    pub fn new<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut names: Vec<LayerName> = names.into_iter().map(|s| s.as_ref().to_string()).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    pub fn from_network(network: &MultilayerNetwork) -> Self {
        Self::new(network.layer_names())
    }

    pub fn names(&self) -> &[LayerName] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).ok()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of non-empty subsets, 2^L − 1
    pub fn subset_count(&self) -> usize {
        (1usize << self.names.len()) - 1
    }

    /// The subset containing every layer
    pub fn full(&self) -> LayerSubset {
        LayerSubset(((1u64 << self.names.len()) - 1) as u32)
    }

    /// Whether every member of `subset` is a layer of this set
    pub fn covers(&self, subset: LayerSubset) -> bool {
        subset.bits() & !self.full().bits() == 0
    }

    /// The layers that contain `node`; `None` when no layer does
    pub fn presence(&self, network: &MultilayerNetwork, node: &str) -> Option<LayerSubset> {
        let bits = self
            .names
            .iter()
            .enumerate()
            .filter(|(_, name)| network.layer(name).is_some_and(|layer| layer.contains_node(node)))
            .fold(0u32, |bits, (idx, _)| bits | 1 << idx);
        (bits != 0).then_some(LayerSubset(bits))
    }

    /// Every non-empty subset exactly once, in mask order
    pub fn subsets(&self) -> impl Iterator<Item = LayerSubset> + use<> {
        (1..=self.subset_count()).map(|bits| LayerSubset(bits as u32))
    }

    /// Canonicalise an ordered sequence of layer names (e.g. a permutation prefix)
    pub fn subset_of<S: AsRef<str>>(&self, names: &[S]) -> Result<LayerSubset> {
        if names.is_empty() {
            return Err(LayerCentralityError::EmptySubset);
        }
        let mut bits = 0u32;
        for name in names {
            let name = name.as_ref();
            let idx = self
                .index_of(name)
                .ok_or_else(|| LayerCentralityError::UnknownLayer(name.to_string()))?;
            bits |= 1 << idx;
        }
        Ok(LayerSubset(bits))
    }

    /// Sorted member names
    pub fn members(&self, subset: LayerSubset) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .enumerate()
            .filter(move |(idx, _)| subset.contains(*idx))
            .map(|(_, name)| name.as_str())
    }

    /// Human-readable canonical key for a subset
    pub fn key(&self, subset: LayerSubset) -> SubsetKey {
        SubsetKey(self.members(subset).collect::<Vec<_>>().join("+"))
    }
}

/// Bitmask identity of a set of layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerSubset(u32);

impl LayerSubset {
    /// The subset containing only the layer at `idx`
    pub fn single(idx: usize) -> Self {
        Self(1 << idx)
    }

    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits == 0 {
            return Err(LayerCentralityError::EmptySubset);
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn contains(self, idx: usize) -> bool {
        self.0 & (1 << idx) != 0
    }

    pub fn with(self, idx: usize) -> Self {
        Self(self.0 | (1 << idx))
    }

    /// Member indices in ascending order
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..u32::BITS as usize).filter(move |&idx| self.contains(idx))
    }

    /// Every non-empty subset of this one, each exactly once
    pub fn submasks(self) -> impl Iterator<Item = LayerSubset> {
        let mask = self.0;
        std::iter::successors((mask != 0).then_some(mask), move |&bits| {
            let next = (bits - 1) & mask;
            (next != 0).then_some(next)
        })
        .map(LayerSubset)
    }

    /// Remove a layer; `None` when that leaves the subset empty
    pub fn without(self, idx: usize) -> Option<Self> {
        let bits = self.0 & !(1 << idx);
        (bits != 0).then_some(Self(bits))
    }
}

/// Sorted member names joined with `+`, e.g. `lunch+work`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubsetKey(String);

impl SubsetKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SubsetKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_set_is_sorted() {
        let set = LayerSet::new(["work", "lunch", "facebook", "lunch"]);
        assert_eq!(set.names(), ["facebook", "lunch", "work"]);
        assert_eq!(set.index_of("work"), Some(2));
        assert_eq!(set.index_of("leisure"), None);
    }

    #[test]
    fn test_subsets_enumerated_once() {
        let set = LayerSet::new(["a", "b", "c", "d"]);
        let subsets: Vec<LayerSubset> = set.subsets().collect();
        assert_eq!(subsets.len(), 15);
        assert_eq!(set.subset_count(), 15);

        let mut bits: Vec<u32> = subsets.iter().map(|s| s.bits()).collect();
        bits.dedup();
        assert_eq!(bits.len(), 15);
        assert!(subsets.iter().all(|s| s.len() >= 1));
        assert_eq!(set.full().len(), 4);
    }

    #[test]
    fn test_canonical_key_ignores_order() {
        let set = LayerSet::new(["work", "lunch", "coauthor"]);
        let forward = set.subset_of(&["lunch", "work"]).unwrap();
        let backward = set.subset_of(&["work", "lunch"]).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(set.key(forward).as_str(), "lunch+work");
    }

    #[test]
    fn test_keys_do_not_collide_on_concatenation() {
        let set = LayerSet::new(["ab", "c", "a", "bc"]);
        let left = set.subset_of(&["ab", "c"]).unwrap();
        let right = set.subset_of(&["a", "bc"]).unwrap();
        assert_ne!(left, right);
        assert_ne!(set.key(left), set.key(right));
    }

    #[test]
    fn test_empty_and_unknown_lookups() {
        let set = LayerSet::new(["a", "b"]);
        let empty: [&str; 0] = [];
        assert!(matches!(
            set.subset_of(&empty),
            Err(LayerCentralityError::EmptySubset)
        ));
        assert!(matches!(
            set.subset_of(&["z"]),
            Err(LayerCentralityError::UnknownLayer(name)) if name == "z"
        ));
        assert!(LayerSubset::from_bits(0).is_err());
    }

    #[test]
    fn test_presence_and_submasks() {
        let mut network = MultilayerNetwork::new();
        network.add_edge("a", "x", "y");
        network.add_edge("b", "y", "z");
        network.add_edge("c", "x", "z");
        let set = LayerSet::from_network(&network);

        let x = set.presence(&network, "x").unwrap();
        assert_eq!(x, set.subset_of(&["a", "c"]).unwrap());
        assert_eq!(x.indices().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(set.presence(&network, "ghost"), None);

        let mut submasks: Vec<u32> = x.submasks().map(LayerSubset::bits).collect();
        submasks.sort();
        assert_eq!(submasks, vec![0b001, 0b100, 0b101]);
        assert!(set.covers(x));
        assert!(!set.covers(LayerSubset::single(5)));
    }

    #[test]
    fn test_with_and_without() {
        let subset = LayerSubset::single(0).with(2);
        assert!(subset.contains(0));
        assert!(subset.contains(2));
        assert!(!subset.contains(1));
        assert_eq!(subset.without(2), Some(LayerSubset::single(0)));
        assert_eq!(LayerSubset::single(1).without(1), None);
    }
}
