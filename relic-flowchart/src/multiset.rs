// ---------------------------------------------------------------------------
// Multiset — consumable counts keyed by label or label pair
// ---------------------------------------------------------------------------
//
// Grading consumes required entries one unit at a time so that duplicate
// requirements are met by distinct edges.  Backed by a BTreeMap so every
// report built from it comes out in a stable order.
// ---------------------------------------------------------------------------

use std::borrow::Borrow;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multiset<K: Ord> {
	counts: BTreeMap<K, usize>,
	total: usize,
}

impl<K: Ord> Default for Multiset<K> {
	fn default() -> Self {
		Self {
			counts: BTreeMap::new(),
			total: 0,
		}
	}
}

impl<K: Ord> Multiset<K> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, key: K) {
		*self.counts.entry(key).or_insert(0) += 1;
		self.total += 1;
	}

	/// Number of units held for `key`.
	pub fn count<Q>(&self, key: &Q) -> usize
	where
		K: Borrow<Q>,
		Q: Ord + ?Sized,
	{
		self.counts.get(key).copied().unwrap_or(0)
	}

	/// Consume one unit of `key`.  Returns `false` when none is left.
	pub fn take<Q>(&mut self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: Ord + ?Sized,
	{
		let Some(count) = self.counts.get_mut(key) else {
			return false;
		};
		*count -= 1;
		if *count == 0 {
			self.counts.remove(key);
		}
		self.total -= 1;
		true
	}

	/// Total multiplicity across all keys.
	pub fn len(&self) -> usize {
		self.total
	}

	pub fn is_empty(&self) -> bool {
		self.total == 0
	}

	pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
		self.counts.iter().map(|(k, c)| (k, *c))
	}

	/// Keys held here more often than in `present`, with the shortfall.
	pub fn deficits<'a>(&'a self, present: &'a Multiset<K>) -> impl Iterator<Item = (&'a K, usize)> {
		self.iter().filter_map(move |(key, required)| {
			let have = present.count(key);
			(required > have).then(|| (key, required - have))
		})
	}
}

impl<K: Ord> FromIterator<K> for Multiset<K> {
	fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
		let mut set = Self::new();
		for key in iter {
			set.insert(key);
		}
		set
	}
}
