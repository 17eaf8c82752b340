// ---------------------------------------------------------------------------
// Answer keys — per-category reference flowcharts
// ---------------------------------------------------------------------------
//
// An answer key lists the node labels a correct flowchart must contain, the
// label-to-label connections it must make, and connections that are never
// allowed.  Both required lists are multisets: a label or pair listed twice
// must appear twice.
//
// The registry is immutable once loaded and is handed to the validator by
// its owner.  The compiled-in reference data lives in
// `data/answer_keys.json`; a replacement file can be loaded at runtime.
// ---------------------------------------------------------------------------

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FlowchartError;
use crate::graph::{Label, LabelPair};

const BUILTIN_ANSWER_KEYS: &str = include_str!("../data/answer_keys.json");

// ---------------------------------------------------------------------------
// AnswerKey
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnswerKey {
	pub required_nodes: Vec<Label>,
	pub required_edges: Vec<LabelPair>,
	#[serde(default)]
	pub forbidden_edges: BTreeSet<LabelPair>,
	#[serde(default)]
	pub description: String,
}

impl AnswerKey {
	/// Number of required connections, counting duplicates.
	pub fn total_required(&self) -> usize {
		self.required_edges.len()
	}

	pub fn is_forbidden(&self, pair: &LabelPair) -> bool {
		self.forbidden_edges.contains(pair)
	}

	/// Pairs listed as both required and forbidden.
	pub fn contradictions(&self) -> BTreeSet<&LabelPair> {
		self.required_edges
			.iter()
			.filter(|pair| self.forbidden_edges.contains(*pair))
			.collect()
	}

	fn check(&self, category: &str) -> Result<(), FlowchartError> {
		if self.required_edges.is_empty() {
			return Err(FlowchartError::InvalidAnswerKey {
				category: category.to_string(),
				reason: "no required edges".to_string(),
			});
		}
		for pair in self.contradictions() {
			tracing::warn!(
				category,
				pair = %pair,
				"pair is both required and forbidden; forbidden wins"
			);
		}
		Ok(())
	}
}

// ---------------------------------------------------------------------------
// AnswerKeyRegistry
// ---------------------------------------------------------------------------

/// Category name → answer key.
#[derive(Debug, Clone, Default)]
pub struct AnswerKeyRegistry {
	keys: BTreeMap<String, AnswerKey>,
}

impl AnswerKeyRegistry {
	/// The four reference categories shipped with the game.
	pub fn builtin() -> Result<Self, FlowchartError> {
		Self::from_json(BUILTIN_ANSWER_KEYS)
	}

	/// Parse a JSON object mapping category names to answer keys.
	pub fn from_json(json: &str) -> Result<Self, FlowchartError> {
		let keys: BTreeMap<String, AnswerKey> = serde_json::from_str(json)?;
		Self::from_keys(keys)
	}

	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FlowchartError> {
		let path = path.as_ref();
		let json = std::fs::read_to_string(path)?;
		let registry = Self::from_json(&json)?;
		tracing::info!(path = %path.display(), categories = registry.len(), "Loaded answer keys");
		Ok(registry)
	}

	pub fn from_keys<I, S>(keys: I) -> Result<Self, FlowchartError>
	where
		I: IntoIterator<Item = (S, AnswerKey)>,
		S: Into<String>,
	{
		let mut map = BTreeMap::new();
		for (name, key) in keys {
			let name = name.into();
			key.check(&name)?;
			map.insert(name, key);
		}
		Ok(Self { keys: map })
	}

	pub fn get(&self, category: &str) -> Result<&AnswerKey, FlowchartError> {
		self.keys
			.get(category)
			.ok_or_else(|| FlowchartError::UnknownCategory(category.to_string()))
	}

	/// Category names in sorted order.
	pub fn categories(&self) -> impl Iterator<Item = &str> {
		self.keys.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerKey)> {
		self.keys.iter().map(|(name, key)| (name.as_str(), key))
	}

	pub fn len(&self) -> usize {
		self.keys.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}
}
