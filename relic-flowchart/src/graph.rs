// ---------------------------------------------------------------------------
// Candidate graph — nodes, edges and label resolution
// ---------------------------------------------------------------------------
//
// The flowchart builder submits a snapshot of the nodes and edges the player
// drew.  Grading only looks at labels: a node's `type` is its visual shape
// and is carried through untouched.  Every node must carry a non-empty label;
// this is enforced when the node is constructed or deserialized.
// ---------------------------------------------------------------------------

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FlowchartError;
use crate::multiset::Multiset;

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// Grading identity of a node, e.g. `"Input/Output"`.  Never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
	/// Returns `None` for an empty or whitespace-only label.
	pub fn new(value: impl Into<String>) -> Option<Self> {
		let value = value.into();
		if value.trim().is_empty() {
			None
		} else {
			Some(Self(value))
		}
	}

	/// For compiled-in labels known to be non-empty.
	pub(crate) fn fixed(value: &'static str) -> Self {
		debug_assert!(!value.trim().is_empty());
		Self(value.to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl TryFrom<String> for Label {
	type Error = String;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value).ok_or_else(|| "label must not be empty".to_string())
	}
}

impl From<Label> for String {
	fn from(label: Label) -> Self {
		label.0
	}
}

impl Borrow<str> for Label {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Label {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

// ---------------------------------------------------------------------------
// LabelPair
// ---------------------------------------------------------------------------

/// A directed connection between two labels.  Serialized as
/// `["Start", "Input/Output"]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(Label, Label)", into = "(Label, Label)")]
pub struct LabelPair {
	pub source: Label,
	pub target: Label,
}

impl LabelPair {
	pub fn new(source: Label, target: Label) -> Self {
		Self { source, target }
	}
}

impl From<(Label, Label)> for LabelPair {
	fn from((source, target): (Label, Label)) -> Self {
		Self { source, target }
	}
}

impl From<LabelPair> for (Label, Label) {
	fn from(pair: LabelPair) -> Self {
		(pair.source, pair.target)
	}
}

impl fmt::Display for LabelPair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} -> {}", self.source, self.target)
	}
}

// ---------------------------------------------------------------------------
// Node / Edge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawNode")]
pub struct Node {
	pub id: String,
	pub label: Label,
	/// Visual shape from the palette.  Not used for grading.
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
}

/// Wire shape of a node before the label has been checked.
#[derive(Debug, Deserialize)]
struct RawNode {
	id: String,
	label: Option<String>,
	#[serde(rename = "type")]
	kind: Option<String>,
}

impl TryFrom<RawNode> for Node {
	type Error = FlowchartError;

	fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
		Node::new(raw.id, raw.label.unwrap_or_default(), raw.kind)
	}
}

impl Node {
	pub fn new(
		id: impl Into<String>,
		label: impl Into<String>,
		kind: Option<String>,
	) -> Result<Self, FlowchartError> {
		let id = id.into();
		match Label::new(label) {
			Some(label) => Ok(Self { id, label, kind }),
			None => Err(FlowchartError::MissingLabel(id)),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
	pub id: String,
	#[serde(rename = "sourceNodeId", alias = "source")]
	pub source: String,
	#[serde(rename = "targetNodeId", alias = "target")]
	pub target: String,
}

impl Edge {
	pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
		}
	}
}

// ---------------------------------------------------------------------------
// FlowchartGraph
// ---------------------------------------------------------------------------

/// Read-only view over a submitted graph with a `node id -> label` index.
/// Edges are kept in submission order, one per id.
pub struct FlowchartGraph<'a> {
	nodes: &'a [Node],
	edges: Vec<&'a Edge>,
	labels: HashMap<&'a str, &'a Label>,
}

impl<'a> FlowchartGraph<'a> {
	pub fn new(nodes: &'a [Node], edges: &'a [Edge]) -> Self {
		let mut labels = HashMap::with_capacity(nodes.len());
		for node in nodes {
			if labels.contains_key(node.id.as_str()) {
				tracing::debug!(node_id = %node.id, "duplicate node id ignored");
				continue;
			}
			labels.insert(node.id.as_str(), &node.label);
		}

		let mut seen = HashSet::with_capacity(edges.len());
		let edges = edges
			.iter()
			.filter(|&edge| {
				let first = seen.insert(edge.id.as_str());
				if !first {
					tracing::debug!(edge_id = %edge.id, "duplicate edge id ignored");
				}
				first
			})
			.collect();

		Self {
			nodes,
			edges,
			labels,
		}
	}

	pub fn edges(&self) -> &[&'a Edge] {
		&self.edges
	}

	/// Label of the node with `id`, if it exists.
	pub fn label_of(&self, id: &str) -> Option<&'a Label> {
		self.labels.get(id).copied()
	}

	/// How many nodes carry each label.  Every submitted node counts, even
	/// one whose id duplicates an earlier node.
	pub fn label_counts(&self) -> Multiset<&'a Label> {
		self.nodes.iter().map(|node| &node.label).collect()
	}

	/// Resolve an edge to the labels of its endpoints.  An endpoint that does
	/// not name a node in this graph resolves to `fallback`.
	pub fn resolve(&self, edge: &Edge, fallback: &Label) -> LabelPair {
		let source = self.label_of(&edge.source).unwrap_or(fallback);
		let target = self.label_of(&edge.target).unwrap_or(fallback);
		LabelPair::new(source.clone(), target.clone())
	}
}
