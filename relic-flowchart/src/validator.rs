// ---------------------------------------------------------------------------
// FlowchartValidator — grades a submitted graph against an answer key
// ---------------------------------------------------------------------------
//
// Grading is a single ordered pass over the submitted edges:
//
// 1. An edge whose label pair is forbidden is wrong, even if the same pair
//    is also required.
// 2. Otherwise, an edge whose pair still has unmatched required units is
//    correct and consumes one unit.  Earlier edges win ties.
// 3. Anything else is extraneous: neither scored nor penalized.
//
// The result is valid only when every required pair was consumed, no edge
// was forbidden, and every required node label is present often enough.
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::answer_key::{AnswerKey, AnswerKeyRegistry};
use crate::error::FlowchartError;
use crate::graph::{Edge, FlowchartGraph, Label, LabelPair, Node};
use crate::multiset::Multiset;

/// Label used for an edge endpoint that does not name any submitted node.
pub const DEFAULT_FALLBACK_LABEL: &str = "Unknown";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ValidatorOptions {
	pub fallback_label: Label,
}

impl Default for ValidatorOptions {
	fn default() -> Self {
		Self {
			fallback_label: Label::fixed(DEFAULT_FALLBACK_LABEL),
		}
	}
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A required node label present fewer times than the key demands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDeficit {
	pub label: Label,
	pub required: usize,
	pub present: usize,
	pub deficit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
	pub category: Option<String>,
	pub valid: bool,
	pub score: usize,
	pub total_required: usize,
	pub percentage: u32,
	/// Edges that satisfied a required connection, in submission order.
	/// Ids are unique.
	pub correct_edge_ids: Vec<String>,
	/// Edges that made a forbidden connection, in submission order.
	pub wrong_edge_ids: Vec<String>,
	pub is_perfect: bool,
	pub message: String,
	pub missing_nodes: Vec<NodeDeficit>,
	/// Required connections no edge satisfied.
	pub unmatched_edges: Vec<LabelPair>,
}

impl ValidationResult {
	/// Definite failure for a category with no answer key.
	pub fn unknown_category(category: &str) -> Self {
		Self {
			category: Some(category.to_string()),
			valid: false,
			score: 0,
			total_required: 0,
			percentage: 0,
			correct_edge_ids: Vec::new(),
			wrong_edge_ids: Vec::new(),
			is_perfect: false,
			message: format!("Unknown category: {category}"),
			missing_nodes: Vec::new(),
			unmatched_edges: Vec::new(),
		}
	}
}

/// `round(100 * score / total)` with halves rounded up.  Zero when `total`
/// is zero.
pub fn percentage(score: usize, total: usize) -> u32 {
	if total == 0 {
		return 0;
	}
	let rounded = (200 * score + total) / (2 * total);
	u32::try_from(rounded).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Stateless grader over an injected answer-key registry.
#[derive(Debug, Clone)]
pub struct FlowchartValidator {
	registry: AnswerKeyRegistry,
	options: ValidatorOptions,
}

impl FlowchartValidator {
	pub fn new(registry: AnswerKeyRegistry, options: ValidatorOptions) -> Self {
		Self { registry, options }
	}

	pub fn registry(&self) -> &AnswerKeyRegistry {
		&self.registry
	}

	/// Replace the registry, keeping the options.
	pub fn set_registry(&mut self, registry: AnswerKeyRegistry) {
		self.registry = registry;
	}

	/// Grade against the named category.  An unknown category is reported as
	/// an error.
	pub fn try_validate_by_category(
		&self,
		category: &str,
		nodes: &[Node],
		edges: &[Edge],
	) -> Result<ValidationResult, FlowchartError> {
		let key = self.registry.get(category)?;
		let mut result = self.validate(key, nodes, edges);
		tracing::debug!(
			category,
			score = result.score,
			total_required = result.total_required,
			valid = result.valid,
			"flowchart graded"
		);
		result.category = Some(category.to_string());
		Ok(result)
	}

	/// Grade against the named category.  An unknown category yields a
	/// zero-score invalid result instead of an error.
	pub fn validate_by_category(&self, category: &str, nodes: &[Node], edges: &[Edge]) -> ValidationResult {
		match self.try_validate_by_category(category, nodes, edges) {
			Ok(result) => result,
			Err(e) => {
				tracing::warn!(category, "{}", e);
				ValidationResult::unknown_category(category)
			}
		}
	}

	/// Grade a graph snapshot against `key`.  A repeated edge id is graded
	/// once, at its first occurrence.
	pub fn validate(&self, key: &AnswerKey, nodes: &[Node], edges: &[Edge]) -> ValidationResult {
		let graph = FlowchartGraph::new(nodes, edges);

		// Node multiplicity
		let present = graph.label_counts();
		let required_nodes: Multiset<&Label> = key.required_nodes.iter().collect();
		let missing_nodes: Vec<NodeDeficit> = required_nodes
			.deficits(&present)
			.map(|(label, deficit)| NodeDeficit {
				label: (*label).clone(),
				required: required_nodes.count(label),
				present: present.count(label),
				deficit,
			})
			.collect();

		// Edge matching
		let mut remaining: Multiset<&LabelPair> = key.required_edges.iter().collect();
		let mut correct_edge_ids = Vec::new();
		let mut wrong_edge_ids = Vec::new();

		for edge in graph.edges() {
			let pair = graph.resolve(edge, &self.options.fallback_label);
			if key.is_forbidden(&pair) {
				wrong_edge_ids.push(edge.id.clone());
			} else if remaining.take(&pair) {
				correct_edge_ids.push(edge.id.clone());
			} else {
				tracing::trace!(edge_id = %edge.id, pair = %pair, "extraneous edge");
			}
		}

		let score = correct_edge_ids.len();
		let total_required = key.total_required();
		let percentage = percentage(score, total_required);
		let valid = remaining.is_empty() && wrong_edge_ids.is_empty() && missing_nodes.is_empty();
		let is_perfect = valid && score == total_required;

		let message = summarize(
			is_perfect,
			&missing_nodes,
			wrong_edge_ids.len(),
			score,
			total_required,
			percentage,
		);

		let unmatched_edges = remaining
			.iter()
			.flat_map(|(pair, count)| std::iter::repeat_n((*pair).clone(), count))
			.collect();

		ValidationResult {
			category: None,
			valid,
			score,
			total_required,
			percentage,
			correct_edge_ids,
			wrong_edge_ids,
			is_perfect,
			message,
			missing_nodes,
			unmatched_edges,
		}
	}
}

fn summarize(
	is_perfect: bool,
	missing_nodes: &[NodeDeficit],
	forbidden: usize,
	score: usize,
	total: usize,
	percentage: u32,
) -> String {
	if is_perfect {
		return "Perfect! Every required connection is in place.".to_string();
	}
	if !missing_nodes.is_empty() {
		let parts: Vec<String> = missing_nodes
			.iter()
			.map(|m| format!("{} ({} more needed)", m.label, m.deficit))
			.collect();
		return format!("Missing nodes: {}", parts.join(", "));
	}
	if forbidden > 0 {
		return format!(
			"{forbidden} forbidden connection(s) found. Score: {score}/{total} ({percentage}%)"
		);
	}
	format!("Score: {score}/{total} ({percentage}%)")
}
