use serde::Deserialize;

use crate::graph::{Edge, Node};

// ── JSON-RPC 2.0 error codes ────────────────────────────────────────────────

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const FLOWCHART_ERROR: i32 = -32000;

// ── Incoming request ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
	pub id: u64,
	pub method: String,
	#[serde(default)]
	pub params: serde_json::Value,
}

// ── Params ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateParams {
	pub category: String,
	#[serde(default)]
	pub nodes: Vec<Node>,
	#[serde(default)]
	pub edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryParams {
	pub category: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadParams {
	pub path: Option<String>,
}
