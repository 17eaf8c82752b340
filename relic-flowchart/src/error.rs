use thiserror::Error;

/// Typed error variants for the flowchart grading engine.
#[derive(Debug, Error)]
pub enum FlowchartError {
	#[error("Unknown category: {0}")]
	UnknownCategory(String),
	#[error("Missing label on node {0}")]
	MissingLabel(String),
	#[error("Invalid answer key for {category}: {reason}")]
	InvalidAnswerKey { category: String, reason: String },
	#[error("Invalid params: {0}")]
	InvalidParams(String),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl FlowchartError {
	/// Machine-readable error code for this variant.
	pub fn code(&self) -> &str {
		match self {
			Self::UnknownCategory(_) => "FLOWCHART_UNKNOWN_CATEGORY",
			Self::MissingLabel(_) => "FLOWCHART_MISSING_LABEL",
			Self::InvalidAnswerKey { .. } => "FLOWCHART_INVALID_ANSWER_KEY",
			Self::InvalidParams(_) => "FLOWCHART_INVALID_PARAMS",
			Self::Io(_) => "FLOWCHART_IO_ERROR",
			Self::Json(_) => "FLOWCHART_JSON_ERROR",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"flowchartCode": self.code(),
			"message": self.to_string(),
		})
	}
}
