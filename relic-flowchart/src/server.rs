// ---------------------------------------------------------------------------
// FlowchartServer — JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Routes incoming JSON-RPC 2.0 requests (NDJSON over stdin) to the
// validator.  One request is handled at a time; every request gets exactly
// one response line.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead, Write};

use crate::answer_key::AnswerKeyRegistry;
use crate::error::FlowchartError;
use crate::protocol::*;
use crate::transport::NdjsonTransport;
use crate::validator::FlowchartValidator;

pub struct FlowchartServer<W: Write = io::Stdout> {
	transport: NdjsonTransport<W>,
	validator: FlowchartValidator,
}

impl<W: Write> FlowchartServer<W> {
	pub fn new(transport: NdjsonTransport<W>, validator: FlowchartValidator) -> Self {
		Self {
			transport,
			validator,
		}
	}

	pub fn into_transport(self) -> NdjsonTransport<W> {
		self.transport
	}

	/// Main loop: read JSON-RPC messages from stdin, dispatch to handlers.
	pub fn run(&mut self) -> Result<(), FlowchartError> {
		let stdin = io::stdin();
		self.serve(stdin.lock())
	}

	/// Serve requests from `reader` until it is exhausted.  A line that is
	/// not UTF-8 or not JSON gets a parse error reply; read failures end the
	/// loop.
	pub fn serve<R: BufRead>(&mut self, mut reader: R) -> Result<(), FlowchartError> {
		self.transport.write_notification(
			"ready",
			serde_json::json!({ "categories": self.validator.registry().len() }),
		);

		let mut buf = Vec::new();
		loop {
			buf.clear();
			if reader.read_until(b'\n', &mut buf)? == 0 {
				break;
			}

			let trimmed = match std::str::from_utf8(&buf) {
				Ok(line) => line.trim(),
				Err(e) => {
					tracing::warn!("Parse error: {}", e);
					self.transport
						.write_error(0, PARSE_ERROR, "Parse error: invalid UTF-8", None);
					continue;
				}
			};
			if trimmed.is_empty() {
				continue;
			}

			match serde_json::from_str::<JsonRpcRequest>(trimmed) {
				Ok(req) => self.dispatch(req),
				Err(e) => {
					tracing::warn!("Parse error: {}", e);
					self.transport
						.write_error(0, PARSE_ERROR, "Parse error: invalid JSON", None);
				}
			}
		}

		Ok(())
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		tracing::debug!(id, method = %req.method, "request");

		let result = match req.method.as_str() {
			"flowchart/validate" => handle_validate(&self.validator, req.params),
			"flowchart/categories" => Ok(handle_categories(self.validator.registry())),
			"flowchart/answerKey" => handle_answer_key(self.validator.registry(), req.params),
			"flowchart/reload" => self.handle_reload(req.params),
			_ => {
				self.transport.write_error(
					id,
					METHOD_NOT_FOUND,
					format!("Unknown method: {}", req.method),
					None,
				);
				return;
			}
		};

		match result {
			Ok(value) => self.transport.write_response(id, value),
			Err(e @ FlowchartError::InvalidParams(_)) => {
				self.transport.write_error(id, INVALID_PARAMS, e.to_string(), None)
			}
			Err(e) => self.transport.write_error(
				id,
				FLOWCHART_ERROR,
				e.to_string(),
				Some(e.to_json_rpc_error()),
			),
		}
	}

	/// Swap in a freshly loaded registry.  On failure the current one stays.
	fn handle_reload(&mut self, params: serde_json::Value) -> Result<serde_json::Value, FlowchartError> {
		let p: ReloadParams = if params.is_null() {
			ReloadParams::default()
		} else {
			parse_params(params)?
		};

		let registry = match p.path.as_deref() {
			Some(path) => AnswerKeyRegistry::from_path(path)?,
			None => AnswerKeyRegistry::builtin()?,
		};
		if registry.is_empty() {
			tracing::warn!("Reloaded answer keys define no categories");
		}
		let categories = registry.len();
		self.validator.set_registry(registry);
		tracing::info!(categories, "Answer keys reloaded");

		Ok(serde_json::json!({ "categories": categories }))
	}
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn parse_params<T: serde::de::DeserializeOwned>(params: serde_json::Value) -> Result<T, FlowchartError> {
	serde_json::from_value(params).map_err(|e| FlowchartError::InvalidParams(e.to_string()))
}

fn handle_validate(
	validator: &FlowchartValidator,
	params: serde_json::Value,
) -> Result<serde_json::Value, FlowchartError> {
	let p: ValidateParams = parse_params(params)?;
	let result = validator.validate_by_category(&p.category, &p.nodes, &p.edges);
	Ok(serde_json::to_value(result)?)
}

fn handle_categories(registry: &AnswerKeyRegistry) -> serde_json::Value {
	let categories: Vec<serde_json::Value> = registry
		.iter()
		.map(|(name, key)| {
			serde_json::json!({
				"name": name,
				"description": key.description,
				"totalRequired": key.total_required(),
				"requiredNodes": key.required_nodes,
			})
		})
		.collect();
	serde_json::json!({ "categories": categories })
}

fn handle_answer_key(
	registry: &AnswerKeyRegistry,
	params: serde_json::Value,
) -> Result<serde_json::Value, FlowchartError> {
	let p: CategoryParams = parse_params(params)?;
	let key = registry.get(&p.category)?;
	Ok(serde_json::json!({ "answerKey": key }))
}
