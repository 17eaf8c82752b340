// ---------------------------------------------------------------------------
// Integration tests for relic-flowchart
//
// Each test spawns the binary, communicates over JSON-RPC 2.0 / NDJSON stdio,
// and verifies responses.
// ---------------------------------------------------------------------------

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

/// A running `relic-flowchart` child process.
struct FlowchartProcess {
	child: Child,
	reader: BufReader<std::process::ChildStdout>,
	next_id: AtomicU64,
}

impl FlowchartProcess {
	fn spawn() -> Self {
		Self::spawn_with_args(&[])
	}

	fn spawn_with_args(args: &[&str]) -> Self {
		let bin = env!("CARGO_BIN_EXE_relic-flowchart");
		let mut child = Command::new(bin)
			.args(args)
			.env_remove("RELIC_FLOWCHART_ANSWER_KEYS")
			.env_remove("RELIC_FLOWCHART_FALLBACK_LABEL")
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::null())
			.spawn()
			.expect("failed to spawn relic-flowchart");

		let stdout = child.stdout.take().expect("no stdout");
		let reader = BufReader::new(stdout);

		Self {
			child,
			reader,
			next_id: AtomicU64::new(1),
		}
	}

	fn send_line(&mut self, line: &str) {
		let stdin = self.child.stdin.as_mut().expect("no stdin");
		stdin.write_all(line.as_bytes()).unwrap();
		stdin.write_all(b"\n").unwrap();
		stdin.flush().unwrap();
	}

	/// Next message that carries an `id`, skipping notifications.
	fn read_response(&mut self) -> Value {
		loop {
			let mut buf = String::new();
			let bytes_read = self
				.reader
				.read_line(&mut buf)
				.expect("failed to read from stdout");
			if bytes_read == 0 {
				panic!("unexpected EOF from relic-flowchart");
			}
			let buf = buf.trim();
			if buf.is_empty() {
				continue;
			}
			let parsed: Value = serde_json::from_str(buf)
				.unwrap_or_else(|e| panic!("invalid JSON from engine: {e}\nline: {buf}"));
			if parsed.get("id").is_none() {
				continue;
			}
			return parsed;
		}
	}

	fn send(&mut self, method: &str, params: Value) -> RpcResponse {
		let id = self.next_id.fetch_add(1, Ordering::SeqCst);
		let request = json!({
			"jsonrpc": "2.0",
			"id": id,
			"method": method,
			"params": params,
		});
		self.send_line(&request.to_string());

		let parsed = self.read_response();
		assert_eq!(parsed["id"].as_u64(), Some(id), "response id mismatch");
		if let Some(error) = parsed.get("error") {
			return RpcResponse::Error(error.clone());
		}
		RpcResponse::Ok(parsed.get("result").cloned().unwrap_or(Value::Null))
	}

	fn call(&mut self, method: &str, params: Value) -> Value {
		match self.send(method, params) {
			RpcResponse::Ok(v) => v,
			RpcResponse::Error(e) => panic!("expected success, got error: {e}"),
		}
	}

	fn call_err(&mut self, method: &str, params: Value) -> Value {
		match self.send(method, params) {
			RpcResponse::Error(e) => e,
			RpcResponse::Ok(v) => panic!("expected error, got success: {v}"),
		}
	}
}

impl Drop for FlowchartProcess {
	fn drop(&mut self) {
		drop(self.child.stdin.take());
		let _ = self.child.wait();
	}
}

#[derive(Debug)]
enum RpcResponse {
	Ok(Value),
	Error(Value),
}

fn programming_nodes(io_nodes: usize) -> Vec<Value> {
	let mut nodes = vec![
		json!({"id": "start", "label": "Start", "type": "terminator"}),
		json!({"id": "check", "label": "Decision", "type": "diamond"}),
		json!({"id": "end", "label": "End", "type": "terminator"}),
	];
	for i in 0..io_nodes {
		nodes.push(json!({"id": format!("io{i}"), "label": "Input/Output", "type": "parallelogram"}));
	}
	nodes
}

fn programming_edges() -> Vec<Value> {
	json!([
		{"id": "e1", "sourceNodeId": "start", "targetNodeId": "io0"},
		{"id": "e2", "sourceNodeId": "io0", "targetNodeId": "check"},
		{"id": "e3", "sourceNodeId": "check", "targetNodeId": "io1"},
		{"id": "e4", "sourceNodeId": "check", "targetNodeId": "io2"},
		{"id": "e5", "sourceNodeId": "io1", "targetNodeId": "end"},
		{"id": "e6", "sourceNodeId": "io2", "targetNodeId": "end"},
	])
	.as_array()
	.unwrap()
	.clone()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn programming_reference_scores_perfect() {
	let mut proc = FlowchartProcess::spawn();
	let result = proc.call(
		"flowchart/validate",
		json!({
			"category": "Programming",
			"nodes": programming_nodes(3),
			"edges": programming_edges(),
		}),
	);

	assert_eq!(result["score"], 6);
	assert_eq!(result["totalRequired"], 6);
	assert_eq!(result["percentage"], 100);
	assert_eq!(result["valid"], true);
	assert_eq!(result["isPerfect"], true);
	assert_eq!(result["category"], "Programming");
}

#[test]
fn two_io_nodes_are_not_enough() {
	let mut proc = FlowchartProcess::spawn();
	// io2 does not exist, so e4 and e6 dangle
	let result = proc.call(
		"flowchart/validate",
		json!({
			"category": "Programming",
			"nodes": programming_nodes(2),
			"edges": programming_edges(),
		}),
	);

	assert_eq!(result["valid"], false);
	assert_eq!(result["missingNodes"][0]["label"], "Input/Output");
	assert_eq!(result["missingNodes"][0]["deficit"], 1);
}

#[test]
fn forbidden_edge_is_reported_wrong() {
	let mut proc = FlowchartProcess::spawn();
	let mut edges = programming_edges();
	edges.push(json!({"id": "skip", "source": "start", "target": "end"}));

	let result = proc.call(
		"flowchart/validate",
		json!({
			"category": "Programming",
			"nodes": programming_nodes(3),
			"edges": edges,
		}),
	);

	assert_eq!(result["wrongEdgeIds"], json!(["skip"]));
	assert_eq!(result["score"], 6);
	assert_eq!(result["valid"], false);
}

#[test]
fn unknown_category_yields_zeroed_result() {
	let mut proc = FlowchartProcess::spawn();
	let result = proc.call(
		"flowchart/validate",
		json!({"category": "NotAConfiguredCategory", "nodes": [], "edges": []}),
	);

	assert_eq!(result["totalRequired"], 0);
	assert_eq!(result["score"], 0);
	assert_eq!(result["valid"], false);
}

#[test]
fn repeated_validation_is_identical() {
	let mut proc = FlowchartProcess::spawn();
	let edges = programming_edges()[..4].to_vec();
	let params = json!({
		"category": "Programming",
		"nodes": programming_nodes(3),
		"edges": edges,
	});

	let first = proc.call("flowchart/validate", params.clone());
	let second = proc.call("flowchart/validate", params);
	assert_eq!(first, second);
	assert_eq!(first["percentage"], 67);
}

#[test]
fn missing_label_is_invalid_params() {
	let mut proc = FlowchartProcess::spawn();
	let err = proc.call_err(
		"flowchart/validate",
		json!({
			"category": "Programming",
			"nodes": [{"id": "blank", "type": "rectangle"}],
			"edges": [],
		}),
	);
	assert_eq!(err["code"], -32602);
}

#[test]
fn categories_and_answer_key() {
	let mut proc = FlowchartProcess::spawn();
	let result = proc.call("flowchart/categories", json!({}));
	let categories = result["categories"].as_array().unwrap();
	assert_eq!(categories.len(), 4);
	let os = categories
		.iter()
		.find(|c| c["name"] == "Operating Systems")
		.unwrap();
	assert_eq!(os["totalRequired"], 6);

	let key = proc.call("flowchart/answerKey", json!({"category": "Cybersecurity"}));
	assert_eq!(key["answerKey"]["requiredEdges"].as_array().unwrap().len(), 8);

	let err = proc.call_err("flowchart/answerKey", json!({"category": "Chemistry"}));
	assert_eq!(err["data"]["flowchartCode"], "FLOWCHART_UNKNOWN_CATEGORY");
}

#[test]
fn custom_answer_keys_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("keys.json");
	std::fs::write(
		&path,
		json!({
			"Pairs": {
				"description": "Two identical connections",
				"requiredNodes": ["A", "B"],
				"requiredEdges": [["A", "B"], ["A", "B"]],
				"forbiddenEdges": [["B", "A"]],
			}
		})
		.to_string(),
	)
	.unwrap();

	let mut proc = FlowchartProcess::spawn_with_args(&["--answer-keys", path.to_str().unwrap()]);
	let result = proc.call(
		"flowchart/validate",
		json!({
			"category": "Pairs",
			"nodes": [{"id": "a", "label": "A"}, {"id": "b", "label": "B"}],
			"edges": [
				{"id": "x", "sourceNodeId": "a", "targetNodeId": "b"},
				{"id": "y", "sourceNodeId": "a", "targetNodeId": "b"},
			],
		}),
	);
	assert_eq!(result["score"], 2);
	assert_eq!(result["isPerfect"], true);

	let result = proc.call(
		"flowchart/validate",
		json!({"category": "Programming", "nodes": [], "edges": []}),
	);
	assert_eq!(result["totalRequired"], 0);
}

#[test]
fn reload_switches_registry() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("keys.json");
	std::fs::write(
		&path,
		r#"{"Solo": {"requiredNodes": ["A"], "requiredEdges": [["A", "A"]]}}"#,
	)
	.unwrap();

	let mut proc = FlowchartProcess::spawn();
	let reloaded = proc.call("flowchart/reload", json!({"path": path.to_str().unwrap()}));
	assert_eq!(reloaded["categories"], 1);

	let names = proc.call("flowchart/categories", json!({}));
	assert_eq!(names["categories"][0]["name"], "Solo");

	let restored = proc.call("flowchart/reload", json!({}));
	assert_eq!(restored["categories"], 4);
}

#[test]
fn malformed_line_does_not_stop_server() {
	let mut proc = FlowchartProcess::spawn();
	proc.send_line("this is not json");
	let parse_error = proc.read_response();
	assert_eq!(parse_error["id"], 0);
	assert_eq!(parse_error["error"]["code"], -32700);

	let err = proc.call_err("flowchart/unknown", json!({}));
	assert_eq!(err["code"], -32601);

	let result = proc.call("flowchart/categories", json!({}));
	assert_eq!(result["categories"].as_array().unwrap().len(), 4);
}
