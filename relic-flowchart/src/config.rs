use std::path::PathBuf;

use clap::Parser;

use crate::answer_key::AnswerKeyRegistry;
use crate::error::FlowchartError;
use crate::graph::Label;
use crate::validator::{DEFAULT_FALLBACK_LABEL, ValidatorOptions};

#[derive(Parser, Debug)]
#[command(name = "relic-flowchart", about = "Flowchart round grading engine over JSON-RPC stdio")]
pub struct CliArgs {
	/// JSON file of answer keys to use instead of the built-in categories
	#[arg(long, env = "RELIC_FLOWCHART_ANSWER_KEYS")]
	pub answer_keys: Option<PathBuf>,

	/// Label given to an edge endpoint that names no submitted node
	#[arg(long, default_value = DEFAULT_FALLBACK_LABEL, env = "RELIC_FLOWCHART_FALLBACK_LABEL")]
	pub fallback_label: String,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "RELIC_FLOWCHART_LOG_LEVEL")]
	pub log_level: String,
}

impl CliArgs {
	pub fn load_registry(&self) -> Result<AnswerKeyRegistry, FlowchartError> {
		match &self.answer_keys {
			Some(path) => AnswerKeyRegistry::from_path(path),
			None => AnswerKeyRegistry::builtin(),
		}
	}

	pub fn validator_options(&self) -> Result<ValidatorOptions, FlowchartError> {
		let fallback_label = Label::new(self.fallback_label.as_str()).ok_or_else(|| {
			FlowchartError::InvalidParams("--fallback-label must not be empty".to_string())
		})?;
		Ok(ValidatorOptions { fallback_label })
	}
}
