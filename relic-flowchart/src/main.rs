use anyhow::Result;
use clap::Parser;
use relic_flowchart::config::CliArgs;
use relic_flowchart::server::FlowchartServer;
use relic_flowchart::transport::NdjsonTransport;
use relic_flowchart::validator::FlowchartValidator;

fn main() -> Result<()> {
	let args = CliArgs::parse();

	// Logs go to stderr; stdout carries the protocol
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	let registry = args.load_registry()?;
	let options = args.validator_options()?;
	tracing::info!(
		categories = registry.len(),
		fallback_label = %options.fallback_label,
		"Answer keys loaded"
	);

	let validator = FlowchartValidator::new(registry, options);
	let mut server = FlowchartServer::new(NdjsonTransport::new(), validator);

	tracing::info!("relic-flowchart ready");
	server.run()?;
	Ok(())
}
