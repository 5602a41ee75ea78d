//! Console features demo.
//!
//! Mounts each feature's envelope in an in-memory window, serves its channel
//! API from the mock backend, lets a headless view drive it, and prints what
//! came back as JSON.

mod exercise;
mod scenario;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use mfe_envelope::BusConfig;
use mfe_mock::MockBackend;
use tracing::info;

use crate::scenario::Scenario;

/// Features the demo can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FeatureName {
	FormsList,
	FormDetails,
	JobsManagement,
	ProcessDefinitionList,
	ProcessForm,
	WorkflowForm,
	CustomDashboardView,
}

/// Demo command line arguments.
#[derive(Parser, Debug)]
#[command(name = "mfe-demo")]
#[command(about = "Runs console feature envelopes against an in-memory backend")]
struct Args {
	/// Bus configuration file (TOML)
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Feature to run; all features when omitted
	#[arg(short, long, value_enum)]
	feature: Option<FeatureName>,

	/// Delay before the headless view mounts
	#[arg(long, value_name = "MS", default_value_t = 150)]
	mount_delay_ms: u64,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = match &args.config {
		Some(path) => BusConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
		None => BusConfig::default(),
	};
	info!(?config, "starting mfe-demo");

	let backend = MockBackend::bundled().context("loading bundled fixtures")?;
	let scenario = Scenario {
		config,
		mount_delay: Duration::from_millis(args.mount_delay_ms),
	};

	let features = match args.feature {
		Some(feature) => vec![feature],
		None => FeatureName::value_variants().to_vec(),
	};

	let mut reports = Vec::with_capacity(features.len());
	for feature in features {
		reports.push(exercise::run(feature, &scenario, &backend).await?);
	}
	println!("{}", serde_json::to_string_pretty(&reports)?);

	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("MFE_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("mfe_demo=debug,mfe_bus=debug,mfe_envelope=debug,mfe_mock=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
