//! One channel and one envelope of a feature, wired over an in-memory window.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use mfe_bus::{ANY_ORIGIN, JsonValue, MemoryWindow, Result, Router};
use mfe_envelope::{BusConfig, EmbeddedEnvelope, Envelope, EnvelopeClient, Feature, MountSlot, View};
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info};

/// Origin the demo envelope is served from when the config accepts any.
pub const ENVELOPE_ORIGIN: &str = "http://localhost:9001";

/// A view without UI: it publishes the init payload it was handed.
struct HeadlessView {
	received: watch::Sender<Option<JsonValue>>,
}

#[async_trait]
impl<F: Feature> View<F> for HeadlessView {
	async fn initialize(&self, args: F::InitArgs) -> Result<()> {
		let value = serde_json::to_value(&args)?;
		debug!(feature = F::NAME, "headless view initialized");
		self.received.send_replace(Some(value));
		Ok(())
	}
}

/// Settings shared by every scenario of a run.
#[derive(Debug, Clone)]
pub struct Scenario {
	pub config: BusConfig,
	pub mount_delay: Duration,
}

impl Scenario {
	/// Origin the envelope lives at: the configured one, unless that is `*`.
	#[must_use]
	pub fn envelope_origin(&self) -> &str {
		match self.config.envelope_origin.as_str() {
			ANY_ORIGIN => ENVELOPE_ORIGIN,
			origin => origin,
		}
	}

	/// Mounts feature `F`, polls its init, runs `exercise` against the envelope
	/// client, and returns a JSON report.
	///
	/// `register` installs the feature's channel API on the channel side. The
	/// view mounts `mount_delay` after the envelope starts, so init polling
	/// has to wait for it.
	pub async fn run<F, Fut>(
		&self,
		init_args: F::InitArgs,
		register: impl FnOnce(&mut Router),
		exercise: impl FnOnce(EnvelopeClient) -> Fut,
	) -> anyhow::Result<JsonValue>
	where
		F: Feature,
		Fut: Future<Output = Result<JsonValue>>,
	{
		let MemoryWindow { channel, envelope } = MemoryWindow::open(&self.config.channel_origin, self.envelope_origin());

		let (endpoint, server) =
			EmbeddedEnvelope::<F, _>::new(channel, self.config.channel_options(), register).into_parts();
		let channel_task = tokio::spawn(endpoint.run());

		let (slot, mounter) = MountSlot::<F>::new();
		let env = Envelope::<F, _>::new(envelope, self.config.envelope_options(), Arc::new(slot));
		let client = env.client().clone();
		let envelope_task = tokio::spawn(env.run());

		let (received, mut initialized) = watch::channel(None);
		let view = Arc::new(HeadlessView { received });
		let mount_delay = self.mount_delay;
		tokio::spawn(async move {
			tokio::time::sleep(mount_delay).await;
			mounter.mount(view);
		});

		info!(feature = F::NAME, server_id = server.server_id(), "polling envelope init");
		server
			.poll_init(init_args, self.config.init_polling())
			.await
			.with_context(|| format!("initializing `{}`", F::NAME))?;

		// Retried inits are answered before the view mounts; wait for the real one.
		let init_args = tokio::time::timeout(self.config.init_polling().timeout, initialized.wait_for(Option::is_some))
			.await
			.context("view never initialized")?
			.context("view dropped")?
			.clone();

		let result = exercise(client.clone())
			.await
			.with_context(|| format!("exercising `{}`", F::NAME))?;

		// Stopping one side ends the other's transport, so it may already be gone.
		let _ = client.shutdown();
		let _ = server.shutdown();
		channel_task.await?.context("channel endpoint")?;
		envelope_task.await?.context("envelope endpoint")?;

		Ok(json!({
			"feature": F::NAME,
			"serverId": server.server_id(),
			"initArgs": init_args,
			"result": result,
		}))
	}
}
