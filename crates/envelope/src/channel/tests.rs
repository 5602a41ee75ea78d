use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mfe_bus::{ErrorCode, MemoryWindow, ResponseError, reply};
use serde_json::json;

use super::*;
use crate::envelope::{Envelope, EnvelopeOptions};
use crate::feature::{MountSlot, ReadyView, View, ViewDelegate, view_failed};

struct Demo;

impl Feature for Demo {
	const NAME: &'static str = "demo";
	type InitArgs = String;
}

#[derive(Default)]
struct CountingView {
	calls: AtomicUsize,
}

#[async_trait]
impl View<Demo> for CountingView {
	async fn initialize(&self, _args: String) -> Result<()> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

struct BrokenView;

#[async_trait]
impl View<Demo> for BrokenView {
	async fn initialize(&self, _args: String) -> Result<()> {
		Err(view_failed("bad init args"))
	}
}

const HOST: &str = "http://host";
const FRAME: &str = "http://frame";

fn options() -> ChannelOptions {
	ChannelOptions {
		origin: HOST.into(),
		target_origin: FRAME.into(),
		server_id: "srv-1".into(),
		envelope_id: None,
		request_timeout: None,
	}
}

fn fast_polling() -> InitPolling {
	InitPolling {
		interval: Duration::from_millis(5),
		timeout: Duration::from_secs(2),
	}
}

fn register_echo(router: &mut Router) {
	router.request(Demo::method("echo"), |mut args| async move {
		let value: JsonValue = args.next()?;
		reply(Ok(value))
	});
}

#[tokio::test]
async fn polling_survives_a_late_envelope() {
	let MemoryWindow { channel, envelope } = MemoryWindow::open(HOST, FRAME);
	let (endpoint, server) = EmbeddedEnvelope::<Demo, _>::new(channel, options(), register_echo).into_parts();
	tokio::spawn(endpoint.run());

	let view = Arc::new(CountingView::default());
	let delegate: Arc<dyn ViewDelegate<Demo>> = Arc::new(ReadyView(view.clone() as Arc<dyn View<Demo>>));
	let env = Envelope::<Demo, _>::new(envelope, EnvelopeOptions::default(), delegate);
	let client = env.client().clone();

	let polling = tokio::spawn({
		let server = server.clone();
		async move { server.poll_init("hello".into(), fast_polling()).await }
	});
	tokio::time::sleep(Duration::from_millis(30)).await;
	tokio::spawn(env.run());

	polling.await.unwrap().unwrap();
	// Let any attempts still in flight reach the envelope.
	tokio::time::sleep(Duration::from_millis(30)).await;
	assert_eq!(view.calls.load(Ordering::SeqCst), 1);

	assert_eq!(client.association(), Some(Association::new(HOST, "srv-1")));
	let echoed: JsonValue = client.call("demo__echo", vec![json!([1, "x"])]).await.unwrap();
	assert_eq!(echoed, json!([1, "x"]));
}

#[tokio::test]
async fn polling_times_out_without_envelope() {
	let MemoryWindow { channel, envelope: _envelope } = MemoryWindow::open(HOST, FRAME);
	let (endpoint, server) = EmbeddedEnvelope::<Demo, _>::new(channel, options(), |_| {}).into_parts();
	tokio::spawn(endpoint.run());

	let err = server
		.poll_init(
			"x".into(),
			InitPolling {
				interval: Duration::from_millis(5),
				timeout: Duration::from_millis(40),
			},
		)
		.await
		.unwrap_err();
	assert!(matches!(err, Error::InitTimeout(ref m) if m == "demo__init"));
}

#[tokio::test]
async fn view_error_fails_polling() {
	let MemoryWindow { channel, envelope } = MemoryWindow::open(HOST, FRAME);
	let (endpoint, server) = EmbeddedEnvelope::<Demo, _>::new(channel, options(), |_| {}).into_parts();
	tokio::spawn(endpoint.run());
	let delegate: Arc<dyn ViewDelegate<Demo>> = Arc::new(ReadyView(Arc::new(BrokenView) as Arc<dyn View<Demo>>));
	tokio::spawn(Envelope::<Demo, _>::new(envelope, EnvelopeOptions::default(), delegate).run());

	let err = server.poll_init("x".into(), fast_polling()).await.unwrap_err();
	match err {
		Error::Response(ResponseError { code, .. }) => assert_eq!(code, ErrorCode::VIEW_FAILED),
		other => panic!("unexpected error: {other}"),
	}
}

#[tokio::test]
async fn init_waits_for_a_slow_mount() {
	let MemoryWindow { channel, envelope } = MemoryWindow::open(HOST, FRAME);
	let (endpoint, server) = EmbeddedEnvelope::<Demo, _>::new(channel, options(), |_| {}).into_parts();
	tokio::spawn(endpoint.run());

	let (slot, mounter) = MountSlot::<Demo>::new();
	tokio::spawn(Envelope::<Demo, _>::new(envelope, EnvelopeOptions::default(), Arc::new(slot)).run());

	// Once the first init is captured, retries are answered without waiting for the view.
	server.poll_init("x".into(), fast_polling()).await.unwrap();
	let view = Arc::new(CountingView::default());
	tokio::time::sleep(Duration::from_millis(20)).await;
	assert_eq!(view.calls.load(Ordering::SeqCst), 0);

	mounter.mount(view.clone());
	tokio::time::sleep(Duration::from_millis(20)).await;
	assert_eq!(view.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn envelope_id_mismatch_is_ignored() {
	let MemoryWindow { channel, envelope } = MemoryWindow::open(HOST, FRAME);
	let mut opts = options();
	opts.envelope_id = Some("other-envelope".into());
	let (endpoint, server) = EmbeddedEnvelope::<Demo, _>::new(channel, opts, |_| {}).into_parts();
	tokio::spawn(endpoint.run());

	let view = Arc::new(CountingView::default());
	let delegate: Arc<dyn ViewDelegate<Demo>> = Arc::new(ReadyView(view.clone() as Arc<dyn View<Demo>>));
	let env_opts = EnvelopeOptions {
		envelope_id: Some("forms".into()),
		request_timeout: None,
	};
	tokio::spawn(Envelope::<Demo, _>::new(envelope, env_opts, delegate).run());

	let err = server
		.poll_init(
			"x".into(),
			InitPolling {
				interval: Duration::from_millis(5),
				timeout: Duration::from_millis(50),
			},
		)
		.await
		.unwrap_err();
	assert!(matches!(err, Error::InitTimeout(_)));
	assert_eq!(view.calls.load(Ordering::SeqCst), 0);
}
