use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use super::*;
use crate::feature::{MountSlot, ReadyView, View, view_failed};

struct Demo;

impl Feature for Demo {
	const NAME: &'static str = "demo";
	type InitArgs = String;
}

#[derive(Default)]
struct RecordingClient {
	calls: Mutex<Vec<(String, String)>>,
}

impl Associate for Arc<RecordingClient> {
	fn associate(&self, origin: &str, envelope_server_id: &str) {
		self.calls.lock().push((origin.to_owned(), envelope_server_id.to_owned()));
	}
}

#[derive(Default)]
struct CountingView {
	calls: AtomicUsize,
	last: Mutex<Option<String>>,
}

#[async_trait]
impl View<Demo> for CountingView {
	async fn initialize(&self, args: String) -> Result<()> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		*self.last.lock() = Some(args);
		Ok(())
	}
}

struct FailingDelegate {
	calls: AtomicUsize,
}

#[async_trait]
impl ViewDelegate<Demo> for FailingDelegate {
	async fn view(&self) -> Result<Arc<dyn View<Demo>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Err(view_failed("render failed"))
	}
}

fn api_with(view: &Arc<CountingView>) -> (Arc<RecordingClient>, EnvelopeApiImpl<Demo, Arc<RecordingClient>>) {
	let client = Arc::new(RecordingClient::default());
	let view: Arc<dyn View<Demo>> = view.clone();
	let api = EnvelopeApiImpl::new(Arc::clone(&client), Arc::new(ReadyView(view)));
	(client, api)
}

#[tokio::test]
async fn second_init_only_reassociates() {
	let view = Arc::new(CountingView::default());
	let (client, api) = api_with(&view);

	api.init(Association::new("o1", "s1"), "first".into()).await.unwrap();
	api.init(Association::new("o1", "s1"), "second".into()).await.unwrap();

	assert_eq!(*client.calls.lock(), vec![("o1".to_owned(), "s1".to_owned()); 2]);
	assert_eq!(view.calls.load(Ordering::SeqCst), 1);
	assert_eq!(view.last.lock().as_deref(), Some("first"));
	assert_eq!(api.state(), InitState::Initialized);
}

#[tokio::test]
async fn association_follows_latest_init() {
	let view = Arc::new(CountingView::default());
	let (client, api) = api_with(&view);

	api.init(Association::new("o1", "s1"), "a".into()).await.unwrap();
	api.init(Association::new("o2", "s2"), "b".into()).await.unwrap();

	let calls = client.calls.lock().clone();
	assert_eq!(calls.last(), Some(&("o2".to_owned(), "s2".to_owned())));
	assert_eq!(calls.len(), 2);
	assert_eq!(view.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_association_is_rejected_before_associating() {
	let view = Arc::new(CountingView::default());
	let (client, api) = api_with(&view);

	let err = api.init(Association::new("", "s1"), "x".into()).await.unwrap_err();
	assert!(matches!(err, Error::InvalidAssociation));
	assert!(client.calls.lock().is_empty());
	assert_eq!(api.state(), InitState::Uninitialized);
}

#[tokio::test]
async fn view_failure_surfaces_once_without_retry() {
	let client = Arc::new(RecordingClient::default());
	let delegate = Arc::new(FailingDelegate {
		calls: AtomicUsize::new(0),
	});
	let api = EnvelopeApiImpl::<Demo, _>::new(Arc::clone(&client), delegate.clone());

	let err = api.init(Association::new("o", "s"), "x".into()).await.unwrap_err();
	assert!(matches!(err, Error::Response(_)));
	api.init(Association::new("o", "s"), "x".into()).await.unwrap();

	assert_eq!(delegate.calls.load(Ordering::SeqCst), 1);
	assert_eq!(client.calls.lock().len(), 2);
	assert_eq!(api.state(), InitState::Initialized);
}

#[tokio::test]
async fn init_before_mount_waits_for_the_view() {
	let client = Arc::new(RecordingClient::default());
	let (slot, mounter) = MountSlot::<Demo>::new();
	let api = Arc::new(EnvelopeApiImpl::new(Arc::clone(&client), Arc::new(slot)));

	let first = tokio::spawn({
		let api = Arc::clone(&api);
		async move { api.init(Association::new("o", "s"), "early".into()).await }
	});
	let second = tokio::spawn({
		let api = Arc::clone(&api);
		async move { api.init(Association::new("o", "s"), "dup".into()).await }
	});

	tokio::time::sleep(Duration::from_millis(20)).await;
	assert!(!first.is_finished());
	assert_eq!(client.calls.lock().len(), 2);

	let view = Arc::new(CountingView::default());
	mounter.mount(view.clone());

	first.await.unwrap().unwrap();
	second.await.unwrap().unwrap();
	assert_eq!(view.calls.load(Ordering::SeqCst), 1);
	assert_eq!(view.last.lock().as_deref(), Some("early"));
}

#[tokio::test]
async fn unmounted_view_fails_init() {
	let client = Arc::new(RecordingClient::default());
	let (slot, mounter) = MountSlot::<Demo>::new();
	let api = EnvelopeApiImpl::new(client, Arc::new(slot));
	drop(mounter);

	let err = api.init(Association::new("o", "s"), "x".into()).await.unwrap_err();
	match err {
		Error::Response(resp) => assert_eq!(resp.code, mfe_bus::ErrorCode::VIEW_FAILED),
		other => panic!("unexpected error: {other}"),
	}
}
