use super::*;

#[tokio::test]
async fn closed_socket() {
	let socket = PeerSocket::new_closed();
	assert!(socket.is_closed());
	assert!(matches!(socket.request("a__b", vec![]).await, Err(Error::ServiceStopped)));
	assert!(matches!(socket.notify("a__b", vec![]).await, Err(Error::ServiceStopped)));
	assert!(matches!(socket.shutdown(), Err(Error::ServiceStopped)));
}

#[tokio::test]
async fn unanswered_request_times_out() {
	let (tx, mut rx) = mpsc::unbounded_channel();
	let socket = PeerSocket {
		tx,
		request_timeout: None,
	}
	.with_request_timeout(Some(Duration::from_millis(10)));

	let keep = tokio::spawn(async move {
		// Hold the responder without answering.
		let event = rx.recv().await;
		tokio::time::sleep(Duration::from_millis(200)).await;
		drop(event);
	});

	let err = socket.request("slow__op", vec![]).await.unwrap_err();
	assert!(matches!(err, Error::RequestTimeout(ref m) if m == "slow__op"));
	keep.abort();
}

#[tokio::test]
async fn dropped_responder_is_service_stopped() {
	let (tx, mut rx) = mpsc::unbounded_channel();
	let socket = PeerSocket {
		tx,
		request_timeout: None,
	};
	tokio::spawn(async move {
		let _ = rx.recv().await;
	});
	assert!(matches!(socket.request("a__b", vec![]).await, Err(Error::ServiceStopped)));
}
