//! Backend round trips against a local mock server

use std::io::Read;
use std::thread::JoinHandle;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use futures::StreamExt;
use rssmind_core::api::{BackendClient, ChatRequest, SummaryRequest, TransportError};
use rssmind_core::session::{SlotKey, SlotRegistry};
use rssmind_core::stream::{
    drive_stream, ChannelObserver, StreamController, StreamEvent, StreamMode, StreamStatus,
};
use rssmind_core::{ClientConfig, Conversation};
use tokio_util::sync::CancellationToken;

/// Captured request: (path, body)
type Seen = Vec<(String, String)>;

/// Serve `responses` in order, one per request, then stop
fn spawn_backend(responses: Vec<(u16, Vec<u8>)>) -> (ClientConfig, JoinHandle<Seen>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = std::thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let mut request = server.recv().unwrap();
            let mut received = String::new();
            request.as_reader().read_to_string(&mut received).unwrap();
            seen.push((request.url().to_string(), received));
            let response = tiny_http::Response::from_data(body).with_status_code(status);
            request.respond(response).unwrap();
        }
        seen
    });
    let config = ClientConfig {
        backend_url: format!("http://{addr}"),
        ..ClientConfig::default()
    };
    (config, handle)
}

#[tokio::test]
async fn chat_reply_streams_through_client() {
    let body = format!(
        "data:{}\ndata:{}\ndata:[DONE]\n",
        STANDARD.encode("你好"),
        STANDARD.encode(", world")
    );
    let (config, server) = spawn_backend(vec![(200, body.into_bytes())]);
    let client = BackendClient::new(&config).unwrap();

    let mut conversation = Conversation::new();
    let history = conversation.push_user("hello?");
    let request = ChatRequest::new(&config.model, history, config.temperature);
    let reply_id = conversation.begin_reply();

    let stream = client.open_chat(&request).await.unwrap();
    let (observer, mut rx) = ChannelObserver::channel();
    let mut controller = StreamController::new(StreamMode::Framed, observer);
    let outcome = drive_stream(&mut controller, stream, CancellationToken::new()).await;
    drop(controller);

    let mut done = false;
    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::Snapshot { text } => {
                conversation.apply_snapshot(reply_id, &text);
            }
            StreamEvent::Done => done = true,
            StreamEvent::Failed { message } => panic!("unexpected failure: {message}"),
        }
    }

    assert!(done);
    assert_eq!(outcome.status, StreamStatus::Completed);
    assert_eq!(outcome.text, "你好, world");
    assert_eq!(conversation.messages()[1].content, "你好, world");

    let seen = server.join().unwrap();
    assert_eq!(seen[0].0, "/llm/stream_chat");
    let sent: serde_json::Value = serde_json::from_str(&seen[0].1).unwrap();
    assert_eq!(sent["stream"], true);
    assert_eq!(sent["model"], "qwen-plus-latest");
    assert_eq!(sent["messages"][0]["role"], "user");
    assert_eq!(sent["messages"][0]["content"], "hello?");
}

#[tokio::test]
async fn summary_streams_raw_text() {
    let summary = "Résumé: the article covers 🦀 ownership.";
    let (config, server) = spawn_backend(vec![(200, summary.as_bytes().to_vec())]);
    let client = BackendClient::new(&config).unwrap();

    let request = SummaryRequest {
        article_id: Some("17".to_string()),
        url: "https://blog.example.com/post".to_string(),
    };
    let stream = client.open_summary(&request).await.unwrap();
    let (observer, _rx) = ChannelObserver::channel();
    let mut controller = StreamController::new(StreamMode::Raw, observer);
    let outcome = drive_stream(&mut controller, stream, CancellationToken::new()).await;

    assert_eq!(outcome.status, StreamStatus::Completed);
    assert_eq!(outcome.text, summary);

    let seen = server.join().unwrap();
    assert_eq!(seen[0].0, "/llm/ai_summary/stream");
    let sent: serde_json::Value = serde_json::from_str(&seen[0].1).unwrap();
    assert_eq!(sent["article_id"], "17");
    assert_eq!(sent["url"], "https://blog.example.com/post");
}

#[tokio::test]
async fn error_status_carries_detail() {
    let (config, server) = spawn_backend(vec![
        (422, br#"{"detail": "url is not reachable"}"#.to_vec()),
        (500, b"Internal Server Error".to_vec()),
    ]);
    let client = BackendClient::new(&config).unwrap();
    let request = SummaryRequest {
        article_id: None,
        url: "https://unreachable.example".to_string(),
    };

    match client.open_summary(&request).await {
        Err(TransportError::Status { status, detail }) => {
            assert_eq!(status, 422);
            assert_eq!(detail, "url is not reachable");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected an error status"),
    }

    match client.open_summary(&request).await {
        Err(TransportError::Status { status, detail }) => {
            assert_eq!(status, 500);
            assert_eq!(detail, "request failed with status 500");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected an error status"),
    }

    server.join().unwrap();
}

#[tokio::test]
async fn superseded_request_freezes_its_snapshot() {
    let registry = SlotRegistry::new();
    let first = registry.claim(SlotKey::summary("article-1"));

    // Delivers one chunk, then never ends
    let body = futures::stream::iter(vec![Ok::<_, TransportError>(Bytes::from_static(b"partial"))])
        .chain(futures::stream::pending());

    let (observer, mut rx) = ChannelObserver::channel();
    let mut controller = StreamController::new(StreamMode::Raw, observer);
    let token = first.token();
    let driver = async { drive_stream(&mut controller, body, token).await };

    let supersede = async {
        // Wait for the first snapshot before starting the replacement request
        let first_event = rx.recv().await;
        let second = registry.claim(SlotKey::summary("article-1"));
        (first_event, second)
    };

    let (outcome, (first_event, second)) = tokio::join!(driver, supersede);
    assert_eq!(
        first_event,
        Some(StreamEvent::Snapshot {
            text: "partial".to_string()
        })
    );
    assert_eq!(outcome.status, StreamStatus::Cancelled);
    assert_eq!(outcome.text, "partial");

    drop(controller);
    assert_eq!(rx.recv().await, None);

    registry.release(&first);
    assert!(registry.is_current(&second));
}
