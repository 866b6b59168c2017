//! Drives `OpenRouterClient` against a one-shot HTTP stub on localhost.

use std::sync::{Arc, Once};

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use thiepcuoi_core::{
    ApiKey, ChatConfig, Completion, CompletionBackend, CompletionRequest, ExchangeController,
    ExchangeError, NotificationKind, OpenRouterClient, RecordingNotifier, SendOutcome,
};

struct Captured {
    head: String,
    body: Value,
}

/// Answer exactly one request with `status` and `body`, handing back what was received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let (head, body_start, content_length) = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                break (head, pos + 4, length);
            }
        };
        while buf.len() < body_start + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending body");
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        let body = serde_json::from_slice(&buf[body_start..body_start + content_length])
            .unwrap_or(Value::Null);
        Captured { head, body }
    });

    (format!("http://{addr}/api/v1"), handle)
}

static LOOPBACK_NO_PROXY: Once = Once::new();

fn client_for(base_url: &str) -> OpenRouterClient {
    // Keep any ambient proxy settings away from the loopback stub. Every client
    // in this file is built here, after the variables are in place.
    LOOPBACK_NO_PROXY.call_once(|| {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        std::env::set_var("no_proxy", "127.0.0.1,localhost");
    });
    let config = ChatConfig::new()
        .with_api_key("sk-or-test")
        .with_base_url(base_url);
    OpenRouterClient::new(&config).unwrap()
}

fn request(user: &str) -> CompletionRequest {
    CompletionRequest {
        api_key: ApiKey::new("sk-or-test").unwrap(),
        system: thiepcuoi_core::system_prompt(),
        user: user.to_string(),
    }
}

#[tokio::test]
async fn posts_openai_style_body_with_bearer_token() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"169k-730k tuỳ gói"}}]}"#,
    )
    .await;
    let client = client_for(&base);

    let reply = client.complete(request("Giá thiệp bao nhiêu?")).await.unwrap();
    assert_eq!(reply, Completion::Text("169k-730k tuỳ gói".to_string()));

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("post /api/v1/chat/completions"));
    assert!(captured.head.contains("authorization: bearer sk-or-test"));
    assert!(captured.head.contains("x-title: wedding invitation chatbot"));

    let body = captured.body;
    assert_eq!(body["model"], "deepseek/deepseek-chat:free");
    assert_eq!(body["temperature"], 0.7);
    assert_eq!(body["max_tokens"], 500);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], thiepcuoi_core::system_prompt().as_str());
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[1]["content"], "Giá thiệp bao nhiêu?");
}

#[tokio::test]
async fn non_success_status_is_connection_failure() {
    let (base, server) = serve_once(
        "500 Internal Server Error",
        r#"{"error":{"message":"upstream down"}}"#,
    )
    .await;
    let client = client_for(&base);

    let err = client.complete(request("hi")).await.unwrap_err();
    assert!(matches!(err, ExchangeError::ConnectionFailure(ref detail) if detail.contains("500")));
    server.await.unwrap();
}

#[tokio::test]
async fn non_json_body_is_connection_failure() {
    let (base, server) = serve_once("200 OK", "<html>maintenance</html>").await;
    let client = client_for(&base);

    let err = client.complete(request("hi")).await.unwrap_err();
    assert!(matches!(err, ExchangeError::ConnectionFailure(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn json_without_choices_is_missing_reply() {
    let (base, server) = serve_once("200 OK", r#"{"choices":[]}"#).await;
    let client = client_for(&base);

    let reply = client.complete(request("hi")).await.unwrap();
    assert_eq!(reply, Completion::Missing);
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_provider_is_reported_through_controller() {
    // Bind then drop so the port is closed.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{addr}/api/v1"));
    let notifier = Arc::new(RecordingNotifier::new());
    let controller = ExchangeController::new(
        ChatConfig::new().with_api_key("sk-or-test"),
        Arc::new(client),
        notifier.clone(),
    );

    assert_eq!(controller.send("hi").await, SendOutcome::Failed);
    assert_eq!(controller.messages().len(), 2);
    assert_eq!(notifier.kinds(), vec![NotificationKind::ConnectionFailure]);
    assert!(!controller.is_busy());
}
