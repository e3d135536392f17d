use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use chat_widget_core::{
    ChatBackend, ChatController, ChatError, ChatRequest, HttpChatBackend, Message, Resolution,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Serve `router` on an ephemeral local port and return its base URL
async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn echo_router() -> Router {
    Router::new().route(
        "/chat",
        post(|Json(body): Json<Value>| async move {
            Json(json!({
                "response": format!("echo: {}", body["message"].as_str().unwrap_or("?")),
            }))
        }),
    )
}

#[tokio::test]
async fn posts_json_and_reads_response_field() {
    let base_url = spawn_backend(echo_router()).await;
    let backend = HttpChatBackend::new(&base_url);

    let reply = backend
        .send(&ChatRequest {
            message: "Merhaba".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(reply.response, "echo: Merhaba");
}

#[tokio::test]
async fn request_carries_json_content_type() {
    let router = Router::new().route(
        "/chat",
        post(|headers: HeaderMap| async move {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(json!({ "response": content_type }))
        }),
    );
    let base_url = spawn_backend(router).await;

    let reply = HttpChatBackend::new(&base_url)
        .send(&ChatRequest {
            message: "x".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(reply.response, "application/json");
}

#[tokio::test]
async fn server_error_is_a_status_failure() {
    let router = Router::new().route(
        "/chat",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base_url = spawn_backend(router).await;

    let err = HttpChatBackend::new(&base_url)
        .send(&ChatRequest {
            message: "Test".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Status(status) if status.as_u16() == 500));
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
    let router = Router::new().route("/chat", post(|| async { "not json at all" }));
    let base_url = spawn_backend(router).await;
    let err = HttpChatBackend::new(&base_url)
        .send(&ChatRequest {
            message: "x".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Malformed(_)));

    let router = Router::new().route("/chat", post(|| async { Json(json!({ "answer": "hi" })) }));
    let base_url = spawn_backend(router).await;
    let err = HttpChatBackend::new(&base_url)
        .send(&ChatRequest {
            message: "x".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpChatBackend::new(&format!("http://{}", addr))
        .send(&ChatRequest {
            message: "x".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Transport(_)));
}

#[tokio::test]
async fn slow_backend_times_out_into_the_fallback() {
    let router = Router::new().route(
        "/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "response": "too late" }))
        }),
    );
    let base_url = spawn_backend(router).await;
    let timeout = Some(Duration::from_millis(200));
    let backend = HttpChatBackend::with_timeout(&base_url, timeout).unwrap();

    let err = backend
        .send(&ChatRequest {
            message: "x".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(&err, ChatError::Transport(e) if e.is_timeout()));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut controller = ChatController::new(Arc::new(backend), tx, vec![]);
    controller.send_message("Hello");
    let outcome = rx.recv().await.unwrap();
    assert_eq!(controller.resolve(outcome), Resolution::Failed);

    assert_eq!(controller.log().pending_count(), 0);
    assert_eq!(
        controller.log().last_message(),
        Some(&Message::assistant("Üzgünüm, bir hata oluştu. Lütfen tekrar deneyin."))
    );
    assert!(!controller.is_awaiting_reply());
}

#[tokio::test]
async fn full_cycle_against_http_backend() {
    let router = Router::new().route(
        "/chat",
        post(|Json(body): Json<Value>| async move {
            if body["message"] == "Hello" {
                (StatusCode::OK, Json(json!({ "response": "Hi there" })))
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "nope" })))
            }
        }),
    );
    let base_url = spawn_backend(router).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut controller = ChatController::new(Arc::new(HttpChatBackend::new(&base_url)), tx, vec![]);

    controller.send_message("Hello");
    let outcome = rx.recv().await.unwrap();
    assert_eq!(controller.resolve(outcome), Resolution::Replied);

    controller.send_message("Test");
    let outcome = rx.recv().await.unwrap();
    assert_eq!(controller.resolve(outcome), Resolution::Failed);

    let transcript: Vec<Message> = controller.log().messages().cloned().collect();
    assert_eq!(
        transcript,
        vec![
            Message::user("Hello"),
            Message::assistant("Hi there"),
            Message::user("Test"),
            Message::assistant("Üzgünüm, bir hata oluştu. Lütfen tekrar deneyin."),
        ]
    );
    assert_eq!(controller.log().pending_count(), 0);
}
