/// Integration tests for WebSocket admission
///
/// These tests bind the full application to an ephemeral port and
/// connect with a real WebSocket client. They cover the admission
/// state machine end to end: rejected sockets get a 1008 close frame
/// and never enter the registry; admitted sockets receive broadcasts.

use chrono::Duration;
use futures::StreamExt;
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
    mail::NoopMailer,
    media::NoopMediaStore,
};
use taskboard_shared::auth::jwt::{create_token, Claims};
use taskboard_shared::events::BoardEvent;
use taskboard_shared::realtime::{broadcast::EventBroadcaster, registry::ConnectionRegistry};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;

const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            frontend_url: "http://localhost:5173".to_string(),
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://localhost:1/unreachable".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            session_ttl_days: 7,
        },
        mail: None,
        media: None,
    }
}

/// Serves the app on an ephemeral port, returning the ws URL and a
/// handle onto the server's connection registry.
async fn spawn_server() -> (String, ConnectionRegistry) {
    let pool = PgPool::connect_lazy(&test_config().database.url)
        .expect("lazy pool construction cannot fail");

    let state = AppState::new(
        pool,
        test_config(),
        Arc::new(NoopMailer),
        Arc::new(NoopMediaStore),
    );
    let registry = state.registry.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("ws://{}/ws", addr), registry)
}

/// Reads frames until a close frame arrives, returning it
async fn await_close(
    stream: &mut (impl futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
              + Unpin),
) -> tokio_tungstenite::tungstenite::protocol::CloseFrame<'static> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Close(Some(frame)))) => return frame,
            Some(Ok(_)) => continue,
            other => panic!("expected close frame, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_missing_token_closed_with_policy_code() {
    let (url, registry) = spawn_server().await;

    let (mut stream, _response) = connect_async(&url).await.unwrap();
    let frame = await_close(&mut stream).await;

    assert_eq!(frame.code, CloseCode::Policy);
    assert_eq!(frame.reason, "Token required");
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_invalid_token_closed_with_policy_code() {
    let (url, registry) = spawn_server().await;

    let (mut stream, _response) = connect_async(format!("{}?token=not-a-token", url))
        .await
        .unwrap();
    let frame = await_close(&mut stream).await;

    assert_eq!(frame.code, CloseCode::Policy);
    assert_eq!(frame.reason, "Invalid token");
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_expired_token_closed_with_policy_code() {
    let (url, registry) = spawn_server().await;

    // Two hours past expiry clears the default validation leeway.
    let claims = Claims::with_ttl(7, "tester@example.com".to_string(), Duration::hours(-2));
    let token = create_token(&claims, JWT_SECRET).unwrap();

    let (mut stream, _response) = connect_async(format!("{}?token={}", url, token))
        .await
        .unwrap();
    let frame = await_close(&mut stream).await;

    assert_eq!(frame.code, CloseCode::Policy);
    assert_eq!(frame.reason, "Invalid token");
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_admitted_connection_receives_broadcasts() {
    let (url, registry) = spawn_server().await;

    let claims = Claims::new(7, "tester@example.com".to_string());
    let token = create_token(&claims, JWT_SECRET).unwrap();

    let (mut stream, _response) = connect_async(format!("{}?token={}", url, token))
        .await
        .unwrap();

    // Admission happens in the server's upgrade task; wait for it.
    for _ in 0..100 {
        if registry.len().await == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(registry.len().await, 1);

    EventBroadcaster::new(registry.clone())
        .publish(&BoardEvent::TaskDeleted { id: 42 })
        .await;

    loop {
        match stream.next().await {
            Some(Ok(Message::Text(payload))) => {
                assert_eq!(payload, r#"{"type":"TASK_DELETED","payload":{"id":42}}"#);
                break;
            }
            Some(Ok(_)) => continue,
            other => panic!("expected broadcast frame, got {:?}", other),
        }
    }
}
