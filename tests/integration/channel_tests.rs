//! Fallback channel tests against a local WebSocket server

use futures_util::{SinkExt, StreamExt};
use pool_guest_logger::{
    config::ChannelConfig,
    error::ChannelError,
    models::Reading,
    scraper::{ChannelClient, LiveSource},
};
use std::time::Duration;
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_tungstenite::tungstenite::{
    handshake::server::{Request, Response},
    Message,
};

use crate::common::unused_addr;

const USER_AGENT: &str = "pool-guest-logger-test/1.0";

/// What the server saw from the client
#[derive(Debug, Default)]
struct Seen {
    user_agent: Option<String>,
    subscribe: Option<String>,
}

async fn serve_frames(frames: Vec<&'static str>) -> (String, JoinHandle<Seen>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut seen = Seen::default();
        let (stream, _) = listener.accept().await.unwrap();
        let callback = |req: &Request, resp: Response| {
            seen.user_agent = req
                .headers()
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            Ok(resp)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback).await.unwrap();

        if let Some(Ok(Message::Text(text))) = ws.next().await {
            seen.subscribe = Some(text.as_str().to_string());
        }
        for frame in frames {
            if ws.send(Message::text(frame.to_string())).await.is_err() {
                break;
            }
        }
        // Hold the connection until the client closes it
        while let Some(Ok(_)) = ws.next().await {}
        seen
    });

    (format!("ws://{}", addr), handle)
}

/// Server that answers the subscribe message with `reply` instead of frames
async fn serve_after_subscribe<F, Fut>(reply: F) -> (String, JoinHandle<()>)
where
    F: FnOnce(tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let _ = ws.next().await;
        reply(ws).await;
    });

    (format!("ws://{}", addr), handle)
}

fn client(ws_url: String) -> ChannelClient {
    let config = ChannelConfig {
        ws_url,
        timeout_secs: 1,
        ..ChannelConfig::default()
    };
    ChannelClient::new(&config, USER_AGENT)
}

#[tokio::test]
async fn test_first_message_is_used() {
    let (url, server) = serve_frames(vec![r#"{"currentfill":17,"maxspace":150}"#]).await;

    let reading = client(url).fetch_live(None).await.unwrap();
    assert_eq!(reading, Reading { count: 17, capacity: Some(150) });

    let seen = server.await.unwrap();
    assert_eq!(seen.subscribe.as_deref(), Some("all"));
    assert_eq!(seen.user_agent.as_deref(), Some(USER_AGENT));
}

#[tokio::test]
async fn test_record_selected_by_uid_across_frames() {
    let (url, server) = serve_frames(vec![
        r#"[{"uid":"SSD-1","currentfill":"3","maxspace":"50"}]"#,
        r#"[{"uid":"SSD-1","currentfill":"3"},{"uid":"SSD-4","currentfill":"68","maxspace":"120"}]"#,
    ])
    .await;

    let reading = client(url).fetch_live(Some("SSD-4".to_string())).await.unwrap();
    assert_eq!(reading, Reading { count: 68, capacity: Some(120) });
    server.await.unwrap();
}

#[tokio::test]
async fn test_no_matching_record_is_malformed() {
    let (url, server) = serve_frames(vec!["[]", "[]", "[]"]).await;

    let err = client(url).fetch_live(Some("SSD-4".to_string())).await.unwrap_err();
    assert!(matches!(err, ChannelError::MalformedMessage(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_garbage_is_malformed() {
    let (url, server) = serve_frames(vec!["<html>not json</html>"]).await;

    let err = client(url).fetch_live(None).await.unwrap_err();
    assert!(matches!(err, ChannelError::MalformedMessage(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let (url, server) = serve_frames(vec![]).await;

    let err = client(url).fetch_live(None).await.unwrap_err();
    assert!(matches!(err, ChannelError::Timeout(_)));
    // The connection was closed by the client, so the server task finishes
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    let url = format!("ws://{}", unused_addr());

    let err = client(url).fetch_live(None).await.unwrap_err();
    assert!(matches!(err, ChannelError::ConnectFailed(_)));
}

#[tokio::test]
async fn test_close_before_any_frame_is_connect_failure() {
    let (url, server) = serve_after_subscribe(|mut ws| async move {
        let _ = ws.close(None).await;
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;

    let err = client(url).fetch_live(None).await.unwrap_err();
    assert!(matches!(err, ChannelError::ConnectFailed(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_keepalive_pings_do_not_extend_timeout() {
    let (url, server) = serve_after_subscribe(|mut ws| async move {
        loop {
            if ws.send(Message::Ping(Vec::new().into())).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
    })
    .await;

    let err = tokio::time::timeout(Duration::from_secs(5), client(url).fetch_live(None))
        .await
        .expect("channel read must end at its own deadline")
        .unwrap_err();
    assert!(matches!(err, ChannelError::Timeout(_)));
    server.abort();
}

#[tokio::test]
async fn test_binary_frames_count_toward_message_limit() {
    let (url, server) = serve_after_subscribe(|mut ws| async move {
        for _ in 0..3 {
            if ws.send(Message::Binary(vec![1, 2, 3].into())).await.is_err() {
                return;
            }
        }
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;

    let err = client(url).fetch_live(None).await.unwrap_err();
    assert!(matches!(err, ChannelError::MalformedMessage(_)));
    server.await.unwrap();
}
