//! End-to-end tests: a real server on a random port, real WebSocket
//! clients, JSON frames on the wire.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use roomcast::prelude::*;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

struct FixedClock;

impl Clock for FixedClock {
    fn timestamp(&self) -> String {
        "3:45 PM".to_string()
    }
}

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn start_with(builder: RoomcastServerBuilder) -> String {
    let server = builder
        .bind("127.0.0.1:0")
        .build_with(JsonCodec, FixedClock)
        .await
        .expect("server should build");
    let addr = server.local_addr().expect("should have local addr").to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

async fn start_server() -> String {
    start_with(RoomcastServerBuilder::new()).await
}

/// Connects and consumes the welcome notice.
async fn connect(addr: &str) -> ClientWs {
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    assert_eq!(next_event(&mut ws).await, admin("Welcome to Roomcast!"));
    ws
}

async fn send(ws: &mut ClientWs, value: serde_json::Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send");
}

async fn enter_room(ws: &mut ClientWs, name: &str, room: &str) {
    send(ws, json!({ "event": "enterRoom", "data": { "name": name, "room": room } })).await;
}

async fn next_event(ws: &mut ClientWs) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("websocket error");
        if msg.is_text() || msg.is_binary() {
            return serde_json::from_slice(&msg.into_data()).expect("decode event");
        }
    }
}

/// Asserts nothing arrives within a short window.
async fn assert_silent(ws: &mut ClientWs) {
    let result = tokio::time::timeout(Duration::from_millis(150), ws.next()).await;
    assert!(result.is_err(), "unexpected frame: {result:?}");
}

fn admin(text: &str) -> ServerEvent {
    ServerEvent::Message(ChatMessage::new("Admin", text, "3:45 PM"))
}

fn user_names(event: &ServerEvent) -> Vec<String> {
    match event {
        ServerEvent::UserList { users } => users.iter().map(|u| u.name.clone()).collect(),
        other => panic!("expected userList, got {other:?}"),
    }
}

fn rooms(list: &[&str]) -> ServerEvent {
    ServerEvent::RoomList {
        rooms: list.iter().map(|r| r.to_string()).collect(),
    }
}

/// Connects, enters a room, and consumes the joiner's three events.
async fn join(addr: &str, name: &str, room: &str) -> ClientWs {
    let mut ws = connect(addr).await;
    enter_room(&mut ws, name, room).await;
    assert_eq!(
        next_event(&mut ws).await,
        admin(&format!("You have joined the {room} chat room"))
    );
    assert!(matches!(next_event(&mut ws).await, ServerEvent::UserList { .. }));
    assert!(matches!(next_event(&mut ws).await, ServerEvent::RoomList { .. }));
    ws
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_welcome_on_connect() {
    let addr = start_server().await;
    // `connect` asserts the welcome notice.
    let mut ws = connect(&addr).await;
    assert_silent(&mut ws).await;
}

#[tokio::test]
async fn test_enter_room_sequence_for_joiner() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    enter_room(&mut ws, "Alice", "lobby").await;

    assert_eq!(next_event(&mut ws).await, admin("You have joined the lobby chat room"));
    assert_eq!(user_names(&next_event(&mut ws).await), vec!["Alice"]);
    assert_eq!(next_event(&mut ws).await, rooms(&["lobby"]));
    assert_silent(&mut ws).await;
}

#[tokio::test]
async fn test_peer_sees_join_notice_and_lists() {
    let addr = start_server().await;
    let mut alice = join(&addr, "Alice", "lobby").await;
    let _bob = join(&addr, "Bob", "lobby").await;

    assert_eq!(next_event(&mut alice).await, admin("Bob has joined the room"));
    assert_eq!(user_names(&next_event(&mut alice).await), vec!["Alice", "Bob"]);
    assert_eq!(next_event(&mut alice).await, rooms(&["lobby"]));
}

#[tokio::test]
async fn test_chat_message_reaches_room_including_sender() {
    let addr = start_server().await;
    let mut alice = join(&addr, "Alice", "lobby").await;
    let mut bob = join(&addr, "Bob", "lobby").await;
    for _ in 0..3 {
        next_event(&mut alice).await; // Bob's join traffic
    }
    let mut cy = join(&addr, "Cy", "den").await;
    // Cy's arrival changes the global room list.
    assert_eq!(next_event(&mut alice).await, rooms(&["lobby", "den"]));
    assert_eq!(next_event(&mut bob).await, rooms(&["lobby", "den"]));

    send(
        &mut bob,
        json!({ "event": "message", "data": { "name": "Bob", "text": "hi all" } }),
    )
    .await;

    let expected = ServerEvent::Message(ChatMessage::new("Bob", "hi all", "3:45 PM"));
    assert_eq!(next_event(&mut alice).await, expected);
    assert_eq!(next_event(&mut bob).await, expected);
    assert_silent(&mut cy).await;
}

#[tokio::test]
async fn test_activity_excludes_sender() {
    let addr = start_server().await;
    let mut alice = join(&addr, "Alice", "lobby").await;
    let mut bob = join(&addr, "Bob", "lobby").await;
    for _ in 0..3 {
        next_event(&mut alice).await;
    }

    send(&mut alice, json!({ "event": "activity", "data": "Alice" })).await;
    assert_eq!(next_event(&mut bob).await, ServerEvent::Activity("Alice".into()));

    // Alice's next frame is her own chat line, not her typing indicator.
    send(
        &mut alice,
        json!({ "event": "message", "data": { "name": "Alice", "text": "done" } }),
    )
    .await;
    assert_eq!(
        next_event(&mut alice).await,
        ServerEvent::Message(ChatMessage::new("Alice", "done", "3:45 PM"))
    );
}

#[tokio::test]
async fn test_message_before_entering_room_is_dropped() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, json!({ "event": "message", "data": { "name": "Ghost", "text": "boo" } })).await;
    send(&mut ws, json!({ "event": "activity", "data": "Ghost" })).await;
    enter_room(&mut ws, "Ghost", "attic").await;

    // First thing back is the join notice; the early chat vanished.
    assert_eq!(next_event(&mut ws).await, admin("You have joined the attic chat room"));
}

#[tokio::test]
async fn test_invalid_frames_are_ignored() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("not json".into())).await.expect("send");
    send(&mut ws, json!({ "event": "flyToMoon", "data": 1 })).await;
    enter_room(&mut ws, "   ", "lobby").await;
    assert_silent(&mut ws).await;

    enter_room(&mut ws, "Alice", "lobby").await;
    assert_eq!(next_event(&mut ws).await, admin("You have joined the lobby chat room"));
}

#[tokio::test]
async fn test_disconnect_notifies_room() {
    let addr = start_server().await;
    let mut alice = join(&addr, "Alice", "lobby").await;
    let bob = join(&addr, "Bob", "lobby").await;
    for _ in 0..3 {
        next_event(&mut alice).await;
    }

    drop(bob);

    assert_eq!(next_event(&mut alice).await, admin("Bob has left the room"));
    assert_eq!(user_names(&next_event(&mut alice).await), vec!["Alice"]);
    assert_eq!(next_event(&mut alice).await, rooms(&["lobby"]));
}

#[tokio::test]
async fn test_room_switch_updates_old_room_and_room_list() {
    let addr = start_server().await;
    let mut alice = join(&addr, "Alice", "lobby").await;
    let mut bob = join(&addr, "Bob", "lobby").await;
    for _ in 0..3 {
        next_event(&mut alice).await;
    }

    enter_room(&mut alice, "Alice", "den").await;

    assert_eq!(next_event(&mut bob).await, admin("Alice has left the room"));
    assert_eq!(user_names(&next_event(&mut bob).await), vec!["Bob"]);
    assert_eq!(next_event(&mut bob).await, rooms(&["lobby", "den"]));

    assert_eq!(next_event(&mut alice).await, admin("You have joined the den chat room"));
    assert_eq!(user_names(&next_event(&mut alice).await), vec!["Alice"]);
    assert_eq!(next_event(&mut alice).await, rooms(&["lobby", "den"]));
}

#[tokio::test]
async fn test_empty_room_disappears_from_room_list() {
    let addr = start_server().await;
    let mut alice = join(&addr, "Alice", "lobby").await;
    let bob = join(&addr, "Bob", "den").await;
    next_event(&mut alice).await; // roomList [lobby, den]

    drop(bob);

    assert_eq!(next_event(&mut alice).await, rooms(&["lobby"]));
}

#[tokio::test]
async fn test_stalled_handshake_does_not_block_other_clients() {
    let addr = start_server().await;

    // Opens TCP but never sends the upgrade request.
    let _stalled = tokio::net::TcpStream::connect(&addr).await.expect("tcp connect");

    let mut ws = tokio::time::timeout(Duration::from_secs(3), connect(&addr))
        .await
        .expect("client should be served while another handshake is pending");
    enter_room(&mut ws, "Alice", "lobby").await;
    assert_eq!(next_event(&mut ws).await, admin("You have joined the lobby chat room"));
}

#[tokio::test]
async fn test_stalled_handshake_is_dropped_after_timeout() {
    let builder = RoomcastServerBuilder::new().handshake_timeout(Duration::from_millis(100));
    let addr = start_with(builder).await;

    let mut stalled = tokio::net::TcpStream::connect(&addr).await.expect("tcp connect");
    let mut buf = [0u8; 64];
    // The server closes the socket without ever answering.
    let read = tokio::time::timeout(
        Duration::from_secs(2),
        tokio::io::AsyncReadExt::read(&mut stalled, &mut buf),
    )
    .await
    .expect("server should hang up on a stalled handshake");
    assert!(matches!(read, Ok(0) | Err(_)));
}

#[tokio::test]
async fn test_idle_connection_is_closed() {
    let builder = RoomcastServerBuilder::new().idle_timeout(Duration::from_millis(100));
    let addr = start_with(builder).await;
    let mut ws = connect(&addr).await;

    let result = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(result.is_ok(), "server should close an idle connection");
}

#[tokio::test]
async fn test_connection_announcement() {
    let config = RouterConfig {
        announce_connections: true,
        ..RouterConfig::default()
    };
    let addr = start_with(RoomcastServerBuilder::new().router_config(config)).await;
    let mut first = connect(&addr).await;
    let _second = connect(&addr).await;

    match next_event(&mut first).await {
        ServerEvent::Message(msg) => {
            assert_eq!(msg.name, "Admin");
            assert!(msg.text.starts_with("User conn-"), "{}", msg.text);
            assert!(msg.text.ends_with(" connected"));
        }
        other => panic!("expected announcement, got {other:?}"),
    }
}
