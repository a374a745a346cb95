//! Integration tests for the relay: admission, join handshake, event routing
//! between sessions, and bus delivery through the publish endpoint.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use jsonwebtoken::{EncodingKey, Header, encode};
use roomrelay_server::{
    infrastructure::{
        auth::{JwtAdmissionCheck, JwtClaims},
        bus::InMemoryMessageBus,
        registry::InMemoryConnectionRegistry,
    },
    ui::{Server, ServerConfig},
};
use roomrelay_shared::time::{SystemClock, get_timestamp_millis};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const SECRET: &[u8] = b"integration-secret";

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Helper: start the relay on a random port and return its address.
async fn start_test_server() -> SocketAddr {
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let bus = Arc::new(InMemoryMessageBus::new());
    let admission =
        Arc::new(JwtAdmissionCheck::new(SECRET, "HS256", Arc::new(SystemClock)).unwrap());
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        topic: "chat_channel".to_string(),
        echo_typing: false,
    };
    let server = Server::new(config, registry, bus, admission);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server
            .serve(listener, std::future::pending())
            .await
            .unwrap();
    });
    addr
}

fn token_for(user_id: i64) -> String {
    let claims = JwtClaims {
        user_id,
        exp: get_timestamp_millis() / 1000 + 3600,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

/// Helper: connect with a valid token without joining.
async fn connect(addr: SocketAddr, user_id: i64) -> Client {
    let url = format!("ws://{}/ws?token={}", addr, token_for(user_id));
    let (ws, _) = connect_async(url).await.expect("Failed to connect");
    ws
}

/// Helper: connect, send the join message and wait until this connection holds the room.
async fn join(addr: SocketAddr, user_id: i64, room: &str) -> Client {
    let previous = connection_id(addr, room).await;
    let mut ws = connect(addr, user_id).await;
    ws.send(Message::text(json!({ "room": room }).to_string()))
        .await
        .unwrap();
    wait_for_new_connection(addr, room, previous).await;
    ws
}

async fn registered_rooms(addr: SocketAddr) -> Vec<Value> {
    reqwest::get(format!("http://{}/debug/rooms", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn room_names(addr: SocketAddr) -> Vec<String> {
    registered_rooms(addr)
        .await
        .into_iter()
        .filter_map(|room| room["room"].as_str().map(str::to_string))
        .collect()
}

async fn connection_id(addr: SocketAddr, room: &str) -> Option<String> {
    registered_rooms(addr)
        .await
        .into_iter()
        .find(|entry| entry["room"] == room)
        .and_then(|entry| entry["connection_id"].as_str().map(str::to_string))
}

/// Wait until `room` is held by a connection other than `previous`.
async fn wait_for_new_connection(addr: SocketAddr, room: &str, previous: Option<String>) {
    for _ in 0..50 {
        let current = connection_id(addr, room).await;
        if current.is_some() && current != previous {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("room '{}' was not registered to a new connection", room);
}

async fn wait_for_room(addr: SocketAddr, room: &str, present: bool) {
    for _ in 0..50 {
        if room_names(addr).await.iter().any(|r| r == room) == present {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("room '{}' did not become present={}", room, present);
}

/// Helper: read the next text frame as JSON, failing after a timeout.
async fn next_json(ws: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("Timed out waiting for a message")
            .expect("Stream ended")
            .expect("WebSocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Helper: assert nothing arrives within a short window.
async fn assert_silent(ws: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(result.is_err(), "unexpected message: {:?}", result);
}

#[tokio::test]
async fn test_connection_without_token_is_rejected() {
    // テスト項目: トークンなし・不正トークンでの接続は 401 で拒否される
    // given (前提条件):
    let addr = start_test_server().await;

    // when (操作):
    let missing = connect_async(format!("ws://{}/ws", addr)).await;
    let invalid = connect_async(format!("ws://{}/ws?token=garbage", addr)).await;

    // then (期待する結果):
    for result in [missing, invalid] {
        match result {
            Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
                assert_eq!(response.status().as_u16(), 401);
            }
            other => panic!("expected HTTP 401, got {:?}", other.map(|_| ())),
        }
    }
    assert!(room_names(addr).await.is_empty());
}

#[tokio::test]
async fn test_malformed_join_closes_connection() {
    // テスト項目: 不正な join メッセージで接続が閉じられ、登録されない
    // given (前提条件):
    let addr = start_test_server().await;
    let mut ws = connect(addr, 1).await;

    // when (操作):
    ws.send(Message::text("not a join message")).await.unwrap();

    // then (期待する結果):
    let next = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("server should close the connection");
    assert!(matches!(next, None | Some(Ok(Message::Close(_))) | Some(Err(_))));
    assert!(room_names(addr).await.is_empty());
}

#[tokio::test]
async fn test_bus_message_is_delivered_to_joined_room() {
    // テスト項目: 発行されたメッセージが対象ルームの接続にそのまま届く
    // given (前提条件):
    let addr = start_test_server().await;
    let mut receiver = join(addr, 9, "user_9").await;
    let message = json!({
        "room": "user_9",
        "content": "hello",
        "sender_id": 3,
        "receiver_id": 9,
        "timestamp": "2025-01-01T09:00:00",
        "message_id": 100,
        "sender_nickname": "alice",
        "sender_profile_image": "alice.png"
    });

    // when (操作):
    let response = reqwest::Client::new()
        .post(format!("http://{}/api/publish", addr))
        .json(&message)
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status().as_u16(), 202);
    assert_eq!(next_json(&mut receiver).await, message);
}

#[tokio::test]
async fn test_bus_message_for_absent_room_is_dropped() {
    // テスト項目: 未接続ルーム宛てのメッセージは破棄され、発行者にはエラーにならない
    // given (前提条件):
    let addr = start_test_server().await;
    let mut bystander = join(addr, 1, "user_1").await;

    // when (操作):
    let response = reqwest::Client::new()
        .post(format!("http://{}/api/publish", addr))
        .json(&json!({ "room": "user_9", "content": "nobody home" }))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status().as_u16(), 202);
    assert_silent(&mut bystander).await;
}

#[tokio::test]
async fn test_delete_message_reaches_receiver_and_sender() {
    // テスト項目: delete_message が受信者と送信者自身のルームに届く
    // given (前提条件):
    let addr = start_test_server().await;
    let mut sender = join(addr, 3, "user_3").await;
    let mut receiver = join(addr, 7, "user_7").await;

    // when (操作):
    sender
        .send(Message::text(
            json!({ "type": "delete_message", "message_id": 42, "receiverId": 7 }).to_string(),
        ))
        .await
        .unwrap();

    // then (期待する結果):
    let expected = json!({ "type": "delete_message", "message_id": 42 });
    assert_eq!(next_json(&mut receiver).await, expected);
    assert_eq!(next_json(&mut sender).await, expected);
}

#[tokio::test]
async fn test_invalid_typing_does_not_end_session() {
    // テスト項目: senderId のない typing は無視され、セッションは継続する
    // given (前提条件):
    let addr = start_test_server().await;
    let mut sender = join(addr, 3, "user_3").await;
    let mut receiver = join(addr, 7, "user_7").await;

    // when (操作):
    sender
        .send(Message::text(json!({ "type": "typing", "receiverId": 7 }).to_string()))
        .await
        .unwrap();
    sender
        .send(Message::text(
            json!({ "type": "typing", "senderId": 3, "receiverId": 7 }).to_string(),
        ))
        .await
        .unwrap();

    // then (期待する結果): 2 件目だけが届く
    assert_eq!(
        next_json(&mut receiver).await,
        json!({ "type": "typing", "sender_id": 3 })
    );
    assert_silent(&mut receiver).await;
    assert!(room_names(addr).await.contains(&"user_3".to_string()));
}

#[tokio::test]
async fn test_disconnect_unregisters_room() {
    // テスト項目: クライアントが切断するとルームの登録が解除される
    // given (前提条件):
    let addr = start_test_server().await;
    let mut client = join(addr, 5, "user_5").await;

    // when (操作):
    client.close(None).await.unwrap();

    // then (期待する結果):
    wait_for_room(addr, "user_5", false).await;
}

#[tokio::test]
async fn test_rejoin_replaces_previous_connection() {
    // テスト項目: 同じルームへの再参加で新しい接続に配信され、古い接続の切断で登録は消えない
    // given (前提条件):
    let addr = start_test_server().await;
    let mut first = join(addr, 3, "user_3").await;
    let first_id = connection_id(addr, "user_3").await;
    let mut second = join(addr, 3, "user_3").await;
    let second_id = connection_id(addr, "user_3").await;
    let mut peer = join(addr, 7, "user_7").await;
    assert_ne!(first_id, second_id);

    // when (操作):
    first.close(None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    peer.send(Message::text(
        json!({ "type": "typing", "senderId": 7, "receiverId": 3 }).to_string(),
    ))
    .await
    .unwrap();

    // then (期待する結果):
    assert_eq!(
        next_json(&mut second).await,
        json!({ "type": "typing", "sender_id": 7 })
    );
    assert_eq!(connection_id(addr, "user_3").await, second_id);
}

#[tokio::test]
async fn test_ping_before_join_keeps_session() {
    // テスト項目: join 前の ping でセッションが終了せず、その後の join で登録される
    // given (前提条件):
    let addr = start_test_server().await;
    let mut ws = connect(addr, 4).await;

    // when (操作):
    ws.send(Message::Ping(vec![1].into())).await.unwrap();
    ws.send(Message::text(json!({ "room": "user_4" }).to_string()))
        .await
        .unwrap();

    // then (期待する結果):
    wait_for_room(addr, "user_4", true).await;
}

#[tokio::test]
async fn test_binary_join_is_accepted() {
    // テスト項目: バイナリフレームで送られた join でもルームに登録され、配信を受け取れる
    // given (前提条件):
    let addr = start_test_server().await;
    let mut receiver = connect(addr, 4).await;
    let mut sender = join(addr, 3, "user_3").await;

    // when (操作):
    receiver
        .send(Message::binary(json!({ "room": "user_4" }).to_string().into_bytes()))
        .await
        .unwrap();
    wait_for_room(addr, "user_4", true).await;
    sender
        .send(Message::text(
            json!({ "type": "typing", "senderId": 3, "receiverId": 4 }).to_string(),
        ))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(
        next_json(&mut receiver).await,
        json!({ "type": "typing", "sender_id": 3 })
    );
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが ok を返す
    // given (前提条件):
    let addr = start_test_server().await;

    // when (操作):
    let body: Value = reqwest::get(format!("http://{}/api/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(body, json!({ "status": "ok" }));
}
