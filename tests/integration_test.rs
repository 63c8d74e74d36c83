//! Integration tests for the planning poker server.
//!
//! Each test serves the real router on an ephemeral port, talks to it over
//! plain WebSocket/HTTP clients and asserts on the wire-level messages.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
};

use planning_poker_rs::{
    infrastructure::{message_pusher::WebSocketMessagePusher, registry::InMemoryRoomRegistry},
    ui::Server,
    usecase::{
        CastVoteUseCase, ChangeDeckUseCase, ClearVotesUseCase, ConnectParticipantUseCase,
        CreateRoomUseCase, DisconnectParticipantUseCase, GetRoomsUseCase, RevealVotesUseCase,
        ToggleObserverUseCase,
    },
};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const SILENCE_WINDOW: Duration = Duration::from_millis(300);

/// Serve the full router on an ephemeral port.
///
/// Returns the HTTP and WebSocket base URLs.
async fn spawn_server() -> (String, String) {
    let registry = Arc::new(InMemoryRoomRegistry::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    let server = Server::new(
        Arc::new(ConnectParticipantUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        )),
        Arc::new(DisconnectParticipantUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        )),
        Arc::new(CastVoteUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        )),
        Arc::new(RevealVotesUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        )),
        Arc::new(ClearVotesUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        )),
        Arc::new(ToggleObserverUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        )),
        Arc::new(CreateRoomUseCase::new(registry.clone())),
        Arc::new(GetRoomsUseCase::new(registry.clone())),
        Arc::new(ChangeDeckUseCase::new(registry, message_pusher)),
    );
    let app = server.router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), format!("ws://{}", addr))
}

/// Create a room over HTTP and return its key.
async fn create_room(http_base: &str) -> String {
    let response = reqwest::Client::new()
        .put(format!("{}/api/rooms", http_base))
        .send()
        .await
        .expect("create-room request failed");
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    body["room_key"].as_str().expect("room_key missing").to_string()
}

/// A participant connected over WebSocket.
struct WsClient {
    write: SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>,
    read: SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl WsClient {
    /// Join a room; panics if the handshake is rejected.
    async fn join(ws_base: &str, room_key: &str, name: &str) -> Self {
        let url = format!("{}/rooms/{}/users/{}", ws_base, room_key, name);
        let (stream, _) = connect_async(url).await.expect("WebSocket handshake failed");
        let (write, read) = stream.split();
        Self { write, read }
    }

    async fn send_action(&mut self, action: &str, payload: &str) {
        let msg = serde_json::json!({"action": action, "payload": payload});
        self.write
            .send(Message::text(msg.to_string()))
            .await
            .expect("failed to send message");
    }

    async fn send_raw(&mut self, raw: &str) {
        self.write
            .send(Message::text(raw.to_string()))
            .await
            .expect("failed to send message");
    }

    /// Read the next text frame as JSON.
    async fn next_json(&mut self) -> serde_json::Value {
        loop {
            let msg = tokio::time::timeout(RECV_TIMEOUT, self.read.next())
                .await
                .expect("timed out waiting for a message")
                .expect("connection closed unexpectedly")
                .expect("websocket read error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).expect("invalid JSON from server");
            }
        }
    }

    /// Assert that no text frame arrives within the silence window.
    async fn expect_silence(&mut self) {
        match tokio::time::timeout(SILENCE_WINDOW, self.read.next()).await {
            Err(_) => {}
            Ok(Some(Ok(Message::Text(text)))) => {
                panic!("expected silence, got: {}", text.as_str())
            }
            Ok(_) => {}
        }
    }

    async fn close(mut self) {
        let _ = self.write.close().await;
    }
}

/// Consume the private join sequence (PARTICIPANTS_LIST then UPDATE_DECK)
/// and return (roster payload, deck payload).
async fn read_welcome(client: &mut WsClient) -> (serde_json::Value, serde_json::Value) {
    let list = client.next_json().await;
    assert_eq!(list["action"], "PARTICIPANTS_LIST");
    let deck = client.next_json().await;
    assert_eq!(deck["action"], "UPDATE_DECK");
    (list["payload"].clone(), deck["payload"].clone())
}

#[tokio::test]
async fn test_create_room_returns_five_char_key_and_lists_it() {
    let (http_base, _ws_base) = spawn_server().await;

    let key = create_room(&http_base).await;
    assert_eq!(key.len(), 5);
    assert!(
        key.bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    );

    let rooms: serde_json::Value = reqwest::Client::new()
        .get(format!("{}/api/rooms", http_base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let listed: Vec<&str> = rooms
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["room_key"].as_str().unwrap())
        .collect();
    assert!(listed.contains(&key.as_str()));
}

#[tokio::test]
async fn test_join_missing_room_is_rejected() {
    let (_http_base, ws_base) = spawn_server().await;

    let url = format!("{}/rooms/ZZZZ9/users/alice", ws_base);
    let result = connect_async(url).await;
    assert!(result.is_err(), "handshake should fail for a missing room");
}

#[tokio::test]
async fn test_full_voting_scenario() {
    let (http_base, ws_base) = spawn_server().await;
    let key = create_room(&http_base).await;

    // Alice joins an empty room: empty roster, default 9-value deck
    let mut alice = WsClient::join(&ws_base, &key, "alice").await;
    let (roster, deck) = read_welcome(&mut alice).await;
    assert_eq!(roster.as_array().unwrap().len(), 0);
    assert_eq!(deck.as_array().unwrap().len(), 9);
    assert_eq!(deck[0], "1");
    assert_eq!(deck[8], "BRK");

    // Bob joins: his roster contains Alice, Alice is told about Bob
    let mut bob = WsClient::join(&ws_base, &key, "bob").await;
    let (bob_roster, bob_deck) = read_welcome(&mut bob).await;
    assert_eq!(bob_roster.as_array().unwrap().len(), 1);
    assert_eq!(bob_roster[0]["name"], "alice");
    assert_eq!(bob_roster[0]["voted"], false);
    assert_eq!(bob_deck.as_array().unwrap().len(), 9);
    let alice_id = bob_roster[0]["id"].as_i64().unwrap();

    let joined = alice.next_json().await;
    assert_eq!(joined["action"], "JOINED");
    assert_eq!(joined["participant"]["name"], "bob");
    assert_eq!(joined["participant"]["voted"], false);
    let bob_id = joined["participant"]["id"].as_i64().unwrap();
    assert_ne!(bob_id, 0);
    assert_ne!(bob_id, alice_id);

    // Bob casts a hidden vote: everyone sees VOTED, nobody sees the value
    bob.send_action("CAST_VOTE", "5").await;
    for client in [&mut alice, &mut bob] {
        let voted = client.next_json().await;
        assert_eq!(voted["action"], "VOTED");
        assert_eq!(voted["participant"]["name"], "bob");
        assert_eq!(voted["participant"]["voted"], true);
        assert!(!voted.to_string().contains(r#""5""#));
    }

    // Alice reveals: the vote map attributes "5" to Bob and null to Alice
    alice.send_action("REVEAL_VOTES", "").await;
    for client in [&mut alice, &mut bob] {
        let reveal = client.next_json().await;
        assert_eq!(reveal["action"], "REVEAL_VOTES");
        assert_eq!(reveal["participant"], serde_json::Value::Null);
        assert_eq!(reveal["payload"][bob_id.to_string()], "5");
        assert_eq!(
            reveal["payload"][alice_id.to_string()],
            serde_json::Value::Null
        );
    }
}

#[tokio::test]
async fn test_unknown_action_errors_sender_only() {
    let (http_base, ws_base) = spawn_server().await;
    let key = create_room(&http_base).await;

    let mut alice = WsClient::join(&ws_base, &key, "alice").await;
    read_welcome(&mut alice).await;
    let mut bob = WsClient::join(&ws_base, &key, "bob").await;
    read_welcome(&mut bob).await;
    alice.next_json().await; // JOINED(bob)

    // Unrecognized action tag
    bob.send_raw(r#"{"action":"FOO","payload":""}"#).await;
    let error = bob.next_json().await;
    assert_eq!(error["action"], "ERROR");
    assert!(
        error["payload"]
            .as_str()
            .unwrap()
            .contains("CAST_VOTE, REMOVE_VOTE, REVEAL_VOTES")
    );
    alice.expect_silence().await;

    // Response-only action sent inbound is treated the same way
    bob.send_action("JOINED", "").await;
    let error = bob.next_json().await;
    assert_eq!(error["action"], "ERROR");
    alice.expect_silence().await;

    // Room state is unchanged: a reveal still shows two unvoted participants
    bob.send_action("REVEAL_VOTES", "").await;
    let reveal = bob.next_json().await;
    assert_eq!(reveal["action"], "REVEAL_VOTES");
    let map = reveal["payload"].as_object().unwrap();
    assert_eq!(map.len(), 2);
    assert!(map.values().all(|v| v.is_null()));
}

#[tokio::test]
async fn test_remove_vote_and_clear_votes() {
    let (http_base, ws_base) = spawn_server().await;
    let key = create_room(&http_base).await;

    let mut alice = WsClient::join(&ws_base, &key, "alice").await;
    read_welcome(&mut alice).await;

    alice.send_action("CAST_VOTE", "8").await;
    let voted = alice.next_json().await;
    assert_eq!(voted["participant"]["voted"], true);

    // REMOVE_VOTE clears the flag
    alice.send_action("REMOVE_VOTE", "").await;
    let removed = alice.next_json().await;
    assert_eq!(removed["action"], "REMOVE_VOTE");
    assert_eq!(removed["participant"]["voted"], false);

    // CLEAR_VOTES resets the whole room regardless of prior state
    alice.send_action("CAST_VOTE", "13").await;
    alice.next_json().await; // VOTED
    alice.send_action("CLEAR_VOTES", "").await;
    let cleared = alice.next_json().await;
    assert_eq!(cleared["action"], "CLEAR_VOTES");
    assert_eq!(cleared["participant"], serde_json::Value::Null);

    alice.send_action("REVEAL_VOTES", "").await;
    let reveal = alice.next_json().await;
    assert!(
        reveal["payload"]
            .as_object()
            .unwrap()
            .values()
            .all(|v| v.is_null())
    );
}

#[tokio::test]
async fn test_sit_out_sit_in_round_trip_keeps_vote() {
    let (http_base, ws_base) = spawn_server().await;
    let key = create_room(&http_base).await;

    let mut alice = WsClient::join(&ws_base, &key, "alice").await;
    read_welcome(&mut alice).await;

    alice.send_action("CAST_VOTE", "3").await;
    alice.next_json().await; // VOTED

    alice.send_action("SIT_OUT", "").await;
    let sit_out = alice.next_json().await;
    assert_eq!(sit_out["action"], "SIT_OUT");
    assert_eq!(sit_out["participant"]["observer"], true);
    assert_eq!(sit_out["participant"]["voted"], true);

    alice.send_action("SIT_IN", "").await;
    let sit_in = alice.next_json().await;
    assert_eq!(sit_in["action"], "SIT_IN");
    assert_eq!(sit_in["participant"]["observer"], false);
    assert_eq!(sit_in["participant"]["voted"], true);
}

#[tokio::test]
async fn test_disconnect_broadcasts_single_leave() {
    let (http_base, ws_base) = spawn_server().await;
    let key = create_room(&http_base).await;

    let mut alice = WsClient::join(&ws_base, &key, "alice").await;
    read_welcome(&mut alice).await;
    let mut bob = WsClient::join(&ws_base, &key, "bob").await;
    read_welcome(&mut bob).await;
    let joined = alice.next_json().await;
    let bob_id = joined["participant"]["id"].as_i64().unwrap();

    bob.close().await;

    let leave = alice.next_json().await;
    assert_eq!(leave["action"], "LEAVE");
    assert_eq!(leave["participant"]["name"], "bob");
    assert_eq!(leave["participant"]["id"].as_i64().unwrap(), bob_id);

    // Exactly one LEAVE, and Bob is gone from subsequent reveals
    alice.send_action("REVEAL_VOTES", "").await;
    let reveal = alice.next_json().await;
    assert_eq!(reveal["action"], "REVEAL_VOTES");
    let map = reveal["payload"].as_object().unwrap();
    assert_eq!(map.len(), 1);
    assert!(!map.contains_key(&bob_id.to_string()));
}

#[tokio::test]
async fn test_change_deck_broadcasts_update_and_invalidates_votes() {
    let (http_base, ws_base) = spawn_server().await;
    let key = create_room(&http_base).await;

    let mut alice = WsClient::join(&ws_base, &key, "alice").await;
    read_welcome(&mut alice).await;

    alice.send_action("CAST_VOTE", "21").await;
    alice.next_json().await; // VOTED

    // Replace the deck over HTTP
    let response = reqwest::Client::new()
        .post(format!("{}/api/rooms/{}/deck", http_base, key))
        .json(&vec!["XS", "S", "M", "L"])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // The room hears UPDATE_DECK first, then CLEAR_VOTES
    let update = alice.next_json().await;
    assert_eq!(update["action"], "UPDATE_DECK");
    assert_eq!(update["payload"].as_array().unwrap().len(), 4);
    assert_eq!(update["payload"][0], "XS");

    let cleared = alice.next_json().await;
    assert_eq!(cleared["action"], "CLEAR_VOTES");

    alice.send_action("REVEAL_VOTES", "").await;
    let reveal = alice.next_json().await;
    assert!(
        reveal["payload"]
            .as_object()
            .unwrap()
            .values()
            .all(|v| v.is_null())
    );
}

#[tokio::test]
async fn test_change_deck_for_missing_room_is_404() {
    let (http_base, _ws_base) = spawn_server().await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/rooms/ZZZZ9/deck", http_base))
        .json(&vec!["1"])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_check() {
    let (http_base, _ws_base) = spawn_server().await;

    let body: serde_json::Value = reqwest::Client::new()
        .get(format!("{}/api/health", http_base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}
