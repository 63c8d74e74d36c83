//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続中の参加者ごとの `UnboundedSender` を管理
//! - 参加者へのメッセージ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、
//! `(RoomKey, ParticipantId)` をキーに保持してメッセージ送信に使用します。
//!
//! broadcast は一部の宛先への送信失敗をログに残して続行します。
//! ある参加者の切断が他の参加者への通知を妨げてはならないためです。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MessagePushError, MessagePusher, ParticipantId, PusherChannel, RoomKey};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// 接続中の参加者の WebSocket sender
    ///
    /// Key: (RoomKey, ParticipantId)
    /// Value: PusherChannel
    clients: Arc<Mutex<HashMap<(RoomKey, ParticipantId), PusherChannel>>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register(&self, room_key: RoomKey, id: ParticipantId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!(
            "Participant {} registered to MessagePusher for room '{}'",
            id.value(),
            room_key.as_str()
        );
        clients.insert((room_key, id), sender);
    }

    async fn unregister(&self, room_key: &RoomKey, id: ParticipantId) {
        let mut clients = self.clients.lock().await;
        clients.remove(&(room_key.clone(), id));
        tracing::debug!(
            "Participant {} unregistered from MessagePusher for room '{}'",
            id.value(),
            room_key.as_str()
        );
    }

    async fn push_to(
        &self,
        room_key: &RoomKey,
        id: ParticipantId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        if let Some(sender) = clients.get(&(room_key.clone(), id)) {
            sender
                .send(content.to_string())
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!(
                "Pushed message to participant {} in room '{}'",
                id.value(),
                room_key.as_str()
            );
            Ok(())
        } else {
            Err(MessagePushError::ConnectionNotFound {
                room: room_key.as_str().to_string(),
                id: id.value(),
            })
        }
    }

    async fn broadcast(
        &self,
        room_key: &RoomKey,
        targets: Vec<ParticipantId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        for target in targets {
            if let Some(sender) = clients.get(&(room_key.clone(), target)) {
                // ブロードキャストでは一部の送信失敗を許容
                if let Err(e) = sender.send(content.to_string()) {
                    tracing::warn!(
                        "Failed to push message to participant {} in room '{}': {}",
                        target.value(),
                        room_key.as_str(),
                        e
                    );
                }
            } else {
                tracing::warn!(
                    "Participant {} in room '{}' not found during broadcast, skipping",
                    target.value(),
                    room_key.as_str()
                );
            }
        }

        Ok(())
    }
}
