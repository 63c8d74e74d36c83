//! UseCase: 参加者接続処理
//!
//! 参加者をルームの名簿に追加し、接続チャンネルを MessagePusher に登録する。
//! 新規参加者へ返す名簿スナップショット（本人以外）とデッキは Registry が
//! 追加と同一の原子的操作の中で採取する。

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{
    JoinSnapshot, MessagePusher, ParticipantId, PusherChannel, RoomKey, RoomRegistry, Timestamp,
};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Registry（状態管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// ルームが存在するかどうか（WebSocket アップグレード前の事前チェック）
    pub async fn room_exists(&self, room_key: &RoomKey) -> bool {
        self.registry.room_exists(room_key).await
    }

    /// 参加者接続を実行
    ///
    /// # Arguments
    ///
    /// * `room_key` - 参加先ルームのキー
    /// * `name` - 参加者の表示名（検証・重複排除はしない）
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(JoinSnapshot)` - 接続成功（割り当て ID・既存名簿・デッキ）
    /// * `Err(ConnectError)` - ルームが存在しない
    pub async fn execute(
        &self,
        room_key: RoomKey,
        name: String,
        sender: PusherChannel,
    ) -> Result<JoinSnapshot, ConnectError> {
        // 1. Registry に参加者を追加（ID 生成・スナップショット採取込み）
        let now = Timestamp::new(get_jst_timestamp());
        let snapshot = self
            .registry
            .add_participant(&room_key, name, now)
            .await
            .map_err(|_| ConnectError::RoomNotFound(room_key.as_str().to_string()))?;

        // 2. MessagePusher に接続を登録
        self.message_pusher
            .register(room_key, snapshot.participant.id, sender)
            .await;

        Ok(snapshot)
    }

    /// 参加者が join したことを既存の参加者にブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `room_key` - 対象ルームのキー
    /// * `new_id` - 新規参加者の ID（本人は対象から除外される）
    /// * `message` - ブロードキャストするメッセージ（JSON）
    pub async fn broadcast_joined(
        &self,
        room_key: &RoomKey,
        new_id: ParticipantId,
        message: &str,
    ) -> Result<(), String> {
        // 新規参加者以外の全ての参加者が対象
        let targets: Vec<ParticipantId> = self
            .registry
            .participant_ids(room_key)
            .await
            .map_err(|e| e.to_string())?
            .into_iter()
            .filter(|id| *id != new_id)
            .collect();

        self.message_pusher
            .broadcast(room_key, targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, registry::InMemoryRoomRegistry,
    };

    async fn create_room(registry: &InMemoryRoomRegistry) -> RoomKey {
        registry.create_room(Timestamp::new(get_jst_timestamp())).await
    }

    #[tokio::test]
    async fn test_connect_participant_success() {
        // テスト項目: 新規参加者が接続でき、名簿スナップショットを受け取る
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = ConnectParticipantUseCase::new(registry.clone(), message_pusher);
        let room_key = create_room(&registry).await;

        // when (操作):
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let result = usecase
            .execute(room_key.clone(), "alice".to_string(), tx)
            .await;

        // then (期待する結果):
        let snapshot = result.unwrap();
        assert_eq!(snapshot.participant.name, "alice");
        assert_ne!(snapshot.participant.id.value(), 0);
        assert!(snapshot.others.is_empty());
        assert_eq!(snapshot.deck.len(), 9);

        // Registry に追加されているか確認
        let ids = registry.participant_ids(&room_key).await.unwrap();
        assert_eq!(ids, vec![snapshot.participant.id]);
    }

    #[tokio::test]
    async fn test_connect_to_missing_room_fails() {
        // テスト項目: 存在しないルームへの接続がエラーになる（自動作成しない）
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = ConnectParticipantUseCase::new(registry.clone(), message_pusher);

        // when (操作):
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let missing = RoomKey::new("ZZZZ9".to_string()).unwrap();
        let result = usecase.execute(missing, "alice".to_string(), tx).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ConnectError::RoomNotFound("ZZZZ9".to_string()))
        );
        assert!(registry.list_rooms().await.is_empty());
    }

    #[tokio::test]
    async fn test_second_joiner_sees_first_in_snapshot() {
        // テスト項目: 2 人目のスナップショットに 1 人目だけが現れる
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = ConnectParticipantUseCase::new(registry.clone(), message_pusher);
        let room_key = create_room(&registry).await;

        let (tx1, _rx1) = tokio::sync::mpsc::unbounded_channel();
        let alice = usecase
            .execute(room_key.clone(), "alice".to_string(), tx1)
            .await
            .unwrap();

        // when (操作):
        let (tx2, _rx2) = tokio::sync::mpsc::unbounded_channel();
        let bob = usecase
            .execute(room_key.clone(), "bob".to_string(), tx2)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(bob.others.len(), 1);
        assert_eq!(bob.others[0].id, alice.participant.id);
        assert_ne!(bob.participant.id, alice.participant.id);
    }

    #[tokio::test]
    async fn test_broadcast_joined_excludes_new_participant() {
        // テスト項目: JOINED ブロードキャストが本人に届かない
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = ConnectParticipantUseCase::new(registry.clone(), message_pusher);
        let room_key = create_room(&registry).await;

        let (tx1, mut rx1) = tokio::sync::mpsc::unbounded_channel();
        let alice = usecase
            .execute(room_key.clone(), "alice".to_string(), tx1)
            .await
            .unwrap();
        let (tx2, mut rx2) = tokio::sync::mpsc::unbounded_channel();
        let bob = usecase
            .execute(room_key.clone(), "bob".to_string(), tx2)
            .await
            .unwrap();

        // when (操作):
        usecase
            .broadcast_joined(&room_key, bob.participant.id, r#"{"action":"JOINED"}"#)
            .await
            .unwrap();

        // then (期待する結果): alice のみ受信する
        assert_eq!(rx1.recv().await, Some(r#"{"action":"JOINED"}"#.to_string()));
        assert!(rx2.try_recv().is_err());
    }
}
