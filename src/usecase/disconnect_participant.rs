//! UseCase: 参加者切断処理
//!
//! 参加者を名簿から削除し、接続を MessagePusher から登録解除する。
//! 残った参加者への LEAVE 通知対象も合わせて返す。

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{
    MessagePusher, ParticipantId, ParticipantView, RoomKey, RoomRegistry, Timestamp,
};

use super::error::DispatchError;

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Registry（状態管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Ok((view, targets))` - 削除された参加者の公開ビューと、残った参加者
    ///   （LEAVE の通知対象）の ID リスト
    /// * `Err(DispatchError)` - 参加者またはルームが既に存在しない
    pub async fn execute(
        &self,
        room_key: &RoomKey,
        id: ParticipantId,
    ) -> Result<(ParticipantView, Vec<ParticipantId>), DispatchError> {
        // 1. Registry から参加者を削除
        let now = Timestamp::new(get_jst_timestamp());
        let view = self.registry.remove_participant(room_key, id, now).await?;

        // 2. 残った参加者（通知対象）を取得
        let targets = self.registry.participant_ids(room_key).await?;

        // 3. MessagePusher から接続を登録解除
        self.message_pusher.unregister(room_key, id).await;

        Ok((view, targets))
    }

    /// 参加者が退出したことを残りの参加者にブロードキャスト
    pub async fn broadcast_left(
        &self,
        room_key: &RoomKey,
        targets: Vec<ParticipantId>,
        message: &str,
    ) -> Result<(), String> {
        self.message_pusher
            .broadcast(room_key, targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}
