//! UseCase: 全投票クリア
//!
//! ルーム内の全参加者の投票を取り消し、CLEAR_VOTES をルーム全員に
//! ブロードキャストする。明示的なクライアント要求のほか、デッキ変更時にも
//! 使われる（デッキ変更は進行中の投票を無効にする）。

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{MessagePusher, ParticipantId, RoomKey, RoomRegistry, Timestamp};

use super::error::DispatchError;

/// 全投票クリアのユースケース
pub struct ClearVotesUseCase {
    /// Registry（状態管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ClearVotesUseCase {
    /// 新しい ClearVotesUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 全投票をクリアし、ブロードキャスト対象（ルーム全員）を返す
    pub async fn execute(&self, room_key: &RoomKey) -> Result<Vec<ParticipantId>, DispatchError> {
        let now = Timestamp::new(get_jst_timestamp());
        self.registry.clear_votes(room_key, now).await?;
        let targets = self.registry.participant_ids(room_key).await?;
        Ok(targets)
    }

    /// クリア通知をルーム全員にブロードキャスト
    pub async fn broadcast_cleared(
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
