//! UseCase: デッキ変更
//!
//! ルームのデッキを丸ごと置き換え、UPDATE_DECK をルーム全員に
//! ブロードキャストする。デッキ変更は進行中の投票を無効にするため、
//! 呼び出し側（HTTP ハンドラ）は続けて ClearVotesUseCase を実行する。
//!
//! デッキの値は不透明な文字列で、正規の集合に対する検証はしない。

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{MessagePusher, ParticipantId, RoomKey, RoomRegistry, Timestamp};

use super::error::DispatchError;

/// デッキ変更のユースケース
pub struct ChangeDeckUseCase {
    /// Registry（状態管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ChangeDeckUseCase {
    /// 新しい ChangeDeckUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// デッキを置き換え、ブロードキャスト対象（ルーム全員）を返す
    pub async fn execute(
        &self,
        room_key: &RoomKey,
        new_deck: Vec<String>,
    ) -> Result<Vec<ParticipantId>, DispatchError> {
        let now = Timestamp::new(get_jst_timestamp());
        self.registry.replace_deck(room_key, new_deck, now).await?;
        let targets = self.registry.participant_ids(room_key).await?;
        Ok(targets)
    }

    /// デッキ変更通知をルーム全員にブロードキャスト
    pub async fn broadcast_deck(
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
