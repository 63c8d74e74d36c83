//! UseCase: 投票の設定・取り消し
//!
//! CAST_VOTE（値の設定）と REMOVE_VOTE（クリア）を 1 つのユースケースで
//! 扱う。どちらも更新後の公開ビューをルーム全員にブロードキャストする。
//!
//! 投票値はデッキと照合しない（値は不透明な文字列）。オブザーバーの投票も
//! 現状は制限しない。

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{
    MessagePusher, ParticipantId, ParticipantView, RoomKey, RoomRegistry, Timestamp,
};

use super::error::DispatchError;

/// 投票設定・取り消しのユースケース
pub struct CastVoteUseCase {
    /// Registry（状態管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl CastVoteUseCase {
    /// 新しい CastVoteUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 投票を設定（`Some`）またはクリア（`None`）する
    ///
    /// # Returns
    ///
    /// * `Ok((view, targets))` - 更新後の公開ビューと、ブロードキャスト対象
    ///   （本人を含むルーム全員）の ID リスト
    pub async fn execute(
        &self,
        room_key: &RoomKey,
        id: ParticipantId,
        vote: Option<String>,
    ) -> Result<(ParticipantView, Vec<ParticipantId>), DispatchError> {
        let now = Timestamp::new(get_jst_timestamp());
        let view = self.registry.set_vote(room_key, id, vote, now).await?;
        let targets = self.registry.participant_ids(room_key).await?;
        Ok((view, targets))
    }

    /// 投票状態の変化をルーム全員にブロードキャスト
    pub async fn broadcast_vote(
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
