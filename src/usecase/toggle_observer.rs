//! UseCase: オブザーバー状態の切り替え
//!
//! SIT_OUT（観戦のみ）と SIT_IN（投票に復帰）を扱う。状態としては冪等で、
//! 同じ値を繰り返し設定しても変化しない。投票値には触れない。

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{
    MessagePusher, ParticipantId, ParticipantView, RoomKey, RoomRegistry, Timestamp,
};

use super::error::DispatchError;

/// オブザーバー切り替えのユースケース
pub struct ToggleObserverUseCase {
    /// Registry（状態管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ToggleObserverUseCase {
    /// 新しい ToggleObserverUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// オブザーバーフラグを設定する（SIT_OUT: true / SIT_IN: false）
    ///
    /// # Returns
    ///
    /// * `Ok((view, targets))` - 更新後の公開ビューと、ブロードキャスト対象
    ///   （本人を含むルーム全員）の ID リスト
    pub async fn execute(
        &self,
        room_key: &RoomKey,
        id: ParticipantId,
        observer: bool,
    ) -> Result<(ParticipantView, Vec<ParticipantId>), DispatchError> {
        let now = Timestamp::new(get_jst_timestamp());
        let view = self.registry.set_observer(room_key, id, observer, now).await?;
        let targets = self.registry.participant_ids(room_key).await?;
        Ok((view, targets))
    }

    /// オブザーバー状態の変化をルーム全員にブロードキャスト
    pub async fn broadcast_observer_changed(
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
