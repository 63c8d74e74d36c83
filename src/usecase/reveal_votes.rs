//! UseCase: 投票開示
//!
//! ルーム全員分の投票マップ（未投票は None）を収集してブロードキャストする。
//! 状態は変更しない。生の投票値がドメインの外へ出るのはこの操作だけ。

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{MessagePusher, ParticipantId, RoomKey, RoomRegistry};

use super::error::DispatchError;

/// 投票開示のユースケース
pub struct RevealVotesUseCase {
    /// Registry（状態管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RevealVotesUseCase {
    /// 新しい RevealVotesUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 投票マップとブロードキャスト対象（ルーム全員）を収集する
    pub async fn execute(
        &self,
        room_key: &RoomKey,
    ) -> Result<(HashMap<ParticipantId, Option<String>>, Vec<ParticipantId>), DispatchError> {
        let votes = self.registry.collect_votes(room_key).await?;
        let targets = self.registry.participant_ids(room_key).await?;
        Ok((votes, targets))
    }

    /// 投票マップをルーム全員にブロードキャスト
    pub async fn broadcast_votes(
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
