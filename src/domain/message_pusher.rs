//! メッセージ送信（通知）の抽象インターフェース
//!
//! ドメイン層が必要とする「接続中の参加者への通知」のインターフェースを
//! 定義します。具体的な実装（WebSocket）は Infrastructure 層が提供します。
//!
//! 接続は `(RoomKey, ParticipantId)` で識別します。ドメインは接続ハンドルの
//! 中身を一切覗かず、送信先としてのみ扱います。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::value_object::{ParticipantId, RoomKey};

/// クライアントへの送信チャンネル
///
/// 送信はノンブロッキングな enqueue。受信側タスクが WebSocket へ流す。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// メッセージ送信エラー
#[derive(Debug, Error)]
pub enum MessagePushError {
    /// 宛先の接続が登録されていない
    #[error("connection for participant {id} in room '{room}' not found")]
    ConnectionNotFound { room: String, id: i32 },

    /// チャンネルへの書き込みに失敗（受信側タスクが終了済みなど）
    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// MessagePusher trait
///
/// 単一参加者への送信（push_to）と複数参加者への送信（broadcast）を提供する。
/// broadcast は一部の宛先への送信失敗を許容し、残りの宛先への送信を
/// 中断してはならない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続を登録
    async fn register(&self, room_key: RoomKey, id: ParticipantId, sender: PusherChannel);

    /// 接続を登録解除
    async fn unregister(&self, room_key: &RoomKey, id: ParticipantId);

    /// 特定の参加者へメッセージを送信
    async fn push_to(
        &self,
        room_key: &RoomKey,
        id: ParticipantId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数の参加者へメッセージを送信（部分失敗を許容）
    async fn broadcast(
        &self,
        room_key: &RoomKey,
        targets: Vec<ParticipantId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
