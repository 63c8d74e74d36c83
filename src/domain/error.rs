//! ドメイン層のエラー型定義

use thiserror::Error;

/// 値オブジェクト生成時のバリデーションエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// ルームキーの形式不正（英大文字＋数字の 5 文字のみ許可）
    #[error("invalid room key: '{0}' (expected 5 uppercase alphanumeric characters)")]
    InvalidRoomKey(String),

    /// 参加者 ID に 0 は使用できない（未割り当ての番兵値として予約）
    #[error("participant id 0 is reserved")]
    ZeroParticipantId,
}
