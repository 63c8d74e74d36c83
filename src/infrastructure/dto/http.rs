//! HTTP API の DTO 定義

use serde::{Deserialize, Serialize};

use super::websocket::ParticipantDto;

/// ルーム作成のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomCreatedDto {
    /// 割り当てられたルームキー（英大文字＋数字 5 文字）
    pub room_key: String,
}

/// ルーム一覧のレスポンス要素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub room_key: String,
    /// 参加者の公開ビュー（投票値は含まない）
    pub participants: Vec<ParticipantDto>,
    pub deck: Vec<String>,
    /// 最終更新時刻（JST、RFC 3339）
    pub last_updated: String,
}
