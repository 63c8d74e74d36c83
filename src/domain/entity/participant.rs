//! 参加者エンティティ
//!
//! 参加者は接続中の 1 本の WebSocket 接続に対応し、ちょうど 1 つのルームに
//! 所属します。接続ハンドル自体はドメインには持たせず、MessagePusher 側で
//! `(RoomKey, ParticipantId)` をキーに管理します。

use super::super::value_object::ParticipantId;

/// ルーム内の参加者
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    /// ルーム内で一意な ID（0 以外）
    pub id: ParticipantId,
    /// 表示名（参加者が自己申告する。検証・重複排除はしない）
    pub name: String,
    /// 現在の投票値（None = 未投票）
    pub current_vote: Option<String>,
    /// オブザーバーフラグ（true = 投票には参加しないが通知は受け取る）
    pub observer: bool,
}

impl Participant {
    /// 新しい参加者を作成（投票なし・アクティブ状態）
    pub fn new(id: ParticipantId, name: String) -> Self {
        Self {
            id,
            name,
            current_vote: None,
            observer: false,
        }
    }

    /// 公開ビューへ変換
    ///
    /// 投票値そのものは含めない（`voted` は投票の有無のみ）。
    pub fn public_view(&self) -> ParticipantView {
        ParticipantView {
            name: self.name.clone(),
            id: self.id,
            voted: self.current_vote.is_some(),
            observer: self.observer,
        }
    }
}

/// 参加者の公開ビュー
///
/// ブロードキャストで他の参加者へ公開してよい情報のみを持つ。
/// 投票値は REVEAL_VOTES 以外で漏れてはならない。
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantView {
    pub name: String,
    pub id: ParticipantId,
    pub voted: bool,
    pub observer: bool,
}
