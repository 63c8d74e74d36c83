//! ルームエンティティ
//!
//! ルームは参加者名簿（roster）・デッキ（選択可能な投票値の列）・
//! 最終更新時刻を所有します。名簿の変更はイベントディスパッチャ経由
//! （Registry のメソッド）でのみ行われます。

use std::collections::HashMap;

use super::super::value_object::{ParticipantId, ParticipantIdFactory, RoomKey, Timestamp};
use super::participant::Participant;

/// プランニングポーカーのルーム
#[derive(Debug, Clone)]
pub struct Room {
    /// ルームキー（作成時にサーバーが割り当て、以後不変）
    pub key: RoomKey,
    /// デッキ（投票値の列。値は不透明な文字列で、検証しない）
    pub deck: Vec<String>,
    /// 参加者名簿
    pub participants: Vec<Participant>,
    /// 最終更新時刻（ルームに対する操作のたびに更新される）
    pub last_updated: Timestamp,
}

impl Room {
    /// デフォルトデッキで空のルームを作成
    pub fn new(key: RoomKey, created_at: Timestamp) -> Self {
        Self {
            key,
            deck: Self::default_deck(),
            participants: Vec::new(),
            last_updated: created_at,
        }
    }

    /// デフォルトデッキ（フィボナッチ + "?" + 休憩カード）
    pub fn default_deck() -> Vec<String> {
        ["1", "2", "3", "5", "8", "13", "21", "?", "BRK"]
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    /// 参加者を追加し、追加した参加者への参照を返す
    ///
    /// ID はルーム内の既存 ID に対する棄却サンプリングで生成される。
    pub fn add_participant(&mut self, name: String) -> &Participant {
        let existing: Vec<ParticipantId> = self.participants.iter().map(|p| p.id).collect();
        let id = ParticipantIdFactory::generate(&existing);
        self.participants.push(Participant::new(id, name));
        self.participants.last().unwrap()
    }

    /// 参加者を削除し、削除した参加者を返す
    pub fn remove_participant(&mut self, id: ParticipantId) -> Option<Participant> {
        let index = self.participants.iter().position(|p| p.id == id)?;
        Some(self.participants.remove(index))
    }

    /// ID で参加者を検索
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// ID で参加者を検索（可変参照）
    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    /// 全参加者の投票をクリア
    pub fn clear_votes(&mut self) {
        for participant in &mut self.participants {
            participant.current_vote = None;
        }
    }

    /// 全参加者の投票を収集（未投票は None のまま含める）
    pub fn collect_votes(&self) -> HashMap<ParticipantId, Option<String>> {
        self.participants
            .iter()
            .map(|p| (p.id, p.current_vote.clone()))
            .collect()
    }

    /// デッキを丸ごと置き換える
    ///
    /// 進行中の投票の無効化（クリアと通知）は UseCase 側が行う。
    pub fn replace_deck(&mut self, new_deck: Vec<String>) {
        self.deck = new_deck;
    }

    /// 最終更新時刻を更新
    pub fn touch(&mut self, now: Timestamp) {
        self.last_updated = now;
    }

    /// 回収対象かどうか（参加者ゼロ、かつ閾値より長く更新がない）
    pub fn is_stale(&self, now: Timestamp, idle_threshold_millis: i64) -> bool {
        self.participants.is_empty()
            && self.last_updated.value() < now.value() - idle_threshold_millis
    }
}
