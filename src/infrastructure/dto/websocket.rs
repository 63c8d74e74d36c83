//! WebSocket プロトコルの DTO 定義
//!
//! ## ワイヤ形式
//!
//! - クライアント → サーバー: `{"action": <Action>, "payload": <string>}`
//! - サーバー → クライアント:
//!   `{"action": <Action>, "participant": <ParticipantDto|null>, "payload": <any>}`
//!
//! payload はアクションごとに形が異なる（文字列・デッキ・名簿・投票マップ）。
//! 投票マップは参加者 ID をキーに持ち、未投票は null で表現する。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// ERROR 応答に載せる固定メッセージ
///
/// 「サーバー発専用のアクションを送ってきた」場合と「未知のアクション」の
/// 両方で同じ文面を使う。
pub const INVALID_ACTION_MESSAGE: &str = "You sent an invalid action. Here is a list of valid \
actions: CAST_VOTE, REMOVE_VOTE, REVEAL_VOTES, CLEAR_VOTES, SIT_OUT, SIT_IN";

/// プロトコル上のアクション（閉じた集合）
///
/// クライアントが送ってよいのは CAST_VOTE, REMOVE_VOTE, REVEAL_VOTES,
/// CLEAR_VOTES, SIT_OUT, SIT_IN のみ。それ以外（サーバー発専用のアクションと
/// 未知のタグ）はディスパッチャで ERROR 応答に落ちる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    CastVote,
    Voted,
    RemoveVote,
    RevealVotes,
    ClearVotes,
    /// オブザーバーとしてのみ参加する
    SitOut,
    /// 投票に復帰する
    SitIn,
    /// デッキ構成が変更された
    UpdateDeck,
    Joined,
    Leave,
    ParticipantsList,
    Error,
    /// 未知のアクションタグの受け皿
    #[serde(other)]
    Unrecognized,
}

/// クライアントから受信するメッセージ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMessage {
    pub action: Action,
    /// アクション固有の文字列（CAST_VOTE では投票値、他では無視される）
    #[serde(default)]
    pub payload: String,
}

/// 参加者の公開ビュー（ワイヤ形式）
///
/// 投票値そのものは含まない。接続ハンドルも含まない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub name: String,
    pub id: i32,
    pub voted: bool,
    pub observer: bool,
}

/// サーバー応答の payload（アクションごとに形が異なる）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    /// 空文字列または ERROR メッセージ
    Text(String),
    /// UPDATE_DECK: デッキの値リスト
    Deck(Vec<String>),
    /// PARTICIPANTS_LIST: 名簿スナップショット
    Roster(Vec<ParticipantDto>),
    /// REVEAL_VOTES: 参加者 ID → 投票値（未投票は null）
    Votes(HashMap<i32, Option<String>>),
}

/// サーバーからクライアントへ送信するメッセージ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerResponse {
    pub action: Action,
    pub participant: Option<ParticipantDto>,
    pub payload: ResponsePayload,
}

impl ServerResponse {
    /// 新規参加者に送る名簿スナップショット（本人以外の参加者のビュー）
    pub fn participants_list(roster: Vec<ParticipantDto>) -> Self {
        Self {
            action: Action::ParticipantsList,
            participant: None,
            payload: ResponsePayload::Roster(roster),
        }
    }

    /// 現在のデッキ構成
    pub fn update_deck(deck: Vec<String>) -> Self {
        Self {
            action: Action::UpdateDeck,
            participant: None,
            payload: ResponsePayload::Deck(deck),
        }
    }

    /// 参加通知（既存参加者向け）
    pub fn joined(participant: ParticipantDto) -> Self {
        Self {
            action: Action::Joined,
            participant: Some(participant),
            payload: ResponsePayload::Text(String::new()),
        }
    }

    /// 退出通知（残った参加者向け）
    pub fn leave(participant: ParticipantDto) -> Self {
        Self {
            action: Action::Leave,
            participant: Some(participant),
            payload: ResponsePayload::Text(String::new()),
        }
    }

    /// 投票通知（値は含まず、voted フラグのみ公開ビューに反映される）
    pub fn voted(participant: ParticipantDto) -> Self {
        Self {
            action: Action::Voted,
            participant: Some(participant),
            payload: ResponsePayload::Text(String::new()),
        }
    }

    /// 投票取り消し通知
    pub fn remove_vote(participant: ParticipantDto) -> Self {
        Self {
            action: Action::RemoveVote,
            participant: Some(participant),
            payload: ResponsePayload::Text(String::new()),
        }
    }

    /// 投票開示（参加者 ID → 投票値。未投票も null で含まれる）
    pub fn reveal_votes(votes: HashMap<i32, Option<String>>) -> Self {
        Self {
            action: Action::RevealVotes,
            participant: None,
            payload: ResponsePayload::Votes(votes),
        }
    }

    /// 全投票クリア通知
    pub fn clear_votes() -> Self {
        Self {
            action: Action::ClearVotes,
            participant: None,
            payload: ResponsePayload::Text(String::new()),
        }
    }

    /// オブザーバー状態の変更通知（SIT_OUT / SIT_IN をそのまま返す）
    pub fn observer_changed(action: Action, participant: ParticipantDto) -> Self {
        Self {
            action,
            participant: Some(participant),
            payload: ResponsePayload::Text(String::new()),
        }
    }

    /// 不正・未知アクションへのエラー応答（送信者のみに返す）
    pub fn invalid_action(participant: Option<ParticipantDto>) -> Self {
        Self {
            action: Action::Error,
            participant,
            payload: ResponsePayload::Text(INVALID_ACTION_MESSAGE.to_string()),
        }
    }

    /// JSON 文字列へ変換
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("ServerResponse is always serializable")
    }
}
