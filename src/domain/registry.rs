//! Registry trait 定義
//!
//! ドメイン層が必要とするルーム管理のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use super::entity::{ParticipantView, Room};
use super::value_object::{ParticipantId, RoomKey, Timestamp};

/// Registry 操作のエラー
///
/// どちらも「接続時に確立した束縛が切断前に失われた」ことを意味する
/// 参照整合性エラー。メッセージ処理中に発生した場合はライフサイクル管理の
/// バグを示すため、ログに残してメッセージを破棄する。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// 指定されたキーのルームが存在しない
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    /// 指定された参加者がルームに存在しない
    #[error("participant {id} not found in room '{room}'")]
    ParticipantNotFound { room: String, id: i32 },
}

/// 参加直後に新規参加者へ返すスナップショット
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSnapshot {
    /// 追加された参加者の公開ビュー
    pub participant: ParticipantView,
    /// 新規参加者以外の名簿（参加前からいた参加者の公開ビュー）
    pub others: Vec<ParticipantView>,
    /// ルームの現在のデッキ
    pub deck: Vec<String>,
}

/// Room Registry trait
///
/// ルームの作成・検索・回収と、単一ルームに対する原子的な状態変更を提供する。
/// 各メソッドはルーム単位で直列化される（同一ルームへの並行変更が名簿を
/// 不整合にしない）ことを実装に要求する。異なるルーム間の操作は直列化不要。
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// 新しい空のルームを作成し、キーを返す
    ///
    /// キーは既存ルームと衝突しなくなるまで再生成される。
    async fn create_room(&self, now: Timestamp) -> RoomKey;

    /// 指定されたキーのルームが存在するかどうか
    ///
    /// WebSocket アップグレード前の事前チェックに使う。存在確認から参加までの
    /// 間にルームが消える可能性はあるため、参加操作自体も失敗しうる。
    async fn room_exists(&self, key: &RoomKey) -> bool;

    /// 全ルームのスナップショットを取得（順序は保証しない）
    async fn list_rooms(&self) -> Vec<Room>;

    /// 参加者を追加し、名簿スナップショットを返す
    async fn add_participant(
        &self,
        key: &RoomKey,
        name: String,
        now: Timestamp,
    ) -> Result<JoinSnapshot, RegistryError>;

    /// 参加者を削除し、削除された参加者の公開ビューを返す
    async fn remove_participant(
        &self,
        key: &RoomKey,
        id: ParticipantId,
        now: Timestamp,
    ) -> Result<ParticipantView, RegistryError>;

    /// 参加者の投票値を設定（None でクリア）し、更新後の公開ビューを返す
    async fn set_vote(
        &self,
        key: &RoomKey,
        id: ParticipantId,
        vote: Option<String>,
        now: Timestamp,
    ) -> Result<ParticipantView, RegistryError>;

    /// 参加者のオブザーバーフラグを設定し、更新後の公開ビューを返す
    ///
    /// 同じ値の再設定は状態として no-op（冪等）。
    async fn set_observer(
        &self,
        key: &RoomKey,
        id: ParticipantId,
        observer: bool,
        now: Timestamp,
    ) -> Result<ParticipantView, RegistryError>;

    /// 全参加者の投票マップを取得（未投票は None で含まれる）
    async fn collect_votes(
        &self,
        key: &RoomKey,
    ) -> Result<HashMap<ParticipantId, Option<String>>, RegistryError>;

    /// ルーム内の全投票をクリア
    async fn clear_votes(&self, key: &RoomKey, now: Timestamp) -> Result<(), RegistryError>;

    /// ルームのデッキを丸ごと置き換える
    async fn replace_deck(
        &self,
        key: &RoomKey,
        deck: Vec<String>,
        now: Timestamp,
    ) -> Result<(), RegistryError>;

    /// ルーム内の全参加者 ID を取得（ブロードキャスト対象の列挙に使う）
    async fn participant_ids(&self, key: &RoomKey) -> Result<Vec<ParticipantId>, RegistryError>;

    /// 空かつ閾値より長く更新のないルームを全て削除し、削除数を返す
    ///
    /// 進行中の参加処理と競合しないこと（ルーム削除と参加者追加はルーム単位で
    /// 相互排他）を実装に要求する。
    async fn reap_stale_rooms(&self, now: Timestamp, idle_threshold_millis: i64) -> usize;
}
