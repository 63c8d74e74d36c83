//! UseCase 層のエラー型定義

use thiserror::Error;

use crate::domain::RegistryError;

/// 参加者接続のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectError {
    /// 参加先のルームが存在しない（参加によるルーム自動作成はしない）
    #[error("room '{0}' not found")]
    RoomNotFound(String),
}

/// メッセージディスパッチ中のエラー
///
/// 接続時に確立した (ルーム, 参加者) の束縛が切断前に失われた場合に発生する。
/// ライフサイクル管理のバグを示すため、ハンドラはログに残してメッセージを
/// 破棄する（サービス全体は落とさない）。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
