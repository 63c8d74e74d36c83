//! UseCase: ルーム一覧取得
//!
//! デバッグ・観測用のスナップショット取得。順序は保証しない。

use std::sync::Arc;

use crate::domain::{Room, RoomRegistry};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    /// Registry（状態管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl GetRoomsUseCase {
    /// 新しい GetRoomsUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 全ルームのスナップショットを取得
    pub async fn execute(&self) -> Vec<Room> {
        self.registry.list_rooms().await
    }
}
