//! UseCase: ルーム作成
//!
//! サーバーがキーを生成して空のルームを作る。参加によるルームの自動作成は
//! 行わないため、クライアントは必ずこの操作を先に呼ぶ。

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{RoomKey, RoomRegistry, Timestamp};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// Registry（状態管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルームを作成し、割り当てたキーを返す
    ///
    /// キーの衝突は Registry 側で再生成により回避されるため、この操作に
    /// エラーはない。
    pub async fn execute(&self) -> RoomKey {
        let now = Timestamp::new(get_jst_timestamp());
        self.registry.create_room(now).await
    }
}
