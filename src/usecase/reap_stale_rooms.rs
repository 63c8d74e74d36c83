//! UseCase: 空きルームの回収
//!
//! 参加者ゼロのまま閾値（既定 2 時間）より長く更新のないルームを削除する。
//! サーバーバイナリが一定間隔で実行する。Clock を注入するのはテストで
//! 時刻を固定できるようにするため。

use std::sync::Arc;

use crate::common::time::Clock;
use crate::domain::{RoomRegistry, Timestamp};

/// 既定の放置閾値（2 時間、ミリ秒）
pub const DEFAULT_IDLE_THRESHOLD_MILLIS: i64 = 2 * 60 * 60 * 1000;

/// 空きルーム回収のユースケース
pub struct ReapStaleRoomsUseCase {
    /// Registry（状態管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
    /// 放置閾値（ミリ秒）
    idle_threshold_millis: i64,
}

impl ReapStaleRoomsUseCase {
    /// 新しい ReapStaleRoomsUseCase を作成
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        clock: Arc<dyn Clock>,
        idle_threshold_millis: i64,
    ) -> Self {
        Self {
            registry,
            clock,
            idle_threshold_millis,
        }
    }

    /// 回収を 1 回実行し、削除したルーム数を返す
    pub async fn execute(&self) -> usize {
        let now = Timestamp::new(self.clock.now_jst_millis());
        self.registry
            .reap_stale_rooms(now, self.idle_threshold_millis)
            .await
    }
}
