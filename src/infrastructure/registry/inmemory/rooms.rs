//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## ロック構成
//!
//! - マップ全体: `Mutex<HashMap<RoomKey, Arc<Mutex<Room>>>>`
//! - ルーム単位: `Arc<Mutex<Room>>`
//!
//! ルームへの変更はルームロックで直列化され、別ルーム同士は並行に進む。
//! 変更系メソッドはマップロックを保持したままルームロックを取得してから
//! マップロックを手放す。Reaper はマップロックを掃引の間保持するため、
//! 「ルーム削除」と「参加者追加」はルーム単位で相互排他になる。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    JoinSnapshot, ParticipantId, ParticipantView, RegistryError, Room, RoomKey, RoomKeyFactory,
    RoomRegistry, Timestamp,
};

/// インメモリ Room Registry 実装
pub struct InMemoryRoomRegistry {
    /// ルームキーからルームへのマップ
    rooms: Mutex<HashMap<RoomKey, Arc<Mutex<Room>>>>,
}

impl InMemoryRoomRegistry {
    /// 空の InMemoryRoomRegistry を作成
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// ルームロックを取得してからクロージャを適用する
    ///
    /// ルームロックの取得が完了するまでマップロックを保持する。
    async fn with_room<R>(
        &self,
        key: &RoomKey,
        f: impl FnOnce(&mut Room) -> R,
    ) -> Result<R, RegistryError> {
        let rooms = self.rooms.lock().await;
        let slot = rooms
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::RoomNotFound(key.as_str().to_string()))?;
        let mut room = slot.lock().await;
        drop(rooms);
        Ok(f(&mut room))
    }

    fn participant_not_found(key: &RoomKey, id: ParticipantId) -> RegistryError {
        RegistryError::ParticipantNotFound {
            room: key.as_str().to_string(),
            id: id.value(),
        }
    }
}

impl Default for InMemoryRoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn create_room(&self, now: Timestamp) -> RoomKey {
        let mut rooms = self.rooms.lock().await;

        // 既存キーと衝突しなくなるまで再生成（36^5 の鍵空間なので実用上ほぼ一発）
        let mut key = RoomKeyFactory::generate();
        while rooms.contains_key(&key) {
            key = RoomKeyFactory::generate();
        }

        rooms.insert(
            key.clone(),
            Arc::new(Mutex::new(Room::new(key.clone(), now))),
        );
        tracing::debug!("Room '{}' created", key.as_str());

        key
    }

    async fn room_exists(&self, key: &RoomKey) -> bool {
        let rooms = self.rooms.lock().await;
        rooms.contains_key(key)
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        let mut snapshot = Vec::with_capacity(rooms.len());
        for slot in rooms.values() {
            snapshot.push(slot.lock().await.clone());
        }
        snapshot
    }

    async fn add_participant(
        &self,
        key: &RoomKey,
        name: String,
        now: Timestamp,
    ) -> Result<JoinSnapshot, RegistryError> {
        self.with_room(key, |room| {
            // 既存参加者のビューは追加前に採取する
            let others: Vec<ParticipantView> =
                room.participants.iter().map(|p| p.public_view()).collect();
            let deck = room.deck.clone();
            let participant = room.add_participant(name).public_view();
            room.touch(now);
            JoinSnapshot {
                participant,
                others,
                deck,
            }
        })
        .await
    }

    async fn remove_participant(
        &self,
        key: &RoomKey,
        id: ParticipantId,
        now: Timestamp,
    ) -> Result<ParticipantView, RegistryError> {
        self.with_room(key, |room| {
            let removed = room
                .remove_participant(id)
                .ok_or_else(|| Self::participant_not_found(key, id))?;
            room.touch(now);
            Ok(removed.public_view())
        })
        .await?
    }

    async fn set_vote(
        &self,
        key: &RoomKey,
        id: ParticipantId,
        vote: Option<String>,
        now: Timestamp,
    ) -> Result<ParticipantView, RegistryError> {
        self.with_room(key, |room| {
            let participant = room
                .participant_mut(id)
                .ok_or_else(|| Self::participant_not_found(key, id))?;
            participant.current_vote = vote;
            let view = participant.public_view();
            room.touch(now);
            Ok(view)
        })
        .await?
    }

    async fn set_observer(
        &self,
        key: &RoomKey,
        id: ParticipantId,
        observer: bool,
        now: Timestamp,
    ) -> Result<ParticipantView, RegistryError> {
        self.with_room(key, |room| {
            let participant = room
                .participant_mut(id)
                .ok_or_else(|| Self::participant_not_found(key, id))?;
            participant.observer = observer;
            let view = participant.public_view();
            room.touch(now);
            Ok(view)
        })
        .await?
    }

    async fn collect_votes(
        &self,
        key: &RoomKey,
    ) -> Result<HashMap<ParticipantId, Option<String>>, RegistryError> {
        self.with_room(key, |room| room.collect_votes()).await
    }

    async fn clear_votes(&self, key: &RoomKey, now: Timestamp) -> Result<(), RegistryError> {
        self.with_room(key, |room| {
            room.clear_votes();
            room.touch(now);
        })
        .await
    }

    async fn replace_deck(
        &self,
        key: &RoomKey,
        deck: Vec<String>,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.with_room(key, |room| {
            room.replace_deck(deck);
            room.touch(now);
        })
        .await
    }

    async fn participant_ids(&self, key: &RoomKey) -> Result<Vec<ParticipantId>, RegistryError> {
        self.with_room(key, |room| room.participants.iter().map(|p| p.id).collect())
            .await
    }

    async fn reap_stale_rooms(&self, now: Timestamp, idle_threshold_millis: i64) -> usize {
        // 掃引中はマップロックを保持し、参加処理との競合を防ぐ
        let mut rooms = self.rooms.lock().await;

        let mut stale_keys = Vec::new();
        for (key, slot) in rooms.iter() {
            let room = slot.lock().await;
            if room.is_stale(now, idle_threshold_millis) {
                stale_keys.push(key.clone());
            }
        }

        for key in &stale_keys {
            rooms.remove(key);
            tracing::debug!("Room '{}' reaped (empty and idle)", key.as_str());
        }

        stale_keys.len()
    }
}
