//! Conversion logic between DTOs and domain entities.

use std::collections::HashMap;

use crate::common::time::timestamp_to_jst_rfc3339;
use crate::domain::{ParticipantId, ParticipantView, Room};

use super::http::RoomSummaryDto;
use super::websocket::ParticipantDto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ParticipantView> for ParticipantDto {
    fn from(view: ParticipantView) -> Self {
        Self {
            name: view.name,
            id: view.id.value(),
            voted: view.voted,
            observer: view.observer,
        }
    }
}

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            room_key: room.key.as_str().to_string(),
            participants: room
                .participants
                .iter()
                .map(|p| p.public_view().into())
                .collect(),
            deck: room.deck.clone(),
            last_updated: timestamp_to_jst_rfc3339(room.last_updated.value()),
        }
    }
}

/// 投票マップをワイヤ形式（i32 キー）へ変換
pub fn votes_to_dto(votes: HashMap<ParticipantId, Option<String>>) -> HashMap<i32, Option<String>> {
    votes.into_iter().map(|(id, v)| (id.value(), v)).collect()
}
