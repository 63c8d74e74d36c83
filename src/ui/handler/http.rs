//! HTTP handlers for room management.
//!
//! ルーム管理（作成・一覧・デッキ変更）は WebSocket ではなく
//! リクエスト／レスポンスで行う。デッキ変更は接続中の参加者への
//! UPDATE_DECK ブロードキャストと投票クリアを伴う。

use std::sync::Arc;

use axum::{Json, extract::Path, extract::State, http::StatusCode};

use crate::domain::RoomKey;
use crate::infrastructure::dto::{
    http::{RoomCreatedDto, RoomSummaryDto},
    websocket::ServerResponse,
};

use super::super::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a new room and return its key
pub async fn create_room(State(state): State<Arc<AppState>>) -> Json<RoomCreatedDto> {
    let key = state.create_room_usecase.execute().await;
    tracing::info!("Room '{}' created", key.as_str());
    Json(RoomCreatedDto {
        room_key: key.into_string(),
    })
}

/// Get the list of rooms (introspection / debugging)
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;
    Json(rooms.iter().map(RoomSummaryDto::from).collect())
}

/// Replace a room's deck
///
/// デッキ変更は進行中の投票を無効にするため、UPDATE_DECK の後に
/// 投票クリアと CLEAR_VOTES 通知が続く。
pub async fn change_deck(
    State(state): State<Arc<AppState>>,
    Path(room_key): Path<String>,
    Json(new_deck): Json<Vec<String>>,
) -> Result<StatusCode, StatusCode> {
    let room_key = RoomKey::new(room_key).map_err(|_| StatusCode::NOT_FOUND)?;

    // 1. デッキを置き換えて全員に UPDATE_DECK を通知
    let targets = state
        .change_deck_usecase
        .execute(&room_key, new_deck.clone())
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    let deck_json = ServerResponse::update_deck(new_deck).to_json();
    if let Err(e) = state
        .change_deck_usecase
        .broadcast_deck(&room_key, targets, &deck_json)
        .await
    {
        tracing::warn!(
            "Failed to broadcast UPDATE_DECK in room '{}': {}",
            room_key.as_str(),
            e
        );
    }

    // 2. 進行中の投票をクリアして全員に通知
    let targets = state
        .clear_votes_usecase
        .execute(&room_key)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    let clear_json = ServerResponse::clear_votes().to_json();
    if let Err(e) = state
        .clear_votes_usecase
        .broadcast_cleared(&room_key, targets, &clear_json)
        .await
    {
        tracing::warn!(
            "Failed to broadcast CLEAR_VOTES in room '{}': {}",
            room_key.as_str(),
            e
        );
    }

    tracing::info!("Deck replaced for room '{}'", room_key.as_str());

    Ok(StatusCode::NO_CONTENT)
}
