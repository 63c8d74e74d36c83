//! Server state shared across handlers.

use std::sync::Arc;

use crate::usecase::{
    CastVoteUseCase, ChangeDeckUseCase, ClearVotesUseCase, ConnectParticipantUseCase,
    CreateRoomUseCase, DisconnectParticipantUseCase, GetRoomsUseCase, RevealVotesUseCase,
    ToggleObserverUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// CastVoteUseCase（投票設定・取り消しのユースケース）
    pub cast_vote_usecase: Arc<CastVoteUseCase>,
    /// RevealVotesUseCase（投票開示のユースケース）
    pub reveal_votes_usecase: Arc<RevealVotesUseCase>,
    /// ClearVotesUseCase（全投票クリアのユースケース）
    pub clear_votes_usecase: Arc<ClearVotesUseCase>,
    /// ToggleObserverUseCase（オブザーバー切り替えのユースケース）
    pub toggle_observer_usecase: Arc<ToggleObserverUseCase>,
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// ChangeDeckUseCase（デッキ変更のユースケース）
    pub change_deck_usecase: Arc<ChangeDeckUseCase>,
}
