//! UseCase 層
//!
//! 1 操作 = 1 UseCase。各 UseCase は Registry（状態変更）と MessagePusher
//! （通知）の抽象に依存し、WebSocket ハンドラのアクション分岐と合わせて
//! イベントディスパッチャ／ブロードキャストエンジンを構成します。

pub mod cast_vote;
pub mod change_deck;
pub mod clear_votes;
pub mod connect_participant;
pub mod create_room;
pub mod disconnect_participant;
pub mod error;
pub mod get_rooms;
pub mod reap_stale_rooms;
pub mod reveal_votes;
pub mod toggle_observer;

pub use cast_vote::CastVoteUseCase;
pub use change_deck::ChangeDeckUseCase;
pub use clear_votes::ClearVotesUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, DispatchError};
pub use get_rooms::GetRoomsUseCase;
pub use reap_stale_rooms::ReapStaleRoomsUseCase;
pub use reveal_votes::RevealVotesUseCase;
pub use toggle_observer::ToggleObserverUseCase;
