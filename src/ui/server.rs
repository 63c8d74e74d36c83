//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    CastVoteUseCase, ChangeDeckUseCase, ClearVotesUseCase, ConnectParticipantUseCase,
    CreateRoomUseCase, DisconnectParticipantUseCase, GetRoomsUseCase, RevealVotesUseCase,
    ToggleObserverUseCase,
};

use super::{
    handler::{change_deck, create_room, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Planning poker server
///
/// This struct encapsulates the server configuration and provides methods to
/// build the router and run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_participant_usecase,
///     disconnect_participant_usecase,
///     /* ... */
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// CastVoteUseCase（投票設定・取り消しのユースケース）
    cast_vote_usecase: Arc<CastVoteUseCase>,
    /// RevealVotesUseCase（投票開示のユースケース）
    reveal_votes_usecase: Arc<RevealVotesUseCase>,
    /// ClearVotesUseCase（全投票クリアのユースケース）
    clear_votes_usecase: Arc<ClearVotesUseCase>,
    /// ToggleObserverUseCase（オブザーバー切り替えのユースケース）
    toggle_observer_usecase: Arc<ToggleObserverUseCase>,
    /// CreateRoomUseCase（ルーム作成のユースケース）
    create_room_usecase: Arc<CreateRoomUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// ChangeDeckUseCase（デッキ変更のユースケース）
    change_deck_usecase: Arc<ChangeDeckUseCase>,
}

impl Server {
    /// Create a new Server instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connect_participant_usecase: Arc<ConnectParticipantUseCase>,
        disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
        cast_vote_usecase: Arc<CastVoteUseCase>,
        reveal_votes_usecase: Arc<RevealVotesUseCase>,
        clear_votes_usecase: Arc<ClearVotesUseCase>,
        toggle_observer_usecase: Arc<ToggleObserverUseCase>,
        create_room_usecase: Arc<CreateRoomUseCase>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        change_deck_usecase: Arc<ChangeDeckUseCase>,
    ) -> Self {
        Self {
            connect_participant_usecase,
            disconnect_participant_usecase,
            cast_vote_usecase,
            reveal_votes_usecase,
            clear_votes_usecase,
            toggle_observer_usecase,
            create_room_usecase,
            get_rooms_usecase,
            change_deck_usecase,
        }
    }

    /// Build the Axum router
    ///
    /// Exposed separately from [`run`](Self::run) so integration tests can
    /// serve the router on an ephemeral port.
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            connect_participant_usecase: self.connect_participant_usecase.clone(),
            disconnect_participant_usecase: self.disconnect_participant_usecase.clone(),
            cast_vote_usecase: self.cast_vote_usecase.clone(),
            reveal_votes_usecase: self.reveal_votes_usecase.clone(),
            clear_votes_usecase: self.clear_votes_usecase.clone(),
            toggle_observer_usecase: self.toggle_observer_usecase.clone(),
            create_room_usecase: self.create_room_usecase.clone(),
            get_rooms_usecase: self.get_rooms_usecase.clone(),
            change_deck_usecase: self.change_deck_usecase.clone(),
        });

        // Define handlers
        Router::new()
            // WebSocket エンドポイント
            .route("/rooms/{room_key}/users/{name}", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", put(create_room).get(get_rooms))
            .route("/api/rooms/{room_key}/deck", post(change_deck))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the planning poker server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Planning poker server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/rooms/{{room_key}}/users/{{name}}", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
