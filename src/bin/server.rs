//! Planning poker WebSocket server.
//!
//! Participants join a room over WebSocket, cast hidden votes and reveal
//! them together. Rooms are created over HTTP and evicted by a periodic
//! reaper once they have been empty and idle for long enough.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use planning_poker_rs::{
    common::{logger::setup_logger, time::SystemClock},
    infrastructure::{message_pusher::WebSocketMessagePusher, registry::InMemoryRoomRegistry},
    ui::Server,
    usecase::{
        CastVoteUseCase, ChangeDeckUseCase, ClearVotesUseCase, ConnectParticipantUseCase,
        CreateRoomUseCase, DisconnectParticipantUseCase, GetRoomsUseCase, ReapStaleRoomsUseCase,
        RevealVotesUseCase, ToggleObserverUseCase,
    },
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Planning poker server with WebSocket broadcast support", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Interval between stale-room sweeps, in seconds
    #[arg(long, default_value_t = 3600)]
    reap_interval_secs: u64,

    /// Idle time after which an empty room is removed, in seconds
    #[arg(long, default_value_t = 7200)]
    idle_threshold_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registry
    // 2. MessagePusher
    // 3. UseCases
    // 4. Reaper task
    // 5. Server

    // 1. Create Registry (in-memory database)
    let registry = Arc::new(InMemoryRoomRegistry::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let cast_vote_usecase = Arc::new(CastVoteUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let reveal_votes_usecase = Arc::new(RevealVotesUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let clear_votes_usecase = Arc::new(ClearVotesUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let toggle_observer_usecase = Arc::new(ToggleObserverUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let create_room_usecase = Arc::new(CreateRoomUseCase::new(registry.clone()));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(registry.clone()));
    let change_deck_usecase = Arc::new(ChangeDeckUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let reap_stale_rooms_usecase = Arc::new(ReapStaleRoomsUseCase::new(
        registry.clone(),
        Arc::new(SystemClock),
        (args.idle_threshold_secs as i64) * 1000,
    ));

    // 4. Spawn the stale-room reaper
    let reap_interval = Duration::from_secs(args.reap_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(reap_interval);
        // 最初の tick は即時発火するため読み捨てる
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = reap_stale_rooms_usecase.execute().await;
            if removed > 0 {
                tracing::info!("Reaped {} stale room(s)", removed);
            }
        }
    });

    // 5. Create and run the server
    let server = Server::new(
        connect_participant_usecase,
        disconnect_participant_usecase,
        cast_vote_usecase,
        reveal_votes_usecase,
        clear_votes_usecase,
        toggle_observer_usecase,
        create_room_usecase,
        get_rooms_usecase,
        change_deck_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
