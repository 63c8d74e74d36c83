//! WebSocket connection handlers.
//!
//! 接続 1 本につき 1 つの受信ループと 1 つの送信ループを動かす。
//! 受信ループがアクションをディスパッチし、送信ループは他の参加者からの
//! 通知（mpsc チャンネル経由）をソケットへ流す。
//!
//! 接続時に確立した (RoomKey, ParticipantId) の束縛は切断まで有効である
//! ことを前提とする。メッセージ処理時に束縛が失われていた場合は
//! ライフサイクル管理のバグなので、エラーログを残してメッセージを破棄する
//! （サービス全体は落とさない）。

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use crate::domain::{JoinSnapshot, ParticipantId, PusherChannel, RoomKey};
use crate::infrastructure::dto::{
    conversion::votes_to_dto,
    websocket::{Action, ClientMessage, ParticipantDto, ServerResponse},
};
use crate::usecase::DispatchError;

use super::super::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path((room_key, name)): Path<(String, String)>,
) -> Result<impl IntoResponse, StatusCode> {
    // 形式が不正なキーのルームは存在しえない
    let room_key = match RoomKey::new(room_key) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!("Rejecting connection: {}", e);
            return Err(StatusCode::NOT_FOUND);
        }
    };

    // 参加によるルームの自動作成はしない
    if !state
        .connect_participant_usecase
        .room_exists(&room_key)
        .await
    {
        tracing::warn!(
            "Room '{}' not found. Rejecting connection for '{}'.",
            room_key.as_str(),
            name
        );
        return Err(StatusCode::NOT_FOUND);
    }

    // Create a channel for this client to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    // Use ConnectParticipantUseCase to handle connection
    // (the pusher registration happens inside the UseCase)
    match state
        .connect_participant_usecase
        .execute(room_key.clone(), name.clone(), tx.clone())
        .await
    {
        Ok(snapshot) => {
            tracing::info!(
                "Participant '{}' (id {}) joined room '{}'",
                name,
                snapshot.participant.id.value(),
                room_key.as_str()
            );
            Ok(ws.on_upgrade(move |socket| {
                handle_socket(socket, state, room_key, snapshot, tx, rx)
            }))
        }
        Err(e) => {
            // 事前チェックと参加の間にルームが回収された場合もここに落ちる
            tracing::warn!("Connection rejected for '{}': {}", name, e);
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
///
/// This handles the outbound flow: notifications addressed to this client
/// (via its channel) are written to its WebSocket connection.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the message to this client
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    room_key: RoomKey,
    snapshot: JoinSnapshot,
    tx: PusherChannel,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (mut sender, receiver) = socket.split();
    let self_id = snapshot.participant.id;
    let self_dto = ParticipantDto::from(snapshot.participant);

    // Send the current roster (everyone but the joiner) and deck privately
    let roster: Vec<ParticipantDto> = snapshot.others.into_iter().map(Into::into).collect();
    let list_json = ServerResponse::participants_list(roster).to_json();
    let deck_json = ServerResponse::update_deck(snapshot.deck).to_json();

    let welcomed = sender.send(Message::Text(list_json.into())).await.is_ok()
        && sender.send(Message::Text(deck_json.into())).await.is_ok();

    if welcomed {
        // Tell the rest of the room about the new joiner
        let joined_json = ServerResponse::joined(self_dto.clone()).to_json();
        if let Err(e) = state
            .connect_participant_usecase
            .broadcast_joined(&room_key, self_id, &joined_json)
            .await
        {
            tracing::warn!(
                "Failed to broadcast JOINED in room '{}': {}",
                room_key.as_str(),
                e
            );
        }

        let mut send_task = pusher_loop(rx, sender);

        let state_clone = state.clone();
        let room_key_clone = room_key.clone();
        let mut recv_task = tokio::spawn(async move {
            receive_loop(receiver, state_clone, room_key_clone, self_id, self_dto, tx).await;
        });

        // If any one of the tasks completes, abort the other
        tokio::select! {
            _ = &mut recv_task => send_task.abort(),
            _ = &mut send_task => recv_task.abort(),
        };
    }

    // Remove the participant and tell the remaining room members
    match state
        .disconnect_participant_usecase
        .execute(&room_key, self_id)
        .await
    {
        Ok((view, targets)) => {
            let leave_json = ServerResponse::leave(view.into()).to_json();
            if let Err(e) = state
                .disconnect_participant_usecase
                .broadcast_left(&room_key, targets, &leave_json)
                .await
            {
                tracing::warn!(
                    "Failed to broadcast LEAVE in room '{}': {}",
                    room_key.as_str(),
                    e
                );
            }
            tracing::info!(
                "Participant {} left room '{}'",
                self_id.value(),
                room_key.as_str()
            );
        }
        Err(e) => {
            // 接続時の束縛が切断前に失われている（ライフサイクル管理のバグ）
            tracing::error!(
                "Failed to remove participant {} from room '{}': {}",
                self_id.value(),
                room_key.as_str(),
                e
            );
        }
    }
}

/// 受信ループ: クライアントからのメッセージを読み、アクションごとに
/// 状態変更とブロードキャストを行う
async fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    room_key: RoomKey,
    self_id: ParticipantId,
    mut self_view: ParticipantDto,
    reply: PusherChannel,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                // Parse the incoming message
                let client_msg = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => msg,
                    Err(e) => {
                        // プロトコルエラー: 送信者のみに ERROR を返して続行
                        tracing::warn!("Failed to parse message as JSON: {}", e);
                        let error_json =
                            ServerResponse::invalid_action(Some(self_view.clone())).to_json();
                        if reply.send(error_json).is_err() {
                            break;
                        }
                        continue;
                    }
                };

                match dispatch_action(&state, &room_key, self_id, &self_view, client_msg, &reply)
                    .await
                {
                    Ok(Some(updated_view)) => self_view = updated_view,
                    Ok(None) => {}
                    Err(e) => {
                        // 参照整合性エラー: ログに残してメッセージを破棄
                        tracing::error!(
                            "Dropping message from participant {} in room '{}': {}",
                            self_id.value(),
                            room_key.as_str(),
                            e
                        );
                    }
                }
            }
            Message::Ping(_) => {
                tracing::debug!("Received ping");
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!("Participant {} requested close", self_id.value());
                break;
            }
            _ => {}
        }
    }
}

/// アクションのディスパッチ本体
///
/// 状態を変更した場合は更新後の本人ビューを返す（ERROR 応答の participant
/// 欄を最新に保つため）。
async fn dispatch_action(
    state: &Arc<AppState>,
    room_key: &RoomKey,
    self_id: ParticipantId,
    self_view: &ParticipantDto,
    msg: ClientMessage,
    reply: &PusherChannel,
) -> Result<Option<ParticipantDto>, DispatchError> {
    match msg.action {
        Action::CastVote => {
            // 投票値はデッキと照合しない。オブザーバーの投票も制限しない。
            let (view, targets) = state
                .cast_vote_usecase
                .execute(room_key, self_id, Some(msg.payload))
                .await?;
            let dto = ParticipantDto::from(view);
            let json = ServerResponse::voted(dto.clone()).to_json();
            if let Err(e) = state
                .cast_vote_usecase
                .broadcast_vote(room_key, targets, &json)
                .await
            {
                tracing::warn!(
                    "Failed to broadcast VOTED in room '{}': {}",
                    room_key.as_str(),
                    e
                );
            }
            Ok(Some(dto))
        }

        Action::RemoveVote => {
            let (view, targets) = state
                .cast_vote_usecase
                .execute(room_key, self_id, None)
                .await?;
            let dto = ParticipantDto::from(view);
            let json = ServerResponse::remove_vote(dto.clone()).to_json();
            if let Err(e) = state
                .cast_vote_usecase
                .broadcast_vote(room_key, targets, &json)
                .await
            {
                tracing::warn!(
                    "Failed to broadcast REMOVE_VOTE in room '{}': {}",
                    room_key.as_str(),
                    e
                );
            }
            Ok(Some(dto))
        }

        Action::RevealVotes => {
            // 状態は変更しない。生の投票値が出るのはこの応答だけ。
            let (votes, targets) = state.reveal_votes_usecase.execute(room_key).await?;
            let json = ServerResponse::reveal_votes(votes_to_dto(votes)).to_json();
            if let Err(e) = state
                .reveal_votes_usecase
                .broadcast_votes(room_key, targets, &json)
                .await
            {
                tracing::warn!(
                    "Failed to broadcast REVEAL_VOTES in room '{}': {}",
                    room_key.as_str(),
                    e
                );
            }
            Ok(None)
        }

        Action::ClearVotes => {
            let targets = state.clear_votes_usecase.execute(room_key).await?;
            let json = ServerResponse::clear_votes().to_json();
            if let Err(e) = state
                .clear_votes_usecase
                .broadcast_cleared(room_key, targets, &json)
                .await
            {
                tracing::warn!(
                    "Failed to broadcast CLEAR_VOTES in room '{}': {}",
                    room_key.as_str(),
                    e
                );
            }
            // 自分のビューも未投票へ変わる
            let mut cleared = self_view.clone();
            cleared.voted = false;
            Ok(Some(cleared))
        }

        Action::SitOut | Action::SitIn => {
            let observer = msg.action == Action::SitOut;
            let (view, targets) = state
                .toggle_observer_usecase
                .execute(room_key, self_id, observer)
                .await?;
            let dto = ParticipantDto::from(view);
            let json = ServerResponse::observer_changed(msg.action, dto.clone()).to_json();
            if let Err(e) = state
                .toggle_observer_usecase
                .broadcast_observer_changed(room_key, targets, &json)
                .await
            {
                tracing::warn!(
                    "Failed to broadcast {:?} in room '{}': {}",
                    msg.action,
                    room_key.as_str(),
                    e
                );
            }
            Ok(Some(dto))
        }

        // Actions that should not be sent TO the server, only FROM it,
        // plus unrecognized tags: ERROR to the sender only.
        Action::Voted
        | Action::UpdateDeck
        | Action::Joined
        | Action::Leave
        | Action::ParticipantsList
        | Action::Error
        | Action::Unrecognized => {
            let error_json = ServerResponse::invalid_action(Some(self_view.clone())).to_json();
            if reply.send(error_json).is_err() {
                tracing::warn!(
                    "Failed to send ERROR reply to participant {} in room '{}'",
                    self_id.value(),
                    room_key.as_str()
                );
            }
            Ok(None)
        }
    }
}
