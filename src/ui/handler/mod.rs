//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{change_deck, create_room, get_rooms, health_check};
pub use websocket::websocket_handler;
