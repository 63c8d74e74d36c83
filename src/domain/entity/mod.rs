//! エンティティ定義

pub mod participant;
pub mod room;

pub use participant::{Participant, ParticipantView};
pub use room::Room;
