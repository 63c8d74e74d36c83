pub mod rooms;

pub use rooms::InMemoryRoomRegistry;
