//! Planning poker server library.
//!
//! This library provides a WebSocket-based planning poker (collaborative
//! estimation) server: participants join a room, cast hidden votes and
//! reveal them together.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
