//! Network layer subsystem.
//!
//! Binds the listening socket. Accepting and per-connection tasks are left
//! to `axum::serve`.

pub mod listener;

pub use listener::{bind, ListenerError};
