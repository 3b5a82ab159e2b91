//! Actor System for Watch Mode
//!
//! Message-passing concurrency for the dev loop:
//!
//! ```text
//! FsActor --> Dispatcher --> task runner (blocking pool)
//! (watch)     (routing)            |
//!                           ReloadHandle --> WsActor
//!                                            (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `dispatch` - Binding routing and the same-binding run policy
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod dispatch;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
