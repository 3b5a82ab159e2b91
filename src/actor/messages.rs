//! Actor Message Definitions
//!
//! ```text
//! FsActor --Changed--> Dispatcher --run binding--> task scheduler
//!                                                       |
//!                                   ReloadHandle --WsMsg--> WsActor
//! ```

use std::path::PathBuf;

/// Messages to the Dispatcher
#[derive(Debug)]
pub enum DispatchMsg {
    /// Debounced batch of changed paths
    Changed(Vec<PathBuf>),
    /// A binding's task sequence finished (sent by the runner)
    Finished(crate::core::AssetClass),
    /// Shutdown
    Shutdown,
}

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Reload every connected page
    Reload { reason: String },
    /// Transform error (display overlay, no reload)
    Error { title: String, message: String },
    /// Clear error overlay (class built cleanly after an error)
    ClearError,
    /// Add client
    AddClient(std::net::TcpStream),
    /// Shutdown
    Shutdown,
}
