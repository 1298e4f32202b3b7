mod client;
mod heuristics;

pub use client::TmuxClient;
pub use heuristics::{PaneInspector, TunnelStatus};

use anyhow::Result;

/// Operations the tunnel controller needs from a terminal multiplexer.
///
/// Every call goes to the multiplexer fresh; nothing here caches state.
#[allow(async_fn_in_trait)]
pub trait SessionManager {
    /// Names of the live sessions, in the multiplexer's listing order
    async fn list_sessions(&self) -> Result<Vec<String>>;

    /// Text currently visible in the session's active pane
    async fn capture_pane(&self, name: &str) -> Result<String>;

    /// Start a detached session
    async fn create_session(&self, name: &str) -> Result<()>;

    /// Type a command into the session and press Enter
    async fn send_keys(&self, name: &str, command: &str) -> Result<()>;

    async fn kill_session(&self, name: &str) -> Result<()>;

    /// Command line that attaches the current terminal to a session
    fn attach_command(&self, name: &str) -> Vec<String>;
}
