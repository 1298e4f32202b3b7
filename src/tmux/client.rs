use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::debug;

use super::SessionManager;

/// Messages tmux prints instead of a listing when there is nothing to list
const EMPTY_STATE_MARKERS: [&str; 3] = ["no server running", "no sessions", "error connecting to"];

/// Client for interacting with tmux via CLI
pub struct TmuxClient {
    /// Path to tmux binary
    tmux_path: String,
}

impl TmuxClient {
    pub fn with_path(tmux_path: impl Into<String>) -> Self {
        Self {
            tmux_path: tmux_path.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output> {
        debug!(tmux = %self.tmux_path, ?args, "running tmux");
        Command::new(&self.tmux_path)
            .args(args)
            .output()
            .await
            .with_context(|| format!("Failed to execute tmux {}", args[0]))
    }

    /// Run a command that only reports success or failure
    async fn run_checked(&self, args: &[&str]) -> Result<()> {
        let output = self.run(args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tmux {} failed: {}", args[0], stderr.trim());
        }

        Ok(())
    }
}

impl Default for TmuxClient {
    fn default() -> Self {
        Self::with_path("tmux")
    }
}

/// `=name` makes tmux accept only an exact session name instead of a prefix
fn exact_session(name: &str) -> String {
    format!("={}", name)
}

/// Pane target inside an exactly-named session
fn exact_pane(name: &str) -> String {
    format!("={}:", name)
}

fn is_empty_state(text: &str) -> bool {
    let text = text.trim_start();
    EMPTY_STATE_MARKERS.iter().any(|marker| text.starts_with(marker))
}

/// One session per line, nothing after the name but the terminating colon
const LIST_FORMAT: &str = "#{session_name}:";

/// Parse the text printed by `tmux list-sessions` into session names.
///
/// Each record is `name:` (as requested by [`LIST_FORMAT`]) or the default
/// `name: 1 windows (created ...)`. tmux never keeps a `:` in a session name,
/// so the name is everything before the first colon, spaces included.
pub fn parse_list_output(text: &str) -> Vec<String> {
    if is_empty_state(text) {
        return Vec::new();
    }

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| line.split(':').next())
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .collect()
}

impl SessionManager for TmuxClient {
    async fn list_sessions(&self) -> Result<Vec<String>> {
        let output = self.run(&["list-sessions", "-F", LIST_FORMAT]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_empty_state(&stderr) {
                return Ok(Vec::new());
            }
            anyhow::bail!("tmux list-sessions failed: {}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_list_output(&stdout))
    }

    async fn capture_pane(&self, name: &str) -> Result<String> {
        let target = exact_pane(name);
        let output = self.run(&["capture-pane", "-p", "-t", &target]).await?;

        // Mirrors what a user would see: stdout when there is any, otherwise the complaint
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(String::from_utf8_lossy(&output.stderr).into_owned());
        }
        Ok(stdout.into_owned())
    }

    async fn create_session(&self, name: &str) -> Result<()> {
        self.run_checked(&["new-session", "-d", "-s", name]).await
    }

    async fn send_keys(&self, name: &str, command: &str) -> Result<()> {
        let target = exact_pane(name);
        self.run_checked(&["send-keys", "-t", &target, command, "C-m"])
            .await
    }

    async fn kill_session(&self, name: &str) -> Result<()> {
        let target = exact_session(name);
        self.run_checked(&["kill-session", "-t", &target]).await
    }

    fn attach_command(&self, name: &str) -> Vec<String> {
        vec![
            self.tmux_path.clone(),
            "attach-session".to_string(),
            "-t".to_string(),
            exact_session(name),
        ]
    }
}
