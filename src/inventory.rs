use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::ssh;
use crate::tmux::SessionManager;

/// Fresh listings of live sessions and configured hosts.
///
/// Nothing is cached: every call asks its source again. A source that cannot
/// be read counts as empty and is logged.
pub struct Inventory<M> {
    manager: M,
    ssh_config: PathBuf,
}

impl<M: SessionManager> Inventory<M> {
    pub fn new(manager: M, ssh_config: PathBuf) -> Self {
        Self {
            manager,
            ssh_config,
        }
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub async fn sessions(&self) -> Vec<String> {
        match self.manager.list_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!("Could not list sessions: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Exact-name check, unlike the fuzzy matching of the resolver
    pub async fn has_session(&self, name: &str) -> bool {
        self.sessions().await.iter().any(|s| s == name)
    }

    pub fn hosts(&self) -> Vec<String> {
        match ssh::read_hosts(&self.ssh_config) {
            Ok(hosts) => hosts,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.ssh_config.display(), "no ssh config, no hosts");
                Vec::new()
            }
            Err(e) => {
                warn!(path = %self.ssh_config.display(), "Could not read ssh config: {}", e);
                Vec::new()
            }
        }
    }
}
