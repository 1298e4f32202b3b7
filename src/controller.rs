use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::inventory::Inventory;
use crate::prompt::PromptError;
use crate::resolver::{self, Chooser};
use crate::tmux::{PaneInspector, SessionManager, TunnelStatus};
use crate::tunnel::{safe_session_name, KeepAlive, Tunnel};

/// What happened when a tunnel session was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A session with that exact name already exists; nothing was sent
    AlreadyRunning(String),
    Started(String),
    /// Started, but ssh could not resolve the host; the session is left for inspection
    Unresolved(String),
    /// The connection was refused and the session has been killed again
    Refused(String),
    Failed { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    NotFound,
    Closed(String),
    Failed { name: String, reason: String },
}

/// Creates, finds and closes tunnel sessions
pub struct SessionController<M> {
    inventory: Inventory<M>,
    keep_alive: KeepAlive,
    /// Pause between sending the command and reading the pane
    settle: Duration,
}

/// Name for a session opened without one
fn temp_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("temp-{}", millis)
}

impl<M: SessionManager> SessionController<M> {
    pub fn new(inventory: Inventory<M>, keep_alive: KeepAlive, settle: Duration) -> Self {
        Self {
            inventory,
            keep_alive,
            settle,
        }
    }

    /// Live session names, in listing order
    pub async fn list(&self) -> Vec<String> {
        self.inventory.sessions().await
    }

    /// Configured host aliases, in file order
    pub fn hosts(&self) -> Vec<String> {
        self.inventory.hosts()
    }

    pub fn manager(&self) -> &M {
        self.inventory.manager()
    }

    /// Open `tunnel` in its own `{host}-{port}` session
    pub async fn open(&self, tunnel: &Tunnel) -> OpenOutcome {
        let command = tunnel.command(self.keep_alive);
        let name = tunnel.session_name();
        self.open_session(&command, Some(&name)).await
    }

    /// Start a session running `command` and check that it did not get refused.
    ///
    /// Without a `name` the session is called `temp-<unix millis>`.
    pub async fn open_session(&self, command: &str, name: Option<&str>) -> OpenOutcome {
        let name = name.map(safe_session_name).unwrap_or_else(temp_name);
        let manager = self.inventory.manager();

        if self.inventory.has_session(&name).await {
            info!(session = %name, "session already exists");
            return OpenOutcome::AlreadyRunning(name);
        }

        if let Err(e) = manager.create_session(&name).await {
            return OpenOutcome::Failed {
                name,
                reason: format!("{:#}", e),
            };
        }

        if let Err(e) = manager.send_keys(&name, command).await {
            // A session with nothing running in it is of no use; don't leave it behind
            if let Err(kill_err) = manager.kill_session(&name).await {
                warn!(session = %name, "Could not close session after failed send: {:#}", kill_err);
            }
            return OpenOutcome::Failed {
                name,
                reason: format!("{:#}", e),
            };
        }
        debug!(session = %name, %command, "command sent");

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let content = match manager.capture_pane(&name).await {
            Ok(content) => content,
            Err(e) => {
                warn!(session = %name, "Could not capture pane: {:#}", e);
                String::new()
            }
        };

        match PaneInspector::analyze(&content) {
            TunnelStatus::Refused => {
                info!(session = %name, "connection refused, closing session");
                if let Err(e) = manager.kill_session(&name).await {
                    warn!(session = %name, "Could not close refused session: {:#}", e);
                }
                OpenOutcome::Refused(name)
            }
            TunnelStatus::Unresolved => OpenOutcome::Unresolved(name),
            TunnelStatus::Pending => OpenOutcome::Started(name),
        }
    }

    /// Resolve `query` against live sessions
    pub async fn find_session(
        &self,
        query: &str,
        chooser: &mut impl Chooser,
    ) -> Result<Option<String>, PromptError> {
        let sessions = self.inventory.sessions().await;
        resolver::resolve(&sessions, query, "session", chooser)
    }

    /// Resolve `query` against configured host aliases
    pub fn find_host(
        &self,
        query: &str,
        chooser: &mut impl Chooser,
    ) -> Result<Option<String>, PromptError> {
        let hosts = self.inventory.hosts();
        resolver::resolve(&hosts, query, "host", chooser)
    }

    /// Kill the session `query` resolves to
    pub async fn close(
        &self,
        query: &str,
        chooser: &mut impl Chooser,
    ) -> Result<CloseOutcome, PromptError> {
        let Some(name) = self.find_session(query, chooser).await? else {
            return Ok(CloseOutcome::NotFound);
        };

        Ok(match self.inventory.manager().kill_session(&name).await {
            Ok(()) => CloseOutcome::Closed(name),
            Err(e) => CloseOutcome::Failed {
                name,
                reason: format!("{:#}", e),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmux::testing::FakeManager;
    use crate::tunnel::Direction;
    use std::io::Cursor;
    use std::path::PathBuf;

    use crate::prompt::Prompt;

    const KEEP_ALIVE: KeepAlive = KeepAlive {
        interval: 60,
        count_max: 2,
    };

    fn controller(manager: FakeManager) -> SessionController<FakeManager> {
        SessionController::new(
            Inventory::new(manager, PathBuf::from("/nonexistent/ssh/config")),
            KEEP_ALIVE,
            Duration::ZERO,
        )
    }

    fn prompt(input: &str) -> Prompt<Cursor<Vec<u8>>, Vec<u8>> {
        Prompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[tokio::test]
    async fn test_open_existing_is_noop() {
        let ctl = controller(FakeManager::with_sessions(&["prod-8080"]));
        let outcome = ctl.open(&Tunnel::new("prod", 8080, Direction::Local)).await;

        assert_eq!(outcome, OpenOutcome::AlreadyRunning("prod-8080".into()));
        assert!(ctl.manager().calls().is_empty());
    }

    #[tokio::test]
    async fn test_open_starts_tunnel() {
        let ctl = controller(FakeManager::with_sessions(&["prod"]));
        let outcome = ctl.open(&Tunnel::new("prod", 8080, Direction::Remote)).await;

        assert_eq!(outcome, OpenOutcome::Started("prod-8080".into()));
        let calls = ctl.manager().calls();
        assert_eq!(calls[0], "create prod-8080");
        assert!(calls[1].starts_with("send prod-8080 ssh -R 8080:localhost:8080 prod "));
        assert_eq!(calls[2], "capture prod-8080");
        assert_eq!(calls.len(), 3);
        assert!(ctl.list().await.contains(&"prod-8080".to_string()));
    }

    #[tokio::test]
    async fn test_refused_session_is_killed() {
        let manager = FakeManager {
            pane_text: "ssh: connect to host 10.0.0.1 port 22: Connection refused".into(),
            ..FakeManager::default()
        };
        let ctl = controller(manager);
        let outcome = ctl.open(&Tunnel::new("prod", 8080, Direction::Local)).await;

        assert_eq!(outcome, OpenOutcome::Refused("prod-8080".into()));
        assert_eq!(ctl.manager().calls().last().unwrap(), "kill prod-8080");
        assert!(ctl.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_session_is_kept() {
        let manager = FakeManager {
            pane_text: "ssh: Could not resolve hostname prdo".into(),
            ..FakeManager::default()
        };
        let ctl = controller(manager);
        let outcome = ctl.open(&Tunnel::new("prdo", 22, Direction::Local)).await;

        assert_eq!(outcome, OpenOutcome::Unresolved("prdo-22".into()));
        assert_eq!(ctl.list().await, vec!["prdo-22"]);
    }

    #[tokio::test]
    async fn test_create_failure() {
        let manager = FakeManager {
            fail_create: true,
            ..FakeManager::default()
        };
        let ctl = controller(manager);
        let outcome = ctl.open(&Tunnel::new("prod", 8080, Direction::Local)).await;

        assert!(matches!(outcome, OpenOutcome::Failed { ref name, .. } if name == "prod-8080"));
        assert_eq!(ctl.manager().calls(), vec!["create prod-8080"]);
    }

    #[tokio::test]
    async fn test_dotted_host_reopen_is_noop() {
        let ctl = controller(FakeManager::default());
        let tunnel = Tunnel::new("root@10.0.0.5", 5432, Direction::Local);

        assert_eq!(ctl.open(&tunnel).await, OpenOutcome::Started("root@10_0_0_5-5432".into()));
        assert_eq!(ctl.list().await, vec!["root@10_0_0_5-5432"]);
        assert!(ctl.manager().calls().contains(&"capture root@10_0_0_5-5432".to_string()));

        assert_eq!(
            ctl.open(&tunnel).await,
            OpenOutcome::AlreadyRunning("root@10_0_0_5-5432".into())
        );
    }

    #[tokio::test]
    async fn test_explicit_name_is_made_safe() {
        let ctl = controller(FakeManager::default());
        let outcome = ctl.open_session("echo hi", Some("db.prod-8080")).await;
        assert_eq!(outcome, OpenOutcome::Started("db_prod-8080".into()));
    }

    #[tokio::test]
    async fn test_send_failure_kills_session() {
        let manager = FakeManager {
            fail_send: true,
            ..FakeManager::default()
        };
        let ctl = controller(manager);
        let outcome = ctl.open(&Tunnel::new("prod", 8080, Direction::Local)).await;

        assert!(matches!(outcome, OpenOutcome::Failed { ref name, .. } if name == "prod-8080"));
        let calls = ctl.manager().calls();
        assert_eq!(calls.last().unwrap(), "kill prod-8080");
        assert!(!calls.iter().any(|c| c.starts_with("capture")));
        assert!(ctl.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_open_without_name_uses_temp() {
        let ctl = controller(FakeManager::default());
        let outcome = ctl.open_session("htop", None).await;

        match outcome {
            OpenOutcome::Started(name) => assert!(name.starts_with("temp-")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_close_by_index() {
        let ctl = controller(FakeManager::with_sessions(&["prod-8080", "db-5432"]));
        let mut p = prompt("");

        let outcome = ctl.close("2", &mut p).await.unwrap();
        assert_eq!(outcome, CloseOutcome::Closed("db-5432".into()));
        assert_eq!(ctl.manager().calls(), vec!["kill db-5432"]);
    }

    #[tokio::test]
    async fn test_close_asks_when_ambiguous() {
        let ctl = controller(FakeManager::with_sessions(&["webapp", "webapp-8080", "db"]));
        let mut p = prompt("2\n");

        let outcome = ctl.close("webapp", &mut p).await.unwrap();
        assert_eq!(outcome, CloseOutcome::Closed("webapp-8080".into()));
        assert_eq!(ctl.list().await, vec!["webapp", "db"]);
    }

    #[tokio::test]
    async fn test_close_not_found() {
        let ctl = controller(FakeManager::with_sessions(&["alpha", "beta"]));
        let mut p = prompt("");

        assert_eq!(ctl.close("3", &mut p).await.unwrap(), CloseOutcome::NotFound);
        assert!(ctl.manager().calls().is_empty());

        let ctl = controller(FakeManager::default());
        assert_eq!(ctl.close("alpha", &mut p).await.unwrap(), CloseOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_close_kill_failure_is_distinct() {
        let manager = FakeManager {
            fail_kill: true,
            ..FakeManager::with_sessions(&["prod-8080"])
        };
        let ctl = controller(manager);
        let mut p = prompt("");

        let outcome = ctl.close("prod", &mut p).await.unwrap();
        assert!(matches!(outcome, CloseOutcome::Failed { ref name, .. } if name == "prod-8080"));
    }

    #[tokio::test]
    async fn test_list_empty() {
        let ctl = controller(FakeManager::default());
        assert!(ctl.list().await.is_empty());
    }

    #[test]
    fn test_find_host_without_config() {
        let ctl = controller(FakeManager::default());
        let mut p = prompt("");
        assert_eq!(ctl.find_host("prod", &mut p).unwrap(), None);
    }
}
