use anyhow::{Context, Result};
use crossterm::style::{style, Stylize};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

use crate::actions::Action;
use crate::config::Config;
use crate::controller::{CloseOutcome, OpenOutcome, SessionController};
use crate::inventory::Inventory;
use crate::ports::{PortBook, PortSpec};
use crate::prompt::{Prompt, Validation};
use crate::ssh::{self, HostEntry};
use crate::tmux::SessionManager;
use crate::tunnel::{Direction, KeepAlive, Tunnel};

/// Main application state
pub struct App<M, R, W> {
    pub config: Config,
    controller: SessionController<M>,
    /// Operator input and all user-facing output
    prompt: Prompt<R, W>,
}

impl<M: SessionManager, R: BufRead, W: Write> App<M, R, W> {
    pub fn new(config: Config, manager: M, prompt: Prompt<R, W>) -> Self {
        let inventory = Inventory::new(manager, config.ssh_config.clone());
        let keep_alive = KeepAlive {
            interval: config.server_alive_interval,
            count_max: config.server_alive_count_max,
        };
        let controller = SessionController::new(inventory, keep_alive, config.settle());

        Self {
            config,
            controller,
            prompt,
        }
    }

    /// Handle an action to completion
    pub async fn handle_action(&mut self, action: Action) -> Result<()> {
        debug!(?action, "handling action");
        match action {
            Action::ListSessions => self.list_sessions().await,
            Action::ListHosts => self.list_hosts(),
            Action::AddHost => self.add_host(),
            Action::Close(query) => self.close(&query).await,
            Action::Attach(query) => self.attach(&query).await,
            Action::Open {
                host,
                port,
                direction,
            } => self.open(&host, &port, direction).await,
            Action::ListPorts => self.list_ports(),
            Action::SetPort { name, port } => self.set_port(&name, &port),
            Action::RemovePort(name) => self.remove_port(&name),
        }
    }

    fn success(&mut self, msg: String) -> Result<()> {
        Ok(self.prompt.say(style(msg).green())?)
    }

    fn failure(&mut self, msg: String) -> Result<()> {
        Ok(self.prompt.say(style(msg).red())?)
    }

    async fn list_sessions(&mut self) -> Result<()> {
        let sessions = self.controller.list().await;
        if sessions.is_empty() {
            self.prompt.say("No sessions running")?;
        } else {
            self.prompt.show_list("Running sessions:", &sessions)?;
        }
        Ok(())
    }

    fn list_hosts(&mut self) -> Result<()> {
        let hosts = self.controller.hosts();
        if hosts.is_empty() {
            let msg = format!("No hosts in {}", self.config.ssh_config.display());
            self.prompt.say(msg)?;
        } else {
            self.prompt.show_list("Hosts:", &hosts)?;
        }
        Ok(())
    }

    /// Exact aliases pass through; anything else goes through host resolution
    /// and, failing that, is handed to ssh as typed
    fn resolve_host(&mut self, query: &str) -> Result<String> {
        if self.controller.hosts().iter().any(|h| h == query) {
            return Ok(query.to_string());
        }
        let host = self.controller.find_host(query, &mut self.prompt)?;
        Ok(host.unwrap_or_else(|| query.to_string()))
    }

    async fn open(&mut self, host: &str, port: &PortSpec, direction: Direction) -> Result<()> {
        let book = PortBook::load(&self.config.ports_file)?;
        let port = port.resolve(&book)?;
        let host = self.resolve_host(host)?;
        let tunnel = Tunnel::new(host, port, direction);

        match self.controller.open(&tunnel).await {
            OpenOutcome::AlreadyRunning(name) => {
                self.prompt.say(format!("Session {} already exists", name))?
            }
            OpenOutcome::Started(name) => {
                self.success(format!("Session {} created: {}", name, tunnel))?
            }
            OpenOutcome::Unresolved(name) => self.failure(format!(
                "Session {} created, but ssh could not resolve {}",
                name, tunnel.host
            ))?,
            OpenOutcome::Refused(name) => {
                self.failure(format!("Connection refused, session {} closed", name))?
            }
            OpenOutcome::Failed { name, reason } => {
                self.failure(format!("Failed to create session {}: {}", name, reason))?
            }
        }
        Ok(())
    }

    async fn close(&mut self, query: &str) -> Result<()> {
        match self.controller.close(query, &mut self.prompt).await? {
            CloseOutcome::NotFound => self.prompt.say("Session not found")?,
            CloseOutcome::Closed(name) => self.success(format!("Session {} closed", name))?,
            CloseOutcome::Failed { name, reason } => {
                self.failure(format!("Failed to close session {}: {}", name, reason))?
            }
        }
        Ok(())
    }

    async fn attach(&mut self, query: &str) -> Result<()> {
        let Some(name) = self.controller.find_session(query, &mut self.prompt).await? else {
            self.prompt.say("Session not found")?;
            return Ok(());
        };

        let cmd = self.controller.manager().attach_command(&name);
        let status = tokio::process::Command::new(&cmd[0])
            .args(&cmd[1..])
            .status()
            .await
            .context("Failed to attach")?;

        if !status.success() {
            self.failure(format!("Failed to attach to {}: {}", name, status))?;
        }
        Ok(())
    }

    /// Ask for a new host block and append it to the ssh config
    fn add_host(&mut self) -> Result<()> {
        let hosts = self.controller.hosts();
        let ssh_dir = self.config.ssh_dir();

        let keys = match ssh::list_identity_files(&ssh_dir) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(path = %ssh_dir.display(), "Could not list identity files: {}", e);
                self.prompt.say(format!(
                    "Could not read identity files in {}: {}",
                    ssh_dir.display(),
                    e
                ))?;
                return Ok(());
            }
        };
        if keys.is_empty() {
            self.prompt
                .say(format!("No identity files in {}", ssh_dir.display()))?;
            return Ok(());
        }

        let alias = self.prompt.ask("\nHost alias: ", |a| {
            Validation::from((!a.is_empty() && !hosts.iter().any(|h| h == a)).then(|| a.to_string()))
        })?;
        let hostname = self.prompt.ask("HostName: ", non_empty)?;
        let user = self.prompt.ask("User: ", non_empty)?;

        let names: Vec<String> = keys
            .iter()
            .filter_map(|k| k.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        let key = self
            .prompt
            .select("Identity files:", "\nChoose a key: ", &names)?;
        let identity_file = ssh_dir.join(key);

        let entry = HostEntry {
            alias,
            hostname,
            user,
            identity_file,
        };
        ssh::append_host(&self.config.ssh_config, &entry)
            .with_context(|| format!("Failed to write {}", self.config.ssh_config.display()))?;

        self.success(format!(
            "Host {} added to {}",
            entry.alias,
            self.config.ssh_config.display()
        ))
    }

    fn list_ports(&mut self) -> Result<()> {
        let book = PortBook::load(&self.config.ports_file)?;
        if book.is_empty() {
            self.prompt.say("No named ports")?;
            return Ok(());
        }

        let lines: Vec<String> = book
            .entries()
            .map(|(name, port)| format!("{} = {}", name, port))
            .collect();
        self.prompt.show_list("Named ports:", &lines)?;
        Ok(())
    }

    fn set_port(&mut self, name: &str, port: &str) -> Result<()> {
        let mut book = PortBook::load(&self.config.ports_file)?;
        let previous = book.set(name, port)?;
        book.save(&self.config.ports_file)?;

        let port = book.get(name).unwrap_or_default();
        match previous {
            Some(old) => self.success(format!("Port {} changed from {} to {}", name, old, port)),
            None => self.success(format!("Port {} = {}", name, port)),
        }
    }

    fn remove_port(&mut self, name: &str) -> Result<()> {
        let mut book = PortBook::load(&self.config.ports_file)?;
        match book.remove(name) {
            Some(_) => {
                book.save(&self.config.ports_file)?;
                self.success(format!("Port {} removed", name))
            }
            None => Ok(self.prompt.say(format!("No port named {}", name))?),
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.prompt.into_output()
    }
}

fn non_empty(answer: &str) -> Validation<String> {
    Validation::from((!answer.is_empty()).then(|| answer.to_string()))
}
