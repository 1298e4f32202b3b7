use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

use crate::actions::Action;
use crate::ports::{PortError, PortSpec};
use crate::tunnel::Direction;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    InvalidArgument(&'static str),

    #[error(transparent)]
    Port(#[from] PortError),
}

/// Keep SSH tunnels alive in tmux sessions.
///
/// Without a subcommand, `<HOST> <PORT>` opens a tunnel in a session named
/// `HOST-PORT`.
#[derive(Debug, Parser)]
#[command(name = "tunnel-rusty", version, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: <config dir>/tunnel-rusty/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Host alias, index from `hosts`, or any ssh destination
    pub host: Option<String>,

    /// Port number or a name from `ports`
    pub port: Option<String>,

    /// Forward from the remote side (ssh -R) instead of locally (ssh -L)
    #[arg(short = 'R', long)]
    pub remote: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List running sessions
    Ls,
    /// Add a host to the ssh config
    Add,
    /// List hosts from the ssh config
    Hosts,
    /// Close a session by index or name fragment
    Close { query: Option<String> },
    /// Attach to a session by index or name fragment
    Attach { query: Option<String> },
    /// List, add or remove named ports
    Ports {
        #[command(subcommand)]
        action: Option<PortsCommand>,
    },
}

#[derive(Debug, Subcommand)]
pub enum PortsCommand {
    /// Name a port
    Set { name: String, port: String },
    /// Forget a named port
    Rm { name: String },
}

impl Cli {
    /// Turn parsed arguments into an action, checking what clap can't
    pub fn into_action(self) -> Result<Action, CliError> {
        let action = match self.command {
            Some(Command::Ls) => Action::ListSessions,
            Some(Command::Add) => Action::AddHost,
            Some(Command::Hosts) => Action::ListHosts,
            Some(Command::Close { query }) => {
                Action::Close(query.ok_or(CliError::InvalidArgument("no host given to close"))?)
            }
            Some(Command::Attach { query }) => {
                Action::Attach(query.ok_or(CliError::InvalidArgument("no session given to attach"))?)
            }
            Some(Command::Ports { action: None }) => Action::ListPorts,
            Some(Command::Ports {
                action: Some(PortsCommand::Set { name, port }),
            }) => Action::SetPort { name, port },
            Some(Command::Ports {
                action: Some(PortsCommand::Rm { name }),
            }) => Action::RemovePort(name),
            None => {
                let (Some(host), Some(port)) = (self.host, self.port) else {
                    return Err(CliError::InvalidArgument("host and port are required"));
                };
                let direction = if self.remote {
                    Direction::Remote
                } else {
                    Direction::Local
                };
                Action::Open {
                    host,
                    port: PortSpec::parse(&port)?,
                    direction,
                }
            }
        };

        Ok(action)
    }
}
