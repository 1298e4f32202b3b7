use crate::ports::PortSpec;
use crate::tunnel::Direction;

/// Actions that can be dispatched through the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// List running sessions
    ListSessions,
    /// Register a host in the ssh config interactively
    AddHost,
    /// List configured hosts
    ListHosts,
    /// Close the session matching a query
    Close(String),
    /// Attach to the session matching a query
    Attach(String),
    /// Open a tunnel to a host
    Open {
        host: String,
        port: PortSpec,
        direction: Direction,
    },
    /// List named ports
    ListPorts,
    /// Add or overwrite a named port
    SetPort { name: String, port: String },
    /// Forget a named port
    RemovePort(String),
}
