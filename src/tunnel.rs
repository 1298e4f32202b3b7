use std::fmt;

/// Which side of the ssh connection listens on the forwarded port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// `-L`: listen here, forward to the remote host
    #[default]
    Local,
    /// `-R`: listen on the remote host, forward back here
    Remote,
}

impl Direction {
    fn flag(self) -> &'static str {
        match self {
            Direction::Local => "-L",
            Direction::Remote => "-R",
        }
    }
}

/// tmux rewrites `.` and `:` in session names to `_`; do it up front so
/// lookups and targets use the name tmux will actually list
pub fn safe_session_name(name: &str) -> String {
    name.replace(['.', ':'], "_")
}

/// ssh keep-alive settings passed to every tunnel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    pub interval: u32,
    pub count_max: u32,
}

/// One forwarded port to one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tunnel {
    pub host: String,
    pub port: u16,
    pub direction: Direction,
}

impl Tunnel {
    pub fn new(host: impl Into<String>, port: u16, direction: Direction) -> Self {
        Self {
            host: host.into(),
            port,
            direction,
        }
    }

    /// Session name for this tunnel: `{host}-{port}`, made tmux-safe
    pub fn session_name(&self) -> String {
        safe_session_name(&format!("{}-{}", self.host, self.port))
    }

    /// The ssh command typed into the session
    pub fn command(&self, keep_alive: KeepAlive) -> String {
        format!(
            "ssh {flag} {port}:localhost:{port} {host} -o ServerAliveInterval={interval} -o ServerAliveCountMax={count}",
            flag = self.direction.flag(),
            port = self.port,
            host = self.host,
            interval = keep_alive.interval,
            count = keep_alive.count_max,
        )
    }
}

impl fmt::Display for Tunnel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.direction {
            Direction::Local => "->",
            Direction::Remote => "<-",
        };
        write!(f, "localhost:{} {} {}:{}", self.port, arrow, self.host, self.port)
    }
}
