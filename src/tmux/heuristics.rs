use once_cell::sync::Lazy;
use regex::Regex;

/// What the pane of a freshly started tunnel says about the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TunnelStatus {
    /// The remote end (or the forwarded port) refused the connection
    Refused,
    /// ssh could not resolve the host name
    Unresolved,
    /// Nothing conclusive yet; ssh is connecting or already connected
    #[default]
    Pending,
}

/// Compiled regex patterns for status detection
static RE_REFUSED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Connection refused").unwrap()
});

static RE_UNRESOLVED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Could not resolve hostname|Name or service not known").unwrap()
});

/// Engine for inferring tunnel status from captured pane content
pub struct PaneInspector;

impl PaneInspector {
    /// Analyze pane content and determine tunnel status
    pub fn analyze(content: &str) -> TunnelStatus {
        // Refusal wins: it is the only status that tears the session down
        if RE_REFUSED.is_match(content) {
            return TunnelStatus::Refused;
        }

        if RE_UNRESOLVED.is_match(content) {
            return TunnelStatus::Unresolved;
        }

        TunnelStatus::Pending
    }
}
