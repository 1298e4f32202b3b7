use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Marker that opens a host block in an ssh client config
const HOST_MARKER: &str = "Host ";

/// Extract host aliases from the text of an ssh client config.
///
/// A line counts when it contains `Host ` and is not commented out; the alias
/// is its second whitespace-separated token. Order follows the file.
pub fn parse_hosts(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.contains(HOST_MARKER))
        .filter(|line| !line.trim().starts_with('#'))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

/// Read and parse the ssh config at `path`.
///
/// A missing file surfaces as `io::ErrorKind::NotFound` for the caller to
/// decide on; nothing is created here.
pub fn read_hosts(path: &Path) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_hosts(&text))
}

/// A host block to be appended to the ssh config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub alias: String,
    pub hostname: String,
    pub user: String,
    pub identity_file: PathBuf,
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Host {}", self.alias)?;
        writeln!(f, "\tHostName {}", self.hostname)?;
        writeln!(f, "\tUser {}", self.user)?;
        writeln!(f, "\tIdentityFile {}", self.identity_file.display())
    }
}

/// Append `entry` to the config at `path`, separated from what came before
pub fn append_host(path: &Path, entry: &HostEntry) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    write!(file, "\n{}", entry)?;
    file.flush()
}
