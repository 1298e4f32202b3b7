mod config;
mod keys;

pub use config::{append_host, read_hosts, HostEntry};
pub use keys::list_identity_files;
