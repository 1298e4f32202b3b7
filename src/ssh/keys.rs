use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files in `~/.ssh` that are never identities even though they have no extension
const NOT_KEYS: [&str; 4] = ["config", "known_hosts", "authorized_keys", "environment"];

/// List private key files directly inside `ssh_dir`, sorted by name.
///
/// Keys are recognised the way people usually name them: no extension
/// (`id_ed25519`, `work`), which leaves out `.pub` halves and backups.
pub fn list_identity_files(ssh_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut keys = Vec::new();

    for entry in WalkDir::new(ssh_dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if name.contains('.') || NOT_KEYS.iter().any(|k| name == *k) {
            continue;
        }

        keys.push(entry.into_path());
    }

    Ok(keys)
}
