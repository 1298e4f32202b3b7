use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("invalid port: {0} (expected 1-65535)")]
    InvalidPort(String),

    #[error("port name '{0}' not found, add it with `ports set`")]
    UnknownName(String),

    #[error("port book I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("port book is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A port as typed on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSpec {
    Numeric(u16),
    /// Looked up in the [`PortBook`]
    Named(String),
}

impl PortSpec {
    /// All-digit input is a port number and must fit `1..=65535`; anything else is a name
    pub fn parse(raw: &str) -> Result<Self, PortError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PortError::InvalidPort(raw.to_string()));
        }
        if !raw.chars().all(|c| c.is_ascii_digit()) {
            return Ok(PortSpec::Named(raw.to_string()));
        }
        parse_number(raw).map(PortSpec::Numeric)
    }

    pub fn resolve(&self, book: &PortBook) -> Result<u16, PortError> {
        match self {
            PortSpec::Numeric(port) => Ok(*port),
            PortSpec::Named(name) => book
                .get(name)
                .ok_or_else(|| PortError::UnknownName(name.clone())),
        }
    }
}

fn parse_number(raw: &str) -> Result<u16, PortError> {
    match raw.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(PortError::InvalidPort(raw.to_string())),
    }
}

/// Named ports, persisted as `{"ports": {"name": 8080}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBook {
    #[serde(default)]
    ports: BTreeMap<String, u16>,
}

impl PortBook {
    /// Read the book at `path`; a missing file is an empty book
    pub fn load(path: &Path) -> Result<Self, PortError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PortError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.ports.get(name).copied()
    }

    /// Add or overwrite `name`; returns the previous port if there was one
    pub fn set(&mut self, name: &str, port: &str) -> Result<Option<u16>, PortError> {
        let port = parse_number(port.trim())?;
        Ok(self.ports.insert(name.to_string(), port))
    }

    pub fn remove(&mut self, name: &str) -> Option<u16> {
        self.ports.remove(name)
    }

    /// Entries sorted by name
    pub fn entries(&self) -> impl Iterator<Item = (&str, u16)> {
        self.ports.iter().map(|(name, port)| (name.as_str(), *port))
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_port_spec() {
        assert_eq!(PortSpec::parse("8080").unwrap(), PortSpec::Numeric(8080));
        assert_eq!(PortSpec::parse("grafana").unwrap(), PortSpec::Named("grafana".into()));
        assert_eq!(PortSpec::parse("web2").unwrap(), PortSpec::Named("web2".into()));
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        assert!(matches!(PortSpec::parse("0"), Err(PortError::InvalidPort(_))));
        assert!(matches!(PortSpec::parse("70000"), Err(PortError::InvalidPort(_))));
        assert!(matches!(PortSpec::parse(""), Err(PortError::InvalidPort(_))));
    }

    #[test]
    fn test_resolve_named() {
        let mut book = PortBook::default();
        book.set("grafana", "3000").unwrap();

        assert_eq!(PortSpec::Named("grafana".into()).resolve(&book).unwrap(), 3000);
        assert_eq!(PortSpec::Numeric(22).resolve(&book).unwrap(), 22);
        assert!(matches!(
            PortSpec::Named("kibana".into()).resolve(&book),
            Err(PortError::UnknownName(name)) if name == "kibana"
        ));
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let book = PortBook::load(&dir.path().join("ports.json")).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("ports.json");

        let mut book = PortBook::default();
        book.set("postgres", "5432").unwrap();
        book.set("grafana", "3000").unwrap();
        assert_eq!(book.set("grafana", "3001").unwrap(), Some(3000));
        book.save(&path).unwrap();

        let loaded = PortBook::load(&path).unwrap();
        let entries: Vec<_> = loaded.entries().collect();
        assert_eq!(entries, vec![("grafana", 3001), ("postgres", 5432)]);
    }

    #[test]
    fn test_reads_plain_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ports.json");
        std::fs::write(&path, r#"{"ports": {"api": 8443}}"#).unwrap();
        assert_eq!(PortBook::load(&path).unwrap().get("api"), Some(8443));
    }

    #[test]
    fn test_remove() {
        let mut book = PortBook::default();
        book.set("api", "8443").unwrap();
        assert_eq!(book.remove("api"), Some(8443));
        assert_eq!(book.remove("api"), None);
    }
}
