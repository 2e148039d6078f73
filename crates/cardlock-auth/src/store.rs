//! Persistence for authorized credential records.
//!
//! Records are flat `KEY=VALUE` pairs. [`EnvFileStore`] keeps them in a
//! dotenv-style file that other tooling may also write to, so it re-reads
//! the file on every lookup and preserves every line it does not own when
//! rewriting.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{AuthError, Result};

/// Header written when the credential file is created.
const FILE_HEADER: [&str; 2] = [
    "# RFID Servo Lock credential store",
    "# One RFID_CARD_<id>_HASH entry per card (card ID used as salt)",
];

/// Key-value storage for credential records.
pub trait CredentialStore {
    /// Value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or parsed.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns `true` if it was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove(&mut self, key: &str) -> Result<bool>;

    /// Every key in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or parsed.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Credential store backed by a dotenv-style file.
///
/// A missing file is an empty store. Writes go to a temporary file in the
/// same directory which then replaces the original, so a crash never leaves
/// a half-written store behind.
#[derive(Debug, Clone)]
pub struct EnvFileStore {
    path: PathBuf,
}

impl EnvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> Result<Vec<(String, String)>> {
        let iter = match dotenvy::from_path_iter(&self.path) {
            Ok(iter) => iter,
            Err(err) if err.not_found() => return Ok(Vec::new()),
            Err(err) => return Err(self.malformed(err)),
        };

        iter.map(|item| item.map_err(|err| self.malformed(err)))
            .collect()
    }

    fn malformed(&self, err: dotenvy::Error) -> AuthError {
        AuthError::malformed(self.path.display().to_string(), err.to_string())
    }

    /// Replace (or with `None`, drop) every line assigning `key`.
    ///
    /// Returns `true` if the key was present.
    fn rewrite(&self, key: &str, value: Option<&str>) -> Result<bool> {
        let existing = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };

        let mut lines: Vec<String> = Vec::new();
        if existing.trim().is_empty() {
            lines.extend(FILE_HEADER.iter().map(|line| (*line).to_string()));
        }

        let mut found = false;
        for line in existing.lines() {
            if line_key(line) != Some(key) {
                lines.push(line.to_string());
                continue;
            }
            if !found && let Some(value) = value {
                lines.push(format!("{key}={value}"));
            }
            found = true;
        }

        match (found, value) {
            (false, Some(value)) => lines.push(format!("{key}={value}")),
            (false, None) => return Ok(false),
            _ => {}
        }

        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut file = NamedTempFile::new_in(dir)?;
        for line in &lines {
            writeln!(file, "{line}")?;
        }
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|err| err.error)?;

        debug!(path = %self.path.display(), key, "Credential store rewritten");
        Ok(found)
    }
}

/// Key assigned by a dotenv line, ignoring comments and `export` prefixes.
fn line_key(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, _) = line.split_once('=')?;
    Some(key.trim())
}

impl CredentialStore for EnvFileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries()?
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.rewrite(key, Some(value)).map(|_| ())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        self.rewrite(key, None)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.into_iter().map(|(key, _)| key).collect())
    }
}

/// In-memory credential store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.records.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.records.keys().cloned().collect())
    }
}
