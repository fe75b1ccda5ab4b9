//! File-backed `KnownHostsStore` at `~/.rexray/known_hosts`.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::KnownHostsStore;
use crate::domain::{KnownHosts, TrustedHostEntry};
use crate::infra::fs::{lock_file, set_permissions};

/// Environment variable overriding the store location.
pub const KNOWN_HOSTS_ENV: &str = "REXRAY_KNOWN_HOSTS";

/// Manages the `known_hosts` file.
pub struct KnownHostsFile {
    path: PathBuf,
}

impl KnownHostsFile {
    /// Resolves the store path: `REXRAY_KNOWN_HOSTS`, then the configured
    /// path, then `~/.rexray/known_hosts`.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is set and the home directory cannot
    /// be determined.
    pub fn resolve(configured: Option<&str>) -> Result<Self> {
        if let Some(path) = std::env::var_os(KNOWN_HOSTS_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_path(PathBuf::from(path)));
        }
        if let Some(path) = configured.filter(|p| !p.is_empty()) {
            return Ok(Self::with_path(PathBuf::from(path)));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_path(home.join(".rexray").join("known_hosts")))
    }

    /// Creates a store at an arbitrary path (for testing).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl KnownHostsStore for KnownHostsFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<KnownHosts> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(KnownHosts::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        KnownHosts::parse(&content).with_context(|| format!("invalid known_hosts file {}", self.path.display()))
    }

    /// Holds an exclusive `flock` across re-read, duplicate check and append.
    fn add(&self, entry: &TrustedHostEntry) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
            set_permissions(parent, 0o700)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        let mut file = lock_file(file)
            .with_context(|| format!("lock {}", self.path.display()))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("read {}", self.path.display()))?;
        let mut known = KnownHosts::parse(&content)
            .with_context(|| format!("invalid known_hosts file {}", self.path.display()))?;
        known.insert(entry.clone())?;

        let sep = if content.is_empty() || content.ends_with('\n') { "" } else { "\n" };
        let line = format!("{sep}{entry}\n");
        file.write_all(line.as_bytes())
            .with_context(|| format!("write {}", self.path.display()))?;
        file.flush()?;
        set_permissions(&self.path, 0o600)?;
        Ok(())
    }
}
