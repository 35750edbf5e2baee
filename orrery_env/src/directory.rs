//! Filesystem-backed snapshot source.

use crate::error::EnvError;
use crate::source::SnapshotSource;
use crate::types::TimeToken;

use orrery_core::{codec, Snapshot};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default snapshot file extension used by both producers.
pub const DEFAULT_EXTENSION: &str = "bin";

/// A directory holding one snapshot file per timestep.
///
/// Files are named `<token>.<extension>`. Subdirectories and files with any
/// other extension are ignored.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extension: String,
}

impl DirectorySource {
    /// Creates a source over `root` with the default `bin` extension.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_extension(root, DEFAULT_EXTENSION)
    }

    /// Creates a source over `root` matching a custom extension.
    pub fn with_extension(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of the file that holds `token`.
    pub fn path_for(&self, token: &TimeToken) -> PathBuf {
        self.root.join(token.file_name(&self.extension))
    }

    /// Encodes and writes a snapshot under `token`, creating the directory.
    ///
    /// This is the producer side of the format, used to build fixture
    /// directories.
    pub fn write_snapshot(&self, token: &TimeToken, snapshot: &Snapshot) -> Result<PathBuf, EnvError> {
        fs::create_dir_all(&self.root).map_err(|e| EnvError::io(&self.root, e))?;

        let path = self.path_for(token);
        fs::write(&path, codec::encode(snapshot)).map_err(|e| EnvError::io(&path, e))?;
        debug!("Wrote {} bodies to {}", snapshot.len(), path.display());

        Ok(path)
    }

    fn token_of(&self, path: &Path) -> Option<TimeToken> {
        let name = path.file_name()?.to_str()?;
        if self.extension.is_empty() {
            return Some(TimeToken::from(name));
        }

        let stem = name.strip_suffix(self.extension.as_str())?.strip_suffix('.')?;
        if stem.is_empty() {
            None
        } else {
            Some(TimeToken::from(stem))
        }
    }
}

impl SnapshotSource for DirectorySource {
    fn tokens(&self) -> Result<Vec<TimeToken>, EnvError> {
        if !self.root.is_dir() {
            return Err(EnvError::not_found(&self.root));
        }

        let entries = fs::read_dir(&self.root).map_err(|e| EnvError::io(&self.root, e))?;

        let mut tokens = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| EnvError::io(&self.root, e))?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            match self.token_of(&path) {
                Some(token) => tokens.push(token),
                None => debug!("Skipping {}", path.display()),
            }
        }

        tokens.sort();
        debug!("Found {} snapshots in {}", tokens.len(), self.root.display());
        Ok(tokens)
    }

    fn read(&self, token: &TimeToken) -> Result<Vec<u8>, EnvError> {
        let path = self.path_for(token);
        fs::read(&path).map_err(|e| EnvError::io(&path, e))
    }

    fn contains(&self, token: &TimeToken) -> bool {
        self.path_for(token).is_file()
    }

    fn describe(&self) -> String {
        format!("{} (*.{})", self.root.display(), self.extension)
    }
}
