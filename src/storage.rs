use serde::de::DeserializeOwned;
use serde::Serialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

const APP_DIR: &str = "kb-tile-games";

#[derive(Debug, Error)]
pub enum StorageError
{
    #[error("no data directory: set KB_GAMES_DATA_DIR or HOME")]
    NoDataDir,

    #[error("failed to create {}: {source}", path.display())]
    CreateDir
    {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read
    {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write
    {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode {name}: {source}")]
    Encode
    {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON files under one data directory, keyed by file name.
#[derive(Clone, Debug)]
pub struct Store
{
    dir: PathBuf,
}

impl Store
{
    pub fn at(dir: impl Into<PathBuf>) -> Self
    {
        Self { dir: dir.into() }
    }

    /// `KB_GAMES_DATA_DIR`, else `$XDG_DATA_HOME/kb-tile-games`, else
    /// `$HOME/.local/share/kb-tile-games`.
    pub fn from_env() -> Result<Self, StorageError>
    {
        data_dir().map(Self::at)
    }

    pub fn dir(&self) -> &Path
    {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf
    {
        self.dir.join(name)
    }

    pub fn ensure_dir(&self) -> Result<(), StorageError>
    {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::CreateDir {
            path: self.dir.clone(),
            source,
        })
    }

    /// Reads and decodes `name`. Missing, unreadable and corrupt files all
    /// come back as `None`.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Option<T>
    {
        match self.try_load(name) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, name, "discarding stored file");
                None
            }
        }
    }

    fn try_load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StorageError>
    {
        let path = self.path(name);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Read { path, source }),
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(path = %path.display(), %err, "stored file is not valid");
                Ok(None)
            }
        }
    }

    /// Writes `value` as JSON through a temporary file and a rename.
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StorageError>
    {
        self.ensure_dir()?;
        let encoded = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            name: name.to_string(),
            source,
        })?;

        let path = self.path(name);
        let tmp = self.path(&format!("{name}.tmp"));
        fs::write(&tmp, encoded).map_err(|source| StorageError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Write { path, source })
    }
}

fn data_dir() -> Result<PathBuf, StorageError>
{
    if let Some(dir) = non_empty_var("KB_GAMES_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(base) = non_empty_var("XDG_DATA_HOME") {
        return Ok(PathBuf::from(base).join(APP_DIR));
    }
    let home = non_empty_var("HOME")
        .or_else(|| non_empty_var("USERPROFILE"))
        .ok_or(StorageError::NoDataDir)?;
    Ok(PathBuf::from(home).join(".local").join("share").join(APP_DIR))
}

fn non_empty_var(key: &str) -> Option<String>
{
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
