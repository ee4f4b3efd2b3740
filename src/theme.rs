//! Persisted light/dark preference.
//!
//! The preference lives in a tiny TOML file keyed by a storage key, so several
//! keys can share one file. A stored value always wins over the configured default.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
  Light,
  Dark,
  #[default]
  System,
}

impl Theme {
  pub fn as_str(self) -> &'static str {
    match self {
      Theme::Light => "light",
      Theme::Dark => "dark",
      Theme::System => "system",
    }
  }
}

impl fmt::Display for Theme {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Theme {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "light" => Ok(Theme::Light),
      "dark" => Ok(Theme::Dark),
      "system" => Ok(Theme::System),
      other => Err(format!("unknown theme '{}'", other)),
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
  #[error("theme file I/O: {0}")]
  Io(#[from] std::io::Error),
  #[error("theme file is not valid TOML: {0}")]
  Parse(#[from] toml::de::Error),
  #[error("theme serialization: {0}")]
  Serialize(#[from] toml::ser::Error),
  #[error("theme writer task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ThemeFile {
  #[serde(default)]
  themes: BTreeMap<String, Theme>,
}

/// File-backed key/value store for the preference.
#[derive(Clone, Debug)]
pub struct ThemeStore {
  path: PathBuf,
  storage_key: String,
}

impl ThemeStore {
  pub fn new(path: impl Into<PathBuf>, storage_key: impl Into<String>) -> Self {
    Self { path: path.into(), storage_key: storage_key.into() }
  }

  pub fn storage_key(&self) -> &str {
    &self.storage_key
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Stored preference, if any. A missing file is not an error.
  pub fn load(&self) -> Result<Option<Theme>, ThemeError> {
    let file = self.read_file()?;
    Ok(file.themes.get(&self.storage_key).copied())
  }

  pub fn store(&self, theme: Theme) -> Result<(), ThemeError> {
    let mut file = self.read_file()?;
    file.themes.insert(self.storage_key.clone(), theme);
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&self.path, toml::to_string(&file)?)?;
    Ok(())
  }

  fn read_file(&self) -> Result<ThemeFile, ThemeError> {
    match std::fs::read_to_string(&self.path) {
      Ok(s) => Ok(toml::from_str(&s)?),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ThemeFile::default()),
      Err(e) => Err(e.into()),
    }
  }
}

/// Holds the effective theme and writes changes through to the store.
pub struct ThemeProvider {
  store: ThemeStore,
  current: RwLock<Theme>,
}

impl ThemeProvider {
  /// Apply the persisted preference when present, otherwise `default`.
  /// An unreadable file is logged and treated as "nothing stored".
  #[instrument(level = "info", skip(store), fields(path = %store.path().display(), key = %store.storage_key()))]
  pub fn new(store: ThemeStore, default: Theme) -> Self {
    let current = match store.load() {
      Ok(Some(stored)) => {
        info!(target: "quizgen_backend", theme = %stored, "Applied stored theme");
        stored
      }
      Ok(None) => default,
      Err(e) => {
        warn!(target: "quizgen_backend", error = %e, "Could not read stored theme; using default");
        default
      }
    };
    Self { store, current: RwLock::new(current) }
  }

  pub fn storage_key(&self) -> &str {
    self.store.storage_key()
  }

  pub async fn current(&self) -> Theme {
    *self.current.read().await
  }

  /// Persist first, then switch; a failed write leaves the current theme untouched.
  /// The file write runs on the blocking pool; the write guard serializes writers.
  #[instrument(level = "info", skip(self), fields(%theme))]
  pub async fn set(&self, theme: Theme) -> Result<(), ThemeError> {
    let mut current = self.current.write().await;
    let store = self.store.clone();
    tokio::task::spawn_blocking(move || store.store(theme)).await??;
    *current = theme;
    Ok(())
  }
}
