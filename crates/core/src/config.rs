//! Application configuration loaded through the `config` crate.
//!
//! Precedence, lowest first: built-in defaults, the JSON file under the
//! user config directory, `ESCAPE_ADMIN__*` variables, and finally the
//! `GAME_FILES_DIR` / `GAMES_DIR` variables which prepend discovery roots.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::RawGameRecord;

/// Directory under the user config dir that holds all admin state.
pub const CONFIG_DIR_NAME: &str = "escape-admin";
/// Environment variable naming the modern layout root.
pub const GAME_FILES_DIR_ENV: &str = "GAME_FILES_DIR";
/// Environment variable naming the legacy layout root.
pub const GAMES_DIR_ENV: &str = "GAMES_DIR";

/// Runtime configuration shared by the server and the console.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Monorepo root that relative discovery paths are resolved against.
    pub workspace_root: PathBuf,
    /// Modern layout roots (per-slug `metadata.json`), in scan order.
    pub game_files_dirs: Vec<PathBuf>,
    /// Legacy layout roots (`draft/` / `published/` marker folders), in scan order.
    pub legacy_dirs: Vec<PathBuf>,
    /// Static entries merged into every discovery result.
    pub fallback_games: Vec<FallbackGame>,
    /// Socket address the API server binds to.
    pub listen_addr: String,
    /// Base URL the console uses to reach the API server.
    pub api_base_url: String,
    /// Directory for the local snapshot cache.
    pub snapshot_dir: PathBuf,
}

/// Entry of the static fallback table.
///
/// Field names stay snake_case because the `config` crate folds keys to
/// lowercase before deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackGame {
    /// Game slug.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Channel label, `draft` or `published`.
    pub channel: String,
    /// Cover image URL or path.
    pub cover_image: String,
    /// Short marketing blurb.
    pub short_description: String,
    /// Game type label.
    #[serde(rename = "type")]
    pub game_type: String,
    /// Play mode label.
    pub mode: String,
}

impl FallbackGame {
    fn new(slug: &str, title: &str, channel: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            channel: channel.to_string(),
            ..Self::default()
        }
    }

    /// Convert into the raw record shape consumed by discovery.
    pub fn to_raw(&self) -> RawGameRecord {
        RawGameRecord {
            slug: Some(self.slug.clone()),
            title: Some(self.title.clone()),
            channel: Some(self.channel.clone()),
            cover_image: Some(self.cover_image.clone()),
            short_description: Some(self.short_description.clone()),
            game_type: Some(self.game_type.clone()),
            mode: Some(self.mode.clone()),
            source: Some("fallback".to_string()),
            location: Some("virtual".to_string()),
            ..RawGameRecord::default()
        }
    }
}

/// Built-in fallback table used when the config file does not override it.
pub fn default_fallback_games() -> Vec<FallbackGame> {
    vec![FallbackGame::new("default", "Default Game", "published")]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("."),
            game_files_dirs: vec![
                PathBuf::from("apps/game-web/public/game-data"),
                PathBuf::from("apps/admin/public/game-data"),
            ],
            legacy_dirs: vec![
                PathBuf::from("apps/game-web/public/games"),
                PathBuf::from("apps/admin/public/games"),
            ],
            fallback_games: default_fallback_games(),
            listen_addr: "127.0.0.1:4010".to_string(),
            api_base_url: "http://127.0.0.1:4010".to_string(),
            snapshot_dir: default_config_root(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path` (optional) plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Json)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("ESCAPE_ADMIN")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("game_files_dirs")
                    .with_list_parse_key("legacy_dirs"),
            )
            .build()
            .with_context(|| format!("failed to build configuration from {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        Ok(config.with_env_dirs(
            env::var(GAME_FILES_DIR_ENV).ok(),
            env::var(GAMES_DIR_ENV).ok(),
        ))
    }

    /// Prepend the explicitly configured discovery roots.
    pub fn with_env_dirs(mut self, game_files_dir: Option<String>, games_dir: Option<String>) -> Self {
        if let Some(dir) = game_files_dir.filter(|value| !value.trim().is_empty()) {
            self.game_files_dirs.insert(0, PathBuf::from(dir.trim()));
        }
        if let Some(dir) = games_dir.filter(|value| !value.trim().is_empty()) {
            self.legacy_dirs.insert(0, PathBuf::from(dir.trim()));
        }
        self
    }

    /// Resolve a possibly relative path against the workspace root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    /// Resolved modern layout candidates with duplicates removed.
    pub fn modern_candidates(&self) -> Vec<PathBuf> {
        self.resolve_all(&self.game_files_dirs)
    }

    /// Resolved legacy layout candidates with duplicates removed.
    pub fn legacy_candidates(&self) -> Vec<PathBuf> {
        self.resolve_all(&self.legacy_dirs)
    }

    fn resolve_all(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut resolved: Vec<PathBuf> = Vec::new();
        for path in paths {
            let candidate = self.resolve(path);
            if !resolved.contains(&candidate) {
                resolved.push(candidate);
            }
        }
        resolved
    }
}

/// Root directory for admin state under the user's config directory.
pub fn default_config_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Location of the JSON configuration file.
pub fn config_path() -> PathBuf {
    default_config_root().join("config.json")
}

/// Write the default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let serialized = serde_json::to_string_pretty(&AppConfig::default())
        .context("failed to serialize default configuration")?;
    fs::write(path, serialized)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}
