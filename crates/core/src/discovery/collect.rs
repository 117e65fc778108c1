use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{
    models::{Channel, RawGameRecord},
    slug::slugify,
};

use super::merge::GameIndex;

/// Per-game metadata file name shared by both layouts.
pub const METADATA_FILE: &str = "metadata.json";

/// Why a metadata file could not be used.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Expected absence; the caller treats it as "no data".
    #[error("{} does not exist", path.display())]
    Missing {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file is not valid JSON or not an object.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        /// Path that failed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse a JSON metadata file.
pub fn read_metadata(path: &Path) -> Result<Value, ScanError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ScanError::Missing {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(ScanError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&content).map_err(|source| ScanError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`read_metadata`] but logs and swallows failures.
fn load_metadata(path: &Path) -> Option<Value> {
    match read_metadata(path) {
        Ok(value) => Some(value),
        Err(ScanError::Missing { .. }) => None,
        Err(err) => {
            warn!("Ignoring metadata: {err}");
            None
        }
    }
}

fn raw_from_value(value: &Value, path: &Path) -> Option<RawGameRecord> {
    if !value.is_object() {
        warn!("Ignoring metadata {}: expected a JSON object", path.display());
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(raw) => Some(raw),
        Err(err) => {
            warn!("Ignoring metadata {}: {err}", path.display());
            None
        }
    }
}

/// Immediate, non-hidden subdirectories of `base_dir` sorted by name.
pub(crate) fn subdirectories(base_dir: &Path) -> Vec<PathBuf> {
    if !base_dir.is_dir() {
        debug!("Skipping {}: not a directory", base_dir.display());
        return Vec::new();
    }

    WalkDir::new(base_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Failed to read entry under {}: {err}", base_dir.display());
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.into_path())
        .collect()
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

/// Scan a modern layout root: one directory per game holding `metadata.json`.
///
/// Returns whether any `metadata.json` was present, even if it could not
/// be parsed.
pub fn collect_from_game_data(base_dir: &Path, index: &mut GameIndex) -> bool {
    let mut found = false;

    for game_dir in subdirectories(base_dir) {
        let meta_path = game_dir.join(METADATA_FILE);
        if !meta_path.is_file() {
            continue;
        }
        found = true;

        let Some(metadata) = load_metadata(&meta_path) else {
            continue;
        };
        let Some(base) = raw_from_value(&metadata, &meta_path) else {
            continue;
        };

        for raw in expand_channels(&game_dir, base, metadata.get("channels")) {
            if !index.upsert_raw(&raw) {
                warn!("Skipping {}: empty slug", meta_path.display());
            }
        }
    }

    found
}

/// Expand a game's metadata into one raw record per channel.
fn expand_channels(
    game_dir: &Path,
    mut base: RawGameRecord,
    channels: Option<&Value>,
) -> Vec<RawGameRecord> {
    if base.slug.as_deref().map(str::trim).unwrap_or_default().is_empty() {
        base.slug = Some(slugify(&dir_name(game_dir)));
    }
    base.location = Some(path_string(game_dir));

    let mut entries: Vec<(String, Option<RawGameRecord>)> = Vec::new();
    match channels {
        Some(Value::Object(map)) => {
            for (name, entry) in map {
                match entry {
                    Value::Null | Value::Bool(false) => continue,
                    Value::Object(_) => {
                        let overrides = serde_json::from_value::<RawGameRecord>(entry.clone())
                            .map_err(|err| {
                                warn!(
                                    "Ignoring {} channel overrides in {}: {err}",
                                    name,
                                    game_dir.display()
                                )
                            })
                            .ok();
                        entries.push((name.clone(), overrides));
                    }
                    _ => entries.push((name.clone(), None)),
                }
            }
        }
        Some(Value::Array(items)) => {
            for name in items.iter().filter_map(Value::as_str) {
                entries.push((name.to_string(), None));
            }
        }
        _ => {}
    }

    if entries.is_empty() {
        let name = base
            .channel
            .clone()
            .unwrap_or_else(|| Channel::Draft.as_str().to_string());
        entries.push((name, None));
    }

    entries
        .into_iter()
        .map(|(name, overrides)| {
            let mut raw = base.clone();
            if let Some(mut overrides) = overrides {
                overrides.slug = None;
                raw.overlay(&overrides);
            }
            raw.channel = Some(name.clone());
            let channel_dir = game_dir.join(name.trim());
            raw.source = Some(if !name.trim().is_empty() && channel_dir.is_dir() {
                path_string(&channel_dir)
            } else {
                path_string(game_dir)
            });
            raw
        })
        .collect()
}

/// Scan a legacy layout root: `draft/` and `published/` marker folders
/// beneath each game directory.
pub fn collect_from_legacy_base(base_dir: &Path, index: &mut GameIndex) {
    for game_dir in subdirectories(base_dir) {
        let meta_path = game_dir.join(METADATA_FILE);
        let mut base = load_metadata(&meta_path)
            .and_then(|metadata| raw_from_value(&metadata, &meta_path))
            .unwrap_or_default();

        if base.slug.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            base.slug = Some(slugify(&dir_name(&game_dir)));
        }
        base.location = Some(path_string(&game_dir));

        let markers: Vec<Channel> = Channel::all()
            .into_iter()
            .filter(|channel| game_dir.join(channel.as_str()).is_dir())
            .collect();

        if markers.is_empty() {
            let mut raw = base;
            raw.source = Some(path_string(&game_dir));
            if !index.upsert_raw(&raw) {
                debug!("Skipping legacy directory {}", game_dir.display());
            }
            continue;
        }

        for channel in markers {
            let mut raw = base.clone();
            raw.channel = Some(channel.as_str().to_string());
            raw.source = Some(path_string(&game_dir.join(channel.as_str())));
            if !index.upsert_raw(&raw) {
                debug!("Skipping legacy directory {}", game_dir.display());
            }
        }
    }
}
