//! Publish operations against the on-disk game directories.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    discovery::{
        collect::{read_metadata, subdirectories},
        ScanError, METADATA_FILE,
    },
    models::{Channel, RawGameRecord},
    slug::{normalize_slug, slugify},
};

/// Identifies the game to publish. At least one field must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishKey {
    /// Value of the `id` field in the game's metadata. Numbers are accepted.
    #[serde(
        default,
        deserialize_with = "crate::models::lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Game slug.
    #[serde(
        default,
        deserialize_with = "crate::models::lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub slug: Option<String>,
}

/// A publish request without any usable key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("id or slug is required")]
pub struct PublishKeyError;

impl PublishKey {
    /// Key that looks a game up by slug.
    pub fn slug(slug: impl Into<String>) -> Self {
        Self {
            id: None,
            slug: Some(slug.into()),
        }
    }

    /// Key that looks a game up by metadata id.
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            slug: None,
        }
    }

    fn id_value(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    fn slug_value(&self) -> Option<String> {
        self.slug
            .as_deref()
            .map(normalize_slug)
            .filter(|slug| !slug.is_empty())
    }

    /// Reject keys where neither field carries a value.
    pub fn validate(&self) -> Result<(), PublishKeyError> {
        if self.id_value().is_none() && self.slug_value().is_none() {
            return Err(PublishKeyError);
        }
        Ok(())
    }
}

/// Failure while updating the datastore.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request did not name a game.
    #[error(transparent)]
    InvalidKey(#[from] PublishKeyError),
    /// Existing metadata could not be read.
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// Existing metadata is valid JSON but not an object.
    #[error("{} is not a JSON object", path.display())]
    NotAnObject {
        /// Offending file.
        path: PathBuf,
    },
    /// Writing the updated metadata failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Target file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// What a publish call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The game was found and its metadata rewritten.
    Published {
        /// Slug of the published game.
        slug: String,
        /// Metadata file that was written.
        path: PathBuf,
    },
    /// No game matched the key; nothing was written.
    NotFound,
}

/// Datastore seam used by the API server.
pub trait GameStore: Send + Sync {
    /// Mark the matching game as published and bump its update time.
    fn publish(&self, key: &PublishKey) -> Result<PublishOutcome, StoreError>;
}

/// [`GameStore`] backed by the modern and legacy game directories.
#[derive(Debug, Clone, Default)]
pub struct FsGameStore {
    modern: Vec<PathBuf>,
    legacy: Vec<PathBuf>,
}

struct Located {
    game_dir: PathBuf,
    slug: String,
    legacy: bool,
}

impl FsGameStore {
    /// Build a store over explicit directory lists.
    pub fn new(modern: Vec<PathBuf>, legacy: Vec<PathBuf>) -> Self {
        Self { modern, legacy }
    }

    /// Build a store over the configured discovery roots.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.modern_candidates(), config.legacy_candidates())
    }

    fn roots(&self) -> impl Iterator<Item = (&PathBuf, bool)> {
        self.modern
            .iter()
            .map(|dir| (dir, false))
            .chain(self.legacy.iter().map(|dir| (dir, true)))
    }

    fn locate(&self, key: &PublishKey) -> Option<Located> {
        if let Some(slug) = key.slug_value().filter(|slug| is_path_component(slug)) {
            for (root, legacy) in self.roots() {
                let direct = root.join(&slug);
                if direct.is_dir() {
                    return Some(Located {
                        game_dir: direct,
                        slug,
                        legacy,
                    });
                }
            }
        }

        let wanted_slug = key.slug_value();
        let wanted_id = key.id_value();
        for (root, legacy) in self.roots() {
            for game_dir in subdirectories(root) {
                let metadata = read_metadata(&game_dir.join(METADATA_FILE)).ok();
                let raw = metadata
                    .as_ref()
                    .and_then(|value| serde_json::from_value::<RawGameRecord>(value.clone()).ok())
                    .unwrap_or_default();
                let slug = raw
                    .slug
                    .as_deref()
                    .map(normalize_slug)
                    .filter(|slug| !slug.is_empty())
                    .unwrap_or_else(|| {
                        slugify(&game_dir.file_name().unwrap_or_default().to_string_lossy())
                    });
                let id = metadata
                    .as_ref()
                    .and_then(|value| value.get("id"))
                    .map(|id| match id {
                        Value::String(s) => s.trim().to_string(),
                        other => other.to_string(),
                    });

                let slug_matches = wanted_slug.as_deref() == Some(slug.as_str());
                let id_matches = wanted_id.is_some() && id.as_deref() == wanted_id;
                if slug_matches || id_matches {
                    return Some(Located {
                        game_dir,
                        slug,
                        legacy,
                    });
                }
            }
        }
        None
    }
}

impl GameStore for FsGameStore {
    fn publish(&self, key: &PublishKey) -> Result<PublishOutcome, StoreError> {
        key.validate()?;

        let Some(located) = self.locate(key) else {
            warn!(id = ?key.id, slug = ?key.slug, "Publish matched no game");
            return Ok(PublishOutcome::NotFound);
        };

        let meta_path = located.game_dir.join(METADATA_FILE);
        let mut metadata = match read_metadata(&meta_path) {
            Ok(value) => value,
            Err(ScanError::Missing { .. }) => json!({}),
            Err(err) => return Err(err.into()),
        };
        let Value::Object(map) = &mut metadata else {
            return Err(StoreError::NotAnObject { path: meta_path });
        };

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        mark_published(map, &now);

        if located.legacy && located.game_dir.join(Channel::Draft.as_str()).is_dir() {
            let marker = located.game_dir.join(Channel::Published.as_str());
            fs::create_dir_all(&marker).map_err(|source| StoreError::Write {
                path: marker.clone(),
                source,
            })?;
        }

        write_metadata(&meta_path, &metadata)?;
        info!(slug = %located.slug, path = %meta_path.display(), "Game published");
        Ok(PublishOutcome::Published {
            slug: located.slug,
            path: meta_path,
        })
    }
}

fn is_path_component(value: &str) -> bool {
    value != "." && value != ".." && !value.contains(['/', '\\'])
}

fn mark_published(map: &mut Map<String, Value>, now: &str) {
    map.insert("channel".to_string(), json!(Channel::Published.as_str()));
    map.insert("updatedAt".to_string(), json!(now));

    if let Some(Value::Object(channels)) = map.get_mut("channels") {
        let already = matches!(
            channels.get(Channel::Published.as_str()),
            Some(value) if !value.is_null() && *value != Value::Bool(false)
        );
        if !already {
            let seed = channels
                .get(Channel::Draft.as_str())
                .filter(|value| value.is_object())
                .cloned()
                .unwrap_or_else(|| json!({}));
            channels.insert(Channel::Published.as_str().to_string(), seed);
        }
        if let Some(Value::Object(entry)) = channels.get_mut(Channel::Published.as_str()) {
            entry.insert("updatedAt".to_string(), json!(now));
        }
    }
}

fn write_metadata(path: &Path, metadata: &Value) -> Result<(), StoreError> {
    let serialised = serde_json::to_vec_pretty(metadata).map_err(|err| StoreError::Write {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidData, err),
    })?;
    fs::write(path, serialised).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{find_games, DiscoveryRoots};
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn key_requires_id_or_slug() {
        assert_eq!(PublishKey::default().validate(), Err(PublishKeyError));
        assert_eq!(PublishKey::slug("  ").validate(), Err(PublishKeyError));
        assert!(PublishKey::id("42").validate().is_ok());

        let store = FsGameStore::default();
        assert!(matches!(
            store.publish(&PublishKey::default()),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn publishes_by_slug_and_adds_channel_entry() -> Result<()> {
        let modern = tempdir()?;
        let game = modern.path().join("harbor");
        fs::create_dir_all(&game)?;
        fs::write(
            game.join(METADATA_FILE),
            r#"{ "title": "Harbor", "channels": { "draft": { "title": "Harbor WIP" } } }"#,
        )?;

        let store = FsGameStore::new(vec![modern.path().to_path_buf()], Vec::new());
        let outcome = store.publish(&PublishKey::slug("Harbor"))?;
        assert!(matches!(outcome, PublishOutcome::Published { ref slug, .. } if slug == "harbor"));

        let metadata = read_metadata(&game.join(METADATA_FILE))?;
        assert_eq!(metadata["channel"], json!("published"));
        assert_eq!(metadata["channels"]["published"]["title"], json!("Harbor WIP"));
        assert!(metadata["updatedAt"].as_str().is_some());

        let listing = find_games(&DiscoveryRoots {
            modern: vec![modern.path().to_path_buf()],
            ..DiscoveryRoots::default()
        });
        assert!(listing
            .games
            .iter()
            .any(|g| g.slug == "harbor" && g.channel == Channel::Published));
        Ok(())
    }

    #[test]
    fn traversal_slugs_never_escape_the_roots() -> Result<()> {
        let root = tempdir()?;
        let modern = root.path().join("modern");
        fs::create_dir_all(&modern)?;
        fs::create_dir_all(root.path().join("outside"))?;

        let store = FsGameStore::new(vec![modern], Vec::new());
        assert_eq!(
            store.publish(&PublishKey::slug("../outside"))?,
            PublishOutcome::NotFound
        );
        assert!(!root.path().join("outside").join(METADATA_FILE).exists());
        Ok(())
    }

    #[test]
    fn publishes_by_id() -> Result<()> {
        let modern = tempdir()?;
        let game = modern.path().join("lake-run");
        fs::create_dir_all(&game)?;
        fs::write(game.join(METADATA_FILE), r#"{ "id": 7, "channel": "draft" }"#)?;

        let store = FsGameStore::new(vec![modern.path().to_path_buf()], Vec::new());
        let outcome = store.publish(&PublishKey::id("7"))?;
        assert!(matches!(outcome, PublishOutcome::Published { ref slug, .. } if slug == "lake-run"));
        assert_eq!(
            store.publish(&PublishKey::id("8"))?,
            PublishOutcome::NotFound
        );
        Ok(())
    }

    #[test]
    fn numeric_id_in_request_body_is_accepted() -> Result<()> {
        let key: PublishKey = serde_json::from_str(r#"{ "id": 7 }"#)?;
        assert_eq!(key, PublishKey::id("7"));
        let key: PublishKey = serde_json::from_str(r#"{ "id": null, "slug": "harbor" }"#)?;
        assert_eq!(key, PublishKey::slug("harbor"));
        Ok(())
    }

    #[test]
    fn legacy_game_gets_published_marker() -> Result<()> {
        let legacy = tempdir()?;
        let game = legacy.path().join("forest");
        fs::create_dir_all(game.join("draft"))?;

        let store = FsGameStore::new(Vec::new(), vec![legacy.path().to_path_buf()]);
        store.publish(&PublishKey::slug("forest"))?;
        assert!(game.join("published").is_dir());
        assert!(game.join(METADATA_FILE).is_file());
        Ok(())
    }

    #[test]
    fn malformed_metadata_is_a_store_error() -> Result<()> {
        let modern = tempdir()?;
        let game = modern.path().join("broken");
        fs::create_dir_all(&game)?;
        fs::write(game.join(METADATA_FILE), "[]")?;

        let store = FsGameStore::new(vec![modern.path().to_path_buf()], Vec::new());
        assert!(matches!(
            store.publish(&PublishKey::slug("broken")),
            Err(StoreError::NotAnObject { .. })
        ));
        Ok(())
    }
}
