//! Local offline cache of per-game draft snapshots.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{
    config::{default_config_root, AppConfig},
    models::Channel,
    slug::normalize_slug,
};

/// File holding every snapshot, named after the browser storage key
/// `erix.localSnapshots.v1`.
pub const SNAPSHOTS_FILE: &str = "local-snapshots.v1.json";
/// File holding the cached default map position (`erix.defaultGeoLocation`).
pub const GEO_LOCATION_FILE: &str = "default-geo-location.json";

const SNAPSHOT_VERSION: u32 = 1;

/// Cached JSON for one `(slug, channel)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Normalised slug.
    pub slug: String,
    /// Channel the snapshot was taken from.
    pub channel: Channel,
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
    /// Arbitrary editor payload.
    #[serde(default)]
    pub data: Value,
}

/// Default latitude/longitude for newly placed devices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoLocation {
    /// Build a location, rejecting out-of-range coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(anyhow!("coordinates out of range: {lat}, {lng}"));
        }
        Ok(Self { lat, lng })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    snapshots: BTreeMap<String, Snapshot>,
}

fn snapshot_key(slug: &str, channel: Channel) -> String {
    format!("{}:{}", normalize_slug(slug), channel)
}

/// Reads and writes the snapshot and geo-location files.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    root: PathBuf,
}

impl SnapshotCache {
    /// Create a cache rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache rooted at the configured snapshot directory.
    pub fn load(config: &AppConfig) -> Self {
        Self::new(config.snapshot_dir.clone())
    }

    /// Default location under the user's config directory.
    pub fn default_root() -> PathBuf {
        default_config_root()
    }

    /// Directory the cache files live in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot for `(slug, channel)`, if any.
    pub fn get(&self, slug: &str, channel: Channel) -> Result<Option<Snapshot>> {
        let file = self.read_snapshots()?;
        Ok(file.snapshots.get(&snapshot_key(slug, channel)).cloned())
    }

    /// Store `data` as the snapshot for `(slug, channel)`, replacing any
    /// previous one.
    pub fn put(&self, slug: &str, channel: Channel, data: Value) -> Result<Snapshot> {
        let slug = normalize_slug(slug);
        if slug.is_empty() {
            return Err(anyhow!("cannot snapshot a game without a slug"));
        }

        let mut file = self.read_snapshots()?;
        let snapshot = Snapshot {
            slug: slug.clone(),
            channel,
            saved_at: Utc::now(),
            data,
        };
        file.snapshots
            .insert(snapshot_key(&slug, channel), snapshot.clone());
        self.write_snapshots(&mut file)?;
        Ok(snapshot)
    }

    /// Drop the snapshot for `(slug, channel)`; returns whether one existed.
    pub fn remove(&self, slug: &str, channel: Channel) -> Result<bool> {
        let mut file = self.read_snapshots()?;
        let removed = file.snapshots.remove(&snapshot_key(slug, channel)).is_some();
        if removed {
            self.write_snapshots(&mut file)?;
        }
        Ok(removed)
    }

    /// All snapshots, most recent first.
    pub fn entries(&self) -> Result<Vec<Snapshot>> {
        let file = self.read_snapshots()?;
        let mut entries: Vec<Snapshot> = file.snapshots.into_values().collect();
        entries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(entries)
    }

    /// Cached default map position.
    pub fn default_location(&self) -> Result<Option<GeoLocation>> {
        let path = self.root.join(GEO_LOCATION_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        match serde_json::from_str(&content) {
            Ok(location) => Ok(Some(location)),
            Err(err) => {
                warn!("Ignoring corrupt geo location {}: {err}", path.display());
                Ok(None)
            }
        }
    }

    /// Replace the cached default map position.
    pub fn set_default_location(&self, location: GeoLocation) -> Result<()> {
        let path = self.root.join(GEO_LOCATION_FILE);
        self.write_json(&path, &location)
    }

    fn read_snapshots(&self) -> Result<SnapshotFile> {
        let path = self.root.join(SNAPSHOTS_FILE);
        if !path.exists() {
            return Ok(SnapshotFile::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        match serde_json::from_str(&content) {
            Ok(file) => Ok(file),
            Err(err) => {
                warn!("Ignoring corrupt snapshot cache {}: {err}", path.display());
                Ok(SnapshotFile::default())
            }
        }
    }

    fn write_snapshots(&self, file: &mut SnapshotFile) -> Result<()> {
        file.version = SNAPSHOT_VERSION;
        let path = self.root.join(SNAPSHOTS_FILE);
        self.write_json(&path, file)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        let serialised = serde_json::to_vec_pretty(value)?;
        fs::write(path, serialised).with_context(|| format!("failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn snapshot_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let cache = SnapshotCache::new(dir.path().join("cache"));
        assert!(cache.get("harbor", Channel::Draft)?.is_none());

        cache.put(" Harbor ", Channel::Draft, json!({ "missions": [] }))?;
        cache.put("harbor", Channel::Published, json!({ "missions": [1] }))?;
        let latest = cache.put("harbor", Channel::Draft, json!({ "missions": [2] }))?;

        let draft = cache.get("HARBOR", Channel::Draft)?.expect("draft snapshot");
        assert_eq!(draft.data, json!({ "missions": [2] }));
        assert_eq!(draft.saved_at, latest.saved_at);

        let entries = cache.entries()?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].channel, Channel::Draft);

        assert!(cache.remove("harbor", Channel::Published)?);
        assert!(!cache.remove("harbor", Channel::Published)?);
        assert_eq!(cache.entries()?.len(), 1);
        Ok(())
    }

    #[test]
    fn corrupt_cache_reads_as_empty() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join(SNAPSHOTS_FILE), "{{{")?;
        fs::write(dir.path().join(GEO_LOCATION_FILE), "nope")?;
        let cache = SnapshotCache::new(dir.path());
        assert!(cache.entries()?.is_empty());
        assert!(cache.default_location()?.is_none());

        cache.put("lake", Channel::Draft, Value::Null)?;
        assert_eq!(cache.entries()?.len(), 1);
        Ok(())
    }

    #[test]
    fn default_location_is_persisted() -> Result<()> {
        let dir = tempdir()?;
        let cache = SnapshotCache::new(dir.path());
        assert!(cache.default_location()?.is_none());
        cache.set_default_location(GeoLocation::new(59.3293, 18.0686)?)?;
        let location = cache.default_location()?.expect("location");
        assert_eq!(location.lat, 59.3293);
        assert!(GeoLocation::new(91.0, 0.0).is_err());
        Ok(())
    }

    #[test]
    fn empty_slug_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let cache = SnapshotCache::new(dir.path());
        assert!(cache.put("  ", Channel::Draft, Value::Null).is_err());
    }
}
