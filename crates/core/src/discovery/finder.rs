use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    models::{GameRecord, RawGameRecord},
};

use super::{
    collect::{collect_from_game_data, collect_from_legacy_base},
    merge::GameIndex,
};

/// Slug of the synthetic entry that is always present.
pub const DEFAULT_SLUG: &str = "default";

/// Directories and static entries a discovery pass draws from.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryRoots {
    /// Modern layout roots, scanned first.
    pub modern: Vec<PathBuf>,
    /// Legacy layout roots, scanned only when no modern metadata exists.
    pub legacy: Vec<PathBuf>,
    /// Static fallback table, merged after the scans.
    pub fallback: Vec<RawGameRecord>,
}

impl DiscoveryRoots {
    /// Derive roots from resolved configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            modern: config.modern_candidates(),
            legacy: config.legacy_candidates(),
            fallback: config
                .fallback_games
                .iter()
                .map(|entry| entry.to_raw())
                .collect(),
        }
    }
}

/// Result of one discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesListing {
    /// Candidate directories that existed and were scanned.
    pub base_dirs: Vec<String>,
    /// Deduplicated, sorted records.
    pub games: Vec<GameRecord>,
}

/// The synthetic `default` record added when no scan produced one.
pub fn default_record() -> RawGameRecord {
    RawGameRecord {
        slug: Some(DEFAULT_SLUG.to_string()),
        title: Some("Default Game".to_string()),
        source: Some("virtual".to_string()),
        location: Some("virtual".to_string()),
        ..RawGameRecord::default()
    }
}

/// Discover every known game. Never fails; unreadable data is logged and
/// the result degrades to the fallback table.
pub fn find_games(roots: &DiscoveryRoots) -> GamesListing {
    let mut index = GameIndex::new();
    let mut base_dirs = Vec::new();
    let mut found_metadata = false;

    for dir in &roots.modern {
        if !dir.is_dir() {
            debug!("Modern game directory {} not present", dir.display());
            continue;
        }
        base_dirs.push(dir.display().to_string());
        found_metadata |= collect_from_game_data(dir, &mut index);
    }

    if !found_metadata {
        for dir in &roots.legacy {
            if !dir.is_dir() {
                debug!("Legacy game directory {} not present", dir.display());
                continue;
            }
            base_dirs.push(dir.display().to_string());
            collect_from_legacy_base(dir, &mut index);
        }
    }

    if !index.contains_slug(DEFAULT_SLUG) {
        index.upsert_raw(&default_record());
    }
    for raw in &roots.fallback {
        index.upsert_raw(raw);
    }

    let games = index.into_sorted();
    info!(
        total = games.len(),
        dirs = base_dirs.len(),
        legacy = !found_metadata,
        "Discovered games"
    );
    GamesListing { base_dirs, games }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::default_fallback_games, discovery::METADATA_FILE, models::Channel};
    use anyhow::Result;
    use std::{collections::HashSet, fs};
    use tempfile::tempdir;

    fn roots(modern: Vec<PathBuf>, legacy: Vec<PathBuf>) -> DiscoveryRoots {
        DiscoveryRoots {
            modern,
            legacy,
            fallback: default_fallback_games().iter().map(|g| g.to_raw()).collect(),
        }
    }

    #[test]
    fn always_contains_default_when_nothing_exists() {
        let listing = find_games(&roots(
            vec![PathBuf::from("/missing/modern")],
            vec![PathBuf::from("/missing/legacy")],
        ));
        assert!(listing.base_dirs.is_empty());
        assert!(listing.games.iter().any(|g| g.slug == DEFAULT_SLUG));
        assert_eq!(listing.games[0].slug, DEFAULT_SLUG);

        let empty = find_games(&DiscoveryRoots::default());
        assert_eq!(empty.games.len(), 1);
        assert_eq!(empty.games[0].source, "virtual");
    }

    #[test]
    fn modern_metadata_suppresses_legacy_scan() -> Result<()> {
        let modern = tempdir()?;
        let legacy = tempdir()?;
        let game = modern.path().join("harbor");
        fs::create_dir_all(&game)?;
        fs::write(game.join(METADATA_FILE), r#"{ "title": "Harbor" }"#)?;
        fs::create_dir_all(legacy.path().join("forest").join("draft"))?;

        let listing = find_games(&roots(
            vec![modern.path().to_path_buf()],
            vec![legacy.path().to_path_buf()],
        ));
        assert_eq!(listing.base_dirs, vec![modern.path().display().to_string()]);
        assert!(listing.games.iter().any(|g| g.slug == "harbor"));
        assert!(!listing.games.iter().any(|g| g.slug == "forest"));
        Ok(())
    }

    #[test]
    fn legacy_scan_runs_without_modern_metadata() -> Result<()> {
        let modern = tempdir()?;
        let legacy = tempdir()?;
        fs::create_dir_all(modern.path().join("empty-game"))?;
        fs::create_dir_all(legacy.path().join("forest").join("published"))?;

        let listing = find_games(&roots(
            vec![modern.path().to_path_buf()],
            vec![legacy.path().to_path_buf()],
        ));
        assert_eq!(listing.base_dirs.len(), 2);
        let forest = listing
            .games
            .iter()
            .find(|g| g.slug == "forest")
            .expect("forest discovered");
        assert_eq!(forest.channel, Channel::Published);
        Ok(())
    }

    #[test]
    fn fallback_entries_merge_with_discovered_ones() -> Result<()> {
        let modern = tempdir()?;
        let game = modern.path().join("default");
        fs::create_dir_all(&game)?;
        fs::write(
            game.join(METADATA_FILE),
            r#"{ "channels": { "published": { "coverImage": "/c.png" } } }"#,
        )?;

        let listing = find_games(&roots(vec![modern.path().to_path_buf()], Vec::new()));
        let defaults: Vec<&GameRecord> = listing
            .games
            .iter()
            .filter(|g| g.slug == DEFAULT_SLUG)
            .collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].title, "default");
        assert_eq!(defaults[0].cover_image, "/c.png");
        assert_eq!(defaults[0].source, game.display().to_string());

        let keys: HashSet<_> = listing.games.iter().map(GameRecord::key).collect();
        assert_eq!(keys.len(), listing.games.len());
        Ok(())
    }

    #[test]
    fn listing_serializes_camel_case() {
        let listing = find_games(&DiscoveryRoots::default());
        let value = serde_json::to_value(&listing).expect("json");
        assert!(value.get("baseDirs").is_some());
        assert!(value["games"].is_array());
    }
}
