use std::collections::HashMap;

use crate::models::{normalize_record, GameKey, GameRecord, RawGameRecord};

use super::sort::sort_games;

/// Reconcile two records that share a `(slug, channel)` key.
///
/// Descriptive fields keep the existing value unless it is empty, the
/// lexicographically greater `updated_at` wins, and provenance fields are
/// only filled when missing.
pub fn merge_game(existing: &GameRecord, incoming: &GameRecord) -> GameRecord {
    let mut merged = existing.clone();

    prefer_existing(&mut merged.title, &incoming.title);
    prefer_existing(&mut merged.cover_image, &incoming.cover_image);
    prefer_existing(&mut merged.game_type, &incoming.game_type);
    prefer_existing(&mut merged.mode, &incoming.mode);
    prefer_existing(&mut merged.short_description, &incoming.short_description);

    if incoming.updated_at > merged.updated_at {
        merged.updated_at = incoming.updated_at.clone();
    }

    prefer_existing(&mut merged.created_at, &incoming.created_at);
    prefer_existing(&mut merged.source, &incoming.source);
    prefer_existing(&mut merged.location, &incoming.location);

    merged
}

fn prefer_existing(target: &mut String, incoming: &str) {
    if target.is_empty() && !incoming.is_empty() {
        *target = incoming.to_string();
    }
}

/// Records of one discovery pass keyed by `(slug, channel)`.
#[derive(Debug, Default, Clone)]
pub struct GameIndex {
    records: HashMap<GameKey, GameRecord>,
}

impl GameIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, merging into any record with the same key.
    pub fn upsert(&mut self, record: GameRecord) {
        let key = record.key();
        let merged = match self.records.get(&key) {
            Some(existing) => merge_game(existing, &record),
            None => record,
        };
        self.records.insert(key, merged);
    }

    /// Normalise and upsert a raw record; returns false when it was skipped.
    pub fn upsert_raw(&mut self, raw: &RawGameRecord) -> bool {
        match normalize_record(raw) {
            Some(record) => {
                self.upsert(record);
                true
            }
            None => false,
        }
    }

    /// Whether any channel of `slug` is present.
    pub fn contains_slug(&self, slug: &str) -> bool {
        self.records.keys().any(|key| key.slug == slug)
    }

    /// Look up a record by key.
    pub fn get(&self, key: &GameKey) -> Option<&GameRecord> {
        self.records.get(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the index and return records in display order.
    pub fn into_sorted(self) -> Vec<GameRecord> {
        let mut games: Vec<GameRecord> = self.records.into_values().collect();
        sort_games(&mut games);
        games
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Channel;

    fn record(slug: &str, channel: &str) -> GameRecord {
        normalize_record(&RawGameRecord {
            slug: Some(slug.to_string()),
            channel: Some(channel.to_string()),
            ..RawGameRecord::default()
        })
        .expect("valid record")
    }

    #[test]
    fn existing_non_empty_fields_win() {
        let mut existing = record("harbor", "draft");
        existing.title = "Harbor Hunt".to_string();
        existing.updated_at = "2024-01-01T00:00:00Z".to_string();

        let mut incoming = record("harbor", "draft");
        incoming.title = "Old Harbor".to_string();
        incoming.cover_image = "/covers/harbor.png".to_string();
        incoming.updated_at = "2024-03-01T00:00:00Z".to_string();
        incoming.source = "/data/harbor".to_string();

        let merged = merge_game(&existing, &incoming);
        assert_eq!(merged.title, "Harbor Hunt");
        assert_eq!(merged.cover_image, "/covers/harbor.png");
        assert_eq!(merged.updated_at, "2024-03-01T00:00:00Z");
        assert_eq!(merged.source, "/data/harbor");
    }

    #[test]
    fn older_incoming_timestamp_is_ignored() {
        let mut existing = record("harbor", "draft");
        existing.updated_at = "2024-05-01T00:00:00Z".to_string();
        existing.created_at = "2023-01-01T00:00:00Z".to_string();
        let mut incoming = record("harbor", "draft");
        incoming.updated_at = "2024-02-01T00:00:00Z".to_string();
        incoming.created_at = "2022-01-01T00:00:00Z".to_string();

        let merged = merge_game(&existing, &incoming);
        assert_eq!(merged.updated_at, "2024-05-01T00:00:00Z");
        assert_eq!(merged.created_at, "2023-01-01T00:00:00Z");
    }

    #[test]
    fn merging_same_record_twice_is_idempotent() {
        let mut a = record("harbor", "published");
        a.mode = "team".to_string();
        let mut b = record("harbor", "published");
        b.title = "Harbor".to_string();
        b.short_description = "Find the lighthouse".to_string();
        b.updated_at = "2024-06-01".to_string();
        b.location = "/data".to_string();

        let once = merge_game(&a, &b);
        let twice = merge_game(&once, &b);
        assert_eq!(once, twice);
    }

    #[test]
    fn index_keeps_one_record_per_key() {
        let mut index = GameIndex::new();
        for (slug, channel) in [
            ("a", "draft"),
            ("A ", "draft"),
            ("a", "published"),
            ("b", "draft"),
            ("a", "bogus"),
        ] {
            index.upsert(record(slug, channel));
        }
        assert!(!index.upsert_raw(&RawGameRecord::default()));

        assert_eq!(index.len(), 3);
        assert!(index.contains_slug("a"));
        assert!(index.get(&GameKey::new("a", Channel::Published)).is_some());

        let games = index.into_sorted();
        let keys: Vec<String> = games.iter().map(|g| g.key().to_string()).collect();
        assert_eq!(keys, vec!["a@published", "a@draft", "b@draft"]);
    }
}
