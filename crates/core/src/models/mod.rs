//! Shared domain models.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::slug::normalize_slug;

/// Which version of a game's content a record describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Work-in-progress content edited in the admin.
    #[default]
    Draft,
    /// Content served to players.
    Published,
}

impl Channel {
    /// Coerce an arbitrary channel label; anything but exactly `published`
    /// is a draft.
    pub fn from_raw(value: &str) -> Self {
        if value == "published" {
            Channel::Published
        } else {
            Channel::Draft
        }
    }

    /// Lowercase label used on disk and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Draft => "draft",
            Channel::Published => "published",
        }
    }

    /// Sort priority; published sorts ahead of draft.
    pub fn priority(&self) -> u8 {
        match self {
            Channel::Published => 0,
            Channel::Draft => 1,
        }
    }

    /// Both channels in priority order.
    pub fn all() -> [Channel; 2] {
        [Channel::Published, Channel::Draft]
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dedup key of a discovered game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameKey {
    /// Normalised slug.
    pub slug: String,
    /// Channel of the record.
    pub channel: Channel,
}

impl GameKey {
    /// Build a key from a slug and channel.
    pub fn new(slug: impl Into<String>, channel: Channel) -> Self {
        Self {
            slug: slug.into(),
            channel,
        }
    }
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.slug, self.channel)
    }
}

/// Loosely-typed record as found in `metadata.json` files or config tables.
///
/// Every field is optional and non-string scalars are stringified, so the
/// shape is validated once by [`normalize_record`]. Fields that are spelled
/// both camelCase and snake_case take the first non-empty value, camelCase
/// first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGameRecord {
    /// Raw slug before trimming and lowercasing.
    pub slug: Option<String>,
    /// Display title.
    pub title: Option<String>,
    /// Channel label.
    pub channel: Option<String>,
    /// Cover image URL or path.
    pub cover_image: Option<String>,
    /// Short marketing blurb.
    pub short_description: Option<String>,
    /// Game type label.
    pub game_type: Option<String>,
    /// Play mode label.
    pub mode: Option<String>,
    /// Creation timestamp (ISO-8601).
    pub created_at: Option<String>,
    /// Last update timestamp (ISO-8601).
    pub updated_at: Option<String>,
    /// Directory that provided the record.
    pub source: Option<String>,
    /// Provenance location.
    pub location: Option<String>,
}

impl<'de> Deserialize<'de> for RawGameRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_map(&map))
    }
}

impl RawGameRecord {
    /// Read the known fields of a JSON object, ignoring everything else.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let field = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| map.get(*name))
                .filter_map(scalar_text)
                .find(|value| !value.trim().is_empty())
        };
        Self {
            slug: field(&["slug"]),
            title: field(&["title"]),
            channel: field(&["channel"]),
            cover_image: field(&["coverImage", "cover_image"]),
            short_description: field(&["shortDescription", "short_description"]),
            game_type: field(&["type"]),
            mode: field(&["mode"]),
            created_at: field(&["createdAt", "created_at"]),
            updated_at: field(&["updatedAt", "updated_at"]),
            source: field(&["source"]),
            location: field(&["location"]),
        }
    }

    /// Overlay non-empty fields from `other` onto `self`.
    pub fn overlay(&mut self, other: &RawGameRecord) {
        fn pick(target: &mut Option<String>, value: &Option<String>) {
            if value.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false) {
                *target = value.clone();
            }
        }
        pick(&mut self.slug, &other.slug);
        pick(&mut self.title, &other.title);
        pick(&mut self.channel, &other.channel);
        pick(&mut self.cover_image, &other.cover_image);
        pick(&mut self.short_description, &other.short_description);
        pick(&mut self.game_type, &other.game_type);
        pick(&mut self.mode, &other.mode);
        pick(&mut self.created_at, &other.created_at);
        pick(&mut self.updated_at, &other.updated_at);
        pick(&mut self.source, &other.source);
        pick(&mut self.location, &other.location);
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept a string, number or boolean; anything else reads as absent.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}

/// Like `lenient_string` but yields an empty string for missing values.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

/// Normalised game record returned by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Lowercase, trimmed, non-empty identifier.
    pub slug: String,
    /// Display title, falls back to the slug.
    pub title: String,
    /// Content channel.
    pub channel: Channel,
    /// Mirror of `channel` kept for API consumers.
    pub status: Channel,
    /// True when `channel` is published.
    pub published: bool,
    /// True when `channel` is draft.
    pub draft: bool,
    /// Cover image URL or path.
    pub cover_image: String,
    /// Short marketing blurb.
    pub short_description: String,
    /// Game type label.
    #[serde(rename = "type")]
    pub game_type: String,
    /// Play mode label.
    pub mode: String,
    /// Creation timestamp (ISO-8601) or empty.
    pub created_at: String,
    /// Last update timestamp (ISO-8601) or empty.
    pub updated_at: String,
    /// Directory that provided the record, or `fallback` / `virtual`.
    pub source: String,
    /// Provenance location, or `virtual`.
    pub location: String,
}

impl GameRecord {
    /// Dedup key of this record.
    pub fn key(&self) -> GameKey {
        GameKey::new(self.slug.clone(), self.channel)
    }

    /// Label combining title and channel for pickers.
    pub fn display_name(&self) -> String {
        format!("{} · {}", self.title, self.channel)
    }
}

/// Validate and normalise a raw record; `None` means "skip this entry".
pub fn normalize_record(raw: &RawGameRecord) -> Option<GameRecord> {
    let slug = normalize_slug(raw.slug.as_deref().unwrap_or_default());
    if slug.is_empty() {
        return None;
    }

    let channel = Channel::from_raw(raw.channel.as_deref().unwrap_or_default());
    let text = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_string();
    let title = Some(text(&raw.title))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| slug.clone());

    Some(GameRecord {
        title,
        channel,
        status: channel,
        published: channel == Channel::Published,
        draft: channel == Channel::Draft,
        cover_image: text(&raw.cover_image),
        short_description: text(&raw.short_description),
        game_type: text(&raw.game_type),
        mode: text(&raw.mode),
        created_at: text(&raw.created_at),
        updated_at: text(&raw.updated_at),
        source: text(&raw.source),
        location: text(&raw.location),
        slug,
    })
}
