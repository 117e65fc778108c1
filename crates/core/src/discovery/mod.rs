//! Game discovery across modern and legacy directory layouts.

/// Directory scanners for the two on-disk layouts.
pub mod collect;
/// Upsert index and field-wise merge rules.
pub mod merge;
/// Final ordering of discovered records.
pub mod sort;

mod finder;

pub use collect::{collect_from_game_data, collect_from_legacy_base, ScanError, METADATA_FILE};
pub use finder::{default_record, find_games, DiscoveryRoots, GamesListing, DEFAULT_SLUG};
pub use merge::{merge_game, GameIndex};
pub use sort::{natural_cmp, sort_games};
