use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::GameRecord;

use super::finder::DEFAULT_SLUG;

static CHUNK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+|\D+").expect("invalid natural sort regex"));

/// Order records for display: `default` first, then published before
/// draft, then natural title order, then slug.
pub fn sort_games(games: &mut [GameRecord]) {
    games.sort_by(|a, b| {
        let a_default = a.slug == DEFAULT_SLUG;
        let b_default = b.slug == DEFAULT_SLUG;
        b_default
            .cmp(&a_default)
            .then_with(|| a.channel.priority().cmp(&b.channel.priority()))
            .then_with(|| natural_cmp(&a.title, &b.title))
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

/// Case-insensitive comparison that orders digit runs numerically.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let mut left = CHUNK_RE.find_iter(&a).map(|m| m.as_str());
    let mut right = CHUNK_RE.find_iter(&b).map(|m| m.as_str());

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = compare_chunks(l, r);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn compare_chunks(left: &str, right: &str) -> Ordering {
    let numeric = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if numeric(left) && numeric(right) {
        let l = left.trim_start_matches('0');
        let r = right.trim_start_matches('0');
        l.len()
            .cmp(&r.len())
            .then_with(|| l.cmp(r))
            .then_with(|| left.len().cmp(&right.len()))
    } else {
        left.cmp(right)
    }
}
