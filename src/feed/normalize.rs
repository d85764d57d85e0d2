//! Shape repair, duplicate collapsing and ordering for feed records.
//!
//! Two duplicate policies coexist and must not be mixed up:
//!
//! - [`dedup_by_key`] keeps the **first** occurrence. Every episode merge uses it.
//! - [`select_resume_per_show`] keeps the **greatest** `(season, episode)` per
//!   show, with later items replacing earlier ones on ties. Only the continue
//!   feed uses it.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::types::{Episode, EpisodeWithShow, UNKNOWN_SHOW, UNTITLED_EPISODE};

/// Fill every optional field a renderer relies on.
///
/// Idempotent: a normalized record passes through unchanged.
pub fn normalize_episode_with_show(mut item: EpisodeWithShow) -> EpisodeWithShow {
    let episode = &mut item.episode;
    episode.season_number.get_or_insert(1);
    episode.episode_number.get_or_insert(0);
    if episode.title.is_empty() {
        episode.title = UNTITLED_EPISODE.to_string();
    }
    if item.show.title.is_empty() {
        item.show.title = UNKNOWN_SHOW.to_string();
    }
    item
}

/// Keep the first item for each key, preserving iteration order.
pub fn dedup_by_key<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
    K: Eq + std::hash::Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Dedup feed records by `episode.id`, first wins.
pub fn dedup_episodes(items: impl IntoIterator<Item = EpisodeWithShow>) -> Vec<EpisodeWithShow> {
    dedup_by_key(items, |item| item.episode.id.clone())
}

/// Order two episodes by `(season, episode)`; the greater one is "later".
pub fn compare_for_resume(a: &Episode, b: &Episode) -> Ordering {
    (a.season(), a.number()).cmp(&(b.season(), b.number()))
}

/// Reduce a feed to one resume point per show.
///
/// The survivor is the episode with the greatest `(season, episode)`. An item
/// that compares equal to the current pick replaces it, so among exact ties
/// the most recently encountered wins. Shows keep the position of their first
/// appearance.
pub fn select_resume_per_show(items: Vec<EpisodeWithShow>) -> Vec<EpisodeWithShow> {
    let mut slot_by_show: HashMap<String, usize> = HashMap::new();
    let mut picks: Vec<EpisodeWithShow> = Vec::new();

    for item in items {
        match slot_by_show.get(&item.show.id) {
            Some(&slot) => {
                if compare_for_resume(&picks[slot].episode, &item.episode) != Ordering::Greater {
                    picks[slot] = item;
                }
            }
            None => {
                slot_by_show.insert(item.show.id.clone(), picks.len());
                picks.push(item);
            }
        }
    }

    picks
}

/// Canonical episode ordering for a show: trailers first, then ascending
/// `(season, episode)`. The sort is stable.
pub fn sort_show_episodes(items: &mut [EpisodeWithShow]) {
    items.sort_by(|a, b| compare_canonical(&a.episode, &b.episode));
}

pub(crate) fn compare_canonical(a: &Episode, b: &Episode) -> Ordering {
    trailer_first(a.is_trailer(), b.is_trailer()).then_with(|| compare_for_resume(a, b))
}

/// Trailers sort ahead of everything else.
pub(crate) fn trailer_first(a_trailer: bool, b_trailer: bool) -> Ordering {
    b_trailer.cmp(&a_trailer)
}
