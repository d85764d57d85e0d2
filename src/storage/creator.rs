//! Local publication store: shows, drafts and episodes created on this device.
//!
//! All mutation happens through `&mut CreatorStore`, so there is exactly one
//! writer at a time. The store is persisted as a JSON snapshot under
//! [`CREATOR_STORE_KEY`] in the key-value layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::schema::Database;
use super::types::StoreError;
use crate::feed::{EpisodeKind, EpisodeWithShow, PublishedEpisode, Show};

/// Key the store snapshot lives under.
pub const CREATOR_STORE_KEY: &str = "creator-store";

// ============================================================================
// Records
// ============================================================================

/// A show created by the local user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorShow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub topic_ids: Vec<String>,
    pub topic_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftScene {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// An unpublished, editable episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEpisode {
    pub id: String,
    pub show_id: String,
    pub title: String,
    pub season_number: u32,
    pub episode_number: u32,
    pub hook_template_id: Option<String>,
    /// Date the next episode is announced to drop
    pub next_drop: Option<NaiveDate>,
    #[serde(default)]
    pub previously_on_episode_ids: Vec<String>,
    #[serde(default)]
    pub episode_type: EpisodeKind,
    #[serde(default)]
    pub scenes: Vec<DraftScene>,
    #[serde(default)]
    pub shared_with_writers_room: bool,
    pub shared_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DraftEpisode {
    pub fn is_trailer(&self) -> bool {
        self.episode_type == EpisodeKind::Trailer
    }
}

/// Everything needed to create a draft; timestamps are stamped by the store.
#[derive(Debug, Clone, Default)]
pub struct NewDraft {
    pub id: String,
    pub show_id: String,
    pub title: String,
    pub season_number: u32,
    pub episode_number: u32,
    pub hook_template_id: Option<String>,
    pub next_drop: Option<NaiveDate>,
    pub previously_on_episode_ids: Vec<String>,
    pub episode_type: EpisodeKind,
    pub scenes: Vec<DraftScene>,
    pub shared_with_writers_room: bool,
}

/// Partial update applied by auto-save. `None` leaves a field untouched;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct DraftPatch {
    pub title: Option<String>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    pub hook_template_id: Option<Option<String>>,
    pub next_drop: Option<Option<NaiveDate>>,
    pub previously_on_episode_ids: Option<Vec<String>>,
    pub episode_type: Option<EpisodeKind>,
    pub scenes: Option<Vec<DraftScene>>,
    pub shared_with_writers_room: Option<bool>,
    pub shared_at: Option<Option<DateTime<Utc>>>,
}

impl DraftPatch {
    fn apply(self, draft: &mut DraftEpisode) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(season) = self.season_number {
            draft.season_number = season;
        }
        if let Some(number) = self.episode_number {
            draft.episode_number = number;
        }
        if let Some(hook) = self.hook_template_id {
            draft.hook_template_id = hook;
        }
        if let Some(next_drop) = self.next_drop {
            draft.next_drop = next_drop;
        }
        if let Some(ids) = self.previously_on_episode_ids {
            draft.previously_on_episode_ids = ids;
        }
        if let Some(episode_type) = self.episode_type {
            draft.episode_type = episode_type;
        }
        if let Some(scenes) = self.scenes {
            draft.scenes = scenes;
        }
        if let Some(shared) = self.shared_with_writers_room {
            draft.shared_with_writers_room = shared;
        }
        if let Some(shared_at) = self.shared_at {
            draft.shared_at = shared_at;
        }
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatorStore {
    shows: Vec<CreatorShow>,
    draft_episodes_by_show_id: BTreeMap<String, Vec<DraftEpisode>>,
    published_episodes: Vec<PublishedEpisode>,
    published_shows: BTreeMap<String, Show>,
    local_published_episodes_by_show_id: BTreeMap<String, Vec<EpisodeWithShow>>,
}

impl CreatorStore {
    /// Load the persisted snapshot, or an empty store if none was saved yet.
    pub async fn load(db: &Database) -> Result<Self, StoreError> {
        let Some(bytes) = db.get(CREATOR_STORE_KEY).await? else {
            tracing::debug!("No creator store snapshot, starting empty");
            return Ok(Self::default());
        };

        let store: Self = serde_json::from_slice(&bytes).map_err(|source| StoreError::Codec {
            key: CREATOR_STORE_KEY.to_string(),
            source,
        })?;
        tracing::debug!(
            shows = store.shows.len(),
            published = store.published_episodes.len(),
            "Loaded creator store"
        );
        Ok(store)
    }

    /// Persist the whole store as one snapshot.
    pub async fn save(&self, db: &Database) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(self).map_err(|source| StoreError::Codec {
            key: CREATOR_STORE_KEY.to_string(),
            source,
        })?;
        db.set(CREATOR_STORE_KEY, &bytes).await?;
        tracing::debug!(bytes = bytes.len(), "Saved creator store");
        Ok(())
    }

    // ========================================================================
    // Shows
    // ========================================================================

    /// Append a new show. Ids are not checked for collisions.
    pub fn add_show(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        topic_id: Option<String>,
        topic_name: Option<String>,
    ) {
        self.shows.push(CreatorShow {
            id: id.into(),
            title: title.into(),
            topic_ids: topic_id.into_iter().collect(),
            topic_name,
            created_at: Utc::now(),
        });
    }

    pub fn shows(&self) -> &[CreatorShow] {
        &self.shows
    }

    pub fn get_show_by_id(&self, id: &str) -> Option<&CreatorShow> {
        self.shows.iter().find(|show| show.id == id)
    }

    // ========================================================================
    // Drafts
    // ========================================================================

    /// Insert a draft, replacing any draft with the same id in that show.
    pub fn add_draft_episode(&mut self, input: NewDraft) {
        let now = Utc::now();
        let draft = DraftEpisode {
            id: input.id,
            show_id: input.show_id,
            title: input.title,
            season_number: input.season_number,
            episode_number: input.episode_number,
            hook_template_id: input.hook_template_id,
            next_drop: input.next_drop,
            previously_on_episode_ids: input.previously_on_episode_ids,
            episode_type: input.episode_type,
            scenes: input.scenes,
            shared_with_writers_room: input.shared_with_writers_room,
            shared_at: None,
            created_at: now,
            updated_at: now,
        };

        let drafts = self
            .draft_episodes_by_show_id
            .entry(draft.show_id.clone())
            .or_default();
        match drafts.iter_mut().find(|d| d.id == draft.id) {
            Some(existing) => *existing = draft,
            None => drafts.push(draft),
        }
    }

    /// Apply `patch` to the draft with `id`, wherever it lives.
    ///
    /// Returns `false` (and changes nothing) if no such draft exists.
    pub fn update_draft_episode(&mut self, id: &str, patch: DraftPatch) -> bool {
        let Some(draft) = self.draft_mut(id) else {
            tracing::debug!(draft_id = %id, "Ignoring update for unknown draft");
            return false;
        };
        patch.apply(draft);
        draft.updated_at = Utc::now();
        true
    }

    /// Remove the draft with `id` from whichever show holds it.
    pub fn remove_draft_episode(&mut self, id: &str) -> bool {
        let mut removed = false;
        for drafts in self.draft_episodes_by_show_id.values_mut() {
            let before = drafts.len();
            drafts.retain(|d| d.id != id);
            removed |= drafts.len() != before;
        }
        removed
    }

    pub fn get_draft_episode_by_id(&self, id: &str) -> Option<&DraftEpisode> {
        self.draft_episodes_by_show_id
            .values()
            .flatten()
            .find(|d| d.id == id)
    }

    /// Drafts of one show; empty if it has none.
    pub fn get_draft_episodes_by_show_id(&self, show_id: &str) -> &[DraftEpisode] {
        self.draft_episodes_by_show_id
            .get(show_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mark a draft as shared with the writers room.
    ///
    /// `shared_at` is stamped on the first share only.
    pub fn share_draft(&mut self, show_id: &str, draft_id: &str) -> bool {
        let Some(draft) = self.show_draft_mut(show_id, draft_id) else {
            return false;
        };
        draft.shared_with_writers_room = true;
        draft.shared_at.get_or_insert_with(Utc::now);
        true
    }

    pub fn unshare_draft(&mut self, show_id: &str, draft_id: &str) -> bool {
        let Some(draft) = self.show_draft_mut(show_id, draft_id) else {
            return false;
        };
        draft.shared_with_writers_room = false;
        true
    }

    /// Shared drafts of a show, most recently shared first.
    pub fn get_shared_drafts_by_show_id(&self, show_id: &str) -> Vec<&DraftEpisode> {
        let mut shared: Vec<&DraftEpisode> = self
            .get_draft_episodes_by_show_id(show_id)
            .iter()
            .filter(|d| d.shared_with_writers_room)
            .collect();
        shared.sort_by_key(|d| std::cmp::Reverse(d.shared_at.unwrap_or(d.created_at)));
        shared
    }

    fn draft_mut(&mut self, id: &str) -> Option<&mut DraftEpisode> {
        self.draft_episodes_by_show_id
            .values_mut()
            .flatten()
            .find(|d| d.id == id)
    }

    fn show_draft_mut(&mut self, show_id: &str, draft_id: &str) -> Option<&mut DraftEpisode> {
        self.draft_episodes_by_show_id
            .get_mut(show_id)?
            .iter_mut()
            .find(|d| d.id == draft_id)
    }

    // ========================================================================
    // Published Episodes
    // ========================================================================

    /// Register a published episode and remember its show record.
    pub fn add_published_episode(&mut self, episode: PublishedEpisode, show: Show) {
        self.published_shows.insert(show.id.clone(), show);
        self.published_episodes.push(episode);
    }

    /// Append a feed record to the per-show local list.
    pub fn add_local_published_episode(&mut self, show_id: &str, item: EpisodeWithShow) {
        self.local_published_episodes_by_show_id
            .entry(show_id.to_string())
            .or_default()
            .push(item);
    }

    pub fn published_episodes(&self) -> &[PublishedEpisode] {
        &self.published_episodes
    }

    pub fn published_shows(&self) -> &BTreeMap<String, Show> {
        &self.published_shows
    }

    pub fn find_published(&self, episode_id: &str) -> Option<&PublishedEpisode> {
        self.published_episodes
            .iter()
            .find(|p| p.episode.id == episode_id)
    }

    /// Published episodes of one show, each paired with its show record.
    pub fn published_for_show(&self, show_id: &str) -> Vec<EpisodeWithShow> {
        let Some(show) = self.published_shows.get(show_id) else {
            return Vec::new();
        };
        self.published_episodes
            .iter()
            .filter(|p| p.episode.show_id == show_id)
            .map(|p| EpisodeWithShow::new(p.episode.clone(), show.clone()))
            .collect()
    }

    /// The per-show local list; empty if the show has none.
    pub fn local_published_for(&self, show_id: &str) -> &[EpisodeWithShow] {
        self.local_published_episodes_by_show_id
            .get(show_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every locally published feed record, grouped by show id.
    pub fn local_published_episodes(&self) -> impl Iterator<Item = &EpisodeWithShow> {
        self.local_published_episodes_by_show_id.values().flatten()
    }

    /// Ids of every show this store knows about, creator shows first.
    pub fn known_show_ids(&self) -> impl Iterator<Item = &str> {
        self.shows
            .iter()
            .map(|s| s.id.as_str())
            .chain(self.published_shows.keys().map(String::as_str))
    }

    /// Drop every record.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
