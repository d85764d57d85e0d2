//! Feed resolution and aggregation.
//!
//! Everything a screen needs comes through [`FeedApi`], which owns the two
//! data sources explicitly instead of reaching for global stores:
//!
//! - the [`Catalog`] (curated/seed data, optionally upstream-backed)
//! - the [`CreatorStore`] (shows, drafts and publications made on-device)
//!
//! # Architecture
//!
//! - [`types`] - Shows, episodes, specials and the feed item sum type
//! - [`normalize`] - Default filling, first-wins dedup, resume selection, ordering
//! - `lookup` - Episode and special detail lookups, previous/next episode
//! - `resolver` - Per-type feeds, the mixed feed and per-show episode lists
//! - `shows` - Three-way merge of creator and curated show records
//! - `topics` - Topic membership, rebuilt from scratch on every call
//! - `publish` - Deterministic, idempotent publishing of drafts and episodes
//!
//! Reads take `&self`; only publishing and store edits need `&mut self`.

mod lookup;
pub mod normalize;
mod publish;
mod resolver;
mod shows;
mod topics;
pub mod types;

pub use publish::{PublishEpisodeInput, DEFAULT_SHOW_TITLE};
pub use resolver::ShowEpisodeEntry;
pub use shows::{ResolveDebug, ResolvedShow, ShowSource, LOCAL_CREATOR_ID};
pub use types::{
    Episode, EpisodeKind, EpisodeWithShow, FeedError, FeedItem, FeedType, PublishStatus,
    PublishedEpisode, Show, Special, SpecialKind,
};

use crate::catalog::Catalog;
use crate::storage::{CreatorStore, Database, StoreError};

/// Application state the resolvers run against.
pub struct FeedApi {
    catalog: Catalog,
    creator: CreatorStore,
}

impl FeedApi {
    pub fn new(catalog: Catalog, creator: CreatorStore) -> Self {
        Self { catalog, creator }
    }

    /// Build the state from the persisted creator store.
    pub async fn load(catalog: Catalog, db: &Database) -> Result<Self, StoreError> {
        let creator = CreatorStore::load(db).await?;
        Ok(Self::new(catalog, creator))
    }

    /// Persist the creator store.
    pub async fn save(&self, db: &Database) -> Result<(), StoreError> {
        self.creator.save(db).await
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn creator(&self) -> &CreatorStore {
        &self.creator
    }

    pub fn creator_mut(&mut self) -> &mut CreatorStore {
        &mut self.creator
    }
}

impl Default for FeedApi {
    fn default() -> Self {
        Self::new(Catalog::mock(), CreatorStore::default())
    }
}
