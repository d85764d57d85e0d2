use serde::Serialize;

use super::normalize::normalize_episode_with_show;
use super::types::{FeedType, Show};
use super::FeedApi;
use crate::storage::CreatorShow;

/// Creator id stamped on shows that only exist on this device.
pub const LOCAL_CREATOR_ID: &str = "local-creator";

/// Which record a resolved show came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowSource {
    /// Both a creator and a curated record exist
    Merged,
    Creator,
    Curated,
}

/// Diagnostics describing how a show was resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolveDebug {
    pub has_creator: bool,
    pub has_curated: bool,
    pub creator_topic_ids: Vec<String>,
    pub curated_topic_ids: Vec<String>,
    /// Whose topics the resolved show carries, if any
    pub topic_source: Option<ShowSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedShow {
    pub show: Show,
    pub source: ShowSource,
    pub debug: ResolveDebug,
}

impl FeedApi {
    /// Resolve a show from the creator store and the catalog.
    ///
    /// Creator fields win over curated ones, except that empty creator topics
    /// fall back to the curated topics. Returns `None` when neither side knows
    /// the id.
    pub async fn resolve_show_by_id(&self, show_id: &str) -> Option<ResolvedShow> {
        let creator = self.creator.get_show_by_id(show_id);
        let curated = self.curated_show(show_id).await;

        let resolved = merge_show(creator, curated);
        match &resolved {
            Some(r) => tracing::trace!(show_id = %show_id, source = ?r.source, "Resolved show"),
            None => tracing::debug!(show_id = %show_id, "Show not found"),
        }
        resolved
    }

    /// The show record attached to the first catalog item of that show,
    /// scanning feed types in order.
    pub async fn get_catalog_show(&self, show_id: &str) -> Option<Show> {
        for feed_type in FeedType::ALL {
            let found = self
                .catalog
                .fetch(feed_type)
                .await
                .into_iter()
                .find(|item| item.show.id == show_id);
            if let Some(item) = found {
                return Some(normalize_episode_with_show(item).show);
            }
        }
        None
    }

    /// Catalog record first, then the show record saved at publish time.
    async fn curated_show(&self, show_id: &str) -> Option<Show> {
        match self.get_catalog_show(show_id).await {
            Some(show) => Some(show),
            None => self.creator.published_shows().get(show_id).cloned(),
        }
    }
}

fn merge_show(creator: Option<&CreatorShow>, curated: Option<Show>) -> Option<ResolvedShow> {
    let creator_topic_ids = creator.map(|c| c.topic_ids.clone()).unwrap_or_default();
    let curated_topic_ids = curated
        .as_ref()
        .map(|c| c.topic_ids.clone())
        .unwrap_or_default();

    let topic_source = if !creator_topic_ids.is_empty() {
        Some(ShowSource::Creator)
    } else if !curated_topic_ids.is_empty() {
        Some(ShowSource::Curated)
    } else {
        None
    };

    let debug = ResolveDebug {
        has_creator: creator.is_some(),
        has_curated: curated.is_some(),
        creator_topic_ids,
        curated_topic_ids,
        topic_source,
    };

    let (show, source) = match (creator, curated) {
        (Some(creator), Some(curated)) => {
            let topic_ids = if creator.topic_ids.is_empty() {
                curated.topic_ids
            } else {
                creator.topic_ids.clone()
            };
            let topic_name = creator
                .topic_name
                .clone()
                .filter(|name| !name.is_empty())
                .or(curated.topic_name);
            let show = Show {
                id: curated.id,
                title: creator.title.clone(),
                creator_id: curated.creator_id,
                topic_ids,
                topic_name,
                created_at: Some(creator.created_at),
            };
            (show, ShowSource::Merged)
        }
        (Some(creator), None) => {
            let show = Show {
                id: creator.id.clone(),
                title: creator.title.clone(),
                creator_id: LOCAL_CREATOR_ID.to_string(),
                topic_ids: creator.topic_ids.clone(),
                topic_name: creator.topic_name.clone(),
                created_at: Some(creator.created_at),
            };
            (show, ShowSource::Creator)
        }
        (None, Some(curated)) => (curated, ShowSource::Curated),
        (None, None) => return None,
    };

    Some(ResolvedShow {
        show,
        source,
        debug,
    })
}
