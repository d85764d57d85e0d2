use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::normalize::normalize_episode_with_show;
use super::shows::LOCAL_CREATOR_ID;
use super::types::{
    Episode, EpisodeKind, EpisodeWithShow, FeedError, PublishStatus, PublishedEpisode, Show,
};
use super::FeedApi;

/// Title given to a show published without any known record or title.
pub const DEFAULT_SHOW_TITLE: &str = "New Show";

/// What the publish screen submits.
///
/// Unset numbers are taken from the source draft when there is one, and
/// computed otherwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishEpisodeInput {
    pub show_id: String,
    pub show_title: Option<String>,
    pub title: String,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    /// Defaults to the draft's type, or a regular episode
    pub episode_type: Option<EpisodeKind>,
    pub video_url: String,
    pub duration: u32,
    pub trailer_for_episode_number: Option<u32>,
    pub topic_ids: Vec<String>,
    /// Draft this publication replaces
    pub draft_id: Option<String>,
}

impl FeedApi {
    /// One past the highest regular episode number in `season`, across the
    /// show's published episodes and its drafts. Trailers are ignored.
    ///
    /// Fails once the season already holds episode `u32::MAX`.
    pub async fn next_episode_number(&self, show_id: &str, season: u32) -> Result<u32, FeedError> {
        let published = self
            .get_show_episodes(show_id)
            .await
            .iter()
            .filter(|item| item.episode.season() == season && !item.episode.is_trailer())
            .map(|item| item.episode.number())
            .max()
            .unwrap_or(0);
        let drafted = self
            .creator
            .get_draft_episodes_by_show_id(show_id)
            .iter()
            .filter(|d| d.season_number == season && !d.is_trailer())
            .map(|d| d.episode_number)
            .max()
            .unwrap_or(0);

        published
            .max(drafted)
            .checked_add(1)
            .ok_or_else(|| FeedError::EpisodeNumbersExhausted {
                show_id: show_id.to_string(),
                season,
            })
    }

    /// Publish an episode or trailer.
    ///
    /// The episode id is `pub-{show}-{episode}-{season}`, so publishing the
    /// same slot twice returns the existing record and changes nothing.
    /// Trailers are stored with episode number 0. A successful publish
    /// removes the source draft.
    ///
    /// Nothing is recorded when no episode number can be allocated.
    pub async fn publish_episode(
        &mut self,
        input: PublishEpisodeInput,
    ) -> Result<EpisodeWithShow, FeedError> {
        let draft = input
            .draft_id
            .as_deref()
            .and_then(|id| self.creator.get_draft_episode_by_id(id))
            .cloned();

        let show_id = match &draft {
            Some(d) => d.show_id.clone(),
            None => input.show_id.clone(),
        };
        let kind = input
            .episode_type
            .or(draft.as_ref().map(|d| d.episode_type))
            .unwrap_or_default();
        let season = input
            .season_number
            .or(draft.as_ref().map(|d| d.season_number))
            .unwrap_or(1);

        let (episode_number, trailer_for) = match kind {
            EpisodeKind::Trailer => {
                let target = input
                    .trailer_for_episode_number
                    .or(draft.as_ref().map(|d| d.episode_number))
                    .unwrap_or(1);
                (0, Some(target))
            }
            EpisodeKind::Episode => {
                let number = match input.episode_number.or(draft.as_ref().map(|d| d.episode_number)) {
                    Some(number) => number,
                    None => self.next_episode_number(&show_id, season).await?,
                };
                (number, None)
            }
        };

        let episode_id = format!("pub-{}-{}-{}", show_id, episode_number, season);
        if let Some(existing) = self.existing_publication(&show_id, &episode_id) {
            tracing::info!(episode_id = %episode_id, "Episode already published");
            return Ok(existing);
        }

        let show = match self.resolve_show_by_id(&show_id).await {
            Some(resolved) => resolved.show,
            None => Show {
                id: show_id.clone(),
                title: input
                    .show_title
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SHOW_TITLE.to_string()),
                creator_id: LOCAL_CREATOR_ID.to_string(),
                topic_ids: input.topic_ids.clone(),
                topic_name: None,
                created_at: Some(Utc::now()),
            },
        };

        let title = match (&draft, input.title.trim().is_empty()) {
            (Some(d), true) => d.title.clone(),
            _ => input.title,
        };

        let now = Utc::now();
        let episode = Episode {
            id: episode_id.clone(),
            show_id: show_id.clone(),
            episode_number: Some(episode_number),
            season_number: Some(season),
            title,
            video_url: input.video_url,
            duration: input.duration,
            created_at: now,
            published_at: Some(now),
            trailer_for_episode_number: trailer_for,
            topic_ids: input.topic_ids,
            kind,
        };

        let item = normalize_episode_with_show(EpisodeWithShow::new(episode.clone(), show.clone()));
        self.creator.add_published_episode(
            PublishedEpisode {
                episode,
                status: PublishStatus::Published,
            },
            show,
        );
        self.creator.add_local_published_episode(&show_id, item.clone());

        if let Some(draft) = draft {
            self.creator.remove_draft_episode(&draft.id);
        }

        tracing::info!(
            episode_id = %episode_id,
            show_id = %show_id,
            trailer = kind == EpisodeKind::Trailer,
            "Published episode"
        );
        Ok(item)
    }

    fn existing_publication(&self, show_id: &str, episode_id: &str) -> Option<EpisodeWithShow> {
        if let Some(item) = self
            .creator
            .local_published_for(show_id)
            .iter()
            .find(|item| item.episode.id == episode_id)
        {
            return Some(item.clone());
        }

        let published = self.creator.find_published(episode_id)?;
        let show = self.creator.published_shows().get(show_id)?;
        Some(normalize_episode_with_show(EpisodeWithShow::new(
            published.episode.clone(),
            show.clone(),
        )))
    }
}
