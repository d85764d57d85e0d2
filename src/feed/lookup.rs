use futures::future::join_all;

use super::normalize::normalize_episode_with_show;
use super::types::{EpisodeWithShow, FeedItem, FeedType, Special};
use super::FeedApi;

impl FeedApi {
    /// Find an episode by id for its detail page.
    ///
    /// Searches every feed type in order, then the creator store's published
    /// records and its local publications; the first match wins. The returned
    /// item carries the resolved show rather than the snapshot stored with
    /// the episode.
    pub async fn get_episode_by_id(&self, episode_id: &str) -> Option<EpisodeWithShow> {
        let feeds = join_all(FeedType::ALL.map(|feed_type| self.get_feed(feed_type))).await;
        let published = self
            .creator
            .published_shows()
            .keys()
            .flat_map(|show_id| self.creator.published_for_show(show_id));

        let mut item = feeds
            .into_iter()
            .flatten()
            .chain(published)
            .chain(self.creator.local_published_episodes().cloned())
            .find(|item| item.episode.id == episode_id)
            .map(normalize_episode_with_show)?;

        if let Some(resolved) = self.resolve_show_by_id(&item.show.id).await {
            item.show = resolved.show;
        }
        Some(item)
    }

    /// The episodes before and after `episode_id` in its show's canonical
    /// list. Trailers sort first, so the trailer precedes the season's first
    /// episode.
    ///
    /// Both sides are `None` when the episode is unknown.
    pub async fn episode_neighbors(
        &self,
        episode_id: &str,
    ) -> (Option<EpisodeWithShow>, Option<EpisodeWithShow>) {
        let Some(item) = self.get_episode_by_id(episode_id).await else {
            return (None, None);
        };

        let mut episodes = self.get_show_episodes(&item.show.id).await;
        let Some(index) = episodes.iter().position(|e| e.episode.id == episode_id) else {
            return (None, None);
        };

        let next = (index + 1 < episodes.len()).then(|| episodes.remove(index + 1));
        let prev = index.checked_sub(1).map(|i| episodes.swap_remove(i));
        (prev, next)
    }

    /// A special of the mixed `new` feed by id.
    pub async fn get_special_by_id(&self, special_id: &str) -> Option<Special> {
        self.get_mixed_feed(FeedType::New)
            .await
            .into_iter()
            .find_map(|item| match item {
                FeedItem::Special(special) if special.special_id == special_id => Some(special),
                _ => None,
            })
    }
}
