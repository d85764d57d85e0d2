use futures::future::join_all;
use std::collections::HashMap;

use super::normalize::{dedup_by_key, dedup_episodes, normalize_episode_with_show};
use super::types::{EpisodeWithShow, FeedItem, FeedType, Show, Special};
use super::FeedApi;

fn has_topic(topic_ids: &[String], topic_id: &str) -> bool {
    topic_ids.iter().any(|t| t == topic_id)
}

impl FeedApi {
    /// Every resolved show tagged with `topic_id`.
    ///
    /// Candidates are the shows of all feed types plus every show the creator
    /// store knows. Each is resolved the same way a show page would be, so a
    /// creator's topic edits apply here too.
    pub async fn get_shows_by_topic(&self, topic_id: &str) -> Vec<Show> {
        let feeds = join_all(FeedType::ALL.map(|feed_type| self.get_feed(feed_type))).await;
        let candidates = dedup_by_key(
            feeds
                .iter()
                .flatten()
                .map(|item| item.show.id.as_str())
                .chain(self.creator.known_show_ids()),
            |id| *id,
        );

        let mut shows = Vec::new();
        for show_id in candidates {
            if let Some(resolved) = self.resolve_show_by_id(show_id).await {
                if has_topic(&resolved.show.topic_ids, topic_id) {
                    shows.push(resolved.show);
                }
            }
        }

        tracing::debug!(topic_id = %topic_id, count = shows.len(), "Resolved topic shows");
        shows
    }

    /// Every episode tagged with `topic_id`, directly or through its show.
    ///
    /// Show membership is judged on the resolved show, the same record
    /// [`FeedApi::get_shows_by_topic`] uses, and each returned item carries
    /// that resolved show.
    pub async fn get_episodes_by_topic(&self, topic_id: &str) -> Vec<EpisodeWithShow> {
        let feeds = join_all(FeedType::ALL.map(|feed_type| self.get_feed(feed_type))).await;
        let published = self
            .creator
            .published_shows()
            .keys()
            .flat_map(|show_id| self.creator.published_for_show(show_id));

        let candidates = feeds
            .into_iter()
            .flatten()
            .chain(self.creator.local_published_episodes().cloned())
            .chain(published)
            .map(normalize_episode_with_show);

        let episodes = dedup_episodes(candidates);

        let mut resolved: HashMap<String, Show> = HashMap::new();
        for item in &episodes {
            if resolved.contains_key(&item.show.id) {
                continue;
            }
            if let Some(r) = self.resolve_show_by_id(&item.show.id).await {
                resolved.insert(item.show.id.clone(), r.show);
            }
        }

        episodes
            .into_iter()
            .map(|mut item| {
                if let Some(show) = resolved.get(&item.show.id) {
                    item.show = show.clone();
                }
                item
            })
            .filter(|item| {
                has_topic(&item.episode.topic_ids, topic_id) || has_topic(&item.show.topic_ids, topic_id)
            })
            .collect()
    }

    /// Specials of the mixed `new` feed attached to `topic_id`.
    pub async fn get_specials_by_topic(&self, topic_id: &str) -> Vec<Special> {
        self.get_mixed_feed(FeedType::New)
            .await
            .into_iter()
            .filter_map(|item| match item {
                FeedItem::Special(special) if has_topic(&special.attached_topic_ids, topic_id) => {
                    Some(special)
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_shows_by_topic_from_catalog() {
        let api = FeedApi::default();
        let ids: Vec<String> = api
            .get_shows_by_topic("topic1")
            .await
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["show1", "show4"]);
    }

    #[tokio::test]
    async fn test_shows_by_topic_follows_creator_override() {
        let mut api = FeedApi::default();
        api.creator_mut()
            .add_show("show1", "Retagged", Some("mystery".to_string()), None);
        api.creator_mut()
            .add_show("mine", "Mine", Some("topic1".to_string()), None);

        let ids: Vec<String> = api
            .get_shows_by_topic("topic1")
            .await
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["show4", "mine"]);

        let mystery = api.get_shows_by_topic("mystery").await;
        assert_eq!(mystery.len(), 1);
        assert_eq!(mystery[0].title, "Retagged");
    }

    #[tokio::test]
    async fn test_shows_by_unknown_topic_is_empty() {
        let api = FeedApi::default();
        assert!(api.get_shows_by_topic("nothing").await.is_empty());
    }

    #[tokio::test]
    async fn test_episodes_by_topic_dedups_across_feeds() {
        let api = FeedApi::default();
        let episodes = api.get_episodes_by_topic("drama").await;

        // show3's twelve episodes appear in library and continue, show4 adds one
        assert_eq!(episodes.len(), 13);
        assert!(episodes
            .iter()
            .all(|i| i.show.id == "show3" || i.show.id == "show4"));
    }

    #[tokio::test]
    async fn test_episodes_by_topic_follow_creator_retag() {
        let mut api = FeedApi::default();
        api.creator_mut()
            .add_show("show1", "Retagged", Some("mystery".to_string()), None);

        let shows = api.get_shows_by_topic("mystery").await;
        let episodes = api.get_episodes_by_topic("mystery").await;
        assert_eq!(shows.len(), 1);
        assert_eq!(episodes.len(), 2);
        assert!(episodes
            .iter()
            .all(|i| i.show.id == "show1" && i.show.title == "Retagged"));

        let topic1_shows: Vec<String> = api
            .get_shows_by_topic("topic1")
            .await
            .into_iter()
            .map(|s| s.id)
            .collect();
        let topic1_episodes = api.get_episodes_by_topic("topic1").await;
        assert_eq!(topic1_shows, vec!["show4"]);
        assert!(topic1_episodes.iter().all(|i| i.show.id != "show1"));
    }

    #[tokio::test]
    async fn test_specials_by_topic() {
        let api = FeedApi::default();
        let specials = api.get_specials_by_topic("topic1").await;
        assert_eq!(specials.len(), 1);
        assert_eq!(specials[0].special_id, "special2");
        assert!(api.get_specials_by_topic("comedy").await.is_empty());
    }
}
