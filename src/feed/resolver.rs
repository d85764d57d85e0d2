use serde::Serialize;
use std::collections::HashSet;

use super::normalize::{
    dedup_by_key, dedup_episodes, normalize_episode_with_show, sort_show_episodes, trailer_first,
};
use super::types::{EpisodeWithShow, FeedItem, FeedType, Special, SpecialKind};
use super::FeedApi;
use crate::storage::DraftEpisode;

/// One row of a show's episode list, published or draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowEpisodeEntry {
    pub id: String,
    pub title: String,
    pub season_number: u32,
    pub episode_number: u32,
    pub is_draft: bool,
    pub is_trailer: bool,
    pub trailer_for_episode_number: Option<u32>,
}

impl ShowEpisodeEntry {
    fn published(item: &EpisodeWithShow) -> Self {
        let episode = &item.episode;
        Self {
            id: episode.id.clone(),
            title: episode.title.clone(),
            season_number: episode.season(),
            episode_number: episode.number(),
            is_draft: false,
            is_trailer: episode.is_trailer(),
            trailer_for_episode_number: episode.trailer_for_episode_number,
        }
    }

    fn draft(draft: &DraftEpisode) -> Self {
        Self {
            id: draft.id.clone(),
            title: draft.title.clone(),
            season_number: draft.season_number,
            episode_number: draft.episode_number,
            is_draft: true,
            is_trailer: draft.is_trailer(),
            trailer_for_episode_number: draft.is_trailer().then_some(draft.episode_number),
        }
    }
}

impl FeedApi {
    // ========================================================================
    // Per-Type Feeds
    // ========================================================================

    /// Normalized feed for one feed type.
    ///
    /// `new` and `local` also carry every locally published episode, after the
    /// catalog items.
    pub async fn get_feed(&self, feed_type: FeedType) -> Vec<EpisodeWithShow> {
        let mut items = self.catalog.fetch(feed_type).await;
        if feed_type.includes_local_publications() {
            items.extend(self.creator.local_published_episodes().cloned());
        }

        tracing::debug!(feed = %feed_type, count = items.len(), "Resolved feed");
        items.into_iter().map(normalize_episode_with_show).collect()
    }

    /// Episodes of publicly eligible shows, followed by specials.
    ///
    /// A show is eligible once it has at least one published episode or
    /// published trailer; shows with drafts only are never listed.
    pub async fn get_mixed_feed(&self, feed_type: FeedType) -> Vec<FeedItem> {
        let episodes = self.get_feed(feed_type).await;
        let eligible = self.eligible_show_ids(&episodes);

        let before = episodes.len();
        let mut items: Vec<FeedItem> = episodes
            .iter()
            .filter(|item| eligible.contains(item.show.id.as_str()))
            .cloned()
            .map(FeedItem::Episode)
            .collect();
        if items.len() != before {
            tracing::debug!(
                feed = %feed_type,
                dropped = before - items.len(),
                "Filtered episodes of ineligible shows"
            );
        }

        // TODO: source specials independently of the feed type once they have
        // their own catalog table.
        if feed_type == FeedType::New {
            let specials = dedup_by_key(featured_specials(), |s| s.dedup_key().to_string());
            items.extend(specials.into_iter().map(FeedItem::Special));
        }

        items
    }

    fn eligible_show_ids<'a>(&'a self, episodes: &'a [EpisodeWithShow]) -> HashSet<&'a str> {
        let from_feed = episodes
            .iter()
            .filter(|item| item.episode.is_published())
            .map(|item| item.show.id.as_str());
        let from_store = self
            .creator
            .published_episodes()
            .iter()
            .filter(|p| p.is_live())
            .map(|p| p.episode.show_id.as_str());
        from_feed.chain(from_store).collect()
    }

    // ========================================================================
    // Per-Show Lists
    // ========================================================================

    /// Canonical episode list of one show.
    ///
    /// Pulls the `new`, `library` and `continue` feeds concurrently, adds the
    /// show's local publications, then normalizes, dedups by episode id (first
    /// wins) and sorts trailers first, then by `(season, episode)`.
    pub async fn get_show_episodes(&self, show_id: &str) -> Vec<EpisodeWithShow> {
        let (new, library, resume) = tokio::join!(
            self.get_feed(FeedType::New),
            self.get_feed(FeedType::Library),
            self.get_feed(FeedType::Continue),
        );

        let candidates = new
            .into_iter()
            .chain(library)
            .chain(resume)
            .chain(self.creator.local_published_for(show_id).iter().cloned())
            .chain(self.creator.published_for_show(show_id))
            .filter(|item| item.show.id == show_id)
            .map(normalize_episode_with_show);

        let mut episodes = dedup_episodes(candidates);
        sort_show_episodes(&mut episodes);
        tracing::debug!(show_id = %show_id, count = episodes.len(), "Resolved show episodes");
        episodes
    }

    /// A show's published episodes with its drafts overlaid.
    ///
    /// Published entries win over drafts sharing an id. Ordering matches
    /// [`FeedApi::get_show_episodes`].
    pub async fn show_episode_overlay(&self, show_id: &str) -> Vec<ShowEpisodeEntry> {
        let published = self.get_show_episodes(show_id).await;
        let entries = published.iter().map(ShowEpisodeEntry::published).chain(
            self.creator
                .get_draft_episodes_by_show_id(show_id)
                .iter()
                .map(ShowEpisodeEntry::draft),
        );

        let mut entries = dedup_by_key(entries, |e| e.id.clone());
        entries.sort_by(|a, b| {
            trailer_first(a.is_trailer, b.is_trailer)
                .then_with(|| a.season_number.cmp(&b.season_number))
                .then_with(|| a.episode_number.cmp(&b.episode_number))
        });
        entries
    }
}

/// Specials promoted alongside the `new` feed.
fn featured_specials() -> Vec<Special> {
    let seeds = [
        (
            "special1",
            "Behind the Scenes of New Adventures",
            SpecialKind::Bts,
            vec!["show1"],
            vec![],
        ),
        (
            "special2",
            "Q&A with Creators",
            SpecialKind::Qna,
            vec!["show1"],
            vec!["topic1"],
        ),
    ];

    seeds
        .into_iter()
        .filter_map(|(id, title, kind, shows, topics)| {
            let owned = |ids: Vec<&str>| -> Vec<String> { ids.into_iter().map(str::to_string).collect() };
            match Special::new(id, title, kind, owned(shows), owned(topics)) {
                Ok(special) => Some(special),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping invalid special");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Episode, EpisodeKind, PublishStatus, PublishedEpisode, Show};
    use crate::storage::NewDraft;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn local_show(id: &str) -> Show {
        Show {
            id: id.to_string(),
            title: format!("Local {}", id),
            creator_id: "local-creator".to_string(),
            topic_ids: vec![],
            topic_name: None,
            created_at: None,
        }
    }

    fn local_episode(id: &str, show_id: &str, season: u32, number: u32, live: bool) -> Episode {
        Episode {
            id: id.to_string(),
            show_id: show_id.to_string(),
            episode_number: Some(number),
            season_number: Some(season),
            title: format!("Title {}", id),
            video_url: "mock-url-published".to_string(),
            duration: 30,
            created_at: Utc::now(),
            published_at: live.then(Utc::now),
            trailer_for_episode_number: None,
            topic_ids: vec![],
            kind: EpisodeKind::Episode,
        }
    }

    fn register(api: &mut FeedApi, episode: Episode, status: PublishStatus) {
        let show = local_show(&episode.show_id);
        let show_id = show.id.clone();
        api.creator_mut()
            .add_local_published_episode(&show_id, EpisodeWithShow::new(episode.clone(), show.clone()));
        api.creator_mut()
            .add_published_episode(PublishedEpisode { episode, status }, show);
    }

    #[tokio::test]
    async fn test_get_feed_continue_resumes_latest_episode() {
        let api = FeedApi::default();
        let feed = api.get_feed(FeedType::Continue).await;

        let show3: Vec<_> = feed.iter().filter(|i| i.show.id == "show3").collect();
        assert_eq!(show3.len(), 1);
        assert_eq!(show3[0].episode.episode_number, Some(12));
    }

    #[tokio::test]
    async fn test_get_feed_normalizes_missing_season() {
        let api = FeedApi::default();
        let feed = api.get_feed(FeedType::New).await;
        let ep2 = feed.iter().find(|i| i.episode.id == "ep2").unwrap();
        assert_eq!(ep2.episode.season_number, Some(1));
    }

    #[tokio::test]
    async fn test_get_feed_appends_local_publications_to_new_and_local_only() {
        let mut api = FeedApi::default();
        register(&mut api, local_episode("pub-mine-1-1", "mine", 1, 1, true), PublishStatus::Published);

        for feed_type in [FeedType::New, FeedType::Local] {
            let feed = api.get_feed(feed_type).await;
            assert_eq!(feed.last().unwrap().episode.id, "pub-mine-1-1");
        }
        for feed_type in [FeedType::Continue, FeedType::Library, FeedType::NewShowsOnly] {
            let feed = api.get_feed(feed_type).await;
            assert!(feed.iter().all(|i| i.show.id != "mine"));
        }
    }

    #[tokio::test]
    async fn test_show_episodes_dedup_first_wins() {
        let mut api = FeedApi::default();
        let mut first = local_episode("e1", "s1", 1, 1, true);
        first.title = "A".to_string();
        let mut second = local_episode("e1", "s1", 1, 1, true);
        second.title = "B".to_string();
        api.creator_mut()
            .add_local_published_episode("s1", EpisodeWithShow::new(first, local_show("s1")));
        api.creator_mut()
            .add_local_published_episode("s1", EpisodeWithShow::new(second, local_show("s1")));

        let episodes = api.get_show_episodes("s1").await;
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].episode.title, "A");
    }

    #[tokio::test]
    async fn test_show_episodes_merge_catalog_feeds() {
        let api = FeedApi::default();
        let episodes = api.get_show_episodes("show3").await;

        // library holds 1..=11, continue adds the finale
        assert_eq!(episodes.len(), 12);
        let numbers: Vec<u32> = episodes.iter().map(|i| i.episode.number()).collect();
        assert_eq!(numbers, (1..=12).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_show_episodes_sort_trailers_first() {
        let mut api = FeedApi::default();
        register(&mut api, local_episode("s2e1", "s1", 2, 1, true), PublishStatus::Published);
        register(&mut api, local_episode("s1e2", "s1", 1, 2, true), PublishStatus::Published);
        let mut trailer = local_episode("trailer", "s1", 1, 0, true);
        trailer.kind = EpisodeKind::Trailer;
        register(&mut api, trailer, PublishStatus::Published);
        register(&mut api, local_episode("s1e1", "s1", 1, 1, true), PublishStatus::Published);

        let episodes = api.get_show_episodes("s1").await;
        let ids: Vec<&str> = episodes.iter().map(|i| i.episode.id.as_str()).collect();
        assert_eq!(ids, vec!["trailer", "s1e1", "s1e2", "s2e1"]);
    }

    #[tokio::test]
    async fn test_show_episodes_unknown_show_is_empty() {
        let api = FeedApi::default();
        assert!(api.get_show_episodes("nope").await.is_empty());
    }

    #[tokio::test]
    async fn test_mixed_feed_new_appends_specials() {
        let api = FeedApi::default();
        let feed = api.get_mixed_feed(FeedType::New).await;

        assert_eq!(feed.len(), 5);
        let specials: Vec<&str> = feed
            .iter()
            .filter_map(FeedItem::as_special)
            .map(|s| s.special_id.as_str())
            .collect();
        assert_eq!(specials, vec!["special1", "special2"]);
        assert!(feed[..3].iter().all(|i| i.as_episode().is_some()));
    }

    #[tokio::test]
    async fn test_mixed_feed_other_types_have_no_specials() {
        let api = FeedApi::default();
        for feed_type in [FeedType::Continue, FeedType::Library, FeedType::NewShowsOnly, FeedType::Local] {
            let feed = api.get_mixed_feed(feed_type).await;
            assert!(feed.iter().all(|i| i.as_special().is_none()));
        }
    }

    #[tokio::test]
    async fn test_mixed_feed_excludes_draft_only_shows() {
        let mut api = FeedApi::default();
        register(&mut api, local_episode("hidden-1", "draft-only", 1, 1, false), PublishStatus::Draft);
        register(&mut api, local_episode("live-1", "live", 1, 1, true), PublishStatus::Published);

        let feed = api.get_mixed_feed(FeedType::New).await;
        let show_ids: HashSet<&str> = feed
            .iter()
            .filter_map(FeedItem::as_episode)
            .map(|i| i.show.id.as_str())
            .collect();
        assert!(!show_ids.contains("draft-only"));
        assert!(show_ids.contains("live"));
    }

    #[tokio::test]
    async fn test_mixed_feed_trailer_makes_show_eligible() {
        let mut api = FeedApi::default();
        let mut trailer = local_episode("teaser", "upcoming", 1, 0, true);
        trailer.kind = EpisodeKind::Trailer;
        register(&mut api, trailer, PublishStatus::Published);

        let feed = api.get_mixed_feed(FeedType::Local).await;
        assert!(feed
            .iter()
            .filter_map(FeedItem::as_episode)
            .any(|i| i.show.id == "upcoming"));
    }

    #[tokio::test]
    async fn test_overlay_marks_drafts_and_prefers_published() {
        let mut api = FeedApi::default();
        register(&mut api, local_episode("e1", "s1", 1, 1, true), PublishStatus::Published);
        api.creator_mut().add_draft_episode(NewDraft {
            id: "e1".to_string(),
            show_id: "s1".to_string(),
            title: "Shadowed draft".to_string(),
            season_number: 1,
            episode_number: 1,
            ..Default::default()
        });
        api.creator_mut().add_draft_episode(NewDraft {
            id: "d2".to_string(),
            show_id: "s1".to_string(),
            title: "Next one".to_string(),
            season_number: 1,
            episode_number: 2,
            ..Default::default()
        });
        api.creator_mut().add_draft_episode(NewDraft {
            id: "t".to_string(),
            show_id: "s1".to_string(),
            title: "Teaser".to_string(),
            season_number: 1,
            episode_number: 3,
            episode_type: EpisodeKind::Trailer,
            ..Default::default()
        });

        let entries = api.show_episode_overlay("s1").await;
        let summary: Vec<(&str, bool, bool)> = entries
            .iter()
            .map(|e| (e.id.as_str(), e.is_draft, e.is_trailer))
            .collect();
        assert_eq!(
            summary,
            vec![("t", true, true), ("e1", false, false), ("d2", true, false)]
        );
        assert_eq!(entries[0].trailer_for_episode_number, Some(3));
        assert_eq!(entries[1].title, "Title e1");
    }

    #[test]
    fn test_featured_specials_are_attached() {
        let specials = featured_specials();
        assert_eq!(specials.len(), 2);
        assert!(specials
            .iter()
            .all(|s| !s.attached_show_ids.is_empty() || !s.attached_topic_ids.is_empty()));
    }
}
