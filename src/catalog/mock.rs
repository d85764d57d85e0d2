use async_trait::async_trait;
use chrono::Utc;

use super::{CatalogError, CatalogSource};
use crate::feed::{Episode, EpisodeKind, EpisodeWithShow, FeedType, Show};

// ============================================================================
// Seed Tables
// ============================================================================

struct SeedShow {
    id: &'static str,
    title: &'static str,
    creator_id: &'static str,
    topic_ids: &'static [&'static str],
    topic_name: Option<&'static str>,
}

struct SeedEpisode {
    id: &'static str,
    show_id: &'static str,
    episode_number: u32,
    season_number: Option<u32>,
    title: &'static str,
    duration: u32,
}

const SHOWS: &[SeedShow] = &[
    SeedShow { id: "show1", title: "New Adventures", creator_id: "creator1", topic_ids: &["topic1", "adventure"], topic_name: Some("Adventure") },
    SeedShow { id: "show2", title: "Fresh Comedy", creator_id: "creator2", topic_ids: &["comedy"], topic_name: Some("Comedy") },
    SeedShow { id: "show3", title: "Ongoing Series", creator_id: "creator3", topic_ids: &["drama"], topic_name: Some("Drama") },
    SeedShow { id: "show4", title: "Continuing Story", creator_id: "creator4", topic_ids: &["drama", "topic1"], topic_name: Some("Drama") },
    SeedShow { id: "show5", title: "Brand New Show", creator_id: "creator5", topic_ids: &["debuts"], topic_name: Some("Debuts") },
    SeedShow { id: "show6", title: "Debut Series", creator_id: "creator6", topic_ids: &["debuts"], topic_name: Some("Debuts") },
    SeedShow { id: "show7", title: "Local Tales", creator_id: "creator7", topic_ids: &["community"], topic_name: Some("Community") },
    SeedShow { id: "show8", title: "Neighborhood Stories", creator_id: "creator8", topic_ids: &["community"], topic_name: Some("Community") },
];

const fn ep(
    id: &'static str,
    show_id: &'static str,
    episode_number: u32,
    season_number: Option<u32>,
    title: &'static str,
    duration: u32,
) -> SeedEpisode {
    SeedEpisode { id, show_id, episode_number, season_number, title, duration }
}

const NEW: &[SeedEpisode] = &[
    ep("ep1", "show1", 1, Some(1), "Latest Episode", 300),
    ep("ep3", "show1", 2, Some(1), "Next Adventure", 280),
    ep("ep2", "show2", 1, None, "Hot Off the Press", 250),
];

/// Season one of "Ongoing Series"; the continue feed runs through the finale,
/// the library stops one short of it.
const ONGOING_SERIES: &[SeedEpisode] = &[
    ep("ep3-1", "show3", 1, Some(1), "Episode 1: Beginning", 280),
    ep("ep3-2", "show3", 2, Some(1), "Episode 2: Development", 280),
    ep("ep3-3", "show3", 3, Some(1), "Episode 3: Twist", 280),
    ep("ep3-4", "show3", 4, Some(1), "Episode 4: Rising Action", 280),
    ep("ep3-5", "show3", 5, Some(1), "Episode 5: Midpoint", 280),
    ep("ep3-6", "show3", 6, Some(1), "Episode 6: Complications", 280),
    ep("ep3-7", "show3", 7, Some(1), "Episode 7: Challenges", 280),
    ep("ep3-8", "show3", 8, Some(1), "Episode 8: Turning Point", 280),
    ep("ep3-9", "show3", 9, Some(1), "Episode 9: Climax Build", 280),
    ep("ep3-10", "show3", 10, Some(1), "Episode 10: Peak Moment", 280),
    ep("ep3-11", "show3", 11, Some(1), "Episode 11: Resolution", 280),
    ep("ep3-12", "show3", 12, Some(1), "Episode 12: Finale", 280),
];

const CONTINUE_EXTRA: &[SeedEpisode] = &[ep("ep4", "show4", 3, Some(1), "Continue Watching 2", 320)];

const NEW_SHOWS_ONLY: &[SeedEpisode] = &[
    ep("ep5", "show5", 1, None, "Pilot", 350),
    ep("ep6", "show6", 1, None, "First Episode", 270),
];

const LOCAL: &[SeedEpisode] = &[
    ep("ep7", "show7", 1, None, "Local Episode 1", 290),
    ep("ep8", "show8", 2, None, "Local Episode 2", 310),
];

// ============================================================================
// Mock Catalog
// ============================================================================

/// The static seed catalog, one fixed table per feed type.
///
/// Tables are returned raw: no normalization and no continue-feed resume
/// selection. [`super::Catalog`] applies both.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockCatalog;

impl MockCatalog {
    pub fn episodes(&self, feed_type: FeedType) -> Vec<EpisodeWithShow> {
        let tables: Vec<&[SeedEpisode]> = match feed_type {
            FeedType::New => vec![NEW],
            FeedType::Continue => vec![ONGOING_SERIES, CONTINUE_EXTRA],
            FeedType::Library => vec![&ONGOING_SERIES[..11]],
            FeedType::NewShowsOnly => vec![NEW_SHOWS_ONLY],
            FeedType::Local => vec![LOCAL],
        };

        let now = Utc::now();
        tables
            .into_iter()
            .flatten()
            .filter_map(|seed| {
                let show = SHOWS.iter().find(|s| s.id == seed.show_id)?;
                Some(EpisodeWithShow::new(
                    Episode {
                        id: seed.id.to_string(),
                        show_id: seed.show_id.to_string(),
                        episode_number: Some(seed.episode_number),
                        season_number: seed.season_number,
                        title: seed.title.to_string(),
                        video_url: format!("mock-url-{}", seed.id.trim_start_matches("ep")),
                        duration: seed.duration,
                        created_at: now,
                        published_at: Some(now),
                        trailer_for_episode_number: None,
                        topic_ids: Vec::new(),
                        kind: EpisodeKind::Episode,
                    },
                    to_show(show),
                ))
            })
            .collect()
    }
}

fn to_show(seed: &SeedShow) -> Show {
    Show {
        id: seed.id.to_string(),
        title: seed.title.to_string(),
        creator_id: seed.creator_id.to_string(),
        topic_ids: seed.topic_ids.iter().map(|t| t.to_string()).collect(),
        topic_name: seed.topic_name.map(str::to_string),
        created_at: None,
    }
}

#[async_trait]
impl CatalogSource for MockCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, feed_type: FeedType) -> Result<Vec<EpisodeWithShow>, CatalogError> {
        Ok(self.episodes(feed_type))
    }
}
