use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Title substituted for episodes that arrive without one.
pub const UNTITLED_EPISODE: &str = "Untitled Episode";

/// Title substituted for shows that arrive without one.
pub const UNKNOWN_SHOW: &str = "Unknown Show";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum FeedError {
    /// A feed type string outside the closed enumeration
    #[error("Unknown feed type: {0}")]
    UnknownFeedType(String),

    /// A special attached to neither a show nor a topic
    #[error("Special '{0}' must be attached to at least one show or topic")]
    UnattachedSpecial(String),

    /// The season already uses the largest representable episode number
    #[error("No episode number left in season {season} of show '{show_id}'")]
    EpisodeNumbersExhausted { show_id: String, season: u32 },
}

// ============================================================================
// Feed Types
// ============================================================================

/// Selects which slice of the catalog a feed is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedType {
    New,
    Continue,
    Library,
    NewShowsOnly,
    Local,
}

impl FeedType {
    /// Every feed type, in the order the topic index and show lookup scan them.
    pub const ALL: [FeedType; 5] = [
        FeedType::New,
        FeedType::Continue,
        FeedType::Library,
        FeedType::NewShowsOnly,
        FeedType::Local,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::New => "new",
            FeedType::Continue => "continue",
            FeedType::Library => "library",
            FeedType::NewShowsOnly => "newShowsOnly",
            FeedType::Local => "local",
        }
    }

    /// Whether locally published episodes are appended to this feed.
    pub fn includes_local_publications(&self) -> bool {
        matches!(self, FeedType::New | FeedType::Local)
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedType {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FeedError::UnknownFeedType(s.to_string()))
    }
}

// ============================================================================
// Shows and Episodes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub creator_id: String,
    #[serde(default)]
    pub topic_ids: Vec<String>,
    pub topic_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Whether an episode is a regular installment or a trailer.
///
/// Published records carry it as `kind`, drafts as `episode_type`; both use
/// the same two values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeKind {
    #[default]
    Episode,
    Trailer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub show_id: String,
    pub episode_number: Option<u32>,
    pub season_number: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub video_url: String,
    /// Length in seconds
    #[serde(default)]
    pub duration: u32,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub trailer_for_episode_number: Option<u32>,
    #[serde(default)]
    pub topic_ids: Vec<String>,
    #[serde(default)]
    pub kind: EpisodeKind,
}

impl Episode {
    /// Season number with the normalization default applied.
    pub fn season(&self) -> u32 {
        self.season_number.unwrap_or(1)
    }

    /// Episode number with the normalization default applied.
    pub fn number(&self) -> u32 {
        self.episode_number.unwrap_or(0)
    }

    pub fn is_trailer(&self) -> bool {
        self.kind == EpisodeKind::Trailer
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

/// The fundamental feed record: an episode together with its show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeWithShow {
    pub episode: Episode,
    pub show: Show,
}

impl EpisodeWithShow {
    pub fn new(episode: Episode, show: Show) -> Self {
        Self { episode, show }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Published,
    Draft,
}

/// An episode registered by the local publish flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedEpisode {
    #[serde(flatten)]
    pub episode: Episode,
    pub status: PublishStatus,
}

impl PublishedEpisode {
    pub fn is_live(&self) -> bool {
        self.status == PublishStatus::Published
    }
}

// ============================================================================
// Specials
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialKind {
    Recap,
    Trailer,
    Bts,
    Qna,
}

/// A non-episode feed entry attached to shows and/or topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Special {
    pub special_id: String,
    pub title: String,
    pub kind: SpecialKind,
    #[serde(default)]
    pub attached_show_ids: Vec<String>,
    #[serde(default)]
    pub attached_topic_ids: Vec<String>,
}

impl Special {
    /// Build a special, rejecting one attached to nothing.
    pub fn new(
        special_id: impl Into<String>,
        title: impl Into<String>,
        kind: SpecialKind,
        attached_show_ids: Vec<String>,
        attached_topic_ids: Vec<String>,
    ) -> Result<Self, FeedError> {
        let special_id = special_id.into();
        if attached_show_ids.is_empty() && attached_topic_ids.is_empty() {
            return Err(FeedError::UnattachedSpecial(special_id));
        }
        Ok(Self {
            special_id,
            title: title.into(),
            kind,
            attached_show_ids,
            attached_topic_ids,
        })
    }

    /// Identity used when collapsing duplicate specials: the id, or the
    /// title for specials that lack one.
    pub fn dedup_key(&self) -> &str {
        if self.special_id.is_empty() {
            &self.title
        } else {
            &self.special_id
        }
    }
}

/// One entry of a mixed feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedItem {
    Episode(EpisodeWithShow),
    Special(Special),
}

impl FeedItem {
    pub fn as_episode(&self) -> Option<&EpisodeWithShow> {
        match self {
            FeedItem::Episode(item) => Some(item),
            FeedItem::Special(_) => None,
        }
    }

    pub fn as_special(&self) -> Option<&Special> {
        match self {
            FeedItem::Special(special) => Some(special),
            FeedItem::Episode(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_type_round_trips_through_str() {
        for feed_type in FeedType::ALL {
            assert_eq!(feed_type.as_str().parse::<FeedType>().unwrap(), feed_type);
        }
    }

    #[test]
    fn test_unknown_feed_type_is_rejected() {
        let err = "trending".parse::<FeedType>().unwrap_err();
        assert!(matches!(err, FeedError::UnknownFeedType(ref s) if s == "trending"));
    }

    #[test]
    fn test_feed_type_serde_uses_camel_case() {
        let json = serde_json::to_string(&FeedType::NewShowsOnly).unwrap();
        assert_eq!(json, "\"newShowsOnly\"");
    }

    #[test]
    fn test_special_requires_an_attachment() {
        let err = Special::new("s1", "Orphan", SpecialKind::Recap, vec![], vec![]).unwrap_err();
        assert!(matches!(err, FeedError::UnattachedSpecial(_)));

        let ok = Special::new(
            "s2",
            "Topic only",
            SpecialKind::Qna,
            vec![],
            vec!["topic1".to_string()],
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_special_dedup_key_falls_back_to_title() {
        let mut special = Special::new(
            "",
            "Untagged",
            SpecialKind::Bts,
            vec!["show1".to_string()],
            vec![],
        )
        .unwrap();
        assert_eq!(special.dedup_key(), "Untagged");
        special.special_id = "sp-9".to_string();
        assert_eq!(special.dedup_key(), "sp-9");
    }

    #[test]
    fn test_feed_item_is_tagged_by_type() {
        let special = Special::new(
            "special1",
            "BTS",
            SpecialKind::Bts,
            vec!["show1".to_string()],
            vec![],
        )
        .unwrap();
        let json = serde_json::to_value(FeedItem::Special(special)).unwrap();
        assert_eq!(json["type"], "special");
        assert_eq!(json["kind"], "bts");
        assert_eq!(json["specialId"], "special1");
        assert_eq!(json["attachedShowIds"][0], "show1");
    }

    #[test]
    fn test_published_episode_flattens_episode_fields() {
        let published = PublishedEpisode {
            episode: Episode {
                id: "pub-s1-1-1".to_string(),
                show_id: "s1".to_string(),
                episode_number: Some(1),
                season_number: Some(1),
                title: "Pilot".to_string(),
                video_url: String::new(),
                duration: 30,
                created_at: Utc::now(),
                published_at: Some(Utc::now()),
                trailer_for_episode_number: None,
                topic_ids: vec![],
                kind: EpisodeKind::Episode,
            },
            status: PublishStatus::Published,
        };
        let json = serde_json::to_value(&published).unwrap();
        assert_eq!(json["id"], "pub-s1-1-1");
        assert_eq!(json["showId"], "s1");
        assert_eq!(json["episodeNumber"], 1);
        assert_eq!(json["status"], "published");
        let back: PublishedEpisode = serde_json::from_value(json).unwrap();
        assert_eq!(back, published);
    }

    #[test]
    fn test_episode_defaults_when_numbers_missing() {
        let json = serde_json::json!({
            "id": "e1",
            "showId": "s1",
            "createdAt": "2024-01-01T00:00:00Z"
        });
        let episode: Episode = serde_json::from_value(json).unwrap();
        assert_eq!(episode.season(), 1);
        assert_eq!(episode.number(), 0);
        assert!(!episode.is_trailer());
        assert!(!episode.is_published());
    }
}
