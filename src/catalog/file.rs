use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

use super::{CatalogError, CatalogSource};
use crate::feed::{EpisodeWithShow, FeedType};

/// Catalog exported to a JSON file: an object keyed by feed type name
/// (`"new"`, `"continue"`, ...) whose values are arrays of
/// `{ "episode": {..}, "show": {..} }` records.
///
/// Record fields are camelCase (`showId`, `episodeNumber`, `topicIds`), the
/// same shape the app's feed API returns, so its responses can be saved as-is.
/// Unknown fields such as a `"type": "episode"` tag are ignored.
///
/// The file is re-read on every fetch. Feed types missing from the file are
/// served empty.
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn unavailable(&self, reason: impl ToString) -> CatalogError {
        CatalogError::Unavailable {
            source_name: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, feed_type: FeedType) -> Result<Vec<EpisodeWithShow>, CatalogError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.unavailable(e))?;
        let mut feeds: HashMap<String, Vec<EpisodeWithShow>> =
            serde_json::from_slice(&bytes).map_err(|e| self.unavailable(e))?;

        let items = feeds.remove(feed_type.as_str()).unwrap_or_default();
        tracing::debug!(
            path = %self.path.display(),
            feed = %feed_type,
            count = items.len(),
            "Read catalog file"
        );
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockCatalog;

    fn write_catalog(name: &str, content: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("episodic_catalog_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_reads_feed_by_type_name() {
        let mut feeds = HashMap::new();
        feeds.insert("newShowsOnly", MockCatalog.episodes(FeedType::NewShowsOnly));
        let path = write_catalog("by_type", &serde_json::to_vec(&feeds).unwrap());

        let source = FileCatalog::new(&path);
        let items = source.fetch(FeedType::NewShowsOnly).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(source.fetch(FeedType::Library).await.unwrap().is_empty());

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_reads_camel_case_api_export() {
        let export = br#"{
            "new": [{
                "type": "episode",
                "episode": {
                    "id": "ep9",
                    "showId": "show9",
                    "episodeNumber": 3,
                    "seasonNumber": 2,
                    "title": "Exported",
                    "videoUrl": "https://example.invalid/ep9.mp4",
                    "duration": 300,
                    "createdAt": "2024-03-01T12:00:00Z",
                    "publishedAt": "2024-03-02T12:00:00Z"
                },
                "show": {
                    "id": "show9",
                    "title": "Exported Show",
                    "creatorId": "creator9",
                    "topicIds": ["film"]
                }
            }]
        }"#;
        let path = write_catalog("camel_case", export);

        let items = FileCatalog::new(&path).fetch(FeedType::New).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].episode.show_id, "show9");
        assert_eq!(items[0].episode.episode_number, Some(3));
        assert_eq!(items[0].episode.season_number, Some(2));
        assert!(items[0].episode.is_published());
        assert_eq!(items[0].show.creator_id, "creator9");
        assert_eq!(items[0].show.topic_ids, vec!["film"]);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let source = FileCatalog::new("/tmp/episodic_no_such_catalog.json");
        let err = source.fetch(FeedType::New).await.unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_malformed_file_is_unavailable() {
        let path = write_catalog("malformed", b"[1, 2");
        let err = FileCatalog::new(&path).fetch(FeedType::New).await.unwrap_err();
        assert!(err.to_string().contains("unavailable"));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
