//! Catalog provider: the curated show/episode dataset behind every feed.
//!
//! - [`MockCatalog`] serves the static seed tables.
//! - [`FileCatalog`] reads an exported catalog from a JSON file.
//! - [`CatalogSource`] is the seam a backend-backed catalog would implement.
//! - [`Catalog`] sits in front of both. It consults the upstream source under a
//!   timeout and, after the first failure, serves the seed tables for the rest
//!   of the process lifetime. The fuse never resets and the upstream is never
//!   retried.

mod file;
mod mock;

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::feed::normalize::select_resume_per_show;
use crate::feed::{EpisodeWithShow, FeedType};

pub use file::FileCatalog;
pub use mock::MockCatalog;

/// Errors an upstream catalog source can report.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The source could not produce the feed
    #[error("Catalog source '{source_name}' unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    /// The source did not answer within the fetch timeout
    #[error("Catalog fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// A provider of raw, per-feed-type catalog data.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Fetch the raw items for one feed type.
    async fn fetch(&self, feed_type: FeedType) -> Result<Vec<EpisodeWithShow>, CatalogError>;
}

/// Catalog front with an upstream fuse.
pub struct Catalog {
    upstream: Option<Arc<dyn CatalogSource>>,
    fallback: MockCatalog,
    timeout: Duration,
    tripped: AtomicBool,
}

impl Catalog {
    /// Fetch timeout applied to upstream sources unless configured otherwise.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);

    /// A catalog that only ever serves the seed tables.
    pub fn mock() -> Self {
        Self {
            upstream: None,
            fallback: MockCatalog,
            timeout: Self::DEFAULT_TIMEOUT,
            tripped: AtomicBool::new(false),
        }
    }

    /// A catalog that prefers `upstream` until its first failure or timeout.
    pub fn with_upstream(upstream: Arc<dyn CatalogSource>, timeout: Duration) -> Self {
        Self {
            upstream: Some(upstream),
            fallback: MockCatalog,
            timeout,
            tripped: AtomicBool::new(false),
        }
    }

    /// True once the upstream has failed and the seed tables took over.
    pub fn is_degraded(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }

    /// Items for `feed_type`, not yet normalized.
    ///
    /// The continue feed is reduced to one resume item per show here, whichever
    /// source answered.
    pub async fn fetch(&self, feed_type: FeedType) -> Vec<EpisodeWithShow> {
        let items = match self.live_upstream() {
            Some(upstream) => {
                match tokio::time::timeout(self.timeout, upstream.fetch(feed_type)).await {
                    Ok(Ok(items)) => items,
                    Ok(Err(e)) => {
                        self.trip(upstream.name(), &e);
                        self.fallback.episodes(feed_type)
                    }
                    Err(_) => {
                        self.trip(upstream.name(), &CatalogError::Timeout(self.timeout));
                        self.fallback.episodes(feed_type)
                    }
                }
            }
            None => self.fallback.episodes(feed_type),
        };

        match feed_type {
            FeedType::Continue => select_resume_per_show(items),
            _ => items,
        }
    }

    fn live_upstream(&self) -> Option<&Arc<dyn CatalogSource>> {
        if self.is_degraded() {
            return None;
        }
        self.upstream.as_ref()
    }

    fn trip(&self, source: &str, error: &CatalogError) {
        // Only the call that flips the fuse logs.
        if !self.tripped.swap(true, Ordering::AcqRel) {
            tracing::warn!(
                source = %source,
                error = %error,
                "Upstream catalog failed, serving seed catalog for the rest of this session"
            );
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::mock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct FailingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self, _feed_type: FeedType) -> Result<Vec<EpisodeWithShow>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CatalogError::Unavailable {
                source_name: "failing".to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    struct SlowSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogSource for SlowSource {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch(&self, _feed_type: FeedType) -> Result<Vec<EpisodeWithShow>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    /// Answers every feed with the seed "new" table, so upstream data is
    /// distinguishable from the fallback.
    struct EchoSource;

    #[async_trait]
    impl CatalogSource for EchoSource {
        fn name(&self) -> &str {
            "echo"
        }

        async fn fetch(&self, _feed_type: FeedType) -> Result<Vec<EpisodeWithShow>, CatalogError> {
            Ok(MockCatalog.episodes(FeedType::New))
        }
    }

    #[tokio::test]
    async fn test_mock_catalog_serves_seed_tables() {
        let catalog = Catalog::mock();
        let items = catalog.fetch(FeedType::NewShowsOnly).await;
        assert_eq!(items.len(), 2);
        assert!(!catalog.is_degraded());
    }

    #[tokio::test]
    async fn test_continue_feed_has_one_item_per_show() {
        let catalog = Catalog::mock();
        let items = catalog.fetch(FeedType::Continue).await;
        assert_eq!(items.len(), 2);

        let show3 = items.iter().find(|i| i.show.id == "show3").unwrap();
        assert_eq!(show3.episode.episode_number, Some(12));
        let show4 = items.iter().find(|i| i.show.id == "show4").unwrap();
        assert_eq!(show4.episode.id, "ep4");
    }

    #[tokio::test]
    async fn test_healthy_upstream_is_used() {
        let catalog = Catalog::with_upstream(Arc::new(EchoSource), Catalog::DEFAULT_TIMEOUT);
        let items = catalog.fetch(FeedType::Local).await;
        assert!(items.iter().all(|i| i.show.id == "show1" || i.show.id == "show2"));
        assert!(!catalog.is_degraded());
    }

    #[tokio::test]
    async fn test_failure_trips_fuse_permanently() {
        let source = Arc::new(FailingSource {
            calls: AtomicUsize::new(0),
        });
        let catalog = Catalog::with_upstream(source.clone(), Catalog::DEFAULT_TIMEOUT);

        let first = catalog.fetch(FeedType::Local).await;
        assert_eq!(first.len(), 2);
        assert!(catalog.is_degraded());

        catalog.fetch(FeedType::New).await;
        catalog.fetch(FeedType::Library).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_trips_fuse() {
        let source = Arc::new(SlowSource {
            calls: AtomicUsize::new(0),
        });
        let catalog = Catalog::with_upstream(source.clone(), Catalog::DEFAULT_TIMEOUT);

        let items = catalog.fetch(FeedType::New).await;
        assert_eq!(items.len(), 3);
        assert!(catalog.is_degraded());

        catalog.fetch(FeedType::New).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
