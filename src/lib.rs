//! Feed resolution core for an episodic show app.
//!
//! - [`catalog`]: curated episodes, behind an upstream fuse with a mock fallback
//! - [`storage`]: SQLite-backed key-value layer and the creator store
//! - [`feed`]: feeds, show resolution, topics and publishing via [`feed::FeedApi`]
//! - [`config`]: optional TOML configuration
//! - [`util`]: text width helpers and id generation

pub mod catalog;
pub mod config;
pub mod feed;
pub mod storage;
pub mod util;
