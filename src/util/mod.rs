//! Small helpers shared by the CLI and the creator flows.
//!
//! - **Text**: Unicode-aware width, truncation and padding for title columns
//! - **Ids**: Random, time-prefixed ids for drafts and local shows
//!
//! ```
//! use episodic::util::{generate_id, pad_to_width};
//!
//! let id = generate_id("draft");
//! assert!(id.starts_with("draft-"));
//!
//! assert_eq!(pad_to_width("Pilot", 8), "Pilot   ");
//! ```

mod ids;
mod text;

pub use ids::generate_id;
pub use text::{display_width, pad_to_width, sanitize_title, truncate_to_width};
