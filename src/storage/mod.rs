mod creator;
mod kv;
mod schema;
mod types;

pub use creator::{
    CreatorShow, CreatorStore, DraftEpisode, DraftPatch, DraftScene, NewDraft, CREATOR_STORE_KEY,
};
pub use schema::Database;
pub use types::{DatabaseError, StoreError};
