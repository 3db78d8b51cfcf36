// Store module - redundant post persistence (local cache + remote store)
mod error;
mod local;
mod remote;
mod repository;

pub use error::StoreError;
pub use local::LocalCache;
pub use remote::{DynRemoteStore, RemoteStore, RemoteStoreConfig, create_remote_store};
pub use repository::{PostRepository, PostsExport, SaveOutcome};

use crate::posts::Post;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The JSON blob shape shared by the local cache file and blob-style remote
/// stores. Wire format is camelCase for interchange with existing exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsBlob {
    pub posts: Vec<Post>,
    pub last_updated: DateTime<Utc>,
}
