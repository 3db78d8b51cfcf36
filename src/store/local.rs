use super::{PostsBlob, error::StoreError};
use crate::posts::Post;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::debug;

const CACHE_FILE: &str = "blog_posts.json";

/// File-backed post cache in the data directory. This is the offline-first
/// side of the redundant persistence pair: reads never touch the network,
/// and every mutation is written through here before the remote push is
/// attempted.
pub struct LocalCache {
    path: PathBuf,
}

impl LocalCache {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CACHE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `Ok(None)` when no cache file exists yet.
    pub async fn load(&self) -> Result<Option<Vec<Post>>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let blob: PostsBlob = serde_json::from_str(&contents)?;
                debug!("Loaded {} posts from local cache", blob.posts.len());
                Ok(Some(blob.posts))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, posts: &[Post]) -> Result<(), StoreError> {
        let blob = PostsBlob {
            posts: posts.to_vec(),
            last_updated: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&blob)?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Wrote {} posts to local cache", posts.len());
        Ok(())
    }
}
