use super::RemoteStore;
use crate::posts::Post;
use crate::store::error::StoreError;
use async_trait::async_trait;
use tracing::debug;

/// Stand-in when no remote store is configured. Fetches report nothing and
/// pushes are acknowledged without doing anything, so the repository runs
/// purely off the local cache.
pub struct NullRemote;

impl NullRemote {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for NullRemote {
    fn name(&self) -> &str {
        "no remote store (local cache only)"
    }

    async fn fetch_posts(&self) -> Result<Option<Vec<Post>>, StoreError> {
        debug!("Null remote store: nothing to fetch");
        Ok(None)
    }

    async fn push_posts(&self, posts: &[Post]) -> Result<(), StoreError> {
        debug!("Null remote store: discarding push of {} posts", posts.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_remote_fetch_is_empty() {
        let remote = NullRemote::new();
        let posts = remote.fetch_posts().await.unwrap();
        assert!(posts.is_none());
    }

    #[tokio::test]
    async fn test_null_remote_push_succeeds() {
        let remote = NullRemote::new();
        assert!(remote.push_posts(&[]).await.is_ok());
    }
}
