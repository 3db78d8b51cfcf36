// Remote store providers - interchangeable JSON blob backends
pub mod envelope;
pub mod github;
pub mod null;

use super::error::StoreError;
use crate::posts::Post;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A remote backing store for the post set. Providers differ in transport
/// (query-string RPC envelope vs. GitHub contents API) but all behave as
/// last-writer-wins JSON blob storage: a fetch returns the full post set
/// (or `None` when the backend has nothing yet) and a push replaces it.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_posts(&self) -> Result<Option<Vec<Post>>, StoreError>;

    async fn push_posts(&self, posts: &[Post]) -> Result<(), StoreError>;

    /// Site settings live on the envelope backend only; blob providers
    /// report nothing and accept pushes as a no-op.
    async fn fetch_settings(&self) -> Result<Option<HashMap<String, String>>, StoreError> {
        Ok(None)
    }

    async fn push_settings(&self, _settings: &HashMap<String, String>) -> Result<(), StoreError> {
        Ok(())
    }
}

pub type DynRemoteStore = Arc<dyn RemoteStore>;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum RemoteStoreConfig {
    /// No remote store configured; the local cache is the only persistence.
    #[default]
    None,
    /// Query-string RPC endpoint (Apps Script / worker proxy style).
    Envelope {
        base_url: String,
        #[serde(default)]
        token: Option<String>,
    },
    /// GitHub contents API, storing the post set as a single JSON file.
    Github {
        owner: String,
        repo: String,
        #[serde(default = "default_branch")]
        branch: String,
        token: String,
        #[serde(default = "default_content_path")]
        content_path: String,
    },
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_content_path() -> String {
    "data/posts.json".to_string()
}

pub fn create_remote_store(config: &RemoteStoreConfig) -> Result<DynRemoteStore, StoreError> {
    match config {
        RemoteStoreConfig::None => Ok(Arc::new(null::NullRemote::new())),
        RemoteStoreConfig::Envelope { base_url, token } => Ok(Arc::new(
            envelope::EnvelopeClient::new(base_url, token.clone())?,
        )),
        RemoteStoreConfig::Github {
            owner,
            repo,
            branch,
            token,
            content_path,
        } => Ok(Arc::new(github::GithubClient::new(
            owner,
            repo,
            branch,
            token,
            content_path,
        ))),
    }
}
