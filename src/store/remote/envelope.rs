use super::RemoteStore;
use crate::posts::Post;
use crate::store::error::StoreError;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};
use ureq::Agent;
use url::Url;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Client for the query-string RPC backend (the Apps Script / worker proxy
/// flavor of the remote store). Every request is a GET against a single
/// endpoint with a `path` query value selecting the logical operation;
/// responses are `{data?, error?, code?}` JSON envelopes.
#[derive(Clone)]
pub struct EnvelopeClient {
    agent: Agent,
    base_url: Url,
    token: Option<String>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<String>,
    code: Option<u16>,
}

impl EnvelopeClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Misconfigured(format!("invalid backend URL: {e}")))?;

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            agent,
            base_url,
            token,
        })
    }

    fn rpc_url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("path", path);
            if let Some(token) = &self.token {
                query.append_pair("token", token);
            }
            for (key, value) in params {
                if !value.is_empty() {
                    query.append_pair(key, value);
                }
            }
        }
        url.to_string()
    }

    async fn call<T>(&self, url: String) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || call_blocking::<T>(&agent, &url)).await?
    }
}

fn call_blocking<T: DeserializeOwned>(agent: &Agent, url: &str) -> Result<Option<T>, StoreError> {
    debug!("Envelope RPC: {}", url);
    let response = agent.get(url).call()?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let text = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(StoreError::Backend {
            code: status,
            message: text,
        });
    }

    let envelope: Envelope<T> = body.read_json()?;
    if let Some(error) = envelope.error {
        let code = envelope.code.unwrap_or(500);
        if code >= 400 {
            return Err(StoreError::Backend {
                code,
                message: error,
            });
        }
    }
    Ok(envelope.data)
}

#[async_trait]
impl RemoteStore for EnvelopeClient {
    fn name(&self) -> &str {
        "envelope RPC backend"
    }

    async fn fetch_posts(&self) -> Result<Option<Vec<Post>>, StoreError> {
        // The admin listing includes drafts; fall back to the public RPC
        // when no token is configured.
        let path = if self.token.is_some() {
            "admin/posts"
        } else {
            "public/posts"
        };
        self.call::<Vec<Post>>(self.rpc_url(path, &[])).await
    }

    /// The envelope backend has no bulk replace, so a push converges the
    /// remote set through the per-post RPCs: update what exists, create
    /// what is missing, delete what is gone. Last writer wins.
    async fn push_posts(&self, posts: &[Post]) -> Result<(), StoreError> {
        let remote = self.fetch_posts().await?.unwrap_or_default();
        let remote_ids: HashSet<&str> = remote.iter().map(|p| p.id.as_str()).collect();
        let local_ids: HashSet<&str> = posts.iter().map(|p| p.id.as_str()).collect();

        for post in posts {
            let path = if remote_ids.contains(post.id.as_str()) {
                "admin/posts/update"
            } else {
                "admin/posts/create"
            };
            let payload = serde_json::to_string(post)?;
            let url = self.rpc_url(path, &[("id", post.id.clone()), ("post", payload)]);
            self.call::<serde_json::Value>(url).await?;
        }

        for stale in remote.iter().filter(|p| !local_ids.contains(p.id.as_str())) {
            let url = self.rpc_url("admin/posts/delete", &[("id", stale.id.clone())]);
            self.call::<serde_json::Value>(url).await?;
        }

        info!("Pushed {} posts to {}", posts.len(), self.name());
        Ok(())
    }

    async fn fetch_settings(&self) -> Result<Option<HashMap<String, String>>, StoreError> {
        self.call::<HashMap<String, String>>(self.rpc_url("public/settings", &[]))
            .await
    }

    async fn push_settings(&self, settings: &HashMap<String, String>) -> Result<(), StoreError> {
        let payload = serde_json::to_string(settings)?;
        let url = self.rpc_url("admin/settings/update", &[("settings", payload)]);
        self.call::<serde_json::Value>(url).await?;
        Ok(())
    }
}
