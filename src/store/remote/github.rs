use super::RemoteStore;
use crate::posts::Post;
use crate::store::{PostsBlob, error::StoreError};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use ureq::Agent;

const GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_TIMEOUT: u64 = 30;

/// Remote store backed by the GitHub contents API. The full post set lives
/// in one JSON file in the repository; updates are SHA-guarded PUTs so a
/// concurrent writer simply wins with whatever lands last.
#[derive(Clone)]
pub struct GithubClient {
    agent: Agent,
    owner: String,
    repo: String,
    branch: String,
    token: String,
    content_path: String,
}

#[derive(Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Serialize)]
struct ContentsUpdate {
    message: String,
    content: String,
    branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

impl GithubClient {
    pub fn new(owner: &str, repo: &str, branch: &str, token: &str, content_path: &str) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            token: token.to_string(),
            content_path: content_path.to_string(),
        }
    }

    fn contents_url(&self) -> String {
        format!(
            "{GITHUB_API_BASE}/repos/{}/{}/contents/{}",
            self.owner, self.repo, self.content_path
        )
    }

    fn get_file_blocking(&self) -> Result<Option<ContentsResponse>, StoreError> {
        let url = format!("{}?ref={}", self.contents_url(), self.branch);
        debug!("GitHub GET {}", url);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .call()?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status == 404 {
            return Ok(None);
        }
        if status >= 400 {
            let text = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(StoreError::Backend {
                code: status,
                message: text,
            });
        }

        Ok(Some(body.read_json()?))
    }

    fn put_file_blocking(&self, blob: &PostsBlob, sha: Option<String>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(blob)?;
        let payload = ContentsUpdate {
            message: format!("Update blog posts - {}", Utc::now().to_rfc3339()),
            content: general_purpose::STANDARD.encode(json),
            branch: self.branch.clone(),
            sha,
        };

        let response = self
            .agent
            .put(&self.contents_url())
            .header("Authorization", &format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .send_json(&payload)?;

        let status = response.status().as_u16();
        if status >= 400 {
            let text = response
                .into_body()
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(StoreError::Backend {
                code: status,
                message: text,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for GithubClient {
    fn name(&self) -> &str {
        "GitHub contents API"
    }

    async fn fetch_posts(&self) -> Result<Option<Vec<Post>>, StoreError> {
        let client = self.clone();
        let contents =
            tokio::task::spawn_blocking(move || client.get_file_blocking()).await??;

        let Some(contents) = contents else {
            return Ok(None);
        };

        // GitHub wraps base64 content across lines
        let packed: String = contents.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = general_purpose::STANDARD.decode(packed)?;
        let blob: PostsBlob = serde_json::from_str(&String::from_utf8(bytes)?)?;
        Ok(Some(blob.posts))
    }

    async fn push_posts(&self, posts: &[Post]) -> Result<(), StoreError> {
        let blob = PostsBlob {
            posts: posts.to_vec(),
            last_updated: Utc::now(),
        };

        let client = self.clone();
        let count = posts.len();
        tokio::task::spawn_blocking(move || {
            // The current SHA is required when the file already exists
            let sha = client.get_file_blocking()?.map(|c| c.sha);
            client.put_file_blocking(&blob, sha)
        })
        .await??;

        info!("Pushed {} posts to {}", count, self.name());
        Ok(())
    }
}
