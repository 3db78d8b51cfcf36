use super::{DynRemoteStore, LocalCache, error::StoreError};
use crate::posts::{Post, PostDraft, PostStatus, generate_post_id, query};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// The facade over the redundant persistence pair. Reads are served from
/// the in-memory set, which is seeded from the local cache and refreshed
/// from the remote store when it is reachable. Writes go to the local
/// cache first (that write must succeed), then to the remote store
/// best-effort; a failed remote push degrades to local-only persistence
/// and is reported, never fatal.
pub struct PostRepository {
    local: LocalCache,
    remote: DynRemoteStore,
    posts: Arc<RwLock<Vec<Post>>>,
}

/// Result of a mutation: the affected post and whether the remote store
/// acknowledged the push.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub post: Post,
    pub synced: bool,
}

/// File interchange shape for post exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsExport {
    pub posts: Vec<Post>,
    pub export_date: DateTime<Utc>,
}

impl PostRepository {
    pub fn new(local: LocalCache, remote: DynRemoteStore) -> Self {
        Self {
            local,
            remote,
            posts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Initial load: local cache first (instant), then the remote store.
    /// Remote failure leaves the cached set in place.
    pub async fn load(&self) {
        match self.local.load().await {
            Ok(Some(posts)) => {
                info!("Loaded {} posts from local cache", posts.len());
                *self.posts.write().await = posts;
            }
            Ok(None) => debug!("No local post cache yet"),
            Err(e) => warn!("Failed to read local post cache: {}", e),
        }

        match self.refresh_from_remote().await {
            Ok(true) => info!("Post set refreshed from {}", self.remote.name()),
            Ok(false) => debug!("Remote store has no post data"),
            Err(e) => warn!(
                "Remote store unreachable, serving cached posts: {}",
                e
            ),
        }
    }

    /// Pull the post set from the remote store. Returns whether the remote
    /// had data; on success the local cache is written through.
    pub async fn refresh_from_remote(&self) -> Result<bool, StoreError> {
        match self.remote.fetch_posts().await? {
            Some(remote_posts) => {
                info!(
                    "Fetched {} posts from {}",
                    remote_posts.len(),
                    self.remote.name()
                );
                *self.posts.write().await = remote_posts.clone();
                if let Err(e) = self.local.save(&remote_posts).await {
                    warn!("Failed to write local cache after remote refresh: {}", e);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn start_background_refresh(repository: Arc<PostRepository>, interval_minutes: u64) {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_minutes * 60));
            interval.tick().await; // Skip the first immediate tick

            loop {
                interval.tick().await;
                debug!("Starting scheduled remote refresh");

                if let Err(e) = repository.refresh_from_remote().await {
                    error!("Scheduled remote refresh failed: {}", e);
                }
            }
        });
    }

    /// Local write must succeed; the remote push is best-effort. Returns
    /// whether the remote acknowledged.
    async fn persist(&self, posts: &[Post]) -> Result<bool, StoreError> {
        self.local.save(posts).await?;
        match self.remote.push_posts(posts).await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Remote sync failed, post data saved locally only: {}", e);
                Ok(false)
            }
        }
    }

    /// Create or update a post. Title and content are required; everything
    /// else is free-form.
    pub async fn save_post(&self, draft: PostDraft) -> Result<SaveOutcome, StoreError> {
        if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
            return Err(StoreError::Validation(
                "title and content are required".to_string(),
            ));
        }

        let now = Utc::now();
        let mut posts = self.posts.write().await;

        let existing = draft
            .id
            .as_deref()
            .and_then(|id| posts.iter().position(|p| p.id == id));

        let post = match existing {
            Some(index) => {
                let previous = &posts[index];
                let updated = Post {
                    id: previous.id.clone(),
                    title: draft.title,
                    content: draft.content,
                    excerpt: draft.excerpt,
                    category: draft.category,
                    tags: draft.tags,
                    featured_image: draft.featured_image,
                    status: draft.status.unwrap_or(previous.status),
                    date: previous.date,
                    updated_at: now,
                };
                posts[index] = updated.clone();
                updated
            }
            None => {
                let post = Post {
                    id: draft.id.unwrap_or_else(generate_post_id),
                    title: draft.title,
                    content: draft.content,
                    excerpt: draft.excerpt,
                    category: draft.category,
                    tags: draft.tags,
                    featured_image: draft.featured_image,
                    status: draft.status.unwrap_or(PostStatus::Draft),
                    date: now,
                    updated_at: now,
                };
                // New posts go to the front, like the dashboard list
                posts.insert(0, post.clone());
                post
            }
        };

        let snapshot = posts.clone();
        drop(posts);

        let synced = self.persist(&snapshot).await?;
        Ok(SaveOutcome { post, synced })
    }

    pub async fn delete_post(&self, id: &str) -> Result<bool, StoreError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(StoreError::PostNotFound(id.to_string()));
        }
        let snapshot = posts.clone();
        drop(posts);

        self.persist(&snapshot).await
    }

    pub async fn set_status(
        &self,
        id: &str,
        status: PostStatus,
    ) -> Result<SaveOutcome, StoreError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Err(StoreError::PostNotFound(id.to_string()));
        };
        post.status = status;
        post.updated_at = Utc::now();
        let post = post.clone();
        let snapshot = posts.clone();
        drop(posts);

        let synced = self.persist(&snapshot).await?;
        Ok(SaveOutcome { post, synced })
    }

    /// Replace the whole post set from an export file.
    pub async fn import(&self, export: PostsExport) -> Result<(usize, bool), StoreError> {
        let count = export.posts.len();
        let mut posts = self.posts.write().await;
        *posts = export.posts;
        let snapshot = posts.clone();
        drop(posts);

        let synced = self.persist(&snapshot).await?;
        info!("Imported {} posts", count);
        Ok((count, synced))
    }

    pub async fn export(&self) -> PostsExport {
        PostsExport {
            posts: self.posts.read().await.clone(),
            export_date: Utc::now(),
        }
    }

    pub async fn all_posts(&self) -> Vec<Post> {
        self.posts.read().await.clone()
    }

    pub async fn post_by_id(&self, id: &str) -> Option<Post> {
        self.posts.read().await.iter().find(|p| p.id == id).cloned()
    }

    pub async fn published_post(&self, id: &str) -> Option<Post> {
        self.post_by_id(id)
            .await
            .filter(|p| p.status == PostStatus::Published)
    }

    pub async fn published(&self) -> Vec<Post> {
        query::published(&self.posts.read().await)
    }

    pub async fn categories(&self) -> Vec<String> {
        query::categories(&self.posts.read().await)
    }

    pub async fn related(&self, current: &Post, limit: usize) -> Vec<Post> {
        query::related(&self.posts.read().await, current, limit)
    }

    pub async fn stats(&self) -> query::PostStats {
        query::stats(&self.posts.read().await)
    }
}
