use crate::api::ApiResponse;
use crate::store::{DynRemoteStore, StoreError};
use crate::AppState;
use axum::extract::State;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const SETTINGS_FILE: &str = "site_settings.json";

/// Free-form site settings (social links and the like). No schema; the
/// templates pick out the keys they care about. Persisted the same way as
/// posts: local file always, remote store when one is configured.
pub struct SettingsStore {
    path: PathBuf,
    remote: DynRemoteStore,
    values: RwLock<HashMap<String, String>>,
}

impl SettingsStore {
    pub fn new(data_dir: &Path, remote: DynRemoteStore) -> Self {
        Self {
            path: data_dir.join(SETTINGS_FILE),
            remote,
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Local file first, then the remote store when it answers.
    pub async fn load(&self) {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => match serde_json::from_str::<HashMap<String, String>>(&contents) {
                Ok(values) => {
                    debug!("Loaded {} site settings from disk", values.len());
                    *self.values.write().await = values;
                }
                Err(e) => warn!("Ignoring malformed settings file: {}", e),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to read settings file: {}", e),
        }

        match self.remote.fetch_settings().await {
            Ok(Some(values)) => {
                info!("Loaded {} site settings from remote store", values.len());
                if let Err(e) = self.write_file(&values).await {
                    warn!("Failed to cache remote settings: {}", e);
                }
                *self.values.write().await = values;
            }
            Ok(None) => {}
            Err(e) => warn!("Remote settings unavailable: {}", e),
        }
    }

    pub async fn all(&self) -> HashMap<String, String> {
        self.values.read().await.clone()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    /// Merge updates in; local write must succeed, remote push is
    /// best-effort. Returns whether the remote acknowledged.
    pub async fn update(&self, updates: HashMap<String, String>) -> Result<bool, StoreError> {
        let snapshot = {
            let mut values = self.values.write().await;
            values.extend(updates);
            values.clone()
        };

        self.write_file(&snapshot).await?;
        match self.remote.push_settings(&snapshot).await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Remote settings sync failed, saved locally only: {}", e);
                Ok(false)
            }
        }
    }

    async fn write_file(&self, values: &HashMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(values)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// Public settings endpoint; the site pages read social links from it.
pub async fn public_settings_handler(
    State(state): State<AppState>,
) -> ApiResponse<HashMap<String, String>> {
    ApiResponse::ok(state.settings.all().await)
}
