use super::error::AdminError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

const SESSION_FILE: &str = "admin_session.json";
const CREDENTIALS_FILE: &str = "admin_credentials.json";
const MIN_PASSWORD_LENGTH: usize = 8;

fn default_session_hours() -> i64 {
    24
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    /// Hex-encoded SHA-256 digest of the admin password. The plaintext
    /// never appears in the config file.
    pub password_sha256: String,
    /// Secret for signing session cookies.
    pub session_secret: String,
    #[serde(default = "default_session_hours")]
    pub session_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredentials {
    username: String,
    password_sha256: String,
}

/// Token sessions and credential checks, persisted in the data directory
/// so a restart does not log the admin out. One admin, one live session:
/// a new login replaces the previous token.
pub struct SessionStore {
    config: AdminConfig,
    session_path: PathBuf,
    credentials_path: PathBuf,
    credentials: RwLock<StoredCredentials>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub async fn open(data_dir: &Path, config: AdminConfig) -> Self {
        let credentials_path = data_dir.join(CREDENTIALS_FILE);
        let session_path = data_dir.join(SESSION_FILE);

        // Credentials live in a file so password changes survive restarts;
        // the config only seeds the first run.
        let credentials = match tokio::fs::read_to_string(&credentials_path).await {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("Ignoring malformed credentials file: {}", e);
                    StoredCredentials {
                        username: config.username.clone(),
                        password_sha256: config.password_sha256.clone(),
                    }
                }
            },
            Err(_) => StoredCredentials {
                username: config.username.clone(),
                password_sha256: config.password_sha256.clone(),
            },
        };

        let current = match tokio::fs::read_to_string(&session_path).await {
            Ok(contents) => serde_json::from_str::<Session>(&contents).ok(),
            Err(_) => None,
        };

        Self {
            config,
            session_path,
            credentials_path,
            credentials: RwLock::new(credentials),
            current: RwLock::new(current),
        }
    }

    pub fn session_secret(&self) -> &str {
        &self.config.session_secret
    }

    pub fn hash_password(password: &str) -> String {
        let digest = Sha256::digest(password.as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AdminError> {
        let credentials = self.credentials.read().await;
        if username != credentials.username
            || Self::hash_password(password) != credentials.password_sha256
        {
            warn!("Admin login failed for '{}'", username);
            return Err(AdminError::InvalidCredentials);
        }
        drop(credentials);

        let session = Session {
            token: Uuid::new_v4().to_string(),
            expires_at: Utc::now() + Duration::hours(self.config.session_hours),
        };

        *self.current.write().await = Some(session.clone());
        if let Err(e) = self.persist_session(Some(&session)).await {
            warn!("Failed to persist admin session: {}", e);
        }

        info!("Admin '{}' logged in", username);
        Ok(session)
    }

    /// Check a bare token against the live session, clearing it when it
    /// has expired.
    pub async fn verify(&self, token: &str) -> bool {
        let expired = {
            let current = self.current.read().await;
            match current.as_ref() {
                Some(session) if session.token == token => {
                    if session.expires_at > Utc::now() {
                        return true;
                    }
                    true // matched but stale; fall through to clear it
                }
                _ => return false,
            }
        };

        if expired {
            self.logout().await;
        }
        false
    }

    pub async fn logout(&self) {
        *self.current.write().await = None;
        if let Err(e) = self.persist_session(None).await {
            warn!("Failed to clear persisted admin session: {}", e);
        }
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AdminError> {
        let mut credentials = self.credentials.write().await;
        if Self::hash_password(current_password) != credentials.password_sha256 {
            return Err(AdminError::WrongPassword);
        }
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(AdminError::WeakPassword);
        }

        credentials.password_sha256 = Self::hash_password(new_password);
        let json = serde_json::to_string_pretty(&*credentials)?;
        tokio::fs::write(&self.credentials_path, json).await?;

        info!("Admin password changed");
        Ok(())
    }

    /// Overwrite the stored credentials outright (CLI path; no current
    /// password needed since the operator already has the data directory).
    pub async fn set_password(data_dir: &Path, username: &str, password: &str) -> Result<(), AdminError> {
        let credentials = StoredCredentials {
            username: username.to_string(),
            password_sha256: Self::hash_password(password),
        };
        let json = serde_json::to_string_pretty(&credentials)?;
        tokio::fs::write(data_dir.join(CREDENTIALS_FILE), json).await?;
        Ok(())
    }

    async fn persist_session(&self, session: Option<&Session>) -> Result<(), AdminError> {
        match session {
            Some(session) => {
                let json = serde_json::to_string_pretty(session)?;
                tokio::fs::write(&self.session_path, json).await?;
            }
            None => {
                if let Err(e) = tokio::fs::remove_file(&self.session_path).await
                    && e.kind() != std::io::ErrorKind::NotFound
                {
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }
}
