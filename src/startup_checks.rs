use crate::Config;
use crate::store::RemoteStoreConfig;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create data directory: {0}")]
    DataDirectoryCreationFailed(#[from] std::io::Error),

    #[error("Templates directory does not exist")]
    TemplatesDirectoryMissing,

    #[error("Static files directory does not exist")]
    StaticDirectoryMissing,

    #[error("Remote store misconfigured: {0}")]
    RemoteStoreMisconfigured(String),
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    // The data directory holds the local cache and admin state; without it
    // nothing can be persisted.
    let data_dir = &config.store.data_directory;
    if !data_dir.exists() {
        info!("Data directory does not exist, creating: {:?}", data_dir);
        if let Err(e) = tokio::fs::create_dir_all(data_dir).await {
            error!("Failed to create data directory: {}", e);
            errors.push(StartupCheckError::DataDirectoryCreationFailed(e));
        }
    } else {
        info!("Data directory exists: {:?}", data_dir);
    }

    let templates_dir = &config.templates.directory;
    if !templates_dir.exists() {
        warn!("Templates directory does not exist: {:?}", templates_dir);
        errors.push(StartupCheckError::TemplatesDirectoryMissing);
    } else {
        info!("Templates directory exists: {:?}", templates_dir);
    }

    let static_dir = &config.static_files.directory;
    if !static_dir.exists() {
        warn!("Static files directory does not exist: {:?}", static_dir);
        errors.push(StartupCheckError::StaticDirectoryMissing);
    } else {
        info!("Static files directory exists: {:?}", static_dir);
    }

    match &config.store.remote {
        RemoteStoreConfig::None => {
            info!("No remote store configured, running from local cache only")
        }
        RemoteStoreConfig::Envelope { base_url, .. } => {
            if base_url.trim().is_empty() {
                errors.push(StartupCheckError::RemoteStoreMisconfigured(
                    "envelope backend URL is empty".to_string(),
                ));
            } else {
                info!("Remote store: envelope backend at {}", base_url);
            }
        }
        RemoteStoreConfig::Github {
            owner, repo, token, ..
        } => {
            if token.trim().is_empty() {
                errors.push(StartupCheckError::RemoteStoreMisconfigured(
                    "GitHub token is empty".to_string(),
                ));
            } else {
                info!("Remote store: GitHub contents API for {}/{}", owner, repo);
            }
        }
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}
