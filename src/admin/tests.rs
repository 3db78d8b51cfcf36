#[cfg(test)]
mod tests {
    use super::super::*;
    use tempfile::TempDir;

    fn test_config() -> AdminConfig {
        AdminConfig {
            username: "admin".to_string(),
            password_sha256: SessionStore::hash_password("correct horse"),
            session_secret: "test-secret".to_string(),
            session_hours: 24,
        }
    }

    #[test]
    fn test_password_digest_is_hex_sha256() {
        let digest = SessionStore::hash_password("abc");
        assert_eq!(digest.len(), 64);
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_login_and_verify() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::open(temp_dir.path(), test_config()).await;

        let session = store.login("admin", "correct horse").await.unwrap();
        assert!(store.verify(&session.token).await);
        assert!(!store.verify("some-other-token").await);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::open(temp_dir.path(), test_config()).await;

        assert!(matches!(
            store.login("admin", "wrong").await,
            Err(AdminError::InvalidCredentials)
        ));
        assert!(matches!(
            store.login("root", "correct horse").await,
            Err(AdminError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::open(temp_dir.path(), test_config()).await;

        let session = store.login("admin", "correct horse").await.unwrap();
        store.logout().await;
        assert!(!store.verify(&session.token).await);
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config();
        config.session_hours = -1; // already expired when issued
        let store = SessionStore::open(temp_dir.path(), config).await;

        let session = store.login("admin", "correct horse").await.unwrap();
        assert!(!store.verify(&session.token).await);
    }

    #[tokio::test]
    async fn test_session_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let token = {
            let store = SessionStore::open(temp_dir.path(), test_config()).await;
            store.login("admin", "correct horse").await.unwrap().token
        };

        let reopened = SessionStore::open(temp_dir.path(), test_config()).await;
        assert!(reopened.verify(&token).await);
    }

    #[tokio::test]
    async fn test_change_password() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::open(temp_dir.path(), test_config()).await;

        assert!(matches!(
            store.change_password("wrong", "new-password-1").await,
            Err(AdminError::WrongPassword)
        ));
        assert!(matches!(
            store.change_password("correct horse", "short").await,
            Err(AdminError::WeakPassword)
        ));

        store
            .change_password("correct horse", "new-password-1")
            .await
            .unwrap();

        assert!(store.login("admin", "correct horse").await.is_err());
        assert!(store.login("admin", "new-password-1").await.is_ok());

        // The new digest is on disk, not just in memory
        let reopened = SessionStore::open(temp_dir.path(), test_config()).await;
        assert!(reopened.login("admin", "new-password-1").await.is_ok());
    }
}
