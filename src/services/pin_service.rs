// src/services/pin_service.rs
//
// Access PIN gate
//
// The PIN itself is never stored; the remote config table holds its SHA-256
// hash as lowercase hex. Verification lasts for the lifetime of the service.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};
use crate::repositories::RemoteConfigRepository;

/// Config row holding the PIN hash
pub const PIN_HASH_KEY: &str = "pin_hash";

pub struct PinService {
    config_repo: Option<Arc<dyn RemoteConfigRepository>>,
    verified: AtomicBool,
}

impl PinService {
    pub fn new(config_repo: Option<Arc<dyn RemoteConfigRepository>>) -> Self {
        Self {
            config_repo,
            verified: AtomicBool::new(false),
        }
    }

    pub fn is_session_valid(&self) -> bool {
        self.verified.load(Ordering::SeqCst)
    }

    /// Compare `pin` with the stored hash and mark the session verified on success
    pub async fn verify_pin(&self, pin: &str) -> AppResult<()> {
        let config_repo = self
            .config_repo
            .as_ref()
            .ok_or(AppError::RemoteNotConfigured)?;

        let stored_hash = config_repo
            .get_value(PIN_HASH_KEY)
            .await?
            .filter(|hash| !hash.trim().is_empty())
            .ok_or_else(|| AppError::AccessDenied("no PIN configured".to_string()))?;

        if hash_pin(pin) != stored_hash.trim().to_lowercase() {
            log::warn!("PIN verification failed");
            return Err(AppError::AccessDenied("wrong PIN".to_string()));
        }

        self.verified.store(true, Ordering::SeqCst);
        log::info!("PIN verified");
        Ok(())
    }

    pub fn clear_session(&self) {
        self.verified.store(false, Ordering::SeqCst);
    }
}

/// Lowercase hex SHA-256 of the PIN's UTF-8 bytes
pub fn hash_pin(pin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pin.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockRemoteConfigRepository;

    // sha256("1234")
    const HASH_1234: &str = "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4";

    fn service_returning(value: Option<&'static str>) -> PinService {
        let mut repo = MockRemoteConfigRepository::new();
        repo.expect_get_value()
            .withf(|key| key == PIN_HASH_KEY)
            .returning(move |_| Ok(value.map(str::to_string)));
        PinService::new(Some(Arc::new(repo)))
    }

    #[test]
    fn test_hash_pin() {
        assert_eq!(hash_pin("1234"), HASH_1234);
    }

    #[tokio::test]
    async fn test_correct_pin_verifies_session() {
        let service = service_returning(Some(HASH_1234));
        assert!(!service.is_session_valid());

        service.verify_pin("1234").await.unwrap();
        assert!(service.is_session_valid());

        service.clear_session();
        assert!(!service.is_session_valid());
    }

    #[tokio::test]
    async fn test_wrong_pin_is_denied() {
        let service = service_returning(Some(HASH_1234));

        let result = service.verify_pin("0000").await;

        assert!(matches!(result, Err(AppError::AccessDenied(_))));
        assert!(!service.is_session_valid());
    }

    #[tokio::test]
    async fn test_missing_pin_hash() {
        let service = service_returning(None);

        assert!(matches!(
            service.verify_pin("1234").await,
            Err(AppError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_without_remote() {
        let service = PinService::new(None);

        assert!(matches!(
            service.verify_pin("1234").await,
            Err(AppError::RemoteNotConfigured)
        ));
    }
}
