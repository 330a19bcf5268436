//! Device identity
//!
//! Every quota and purchase is attributed to a device identifier that stays
//! stable across sessions. Resolution order:
//!
//! 1. identifier already resolved in this process
//! 2. identifier in local storage (`device_id`)
//! 3. fingerprint computed from the environment
//! 4. random UUID, if fingerprinting fails
//!
//! Whatever is obtained is cached in memory and written to storage, so the
//! fingerprint is computed at most once per profile.

use std::fmt;
use std::sync::Arc;

use anyhow::{bail, Result};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::{Config, DEVICE_ID_STORAGE_KEY};
use crate::storage::LocalStorage;

/// Length of a fingerprint identifier in hex characters
const FINGERPRINT_LEN: usize = 32;

/// Returned when an empty identifier is supplied
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Device identifier must not be empty")]
pub struct EmptyDeviceId;

/// Opaque, non-empty identifier of this device
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Validate and wrap an identifier; surrounding whitespace is dropped
    pub fn parse(value: impl AsRef<str>) -> Result<Self, EmptyDeviceId> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmptyDeviceId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// A random identifier
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolution state of the device identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdStatus {
    /// Not resolved yet; callers needing an id must await [`DeviceIdentity::resolve`]
    Pending,
    Resolved(DeviceId),
}

/// How the identifier was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Storage,
    Fingerprint,
    Random,
}

/// Computes a stable identifier from environment signals
pub trait Fingerprinter: Send + Sync {
    fn fingerprint(&self) -> Result<String>;
}

/// Fingerprint from host name, user, home directory, OS and architecture
#[derive(Debug, Default, Clone)]
pub struct EnvironmentFingerprinter;

impl EnvironmentFingerprinter {
    fn signals(&self) -> Vec<(&'static str, String)> {
        let mut signals = Vec::new();

        if let Some(host) = hostname() {
            signals.push(("host", host));
        }
        if let Some(user) = std::env::var("USER")
            .ok()
            .or_else(|| std::env::var("USERNAME").ok())
            .filter(|u| !u.is_empty())
        {
            signals.push(("user", user));
        }
        if let Some(home) = dirs::home_dir() {
            signals.push(("home", home.display().to_string()));
        }

        signals
    }
}

impl Fingerprinter for EnvironmentFingerprinter {
    fn fingerprint(&self) -> Result<String> {
        let signals = self.signals();
        if signals.is_empty() {
            bail!("No host-specific signals available for fingerprinting");
        }

        let mut hasher = Sha256::new();
        for (name, value) in &signals {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\n");
        }
        hasher.update(std::env::consts::OS.as_bytes());
        hasher.update(std::env::consts::ARCH.as_bytes());

        let digest = hex::encode(hasher.finalize());
        Ok(digest[..FINGERPRINT_LEN].to_string())
    }
}

fn hostname() -> Option<String> {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::env::var("COMPUTERNAME").ok())
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}

/// Device identity provider
///
/// Cheap to share behind an `Arc`; concurrent `resolve` calls run the
/// resolution once and all receive the same identifier.
pub struct DeviceIdentity {
    storage: LocalStorage,
    fingerprinter: Arc<dyn Fingerprinter>,
    resolved: OnceCell<(DeviceId, IdSource)>,
}

impl DeviceIdentity {
    /// Identity provider using the configured data directory and the
    /// environment fingerprinter
    pub fn new(config: &Config) -> Self {
        Self::with_fingerprinter(
            LocalStorage::new(config.data_dir.clone()),
            Arc::new(EnvironmentFingerprinter),
        )
    }

    pub fn with_fingerprinter(storage: LocalStorage, fingerprinter: Arc<dyn Fingerprinter>) -> Self {
        Self {
            storage,
            fingerprinter,
            resolved: OnceCell::new(),
        }
    }

    /// Current state without triggering resolution
    pub fn status(&self) -> DeviceIdStatus {
        match self.resolved.get() {
            Some((id, _)) => DeviceIdStatus::Resolved(id.clone()),
            None => DeviceIdStatus::Pending,
        }
    }

    /// How the identifier was obtained, once resolved
    pub fn source(&self) -> Option<IdSource> {
        self.resolved.get().map(|(_, source)| *source)
    }

    /// Resolve the identifier, waiting if another task is already doing so
    ///
    /// Never fails: storage problems are logged and fingerprint failures fall
    /// back to a random identifier.
    pub async fn resolve(&self) -> DeviceId {
        let (id, _) = self
            .resolved
            .get_or_init(|| async { self.resolve_uncached().await })
            .await;
        id.clone()
    }

    async fn resolve_uncached(&self) -> (DeviceId, IdSource) {
        match self.storage.get_item(DEVICE_ID_STORAGE_KEY) {
            Ok(Some(stored)) => {
                if let Ok(id) = DeviceId::parse(&stored) {
                    debug!("Loaded device id from storage");
                    return (id, IdSource::Storage);
                }
                warn!("Ignoring empty stored device id");
            }
            Ok(None) => {}
            Err(e) => warn!("Could not read stored device id: {}", e),
        }

        let (id, source) = match self.compute_fingerprint().await {
            Ok(id) => (id, IdSource::Fingerprint),
            Err(e) => {
                warn!("Fingerprinting failed, using random device id: {}", e);
                (DeviceId::random(), IdSource::Random)
            }
        };

        if let Err(e) = self.storage.set_item(DEVICE_ID_STORAGE_KEY, id.as_str()) {
            warn!("Could not persist device id: {}", e);
        }
        info!("Resolved new device id ({:?})", source);
        (id, source)
    }

    async fn compute_fingerprint(&self) -> Result<DeviceId> {
        let fingerprinter = Arc::clone(&self.fingerprinter);
        let raw = tokio::task::spawn_blocking(move || fingerprinter.fingerprint()).await??;
        Ok(DeviceId::parse(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingFingerprinter {
        calls: AtomicUsize,
        result: Option<&'static str>,
    }

    impl CountingFingerprinter {
        fn ok(value: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: Some(value),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: None,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Fingerprinter for CountingFingerprinter {
        fn fingerprint(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.result {
                Some(v) => Ok(v.to_string()),
                None => bail!("canvas unavailable"),
            }
        }
    }

    fn identity(temp_dir: &TempDir, fp: Arc<CountingFingerprinter>) -> DeviceIdentity {
        DeviceIdentity::with_fingerprinter(LocalStorage::new(temp_dir.path()), fp)
    }

    #[test]
    fn test_device_id_rejects_empty() {
        assert_eq!(DeviceId::parse(""), Err(EmptyDeviceId));
        assert_eq!(DeviceId::parse("   "), Err(EmptyDeviceId));
        assert_eq!(DeviceId::parse(" abc\n").unwrap().as_str(), "abc");
    }

    #[tokio::test]
    async fn test_pending_before_resolve() {
        let temp_dir = TempDir::new().unwrap();
        let identity = identity(&temp_dir, CountingFingerprinter::ok("fp-1"));

        assert_eq!(identity.status(), DeviceIdStatus::Pending);
        assert!(identity.source().is_none());

        let id = identity.resolve().await;
        assert_eq!(identity.status(), DeviceIdStatus::Resolved(id));
    }

    #[tokio::test]
    async fn test_fingerprint_used_and_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let fp = CountingFingerprinter::ok("fp-abc");
        let identity = identity(&temp_dir, fp.clone());

        let id = identity.resolve().await;

        assert_eq!(id.as_str(), "fp-abc");
        assert_eq!(identity.source(), Some(IdSource::Fingerprint));
        let stored = LocalStorage::new(temp_dir.path())
            .get_item(DEVICE_ID_STORAGE_KEY)
            .unwrap();
        assert_eq!(stored.as_deref(), Some("fp-abc"));
        assert_eq!(fp.calls(), 1);
    }

    #[tokio::test]
    async fn test_memory_cache_skips_fingerprint() {
        let temp_dir = TempDir::new().unwrap();
        let fp = CountingFingerprinter::ok("fp-abc");
        let identity = identity(&temp_dir, fp.clone());

        let first = identity.resolve().await;
        let second = identity.resolve().await;

        assert_eq!(first, second);
        assert_eq!(fp.calls(), 1);
    }

    #[tokio::test]
    async fn test_stored_id_wins_over_fingerprint() {
        let temp_dir = TempDir::new().unwrap();
        LocalStorage::new(temp_dir.path())
            .set_item(DEVICE_ID_STORAGE_KEY, "stored-id")
            .unwrap();
        let fp = CountingFingerprinter::ok("fp-abc");
        let identity = identity(&temp_dir, fp.clone());

        let id = identity.resolve().await;

        assert_eq!(id.as_str(), "stored-id");
        assert_eq!(identity.source(), Some(IdSource::Storage));
        assert_eq!(fp.calls(), 0);
    }

    #[tokio::test]
    async fn test_fingerprint_runs_once_per_profile() {
        let temp_dir = TempDir::new().unwrap();
        let fp = CountingFingerprinter::ok("fp-abc");

        let first = identity(&temp_dir, fp.clone()).resolve().await;
        // New provider over the same storage simulates a restart
        let second = identity(&temp_dir, fp.clone()).resolve().await;

        assert_eq!(first, second);
        assert_eq!(fp.calls(), 1);
    }

    #[tokio::test]
    async fn test_random_fallback_when_fingerprint_fails() {
        let temp_dir = TempDir::new().unwrap();
        let identity = identity(&temp_dir, CountingFingerprinter::failing());

        let id = identity.resolve().await;

        assert!(!id.as_str().is_empty());
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
        assert_eq!(identity.source(), Some(IdSource::Random));

        // Fallback is persisted like any other id
        let stored = LocalStorage::new(temp_dir.path())
            .get_item(DEVICE_ID_STORAGE_KEY)
            .unwrap();
        assert_eq!(stored.as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_empty_fingerprint_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let identity = identity(&temp_dir, CountingFingerprinter::ok("  "));

        identity.resolve().await;
        assert_eq!(identity.source(), Some(IdSource::Random));
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_result() {
        let temp_dir = TempDir::new().unwrap();
        let fp = CountingFingerprinter::ok("fp-shared");
        let identity = Arc::new(identity(&temp_dir, fp.clone()));

        let (a, b) = tokio::join!(identity.resolve(), identity.resolve());

        assert_eq!(a, b);
        assert_eq!(fp.calls(), 1);
    }

    #[test]
    fn test_environment_fingerprint_is_stable() {
        let fp = EnvironmentFingerprinter;
        if let Ok(first) = fp.fingerprint() {
            assert_eq!(first.len(), FINGERPRINT_LEN);
            assert_eq!(fp.fingerprint().unwrap(), first);
        }
    }
}
