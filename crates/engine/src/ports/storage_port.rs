//! Persistence adapter port
//!
//! Opaque key/value blob storage. The browser host backs this with local
//! storage; tests use mocks or the in-memory adapter. Failures here must
//! never abort a mutation already applied in memory - callers log and
//! continue.

/// Outbound port for blob persistence.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait StoragePort: Send + Sync {
    /// Fetch the blob stored under `key`, or `None` when absent
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous blob
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Delete the blob under `key` (no-op when absent)
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}
