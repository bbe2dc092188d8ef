//! Clock abstraction port for time operations
//!
//! Services that need current time inject this port rather than calling
//! `Utc::now()` directly, so tests can pin timestamps.

use chrono::{DateTime, Utc};

/// Time operations abstraction for engine-side services
pub trait ClockPort: Send + Sync {
    /// Get current time as DateTime<Utc>
    fn now(&self) -> DateTime<Utc>;

    /// Format current time as RFC3339 string
    fn now_rfc3339(&self) -> String {
        self.now().to_rfc3339()
    }
}
