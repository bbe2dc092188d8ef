//! Outbound ports - contracts the engine consumes from its host

mod clock_port;
mod random_port;
mod storage_port;

pub use clock_port::ClockPort;
pub use random_port::{FixedRandomPort, RandomPort};
pub use storage_port::StoragePort;

#[cfg(any(test, feature = "testing"))]
pub use random_port::MockRandomPort;
#[cfg(any(test, feature = "testing"))]
pub use storage_port::MockStoragePort;
