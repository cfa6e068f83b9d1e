//! Listening-socket enumeration adapters.
//!
//! Platform-specific implementations of "which TCP ports are listening".

#[cfg(target_os = "macos")]
mod darwin;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
mod unsupported;

mod utils;

use crate::domain::ObservedPort;
use crate::error::Result;

/// Enumerates listening TCP sockets using the current platform's tools.
pub struct PlatformListeners {
    #[cfg(target_os = "macos")]
    inner: darwin::DarwinListeners,

    #[cfg(target_os = "linux")]
    inner: linux::LinuxListeners,

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    inner: unsupported::UnsupportedListeners,
}

impl PlatformListeners {
    /// Create an enumerator for the current platform.
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "macos")]
            inner: darwin::DarwinListeners::new(),

            #[cfg(target_os = "linux")]
            inner: linux::LinuxListeners::new(),

            #[cfg(not(any(target_os = "macos", target_os = "linux")))]
            inner: unsupported::UnsupportedListeners::new(),
        }
    }

    /// All listening TCP ports, one entry per port, ascending.
    pub async fn listeners(&self) -> Result<Vec<ObservedPort>> {
        self.inner.listeners().await
    }
}

impl Default for PlatformListeners {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal trait for platform-specific implementations.
trait ListenerSource: Send + Sync {
    fn listeners(&self) -> impl std::future::Future<Output = Result<Vec<ObservedPort>>> + Send;
}
