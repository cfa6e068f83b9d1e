//! Fallback for platforms without listener enumeration.

use crate::domain::ObservedPort;
use crate::error::{Error, Result};

use super::ListenerSource;

pub struct UnsupportedListeners;

impl UnsupportedListeners {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnsupportedListeners {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerSource for UnsupportedListeners {
    async fn listeners(&self) -> Result<Vec<ObservedPort>> {
        Err(Error::UnsupportedPlatform(
            "listener enumeration is only available on Linux and macOS; use the probe sampler"
                .to_string(),
        ))
    }
}
