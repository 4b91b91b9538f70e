//! Settings storage adapter (simulation backend).
//!
//! Implements [`SettingsStore`] over an in-memory blob slot. Settings are
//! range-checked before they are persisted and encoded with `postcard`.
//! On target, the host firmware owns the real NVS layout; this adapter
//! stands in for it on host builds and in tests.

use core::cell::RefCell;

use log::{debug, info};

use crate::app::ports::{ConfigError, SettingsStore};
use crate::config::LaserConfig;

/// Upper bound on a stored settings blob.
const MAX_BLOB_SIZE: usize = 64;

pub struct NvsSettings {
    blob: RefCell<Option<Vec<u8>>>,
}

impl NvsSettings {
    /// Empty store (first boot).
    pub fn new() -> Self {
        info!("NvsSettings: simulation backend");
        Self {
            blob: RefCell::new(None),
        }
    }

    /// Store pre-seeded with raw bytes, e.g. a blob from an older layout.
    pub fn with_blob(bytes: &[u8]) -> Self {
        Self {
            blob: RefCell::new(Some(bytes.to_vec())),
        }
    }

    /// Raw stored bytes, if any.
    pub fn raw(&self) -> Option<Vec<u8>> {
        self.blob.borrow().clone()
    }
}

impl Default for NvsSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for NvsSettings {
    fn load(&self) -> Result<LaserConfig, ConfigError> {
        let slot = self.blob.borrow();
        let bytes = slot.as_deref().ok_or(ConfigError::NotFound)?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::Corrupted);
        }
        let cfg: LaserConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        debug!("NvsSettings: loaded {} bytes", bytes.len());
        Ok(cfg)
    }

    fn save(&self, config: &LaserConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::IoError);
        }
        *self.blob.borrow_mut() = Some(bytes);
        Ok(())
    }
}
