//! Character sheet persistence service
//!
//! The sheet is edited by the presentation layer; this service stores and
//! restores the whole typed blob through the storage port.

use std::sync::Arc;

use tracing::{debug, warn};

use crucible_domain::{CharacterSheet, DomainError};

use crate::ports::{ClockPort, StoragePort};

/// Storage key the character blob lives under
pub const CHARACTER_KEY: &str = "crucible-character";

/// Save/load for the full character state
pub struct CharacterService {
    storage: Arc<dyn StoragePort>,
    clock: Arc<dyn ClockPort>,
}

impl CharacterService {
    pub fn new(storage: Arc<dyn StoragePort>, clock: Arc<dyn ClockPort>) -> Self {
        Self { storage, clock }
    }

    /// Persist the sheet, stamping the save time. Returns whether the blob
    /// reached storage; failures are logged, never propagated.
    pub fn save(&self, sheet: &CharacterSheet) -> bool {
        let mut stamped = sheet.clone();
        stamped.saved_at = self.clock.now();

        let json = match serde_json::to_string(&stamped) {
            Ok(json) => json,
            Err(error) => {
                warn!(%error, "character serialization failed");
                return false;
            }
        };
        match self.storage.set(CHARACTER_KEY, &json) {
            Ok(()) => {
                debug!("character saved");
                true
            }
            Err(error) => {
                warn!(%error, "character save failed");
                false
            }
        }
    }

    /// Restore the saved sheet. `Ok(None)` when nothing is stored or storage
    /// is unreadable; `InvalidData` when a stored blob does not parse.
    pub fn load(&self) -> Result<Option<CharacterSheet>, DomainError> {
        let json = match self.storage.get(CHARACTER_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return Ok(None),
            Err(error) => {
                warn!(%error, "failed to read saved character");
                return Ok(None);
            }
        };

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|error| DomainError::invalid_data(format!("Invalid character data: {error}")))
    }
}
