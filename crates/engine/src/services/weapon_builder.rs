//! Weapon builder service - assembly engine over the weapon aggregate
//!
//! Owns the in-progress weapon, the bounded undo buffer, and the
//! autosave/export plumbing. Every mutating operation validates first, then
//! snapshots history, then mutates, so a rejected action leaves the weapon
//! untouched. Persistence failures are logged and swallowed; losing an
//! autosave must not crash weapon editing.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crucible_domain::{
    AssemblyValidation, Catalog, CardId, DomainError, InstallOptions, InstalledCard, LayerId,
    RiskLevel, Shell, ShellId, Weapon, WeaponId, WeaponMetadata,
};

use crate::ports::{ClockPort, StoragePort};

/// Storage key the autosave blob lives under
pub const AUTOSAVE_KEY: &str = "crucible-autosave";

/// Version stamp written into exports
pub const EXPORT_VERSION: &str = "1.0.0";

/// Tuning knobs for the builder
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Whether the host should drive the periodic autosave timer
    pub auto_save_enabled: bool,
    /// Suggested autosave cadence for the host's timer
    pub auto_save_interval_secs: u64,
    /// Undo buffer capacity; oldest snapshots are discarded on overflow
    pub max_history_steps: usize,
    /// Whether installs are checked against shell rules before mutating
    pub validation_enabled: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            auto_save_enabled: true,
            auto_save_interval_secs: 30,
            max_history_steps: 50,
            validation_enabled: true,
        }
    }
}

/// Serialized weapon export - the save/share format
///
/// Layers are an explicit pair list so the format survives serializers that
/// do not preserve map ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponExport {
    pub weapon: WeaponData,
    pub stats: WeaponStats,
    pub description: String,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

/// The weapon portion of an export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponData {
    pub id: WeaponId,
    pub name: String,
    pub shell: Option<Shell>,
    pub layers: Vec<(LayerId, InstalledCard)>,
    pub metadata: WeaponMetadata,
}

/// Derived stats included alongside an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponStats {
    pub used_slots: u32,
    pub available_slots: u32,
    pub risk_level: RiskLevel,
    pub status: String,
}

/// The weapon assembly engine
pub struct WeaponBuilderService {
    catalog: Arc<Catalog>,
    storage: Arc<dyn StoragePort>,
    clock: Arc<dyn ClockPort>,
    config: BuilderConfig,
    weapon: Weapon,
    history: VecDeque<Weapon>,
    last_validation: AssemblyValidation,
}

impl WeaponBuilderService {
    pub fn new(
        catalog: Arc<Catalog>,
        storage: Arc<dyn StoragePort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self::with_config(catalog, storage, clock, BuilderConfig::default())
    }

    pub fn with_config(
        catalog: Arc<Catalog>,
        storage: Arc<dyn StoragePort>,
        clock: Arc<dyn ClockPort>,
        config: BuilderConfig,
    ) -> Self {
        let weapon = Weapon::new(clock.now());
        let last_validation = weapon.validate();
        Self {
            catalog,
            storage,
            clock,
            config,
            weapon,
            history: VecDeque::new(),
            last_validation,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn weapon(&self) -> &Weapon {
        &self.weapon
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Validation result published after the most recent mutation
    pub fn last_validation(&self) -> &AssemblyValidation {
        &self.last_validation
    }

    /// Assembly-level validation of the current weapon
    pub fn validate_weapon(&self) -> AssemblyValidation {
        self.weapon.validate()
    }

    pub fn used_slots(&self) -> u32 {
        self.weapon.used_slots()
    }

    pub fn available_slots(&self) -> u32 {
        self.weapon.available_slots()
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.weapon.risk_level()
    }

    /// First outstanding issue, or "Complete" for a valid weapon
    pub fn weapon_status(&self) -> String {
        self.weapon
            .validate()
            .issues
            .into_iter()
            .next()
            .unwrap_or_else(|| "Complete".to_string())
    }

    pub fn generate_description(&self) -> String {
        self.weapon.describe()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Select a shell, clearing all installed layers.
    ///
    /// Destructive by design: no layer carries across shells, even when a
    /// subset would still fit the new chassis.
    pub fn select_shell(&mut self, shell_id: &ShellId) -> Result<&Weapon, DomainError> {
        let shell = self
            .catalog
            .get_shell(shell_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Shell", shell_id.as_str()))?;

        let now = self.clock.now();
        self.push_history();
        self.weapon.set_shell(shell, now);
        debug!(shell = %shell_id, "shell selected");
        self.revalidate();
        Ok(&self.weapon)
    }

    /// Install a card into a layer.
    ///
    /// All checks run before any state changes, so a rejection leaves the
    /// weapon exactly as it was.
    pub fn install_card(
        &mut self,
        layer_id: &LayerId,
        card_id: &CardId,
        options: InstallOptions,
    ) -> Result<&Weapon, DomainError> {
        let card = self
            .catalog
            .get_card(card_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Card", card_id.as_str()))?;

        if self.config.validation_enabled {
            self.validate_card_installation(layer_id, card_id)?;
        }

        let now = self.clock.now();
        self.push_history();
        let installed = InstalledCard {
            card_id: card_id.clone(),
            card,
            installed_at: now,
            options,
        };
        self.weapon.install(layer_id.clone(), installed, now)?;
        debug!(layer = %layer_id, card = %card_id, "card installed");
        self.revalidate();
        Ok(&self.weapon)
    }

    /// Remove the card from a layer. Returns false when the layer is empty.
    pub fn remove_card(&mut self, layer_id: &LayerId) -> bool {
        if self.weapon.installed_card(layer_id).is_none() {
            return false;
        }

        let now = self.clock.now();
        self.push_history();
        self.weapon.remove(layer_id, now);
        debug!(layer = %layer_id, "card removed");
        self.revalidate();
        true
    }

    /// Replace the current weapon with a fresh empty one (new id)
    pub fn reset_weapon(&mut self) -> &Weapon {
        self.push_history();
        self.weapon = Weapon::new(self.clock.now());
        debug!("weapon reset");
        self.revalidate();
        &self.weapon
    }

    pub fn set_name(&mut self, name: &str) {
        self.weapon.set_name(name, self.clock.now());
    }

    /// Restore the most recent snapshot. Returns false on an empty history.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(snapshot) => {
                self.weapon = snapshot;
                self.revalidate();
                true
            }
            None => false,
        }
    }

    /// Always returns false. There is no redo stack: undo consumes the
    /// snapshot, and the design keeps it that way rather than growing an
    /// undo/redo pair.
    pub fn redo(&mut self) -> bool {
        false
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Serialize the current weapon and hand it to the persistence adapter.
    ///
    /// Best-effort: storage failures are logged, never propagated.
    pub fn auto_save(&self) {
        let export = self.export_weapon();
        match serde_json::to_string(&export) {
            Ok(json) => {
                if let Err(error) = self.storage.set(AUTOSAVE_KEY, &json) {
                    warn!(%error, "auto-save failed");
                }
            }
            Err(error) => warn!(%error, "auto-save serialization failed"),
        }
    }

    /// Restore the autosaved weapon, if any. Returns whether a save was
    /// found and imported.
    pub fn load_auto_save(&mut self) -> bool {
        let json = match self.storage.get(AUTOSAVE_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return false,
            Err(error) => {
                warn!(%error, "failed to read auto-save");
                return false;
            }
        };

        match self.import_weapon_json(&json) {
            Ok(_) => true,
            Err(error) => {
                warn!(%error, "failed to load auto-save");
                false
            }
        }
    }

    /// Drop the stored autosave blob
    pub fn clear_auto_save(&self) {
        if let Err(error) = self.storage.remove(AUTOSAVE_KEY) {
            warn!(%error, "failed to clear auto-save");
        }
    }

    // =========================================================================
    // Export / import
    // =========================================================================

    pub fn export_weapon(&self) -> WeaponExport {
        WeaponExport {
            weapon: WeaponData {
                id: self.weapon.id(),
                name: self.weapon.name().to_string(),
                shell: self.weapon.shell().cloned(),
                layers: self
                    .weapon
                    .layers()
                    .iter()
                    .map(|(layer_id, installed)| (layer_id.clone(), installed.clone()))
                    .collect(),
                metadata: self.weapon.metadata().clone(),
            },
            stats: WeaponStats {
                used_slots: self.used_slots(),
                available_slots: self.available_slots(),
                risk_level: self.risk_level(),
                status: self.weapon_status(),
            },
            description: self.generate_description(),
            exported_at: self.clock.now(),
            version: EXPORT_VERSION.to_string(),
        }
    }

    /// Import a previously exported weapon, replacing the current one.
    pub fn import_weapon(&mut self, export: WeaponExport) -> Result<&Weapon, DomainError> {
        let mut layers = BTreeMap::new();
        for (layer_id, installed) in export.weapon.layers {
            if installed.card.layer_id != layer_id {
                return Err(DomainError::invalid_data(format!(
                    "Layer {layer_id} holds a card belonging to layer {}",
                    installed.card.layer_id
                )));
            }
            if layers.insert(layer_id.clone(), installed).is_some() {
                return Err(DomainError::invalid_data(format!(
                    "Layer {layer_id} appears more than once"
                )));
            }
        }

        self.weapon = Weapon::restore(
            export.weapon.id,
            export.weapon.name,
            export.weapon.shell,
            layers,
            export.weapon.metadata,
        );
        debug!(weapon = %self.weapon.id(), "weapon imported");
        self.revalidate();
        Ok(&self.weapon)
    }

    /// Import from a raw JSON blob.
    ///
    /// The schema is strict: a blob without a well-formed weapon payload is
    /// rejected with a single `InvalidData` error carrying the diagnostic.
    pub fn import_weapon_json(&mut self, json: &str) -> Result<&Weapon, DomainError> {
        let export: WeaponExport = serde_json::from_str(json)
            .map_err(|error| DomainError::invalid_data(format!("Invalid weapon data: {error}")))?;
        self.import_weapon(export)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn validate_card_installation(
        &self,
        layer_id: &LayerId,
        card_id: &CardId,
    ) -> Result<(), DomainError> {
        let shell = self
            .weapon
            .shell()
            .ok_or_else(|| DomainError::validation("No shell selected"))?;
        let card = self
            .catalog
            .get_card(card_id)
            .ok_or_else(|| DomainError::not_found("Card", card_id.as_str()))?;

        if self.weapon.installed_card(layer_id).is_some() {
            return Err(DomainError::validation("Layer already occupied"));
        }
        if &card.layer_id != layer_id {
            return Err(DomainError::validation(
                "Card does not belong to this layer",
            ));
        }
        self.catalog
            .validate_shell_card_compatibility(&shell.id, card_id)
            .map_err(|reason| DomainError::validation(reason.to_string()))?;

        let available = self.weapon.available_slots();
        if card.cost.slots > available {
            return Err(DomainError::validation(format!(
                "Insufficient slots: need {}, have {available}",
                card.cost.slots
            )));
        }

        Ok(())
    }

    fn push_history(&mut self) {
        self.history.push_back(self.weapon.clone());
        while self.history.len() > self.config.max_history_steps {
            self.history.pop_front();
        }
    }

    fn revalidate(&mut self) {
        self.last_validation = self.weapon.validate();
        debug!(
            valid = self.last_validation.valid,
            issues = self.last_validation.issues.len(),
            "weapon validated"
        );
    }
}
