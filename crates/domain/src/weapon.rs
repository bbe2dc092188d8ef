//! Weapon aggregate - the work-in-progress assembly of shell and layer cards
//!
//! # Invariants
//!
//! - At most one installed card per layer (map key uniqueness)
//! - An installed card always belongs to the layer it occupies
//! - Shell selection clears every installed layer; no card carries across a
//!   shell change
//!
//! Slot budgets and shell layer rules are enforced by the assembly engine
//! before it mutates the aggregate; the aggregate guards only the invariants
//! it can check from its own state. Snapshotting for the undo buffer is the
//! derived `Clone` - a structural copy over this exact shape.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Card, Shell};
use crate::error::DomainError;
use crate::ids::{CardId, LayerId, WeaponId};
use crate::value_objects::RiskLevel;

/// Layer order used for descriptions, independent of installation order
pub const CANONICAL_LAYER_ORDER: [&str; 5] = ["structure", "power", "control", "sense", "safety"];

/// Placeholder shown before the weapon has a shell and at least one card
pub const EMPTY_DESCRIPTION: &str = "Design your weapon to see its description";

/// Free-form annotations attached to an installation (UI bookkeeping)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallOptions(pub BTreeMap<String, String>);

impl InstallOptions {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A card mounted into one layer of the weapon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledCard {
    pub card_id: CardId,
    /// Snapshot of the catalog card at install time
    pub card: Card,
    pub installed_at: DateTime<Utc>,
    #[serde(default)]
    pub options: InstallOptions,
}

/// Creation and modification timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponMetadata {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Result of the assembly-level validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyValidation {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// The weapon under construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    id: WeaponId,
    name: String,
    shell: Option<Shell>,
    layers: BTreeMap<LayerId, InstalledCard>,
    metadata: WeaponMetadata,
}

impl Weapon {
    /// Create a fresh, empty weapon
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: WeaponId::new(),
            name: String::new(),
            shell: None,
            layers: BTreeMap::new(),
            metadata: WeaponMetadata {
                created: now,
                modified: now,
            },
        }
    }

    /// Reconstruct a weapon from previously exported parts (import path)
    pub fn restore(
        id: WeaponId,
        name: String,
        shell: Option<Shell>,
        layers: BTreeMap<LayerId, InstalledCard>,
        metadata: WeaponMetadata,
    ) -> Self {
        Self {
            id,
            name,
            shell,
            layers,
            metadata,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> WeaponId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shell(&self) -> Option<&Shell> {
        self.shell.as_ref()
    }

    pub fn layers(&self) -> &BTreeMap<LayerId, InstalledCard> {
        &self.layers
    }

    pub fn installed_card(&self, layer_id: &LayerId) -> Option<&InstalledCard> {
        self.layers.get(layer_id)
    }

    pub fn metadata(&self) -> &WeaponMetadata {
        &self.metadata
    }

    // =========================================================================
    // State transitions
    // =========================================================================

    pub fn set_name(&mut self, name: impl Into<String>, now: DateTime<Utc>) {
        self.name = name.into();
        self.touch(now);
    }

    /// Select a shell. Clears all installed layers by design: a shell swap
    /// invalidates prior component fit and no compatible subset survives.
    pub fn set_shell(&mut self, shell: Shell, now: DateTime<Utc>) {
        self.layers.clear();
        self.shell = Some(shell);
        self.touch(now);
    }

    /// Mount a card into a layer.
    ///
    /// Shell rules and slot budgets are the assembly engine's concern; this
    /// guards the aggregate's own invariants.
    pub fn install(
        &mut self,
        layer_id: LayerId,
        installed: InstalledCard,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if installed.card.layer_id != layer_id {
            return Err(DomainError::validation(
                "Card does not belong to this layer",
            ));
        }
        if self.layers.contains_key(&layer_id) {
            return Err(DomainError::validation("Layer already occupied"));
        }
        self.layers.insert(layer_id, installed);
        self.touch(now);
        Ok(())
    }

    /// Remove the card from a layer, returning it if one was installed
    pub fn remove(&mut self, layer_id: &LayerId, now: DateTime<Utc>) -> Option<InstalledCard> {
        let removed = self.layers.remove(layer_id);
        if removed.is_some() {
            self.touch(now);
        }
        removed
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.metadata.modified = now;
    }

    // =========================================================================
    // Derived queries
    // =========================================================================

    /// Sum of slot costs across installed cards
    pub fn used_slots(&self) -> u32 {
        self.layers.values().map(|l| l.card.cost.slots).sum()
    }

    /// Slots still open on the shell (0 when no shell is selected)
    pub fn available_slots(&self) -> u32 {
        match &self.shell {
            Some(shell) => shell.stats.slots.saturating_sub(self.used_slots()),
            None => 0,
        }
    }

    /// Worst-case risk across installed cards
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::aggregate(self.layers.values().map(|l| l.card.risk))
    }

    /// Assembly validation: shell presence, mandatory layers, slot budget,
    /// forbidden layers - in that order, one issue per failing check.
    pub fn validate(&self) -> AssemblyValidation {
        let shell = match &self.shell {
            Some(shell) => shell,
            None => {
                return AssemblyValidation {
                    valid: false,
                    issues: vec!["No shell selected".to_string()],
                }
            }
        };

        let mut issues = Vec::new();

        let missing: Vec<&str> = shell
            .requirements
            .mandatory
            .iter()
            .filter(|layer| !self.layers.contains_key(layer))
            .map(|layer| layer.as_str())
            .collect();
        if !missing.is_empty() {
            issues.push(format!("Missing required layers: {}", missing.join(", ")));
        }

        let used = self.used_slots();
        if used > shell.stats.slots {
            issues.push(format!(
                "Too many slots used: {used}/{}",
                shell.stats.slots
            ));
        }

        let forbidden: Vec<&str> = self
            .layers
            .keys()
            .filter(|layer| shell.requirements.is_forbidden(layer))
            .map(|layer| layer.as_str())
            .collect();
        if !forbidden.is_empty() {
            issues.push(format!(
                "Forbidden layers installed: {}",
                forbidden.join(", ")
            ));
        }

        AssemblyValidation {
            valid: issues.is_empty(),
            issues,
        }
    }

    /// Installed cards in canonical description order, then any remaining
    /// layers in key order
    pub fn ordered_installations(&self) -> Vec<(&LayerId, &InstalledCard)> {
        let mut ordered: Vec<(&LayerId, &InstalledCard)> = Vec::with_capacity(self.layers.len());
        for slug in CANONICAL_LAYER_ORDER {
            if let Some((layer_id, installed)) = self.layers.get_key_value(&LayerId::from(slug)) {
                ordered.push((layer_id, installed));
            }
        }
        for (layer_id, installed) in &self.layers {
            if !CANONICAL_LAYER_ORDER.contains(&layer_id.as_str()) {
                ordered.push((layer_id, installed));
            }
        }
        ordered
    }

    /// Natural-language description of the assembled weapon.
    ///
    /// Deterministic: layers are narrated in canonical order regardless of
    /// installation order, followed by the shell's special rule and each
    /// installed card's failure mode.
    pub fn describe(&self) -> String {
        let shell = match &self.shell {
            Some(shell) if !self.layers.is_empty() => shell,
            _ => return EMPTY_DESCRIPTION.to_string(),
        };

        let mut description = format!("This {} ", shell.name.to_lowercase());

        for (layer_id, installed) in self.ordered_installations() {
            let card_name = installed.card.name.to_lowercase();
            let role = installed.card.mechanics.role.to_lowercase();
            let sentence = match layer_id.as_str() {
                "structure" => format!("uses {card_name} that {role}. "),
                "power" => format!("It is powered by {card_name} which {role}. "),
                "control" => format!("Control is handled by {card_name} that {role}. "),
                "sense" => format!("It can detect threats using {card_name} which {role}. "),
                "safety" => format!("Safety is provided by {card_name} that {role}. "),
                _ => continue,
            };
            description.push_str(&sentence);
        }

        if !shell.rules.special_rule.is_empty() {
            description.push_str(&format!("\n\nSpecial Rule: {}", shell.rules.special_rule));
        }

        let failures: Vec<String> = self
            .ordered_installations()
            .iter()
            .map(|(_, installed)| {
                format!("{}: {}", installed.card.name, installed.card.mechanics.failure)
            })
            .collect();
        if !failures.is_empty() {
            description.push_str(&format!("\n\nPotential Failures:\n\u{2022} {}", failures.join("\n\u{2022} ")));
        }

        description
    }
}
