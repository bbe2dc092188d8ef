//! Catalog - the static registry of shells, layers, and cards
//!
//! Pure data plus lookup. The catalog is immutable after load except for
//! explicit `register_*` calls, which reject duplicate ids. Compatibility
//! rules between shells and cards live here so both the assembly engine and
//! the validation pipeline consult one source of truth.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::entities::{
    BuildTime, Card, CardCost, CardMechanics, CardRequirements, CardRisk, Layer, Rarity, Shell,
    ShellRequirements, ShellRules, ShellStats, StressLimit,
};
use crate::error::DomainError;
use crate::ids::{CardId, LayerId, ShellId};

/// Why a card cannot be mounted on a shell
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Incompatibility {
    #[error("Invalid shell or card")]
    UnknownShellOrCard,
    #[error("Invalid layer")]
    UnknownLayer,
    #[error("{layer} layer not allowed for {shell}")]
    LayerNotAllowed { layer: String, shell: String },
    #[error("{layer} layer forbidden for {shell}")]
    LayerForbidden { layer: String, shell: String },
    #[error("Card tier too high for shell")]
    TierTooHigh,
}

/// Registry of every shell, layer, and card the builder knows about
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    shells: BTreeMap<ShellId, Shell>,
    layers: BTreeMap<LayerId, Layer>,
    cards: BTreeMap<CardId, Card>,
}

impl Catalog {
    /// An empty catalog; useful for tests that register their own entries
    pub fn new() -> Self {
        Self::default()
    }

    /// The tier-0 "Axiom & Crucible" catalog: three shells, five layers,
    /// and the starting card set.
    pub fn tier_zero() -> Self {
        let mut catalog = Self::new();
        for shell in seed::shells() {
            catalog.shells.insert(shell.id.clone(), shell);
        }
        for layer in seed::layers() {
            catalog.layers.insert(layer.id.clone(), layer);
        }
        for card in seed::cards() {
            catalog.cards.insert(card.id.clone(), card);
        }
        catalog
    }

    // =========================================================================
    // Registration
    // =========================================================================

    pub fn register_shell(&mut self, shell: Shell) -> Result<(), DomainError> {
        if self.shells.contains_key(&shell.id) {
            return Err(DomainError::duplicate_id("Shell", shell.id.as_str()));
        }
        self.shells.insert(shell.id.clone(), shell);
        Ok(())
    }

    pub fn register_layer(&mut self, layer: Layer) -> Result<(), DomainError> {
        if self.layers.contains_key(&layer.id) {
            return Err(DomainError::duplicate_id("Layer", layer.id.as_str()));
        }
        self.layers.insert(layer.id.clone(), layer);
        Ok(())
    }

    pub fn register_card(&mut self, card: Card) -> Result<(), DomainError> {
        if self.cards.contains_key(&card.id) {
            return Err(DomainError::duplicate_id("Card", card.id.as_str()));
        }
        self.cards.insert(card.id.clone(), card);
        Ok(())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn get_shell(&self, id: &ShellId) -> Option<&Shell> {
        self.shells.get(id)
    }

    pub fn get_shells_by_tier(&self, tier: u8) -> Vec<&Shell> {
        self.shells.values().filter(|s| s.tier == tier).collect()
    }

    pub fn get_shells_by_category(&self, category: &str) -> Vec<&Shell> {
        self.shells
            .values()
            .filter(|s| s.category == category)
            .collect()
    }

    pub fn get_layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    pub fn get_layers_by_category(&self, category: &str) -> Vec<&Layer> {
        self.layers
            .values()
            .filter(|l| l.category == category)
            .collect()
    }

    pub fn get_card(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn get_cards_by_layer(&self, layer_id: &LayerId) -> Vec<&Card> {
        self.cards
            .values()
            .filter(|c| &c.layer_id == layer_id)
            .collect()
    }

    pub fn get_cards_by_tier(&self, tier: u8) -> Vec<&Card> {
        self.cards.values().filter(|c| c.tier == tier).collect()
    }

    pub fn get_cards_by_rarity(&self, rarity: Rarity) -> Vec<&Card> {
        self.cards.values().filter(|c| c.rarity == rarity).collect()
    }

    // =========================================================================
    // Compatibility rules
    // =========================================================================

    /// Whether `card_id` may be mounted on `shell_id`, with the specific
    /// reason when it may not.
    pub fn validate_shell_card_compatibility(
        &self,
        shell_id: &ShellId,
        card_id: &CardId,
    ) -> Result<(), Incompatibility> {
        let (shell, card) = match (self.get_shell(shell_id), self.get_card(card_id)) {
            (Some(shell), Some(card)) => (shell, card),
            _ => return Err(Incompatibility::UnknownShellOrCard),
        };
        let layer = self
            .get_layer(&card.layer_id)
            .ok_or(Incompatibility::UnknownLayer)?;

        if !shell.requirements.allows(&card.layer_id) {
            return Err(Incompatibility::LayerNotAllowed {
                layer: layer.name.clone(),
                shell: shell.name.clone(),
            });
        }
        if shell.requirements.is_forbidden(&card.layer_id) {
            return Err(Incompatibility::LayerForbidden {
                layer: layer.name.clone(),
                shell: shell.name.clone(),
            });
        }
        if card.tier > shell.tier {
            return Err(Incompatibility::TierTooHigh);
        }

        Ok(())
    }
}

mod seed {
    use super::*;

    fn layer_ids<const N: usize>(ids: [&str; N]) -> std::collections::BTreeSet<LayerId> {
        ids.into_iter().map(LayerId::from).collect()
    }

    fn strings<const N: usize>(values: [&str; N]) -> Vec<String> {
        values.into_iter().map(String::from).collect()
    }

    pub(super) fn shells() -> Vec<Shell> {
        vec![
            Shell {
                id: "hand-tool".into(),
                name: "Hand Tool".to_string(),
                tier: 0,
                category: "weapon".to_string(),
                description: "A manually operated weapon held by a person".to_string(),
                stats: ShellStats {
                    slots: 2,
                    stress_limit: StressLimit::Low,
                },
                requirements: ShellRequirements {
                    mandatory: layer_ids(["structure", "power"]),
                    optional: layer_ids(["control", "safety"]),
                    forbidden: layer_ids([]),
                },
                rules: ShellRules {
                    special_rule: "If Stress exceeds limit, the operator suffers consequences."
                        .to_string(),
                    overclocking: Some("+2 Instability per use".to_string()),
                    material_quality: Some("Crude or reclaimed".to_string()),
                },
            },
            Shell {
                id: "static-device".into(),
                name: "Static Device".to_string(),
                tier: 0,
                category: "weapon".to_string(),
                description: "A stationary weapon mechanism (trap, ballista)".to_string(),
                stats: ShellStats {
                    slots: 3,
                    stress_limit: StressLimit::Moderate,
                },
                requirements: ShellRequirements {
                    mandatory: layer_ids(["structure", "power"]),
                    optional: layer_ids(["control", "sense", "safety"]),
                    forbidden: layer_ids([]),
                },
                rules: ShellRules {
                    special_rule: "Stationary weapon mechanism with enhanced stability."
                        .to_string(),
                    overclocking: Some("+2 Instability per use".to_string()),
                    material_quality: Some("Crude or reclaimed".to_string()),
                },
            },
            Shell {
                id: "simple-automaton".into(),
                name: "Simple Automaton".to_string(),
                tier: 0,
                category: "weapon".to_string(),
                description: "A slow, semi-autonomous weapon".to_string(),
                stats: ShellStats {
                    slots: 3,
                    stress_limit: StressLimit::Low,
                },
                requirements: ShellRequirements {
                    mandatory: layer_ids(["structure", "power", "control"]),
                    optional: layer_ids(["sense", "safety"]),
                    forbidden: layer_ids([]),
                },
                rules: ShellRules {
                    special_rule: "Control failures cause erratic behavior.".to_string(),
                    overclocking: Some("+2 Instability per use".to_string()),
                    material_quality: Some("Crude or reclaimed".to_string()),
                },
            },
        ]
    }

    pub(super) fn layers() -> Vec<Layer> {
        vec![
            Layer::new(
                "structure",
                "Structure",
                "What holds this together?",
                "Physical framework and mounting systems",
                "foundation",
            ),
            Layer::new(
                "power",
                "Power",
                "What makes this do anything?",
                "Energy generation and transmission systems",
                "core",
            ),
            Layer::new(
                "control",
                "Control",
                "How does it decide what to do?",
                "Decision-making and behavioral systems",
                "intelligence",
            ),
            Layer::new(
                "sense",
                "Sense",
                "What can this detect?",
                "Detection and awareness systems",
                "intelligence",
            ),
            Layer::new(
                "safety",
                "Safety",
                "What prevents disaster?",
                "Failure prevention and damage mitigation",
                "protection",
            ),
        ]
    }

    #[allow(clippy::too_many_arguments)]
    fn card(
        id: &str,
        name: &str,
        layer_id: &str,
        rarity: Rarity,
        slots: u32,
        risk: CardRisk,
        role: &str,
        failure: &str,
    ) -> Card {
        Card {
            id: id.into(),
            name: name.to_string(),
            layer_id: layer_id.into(),
            tier: 0,
            rarity,
            cost: CardCost {
                slots,
                materials: Vec::new(),
                time: BuildTime::Hours,
            },
            risk,
            mechanics: CardMechanics {
                role: role.to_string(),
                failure: failure.to_string(),
                triggers: Vec::new(),
                effects: Vec::new(),
            },
            requirements: CardRequirements::default(),
        }
    }

    pub(super) fn cards() -> Vec<Card> {
        let mut cards = vec![
            card(
                "basic-frame",
                "Basic Frame",
                "structure",
                Rarity::Common,
                0,
                CardRisk::Low,
                "Holds all other layers together",
                "The device bends, cracks, or collapses",
            ),
            card(
                "manual-drive",
                "Manual Drive",
                "power",
                Rarity::Common,
                1,
                CardRisk::Low,
                "Converts your effort into motion or force",
                "The device locks up or kicks back",
            ),
            card(
                "stored-motion",
                "Stored Motion",
                "power",
                Rarity::Uncommon,
                1,
                CardRisk::Medium,
                "Releases stored kinetic force",
                "Power releases all at once",
            ),
            card(
                "simple-trigger",
                "Simple Trigger",
                "control",
                Rarity::Common,
                1,
                CardRisk::Low,
                "On/Off behavior based on one condition",
                "The trigger sticks or misfires",
            ),
            card(
                "fixed-sequence",
                "Fixed Sequence",
                "control",
                Rarity::Uncommon,
                1,
                CardRisk::Medium,
                "Executes a set series of actions",
                "Steps occur out of order",
            ),
            card(
                "physical-contact",
                "Physical Contact",
                "sense",
                Rarity::Common,
                1,
                CardRisk::Low,
                "Detects direct contact",
                "Missed contact or false signals",
            ),
            card(
                "stress-motion",
                "Stress & Motion",
                "sense",
                Rarity::Uncommon,
                1,
                CardRisk::Medium,
                "Detects sustained force or motion",
                "Overreaction or total silence",
            ),
            card(
                "emergency-release",
                "Emergency Release",
                "safety",
                Rarity::Common,
                1,
                CardRisk::Low,
                "Reduces damage when something goes wrong",
                "The release jams or works partially",
            ),
            card(
                "shock-dampening",
                "Shock Dampening",
                "safety",
                Rarity::Common,
                1,
                CardRisk::Low,
                "Absorbs violent force",
                "Protection degrades or stops working",
            ),
        ];

        // Build detail for the fully-specified starter cards
        cards[0].cost.materials = strings(["crude-metal", "basic-tools"]);
        cards[0].mechanics.triggers = strings(["excessive-stress", "material-fatigue"]);
        cards[0].mechanics.effects = strings(["structure-damage", "total-failure-risk"]);
        cards[0].requirements.tools = strings(["basic-workshop"]);

        cards[1].cost.materials = strings(["lever-mechanism", "grip-material"]);
        cards[1].mechanics.triggers = strings(["operator-fatigue", "mechanism-jam"]);
        cards[1].mechanics.effects = strings(["operator-injury", "power-loss"]);
        cards[1].requirements.skills = strings(["basic-mechanics"]);
        cards[1].requirements.tools = strings(["hand-tools"]);

        cards[2].cost.materials = strings(["spring-steel", "tension-cable"]);
        cards[2].cost.time = BuildTime::Days;
        cards[2].mechanics.triggers = strings(["spring-failure", "release-malfunction"]);
        cards[2].mechanics.effects = strings(["area-damage", "component-destruction"]);
        cards[2].requirements.skills = strings(["advanced-mechanics", "spring-working"]);
        cards[2].requirements.tools = strings(["precision-tools"]);
        cards[2].requirements.knowledge = strings(["energy-storage"]);

        cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_zero_counts() {
        let catalog = Catalog::tier_zero();
        assert_eq!(catalog.get_shells_by_tier(0).len(), 3);
        assert_eq!(catalog.get_cards_by_tier(0).len(), 9);
        assert!(catalog.get_layer(&"safety".into()).is_some());
    }

    #[test]
    fn test_lookup_by_layer_and_rarity() {
        let catalog = Catalog::tier_zero();
        let power_cards = catalog.get_cards_by_layer(&"power".into());
        assert_eq!(power_cards.len(), 2);
        assert!(catalog
            .get_cards_by_rarity(Rarity::Uncommon)
            .iter()
            .any(|c| c.id.as_str() == "stored-motion"));
    }

    #[test]
    fn test_lookup_by_category() {
        let catalog = Catalog::tier_zero();
        assert_eq!(catalog.get_shells_by_category("weapon").len(), 3);
        assert!(catalog.get_shells_by_category("vehicle").is_empty());

        let intelligence = catalog.get_layers_by_category("intelligence");
        let names: Vec<&str> = intelligence.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(names, vec!["control", "sense"]);
    }

    #[test]
    fn test_compatibility_allows_optional_layer() {
        let catalog = Catalog::tier_zero();
        assert!(catalog
            .validate_shell_card_compatibility(&"hand-tool".into(), &"simple-trigger".into())
            .is_ok());
    }

    #[test]
    fn test_compatibility_rejects_unlisted_layer() {
        let catalog = Catalog::tier_zero();
        // hand-tool accepts structure/power/control/safety but not sense
        let err = catalog
            .validate_shell_card_compatibility(&"hand-tool".into(), &"physical-contact".into())
            .unwrap_err();
        assert_eq!(
            err,
            Incompatibility::LayerNotAllowed {
                layer: "Sense".to_string(),
                shell: "Hand Tool".to_string(),
            }
        );
        assert_eq!(err.to_string(), "Sense layer not allowed for Hand Tool");
    }

    #[test]
    fn test_compatibility_rejects_forbidden_layer() {
        let mut catalog = Catalog::tier_zero();
        let mut shell = catalog.get_shell(&"hand-tool".into()).cloned().expect("seeded");
        shell.id = "sealed-tool".into();
        shell.name = "Sealed Tool".to_string();
        // A layer can be optional and forbidden at once (only mandatory and
        // forbidden are disjoint); the forbidden rule wins
        shell.requirements.forbidden.insert("control".into());
        catalog.register_shell(shell).expect("fresh id");

        let err = catalog
            .validate_shell_card_compatibility(&"sealed-tool".into(), &"simple-trigger".into())
            .unwrap_err();
        assert!(matches!(err, Incompatibility::LayerForbidden { .. }));
    }

    #[test]
    fn test_compatibility_rejects_higher_tier_card() {
        let mut catalog = Catalog::tier_zero();
        let mut card = catalog
            .get_card(&"stored-motion".into())
            .cloned()
            .expect("seeded");
        card.id = "pressure-cell".into();
        card.name = "Pressure Cell".to_string();
        card.tier = 1;
        catalog.register_card(card).expect("fresh id");

        let err = catalog
            .validate_shell_card_compatibility(&"hand-tool".into(), &"pressure-cell".into())
            .unwrap_err();
        assert_eq!(err, Incompatibility::TierTooHigh);
    }

    #[test]
    fn test_compatibility_unknown_ids() {
        let catalog = Catalog::tier_zero();
        assert_eq!(
            catalog
                .validate_shell_card_compatibility(&"missing".into(), &"basic-frame".into())
                .unwrap_err(),
            Incompatibility::UnknownShellOrCard
        );
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut catalog = Catalog::tier_zero();
        let shell = catalog.get_shell(&"hand-tool".into()).cloned().expect("seeded");
        let err = catalog.register_shell(shell).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateId { .. }));

        let layer = catalog.get_layer(&"power".into()).cloned().expect("seeded");
        assert!(catalog.register_layer(layer).is_err());

        let card = catalog.get_card(&"basic-frame".into()).cloned().expect("seeded");
        assert!(catalog.register_card(card).is_err());
    }
}
