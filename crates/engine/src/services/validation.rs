//! Validation engine - the fixed rule pipeline over a weapon snapshot
//!
//! Five independent checkers run unconditionally, in order, and their
//! outputs are concatenated. A checker that fails internally is converted
//! into a single synthetic error and does not abort the rest of the
//! pipeline, so one faulty rule cannot poison the whole report.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::error;

use crucible_domain::{Catalog, CardRisk, DomainError, Weapon};

/// Combined output of the validation pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

#[derive(Debug, Default)]
struct CheckOutput {
    errors: Vec<String>,
    warnings: Vec<String>,
    info: Vec<String>,
}

type Checker = fn(&ValidationEngine, &Weapon) -> Result<CheckOutput, DomainError>;

/// Closed registration table: the checker set is fixed and known at compile
/// time, in pipeline order.
const CHECKERS: [(&str, Checker); 5] = [
    ("shell-requirements", ValidationEngine::check_shell_requirements),
    ("slot-limits", ValidationEngine::check_slot_limits),
    ("tier-constraints", ValidationEngine::check_tier_constraints),
    ("compatibility", ValidationEngine::check_compatibility),
    ("risk-assessment", ValidationEngine::check_risk),
];

/// Rule pipeline re-deriving a structured report from a weapon snapshot
pub struct ValidationEngine {
    catalog: Arc<Catalog>,
    /// Externally supplied campaign progression gate
    campaign_tier: u8,
}

impl ValidationEngine {
    pub fn new(catalog: Arc<Catalog>, campaign_tier: u8) -> Self {
        Self {
            catalog,
            campaign_tier,
        }
    }

    pub fn campaign_tier(&self) -> u8 {
        self.campaign_tier
    }

    pub fn set_campaign_tier(&mut self, tier: u8) {
        self.campaign_tier = tier;
    }

    /// Run every checker and concatenate their findings
    pub fn validate(&self, weapon: &Weapon) -> ValidationReport {
        let mut report = ValidationReport::default();

        for (name, checker) in CHECKERS {
            match checker(self, weapon) {
                Ok(output) => {
                    report.errors.extend(output.errors);
                    report.warnings.extend(output.warnings);
                    report.info.extend(output.info);
                }
                Err(failure) => {
                    error!(checker = name, %failure, "validator failed");
                    report.errors.push(format!("Internal validation error: {name}"));
                }
            }
        }

        report.valid = report.errors.is_empty();
        report
    }

    // =========================================================================
    // Checkers
    // =========================================================================

    fn check_shell_requirements(&self, weapon: &Weapon) -> Result<CheckOutput, DomainError> {
        let mut output = CheckOutput::default();
        let shell = match weapon.shell() {
            Some(shell) => shell,
            None => {
                output.errors.push("No shell selected".to_string());
                return Ok(output);
            }
        };

        let missing: Vec<&str> = shell
            .requirements
            .mandatory
            .iter()
            .filter(|layer| weapon.installed_card(layer).is_none())
            .map(|layer| layer.as_str())
            .collect();
        if !missing.is_empty() {
            output
                .errors
                .push(format!("Missing required layers: {}", missing.join(", ")));
        }

        let forbidden: Vec<&str> = weapon
            .layers()
            .keys()
            .filter(|layer| shell.requirements.is_forbidden(layer))
            .map(|layer| layer.as_str())
            .collect();
        if !forbidden.is_empty() {
            output.errors.push(format!(
                "Forbidden layers installed: {}",
                forbidden.join(", ")
            ));
        }

        Ok(output)
    }

    fn check_slot_limits(&self, weapon: &Weapon) -> Result<CheckOutput, DomainError> {
        let mut output = CheckOutput::default();
        let shell = match weapon.shell() {
            Some(shell) => shell,
            None => return Ok(output),
        };

        let used = weapon.used_slots();
        let max = shell.stats.slots;
        if used > max {
            output
                .errors
                .push(format!("Slot limit exceeded: {used}/{max}"));
        } else if used == max {
            output.info.push("All slots utilized".to_string());
        } else {
            output.info.push(format!("{} slots available", max - used));
        }

        Ok(output)
    }

    fn check_tier_constraints(&self, weapon: &Weapon) -> Result<CheckOutput, DomainError> {
        let mut output = CheckOutput::default();
        let shell = match weapon.shell() {
            Some(shell) => shell,
            None => return Ok(output),
        };

        if shell.tier > self.campaign_tier {
            output.errors.push(format!(
                "Shell tier too high: {} > {}",
                shell.tier, self.campaign_tier
            ));
        }

        for installed in weapon.layers().values() {
            if installed.card.tier > self.campaign_tier {
                output.errors.push(format!(
                    "Card \"{}\" tier too high: {} > {}",
                    installed.card.name, installed.card.tier, self.campaign_tier
                ));
            }
        }

        Ok(output)
    }

    fn check_compatibility(&self, weapon: &Weapon) -> Result<CheckOutput, DomainError> {
        let mut output = CheckOutput::default();
        let shell = match weapon.shell() {
            Some(shell) => shell,
            None => return Ok(output),
        };

        for installed in weapon.layers().values() {
            if let Err(reason) = self
                .catalog
                .validate_shell_card_compatibility(&shell.id, &installed.card.id)
            {
                output.errors.push(format!(
                    "Incompatible card \"{}\": {reason}",
                    installed.card.name
                ));
            }
        }

        Ok(output)
    }

    fn check_risk(&self, weapon: &Weapon) -> Result<CheckOutput, DomainError> {
        let mut output = CheckOutput::default();
        if weapon.layers().is_empty() {
            return Ok(output);
        }

        let high = weapon
            .layers()
            .values()
            .filter(|l| l.card.risk == CardRisk::High)
            .count();
        let medium = weapon
            .layers()
            .values()
            .filter(|l| l.card.risk == CardRisk::Medium)
            .count();

        // Thresholds are fixed design constants
        if high > 2 {
            output
                .warnings
                .push("Very high risk configuration - expect frequent failures".to_string());
        } else if high > 0 {
            output
                .warnings
                .push("High risk components detected - use with caution".to_string());
        } else if medium > 3 {
            output
                .warnings
                .push("Multiple medium risk components may interact unpredictably".to_string());
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crucible_domain::{Card, InstallOptions, InstalledCard};

    fn engine() -> ValidationEngine {
        ValidationEngine::new(Arc::new(Catalog::tier_zero()), 0)
    }

    fn engine_with_catalog(catalog: Catalog) -> ValidationEngine {
        ValidationEngine::new(Arc::new(catalog), 0)
    }

    fn install(weapon: &mut Weapon, card: Card) {
        let layer_id = card.layer_id.clone();
        let installed = InstalledCard {
            card_id: card.id.clone(),
            card,
            installed_at: Utc::now(),
            options: InstallOptions::default(),
        };
        weapon
            .install(layer_id, installed, Utc::now())
            .expect("card matches its layer");
    }

    fn seeded_card(catalog: &Catalog, id: &str) -> Card {
        catalog
            .get_card(&id.into())
            .cloned()
            .expect("card in seed catalog")
    }

    fn weapon_with_shell(catalog: &Catalog, shell_id: &str) -> Weapon {
        let mut weapon = Weapon::new(Utc::now());
        let shell = catalog
            .get_shell(&shell_id.into())
            .cloned()
            .expect("shell in seed catalog");
        weapon.set_shell(shell, Utc::now());
        weapon
    }

    #[test]
    fn test_no_shell_reports_error() {
        let report = engine().validate(&Weapon::new(Utc::now()));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["No shell selected".to_string()]);
    }

    #[test]
    fn test_missing_mandatory_layer_is_invalid() {
        let catalog = Catalog::tier_zero();
        let weapon = weapon_with_shell(&catalog, "hand-tool");
        let report = engine().validate(&weapon);
        assert!(!report.valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.starts_with("Missing required layers")));
        // Later checkers still ran
        assert!(report.info.iter().any(|i| i.contains("slots available")));
    }

    #[test]
    fn test_complete_weapon_has_no_errors() {
        let catalog = Catalog::tier_zero();
        let mut weapon = weapon_with_shell(&catalog, "hand-tool");
        install(&mut weapon, seeded_card(&catalog, "basic-frame"));
        install(&mut weapon, seeded_card(&catalog, "manual-drive"));

        let report = engine().validate(&weapon);
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert_eq!(report.info, vec!["1 slots available".to_string()]);
    }

    #[test]
    fn test_slot_overflow_and_full_utilization() {
        let catalog = Catalog::tier_zero();
        let mut weapon = weapon_with_shell(&catalog, "hand-tool");
        install(&mut weapon, seeded_card(&catalog, "basic-frame"));
        install(&mut weapon, seeded_card(&catalog, "manual-drive"));
        install(&mut weapon, seeded_card(&catalog, "simple-trigger"));
        // 2/2 slots used
        let report = engine().validate(&weapon);
        assert!(report.info.contains(&"All slots utilized".to_string()));

        // The aggregate does not police slots, so an over-budget snapshot is
        // representable and the pipeline must flag it
        install(&mut weapon, seeded_card(&catalog, "emergency-release"));
        let report = engine().validate(&weapon);
        assert!(!report.valid);
        assert!(report
            .errors
            .contains(&"Slot limit exceeded: 3/2".to_string()));
    }

    #[test]
    fn test_tier_constraints_flag_shell_and_cards() {
        let mut catalog = Catalog::tier_zero();
        let mut high_tier_card = seeded_card(&catalog, "stored-motion");
        high_tier_card.id = "pressure-cell".into();
        high_tier_card.name = "Pressure Cell".to_string();
        high_tier_card.tier = 1;
        catalog.register_card(high_tier_card.clone()).expect("fresh id");

        let mut weapon = weapon_with_shell(&catalog, "static-device");
        install(&mut weapon, seeded_card(&catalog, "basic-frame"));
        install(&mut weapon, high_tier_card);

        let report = engine_with_catalog(catalog.clone()).validate(&weapon);
        assert!(report
            .errors
            .contains(&"Card \"Pressure Cell\" tier too high: 1 > 0".to_string()));

        // A shell above the campaign tier is flagged too
        let mut late_shell = catalog
            .get_shell(&"static-device".into())
            .cloned()
            .expect("shell in seed catalog");
        late_shell.tier = 2;
        let mut late_weapon = Weapon::new(Utc::now());
        late_weapon.set_shell(late_shell, Utc::now());
        assert!(engine()
            .validate(&late_weapon)
            .errors
            .contains(&"Shell tier too high: 2 > 0".to_string()));

        // Raising the campaign tier clears the tier-constraint errors (the
        // card still exceeds its tier-0 shell, which is compatibility's call)
        let mut lenient = engine_with_catalog(catalog);
        lenient.set_campaign_tier(1);
        let report = lenient.validate(&weapon);
        assert!(!report.errors.iter().any(|e| e.contains("tier too high:")));
        assert!(report
            .errors
            .contains(&"Incompatible card \"Pressure Cell\": Card tier too high for shell".to_string()));
    }

    #[test]
    fn test_compatibility_checker_reports_catalog_reason() {
        let catalog = Catalog::tier_zero();
        // physical-contact targets the sense layer, which hand-tool rejects
        let mut weapon = weapon_with_shell(&catalog, "hand-tool");
        install(&mut weapon, seeded_card(&catalog, "physical-contact"));

        let report = engine().validate(&weapon);
        assert!(report.errors.contains(
            &"Incompatible card \"Physical Contact\": Sense layer not allowed for Hand Tool"
                .to_string()
        ));
    }

    #[test]
    fn test_single_high_risk_warning() {
        let mut catalog = Catalog::tier_zero();
        let mut volatile = seeded_card(&catalog, "stored-motion");
        volatile.id = "volatile-core".into();
        volatile.name = "Volatile Core".to_string();
        volatile.risk = CardRisk::High;
        catalog.register_card(volatile.clone()).expect("fresh id");

        let mut weapon = weapon_with_shell(&catalog, "static-device");
        install(&mut weapon, seeded_card(&catalog, "basic-frame"));
        install(&mut weapon, volatile);

        let report = engine_with_catalog(catalog).validate(&weapon);
        assert_eq!(
            report.warnings,
            vec!["High risk components detected - use with caution".to_string()]
        );
    }

    #[test]
    fn test_many_high_risk_cards_escalate_warning() {
        let catalog = Catalog::tier_zero();
        let mut weapon = weapon_with_shell(&catalog, "static-device");
        for (id, name, source) in [
            ("volatile-core", "Volatile Core", "stored-motion"),
            ("chaos-logic", "Chaos Logic", "fixed-sequence"),
            ("raw-nerve", "Raw Nerve", "stress-motion"),
        ] {
            let mut card = seeded_card(&catalog, source);
            card.id = id.into();
            card.name = name.to_string();
            card.risk = CardRisk::High;
            install(&mut weapon, card);
        }

        let report = engine().validate(&weapon);
        assert_eq!(
            report.warnings,
            vec!["Very high risk configuration - expect frequent failures".to_string()]
        );
    }

    #[test]
    fn test_medium_risk_pileup_warning() {
        let catalog = Catalog::tier_zero();
        let mut weapon = weapon_with_shell(&catalog, "static-device");
        install(&mut weapon, seeded_card(&catalog, "stored-motion"));
        install(&mut weapon, seeded_card(&catalog, "fixed-sequence"));
        install(&mut weapon, seeded_card(&catalog, "stress-motion"));
        let mut fourth = seeded_card(&catalog, "emergency-release");
        fourth.risk = CardRisk::Medium;
        install(&mut weapon, fourth);

        let report = engine().validate(&weapon);
        assert_eq!(
            report.warnings,
            vec!["Multiple medium risk components may interact unpredictably".to_string()]
        );
    }

    #[test]
    fn test_empty_weapon_gets_no_risk_warning() {
        let catalog = Catalog::tier_zero();
        let weapon = weapon_with_shell(&catalog, "hand-tool");
        let report = engine().validate(&weapon);
        assert!(report.warnings.is_empty());
    }
}
