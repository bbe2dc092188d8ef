//! Shell entity - A weapon chassis archetype
//!
//! A shell fixes the slot budget and dictates which layers are mandatory,
//! optional, or forbidden. Immutable catalog entry.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{LayerId, ShellId};

/// A weapon chassis archetype
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shell {
    pub id: ShellId,
    pub name: String,
    /// Campaign progression gate; shells above the current tier are unusable
    pub tier: u8,
    pub category: String,
    pub description: String,
    pub stats: ShellStats,
    pub requirements: ShellRequirements,
    pub rules: ShellRules,
}

/// Physical characteristics of the chassis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellStats {
    /// Total slot capacity; the sum of installed card costs may not exceed it
    pub slots: u32,
    pub stress_limit: StressLimit,
}

/// Which layers the chassis accepts
///
/// # Invariants
///
/// - `mandatory` and `forbidden` are disjoint (enforced by [`Self::new`])
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellRequirements {
    pub mandatory: BTreeSet<LayerId>,
    pub optional: BTreeSet<LayerId>,
    pub forbidden: BTreeSet<LayerId>,
}

impl ShellRequirements {
    /// Build a requirements triple, rejecting a layer listed as both
    /// mandatory and forbidden.
    pub fn new(
        mandatory: impl IntoIterator<Item = LayerId>,
        optional: impl IntoIterator<Item = LayerId>,
        forbidden: impl IntoIterator<Item = LayerId>,
    ) -> Result<Self, DomainError> {
        let mandatory: BTreeSet<LayerId> = mandatory.into_iter().collect();
        let optional: BTreeSet<LayerId> = optional.into_iter().collect();
        let forbidden: BTreeSet<LayerId> = forbidden.into_iter().collect();

        if let Some(conflict) = mandatory.intersection(&forbidden).next() {
            return Err(DomainError::validation(format!(
                "Layer {conflict} cannot be both mandatory and forbidden"
            )));
        }

        Ok(Self {
            mandatory,
            optional,
            forbidden,
        })
    }

    /// Whether the layer may hold a card on this shell
    pub fn allows(&self, layer_id: &LayerId) -> bool {
        self.mandatory.contains(layer_id) || self.optional.contains(layer_id)
    }

    pub fn is_forbidden(&self, layer_id: &LayerId) -> bool {
        self.forbidden.contains(layer_id)
    }
}

/// Free-text rules attached to the chassis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellRules {
    pub special_rule: String,
    #[serde(default)]
    pub overclocking: Option<String>,
    #[serde(default)]
    pub material_quality: Option<String>,
}

/// How much operating stress the chassis tolerates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLimit {
    Low,
    Moderate,
    High,
    /// Unknown limit for forward compatibility
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for StressLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Moderate => write!(f, "Moderate"),
            Self::High => write!(f, "High"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

impl std::str::FromStr for StressLimit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "Moderate" => Ok(Self::Moderate),
            "High" => Ok(Self::High),
            _ => Ok(Self::Unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(id: &str) -> LayerId {
        LayerId::new(id)
    }

    #[test]
    fn test_requirements_reject_overlap() {
        let result = ShellRequirements::new(
            [layer("structure"), layer("power")],
            [layer("control")],
            [layer("power")],
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_requirements_allows_and_forbids() {
        let reqs = ShellRequirements::new(
            [layer("structure")],
            [layer("control")],
            [layer("sense")],
        )
        .expect("disjoint sets");

        assert!(reqs.allows(&layer("structure")));
        assert!(reqs.allows(&layer("control")));
        assert!(!reqs.allows(&layer("sense")));
        assert!(reqs.is_forbidden(&layer("sense")));
        assert!(!reqs.is_forbidden(&layer("structure")));
    }
}
