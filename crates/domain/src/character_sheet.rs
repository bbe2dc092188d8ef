//! Character sheet data and derived stats
//!
//! The sheet itself is rendered by the presentation layer; this module holds
//! the typed state it persists and the handful of derived values the original
//! sheet computes live (strain and injury capacity, weapon instability
//! status).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default size of the weapon instability gauge
pub const DEFAULT_INSTABILITY_GAUGE: u8 = 3;

/// The five core attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStats {
    pub force: u8,
    pub resilience: u8,
    pub precision: u8,
    pub adaptation: u8,
    pub cognition: u8,
}

impl CharacterStats {
    /// Max Strain: 6 + Resilience
    pub fn max_strain(&self) -> u8 {
        6 + self.resilience
    }

    /// Max Injuries: 2 + half Resilience, rounded down
    pub fn max_injuries(&self) -> u8 {
        2 + self.resilience / 2
    }
}

/// How close the weapon is to malfunction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstabilityStatus {
    Stable,
    Unstable,
    Critical,
    Catastrophic,
}

impl InstabilityStatus {
    /// Rate accumulated instability against the operator's Force stat and
    /// the weapon's gauge. Escalations are evaluated weakest-first and the
    /// strongest applicable level wins.
    pub fn rate(current: u8, gauge: u8, force: u8) -> Self {
        let mut status = Self::Stable;
        if current > force {
            status = Self::Unstable;
        }
        if current > gauge {
            status = Self::Critical;
        }
        if current >= gauge.saturating_mul(2) && gauge > 0 {
            status = Self::Catastrophic;
        }
        status
    }

    /// Player-facing status line
    pub fn message(&self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Unstable => "Unstable - Consequences escalate on failure",
            Self::Critical => "Critical - Major malfunction risk",
            Self::Catastrophic => "CATASTROPHIC - Extreme failure risk",
        }
    }
}

/// Who the character is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterIdentity {
    pub name: String,
    pub callsign: String,
    pub concept: String,
    pub background: String,
}

/// One injury or trauma slot on the health track
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Injury {
    pub marked: bool,
    pub description: String,
}

/// The weapon block on the sheet (filled from a builder export)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponSummary {
    pub platform: String,
    pub platform_features: String,
    pub module: String,
    pub module_effect: String,
    pub difficulty: u8,
    pub damage: String,
    pub instability_gauge: u8,
    pub current_instability: u8,
}

impl Default for WeaponSummary {
    fn default() -> Self {
        Self {
            platform: String::new(),
            platform_features: String::new(),
            module: String::new(),
            module_effect: String::new(),
            difficulty: 10,
            damage: "1d6".to_string(),
            instability_gauge: DEFAULT_INSTABILITY_GAUGE,
            current_instability: 0,
        }
    }
}

/// Full character state as persisted by the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSheet {
    pub identity: CharacterIdentity,
    pub stats: CharacterStats,
    /// Marked strain boxes (0..=max_strain)
    pub strain: u8,
    pub injuries: Vec<Injury>,
    pub trauma: Vec<Injury>,
    pub weapon: WeaponSummary,
    pub saved_at: DateTime<Utc>,
}

impl CharacterSheet {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            identity: CharacterIdentity::default(),
            stats: CharacterStats::default(),
            strain: 0,
            injuries: Vec::new(),
            trauma: Vec::new(),
            weapon: WeaponSummary::default(),
            saved_at: now,
        }
    }

    /// Current instability rating of the equipped weapon
    pub fn instability_status(&self) -> InstabilityStatus {
        InstabilityStatus::rate(
            self.weapon.current_instability,
            self.weapon.instability_gauge,
            self.stats.force,
        )
    }
}
