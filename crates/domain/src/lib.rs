//! Crucible domain layer.
//!
//! Core types and invariants for the weapon builder: catalog entities,
//! the weapon aggregate, dice expression value objects, and the unified
//! domain error. No I/O, no RNG - randomness and time are injected by
//! callers.

pub mod catalog;
pub mod character_sheet;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;
pub mod weapon;

pub use catalog::{Catalog, Incompatibility};
pub use error::DomainError;

// Re-export entities (explicit list in entities/mod.rs)
pub use entities::{
    BuildTime, Card, CardCost, CardMechanics, CardRequirements, CardRisk, Layer, Rarity, Shell,
    ShellRequirements, ShellRules, ShellStats, StressLimit,
};

// Re-export character sheet types
pub use character_sheet::{
    CharacterIdentity, CharacterSheet, CharacterStats, Injury, InstabilityStatus, WeaponSummary,
};

// Re-export ID types
pub use ids::{CardId, LayerId, ShellId, WeaponId};

// Re-export value objects (explicit list in value_objects/mod.rs)
pub use value_objects::{
    add_die_to_expression, DiceExpression, DiceExpressionError, DiceTerm, RiskLevel, RollResult,
    TermRoll,
};

// Re-export the weapon aggregate
pub use weapon::{
    AssemblyValidation, InstallOptions, InstalledCard, Weapon, WeaponMetadata,
    CANONICAL_LAYER_ORDER, EMPTY_DESCRIPTION,
};
