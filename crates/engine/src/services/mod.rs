//! Application services - the engines the presentation layer drives

mod character;
mod dice;
mod validation;
mod weapon_builder;

pub use character::{CharacterService, CHARACTER_KEY};
pub use dice::{DicePreset, DiceRoller, MAX_ROLL_HISTORY, PRESET_KEY};
pub use validation::{ValidationEngine, ValidationReport};
pub use weapon_builder::{
    BuilderConfig, WeaponBuilderService, WeaponData, WeaponExport, WeaponStats, AUTOSAVE_KEY,
    EXPORT_VERSION,
};
