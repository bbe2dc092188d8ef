//! Crucible engine library.
//!
//! Application services over the domain layer, plus the outbound ports they
//! consume and reference adapters for those ports.
//!
//! ## Structure
//!
//! - `ports/` - contracts the host supplies (storage, clock, RNG)
//! - `infrastructure/` - concrete adapters (system clock, thread RNG,
//!   in-memory storage, deterministic test doubles)
//! - `services/` - the assembly, validation, dice, and character engines
//!
//! All services are synchronous and single-threaded; a multi-threaded host
//! must serialize mutating calls through one owner to preserve the
//! snapshot-before-mutate ordering of the undo buffer.

pub mod infrastructure;
pub mod ports;
pub mod services;

pub use services::{
    BuilderConfig, CharacterService, DicePreset, DiceRoller, ValidationEngine, ValidationReport,
    WeaponBuilderService, WeaponExport,
};
