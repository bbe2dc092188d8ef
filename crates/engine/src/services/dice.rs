//! Dice roller service - evaluation, roll history, and presets
//!
//! Wraps the domain dice value objects with the injected RNG and clock,
//! keeps a bounded log of recent rolls, and persists reusable presets
//! through the storage port.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crucible_domain::{add_die_to_expression, DiceExpression, DiceExpressionError, RollResult};

use crate::ports::{ClockPort, RandomPort, StoragePort};

/// Storage key the preset collection lives under
pub const PRESET_KEY: &str = "crucible-dice-presets";

/// Bound on the in-memory roll log
pub const MAX_ROLL_HISTORY: usize = 50;

/// A reusable named expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicePreset {
    pub name: String,
    pub expression: String,
}

/// Stateful roller over the stateless expression engine
pub struct DiceRoller {
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    storage: Arc<dyn StoragePort>,
    history: VecDeque<RollResult>,
    presets: Vec<DicePreset>,
}

impl DiceRoller {
    pub fn new(
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
        storage: Arc<dyn StoragePort>,
    ) -> Self {
        Self {
            random,
            clock,
            storage,
            history: VecDeque::new(),
            presets: Vec::new(),
        }
    }

    // =========================================================================
    // Rolling
    // =========================================================================

    /// Parse and evaluate an expression, logging the result.
    ///
    /// Parse errors carry messages suitable for direct user display; the
    /// history is only appended on success.
    pub fn roll(&mut self, expression: &str) -> Result<RollResult, DiceExpressionError> {
        let parsed = DiceExpression::parse(expression)?;
        let random = Arc::clone(&self.random);
        let result = parsed.roll_with(
            |sides| random.random_range(1, sides as i32) as u32,
            self.clock.now(),
        );
        debug!(expression, total = result.total, "dice rolled");

        self.history.push_back(result.clone());
        while self.history.len() > MAX_ROLL_HISTORY {
            self.history.pop_front();
        }
        Ok(result)
    }

    /// Recent rolls, oldest first
    pub fn history(&self) -> impl Iterator<Item = &RollResult> {
        self.history.iter()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Fold one more die into an expression under construction (see the
    /// domain composer for the first-match merge rule)
    pub fn compose(&self, current: &str, sides: u32) -> String {
        add_die_to_expression(current, sides)
    }

    // =========================================================================
    // Presets
    // =========================================================================

    pub fn presets(&self) -> &[DicePreset] {
        &self.presets
    }

    pub fn preset(&self, name: &str) -> Option<&DicePreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Create or replace the preset with this name.
    ///
    /// The expression must parse; a preset that cannot be rolled is useless.
    pub fn save_preset(
        &mut self,
        name: &str,
        expression: &str,
    ) -> Result<(), DiceExpressionError> {
        DiceExpression::parse(expression)?;

        let preset = DicePreset {
            name: name.to_string(),
            expression: expression.to_string(),
        };
        match self.presets.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
        self.persist_presets();
        Ok(())
    }

    /// Delete a preset by name. Returns false when no such preset exists.
    pub fn remove_preset(&mut self, name: &str) -> bool {
        let before = self.presets.len();
        self.presets.retain(|p| p.name != name);
        let removed = self.presets.len() != before;
        if removed {
            self.persist_presets();
        }
        removed
    }

    /// Load the persisted preset collection, replacing the in-memory set.
    /// Returns whether a stored collection was found and parsed.
    pub fn load_presets(&mut self) -> bool {
        let json = match self.storage.get(PRESET_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return false,
            Err(error) => {
                warn!(%error, "failed to read dice presets");
                return false;
            }
        };

        match serde_json::from_str::<Vec<DicePreset>>(&json) {
            Ok(presets) => {
                self.presets = presets;
                true
            }
            Err(error) => {
                warn!(%error, "failed to parse dice presets");
                false
            }
        }
    }

    fn persist_presets(&self) {
        match serde_json::to_string(&self.presets) {
            Ok(json) => {
                if let Err(error) = self.storage.set(PRESET_KEY, &json) {
                    warn!(%error, "failed to store dice presets");
                }
            }
            Err(error) => warn!(%error, "failed to serialize dice presets"),
        }
    }
}
