//! Layer entity - A design axis of weapon construction
//!
//! Every card belongs to exactly one layer, and a weapon holds at most one
//! card per layer. Layers are immutable catalog entries.

use serde::{Deserialize, Serialize};

use crate::ids::LayerId;

/// A conceptual axis of weapon design (Structure, Power, Control, ...)
///
/// This is a data-carrying struct with no invariants to protect. All fields
/// are public because any combination of values is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// The design prompt this layer answers ("What makes this do anything?")
    pub question: String,
    pub description: String,
    /// Grouping tag ("foundation", "core", "intelligence", "protection")
    pub category: String,
}

impl Layer {
    pub fn new(
        id: impl Into<LayerId>,
        name: impl Into<String>,
        question: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            question: question.into(),
            description: description.into(),
            category: category.into(),
        }
    }
}
