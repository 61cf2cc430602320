//! Runtime configuration.

use serde::{Deserialize, Serialize};

/// Settings for newly created composites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeConfig {
    /// Slots reserved up front. Copies of a composite keep the same hint.
    #[serde(default = "default_capacity_hint")]
    pub capacity_hint: usize,
}

fn default_capacity_hint() -> usize { 4 }

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            capacity_hint: default_capacity_hint(),
        }
    }
}
