// ABOUTME: Extra kind registrations for stability checks.
// ABOUTME: Merges configured kinds over the built-in strategy table.

use serde::Deserialize;
use std::collections::HashMap;

use crate::stability::{Strategy, StrategyTable};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StabilityConfig {
    /// Kind → strategy, overriding the built-ins for the same kind.
    #[serde(default)]
    pub kinds: HashMap<String, Strategy>,
}

impl StabilityConfig {
    pub fn table(&self) -> StrategyTable {
        let mut table = StrategyTable::default();
        for (kind, strategy) in &self.kinds {
            if let Some(previous) = table.register(kind.as_str(), *strategy) {
                tracing::debug!(kind = %kind, %previous, strategy = %strategy, "overriding built-in strategy");
            }
        }
        table
    }
}
