// ABOUTME: Classify command implementation.
// ABOUTME: Prints the stability strategy each kind is checked with.

use settle::config::Config;
use settle::output::Output;
use settle::stability::StrategyTable;

/// Uses the configured table when a config was found, the built-ins otherwise.
pub fn classify(config: Option<&Config>, kinds: &[String], output: &Output) {
    let table = config
        .map(Config::strategy_table)
        .unwrap_or_else(StrategyTable::default);

    for kind in kinds {
        output.classification(kind, table.classify(kind));
    }
}
