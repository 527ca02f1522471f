#[cfg(feature = "cli")]
pub mod cli;
pub mod mapping_catalog;
pub mod snapshot;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

/// Settings that change how a page is analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Do not create placeholders for mapped fields that have no value.
    #[serde(default = "default_skip_empty_fields")]
    pub skip_empty_fields: bool,

    /// Per widget type, the properties kept by the default property assembler.
    #[serde(default)]
    pub property_allow_lists: HashMap<String, Vec<String>>,
}

fn default_skip_empty_fields() -> bool {
    true
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            skip_empty_fields: default_skip_empty_fields(),
            property_allow_lists: HashMap::new(),
        }
    }
}
