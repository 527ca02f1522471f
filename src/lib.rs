pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::analyzers::publishing_page::PublishingPageAnalyzer;
pub use config::AnalyzerConfig;
pub use domain::model::{CanonicalLayout, LayoutMappingModel, PageAnalysis, Placeholder};
pub use domain::ports::PageAnalyzer;
pub use utils::error::{AnalyzerError, Result};
