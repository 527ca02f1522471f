use crate::utils::error::Result;
use crate::utils::validation::{validate_existing_file, validate_path, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "analyze-page")]
#[command(about = "Analyzes a captured publishing page into layout placeholders")]
pub struct CliConfig {
    /// TOML file with the page layout mappings
    #[arg(long, short)]
    pub mapping: PathBuf,

    /// Page snapshot (TOML, or JSON with a .json extension)
    #[arg(long, short)]
    pub page: PathBuf,

    /// Extra mapping file consulted when the page layout is not in --mapping
    #[arg(long)]
    pub fallback: Option<PathBuf>,

    /// Create placeholders for mapped fields even when they are empty
    #[arg(long)]
    pub keep_empty_fields: bool,

    /// Write the analysis here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_existing_file("mapping", &self.mapping)?;
        validate_existing_file("page", &self.page)?;
        if let Some(fallback) = &self.fallback {
            validate_existing_file("fallback", fallback)?;
        }
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let config = CliConfig::parse_from([
            "analyze-page",
            "--mapping",
            "mapping.toml",
            "-p",
            "page.json",
            "--keep-empty-fields",
        ]);

        assert_eq!(config.mapping, PathBuf::from("mapping.toml"));
        assert_eq!(config.page, PathBuf::from("page.json"));
        assert!(config.keep_empty_fields);
        assert!(config.fallback.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_missing_files_fail_validation() {
        let config = CliConfig::parse_from([
            "analyze-page",
            "--mapping",
            "/no/such/mapping.toml",
            "--page",
            "/no/such/page.toml",
        ]);
        assert!(config.validate().is_err());
    }
}
