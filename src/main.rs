use clap::Parser;
use publishing_page_analyzer::config::mapping_catalog::{MappingCache, MappingCatalog};
use publishing_page_analyzer::config::snapshot::PageSnapshot;
use publishing_page_analyzer::utils::error::{AnalyzerError, ErrorSeverity};
use publishing_page_analyzer::utils::{logger, validation::Validate};
use publishing_page_analyzer::{CliConfig, PageAnalyzer, PublishingPageAnalyzer};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct AnalysisReport<'a> {
    page_layout: String,
    analyzed_at: String,
    #[serde(flatten)]
    analysis: &'a publishing_page_analyzer::PageAnalysis,
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting publishing page analysis");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(config: &CliConfig) -> Result<(), AnalyzerError> {
    config.validate()?;

    let catalog = MappingCatalog::from_file(&config.mapping)?;
    catalog.validate()?;
    tracing::info!(
        "📁 Loaded {} page layout mappings from {}",
        catalog.page_layouts.len(),
        config.mapping.display()
    );

    let mut analyzer_config = catalog.analyzer.clone();
    if config.keep_empty_fields {
        analyzer_config.skip_empty_fields = false;
    }

    let snapshot = Arc::new(PageSnapshot::from_file(&config.page)?);
    let mut analyzer =
        PublishingPageAnalyzer::new(snapshot.clone(), snapshot.clone(), Arc::new(catalog))
            .with_function_evaluator(snapshot.clone())
            .with_field_resolver(snapshot.clone())
            .with_resource_resolver(snapshot.clone())
            .with_config(analyzer_config);

    if let Some(fallback) = &config.fallback {
        let fallback_catalog = MappingCatalog::from_file(fallback)?;
        fallback_catalog.validate()?;

        let cache = MappingCache::new();
        for mapping in fallback_catalog.page_layouts {
            cache.insert(mapping)?;
        }
        tracing::info!("📁 {} fallback mappings available", cache.len());
        analyzer = analyzer.with_mapping_cache(Arc::new(cache));
    }

    let analysis = analyzer.analyze(None).await?;

    let report = AnalysisReport {
        page_layout: analyzer.page_layout_name(),
        analyzed_at: chrono::Utc::now().to_rfc3339(),
        analysis: &analysis,
    };
    let json = serde_json::to_string_pretty(&report)?;

    match &config.output {
        Some(output) => {
            std::fs::write(output, json)?;
            tracing::info!("✅ Analysis written to {}", output.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
