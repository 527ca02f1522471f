use crate::config::AnalyzerConfig;
use crate::domain::model::LayoutMappingModel;
use crate::domain::ports::LayoutMappingProvider;
use crate::utils::error::{AnalyzerError, Result};
use crate::utils::validation::{validate_min, validate_non_empty_string, Validate};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{LazyLock, RwLock};

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Page layout mappings loaded from a TOML mapping file.
///
/// Lookups are case-insensitive and the first layout with a matching name wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingCatalog {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub page_layouts: Vec<LayoutMappingModel>,
}

impl MappingCatalog {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnalyzerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses a mapping file, replacing `${VAR}` with environment values first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AnalyzerError::ConfigValidationError {
            field: "mapping_file".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn find(&self, name: &str) -> Option<&LayoutMappingModel> {
        self.page_layouts
            .iter()
            .find(|layout| layout.name.eq_ignore_ascii_case(name))
    }

    pub fn validate_config(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for (index, layout) in self.page_layouts.iter().enumerate() {
            let prefix = format!("page_layouts[{}]", index);
            validate_non_empty_string(&format!("{}.name", prefix), &layout.name)?;

            if !seen.insert(layout.name.to_ascii_lowercase()) {
                tracing::warn!(
                    "Page layout '{}' is mapped more than once, the first mapping is used",
                    layout.name
                );
            }

            for (i, field) in layout.field_mappings.iter().enumerate() {
                let field_prefix = format!("{}.field_mappings[{}]", prefix, i);
                validate_non_empty_string(&format!("{}.name", field_prefix), &field.name)?;
                validate_non_empty_string(
                    &format!("{}.target_type", field_prefix),
                    &field.target_type,
                )?;
                validate_cell(&field_prefix, field.row, field.column, field.order)?;
            }

            for (i, zone) in layout.zones.iter().enumerate() {
                let zone_prefix = format!("{}.zones[{}]", prefix, i);
                validate_non_empty_string(&format!("{}.zone_id", zone_prefix), &zone.zone_id)?;
                validate_cell(&zone_prefix, zone.row, zone.column, zone.order)?;
            }

            let metadata = &layout.metadata;
            validate_cell(
                &format!("{}.metadata.page_properties", prefix),
                metadata.page_properties_row,
                metadata.page_properties_column,
                metadata.page_properties_order,
            )?;

            for (i, fixed) in layout.fixed_placeholders.iter().enumerate() {
                let fixed_prefix = format!("{}.fixed_placeholders[{}]", prefix, i);
                validate_non_empty_string(&format!("{}.type", fixed_prefix), &fixed.type_name)?;
                validate_cell(&fixed_prefix, fixed.row, fixed.column, fixed.order)?;
            }
        }

        Ok(())
    }
}

fn validate_cell(prefix: &str, row: i32, column: i32, order: i32) -> Result<()> {
    validate_min(&format!("{}.row", prefix), row, 1)?;
    validate_min(&format!("{}.column", prefix), column, 1)?;
    validate_min(&format!("{}.order", prefix), order, 0)
}

impl Validate for MappingCatalog {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[async_trait]
impl LayoutMappingProvider for MappingCatalog {
    async fn load_mapping(&self, template_name: &str) -> Result<Option<LayoutMappingModel>> {
        Ok(self.find(template_name).cloned())
    }
}

/// In-memory mappings keyed by page layout name, for mappings produced at runtime
/// (for example generated from an analysis of the page layout itself).
#[derive(Debug, Default)]
pub struct MappingCache {
    entries: RwLock<HashMap<String, LayoutMappingModel>>,
}

impl MappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `mapping` under its name unless a mapping with that name is already cached.
    pub fn insert(&self, mapping: LayoutMappingModel) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AnalyzerError::collaborator("mapping cache", "cache lock poisoned"))?;
        entries
            .entry(mapping.name.to_ascii_lowercase())
            .or_insert(mapping);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LayoutMappingProvider for MappingCache {
    async fn load_mapping(&self, template_name: &str) -> Result<Option<LayoutMappingModel>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AnalyzerError::collaborator("mapping cache", "cache lock poisoned"))?;
        Ok(entries.get(&template_name.to_ascii_lowercase()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PageLayoutTemplate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CATALOG: &str = r#"
[analyzer]
skip_empty_fields = false

[[page_layouts]]
name = "ArticleLeft"
page_layout_template = "TwoColumnsWithHeader"

[[page_layouts.field_mappings]]
name = "PublishingPageContent"
target_type = "SharePointPnP.Modernization.WikiTextPart"
row = 1
column = 2

[[page_layouts.field_mappings]]
name = "PublishingPageImage"
target_type = "SharePointPnP.Modernization.WikiImagePart"
row = 1
column = 1

[[page_layouts.field_mappings.properties]]
name = "ImageUrl"
type = "string"
functions = "ToImageUrl({PublishingPageImage})"

[[page_layouts.zones]]
zone_id = "Header"
row = 1
column = 1
order = 1

[page_layouts.metadata]
show_page_properties = true
page_properties_row = 2

[[page_layouts.metadata.fields]]
name = "ArticleByLine"
target_field_name = "ArticleByLine"
show_in_page_properties = true

[[page_layouts]]
name = "articleleft"
page_layout_template = "OneColumn"
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = MappingCatalog::from_toml_str(CATALOG).unwrap();

        assert!(!catalog.analyzer.skip_empty_fields);
        assert_eq!(catalog.page_layouts.len(), 2);

        let layout = &catalog.page_layouts[0];
        assert_eq!(layout.page_layout_template, PageLayoutTemplate::TwoColumnsWithHeader);
        assert!(layout.field_mappings[0].is_rich_text());
        assert_eq!(
            layout.field_mappings[1].properties[0].functions.as_deref(),
            Some("ToImageUrl({PublishingPageImage})")
        );
        assert_eq!(layout.zones[0].order, 1);
        assert!(layout.metadata.show_page_properties);
        assert_eq!(layout.metadata.page_properties_row, 2);
        assert_eq!(layout.metadata.page_properties_column, 1);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_find_is_case_insensitive_first_match() {
        let catalog = MappingCatalog::from_toml_str(CATALOG).unwrap();
        let found = catalog.find("ARTICLELEFT").unwrap();
        assert_eq!(found.page_layout_template, PageLayoutTemplate::TwoColumnsWithHeader);
        assert!(catalog.find("ArticleRight").is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CATALOG_TEST_LAYOUT", "WelcomeSplash");

        let catalog = MappingCatalog::from_toml_str(
            r#"
[[page_layouts]]
name = "${CATALOG_TEST_LAYOUT}"
"#,
        )
        .unwrap();
        assert_eq!(catalog.page_layouts[0].name, "WelcomeSplash");

        std::env::remove_var("CATALOG_TEST_LAYOUT");
    }

    #[test]
    fn test_validation_rejects_bad_rows() {
        let catalog = MappingCatalog::from_toml_str(
            r#"
[[page_layouts]]
name = "Broken"

[[page_layouts.zones]]
zone_id = "Main"
row = 0
"#,
        )
        .unwrap();

        let err = catalog.validate().unwrap_err();
        assert!(err.to_string().contains("page_layouts[0].zones[0].row"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = MappingCatalog::from_toml_str("[[page_layouts]\nname=").unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_catalog_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(CATALOG.as_bytes()).unwrap();

        let catalog = MappingCatalog::from_file(temp_file.path()).unwrap();
        assert_eq!(catalog.page_layouts[0].name, "ArticleLeft");
    }

    #[tokio::test]
    async fn test_mapping_cache() {
        let cache = MappingCache::new();
        cache
            .insert(LayoutMappingModel {
                name: "CustomLayout".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(cache.len(), 1);
        assert!(cache.load_mapping("customlayout").await.unwrap().is_some());
        assert!(cache.load_mapping("Other").await.unwrap().is_none());
    }
}
