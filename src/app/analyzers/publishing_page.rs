use crate::config::AnalyzerConfig;
use crate::core::fields::FieldPlaceholderMapper;
use crate::core::fixed::build_fixed_placeholders;
use crate::core::metadata::build_page_properties;
use crate::core::order::PlaceholderSet;
use crate::core::properties::DefaultPropertyAssembler;
use crate::core::rich_text::{exportable_candidates, extract_rich_text, resolve_candidates};
use crate::core::zones::map_zoned_widgets;
use crate::domain::model::{LayoutMappingModel, Placeholder, WidgetInstance};
use crate::domain::ports::{
    FieldResolver, FunctionEvaluator, LayoutMappingProvider, PageAnalyzer, PageSource,
    PropertyAssembler, ResourceResolver, WidgetManager,
};
use crate::utils::error::{AnalyzerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Analyzes a publishing page: a page created from a page layout whose fields and widget
/// zones are mapped onto placeholders by a [`LayoutMappingModel`].
pub struct PublishingPageAnalyzer {
    page: Arc<dyn PageSource>,
    widgets: Arc<dyn WidgetManager>,
    mappings: Arc<dyn LayoutMappingProvider>,
    mapping_cache: Option<Arc<dyn LayoutMappingProvider>>,
    functions: Option<Arc<dyn FunctionEvaluator>>,
    fields: Option<Arc<dyn FieldResolver>>,
    resources: Option<Arc<dyn ResourceResolver>>,
    assembler: Option<Arc<dyn PropertyAssembler>>,
    config: AnalyzerConfig,
}

impl PublishingPageAnalyzer {
    pub fn new(
        page: Arc<dyn PageSource>,
        widgets: Arc<dyn WidgetManager>,
        mappings: Arc<dyn LayoutMappingProvider>,
    ) -> Self {
        Self {
            page,
            widgets,
            mappings,
            mapping_cache: None,
            functions: None,
            fields: None,
            resources: None,
            assembler: None,
            config: AnalyzerConfig::default(),
        }
    }

    /// Provider consulted when `mappings` has no entry for the page layout.
    pub fn with_mapping_cache(mut self, cache: Arc<dyn LayoutMappingProvider>) -> Self {
        self.mapping_cache = Some(cache);
        self
    }

    pub fn with_function_evaluator(mut self, functions: Arc<dyn FunctionEvaluator>) -> Self {
        self.functions = Some(functions);
        self
    }

    pub fn with_field_resolver(mut self, fields: Arc<dyn FieldResolver>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_resource_resolver(mut self, resources: Arc<dyn ResourceResolver>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn with_property_assembler(mut self, assembler: Arc<dyn PropertyAssembler>) -> Self {
        self.assembler = Some(assembler);
        self
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// Name of the page layout the page uses: the file name of its layout, without extension.
    pub fn page_layout_name(&self) -> String {
        page_layout_name(&self.page.page_layout_file())
    }

    fn assembler(&self) -> Arc<dyn PropertyAssembler> {
        self.assembler.clone().unwrap_or_else(|| {
            Arc::new(DefaultPropertyAssembler::new(
                self.config.property_allow_lists.clone(),
            ))
        })
    }

    /// Text placeholders go straight into `set`; embedded widgets of all rich text fields are
    /// resolved together afterwards. Returns the widget inventory when it had to be loaded.
    async fn extract_rich_text_fields(
        &self,
        mapping: &LayoutMappingModel,
        assembler: &dyn PropertyAssembler,
        set: &mut PlaceholderSet,
    ) -> Result<Option<Vec<WidgetInstance>>> {
        let mut candidates = Vec::new();

        for field in mapping.field_mappings.iter().filter(|m| m.is_rich_text()) {
            let value = self.page.field_value(&field.name);
            let start_order = set.next_order(field.row, field.column, field.order);
            let extraction = extract_rich_text(
                &field.name,
                value.as_deref(),
                field.row,
                field.column,
                start_order,
            )?;

            for placeholder in extraction.placeholders {
                set.push(placeholder);
            }
            candidates.extend(extraction.candidates);
        }

        if candidates.is_empty() {
            return Ok(None);
        }

        tracing::debug!("Resolving {} widgets embedded in rich text", candidates.len());
        let inventory = self.widgets.list_widgets().await?;
        let exportable = exportable_candidates(&candidates, &inventory);
        let mut exports = if exportable.is_empty() {
            HashMap::new()
        } else {
            self.widgets.export_widgets(&exportable).await?
        };
        resolve_candidates(candidates, &inventory, &mut exports, assembler, set);

        Ok(Some(inventory))
    }
}

#[async_trait]
impl PageAnalyzer for PublishingPageAnalyzer {
    async fn load_mapping(
        &self,
        provided: Option<LayoutMappingModel>,
    ) -> Result<LayoutMappingModel> {
        if let Some(mapping) = provided {
            return Ok(mapping);
        }

        let layout_name = self.page_layout_name();
        if let Some(mapping) = self.mappings.load_mapping(&layout_name).await? {
            return Ok(mapping);
        }

        if let Some(cache) = &self.mapping_cache {
            tracing::debug!("No static mapping for '{}', trying the mapping cache", layout_name);
            if let Some(mapping) = cache.load_mapping(&layout_name).await? {
                return Ok(mapping);
            }
        }

        tracing::error!("No page layout mapping found for page layout '{}'", layout_name);
        Err(AnalyzerError::MappingNotFound {
            template: layout_name,
        })
    }

    async fn extract_placeholders(&self, mapping: &LayoutMappingModel) -> Result<Vec<Placeholder>> {
        let assembler = self.assembler();
        let mut set = PlaceholderSet::new();

        let inventory = self
            .extract_rich_text_fields(mapping, assembler.as_ref(), &mut set)
            .await?;

        FieldPlaceholderMapper::new(
            self.page.as_ref(),
            self.functions.as_deref(),
            self.config.skip_empty_fields,
        )
        .map_fields(&mapping.field_mappings, &mut set)
        .await?;

        build_page_properties(&mapping.metadata, self.fields.as_deref(), &mut set).await?;

        let inventory = match inventory {
            Some(inventory) => inventory,
            None => self.widgets.list_widgets().await?,
        };
        map_zoned_widgets(
            &inventory,
            &mapping.zones,
            self.widgets.as_ref(),
            assembler.as_ref(),
            &mut set,
        )
        .await?;

        build_fixed_placeholders(&mapping.fixed_placeholders, self.resources.as_deref(), &mut set)
            .await?;

        Ok(set.into_vec())
    }
}

/// Page layout fields may hold `"<url>, <description>"`; only the url's file stem is used.
fn page_layout_name(layout_file: &str) -> String {
    let url = layout_file.split(", ").next().unwrap_or_default().trim();
    Path::new(url)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(url)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_layout_name() {
        assert_eq!(
            page_layout_name("/sites/news/_catalogs/masterpage/ArticleLeft.aspx"),
            "ArticleLeft"
        );
        assert_eq!(
            page_layout_name("/_catalogs/masterpage/WelcomeLinks.aspx, Welcome page with links"),
            "WelcomeLinks"
        );
        assert_eq!(page_layout_name("BlankWebPartPage"), "BlankWebPartPage");
    }
}
