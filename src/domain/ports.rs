use crate::core::layout::classify;
use crate::domain::model::{
    LayoutMappingModel, PageAnalysis, Placeholder, PropertyType, WidgetInstance,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Read access to the already-loaded publishing page.
pub trait PageSource: Send + Sync {
    /// Raw value of a page field by internal name.
    fn field_value(&self, name: &str) -> Option<String>;

    /// Server relative url of the page layout file the page was created from.
    fn page_layout_file(&self) -> String;
}

/// Lookup of page layout mappings by template name.
#[async_trait]
pub trait LayoutMappingProvider: Send + Sync {
    async fn load_mapping(&self, template_name: &str) -> Result<Option<LayoutMappingModel>>;
}

/// Remote widget manager of the page.
#[async_trait]
pub trait WidgetManager: Send + Sync {
    /// All widget instances placed in the page's widget zones, in one bulk query.
    async fn list_widgets(&self) -> Result<Vec<WidgetInstance>>;

    /// Serialized export blobs for the given instances, in one batched call.
    async fn export_widgets(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>>;
}

/// Evaluates a computed-property expression from a field mapping.
#[async_trait]
pub trait FunctionEvaluator: Send + Sync {
    /// Returns the `(property name, property value)` pair; an empty name means "no property".
    async fn evaluate(
        &self,
        expression: &str,
        property_name: &str,
        property_type: PropertyType,
    ) -> Result<(String, String)>;
}

/// Resolves a field name on the target site to a stable field identifier.
#[async_trait]
pub trait FieldResolver: Send + Sync {
    async fn resolve_field(&self, name: &str, create_if_missing: bool) -> Result<Option<String>>;
}

/// Resolves `$Resources:` references to localized strings.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    async fn resolve(&self, reference: &str) -> Result<String>;
}

/// Builds the property dictionary of a zoned or embedded widget.
pub trait PropertyAssembler: Send + Sync {
    fn assemble(
        &self,
        properties: &BTreeMap<String, String>,
        widget_type: &str,
        export: Option<&str>,
    ) -> BTreeMap<String, String>;
}

/// A page variant the analyzer knows how to turn into placeholders.
#[async_trait]
pub trait PageAnalyzer: Send + Sync {
    /// Resolves the layout mapping for the page; `provided` short-circuits the lookup.
    async fn load_mapping(&self, provided: Option<LayoutMappingModel>)
        -> Result<LayoutMappingModel>;

    async fn extract_placeholders(&self, mapping: &LayoutMappingModel) -> Result<Vec<Placeholder>>;

    async fn analyze(&self, provided: Option<LayoutMappingModel>) -> Result<PageAnalysis> {
        let mapping = self.load_mapping(provided).await?;
        tracing::debug!("Using page layout mapping '{}'", mapping.name);

        let layout = classify(&mapping.page_layout_template);
        let placeholders = self.extract_placeholders(&mapping).await?;
        tracing::info!(
            "Page analyzed as {:?} with {} placeholders",
            layout,
            placeholders.len()
        );

        Ok(PageAnalysis {
            layout,
            placeholders,
        })
    }
}
