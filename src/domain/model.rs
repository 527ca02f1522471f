use crate::domain::widget_types;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// A normalized unit of page content: a typed widget placed in a `(row, column, order)` slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub title: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Remote instance identity; `None` when the placeholder is derived from a page field.
    pub identity: Option<Uuid>,
    pub server_control_id: Option<String>,
    pub row: i32,
    pub column: i32,
    pub order: i32,
    pub zone_id: Option<String>,
    pub zone_index: Option<u32>,
    pub is_closed: bool,
    pub hidden: bool,
    pub properties: BTreeMap<String, String>,
}

/// Target multi-column arrangement a legacy page layout is converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalLayout {
    OneColumn,
    TwoColumns,
    TwoColumnsWithSidebar,
    TwoColumnsWithHeader,
    TwoColumnsWithHeaderAndFooter,
    ThreeColumns,
    ThreeColumnsWithHeader,
    ThreeColumnsWithHeaderAndFooter,
    PublishingAutoDetect,
}

/// Layout template declared by a page layout mapping.
///
/// Parsed case-insensitively from the mapping file; values that are not recognized are kept
/// as [`PageLayoutTemplate::Unknown`] instead of failing the mapping load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PageLayoutTemplate {
    OneColumn,
    TwoColumns,
    TwoColumnsWithSidebarLeft,
    TwoColumnsWithSidebarRight,
    TwoColumnsWithHeader,
    TwoColumnsWithHeaderAndFooter,
    ThreeColumns,
    ThreeColumnsWithHeader,
    ThreeColumnsWithHeaderAndFooter,
    AutoDetect,
    Unknown(String),
}

impl PageLayoutTemplate {
    const KNOWN: [(&'static str, PageLayoutTemplate); 10] = [
        ("OneColumn", PageLayoutTemplate::OneColumn),
        ("TwoColumns", PageLayoutTemplate::TwoColumns),
        ("TwoColumnsWithSidebarLeft", PageLayoutTemplate::TwoColumnsWithSidebarLeft),
        ("TwoColumnsWithSidebarRight", PageLayoutTemplate::TwoColumnsWithSidebarRight),
        ("TwoColumnsWithHeader", PageLayoutTemplate::TwoColumnsWithHeader),
        ("TwoColumnsWithHeaderAndFooter", PageLayoutTemplate::TwoColumnsWithHeaderAndFooter),
        ("ThreeColumns", PageLayoutTemplate::ThreeColumns),
        ("ThreeColumnsWithHeader", PageLayoutTemplate::ThreeColumnsWithHeader),
        ("ThreeColumnsWithHeaderAndFooter", PageLayoutTemplate::ThreeColumnsWithHeaderAndFooter),
        ("AutoDetect", PageLayoutTemplate::AutoDetect),
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Unknown(raw) => raw,
            known => Self::KNOWN
                .iter()
                .find(|(_, template)| template == known)
                .map(|(name, _)| *name)
                .unwrap_or_default(),
        }
    }
}

impl Default for PageLayoutTemplate {
    fn default() -> Self {
        Self::OneColumn
    }
}

impl From<&str> for PageLayoutTemplate {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        Self::KNOWN
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
            .map(|(_, template)| template.clone())
            .unwrap_or_else(|| Self::Unknown(trimmed.to_string()))
    }
}

impl From<String> for PageLayoutTemplate {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<PageLayoutTemplate> for String {
    fn from(value: PageLayoutTemplate) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PageLayoutTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type handed to the function evaluator for a computed property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    String,
    Bool,
    Guid,
    Integer,
    DateTime,
}

/// Mapping of one layout template onto placeholders. Loaded once per template name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutMappingModel {
    pub name: String,
    #[serde(default)]
    pub page_layout_template: PageLayoutTemplate,
    #[serde(default)]
    pub field_mappings: Vec<FieldMapping>,
    #[serde(default)]
    pub zones: Vec<ZoneMapping>,
    #[serde(default)]
    pub metadata: MetadataMapping,
    #[serde(default)]
    pub fixed_placeholders: Vec<FixedPlaceholderDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Internal name of the page field.
    pub name: String,
    pub target_type: String,
    #[serde(default = "default_position")]
    pub row: i32,
    #[serde(default = "default_position")]
    pub column: i32,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub properties: Vec<FieldPropertyMapping>,
}

impl FieldMapping {
    /// Rich text fields are split into text and embedded widget placeholders instead of
    /// becoming a single placeholder.
    pub fn is_rich_text(&self) -> bool {
        self.target_type.eq_ignore_ascii_case(widget_types::WIKI_TEXT)
            || self.target_type.eq_ignore_ascii_case("WikiText")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPropertyMapping {
    pub name: String,
    #[serde(default, rename = "type")]
    pub property_type: PropertyType,
    #[serde(default)]
    pub functions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMapping {
    pub zone_id: String,
    #[serde(default = "default_position")]
    pub row: i32,
    #[serde(default = "default_position")]
    pub column: i32,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataMapping {
    #[serde(default)]
    pub show_page_properties: bool,
    #[serde(default = "default_position")]
    pub page_properties_row: i32,
    #[serde(default = "default_position")]
    pub page_properties_column: i32,
    #[serde(default)]
    pub page_properties_order: i32,
    #[serde(default)]
    pub fields: Vec<MetadataField>,
}

impl Default for MetadataMapping {
    fn default() -> Self {
        Self {
            show_page_properties: false,
            page_properties_row: 1,
            page_properties_column: 1,
            page_properties_order: 0,
            fields: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataField {
    pub name: String,
    #[serde(default)]
    pub target_field_name: Option<String>,
    #[serde(default)]
    pub show_in_page_properties: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedPlaceholderDefinition {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_position")]
    pub row: i32,
    #[serde(default = "default_position")]
    pub column: i32,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub properties: Vec<FixedProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedProperty {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

fn default_position() -> i32 {
    1
}

/// Whether the remote store lets a widget instance be exported as a serialized blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    #[default]
    None,
    All,
    NonSensitiveData,
}

/// A widget instance living in one of the page's widget zones, as reported by the widget manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetInstance {
    pub id: Uuid,
    #[serde(default)]
    pub zone_id: String,
    #[serde(default)]
    pub export_mode: ExportMode,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub zone_index: u32,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Result of analyzing one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub layout: CanonicalLayout,
    pub placeholders: Vec<Placeholder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parsing_is_case_insensitive() {
        assert_eq!(
            PageLayoutTemplate::from("twocolumnswithheader"),
            PageLayoutTemplate::TwoColumnsWithHeader
        );
        assert_eq!(
            PageLayoutTemplate::from(" AutoDetect "),
            PageLayoutTemplate::AutoDetect
        );
        assert_eq!(
            PageLayoutTemplate::from("FourColumns"),
            PageLayoutTemplate::Unknown("FourColumns".to_string())
        );
    }

    #[test]
    fn test_template_round_trips_through_string() {
        let as_string: String = PageLayoutTemplate::ThreeColumnsWithHeaderAndFooter.into();
        assert_eq!(as_string, "ThreeColumnsWithHeaderAndFooter");
        assert_eq!(PageLayoutTemplate::Unknown("Custom".into()).to_string(), "Custom");
    }

    #[test]
    fn test_mapping_model_defaults() {
        let model: LayoutMappingModel = serde_json::from_value(serde_json::json!({
            "name": "ArticleLeft",
            "field_mappings": [{ "name": "PublishingPageContent", "target_type": "WikiText" }]
        }))
        .unwrap();

        assert_eq!(model.page_layout_template, PageLayoutTemplate::OneColumn);
        assert_eq!(model.field_mappings[0].row, 1);
        assert_eq!(model.field_mappings[0].column, 1);
        assert_eq!(model.field_mappings[0].order, 0);
        assert!(!model.metadata.show_page_properties);
        assert_eq!(model.metadata.page_properties_row, 1);
    }
}
