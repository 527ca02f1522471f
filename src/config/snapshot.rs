//! Offline capture of a publishing page.
//!
//! A snapshot records what the remote collaborators would return for one page: field values,
//! the widget inventory and export blobs, evaluated functions, target field ids and resource
//! strings. It implements every collaborator port so a captured page can be analyzed without
//! access to the content store.

use crate::domain::model::{PropertyType, WidgetInstance};
use crate::domain::ports::{
    FieldResolver, FunctionEvaluator, PageSource, ResourceResolver, WidgetManager,
};
use crate::utils::error::{AnalyzerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub page_layout_file: String,
    #[serde(default)]
    pub fields: HashMap<String, String>,
    #[serde(default)]
    pub widgets: Vec<WidgetInstance>,
    /// Export blobs keyed by widget id.
    #[serde(default)]
    pub exports: HashMap<String, String>,
    /// Evaluated value per function expression.
    #[serde(default)]
    pub functions: HashMap<String, String>,
    /// Target site field id per field name.
    #[serde(default)]
    pub field_ids: HashMap<String, String>,
    #[serde(default)]
    pub resources: HashMap<String, String>,
}

impl PageSnapshot {
    /// Loads a snapshot from a `.json` file, or from TOML for any other extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    fn lookup<'a>(map: &'a HashMap<String, String>, key: &str) -> Option<&'a String> {
        map.get(key).or_else(|| {
            map.iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
                .map(|(_, value)| value)
        })
    }
}

impl PageSource for PageSnapshot {
    fn field_value(&self, name: &str) -> Option<String> {
        Self::lookup(&self.fields, name).cloned()
    }

    fn page_layout_file(&self) -> String {
        self.page_layout_file.clone()
    }
}

#[async_trait]
impl WidgetManager for PageSnapshot {
    async fn list_widgets(&self) -> Result<Vec<WidgetInstance>> {
        Ok(self.widgets.clone())
    }

    async fn export_widgets(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
        let mut exports = HashMap::new();
        for (key, blob) in &self.exports {
            let id = Uuid::parse_str(key).map_err(|e| AnalyzerError::InvalidConfigValueError {
                field: "exports".to_string(),
                value: key.clone(),
                reason: e.to_string(),
            })?;
            if ids.contains(&id) {
                exports.insert(id, blob.clone());
            }
        }
        Ok(exports)
    }
}

#[async_trait]
impl FunctionEvaluator for PageSnapshot {
    async fn evaluate(
        &self,
        expression: &str,
        property_name: &str,
        property_type: PropertyType,
    ) -> Result<(String, String)> {
        match Self::lookup(&self.functions, expression) {
            Some(value) => Ok((property_name.to_string(), value.clone())),
            None => {
                tracing::warn!(
                    "No captured result for function '{}' ({:?}), property '{}' left out",
                    expression,
                    property_type,
                    property_name
                );
                Ok((String::new(), String::new()))
            }
        }
    }
}

#[async_trait]
impl FieldResolver for PageSnapshot {
    async fn resolve_field(&self, name: &str, create_if_missing: bool) -> Result<Option<String>> {
        let id = Self::lookup(&self.field_ids, name).cloned();
        if id.is_none() && create_if_missing {
            tracing::debug!("Field '{}' not captured, snapshots cannot create fields", name);
        }
        Ok(id)
    }
}

#[async_trait]
impl ResourceResolver for PageSnapshot {
    async fn resolve(&self, reference: &str) -> Result<String> {
        Ok(Self::lookup(&self.resources, reference)
            .cloned()
            .unwrap_or_else(|| reference.to_string()))
    }
}
