use crate::core::order::PlaceholderSet;
use crate::domain::model::{MetadataMapping, Placeholder};
use crate::domain::ports::FieldResolver;
use crate::domain::widget_types;
use crate::utils::error::Result;
use std::collections::BTreeMap;

pub const SELECTED_FIELDS: &str = "SelectedFields";

/// Adds the page properties placeholder listing the metadata fields shown on the page.
///
/// Returns whether a placeholder was added. Nothing is added when the mapping does not show
/// page properties or none of the flagged fields resolves on the target site.
pub async fn build_page_properties(
    metadata: &MetadataMapping,
    resolver: Option<&dyn FieldResolver>,
    set: &mut PlaceholderSet,
) -> Result<bool> {
    if !metadata.show_page_properties {
        return Ok(false);
    }

    let mut target_fields: Vec<&str> = Vec::new();
    for name in metadata
        .fields
        .iter()
        .filter(|field| field.show_in_page_properties)
        .filter_map(|field| field.target_field_name.as_deref())
        .filter(|name| !name.is_empty())
    {
        if !target_fields.contains(&name) {
            target_fields.push(name);
        }
    }

    if target_fields.is_empty() {
        return Ok(false);
    }

    let Some(resolver) = resolver else {
        tracing::warn!(
            "No field resolver configured, page properties for {} fields not added",
            target_fields.len()
        );
        return Ok(false);
    };

    let mut field_ids: Vec<String> = Vec::new();
    for name in target_fields {
        match resolver.resolve_field(name, true).await? {
            Some(id) if !id.is_empty() => {
                if !field_ids.contains(&id) {
                    field_ids.push(id);
                }
            }
            _ => tracing::warn!("Field '{}' could not be resolved on the target site", name),
        }
    }

    if field_ids.is_empty() {
        tracing::warn!("None of the page property fields resolved, page properties not added");
        return Ok(false);
    }

    let selected = field_ids
        .iter()
        .map(|id| format!("\"{}\"", id))
        .collect::<Vec<_>>()
        .join(",");

    let row = metadata.page_properties_row;
    let column = metadata.page_properties_column;
    let order = set.next_order(row, column, metadata.page_properties_order);

    set.push(Placeholder {
        type_name: widget_types::PAGE_PROPERTIES.to_string(),
        identity: None,
        row,
        column,
        order,
        properties: BTreeMap::from([(SELECTED_FIELDS.to_string(), selected)]),
        ..Default::default()
    });

    Ok(true)
}
