use crate::core::order::PlaceholderSet;
use crate::core::properties::{insert_first, FromPropertyValue};
use crate::domain::model::{FixedPlaceholderDefinition, Placeholder};
use crate::domain::ports::ResourceResolver;
use crate::utils::error::Result;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const RESOURCE_PREFIX: &str = "$Resources:";
const TITLE_PROPERTY: &str = "Title";
const CLOSED_PROPERTY: &str = "__designer:IsClosed";

/// Adds the statically configured widgets of the layout mapping.
pub async fn build_fixed_placeholders(
    definitions: &[FixedPlaceholderDefinition],
    resources: Option<&dyn ResourceResolver>,
    set: &mut PlaceholderSet,
) -> Result<usize> {
    for definition in definitions {
        let properties = resolve_properties(definition, resources).await?;
        let order = set.next_order(definition.row, definition.column, definition.order);

        set.push(Placeholder {
            title: typed_property(&properties, TITLE_PROPERTY, String::new()),
            type_name: definition.type_name.clone(),
            identity: Some(Uuid::new_v4()),
            server_control_id: None,
            row: definition.row,
            column: definition.column,
            order,
            zone_id: Some(String::new()),
            zone_index: Some(0),
            is_closed: typed_property(&properties, CLOSED_PROPERTY, false),
            hidden: false,
            properties,
        });
    }

    Ok(definitions.len())
}

/// Copies the definition's properties, resolving resource references.
async fn resolve_properties(
    definition: &FixedPlaceholderDefinition,
    resources: Option<&dyn ResourceResolver>,
) -> Result<BTreeMap<String, String>> {
    let mut properties = BTreeMap::new();

    for property in &definition.properties {
        let value = if property.value.starts_with(RESOURCE_PREFIX) {
            match resources {
                Some(resources) => resources.resolve(&property.value).await?,
                None => {
                    tracing::warn!(
                        "No resource resolver configured, keeping '{}' for property '{}'",
                        property.value,
                        property.name
                    );
                    property.value.clone()
                }
            }
        } else {
            property.value.clone()
        };

        if !insert_first(&mut properties, &property.name, value) {
            tracing::warn!(
                "Duplicate property '{}' on fixed widget {}, keeping the first value",
                property.name,
                definition.type_name
            );
        }
    }

    Ok(properties)
}

/// Reads a property ignoring the key's case; falls back to `default` when the property is
/// missing or does not convert.
fn typed_property<T: FromPropertyValue>(
    properties: &BTreeMap<String, String>,
    name: &str,
    default: T,
) -> T {
    let Some((key, raw)) = properties
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
    else {
        return default;
    };

    match T::from_property_value(raw) {
        Some(value) => value,
        None => {
            tracing::warn!("Property '{}' value '{}' could not be converted, using default", key, raw);
            default
        }
    }
}
