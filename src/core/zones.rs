use crate::core::order::PlaceholderSet;
use crate::core::widget_type::{type_from_export, type_from_properties};
use crate::domain::model::{ExportMode, Placeholder, WidgetInstance, ZoneMapping};
use crate::domain::ports::{PropertyAssembler, WidgetManager};
use crate::utils::error::Result;
use uuid::Uuid;

/// Zone position used when a zone has no mapping entry.
const DEFAULT_ZONE_POSITION: (i32, i32, i32) = (1, 1, 0);

/// Adds the widgets living in widget zones that were not already picked up from rich text.
///
/// Exportable widgets are exported in one batched call. Widgets are placed in ascending zone
/// index, at the cell their zone maps to, with the zone index added to the allocated order.
pub async fn map_zoned_widgets(
    inventory: &[WidgetInstance],
    zones: &[ZoneMapping],
    manager: &dyn WidgetManager,
    assembler: &dyn PropertyAssembler,
    set: &mut PlaceholderSet,
) -> Result<usize> {
    let mut remaining: Vec<&WidgetInstance> = inventory
        .iter()
        .filter(|widget| !set.contains_identity(&widget.id))
        .collect();

    if remaining.is_empty() {
        tracing::debug!("No zoned widgets left to map");
        return Ok(0);
    }

    let exportable: Vec<Uuid> = remaining
        .iter()
        .filter(|widget| widget.export_mode == ExportMode::All)
        .map(|widget| widget.id)
        .collect();
    let mut exports = if exportable.is_empty() {
        Default::default()
    } else {
        tracing::debug!("Exporting {} zoned widgets", exportable.len());
        manager.export_widgets(&exportable).await?
    };

    remaining.sort_by_key(|widget| widget.zone_index);

    let mut added = 0;
    for widget in remaining {
        if set.contains_identity(&widget.id) {
            continue;
        }

        let export = if widget.export_mode == ExportMode::All {
            let export = exports.remove(&widget.id);
            if export.is_none() {
                tracing::warn!("Export of widget {} returned nothing", widget.id);
            }
            export
        } else {
            None
        };

        let widget_type = match &export {
            Some(export) => type_from_export(export),
            None => type_from_properties(&widget.properties),
        };

        let (row, column, base_order) = zone_position(zones, &widget.zone_id);
        let order = set
            .next_order(row, column, base_order)
            .saturating_add(zone_offset(widget));
        let properties = assembler.assemble(&widget.properties, &widget_type, export.as_deref());

        set.push(Placeholder {
            title: widget.title.clone(),
            type_name: widget_type,
            identity: Some(widget.id),
            server_control_id: Some(widget.id.to_string()),
            row,
            column,
            order,
            zone_id: Some(widget.zone_id.clone()),
            zone_index: Some(widget.zone_index),
            is_closed: widget.is_closed,
            hidden: widget.hidden,
            properties,
        });
        added += 1;
    }

    Ok(added)
}

fn zone_offset(widget: &WidgetInstance) -> i32 {
    i32::try_from(widget.zone_index).unwrap_or_else(|_| {
        tracing::warn!(
            "Zone index {} of widget {} is out of range, placing it last",
            widget.zone_index,
            widget.id
        );
        i32::MAX
    })
}

/// `(row, column, order)` for a widget zone, matched ignoring case.
pub fn zone_position(zones: &[ZoneMapping], zone_id: &str) -> (i32, i32, i32) {
    match zones
        .iter()
        .find(|zone| zone.zone_id.eq_ignore_ascii_case(zone_id))
    {
        Some(zone) => (zone.row, zone.column, zone.order),
        None => {
            tracing::warn!("Widget zone '{}' is not mapped, placing its widgets in row 1 column 1", zone_id);
            DEFAULT_ZONE_POSITION
        }
    }
}
