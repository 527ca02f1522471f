//! Extraction of placeholders from rich text (wiki) fields.
//!
//! The field markup is parsed into a document whose first element's last element child is the
//! canvas holding the wiki content. Canvas children are walked in order: plain content is
//! collected into text placeholders, and elements hosting an embedded widget box split the text
//! and produce a [`PlaceholderCandidate`] that is resolved later against the widget manager.

use crate::domain::model::{ExportMode, Placeholder, WidgetInstance};
use crate::domain::ports::PropertyAssembler;
use crate::domain::widget_types;
use crate::core::order::PlaceholderSet;
use crate::core::widget_type::{type_from_export, type_from_properties};
use crate::utils::error::{AnalyzerError, Result};
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use uuid::Uuid;

const WIDGET_BOX_CLASS: &str = "ms-rte-wpbox";
const WIDGET_HOST_PREFIX: &str = "div_";
pub const TEXT_TITLE: &str = "WikiText";

static WIDGET_HOST: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[id^="div_"]"#).expect("widget host selector is valid")
});

/// A widget referenced from rich text, waiting for its instance data.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderCandidate {
    pub id: Uuid,
    /// Server side control id, `g_` followed by the id with dashes replaced.
    pub control_id: String,
    pub row: i32,
    pub column: i32,
    pub order: i32,
    pub export: Option<String>,
}

#[derive(Debug, Default)]
pub struct RichTextExtraction {
    pub placeholders: Vec<Placeholder>,
    pub candidates: Vec<PlaceholderCandidate>,
}

/// Splits the rich text value of `field` into text placeholders and widget candidates.
///
/// Orders run from `start_order` upwards in document order, one per text run and one per
/// embedded widget. An absent or empty value contributes nothing.
pub fn extract_rich_text(
    field: &str,
    value: Option<&str>,
    row: i32,
    column: i32,
    start_order: i32,
) -> Result<RichTextExtraction> {
    let markup = match value {
        Some(markup) if !markup.is_empty() => markup,
        _ => {
            tracing::warn!("Rich text field '{}' has no value, nothing to extract", field);
            return Ok(RichTextExtraction::default());
        }
    };

    let document = Html::parse_document(markup);
    let canvas = find_canvas(field, &document)?;

    let mut walker = CanvasWalker {
        row,
        column,
        order: start_order,
        text: String::new(),
        extraction: RichTextExtraction::default(),
    };

    // Text is cut out of the serialized canvas so entities stay escaped
    let canvas_html = canvas.inner_html();
    let mut cursor = 0;
    for element in canvas
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|element| contains_widget_box(*element))
    {
        let html = element.html();
        if let Some(offset) = canvas_html[cursor..].find(&html) {
            walker.text.push_str(&canvas_html[cursor..cursor + offset]);
            cursor += offset + html.len();
        }
        walker.widget_element(element);
    }
    walker.text.push_str(&canvas_html[cursor..]);
    walker.flush_text();

    let mut extraction = walker.extraction;
    if extraction.placeholders.is_empty() && extraction.candidates.is_empty() {
        // A populated field is always represented, even when its canvas is empty
        extraction
            .placeholders
            .push(text_placeholder("", row, column, start_order));
    }

    tracing::debug!(
        "Rich text field '{}': {} text placeholders, {} embedded widgets",
        field,
        extraction.placeholders.len(),
        extraction.candidates.len()
    );
    Ok(extraction)
}

/// The canvas is the last element child of the document's first element.
///
/// Document parses always synthesize `<html>` with `<head>` and `<body>`, so for them the
/// canvas is `<body>`. The error cases are only reachable for fragment parses.
fn find_canvas<'a>(field: &str, document: &'a Html) -> Result<ElementRef<'a>> {
    let first = document
        .tree
        .root()
        .children()
        .find_map(ElementRef::wrap)
        .ok_or_else(|| AnalyzerError::CanvasNotFound {
            field: field.to_string(),
            reason: "document has no top level element".to_string(),
        })?;

    first
        .children()
        .filter_map(ElementRef::wrap)
        .last()
        .ok_or_else(|| AnalyzerError::CanvasNotFound {
            field: field.to_string(),
            reason: format!("<{}> has no child elements", first.value().name()),
        })
}

fn is_widget_box(element: &ElementRef<'_>) -> bool {
    element
        .value()
        .classes()
        .any(|class| class.eq_ignore_ascii_case(WIDGET_BOX_CLASS))
}

fn contains_widget_box(element: ElementRef<'_>) -> bool {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|descendant| is_widget_box(&descendant))
}

/// Widget boxes below `element` that are not nested in another widget box, in document order.
fn outermost_widget_boxes(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(is_widget_box)
        .filter(|widget_box| {
            !widget_box
                .ancestors()
                .take_while(|node| node.id() != element.id())
                .filter_map(ElementRef::wrap)
                .any(|ancestor| is_widget_box(&ancestor))
        })
        .collect()
}

struct CanvasWalker {
    row: i32,
    column: i32,
    order: i32,
    text: String,
    extraction: RichTextExtraction,
}

impl CanvasWalker {
    fn take_order(&mut self) -> i32 {
        let order = self.order;
        self.order = self.order.saturating_add(1);
        order
    }

    fn flush_text(&mut self) {
        if self.text.trim().is_empty() {
            self.text.clear();
            return;
        }

        let text = std::mem::take(&mut self.text);
        let order = self.take_order();
        self.extraction
            .placeholders
            .push(text_placeholder(&text, self.row, self.column, order));
    }

    /// Content sharing the element with widget boxes is split around each box in turn.
    fn widget_element(&mut self, element: ElementRef<'_>) {
        if is_widget_box(&element) {
            self.flush_text();
            self.widget_box(element);
            return;
        }

        let inner = element.inner_html();
        let mut cursor = 0;
        for widget_box in outermost_widget_boxes(element) {
            let html = widget_box.html();
            if let Some(offset) = inner[cursor..].find(&html) {
                self.text.push_str(&inner[cursor..cursor + offset]);
                cursor += offset + html.len();
            }
            self.flush_text();
            self.widget_box(widget_box);
        }
        self.text.push_str(&inner[cursor..]);
    }

    fn widget_box(&mut self, widget_box: ElementRef<'_>) {
        for host in widget_box.select(&WIDGET_HOST) {
            let Some(raw_id) = host
                .value()
                .id()
                .and_then(|id| id.strip_prefix(WIDGET_HOST_PREFIX))
            else {
                continue;
            };

            match Uuid::parse_str(raw_id) {
                Ok(id) => {
                    let order = self.take_order();
                    self.extraction.candidates.push(PlaceholderCandidate {
                        id,
                        control_id: format!("g_{}", raw_id.replace('-', "_")),
                        row: self.row,
                        column: self.column,
                        order,
                        export: None,
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping embedded widget with malformed id '{}': {}", raw_id, e)
                }
            }
        }
    }
}

pub fn text_placeholder(text: &str, row: i32, column: i32, order: i32) -> Placeholder {
    let cleaned = text.trim().replace("\r\n", "").replace('\n', "");
    Placeholder {
        title: TEXT_TITLE.to_string(),
        type_name: widget_types::WIKI_TEXT.to_string(),
        identity: None,
        server_control_id: Some(TEXT_TITLE.to_string()),
        row,
        column,
        order,
        properties: BTreeMap::from([("Text".to_string(), cleaned)]),
        ..Default::default()
    }
}

/// Ids of the candidates whose instance may be exported.
pub fn exportable_candidates(
    candidates: &[PlaceholderCandidate],
    inventory: &[WidgetInstance],
) -> Vec<Uuid> {
    candidates
        .iter()
        .filter(|candidate| {
            inventory
                .iter()
                .any(|widget| widget.id == candidate.id && widget.export_mode == ExportMode::All)
        })
        .map(|candidate| candidate.id)
        .collect()
}

/// Turns resolved candidates into placeholders at the positions recorded during extraction.
/// Candidates without a matching instance in the inventory are dropped.
pub fn resolve_candidates(
    mut candidates: Vec<PlaceholderCandidate>,
    inventory: &[WidgetInstance],
    exports: &mut HashMap<Uuid, String>,
    assembler: &dyn PropertyAssembler,
    set: &mut PlaceholderSet,
) {
    for candidate in candidates.iter_mut() {
        if candidate.export.is_none() {
            candidate.export = exports.remove(&candidate.id);
        }
    }

    for candidate in candidates {
        let Some(widget) = inventory.iter().find(|widget| widget.id == candidate.id) else {
            tracing::warn!(
                "Embedded widget {} ({}) was not returned by the widget manager, skipping",
                candidate.id,
                candidate.control_id
            );
            continue;
        };

        if set.contains_identity(&widget.id) {
            continue;
        }

        let widget_type = match (&candidate.export, widget.export_mode) {
            (Some(export), ExportMode::All) => type_from_export(export),
            _ => type_from_properties(&widget.properties),
        };
        let properties =
            assembler.assemble(&widget.properties, &widget_type, candidate.export.as_deref());

        set.push(Placeholder {
            title: widget.title.clone(),
            type_name: widget_type,
            identity: Some(widget.id),
            server_control_id: Some(candidate.control_id),
            row: candidate.row,
            column: candidate.column,
            order: candidate.order,
            zone_id: Some(widget.zone_id.clone()),
            zone_index: Some(widget.zone_index),
            is_closed: widget.is_closed,
            hidden: widget.hidden,
            properties,
        });
    }
}
