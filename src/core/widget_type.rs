use crate::domain::widget_types;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

/// Property names that together identify a widget type when it cannot be exported.
/// Checked in order; the first signature fully present in the property bag wins.
const PROPERTY_SIGNATURES: &[(&[&str], &str)] = &[
    (
        &["ListUrl", "ListId", "Xsl", "JSLink", "ShowTimelineIfAvailable"],
        widget_types::XSLT_LIST_VIEW,
    ),
    (
        &["ListViewXml", "ListName", "ListId", "ViewContentTypeId", "PageType"],
        widget_types::LIST_VIEW,
    ),
    (
        &[
            "AutoPlay",
            "MediaSource",
            "Loop",
            "IsPreviewImageSourceOverridenForVideoSet",
            "PreviewImageSource",
        ],
        widget_types::MEDIA,
    ),
    (
        &["LibraryGuid", "Layout", "Speed", "ShowToolbar", "ViewGuid"],
        widget_types::PICTURE_LIBRARY_SLIDESHOW,
    ),
    (
        &["ConnectionPointEnabled", "ChartXml", "DataBindingsString", "DesignerChartTheme"],
        widget_types::CHART,
    ),
    (
        &["NumberLimit", "DisplayType", "MembershipGroupId", "Toolbar"],
        widget_types::SITE_MEMBERS,
    ),
    (
        &["MinRuntimeVersion", "WindowlessMode", "CustomInitParameters", "Url", "ApplicationXml"],
        widget_types::SILVERLIGHT,
    ),
    (&["FeatureId", "ProductWebId", "ProductId"], widget_types::CLIENT),
];

/// Reads the widget type out of an exported widget definition.
///
/// Handles both export schemas: v3 (`<type name="..."/>`) and v2 (`<TypeName>` plus
/// `<Assembly>`, joined as `"TypeName, Assembly"`).
pub fn type_from_export(export: &str) -> String {
    match read_export_type(export) {
        Ok(Some(widget_type)) => widget_type,
        Ok(None) => {
            tracing::warn!("Could not determine widget type from export ({} bytes)", export.len());
            widget_types::UNIDENTIFIED.to_string()
        }
        Err(e) => {
            tracing::warn!("Widget export is not readable XML: {}", e);
            widget_types::UNIDENTIFIED.to_string()
        }
    }
}

#[derive(Clone, Copy)]
enum V2Element {
    TypeName,
    Assembly,
}

fn read_export_type(export: &str) -> Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(export);
    let mut current: Option<V2Element> = None;
    let mut type_name = String::new();
    let mut assembly = String::new();

    loop {
        match reader.read_event()? {
            Event::Empty(e) => {
                if let Some(widget_type) = v3_type(&e)? {
                    return Ok(Some(widget_type));
                }
            }
            Event::Start(e) => {
                if let Some(widget_type) = v3_type(&e)? {
                    return Ok(Some(widget_type));
                }
                let name = e.local_name();
                current = if name.as_ref().eq_ignore_ascii_case(b"TypeName") {
                    Some(V2Element::TypeName)
                } else if name.as_ref().eq_ignore_ascii_case(b"Assembly") {
                    Some(V2Element::Assembly)
                } else {
                    None
                };
            }
            Event::Text(e) => match current {
                Some(V2Element::TypeName) => type_name.push_str(&e.unescape()?),
                Some(V2Element::Assembly) => assembly.push_str(&e.unescape()?),
                None => {}
            },
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
    }

    let type_name = type_name.trim();
    let assembly = assembly.trim();
    Ok(match (type_name.is_empty(), assembly.is_empty()) {
        (true, _) => None,
        (false, true) => Some(type_name.to_string()),
        (false, false) => Some(format!("{}, {}", type_name, assembly)),
    })
}

/// The `name` attribute of a v3 `<type>` element.
fn v3_type(element: &BytesStart<'_>) -> Result<Option<String>, quick_xml::Error> {
    if !element.local_name().as_ref().eq_ignore_ascii_case(b"type") {
        return Ok(None);
    }
    match element.try_get_attribute("name")? {
        Some(attribute) => Ok(Some(attribute.unescape_value()?.trim().to_string())),
        None => Ok(None),
    }
}

/// Guesses the widget type from the shape of its property bag.
pub fn type_from_properties(properties: &BTreeMap<String, String>) -> String {
    PROPERTY_SIGNATURES
        .iter()
        .find(|(names, _)| names.iter().all(|name| properties.contains_key(*name)))
        .map(|(_, widget_type)| widget_type.to_string())
        .unwrap_or_else(|| widget_types::NON_EXPORTABLE_UNIDENTIFIED.to_string())
}
