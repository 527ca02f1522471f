use crate::domain::ports::PropertyAssembler;
use std::collections::{BTreeMap, HashMap};

/// Inserts `key` unless a key equal to it ignoring ASCII case is already present.
/// Returns whether the value was inserted.
pub fn insert_first(properties: &mut BTreeMap<String, String>, key: &str, value: String) -> bool {
    if properties.keys().any(|existing| existing.eq_ignore_ascii_case(key)) {
        return false;
    }
    properties.insert(key.to_string(), value);
    true
}

/// Typed reading of a textual property value.
pub trait FromPropertyValue: Sized {
    fn from_property_value(raw: &str) -> Option<Self>;
}

impl FromPropertyValue for String {
    fn from_property_value(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FromPropertyValue for bool {
    fn from_property_value(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("true") {
            Some(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}

/// Assembles widget properties by copying the raw property bag.
///
/// When an allow-list is configured for the widget type only the listed properties are kept
/// (matched ignoring case). The export blob, when present, is kept under `WebPartXml`.
#[derive(Debug, Clone, Default)]
pub struct DefaultPropertyAssembler {
    allow_lists: HashMap<String, Vec<String>>,
}

impl DefaultPropertyAssembler {
    pub fn new(allow_lists: HashMap<String, Vec<String>>) -> Self {
        Self { allow_lists }
    }
}

impl PropertyAssembler for DefaultPropertyAssembler {
    fn assemble(
        &self,
        properties: &BTreeMap<String, String>,
        widget_type: &str,
        export: Option<&str>,
    ) -> BTreeMap<String, String> {
        let allowed = self.allow_lists.get(widget_type);

        let mut assembled = BTreeMap::new();
        for (name, value) in properties {
            let keep = allowed
                .map(|names| names.iter().any(|allowed| allowed.eq_ignore_ascii_case(name)))
                .unwrap_or(true);
            if keep {
                insert_first(&mut assembled, name, value.clone());
            }
        }

        if let Some(export) = export.filter(|export| !export.is_empty()) {
            insert_first(&mut assembled, "WebPartXml", export.to_string());
        }

        assembled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_first_ignores_case_collisions() {
        let mut properties = BTreeMap::new();
        assert!(insert_first(&mut properties, "Title", "first".to_string()));
        assert!(!insert_first(&mut properties, "TITLE", "second".to_string()));
        assert_eq!(properties.len(), 1);
        assert_eq!(properties["Title"], "first");
    }

    #[test]
    fn test_bool_coercion() {
        assert_eq!(bool::from_property_value("True"), Some(true));
        assert_eq!(bool::from_property_value(" false "), Some(false));
        assert_eq!(bool::from_property_value("yes"), None);
    }

    #[test]
    fn test_assembler_copies_bag_and_export() {
        let assembler = DefaultPropertyAssembler::default();
        let bag = BTreeMap::from([
            ("Title".to_string(), "News".to_string()),
            ("ListId".to_string(), "abc".to_string()),
        ]);

        let assembled = assembler.assemble(&bag, "Any", Some("<webParts/>"));
        assert_eq!(assembled.len(), 3);
        assert_eq!(assembled["WebPartXml"], "<webParts/>");
    }

    #[test]
    fn test_assembler_applies_allow_list() {
        let assembler = DefaultPropertyAssembler::new(HashMap::from([(
            "ListView".to_string(),
            vec!["listid".to_string()],
        )]));
        let bag = BTreeMap::from([
            ("Title".to_string(), "News".to_string()),
            ("ListId".to_string(), "abc".to_string()),
        ]);

        let assembled = assembler.assemble(&bag, "ListView", None);
        assert_eq!(assembled.len(), 1);
        assert_eq!(assembled["ListId"], "abc");
    }
}
