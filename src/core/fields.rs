use crate::core::order::PlaceholderSet;
use crate::core::properties::insert_first;
use crate::domain::model::{FieldMapping, Placeholder};
use crate::domain::ports::{FunctionEvaluator, PageSource};
use crate::utils::error::Result;
use std::collections::BTreeMap;

/// Turns mapped page fields (other than rich text) into one placeholder each.
pub struct FieldPlaceholderMapper<'a> {
    page: &'a dyn PageSource,
    functions: Option<&'a dyn FunctionEvaluator>,
    skip_empty_fields: bool,
}

impl<'a> FieldPlaceholderMapper<'a> {
    pub fn new(
        page: &'a dyn PageSource,
        functions: Option<&'a dyn FunctionEvaluator>,
        skip_empty_fields: bool,
    ) -> Self {
        Self {
            page,
            functions,
            skip_empty_fields,
        }
    }

    /// Maps every non rich text field, ordered by row then column. Returns the number of
    /// placeholders added.
    pub async fn map_fields(
        &self,
        mappings: &[FieldMapping],
        set: &mut PlaceholderSet,
    ) -> Result<usize> {
        let mut field_mappings: Vec<&FieldMapping> =
            mappings.iter().filter(|m| !m.is_rich_text()).collect();
        field_mappings.sort_by_key(|m| (m.row, m.column));

        let mut added = 0;
        for mapping in field_mappings {
            let value = self.page.field_value(&mapping.name);

            // Unfilled layout fields would otherwise turn into visually empty widgets
            if self.skip_empty_fields && value.as_deref().map_or(true, str::is_empty) {
                tracing::warn!(
                    "Skipped {} for field '{}' because the field is empty",
                    mapping.target_type,
                    mapping.name
                );
                continue;
            }

            let properties = self.map_properties(mapping, value.as_deref()).await?;
            let order = set.next_order(mapping.row, mapping.column, mapping.order);

            set.push(Placeholder {
                title: mapping.name.clone(),
                type_name: mapping.target_type.clone(),
                identity: None,
                row: mapping.row,
                column: mapping.column,
                order,
                properties,
                ..Default::default()
            });
            added += 1;
        }

        Ok(added)
    }

    async fn map_properties(
        &self,
        mapping: &FieldMapping,
        value: Option<&str>,
    ) -> Result<BTreeMap<String, String>> {
        let mut properties = BTreeMap::new();

        for property in &mapping.properties {
            match property.functions.as_deref().filter(|f| !f.trim().is_empty()) {
                Some(expression) => {
                    let Some(functions) = self.functions else {
                        tracing::warn!(
                            "No function evaluator configured, skipping property '{}' of field '{}'",
                            property.name,
                            mapping.name
                        );
                        continue;
                    };

                    let (name, evaluated) = functions
                        .evaluate(expression, &property.name, property.property_type)
                        .await?;
                    if !name.is_empty() {
                        insert_first(&mut properties, &name, evaluated);
                    }
                }
                None => {
                    let raw = value.unwrap_or_default().trim().to_string();
                    insert_first(&mut properties, &property.name, raw);
                }
            }
        }

        Ok(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FieldPropertyMapping, PropertyType};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockPage {
        fields: HashMap<String, String>,
    }

    impl PageSource for MockPage {
        fn field_value(&self, name: &str) -> Option<String> {
            self.fields.get(name).cloned()
        }

        fn page_layout_file(&self) -> String {
            "/_catalogs/masterpage/ArticleLeft.aspx".to_string()
        }
    }

    #[derive(Default)]
    struct RecordingEvaluator {
        calls: Mutex<Vec<(String, String, PropertyType)>>,
    }

    #[async_trait]
    impl FunctionEvaluator for RecordingEvaluator {
        async fn evaluate(
            &self,
            expression: &str,
            property_name: &str,
            property_type: PropertyType,
        ) -> Result<(String, String)> {
            self.calls.lock().unwrap().push((
                expression.to_string(),
                property_name.to_string(),
                property_type,
            ));
            Ok((property_name.to_string(), format!("eval:{}", expression)))
        }
    }

    fn page(fields: &[(&str, &str)]) -> MockPage {
        MockPage {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn mapping(name: &str, row: i32, column: i32) -> FieldMapping {
        FieldMapping {
            name: name.to_string(),
            target_type: "ImagePart".to_string(),
            row,
            column,
            order: 0,
            properties: vec![FieldPropertyMapping {
                name: "Text".to_string(),
                property_type: PropertyType::String,
                functions: None,
            }],
        }
    }

    #[tokio::test]
    async fn test_raw_value_is_trimmed() {
        let page = page(&[("Summary", "  Hello  ")]);
        let mapper = FieldPlaceholderMapper::new(&page, None, true);
        let mut set = PlaceholderSet::new();

        let added = mapper
            .map_fields(&[mapping("Summary", 1, 1)], &mut set)
            .await
            .unwrap();

        assert_eq!(added, 1);
        let placeholders = set.into_vec();
        assert_eq!(placeholders[0].title, "Summary");
        assert_eq!(placeholders[0].type_name, "ImagePart");
        assert_eq!(placeholders[0].properties["Text"], "Hello");
        assert_eq!(placeholders[0].order, 1);
        assert!(placeholders[0].identity.is_none());
    }

    #[tokio::test]
    async fn test_skip_empty_fields() {
        let page = page(&[("Empty", "")]);
        let mappings = [mapping("Empty", 1, 1), mapping("Missing", 1, 1)];

        let mut set = PlaceholderSet::new();
        let skipping = FieldPlaceholderMapper::new(&page, None, true);
        assert_eq!(skipping.map_fields(&mappings, &mut set).await.unwrap(), 0);
        assert!(set.is_empty());

        let keeping = FieldPlaceholderMapper::new(&page, None, false);
        assert_eq!(keeping.map_fields(&mappings, &mut set).await.unwrap(), 2);
        for placeholder in set.iter() {
            assert_eq!(placeholder.properties["Text"], "");
        }
    }

    #[tokio::test]
    async fn test_fields_sorted_by_row_then_column() {
        let page = page(&[("A", "a"), ("B", "b"), ("C", "c")]);
        let mapper = FieldPlaceholderMapper::new(&page, None, true);
        let mut set = PlaceholderSet::new();

        mapper
            .map_fields(
                &[mapping("C", 2, 1), mapping("B", 1, 2), mapping("A", 1, 1)],
                &mut set,
            )
            .await
            .unwrap();

        let titles: Vec<_> = set.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_function_properties_first_write_wins() {
        let page = page(&[("Image", "/img.png")]);
        let evaluator = RecordingEvaluator::default();
        let mapper = FieldPlaceholderMapper::new(&page, Some(&evaluator), true);
        let mut mapping = mapping("Image", 1, 1);
        mapping.properties = vec![
            FieldPropertyMapping {
                name: "ImageUrl".to_string(),
                property_type: PropertyType::String,
                functions: Some("ToImageUrl({Image})".to_string()),
            },
            FieldPropertyMapping {
                name: "imageurl".to_string(),
                property_type: PropertyType::Guid,
                functions: Some("Other()".to_string()),
            },
        ];

        let mut set = PlaceholderSet::new();
        mapper.map_fields(&[mapping], &mut set).await.unwrap();

        let placeholders = set.into_vec();
        assert_eq!(placeholders[0].properties.len(), 1);
        assert_eq!(
            placeholders[0].properties["ImageUrl"],
            "eval:ToImageUrl({Image})"
        );

        let calls = evaluator.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].2, PropertyType::Guid);
    }

    #[tokio::test]
    async fn test_rich_text_mappings_are_ignored() {
        let page = page(&[("Body", "<p>x</p>")]);
        let mapper = FieldPlaceholderMapper::new(&page, None, true);
        let mut rich = mapping("Body", 1, 1);
        rich.target_type = "WikiText".to_string();

        let mut set = PlaceholderSet::new();
        assert_eq!(mapper.map_fields(&[rich], &mut set).await.unwrap(), 0);
    }
}
