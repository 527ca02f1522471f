use crate::domain::model::{CanonicalLayout, PageLayoutTemplate};

/// Maps a page layout template onto the canonical layout used for the converted page.
///
/// Unknown templates degrade to a one column layout rather than rejecting the page.
pub fn classify(template: &PageLayoutTemplate) -> CanonicalLayout {
    match template {
        PageLayoutTemplate::OneColumn => CanonicalLayout::OneColumn,
        PageLayoutTemplate::TwoColumns => CanonicalLayout::TwoColumns,
        PageLayoutTemplate::TwoColumnsWithSidebarLeft
        | PageLayoutTemplate::TwoColumnsWithSidebarRight => CanonicalLayout::TwoColumnsWithSidebar,
        PageLayoutTemplate::TwoColumnsWithHeader => CanonicalLayout::TwoColumnsWithHeader,
        PageLayoutTemplate::TwoColumnsWithHeaderAndFooter => {
            CanonicalLayout::TwoColumnsWithHeaderAndFooter
        }
        PageLayoutTemplate::ThreeColumns => CanonicalLayout::ThreeColumns,
        PageLayoutTemplate::ThreeColumnsWithHeader => CanonicalLayout::ThreeColumnsWithHeader,
        PageLayoutTemplate::ThreeColumnsWithHeaderAndFooter => {
            CanonicalLayout::ThreeColumnsWithHeaderAndFooter
        }
        PageLayoutTemplate::AutoDetect => CanonicalLayout::PublishingAutoDetect,
        PageLayoutTemplate::Unknown(raw) => {
            tracing::debug!("Unknown page layout template '{}', using one column layout", raw);
            CanonicalLayout::OneColumn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidebar_variants_share_a_layout() {
        assert_eq!(
            classify(&PageLayoutTemplate::TwoColumnsWithSidebarLeft),
            CanonicalLayout::TwoColumnsWithSidebar
        );
        assert_eq!(
            classify(&PageLayoutTemplate::TwoColumnsWithSidebarRight),
            CanonicalLayout::TwoColumnsWithSidebar
        );
    }

    #[test]
    fn test_known_templates() {
        assert_eq!(classify(&PageLayoutTemplate::OneColumn), CanonicalLayout::OneColumn);
        assert_eq!(
            classify(&PageLayoutTemplate::ThreeColumnsWithHeader),
            CanonicalLayout::ThreeColumnsWithHeader
        );
        assert_eq!(
            classify(&PageLayoutTemplate::AutoDetect),
            CanonicalLayout::PublishingAutoDetect
        );
    }

    #[test]
    fn test_unknown_template_falls_back_to_one_column() {
        let template = PageLayoutTemplate::from("MagazineSpread");
        assert_eq!(classify(&template), CanonicalLayout::OneColumn);
    }
}
