pub mod fields;
pub mod fixed;
pub mod layout;
pub mod metadata;
pub mod order;
pub mod properties;
pub mod rich_text;
pub mod widget_type;
pub mod zones;

pub use crate::core::order::PlaceholderSet;
pub use crate::domain::model::{LayoutMappingModel, PageAnalysis, Placeholder};
pub use crate::utils::error::Result;
