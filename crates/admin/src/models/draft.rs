//! The add-product form state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A required draft field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Name,
    Price,
    Image,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Image => "image",
        })
    }
}

/// Unsaved product as typed into the form.
///
/// Every field stays text until submission; the price is only parsed when the
/// draft is turned into a store document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub image: String,
}

impl DraftProduct {
    /// Required fields that are still empty, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<DraftField> {
        [
            (DraftField::Name, &self.name),
            (DraftField::Price, &self.price),
            (DraftField::Image, &self.image),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Clear all four fields.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
