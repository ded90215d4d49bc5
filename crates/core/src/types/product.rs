//! Product records as they live in the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product listing, decorated with its store-assigned identifier.
///
/// Field names follow the stored document layout (`createdAt` is camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned, immutable identifier.
    pub id: ProductId,
    /// Display name (never empty).
    pub name: String,
    /// Non-negative price.
    pub price: Price,
    /// Free-text details, may be empty.
    pub details: String,
    /// Externally hosted image URL. Never fetched or validated.
    pub image: String,
    /// Creation timestamp, set once.
    pub created_at: DateTime<Utc>,
}

/// A product document about to be written; the store assigns the ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub details: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl NewProduct {
    /// Attach the identifier the store assigned to this document.
    #[must_use]
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            details: self.details,
            image: self.image,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_document_layout() {
        let created_at = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let product = NewProduct {
            name: "Dress".to_string(),
            price: Price::parse("1299").unwrap(),
            details: String::new(),
            image: "http://x/y.jpg".to_string(),
            created_at,
        }
        .with_id(ProductId::new("abc123"));

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["id"], "abc123");
        assert_eq!(json["name"], "Dress");
        assert_eq!(json["price"].as_f64(), Some(1299.0));
        assert_eq!(json["details"], "");
        assert_eq!(json["image"], "http://x/y.jpg");
        assert_eq!(json["createdAt"], "2026-01-02T03:04:05Z");
    }
}
