//! Seed the product collection from a YAML file.
//!
//! The file is a list of drafts, exactly as the add form would submit them:
//!
//! ```yaml
//! - name: Summer Floral Dress
//!   price: "1299"
//!   details: Pure Cotton, Dry Clean Only
//!   image: https://example.com/dress.jpg
//! ```
//!
//! Every entry is validated with the admin's own draft rules before anything
//! is inserted; one bad entry aborts the whole seed.

use std::path::Path;

use tracing::{error, info};

use boutique_admin::db::{self, PgProductStore, ProductStore};
use boutique_admin::models::DraftProduct;
use boutique_admin::services::validate_draft;
use boutique_core::NewProduct;

use super::database_url;

/// Parse and validate drafts from YAML text.
///
/// # Errors
///
/// Returns the list of problems (one line per bad entry) if the YAML is
/// malformed or any entry fails validation.
pub fn parse_drafts(content: &str) -> Result<Vec<NewProduct>, Vec<String>> {
    let drafts: Vec<DraftProduct> =
        serde_yaml::from_str(content).map_err(|e| vec![format!("invalid YAML: {e}")])?;

    let mut products = Vec::with_capacity(drafts.len());
    let mut errors = Vec::new();
    for (index, draft) in drafts.iter().enumerate() {
        match validate_draft(draft) {
            Ok(product) => products.push(product),
            Err(e) => errors.push(format!("entry {} ({:?}): {e}", index + 1, draft.name)),
        }
    }

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(errors)
    }
}

/// Insert products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, any entry is invalid, or a
/// database operation fails.
pub async fn products(file_path: &str) -> Result<usize, Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    // Validate everything before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let products = match parse_drafts(&content) {
        Ok(products) => products,
        Err(errors) => {
            error!("Product validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
    };

    info!(products = products.len(), "Products validated successfully");

    let pool = db::create_pool(&database_url()?).await?;
    let store = PgProductStore::new(pool);

    let mut inserted = 0;
    for product in products {
        let name = product.name.clone();
        let id = store.add(product).await?;
        info!(product_id = %id, name = %name, "Inserted product");
        inserted += 1;
    }

    Ok(inserted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drafts_accepts_valid_entries() {
        let yaml = r#"
- name: Summer Floral Dress
  price: "1299"
  image: https://example.com/dress.jpg
- name: Kurta
  price: "799.50"
  details: Pure Cotton
  image: https://example.com/kurta.jpg
"#;
        let products = parse_drafts(yaml).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].details, "");
        assert_eq!(products[1].price.to_string(), "799.5");
    }

    #[test]
    fn test_parse_drafts_reports_every_bad_entry() {
        let yaml = r#"
- name: ""
  price: "10"
  image: https://example.com/a.jpg
- name: Scarf
  price: "-5"
  image: https://example.com/b.jpg
- name: Shawl
  price: "100"
  image: https://example.com/c.jpg
"#;
        let errors = parse_drafts(yaml).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("entry 1"));
        assert!(errors[1].starts_with("entry 2"));
    }

    #[test]
    fn test_parse_drafts_rejects_malformed_yaml() {
        let errors = parse_drafts("not: [a, list").unwrap_err();
        assert!(errors[0].starts_with("invalid YAML"));
    }
}
