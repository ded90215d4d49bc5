//! Product mutation gateway.
//!
//! Validates drafts and forwards create/delete calls to the store. The
//! gateway never touches local product state: the store's next snapshot is the
//! only way a write becomes visible.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use boutique_core::{NewProduct, Price, PriceError, ProductId};

use crate::db::{ProductStore, RepositoryError};
use crate::models::{DraftField, DraftProduct};

/// Draft rejected before any store call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field (name, price, image) is empty.
    #[error("Please fill all fields ({0} is missing).")]
    MissingField(DraftField),

    /// Price text is not a non-negative number.
    #[error("Price must be a non-negative number: {0}")]
    InvalidPrice(#[from] PriceError),
}

/// A store call failed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store returned an error.
    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),

    /// The store did not answer in time.
    #[error("store did not respond within {0:?}")]
    Timeout(Duration),
}

/// Errors from [`ProductGateway::create_product`].
#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to add product.")]
    Store(#[from] StoreError),

    /// Another create is still in flight.
    #[error("A product is already being added.")]
    Busy,
}

/// Outcome of a delete request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Confirmed and removed from the store.
    Deleted,
    /// The operator declined; nothing was sent.
    Declined,
}

/// Prompt shown before a delete.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this product?";

/// Synchronous yes/no answer to the delete prompt.
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

impl Confirmation for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Turn a draft into a store document, stamping the creation time.
///
/// # Errors
///
/// Returns [`ValidationError`] if a required field is empty or the price is
/// not a non-negative number.
pub fn validate_draft(draft: &DraftProduct) -> Result<NewProduct, ValidationError> {
    if let Some(field) = draft.missing_fields().into_iter().next() {
        return Err(ValidationError::MissingField(field));
    }

    let price = Price::parse(&draft.price)?;

    Ok(NewProduct {
        name: draft.name.clone(),
        price,
        details: draft.details.clone(),
        image: draft.image.clone(),
        created_at: Utc::now(),
    })
}

/// Create/delete entry point for the admin.
#[derive(Clone)]
pub struct ProductGateway {
    store: Arc<dyn ProductStore>,
    timeout: Duration,
    creating: Arc<AtomicBool>,
}

/// Clears the busy flag when the create finishes, however it finishes.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ProductGateway {
    #[must_use]
    pub fn new(store: Arc<dyn ProductStore>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            creating: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a create is in flight (the submit control is disabled).
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.creating.load(Ordering::Acquire)
    }

    /// Validate `draft` and add it to the store.
    ///
    /// On success the draft is reset to empty. On any failure the draft is
    /// left exactly as it was so the operator can retry.
    ///
    /// # Errors
    ///
    /// - [`CreateError::Validation`] - nothing was sent to the store
    /// - [`CreateError::Busy`] - another create is in flight; nothing was sent
    /// - [`CreateError::Store`] - the store call failed or timed out
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: &mut DraftProduct) -> Result<ProductId, CreateError> {
        let product = validate_draft(draft)?;

        if self
            .creating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CreateError::Busy);
        }
        let _busy = BusyGuard(&self.creating);

        match self.with_timeout(self.store.add(product)).await {
            Ok(id) => {
                tracing::info!(product_id = %id, "Product created");
                draft.reset();
                Ok(id)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error adding product");
                Err(e.into())
            }
        }
    }

    /// Delete a product once `confirmation` agrees.
    ///
    /// Declining is not an error and sends nothing to the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store call fails or times out.
    #[instrument(skip(self, confirmation), fields(product_id = %id))]
    pub async fn delete_product(
        &self,
        id: &ProductId,
        confirmation: impl Confirmation,
    ) -> Result<DeleteOutcome, StoreError> {
        if !confirmation.confirm(DELETE_PROMPT) {
            tracing::debug!("Delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        match self.with_timeout(self.store.delete(id)).await {
            Ok(()) => {
                tracing::info!("Product deleted");
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error deleting product");
                Err(e)
            }
        }
    }

    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
            .map_err(StoreError::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::MemoryProductStore;

    fn dress() -> DraftProduct {
        DraftProduct {
            name: "Dress".to_string(),
            price: "1299".to_string(),
            details: String::new(),
            image: "http://x/y.jpg".to_string(),
        }
    }

    fn gateway(store: &MemoryProductStore) -> ProductGateway {
        ProductGateway::new(Arc::new(store.clone()), Duration::from_secs(5))
    }

    #[test]
    fn test_validate_draft_reports_first_missing_field() {
        let mut draft = dress();
        draft.name.clear();
        draft.image.clear();
        assert_eq!(
            validate_draft(&draft).unwrap_err(),
            ValidationError::MissingField(DraftField::Name)
        );
    }

    #[test]
    fn test_validate_draft_coerces_price() {
        let product = validate_draft(&dress()).unwrap();
        assert_eq!(product.price.amount(), Decimal::from(1299));
        assert_eq!(product.details, "");
    }

    #[test]
    fn test_validate_draft_rejects_non_numeric_price() {
        let mut draft = dress();
        draft.price = "12abc".to_string();
        assert!(matches!(
            validate_draft(&draft),
            Err(ValidationError::InvalidPrice(PriceError::NotANumber(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_resets_draft() {
        let store = MemoryProductStore::new();
        let mut draft = dress();
        draft.details = "Pure cotton".to_string();

        gateway(&store).create_product(&mut draft).await.unwrap();

        assert!(draft.is_empty());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_field_never_reaches_store() {
        let store = MemoryProductStore::new();
        for field in [DraftField::Name, DraftField::Price, DraftField::Image] {
            let mut draft = dress();
            match field {
                DraftField::Name => draft.name.clear(),
                DraftField::Price => draft.price.clear(),
                DraftField::Image => draft.image.clear(),
            }
            let before = draft.clone();

            let err = gateway(&store).create_product(&mut draft).await.unwrap_err();

            assert!(matches!(
                err,
                CreateError::Validation(ValidationError::MissingField(f)) if f == field
            ));
            assert_eq!(draft, before);
        }
        assert_eq!(store.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_draft() {
        let store = MemoryProductStore::new();
        store.set_unavailable(true);
        let mut draft = dress();

        let err = gateway(&store).create_product(&mut draft).await.unwrap_err();

        assert!(matches!(err, CreateError::Store(StoreError::Repository(_))));
        assert_eq!(draft, dress());
        assert_eq!(err.to_string(), "Failed to add product.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out() {
        let store = MemoryProductStore::new();
        store.set_latency(Some(Duration::from_secs(60)));
        let gateway = ProductGateway::new(Arc::new(store.clone()), Duration::from_secs(1));
        let mut draft = dress();

        let err = gateway.create_product(&mut draft).await.unwrap_err();

        assert!(matches!(err, CreateError::Store(StoreError::Timeout(_))));
        assert!(!gateway.is_busy());
        assert_eq!(draft, dress());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_create_is_busy() {
        let store = MemoryProductStore::new();
        store.set_latency(Some(Duration::from_millis(100)));
        let gateway = gateway(&store);

        let first = {
            let gateway = gateway.clone();
            tokio::spawn(async move {
                let mut draft = dress();
                gateway.create_product(&mut draft).await
            })
        };
        while !gateway.is_busy() {
            tokio::task::yield_now().await;
        }

        let mut second = dress();
        let err = gateway.create_product(&mut second).await.unwrap_err();
        assert!(matches!(err, CreateError::Busy));
        assert_eq!(second, dress());

        first.await.unwrap().unwrap();
        assert!(!gateway.is_busy());
        assert_eq!(store.write_calls(), 1);
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let store = MemoryProductStore::new();
        let mut draft = dress();
        let id = gateway(&store).create_product(&mut draft).await.unwrap();

        let outcome = gateway(&store).delete_product(&id, false).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Declined);
        assert_eq!(store.write_calls(), 1);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_confirmation_sees_prompt() {
        let store = MemoryProductStore::new();
        let id = ProductId::new("abc123");
        let outcome = gateway(&store)
            .delete_product(&id, |prompt: &str| prompt == DELETE_PROMPT)
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
    }

    #[tokio::test]
    async fn test_failed_delete_surfaces_error() {
        let store = MemoryProductStore::new();
        let mut draft = dress();
        let id = gateway(&store).create_product(&mut draft).await.unwrap();
        store.set_unavailable(true);

        let err = gateway(&store).delete_product(&id, true).await.unwrap_err();

        assert!(matches!(err, StoreError::Repository(_)));
        store.set_unavailable(false);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
