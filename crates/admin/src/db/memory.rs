//! In-process product store.
//!
//! Keeps the collection in insertion order and broadcasts the full collection
//! after every mutation. Test hooks allow simulating an unreachable or slow
//! backend and counting write attempts.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use boutique_core::{NewProduct, Product, ProductId};

use super::{ProductStore, RepositoryError, SnapshotStream};

/// Broadcast capacity; slower subscribers skip to the latest collection.
const CHANNEL_CAPACITY: usize = 64;

/// Process-local product collection.
#[derive(Clone)]
pub struct MemoryProductStore {
    inner: Arc<Inner>,
}

struct Inner {
    products: Mutex<Vec<Product>>,
    changes: broadcast::Sender<Arc<Vec<Product>>>,
    unavailable: AtomicBool,
    latency: Mutex<Option<Duration>>,
    writes: AtomicUsize,
}

impl Default for MemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProductStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                products: Mutex::new(Vec::new()),
                changes,
                unavailable: AtomicBool::new(false),
                latency: Mutex::new(None),
                writes: AtomicUsize::new(0),
            }),
        }
    }

    /// Make every subsequent call fail with [`RepositoryError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every subsequent write by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *lock(&self.inner.latency) = latency;
    }

    /// Number of write calls (`add` + `delete`) that reached the store.
    #[must_use]
    pub fn write_calls(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Number of open snapshot subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.changes.receiver_count()
    }

    /// Change a document outside the admin, as another client of the store would.
    ///
    /// Returns `false` if no document has that ID.
    pub fn edit_externally(&self, id: &ProductId, edit: impl FnOnce(&mut Product)) -> bool {
        let mut products = lock(&self.inner.products);
        let Some(product) = products.iter_mut().find(|p| &p.id == id) else {
            return false;
        };
        edit(product);
        self.publish(&products);
        true
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(())
    }

    async fn begin_write(&self) -> Result<(), RepositoryError> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        let latency = *lock(&self.inner.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.check_available()
    }

    /// Send the collection to subscribers. Must be called with the lock held so
    /// snapshots go out in mutation order.
    fn publish(&self, products: &[Product]) {
        // No receivers is fine
        let _ = self.inner.changes.send(Arc::new(products.to_vec()));
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.check_available()?;
        Ok(lock(&self.inner.products).clone())
    }

    async fn add(&self, product: NewProduct) -> Result<ProductId, RepositoryError> {
        self.begin_write().await?;

        let id = ProductId::new(Uuid::new_v4().simple().to_string());
        let mut products = lock(&self.inner.products);
        products.push(product.with_id(id.clone()));
        self.publish(&products);
        Ok(id)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        self.begin_write().await?;

        let mut products = lock(&self.inner.products);
        let before = products.len();
        products.retain(|p| &p.id != id);
        if products.len() != before {
            self.publish(&products);
        }
        Ok(())
    }

    async fn subscribe(&self) -> Result<SnapshotStream, RepositoryError> {
        self.check_available()?;

        // Take the initial snapshot and the receiver under one lock so no
        // mutation falls between them.
        let (initial, mut changes) = {
            let products = lock(&self.inner.products);
            (products.clone(), self.inner.changes.subscribe())
        };
        let store = self.clone();

        Ok(Box::pin(stream! {
            yield Ok(initial);
            loop {
                match changes.recv().await {
                    Ok(snapshot) => yield Ok(snapshot.as_ref().clone()),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Snapshot subscriber lagged, resending current collection");
                        let current = lock(&store.inner.products).clone();
                        yield Ok(current);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
