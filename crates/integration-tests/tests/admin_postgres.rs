//! Integration tests for the `PostgreSQL` product store.
//!
//! These tests require a `PostgreSQL` database reachable through
//! `ADMIN_DATABASE_URL` (or `DATABASE_URL`). Migrations are applied on start.
//!
//! Run with: cargo test -p boutique-integration-tests -- --ignored

use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use secrecy::SecretString;

use boutique_admin::db::{PgProductStore, ProductStore, SnapshotStream, create_pool};
use boutique_core::{NewProduct, Price, Product, ProductId};

async fn connect() -> Option<PgProductStore> {
    let url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()?;
    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("../admin/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Some(PgProductStore::new(pool))
}

fn new_product(name: &str, price: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price: Price::parse(price).unwrap(),
        details: "Integration test product".to_string(),
        image: "https://img.example/test.jpg".to_string(),
        created_at: Utc::now(),
    }
}

fn find<'a>(products: &'a [Product], id: &ProductId) -> Option<&'a Product> {
    products.iter().find(|p| &p.id == id)
}

/// Read snapshots until one satisfies `done`. Other writers may share the table.
async fn snapshot_until(
    snapshots: &mut SnapshotStream,
    done: impl Fn(&[Product]) -> bool,
) -> Vec<Product> {
    loop {
        let products = tokio::time::timeout(Duration::from_secs(5), snapshots.next())
            .await
            .expect("timed out waiting for snapshot")
            .expect("snapshot stream ended")
            .expect("snapshot failed");
        if done(&products) {
            return products;
        }
    }
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_subscription_follows_every_write() {
    let Some(store) = connect().await else {
        return;
    };

    let mut snapshots = store.subscribe().await.expect("Failed to subscribe");
    let initial = snapshot_until(&mut snapshots, |_| true).await;

    let id = store.add(new_product("Test Dress", "1299")).await.unwrap();
    assert!(find(&initial, &id).is_none());
    assert!(!id.as_str().contains('-'));

    let added = snapshot_until(&mut snapshots, |p| find(p, &id).is_some()).await;
    assert_eq!(find(&added, &id).unwrap().name, "Test Dress");

    // A write from another client of the table is seen too.
    sqlx::query("UPDATE products SET name = $1 WHERE id = $2")
        .bind("Renamed Dress")
        .bind(id.as_str())
        .execute(store.pool())
        .await
        .unwrap();
    let renamed = snapshot_until(&mut snapshots, |p| {
        find(p, &id).is_some_and(|product| product.name == "Renamed Dress")
    })
    .await;
    assert!(renamed.len() >= added.len());

    store.delete(&id).await.unwrap();
    let removed = snapshot_until(&mut snapshots, |p| find(p, &id).is_none()).await;
    assert!(find(&removed, &id).is_none());
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_price_is_stored_exactly() {
    let Some(store) = connect().await else {
        return;
    };

    let id = store.add(new_product("Test Kurta", "12.345")).await.unwrap();
    let products = store.list().await.unwrap();
    assert_eq!(find(&products, &id).unwrap().price.to_string(), "12.345");

    store.delete(&id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_delete_unknown_id_is_ok() {
    let Some(store) = connect().await else {
        return;
    };

    store
        .delete(&ProductId::new("does-not-exist"))
        .await
        .unwrap();
}
