//! Remote catalog client against the mock catalog server.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use vitrine_core::ProductId;
use vitrine_integration_tests::{MockCatalog, identity, products};
use vitrine_storefront::catalog::{CatalogClient, CatalogError};
use vitrine_storefront::config::CatalogConfig;

fn client(mock: &MockCatalog) -> CatalogClient {
    CatalogClient::new(&CatalogConfig {
        base_url: mock.url.clone(),
        cache_ttl: Duration::from_secs(300),
    })
}

#[tokio::test]
async fn test_products_fetched_once_then_cached() {
    let mock = MockCatalog::spawn(products(30, &["beauty", "groceries"]), Vec::new()).await;
    let client = client(&mock);

    let first = client.products().await.unwrap();
    let second = client.products().await.unwrap();
    assert_eq!(first.len(), 30);
    assert_eq!(first, second);
    assert_eq!(mock.hits(), 1);

    client.invalidate();
    client.products().await.unwrap();
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn test_product_detail_and_not_found() {
    let mock = MockCatalog::spawn(products(3, &["beauty"]), Vec::new()).await;
    let client = client(&mock);

    let product = client.product(ProductId::new(2)).await.unwrap();
    assert_eq!(product.id, ProductId::new(2));
    assert_eq!(product.thumbnail(), Some("https://cdn.example.com/2.webp"));

    let err = client.product(ProductId::new(99)).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(msg) if msg.contains("99")));
}

#[tokio::test]
async fn test_non_success_status_is_api_error() {
    let mock = MockCatalog::spawn(Vec::new(), Vec::new()).await;
    let client = CatalogClient::new(&CatalogConfig {
        base_url: mock.url.join("broken/").unwrap(),
        ..CatalogConfig::default()
    });

    let err = client.products().await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Api { status: 503, ref message } if message == "maintenance"
    ));
}

#[tokio::test]
async fn test_find_user_ignores_case() {
    let mock = MockCatalog::spawn(
        Vec::new(),
        vec![
            identity(1, "emily.johnson@x.dummyjson.com"),
            identity(2, "michael.williams@x.dummyjson.com"),
        ],
    )
    .await;
    let client = client(&mock);

    let found = client
        .find_user("  EMILY.Johnson@x.dummyjson.com ")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.first_name, "First1");
    assert!(client.find_user("nobody@example.com").await.unwrap().is_none());
    assert_eq!(mock.hits(), 1);
}
