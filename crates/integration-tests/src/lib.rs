//! Integration test helpers for Vitrine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```
//!
//! Nothing external is needed: the remote catalog is replaced by
//! [`MockCatalog`], an axum server on an ephemeral local port, and the
//! storefront server is started the same way by [`spawn_storefront`].
//!
//! # Test Categories
//!
//! - `store_persistence` - session, cart and favorites over a `FileStore`
//! - `auth_api` - the code login endpoints through the router
//! - `login_flow` - the login state machine against a live server
//! - `catalog_client` - remote catalog fetching, errors and caching
//! - `browsing` - filters and infinite scroll over a fetched catalog

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use url::Url;
use vitrine_core::{Email, Identity, Price, Product, ProductId, UserId};
use vitrine_storefront::config::StorefrontConfig;
use vitrine_storefront::routes;
use vitrine_storefront::state::AppState;

// =============================================================================
// Fixtures
// =============================================================================

/// A directory user.
///
/// # Panics
///
/// Panics if `email` is not a valid address.
#[must_use]
pub fn identity(id: i32, email: &str) -> Identity {
    Identity {
        id: UserId::new(id),
        email: Email::parse(email).expect("fixture email is valid"),
        first_name: format!("First{id}"),
        last_name: format!("Last{id}"),
    }
}

/// A catalog product.
#[must_use]
pub fn product(id: i32, category: &str, price: u32) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("{category} #{id}"),
        images: vec![format!("https://cdn.example.com/{id}.webp")],
        description: String::new(),
        price: Price::from(price),
        category: category.to_string(),
    }
}

/// `count` products cycling through `categories`, priced 1, 2, 3...
#[must_use]
pub fn products(count: u32, categories: &[&str]) -> Vec<Product> {
    (1..=count)
        .zip(categories.iter().cycle())
        .map(|(n, category)| {
            product(i32::try_from(n).unwrap_or(i32::MAX), category, n)
        })
        .collect()
}

/// Bind `router` to an ephemeral local port and serve it in the background.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local port");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    Url::parse(&format!("http://{addr}/")).expect("valid local URL")
}

// =============================================================================
// Storefront server
// =============================================================================

/// Storefront config with echoed codes, so tests can read them back.
#[must_use]
pub fn echoing_config() -> StorefrontConfig {
    let mut config = StorefrontConfig::default();
    config.auth.echo_codes = true;
    config
}

/// Start the storefront routes on a local port.
pub async fn spawn_storefront(config: StorefrontConfig) -> Url {
    serve(routes::routes().with_state(AppState::new(config))).await
}

// =============================================================================
// Mock catalog
// =============================================================================

#[derive(Clone)]
struct CatalogData {
    products: Arc<Vec<Product>>,
    users: Arc<Vec<Identity>>,
    hits: Arc<AtomicUsize>,
}

/// Stand-in for the remote product and user API.
#[derive(Debug, Clone)]
pub struct MockCatalog {
    pub url: Url,
    hits: Arc<AtomicUsize>,
}

impl MockCatalog {
    /// Serve `products` and `users` in the remote API's shapes.
    pub async fn spawn(products: Vec<Product>, users: Vec<Identity>) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let data = CatalogData {
            products: Arc::new(products),
            users: Arc::new(users),
            hits: Arc::clone(&hits),
        };

        let router = Router::new()
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .route("/users", get(list_users))
            .route("/broken/products", get(broken))
            .with_state(data);

        Self {
            url: serve(router).await,
            hits,
        }
    }

    /// Requests served so far.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn list_products(State(data): State<CatalogData>) -> Response {
    data.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "products": *data.products,
        "total": data.products.len(),
        "skip": 0,
        "limit": data.products.len(),
    }))
    .into_response()
}

async fn get_product(State(data): State<CatalogData>, Path(id): Path<i32>) -> Response {
    data.hits.fetch_add(1, Ordering::SeqCst);
    match data.products.iter().find(|p| p.id == ProductId::new(id)) {
        Some(product) => Json(product.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": format!("Product with id '{id}' not found") })),
        )
            .into_response(),
    }
}

async fn list_users(State(data): State<CatalogData>) -> Response {
    data.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "users": *data.users })).into_response()
}

async fn broken(State(data): State<CatalogData>) -> Response {
    data.hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "message": "maintenance" })),
    )
        .into_response()
}
