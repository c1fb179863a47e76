//! Remote product/user API client.
//!
//! Fetches the whole product collection and user list in one request each
//! (`limit=0`) and caches responses with `moka` for the configured TTL.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};
use url::Url;
use vitrine_core::{Email, Identity, Product, ProductId, UserId};

use super::CatalogError;
use crate::config::CatalogConfig;

const PRODUCT_FIELDS: &str = "id,title,images,description,price,category";
const USER_FIELDS: &str = "id,firstName,lastName,email";

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products,
    Product(ProductId),
    Users,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
    Users(Arc<Vec<Identity>>),
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    users: Vec<UserRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    id: UserId,
    first_name: String,
    last_name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the remote product catalog and user directory.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: with_trailing_slash(config.base_url.clone()),
                cache,
            }),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached response.
    pub fn invalidate(&self) {
        self.inner.cache.invalidate_all();
    }

    fn endpoint(&self, path: &str, select: Option<&str>) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.join(path)?;
        if let Some(fields) = select {
            url.query_pairs_mut()
                .append_pair("limit", "0")
                .append_pair("select", fields);
        }
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(api_message(&body)));
        }

        if !status.is_success() {
            error!(
                status = %status,
                url = %url,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: api_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                url = %url,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// The full product collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = self.endpoint("products", Some(PRODUCT_FIELDS))?;
        let response: ProductsResponse = self.fetch(url).await?;
        let products = Arc::new(response.products);
        debug!(count = products.len(), "Fetched products");

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// A single product, for the product detail view.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for an unknown id, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&format!("products/{id}"), None)?;
        let product: Product = self.fetch(url).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    // =========================================================================
    // User Methods
    // =========================================================================

    /// Every user record with a usable email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<Arc<Vec<Identity>>, CatalogError> {
        if let Some(CacheValue::Users(users)) = self.inner.cache.get(&CacheKey::Users).await {
            debug!("Cache hit for users");
            return Ok(users);
        }

        let url = self.endpoint("users", Some(USER_FIELDS))?;
        let response: UsersResponse = self.fetch(url).await?;
        let users: Arc<Vec<Identity>> = Arc::new(
            response
                .users
                .into_iter()
                .filter_map(into_identity)
                .collect(),
        );
        debug!(count = users.len(), "Fetched users");

        self.inner
            .cache
            .insert(CacheKey::Users, CacheValue::Users(Arc::clone(&users)))
            .await;
        Ok(users)
    }

    /// Look a user up by email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the user list cannot be fetched.
    pub async fn find_user(&self, email: &str) -> Result<Option<Identity>, CatalogError> {
        let users = self.users().await?;
        Ok(users
            .iter()
            .find(|identity| identity.email.eq_ignore_case(email.trim()))
            .cloned())
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

fn into_identity(record: UserRecord) -> Option<Identity> {
    match Email::parse(&record.email) {
        Ok(email) => Some(Identity {
            id: record.id,
            email,
            first_name: record.first_name,
            last_name: record.last_name,
        }),
        Err(e) => {
            warn!(user_id = %record.id, error = %e, "Skipping user with invalid email");
            None
        }
    }
}

/// Endpoint paths are joined relative to the base, so it must end in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// The API's `{"message": ...}` if present, else the start of the body.
fn api_message(body: &str) -> String {
    serde_json::from_str::<ApiMessage>(body)
        .map_or_else(|_| body.chars().take(200).collect(), |m| m.message)
}
