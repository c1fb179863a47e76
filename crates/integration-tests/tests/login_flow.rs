//! End-to-end login: directory lookup against the mock catalog, codes from a
//! live storefront server, session persisted to disk.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use vitrine_core::UserId;
use vitrine_integration_tests::{
    MockCatalog, echoing_config, identity, spawn_storefront,
};
use vitrine_storefront::auth::{
    AuthError, CodeChallenge, HttpCodeChallenge, LoginFlow, LoginStep, StaticDirectory,
};
use vitrine_storefront::catalog::CatalogClient;
use vitrine_storefront::config::{CatalogConfig, StorefrontConfig};
use vitrine_storefront::shop::Shop;
use vitrine_storefront::store::FileStore;

fn catalog_client(mock: &MockCatalog) -> CatalogClient {
    CatalogClient::new(&CatalogConfig {
        base_url: mock.url.clone(),
        ..CatalogConfig::default()
    })
}

#[tokio::test]
async fn test_login_over_http_persists_session() {
    let server = spawn_storefront(echoing_config()).await;
    let catalog = MockCatalog::spawn(
        Vec::new(),
        vec![
            identity(1, "emily.johnson@x.dummyjson.com"),
            identity(2, "michael.williams@x.dummyjson.com"),
        ],
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let shop = Shop::open(Arc::new(FileStore::new(dir.path())));

    let mut flow = LoginFlow::new(
        catalog_client(&catalog),
        HttpCodeChallenge::new(&server).unwrap(),
        Arc::clone(shop.session()),
    );

    let delivery = flow
        .submit_email("Michael.Williams@x.dummyjson.com")
        .await
        .unwrap();
    let code = delivery.echoed_code.unwrap();
    assert!(matches!(
        flow.step(),
        LoginStep::AwaitingCode { user } if user.id == UserId::new(2)
    ));

    let wrong = if code == "999999" { "100000" } else { "999999" };
    assert!(matches!(
        flow.submit_code(wrong).await,
        Err(AuthError::CodeMismatch)
    ));

    let user = flow.submit_code(&code).await.unwrap();
    assert_eq!(user.id, UserId::new(2));
    drop(flow);
    drop(shop);

    let reopened = Shop::open(Arc::new(FileStore::new(dir.path())));
    assert_eq!(reopened.session().user_id(), Some(UserId::new(2)));
}

#[tokio::test]
async fn test_unknown_email_never_reaches_server() {
    let server = spawn_storefront(echoing_config()).await;
    let shop = Shop::in_memory();
    let mut flow = LoginFlow::new(
        StaticDirectory::new(vec![identity(1, "emily@example.com")]),
        HttpCodeChallenge::new(&server).unwrap(),
        Arc::clone(shop.session()),
    );

    let err = flow.submit_email("stranger@example.com").await.unwrap_err();
    assert!(matches!(err, AuthError::UnknownEmail(_)));
    assert_eq!(flow.step(), &LoginStep::AwaitingEmail);
    assert!(!shop.session().is_authenticated());
}

#[tokio::test]
async fn test_codes_hidden_without_echo() {
    let server = spawn_storefront(StorefrontConfig::default()).await;
    let challenge = HttpCodeChallenge::new(&server).unwrap();

    let delivery = challenge
        .send_code(&"emily@example.com".parse().unwrap())
        .await
        .unwrap();
    assert!(delivery.echoed_code.is_none());
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Bind and drop to find a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let challenge = HttpCodeChallenge::new(&format!("http://{addr}/").parse().unwrap()).unwrap();
    let err = challenge
        .send_code(&"emily@example.com".parse().unwrap())
        .await
        .unwrap_err();
    assert!(err.is_transport());
}
