use std::sync::Arc;
use std::time::Duration;

use apikit::auth::{JwtConfig, Role, TokenSigner, TokenVerifier};
use apikit::{DirectoryClient, DirectoryConfig};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Extension, Router,
};
use httpmock::prelude::*;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use tower::ServiceExt;

use clients::{Migrator, SeaOrmClientsRepository, Service};

async fn test_app(directory_url: &str) -> Router {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("failed to open test database");
    Migrator::up(&db, None).await.expect("migrations failed");

    let repo = Arc::new(SeaOrmClientsRepository::new(db));
    let service = Arc::new(Service::new(repo));
    let directory = Arc::new(
        DirectoryClient::new(&DirectoryConfig {
            base_url: directory_url.to_string(),
            timeout: Duration::from_secs(1),
        })
        .expect("directory client"),
    );
    let verifier = TokenVerifier::new(&JwtConfig::default());

    Router::new()
        .nest("/api/clientes", clients::api::rest::router(service, directory))
        .layer(Extension(verifier))
}

fn token(user_id: i64, role: Role) -> String {
    TokenSigner::new(&JwtConfig::default())
        .issue(user_id, "acme", role, "Ana Morales", false)
        .expect("token signing")
        .token
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    let request = match body {
        Some(j) => builder
            .header("content-type", "application/json")
            .body(Body::from(j.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, value)
}

async fn create_profile(
    app: &Router,
    token: &str,
    document: &str,
    phone: &str,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        "POST",
        "/api/clientes",
        Some(token),
        Some(json!({ "documentId": document, "emergencyPhone": phone })),
    )
    .await
}

#[tokio::test]
async fn create_then_fetch_round_trip() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/auth/users/7");
            then.status(200).json_body(json!({
                "id": 7,
                "name": "Ana Morales",
                "email": "ana@example.com",
                "phoneNumber": "+573001112233",
                "role": "Cliente",
                "accountLocked": false,
                "createdAt": "2025-01-01T00:00:00Z"
            }));
        })
        .await;
    let app = test_app(&server.base_url()).await;
    let t = token(7, Role::Cliente);

    let (status, created) = create_profile(&app, &t, "CC-1001", "+573001112233").await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    assert_eq!(created["userId"], 7);
    assert_eq!(created["documentId"], "CC-1001");
    assert_eq!(created["documentVerified"], false);

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/clientes/{id}"), Some(&t), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["userName"], "Ana Morales");
    assert_eq!(fetched["userEmail"], "ana@example.com");
    assert_eq!(fetched["accountLocked"], false);
}

#[tokio::test]
async fn creating_a_second_active_profile_conflicts() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;
    let t = token(1, Role::Cliente);

    let (status, _) = create_profile(&app, &t, "CC-2001", "+573001112233").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = create_profile(&app, &t, "CC-2002", "+573001112233").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CLIENTS_PROFILE_EXISTS");
}

#[tokio::test]
async fn document_conflicts_among_active_profiles() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;

    let (status, _) =
        create_profile(&app, &token(1, Role::Cliente), "CC-3001", "+573001112233").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        create_profile(&app, &token(2, Role::Cliente), "CC-3001", "+573004445566").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CLIENTS_DOCUMENT_CONFLICT");

    // Whitespace does not dodge the uniqueness check.
    let (status, _) =
        create_profile(&app, &token(3, Role::Cliente), "  CC-3001  ", "+573007778899").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_requires_the_client_role() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;

    let (status, _) =
        create_profile(&app, &token(1, Role::Cuidador), "CC-4001", "+573001112233").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        "/api/clientes",
        None,
        Some(json!({ "documentId": "CC-4002", "emergencyPhone": "+573001112233" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejects_malformed_input() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;
    let t = token(1, Role::Cliente);

    let (status, body) = create_profile(&app, &t, "   ", "+573001112233").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CLIENTS_VALIDATION");

    let (status, body) = create_profile(&app, &t, "CC-5001", "not-a-phone").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("emergencyPhone"));
}

#[tokio::test]
async fn list_is_admin_only_and_uses_one_batch_lookup() {
    let server = MockServer::start_async().await;
    let batch = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/auth/users");
            then.status(200).json_body(json!([
                {
                    "id": 1,
                    "name": "Ana",
                    "email": "ana@example.com",
                    "phoneNumber": "+573001112233",
                    "accountLocked": false
                },
                {
                    "id": 2,
                    "name": "Bob",
                    "email": "bob@example.com",
                    "phoneNumber": "+573004445566",
                    "accountLocked": false
                }
            ]));
        })
        .await;
    let app = test_app(&server.base_url()).await;

    create_profile(&app, &token(1, Role::Cliente), "CC-6001", "+573001112233").await;
    create_profile(&app, &token(2, Role::Cliente), "CC-6002", "+573004445566").await;

    let (status, _) = send(
        &app,
        "GET",
        "/api/clientes",
        Some(&token(1, Role::Cliente)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "GET",
        "/api/clientes",
        Some(&token(99, Role::Admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["userName"], "Ana");
    assert_eq!(rows[1]["userName"], "Bob");
    batch.assert_async().await;
}

#[tokio::test]
async fn enrichment_degrades_to_blanks_when_the_directory_is_down() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path_includes("/api/auth/users");
            then.status(500).body("boom");
        })
        .await;
    let app = test_app(&server.base_url()).await;
    let t = token(5, Role::Cliente);

    let (_, created) = create_profile(&app, &t, "CC-7001", "+573001112233").await;
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/api/clientes/{id}"), Some(&t), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["documentId"], "CC-7001");
    assert!(fetched["userName"].is_null());
    assert!(fetched["accountLocked"].is_null());
}

#[tokio::test]
async fn update_revalidates_the_document() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;
    let ana = token(1, Role::Cliente);
    let bob = token(2, Role::Cliente);

    create_profile(&app, &ana, "CC-8001", "+573001112233").await;
    create_profile(&app, &bob, "CC-8002", "+573004445566").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/clientes",
        Some(&bob),
        Some(json!({ "documentId": "CC-8001" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CLIENTS_DOCUMENT_CONFLICT");

    // Re-submitting your own document is not a conflict.
    let (status, body) = send(
        &app,
        "PUT",
        "/api/clientes",
        Some(&bob),
        Some(json!({ "documentId": "CC-8002", "emergencyPhone": "+573009998877" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {body}");
    assert_eq!(body["emergencyPhone"], "+573009998877");
    assert!(body["updatedAt"].is_string());
}

#[tokio::test]
async fn soft_delete_frees_the_user_and_the_document() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;
    let t = token(4, Role::Cliente);

    create_profile(&app, &t, "CC-9001", "+573001112233").await;

    let (status, _) = send(&app, "DELETE", "/api/clientes", Some(&t), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/api/clientes/usuario/4", Some(&t), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/clientes", Some(&t), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The deleted row no longer blocks either uniqueness rule.
    let (status, _) = create_profile(&app, &t, "CC-9001", "+573001112233").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn verification_is_admin_only_and_one_way() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;
    let owner = token(6, Role::Cliente);
    let admin = token(99, Role::Admin);

    let (_, created) = create_profile(&app, &owner, "CC-1101", "+573001112233").await;
    let id = created["id"].as_i64().unwrap();
    let path = format!("/api/clientes/{id}/verificar");

    let (status, _) = send(&app, "POST", &path, Some(&owner), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "POST", &path, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documentVerified"], true);
    assert!(body["verifiedAt"].is_string());
    let first_verified_at = body["verifiedAt"].clone();

    // Verifying twice is a no-op success that keeps the original timestamp.
    let (status, body) = send(&app, "POST", &path, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verifiedAt"], first_verified_at);

    let (status, _) = send(&app, "POST", "/api/clientes/424242/verificar", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn problems_are_rfc9457_shaped() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;
    let t = token(1, Role::Cliente);

    let (status, body) = send(&app, "GET", "/api/clientes/424242", Some(&t), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["type"],
        "https://errors.petcare.dev/CLIENTS_PROFILE_NOT_FOUND"
    );
    assert_eq!(body["instance"], "/api/clientes/424242");
}
