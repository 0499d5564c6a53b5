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

use caregivers::{Migrator, SeaOrmCaregiversRepository, Service};

async fn test_app(directory_url: &str) -> Router {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("failed to open test database");
    Migrator::up(&db, None).await.expect("migrations failed");

    let repo = Arc::new(SeaOrmCaregiversRepository::new(db));
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
        .nest(
            "/api/cuidadores",
            caregivers::api::rest::router(service, directory),
        )
        .layer(Extension(verifier))
}

fn token(user_id: i64, role: Role) -> String {
    TokenSigner::new(&JwtConfig::default())
        .issue(user_id, "acme", role, "Luz Rivera", false)
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
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        "POST",
        "/api/cuidadores",
        Some(token),
        Some(json!({
            "documentId": document,
            "emergencyPhone": "+573001112233",
            "bio": "Cuido perros y gatos",
            "experience": "3 anos con mascotas grandes",
            "serviceHours": "L-V 8:00-18:00",
            "hourlyRate": "20.50"
        })),
    )
    .await
}

#[tokio::test]
async fn create_then_browse_round_trip() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/auth/users");
            then.status(200).json_body(json!([{
                "id": 7,
                "name": "Luz Rivera",
                "email": "luz@example.com",
                "phoneNumber": "+573001112233",
                "accountLocked": false
            }]));
        })
        .await;
    let app = test_app(&server.base_url()).await;

    let (status, created) = create_profile(&app, &token(7, Role::Cuidador), "CC-1001").await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    assert_eq!(created["hourlyRate"], "20.50");
    assert_eq!(created["avgRating"], "0");
    assert_eq!(created["documentVerified"], false);

    // Marketplace browsing is open to any authenticated user.
    let (status, body) = send(
        &app,
        "GET",
        "/api/cuidadores",
        Some(&token(42, Role::Cliente)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["userName"], "Luz Rivera");
    assert_eq!(rows[0]["bio"], "Cuido perros y gatos");

    let (status, _) = send(&app, "GET", "/api/cuidadores", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_requires_the_caregiver_role() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;

    let (status, _) = create_profile(&app, &token(1, Role::Cliente), "CC-2001").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rejects_negative_rates() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/cuidadores",
        Some(&token(1, Role::Cuidador)),
        Some(json!({
            "documentId": "CC-3001",
            "emergencyPhone": "+573001112233",
            "hourlyRate": "-5"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("hourlyRate"));
}

#[tokio::test]
async fn document_conflicts_among_active_profiles() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;

    let (status, _) = create_profile(&app, &token(1, Role::Cuidador), "CC-4001").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = create_profile(&app, &token(2, Role::Cuidador), "CC-4001").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CAREGIVERS_DOCUMENT_CONFLICT");
}

#[tokio::test]
async fn rating_cache_is_pushed_and_rounded() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;
    let owner = token(5, Role::Cuidador);

    let (_, created) = create_profile(&app, &owner, "CC-5001").await;
    let id = created["id"].as_i64().unwrap();
    let path = format!("/api/cuidadores/{id}/rating");

    // The push endpoint carries no token; it is service wiring.
    let (status, _) = send(
        &app,
        "PUT",
        &path,
        None,
        Some(json!({ "averageRating": "4.666" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/cuidadores/{id}"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["avgRating"], "4.67");

    let (status, _) = send(
        &app,
        "PUT",
        &path,
        None,
        Some(json!({ "averageRating": "5.5" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/cuidadores/424242/rating",
        None,
        Some(json!({ "averageRating": "4" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_own_changes_rate_and_bio() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;
    let owner = token(6, Role::Cuidador);

    create_profile(&app, &owner, "CC-6001").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/cuidadores",
        Some(&owner),
        Some(json!({ "hourlyRate": "25.00", "bio": "Ahora tambien aves" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {body}");
    assert_eq!(body["hourlyRate"], "25.00");
    assert_eq!(body["bio"], "Ahora tambien aves");
    // Untouched fields survive a partial update.
    assert_eq!(body["documentId"], "CC-6001");
    assert_eq!(body["serviceHours"], "L-V 8:00-18:00");
}

#[tokio::test]
async fn soft_delete_hides_the_profile_from_the_marketplace() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;
    let owner = token(8, Role::Cuidador);

    let (_, created) = create_profile(&app, &owner, "CC-7001").await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(&app, "DELETE", "/api/cuidadores", Some(&owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/cuidadores/{id}"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "GET",
        "/api/cuidadores",
        Some(&token(42, Role::Cliente)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn verification_is_admin_only() {
    let server = MockServer::start_async().await;
    let app = test_app(&server.base_url()).await;
    let owner = token(9, Role::Cuidador);

    let (_, created) = create_profile(&app, &owner, "CC-8001").await;
    let id = created["id"].as_i64().unwrap();
    let path = format!("/api/cuidadores/{id}/verificar");

    let (status, _) = send(&app, "POST", &path, Some(&owner), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "POST", &path, Some(&token(99, Role::Admin)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documentVerified"], true);
}
