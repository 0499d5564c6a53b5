use std::collections::HashMap;
use std::sync::Arc;

use apikit::auth::{JwtConfig, Role, TokenSigner, TokenVerifier};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Extension, Router,
};
use caregivers::contract::{CaregiversApi, CaregiversError};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use tower::ServiceExt;

use bookings::{Migrator, SeaOrmBookingsRepository, Service};

/// Stand-in for the caregivers module: user 30 owns profile 3 and user 40
/// owns profile 9.
struct StubCaregivers {
    profiles: HashMap<i64, i64>,
}

impl StubCaregivers {
    fn new() -> Self {
        Self {
            profiles: HashMap::from([(30, 3), (40, 9)]),
        }
    }
}

#[async_trait]
impl CaregiversApi for StubCaregivers {
    async fn exists_active(&self, profile_id: i64) -> Result<bool, CaregiversError> {
        Ok(self.profiles.values().any(|&p| p == profile_id))
    }

    async fn profile_id_for_user(&self, user_id: i64) -> Result<Option<i64>, CaregiversError> {
        Ok(self.profiles.get(&user_id).copied())
    }

    async fn set_avg_rating(&self, _profile_id: i64, _avg: Decimal) -> Result<(), CaregiversError> {
        Ok(())
    }
}

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("failed to open test database");
    Migrator::up(&db, None).await.expect("migrations failed");

    let repo = Arc::new(SeaOrmBookingsRepository::new(db));
    let service = Arc::new(Service::new(repo, Arc::new(StubCaregivers::new())));
    let verifier = TokenVerifier::new(&JwtConfig::default());

    Router::new()
        .nest("/api/solicitudes", bookings::api::rest::router(service))
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

async fn create_booking(
    app: &Router,
    token: &str,
    caregiver_id: i64,
) -> (StatusCode, serde_json::Value) {
    let start = Utc::now() + Duration::days(1);
    let end = start + Duration::hours(4);
    send(
        app,
        "POST",
        "/api/solicitudes",
        Some(token),
        Some(json!({
            "caregiverId": caregiver_id,
            "startAt": start.to_rfc3339(),
            "endAt": end.to_rfc3339(),
            "serviceType": "Paseo matutino",
            "notes": "Dos paseos cortos"
        })),
    )
    .await
}

async fn set_status(
    app: &Router,
    token: &str,
    id: i64,
    estado: &str,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        "PUT",
        &format!("/api/solicitudes/{id}/estado"),
        Some(token),
        Some(json!({ "estado": estado })),
    )
    .await
}

#[tokio::test]
async fn client_creates_and_both_sides_list_it() {
    let app = test_app().await;
    let client = token(1, Role::Cliente);
    let caregiver = token(30, Role::Cuidador);

    let (status, created) = create_booking(&app, &client, 3).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    assert_eq!(created["clientId"], 1);
    assert_eq!(created["caregiverId"], 3);
    assert_eq!(created["estado"], "Pendiente");
    assert_eq!(created["isPaid"], false);
    assert_eq!(created["isRated"], false);

    let (status, mine) = send(&app, "GET", "/api/solicitudes/mias", Some(&client), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (status, assigned) = send(
        &app,
        "GET",
        "/api/solicitudes/asignadas",
        Some(&caregiver),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned[0]["id"], created["id"]);

    // A caregiver with no bookings sees an empty list, not an error.
    let other = token(40, Role::Cuidador);
    let (status, empty) = send(
        &app,
        "GET",
        "/api/solicitudes/asignadas",
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn lists_come_newest_first() {
    let app = test_app().await;
    let client = token(1, Role::Cliente);

    let (_, first) = create_booking(&app, &client, 3).await;
    let (_, second) = create_booking(&app, &client, 9).await;

    let (status, mine) = send(&app, "GET", "/api/solicitudes/mias", Some(&client), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = mine.as_array().unwrap();
    assert_eq!(rows[0]["id"], second["id"]);
    assert_eq!(rows[1]["id"], first["id"]);
}

#[tokio::test]
async fn creation_is_gated_and_validated() {
    let app = test_app().await;
    let client = token(1, Role::Cliente);

    let (status, _) = create_booking(&app, &token(30, Role::Cuidador), 3).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "POST", "/api/solicitudes", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Unknown caregiver profile.
    let (status, body) = create_booking(&app, &client, 777).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("caregiverId"));

    // Window ends before it starts.
    let start = Utc::now() + Duration::days(1);
    let (status, body) = send(
        &app,
        "POST",
        "/api/solicitudes",
        Some(&client),
        Some(json!({
            "caregiverId": 3,
            "startAt": start.to_rfc3339(),
            "endAt": (start - Duration::hours(1)).to_rfc3339(),
            "serviceType": "Paseo"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("endAt"));

    // Window in the past.
    let past = Utc::now() - Duration::hours(2);
    let (status, body) = send(
        &app,
        "POST",
        "/api/solicitudes",
        Some(&client),
        Some(json!({
            "caregiverId": 3,
            "startAt": past.to_rfc3339(),
            "endAt": (past + Duration::hours(1)).to_rfc3339(),
            "serviceType": "Paseo"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("startAt"));

    // Blank service type.
    let (status, body) = send(
        &app,
        "POST",
        "/api/solicitudes",
        Some(&client),
        Some(json!({
            "caregiverId": 3,
            "startAt": (Utc::now() + Duration::days(1)).to_rfc3339(),
            "endAt": (Utc::now() + Duration::days(1) + Duration::hours(2)).to_rfc3339(),
            "serviceType": "   "
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("serviceType"));
}

#[tokio::test]
async fn caregiver_walks_the_whole_lifecycle() {
    let app = test_app().await;
    let client = token(1, Role::Cliente);
    let caregiver = token(30, Role::Cuidador);

    let (_, created) = create_booking(&app, &client, 3).await;
    let id = created["id"].as_i64().unwrap();

    for estado in ["Aceptada", "EnProgreso", "Finalizada"] {
        let (status, body) = set_status(&app, &caregiver, id, estado).await;
        assert_eq!(status, StatusCode::OK, "transition to {estado}: {body}");
        assert_eq!(body["estado"], estado);
    }
}

#[tokio::test]
async fn only_the_assigned_caregiver_accepts() {
    let app = test_app().await;
    let client = token(1, Role::Cliente);
    let assigned = token(30, Role::Cuidador);
    let other = token(40, Role::Cuidador);
    let admin = token(99, Role::Admin);

    let (_, created) = create_booking(&app, &client, 3).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = set_status(&app, &client, id, "Aceptada").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = set_status(&app, &other, id, "Aceptada").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins read bookings but do not drive transitions.
    let (status, _) = set_status(&app, &admin, id, "Aceptada").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = set_status(&app, &assigned, id, "Aceptada").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estado"], "Aceptada");
}

#[tokio::test]
async fn cancellation_belongs_to_the_client() {
    let app = test_app().await;
    let client = token(1, Role::Cliente);
    let caregiver = token(30, Role::Cuidador);

    // From Pendiente.
    let (_, created) = create_booking(&app, &client, 3).await;
    let id = created["id"].as_i64().unwrap();
    let (status, _) = set_status(&app, &caregiver, id, "Cancelada").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = set_status(&app, &client, id, "Cancelada").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estado"], "Cancelada");

    // From Aceptada.
    let (_, created) = create_booking(&app, &client, 3).await;
    let id = created["id"].as_i64().unwrap();
    set_status(&app, &caregiver, id, "Aceptada").await;
    let (status, _) = set_status(&app, &client, id, "Cancelada").await;
    assert_eq!(status, StatusCode::OK);

    // Not once the work started.
    let (_, created) = create_booking(&app, &client, 3).await;
    let id = created["id"].as_i64().unwrap();
    set_status(&app, &caregiver, id, "Aceptada").await;
    set_status(&app, &caregiver, id, "EnProgreso").await;
    let (status, body) = set_status(&app, &client, id, "Cancelada").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BOOKINGS_INVALID_TRANSITION");
}

#[tokio::test]
async fn illegal_transitions_conflict() {
    let app = test_app().await;
    let client = token(1, Role::Cliente);
    let caregiver = token(30, Role::Cuidador);

    let (_, created) = create_booking(&app, &client, 3).await;
    let id = created["id"].as_i64().unwrap();

    // Skipping acceptance.
    let (status, body) = set_status(&app, &caregiver, id, "Finalizada").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["detail"].as_str().unwrap().contains("Pendiente"));

    // Nothing moves back to Pendiente.
    set_status(&app, &caregiver, id, "Aceptada").await;
    let (status, _) = set_status(&app, &caregiver, id, "Pendiente").await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Accepting twice.
    let (status, _) = set_status(&app, &caregiver, id, "Aceptada").await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unknown target state never reaches the machine.
    let (status, body) = set_status(&app, &caregiver, id, "Pausada").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("Pausada"));
}

#[tokio::test]
async fn visibility_is_participants_and_admins_only() {
    let app = test_app().await;
    let client = token(1, Role::Cliente);
    let outsider = token(2, Role::Cliente);
    let admin = token(99, Role::Admin);

    let (_, created) = create_booking(&app, &client, 3).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/solicitudes/{id}"),
        Some(&client),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);

    // Outsiders get the same answer for real and missing ids.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/solicitudes/{id}"),
        Some(&outsider),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "GET", "/api/solicitudes/4242", Some(&outsider), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/solicitudes/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "GET", "/api/solicitudes/4242", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BOOKINGS_NOT_FOUND");
}

#[tokio::test]
async fn payment_flag_is_one_way_and_status_gated() {
    let app = test_app().await;
    let client = token(1, Role::Cliente);
    let caregiver = token(30, Role::Cuidador);

    let (_, created) = create_booking(&app, &client, 3).await;
    let id = created["id"].as_i64().unwrap();
    let pay_path = format!("/api/solicitudes/{id}/pagar");
    let method_body = json!({ "paymentMethod": "PayPal" });

    // Pending bookings take no payment.
    let (status, body) = send(&app, "POST", &pay_path, None, Some(method_body.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BOOKINGS_NOT_PAYABLE");

    set_status(&app, &caregiver, id, "Aceptada").await;

    let (status, body) = send(
        &app,
        "POST",
        &pay_path,
        None,
        Some(json!({ "paymentMethod": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = send(&app, "POST", &pay_path, None, Some(method_body.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched) = send(
        &app,
        "GET",
        &format!("/api/solicitudes/{id}"),
        Some(&client),
        None,
    )
    .await;
    assert_eq!(fetched["isPaid"], true);
    assert_eq!(fetched["paymentMethod"], "PayPal");

    let (status, body) = send(&app, "POST", &pay_path, None, Some(method_body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BOOKINGS_ALREADY_PAID");

    let (status, _) = send(
        &app,
        "POST",
        "/api/solicitudes/4242/pagar",
        None,
        Some(json!({ "paymentMethod": "PayPal" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rating_flag_needs_a_finished_booking() {
    let app = test_app().await;
    let client = token(1, Role::Cliente);
    let caregiver = token(30, Role::Cuidador);

    let (_, created) = create_booking(&app, &client, 3).await;
    let id = created["id"].as_i64().unwrap();
    let rate_path = format!("/api/solicitudes/{id}/calificar");

    let (status, body) = send(&app, "POST", &rate_path, None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BOOKINGS_NOT_FINISHED");

    for estado in ["Aceptada", "EnProgreso", "Finalizada"] {
        set_status(&app, &caregiver, id, estado).await;
    }

    let (status, _) = send(&app, "POST", &rate_path, None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched) = send(
        &app,
        "GET",
        &format!("/api/solicitudes/{id}"),
        Some(&client),
        None,
    )
    .await;
    assert_eq!(fetched["isRated"], true);

    let (status, body) = send(&app, "POST", &rate_path, None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BOOKINGS_ALREADY_RATED");

    let (status, _) = send(&app, "POST", "/api/solicitudes/4242/calificar", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
