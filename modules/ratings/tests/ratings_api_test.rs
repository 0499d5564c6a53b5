use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use apikit::auth::{JwtConfig, Role, TokenSigner, TokenVerifier};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Extension, Router,
};
use bookings::contract::{BookingsApi, BookingsError, RatingView};
use caregivers::contract::{CaregiversApi, CaregiversError};
use rust_decimal::Decimal;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use tower::ServiceExt;

use ratings::{Migrator, SeaOrmRatingsRepository, Service};

/// Stand-in for the bookings module. Bookings 10, 12 and 13 are finished
/// and unrated for client 1 with caregiver 3; booking 11 is still pending.
struct StubBookings {
    views: Mutex<HashMap<i64, RatingView>>,
}

impl StubBookings {
    fn new() -> Self {
        let seed = [
            RatingView {
                id: 10,
                client_id: 1,
                caregiver_id: 3,
                finished: true,
                rated: false,
            },
            RatingView {
                id: 11,
                client_id: 1,
                caregiver_id: 3,
                finished: false,
                rated: false,
            },
            RatingView {
                id: 12,
                client_id: 1,
                caregiver_id: 3,
                finished: true,
                rated: false,
            },
            RatingView {
                id: 13,
                client_id: 1,
                caregiver_id: 3,
                finished: true,
                rated: false,
            },
        ];
        Self {
            views: Mutex::new(seed.into_iter().map(|v| (v.id, v)).collect()),
        }
    }

    fn rated(&self, booking_id: i64) -> bool {
        self.views.lock().unwrap()[&booking_id].rated
    }
}

#[async_trait]
impl BookingsApi for StubBookings {
    async fn rating_view(&self, booking_id: i64) -> Result<Option<RatingView>, BookingsError> {
        Ok(self.views.lock().unwrap().get(&booking_id).copied())
    }

    async fn mark_rated(&self, booking_id: i64) -> Result<(), BookingsError> {
        let mut views = self.views.lock().unwrap();
        match views.get_mut(&booking_id) {
            Some(v) if v.finished && !v.rated => {
                v.rated = true;
                Ok(())
            }
            Some(_) => Err(BookingsError::Conflict {
                message: "already rated".to_string(),
            }),
            None => Err(BookingsError::NotFound),
        }
    }

    async fn mark_paid(&self, _booking_id: i64, _method: &str) -> Result<(), BookingsError> {
        Ok(())
    }
}

/// Records every average push; optionally fails them all.
struct RecordingCaregivers {
    pushes: Mutex<Vec<(i64, Decimal)>>,
    fail: bool,
}

impl RecordingCaregivers {
    fn new(fail: bool) -> Self {
        Self {
            pushes: Mutex::new(Vec::new()),
            fail,
        }
    }
}

#[async_trait]
impl CaregiversApi for RecordingCaregivers {
    async fn exists_active(&self, _profile_id: i64) -> Result<bool, CaregiversError> {
        Ok(true)
    }

    async fn profile_id_for_user(&self, _user_id: i64) -> Result<Option<i64>, CaregiversError> {
        Ok(None)
    }

    async fn set_avg_rating(&self, profile_id: i64, avg: Decimal) -> Result<(), CaregiversError> {
        if self.fail {
            return Err(CaregiversError::Internal);
        }
        self.pushes.lock().unwrap().push((profile_id, avg));
        Ok(())
    }
}

async fn test_app(fail_push: bool) -> (Router, Arc<StubBookings>, Arc<RecordingCaregivers>) {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("failed to open test database");
    Migrator::up(&db, None).await.expect("migrations failed");

    let stub_bookings = Arc::new(StubBookings::new());
    let recording = Arc::new(RecordingCaregivers::new(fail_push));
    let repo = Arc::new(SeaOrmRatingsRepository::new(db));
    let service = Arc::new(Service::new(
        repo,
        stub_bookings.clone(),
        recording.clone(),
    ));
    let verifier = TokenVerifier::new(&JwtConfig::default());

    let app = Router::new()
        .nest("/api/calificaciones", ratings::api::rest::router(service))
        .layer(Extension(verifier));
    (app, stub_bookings, recording)
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

async fn rate(
    app: &Router,
    token: &str,
    booking_id: i64,
    score: i16,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        "POST",
        "/api/calificaciones",
        Some(token),
        Some(json!({
            "bookingId": booking_id,
            "score": score,
            "comment": "Excelente cuidado"
        })),
    )
    .await
}

#[tokio::test]
async fn rating_a_finished_booking_flips_the_flag_and_pushes_the_average() {
    let (app, stub, recording) = test_app(false).await;
    let t = token(1, Role::Cliente);

    let (status, created) = rate(&app, &t, 10, 5).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    assert_eq!(created["bookingId"], 10);
    assert_eq!(created["clientId"], 1);
    assert_eq!(created["caregiverId"], 3);
    assert_eq!(created["score"], 5);
    assert_eq!(created["comment"], "Excelente cuidado");

    assert!(stub.rated(10));
    let pushes = recording.pushes.lock().unwrap();
    assert_eq!(pushes.as_slice(), &[(3, Decimal::from(5))]);
}

#[tokio::test]
async fn unfinished_bookings_cannot_be_rated() {
    let (app, stub, _) = test_app(false).await;
    let t = token(1, Role::Cliente);

    let (status, body) = rate(&app, &t, 11, 4).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "RATINGS_BOOKING_NOT_FINISHED");
    assert!(!stub.rated(11));
}

#[tokio::test]
async fn rating_twice_conflicts() {
    let (app, _, _) = test_app(false).await;
    let t = token(1, Role::Cliente);

    let (status, _) = rate(&app, &t, 10, 5).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = rate(&app, &t, 10, 3).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "RATINGS_ALREADY_RATED");
}

#[tokio::test]
async fn only_the_bookings_client_rates() {
    let (app, _, _) = test_app(false).await;

    // Someone else's booking and a missing booking answer identically.
    let (status, body) = rate(&app, &token(2, Role::Cliente), 10, 5).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "RATINGS_FORBIDDEN");
    let (status, body) = rate(&app, &token(2, Role::Cliente), 999, 5).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "RATINGS_FORBIDDEN");

    let (status, _) = rate(&app, &token(30, Role::Cuidador), 10, 5).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        "/api/calificaciones",
        None,
        Some(json!({ "bookingId": 10, "score": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn scores_and_comments_are_bounded() {
    let (app, _, _) = test_app(false).await;
    let t = token(1, Role::Cliente);

    for score in [0, 6] {
        let (status, body) = rate(&app, &t, 10, score).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("score"));
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/calificaciones",
        Some(&t),
        Some(json!({
            "bookingId": 10,
            "score": 5,
            "comment": "x".repeat(501)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("comment"));
}

#[tokio::test]
async fn averages_round_and_default_to_zero() {
    let (app, _, recording) = test_app(false).await;
    let t = token(1, Role::Cliente);

    let (status, avg) = send(
        &app,
        "GET",
        "/api/calificaciones/cuidador/3/promedio",
        Some(&t),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(avg, json!("0"));

    rate(&app, &t, 10, 5).await;
    rate(&app, &t, 12, 4).await;
    rate(&app, &t, 13, 4).await;

    let (status, avg) = send(
        &app,
        "GET",
        "/api/calificaciones/cuidador/3/promedio",
        Some(&t),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(avg, json!("4.33"));

    let pushes = recording.pushes.lock().unwrap();
    assert_eq!(pushes.len(), 3);
    assert_eq!(pushes[2], (3, Decimal::new(433, 2)));
}

#[tokio::test]
async fn lists_come_newest_first() {
    let (app, _, _) = test_app(false).await;
    let t = token(1, Role::Cliente);

    rate(&app, &t, 10, 5).await;
    rate(&app, &t, 12, 4).await;

    let (status, list) = send(
        &app,
        "GET",
        "/api/calificaciones/cuidador/3",
        Some(&t),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = list.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["bookingId"], 12);
    assert_eq!(rows[1]["bookingId"], 10);

    // A caregiver nobody rated lists empty.
    let (status, list) = send(
        &app,
        "GET",
        "/api/calificaciones/cuidador/777",
        Some(&t),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn cache_push_failures_do_not_block_the_rating() {
    let (app, stub, _) = test_app(true).await;
    let t = token(1, Role::Cliente);

    let (status, _) = rate(&app, &t, 10, 5).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(stub.rated(10));

    let (_, list) = send(
        &app,
        "GET",
        "/api/calificaciones/cuidador/3",
        Some(&t),
        None,
    )
    .await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}
