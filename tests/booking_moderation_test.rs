mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

fn patch_request(path: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(path)
        .header("Authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn admin_patch_updates_fields_and_writes_audit_row() {
    let (pool, _container) = setup_test_db().await;

    let admin = create_user(&pool, "ADMIN").await;
    let token = create_session(&pool, admin).await;
    let traveler = create_user(&pool, "USER").await;
    let agent_user = create_user(&pool, "AGENT").await;
    let agent = create_agent(&pool, agent_user, "0.7").await;
    let tour = create_tour(&pool, agent, "1000").await;
    let booking = create_booking(&pool, tour, traveler, agent, "700", "PENDING").await;

    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .oneshot(patch_request(
            &format!("/api/admin/bookings/{}", booking),
            &token,
            json!({ "status": "CONFIRMED", "featured": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let updated: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated["status"], "CONFIRMED");
    assert_eq!(updated["featured"], true);

    let (action, actor_id, metadata): (String, Uuid, serde_json::Value) = sqlx::query_as(
        "SELECT action, actor_id, metadata FROM audit_logs WHERE resource = 'booking' AND resource_id = $1",
    )
    .bind(booking)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(action, "booking_update");
    assert_eq!(actor_id, admin);
    assert_eq!(metadata["status"]["old"], "PENDING");
    assert_eq!(metadata["status"]["new"], "CONFIRMED");
    assert_eq!(metadata["featured"]["new"], true);
}

#[tokio::test]
async fn any_prior_status_may_be_overwritten() {
    let (pool, _container) = setup_test_db().await;

    let admin = create_user(&pool, "ADMIN").await;
    let token = create_session(&pool, admin).await;
    let traveler = create_user(&pool, "USER").await;
    let agent_user = create_user(&pool, "AGENT").await;
    let agent = create_agent(&pool, agent_user, "0.7").await;
    let tour = create_tour(&pool, agent, "1000").await;
    let booking = create_booking(&pool, tour, traveler, agent, "700", "COMPLETED").await;

    // Backwards transition: nothing enforces the lifecycle ordering.
    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .oneshot(patch_request(
            &format!("/api/admin/bookings/{}", booking),
            &token,
            json!({ "status": "PENDING" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_status_value_is_rejected() {
    let (pool, _container) = setup_test_db().await;

    let admin = create_user(&pool, "ADMIN").await;
    let token = create_session(&pool, admin).await;
    let traveler = create_user(&pool, "USER").await;
    let agent_user = create_user(&pool, "AGENT").await;
    let agent = create_agent(&pool, agent_user, "0.7").await;
    let tour = create_tour(&pool, agent, "1000").await;
    let booking = create_booking(&pool, tour, traveler, agent, "700", "PENDING").await;

    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .oneshot(patch_request(
            &format!("/api/admin/bookings/{}", booking),
            &token,
            json!({ "status": "SHIPPED" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_patch_is_rejected() {
    let (pool, _container) = setup_test_db().await;

    let admin = create_user(&pool, "ADMIN").await;
    let token = create_session(&pool, admin).await;

    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .oneshot(patch_request(
            &format!("/api/admin/bookings/{}", Uuid::new_v4()),
            &token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_admin_is_forbidden() {
    let (pool, _container) = setup_test_db().await;

    let traveler = create_user(&pool, "USER").await;
    let token = create_session(&pool, traveler).await;

    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .oneshot(patch_request(
            &format!("/api/admin/bookings/{}", Uuid::new_v4()),
            &token,
            json!({ "status": "CONFIRMED" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn expired_session_is_unauthenticated() {
    let (pool, _container) = setup_test_db().await;

    let admin = create_user(&pool, "ADMIN").await;
    let token = create_expired_session(&pool, admin).await;

    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .oneshot(patch_request(
            &format!("/api/admin/bookings/{}", Uuid::new_v4()),
            &token,
            json!({ "status": "CONFIRMED" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_booking_is_404() {
    let (pool, _container) = setup_test_db().await;

    let admin = create_user(&pool, "ADMIN").await;
    let token = create_session(&pool, admin).await;

    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .oneshot(patch_request(
            &format!("/api/admin/bookings/{}", Uuid::new_v4()),
            &token,
            json!({ "status": "CONFIRMED" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn agent_cannot_touch_another_agents_booking() {
    let (pool, _container) = setup_test_db().await;

    let traveler = create_user(&pool, "USER").await;
    let owner_user = create_user(&pool, "AGENT").await;
    let owner = create_agent(&pool, owner_user, "0.7").await;
    let tour = create_tour(&pool, owner, "1000").await;
    let booking = create_booking(&pool, tour, traveler, owner, "700", "PENDING").await;

    let other_user = create_user(&pool, "AGENT").await;
    let _other = create_agent(&pool, other_user, "0.7").await;
    let token = create_session(&pool, other_user).await;

    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .oneshot(patch_request(
            &format!("/api/agent/bookings/{}", booking),
            &token,
            json!({ "status": "CONFIRMED" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
