mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

fn json_request(method: &str, path: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("Authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_request(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn verification_promotes_pending_agent_and_is_audited() {
    let (pool, _container) = setup_test_db().await;

    let admin = create_user(&pool, "ADMIN").await;
    let token = create_session(&pool, admin).await;
    let agent_user = create_user(&pool, "AGENT").await;
    let agent = create_agent(&pool, agent_user, "0.7").await;
    sqlx::query("UPDATE agents SET is_verified = FALSE, status = 'PENDING' WHERE id = $1")
        .bind(agent)
        .execute(&pool)
        .await
        .unwrap();

    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/admin/agents/{}/verify", agent),
            &token,
            json!({ "verified": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let updated: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated["is_verified"], true);
    assert_eq!(updated["status"], "ACTIVE");

    let (action,): (String,) = sqlx::query_as(
        "SELECT action FROM audit_logs WHERE resource = 'agent' AND resource_id = $1",
    )
    .bind(agent)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(action, "agent_verify");
}

#[tokio::test]
async fn unverifying_keeps_status() {
    let (pool, _container) = setup_test_db().await;

    let admin = create_user(&pool, "ADMIN").await;
    let token = create_session(&pool, admin).await;
    let agent_user = create_user(&pool, "AGENT").await;
    let agent = create_agent(&pool, agent_user, "0.7").await;

    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/admin/agents/{}/verify", agent),
            &token,
            json!({ "verified": false }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let updated: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated["is_verified"], false);
    assert_eq!(updated["status"], "ACTIVE");
}

#[tokio::test]
async fn earnings_report_classifies_tier_and_balance() {
    let (pool, _container) = setup_test_db().await;

    let agent_user = create_user(&pool, "AGENT").await;
    let agent = create_agent(&pool, agent_user, "0.7").await;
    let token = create_session(&pool, agent_user).await;
    let tour = create_tour(&pool, agent, "1000").await;
    let traveler = create_user(&pool, "USER").await;
    create_booking(&pool, tour, traveler, agent, "400", "COMPLETED").await;
    create_booking(&pool, tour, traveler, agent, "200", "CONFIRMED").await;
    create_booking(&pool, tour, traveler, agent, "999", "CANCELLED").await;

    sqlx::query(
        "INSERT INTO commission_tiers (name, min_bookings, min_revenue, commission_rate) \
         VALUES ('bronze', 0, 0, 0.70), ('silver', 2, 500, 0.75)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .oneshot(get_request("/api/agent/earnings", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let earnings: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(earnings["booking_count"], 2);
    assert_eq!(earnings["tier"], "silver");
}

#[tokio::test]
async fn withdrawal_over_balance_is_rejected() {
    let (pool, _container) = setup_test_db().await;

    let agent_user = create_user(&pool, "AGENT").await;
    let agent = create_agent(&pool, agent_user, "0.7").await;
    let token = create_session(&pool, agent_user).await;
    let tour = create_tour(&pool, agent, "1000").await;
    let traveler = create_user(&pool, "USER").await;
    create_booking(&pool, tour, traveler, agent, "300", "COMPLETED").await;

    let app = safari_core::create_app(test_state(pool.clone()));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/agent/withdrawals",
            &token,
            json!({ "amount": "500" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/agent/withdrawals",
            &token,
            json!({ "amount": "200" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The open request reserves its amount.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/agent/withdrawals",
            &token,
            json!({ "amount": "150" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_processes_pending_withdrawal_once() {
    let (pool, _container) = setup_test_db().await;

    let admin = create_user(&pool, "ADMIN").await;
    let admin_token = create_session(&pool, admin).await;
    let agent_user = create_user(&pool, "AGENT").await;
    let agent = create_agent(&pool, agent_user, "0.7").await;

    let (withdrawal,): (Uuid,) = sqlx::query_as(
        "INSERT INTO withdrawal_requests (agent_id, amount) VALUES ($1, 150) RETURNING id",
    )
    .bind(agent)
    .fetch_one(&pool)
    .await
    .unwrap();

    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/admin/withdrawals/{}", withdrawal),
            &admin_token,
            json!({ "status": "COMPLETED" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let processed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(processed["status"], "COMPLETED");
    assert!(!processed["processed_at"].is_null());

    // A second attempt finds the request no longer pending.
    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/admin/withdrawals/{}", withdrawal),
            &admin_token,
            json!({ "status": "REJECTED" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn withdrawal_status_value_is_validated() {
    let (pool, _container) = setup_test_db().await;

    let admin = create_user(&pool, "ADMIN").await;
    let admin_token = create_session(&pool, admin).await;

    let app = safari_core::create_app(test_state(pool.clone()));
    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/admin/withdrawals/{}", Uuid::new_v4()),
            &admin_token,
            json!({ "status": "PENDING" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
