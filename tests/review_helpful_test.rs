mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use http_body_util::BodyExt;
use safari_core::db::queries::{toggle_review_helpful, HelpfulAction};
use tower::ServiceExt;
use uuid::Uuid;

async fn live_vote_count(pool: &sqlx::PgPool, review_id: Uuid) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM review_helpful WHERE review_id = $1")
            .bind(review_id)
            .fetch_one(pool)
            .await
            .unwrap();
    count
}

async fn stored_helpful_count(pool: &sqlx::PgPool, review_id: Uuid) -> i32 {
    let (count,): (i32,) = sqlx::query_as("SELECT helpful_count FROM reviews WHERE id = $1")
        .bind(review_id)
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

#[tokio::test]
async fn toggling_alternates_and_counter_matches_rows() {
    let (pool, _container) = setup_test_db().await;

    let author = create_user(&pool, "USER").await;
    let voter = create_user(&pool, "USER").await;
    let agent_user = create_user(&pool, "AGENT").await;
    let agent = create_agent(&pool, agent_user, "0.7").await;
    let tour = create_tour(&pool, agent, "1000").await;
    let review = create_review(&pool, tour, author, 5, "APPROVED").await;

    for round in 0..4 {
        let (action, count) = toggle_review_helpful(&pool, review, voter).await.unwrap();
        let expected = if round % 2 == 0 {
            (HelpfulAction::Added, 1)
        } else {
            (HelpfulAction::Removed, 0)
        };
        assert_eq!((action, count), expected, "round {}", round);

        assert_eq!(
            stored_helpful_count(&pool, review).await as i64,
            live_vote_count(&pool, review).await,
            "counter must equal live row count after round {}",
            round
        );
    }
}

#[tokio::test]
async fn votes_from_distinct_users_accumulate() {
    let (pool, _container) = setup_test_db().await;

    let author = create_user(&pool, "USER").await;
    let agent_user = create_user(&pool, "AGENT").await;
    let agent = create_agent(&pool, agent_user, "0.7").await;
    let tour = create_tour(&pool, agent, "1000").await;
    let review = create_review(&pool, tour, author, 4, "APPROVED").await;

    for expected in 1..=3 {
        let voter = create_user(&pool, "USER").await;
        let (action, count) = toggle_review_helpful(&pool, review, voter).await.unwrap();
        assert_eq!(action, HelpfulAction::Added);
        assert_eq!(count, expected);
    }

    assert_eq!(stored_helpful_count(&pool, review).await, 3);
    assert_eq!(live_vote_count(&pool, review).await, 3);
}

#[tokio::test]
async fn self_vote_is_rejected() {
    let (pool, _container) = setup_test_db().await;

    let author = create_user(&pool, "USER").await;
    let agent_user = create_user(&pool, "AGENT").await;
    let agent = create_agent(&pool, agent_user, "0.7").await;
    let tour = create_tour(&pool, agent, "1000").await;
    let review = create_review(&pool, tour, author, 5, "APPROVED").await;
    let token = create_session(&pool, author).await;

    let app = safari_core::create_app(test_state(pool.clone()));
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/reviews/{}/helpful", review))
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("own review"));

    assert_eq!(stored_helpful_count(&pool, review).await, 0);
}

#[tokio::test]
async fn vote_requires_authentication() {
    let (pool, _container) = setup_test_db().await;

    let author = create_user(&pool, "USER").await;
    let agent_user = create_user(&pool, "AGENT").await;
    let agent = create_agent(&pool, agent_user, "0.7").await;
    let tour = create_tour(&pool, agent, "1000").await;
    let review = create_review(&pool, tour, author, 5, "APPROVED").await;

    let app = safari_core::create_app(test_state(pool.clone()));
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/reviews/{}/helpful", review))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn vote_on_missing_review_is_404() {
    let (pool, _container) = setup_test_db().await;

    let voter = create_user(&pool, "USER").await;
    let token = create_session(&pool, voter).await;

    let app = safari_core::create_app(test_state(pool.clone()));
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/reviews/{}/helpful", Uuid::new_v4()))
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
