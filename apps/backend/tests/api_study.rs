//! Study API tests.
//!
//! Tests marked `requires database` need a running PostgreSQL database.
//! Set DATABASE_URL environment variable before running them.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;

use common::fixtures;
use common::TestContext;

/// Test the first Good grade of a new item.
#[tokio::test]
#[ignore = "requires database"]
async fn test_review_new_item_good() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;
    let item = fixtures::unique_item_key("你好");

    let response = server
        .post("/api/study/review")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::submit_review_request(&item, "good"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    assert_eq!(body["item_key"], item);
    assert_eq!(body["state"]["interval"], 1);
    assert_eq!(body["state"]["repetitions"], 1);
    assert_eq!(body["state"]["easeFactor"], 2.5);
    assert_eq!(body["state"]["lastPerformance"], "good");
    assert_eq!(body["status"]["isNew"], false);
    assert_eq!(body["status"]["isDue"], false);
    assert_eq!(body["status"]["daysUntilDue"], 1);

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test that grades build on the stored state across requests.
#[tokio::test]
#[ignore = "requires database"]
async fn test_review_sequence_uses_stored_state() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;
    let item = fixtures::unique_item_key("学习");

    for expected_interval in [1, 6, 15] {
        let response = server
            .post("/api/study/review")
            .add_header(
                axum::http::header::AUTHORIZATION,
                TestContext::auth_header_value(&token),
            )
            .json(&fixtures::submit_review_request(&item, "good"))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["state"]["interval"], expected_interval);

        ctx.advance_days(expected_interval);
    }

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test Again resets repetitions and lowers ease.
#[tokio::test]
#[ignore = "requires database"]
async fn test_review_again_resets() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;
    let item = fixtures::unique_item_key("xie4xie");

    for performance in ["good", "good", "again"] {
        server
            .post("/api/study/review")
            .add_header(
                axum::http::header::AUTHORIZATION,
                TestContext::auth_header_value(&token),
            )
            .json(&fixtures::submit_review_request(&item, performance))
            .await
            .assert_status_ok();
    }

    let response = server
        .get(&format!("/api/study/status/{}", item))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"]["repetitions"], 0);
    assert_eq!(body["status"]["lastPerformance"], "again");
    let ease = body["status"]["easeFactor"].as_f64().unwrap();
    assert!((ease - 2.3).abs() < 1e-9);

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test an unknown grade name is rejected without storing anything.
#[tokio::test]
#[ignore = "requires database"]
async fn test_review_invalid_performance() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;
    let item = fixtures::unique_item_key("错");

    let response = server
        .post("/api/study/review")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::submit_review_request(&item, "perfect"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.db.get_review_state(device_id, &item).await.unwrap().is_none());

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test a blank item key is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_review_blank_item_key() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;

    let response = server
        .post("/api/study/review")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::submit_review_request("   ", "good"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test status of a never-reviewed item.
#[tokio::test]
#[ignore = "requires database"]
async fn test_status_new_item() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;

    let response = server
        .get("/api/study/status/unseen-item")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["item_key"], "unseen-item");
    assert_eq!(body["status"]["isNew"], true);
    assert_eq!(body["status"]["isDue"], true);
    assert_eq!(body["status"]["daysUntilDue"], 0);
    assert_eq!(body["status"]["repetitions"], 0);
    assert_eq!(body["status"]["easeFactor"], 2.5);
    assert_eq!(body["status"]["lastPerformance"], "none");

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test an item becomes due once the clock reaches its next review.
#[tokio::test]
#[ignore = "requires database"]
async fn test_status_becomes_due() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;
    let item = fixtures::unique_item_key("peng2you");

    server
        .post("/api/study/review")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::submit_review_request(&item, "good"))
        .await
        .assert_status_ok();

    ctx.advance_days(1);

    let response = server
        .get(&format!("/api/study/status/{}", item))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"]["isNew"], false);
    assert_eq!(body["status"]["isDue"], true);
    assert_eq!(body["status"]["daysUntilDue"], 0);

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test the review log records each grade in order.
#[tokio::test]
#[ignore = "requires database"]
async fn test_history_records_reviews() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;
    let item = fixtures::unique_item_key("shui3");

    for performance in ["hard", "easy"] {
        server
            .post("/api/study/review")
            .add_header(
                axum::http::header::AUTHORIZATION,
                TestContext::auth_header_value(&token),
            )
            .json(&fixtures::submit_review_request(&item, performance))
            .await
            .assert_status_ok();
        ctx.advance_days(1);
    }

    let response = server
        .get(&format!("/api/study/history/{}", item))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;

    response.assert_status_ok();
    let body: Vec<serde_json::Value> = response.json();
    assert_eq!(body.len(), 2);
    assert_eq!(body[0]["performance"], "hard");
    assert!(body[0]["interval_before"].is_null());
    assert_eq!(body[1]["performance"], "easy");
    assert_eq!(body[1]["interval_before"], body[0]["interval_after"]);

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test queue ordering: new items first, then most overdue.
#[tokio::test]
#[ignore = "requires database"]
async fn test_queue_prioritizes_new_then_overdue() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;

    let early = fixtures::unique_item_key("早");
    let late = fixtures::unique_item_key("晚");
    let fresh = fixtures::unique_item_key("新");

    // `early` is reviewed two days before `late`, so it ends up more overdue.
    for item in [&early, &late] {
        server
            .post("/api/study/review")
            .add_header(
                axum::http::header::AUTHORIZATION,
                TestContext::auth_header_value(&token),
            )
            .json(&fixtures::submit_review_request(item, "good"))
            .await
            .assert_status_ok();
        ctx.advance_days(2);
    }

    let response = server
        .post("/api/study/queue")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::queue_request(
            &[late.as_str(), early.as_str(), fresh.as_str()],
            false,
            None,
        ))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let keys: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["item_key"].as_str().unwrap())
        .collect();

    assert_eq!(keys, vec![fresh.as_str(), early.as_str(), late.as_str()]);
    assert_eq!(body["available"], 3);

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test the due filter and limit.
#[tokio::test]
#[ignore = "requires database"]
async fn test_queue_only_due_with_limit() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;

    let reviewed = fixtures::unique_item_key("书");
    let first_new = fixtures::unique_item_key("猫");
    let second_new = fixtures::unique_item_key("狗");

    server
        .post("/api/study/review")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::submit_review_request(&reviewed, "good"))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/study/queue")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::queue_request(
            &[reviewed.as_str(), first_new.as_str(), second_new.as_str()],
            true,
            Some(1),
        ))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let items = body["items"].as_array().unwrap();

    // The reviewed item is not due yet; both new items are.
    assert_eq!(body["available"], 2);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["item_key"], first_new);
    assert_eq!(items[0]["status"]["isNew"], true);

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test stats over a device's reviewed items.
#[tokio::test]
#[ignore = "requires database"]
async fn test_stats_summary() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;

    for (character, performance) in [("一", "good"), ("二", "again")] {
        server
            .post("/api/study/review")
            .add_header(
                axum::http::header::AUTHORIZATION,
                TestContext::auth_header_value(&token),
            )
            .json(&fixtures::submit_review_request(
                &fixtures::unique_item_key(character),
                performance,
            ))
            .await
            .assert_status_ok();
    }

    ctx.advance_days(1);

    let response = server
        .get("/api/stats")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 2);
    assert_eq!(body["new"], 0);
    assert_eq!(body["due"], 2);

    // Cleanup
    ctx.cleanup_device(device_id).await;
}
