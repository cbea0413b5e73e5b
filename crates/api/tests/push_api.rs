//! Integration tests for `POST /push`.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, post, BlockingGateway, SlowGateway, StubGateway};
use herald_core::record::NotificationStatus;
use herald_db::in_memory_pool;
use herald_db::repositories::EmployeeRepo;

#[tokio::test]
async fn push_sends_pending_and_marks_them_sent() {
    let pool = in_memory_pool().await.unwrap();
    let a = EmployeeRepo::create(&pool, "0241111111", None).await.unwrap();
    let b = EmployeeRepo::create(&pool, "0242222222", Some(NotificationStatus::Pending))
        .await
        .unwrap();
    EmployeeRepo::create(&pool, "0243333333", Some(NotificationStatus::Sent))
        .await
        .unwrap();
    let app = common::build_test_app(pool.clone(), Arc::new(StubGateway::default()));

    let response = post(app, "/push").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["summary"]["total"], 2);
    assert_eq!(json["summary"]["send_succeeded"], 2);
    assert_eq!(json["summary"]["status_updated"], 2);
    assert_eq!(json["summary"]["failures"].as_array().unwrap().len(), 0);
    assert_eq!(json["total_employees_with_status_sent"], 3);

    let updated = json["updated_employees"].as_array().unwrap();
    assert_eq!(updated.len(), 2);
    for entry in updated {
        assert_eq!(entry["send_succeeded"], true);
        assert_eq!(entry["status_updated"], true);
        assert!(entry.get("error_detail").is_none());
    }

    for id in [a, b] {
        let employee = EmployeeRepo::find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(employee.status.as_deref(), Some("Y"));
    }
}

#[tokio::test]
async fn rejected_send_is_reported_and_left_pending() {
    let pool = in_memory_pool().await.unwrap();
    EmployeeRepo::create(&pool, "0241111111", None).await.unwrap();
    let rejected = EmployeeRepo::create(&pool, "0200000000", None).await.unwrap();
    let app = common::build_test_app(
        pool.clone(),
        Arc::new(StubGateway::rejecting(&["0200000000"])),
    );

    let json = body_json(post(app, "/push").await).await;

    assert_eq!(json["summary"]["total"], 2);
    assert_eq!(json["summary"]["status_updated"], 1);
    let failures = json["summary"]["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["record_id"], rejected);
    assert_eq!(failures[0]["failure"], "REJECTED");
    assert_eq!(failures[0]["send_succeeded"], false);
    assert_eq!(json["total_employees_with_status_sent"], 1);

    let employee = EmployeeRepo::find_by_id(&pool, rejected).await.unwrap().unwrap();
    assert_eq!(employee.status, None);
}

#[tokio::test]
async fn second_push_finds_nothing_to_send() {
    let pool = in_memory_pool().await.unwrap();
    EmployeeRepo::create(&pool, "0241111111", None).await.unwrap();
    let app = common::build_test_app(pool, Arc::new(StubGateway::default()));

    let first = body_json(post(app.clone(), "/push").await).await;
    assert_eq!(first["summary"]["status_updated"], 1);

    let second = body_json(post(app, "/push").await).await;
    assert_eq!(second["summary"]["total"], 0);
    assert_eq!(second["updated_employees"].as_array().unwrap().len(), 0);
    assert_eq!(second["total_employees_with_status_sent"], 1);
}

#[tokio::test]
async fn overlapping_push_returns_409() {
    let pool = in_memory_pool().await.unwrap();
    EmployeeRepo::create(&pool, "0241111111", None).await.unwrap();
    let gateway = Arc::new(BlockingGateway::default());
    let app = common::build_test_app(pool, gateway.clone());

    let first = tokio::spawn(post(app.clone(), "/push"));
    gateway.entered.notified().await;

    let response = post(app, "/push").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "RUN_IN_PROGRESS");

    gateway.release.notify_one();
    let first = first.await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
}

#[tokio::test]
async fn unavailable_store_returns_503() {
    let pool = in_memory_pool().await.unwrap();
    let app = common::build_test_app(pool.clone(), Arc::new(StubGateway::default()));
    pool.close().await;

    let response = post(app, "/push").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = body_json(response).await;
    assert_eq!(json["code"], "STORE_UNAVAILABLE");
    assert_eq!(json["error"], "The record store is unavailable");
}

#[tokio::test]
async fn push_is_not_cut_off_by_request_timeout() {
    let pool = in_memory_pool().await.unwrap();
    let id = EmployeeRepo::create(&pool, "0241111111", None).await.unwrap();
    let gateway = Arc::new(SlowGateway::new(Duration::from_millis(1500)));
    let config = herald_api::config::ServerConfig {
        request_timeout_secs: 1,
        ..common::test_config()
    };
    let app = common::build_test_app_with_config(pool.clone(), gateway.clone(), config);

    let response = post(app, "/push").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["summary"]["total"], 1);
    assert_eq!(json["summary"]["status_updated"], 1);
    assert_eq!(gateway.finished.load(Ordering::SeqCst), 1);

    let employee = EmployeeRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(employee.status.as_deref(), Some("Y"));
}

#[tokio::test]
async fn dropped_request_lets_in_flight_record_finish() {
    let pool = in_memory_pool().await.unwrap();
    let id = EmployeeRepo::create(&pool, "0241111111", None).await.unwrap();
    let gateway = Arc::new(SlowGateway::new(Duration::from_millis(300)));
    let app = common::build_test_app(pool.clone(), gateway.clone());

    // The client goes away while the send is in flight.
    tokio::select! {
        _ = post(app, "/push") => panic!("push answered before the gateway"),
        _ = gateway.entered.notified() => {}
    }

    let mut status = None;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        status = EmployeeRepo::find_by_id(&pool, id).await.unwrap().unwrap().status;
        if status.is_some() {
            break;
        }
    }

    assert_eq!(gateway.finished.load(Ordering::SeqCst), 1);
    assert_eq!(status.as_deref(), Some("Y"));
}

#[tokio::test]
async fn health_check_still_answers_during_a_long_push() {
    let pool = in_memory_pool().await.unwrap();
    EmployeeRepo::create(&pool, "0241111111", None).await.unwrap();
    let gateway = Arc::new(BlockingGateway::default());
    let app = common::build_test_app(pool, gateway.clone());

    let run = tokio::spawn(post(app.clone(), "/push"));
    gateway.entered.notified().await;

    let health = common::get(app, "/health").await;
    assert_eq!(health.status(), StatusCode::OK);

    gateway.release.notify_one();
    assert_eq!(run.await.unwrap().status(), StatusCode::OK);
}
