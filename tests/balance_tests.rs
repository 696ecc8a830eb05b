use actix_web::{http::StatusCode, test};
use guardias::database::models::{BalanceSummary, LedgerMovement, MovementKind};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;

#[macro_use]
mod common;

use common::{Balances, TestAssertions, TestContext};

#[actix_web::test]
#[serial]
async fn test_employee_reads_own_balances_only() {
    let ctx = TestContext::new().await.unwrap();
    let app = test_app!(ctx);
    let bombero = ctx
        .bombero(Balances {
            vacation_days: 22.0,
            ap_days: 6.0,
            sp_hours: 12.5,
            ..Default::default()
        })
        .await;
    let other = ctx.bombero(Balances::default()).await;

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/balances/{}", bombero.id))
            .insert_header(ctx.auth_header(&bombero))
    );
    assert_eq!(status, StatusCode::OK);
    let summary: BalanceSummary = TestAssertions::assert_success(&body);
    assert_eq!(summary.vacation_days, 22.0);
    assert_eq!(summary.ap_days, 6.0);
    assert_eq!(summary.sp_hours, 12.5);

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/balances/{}", bombero.id))
            .insert_header(ctx.auth_header(&other))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
#[serial]
async fn test_supervisor_adjusts_balances() {
    let ctx = TestContext::new().await.unwrap();
    let app = test_app!(ctx);
    let jefe = ctx.jefe().await;
    let bombero = ctx
        .bombero(Balances {
            union_hours: 4.0,
            ..Default::default()
        })
        .await;
    let uri = format!("/api/v1/balances/{}/adjust", bombero.id);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(ctx.auth_header(&jefe))
            .set_json(json!({ "balanceKind": "union_hours", "delta": 3.5 }))
    );
    assert_eq!(status, StatusCode::OK);
    let summary: BalanceSummary = TestAssertions::assert_success(&body);
    assert_eq!(summary.union_hours, 7.5);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(ctx.auth_header(&jefe))
            .set_json(json!({ "balanceKind": "union_hours", "delta": -10.0 }))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    TestAssertions::assert_error_code(&body, "insufficient_balance");
    assert_eq!(ctx.reload(&bombero).await.union_hours, 7.5);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(ctx.auth_header(&bombero))
            .set_json(json!({ "balanceKind": "union_hours", "delta": 100.0 }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/balances/{}/history", bombero.id))
            .insert_header(ctx.auth_header(&bombero))
    );
    assert_eq!(status, StatusCode::OK);
    let history: Vec<LedgerMovement> = TestAssertions::assert_success(&body);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].movement, MovementKind::Adjustment);
    assert_eq!(history[0].amount, 3.5);
    assert_eq!(history[0].request_id, None);
}

#[actix_web::test]
#[serial]
async fn test_balances_of_unknown_employee_are_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let app = test_app!(ctx);
    let jefe = ctx.jefe().await;

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/balances/{}", jefe.id + 100))
            .insert_header(ctx.auth_header(&jefe))
    );

    assert_eq!(status, StatusCode::NOT_FOUND);
    TestAssertions::assert_error_code(&body, "not_found");
}

#[actix_web::test]
#[serial]
async fn test_health_is_public() {
    let ctx = TestContext::new().await.unwrap();
    let app = test_app!(ctx);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/v1/health"));

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("ok"));
}
