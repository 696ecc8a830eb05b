use actix_web::{http::StatusCode, test};
use guardias::database::models::{Action, EntityType, ShiftChangeRequest, ShiftChangeStatus};
use guardias::database::repositories::ActivityRepository;
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;

#[macro_use]
mod common;

use common::{Balances, TestAssertions, TestContext};

#[actix_web::test]
#[serial]
async fn test_mirror_swap_full_approval() {
    let ctx = TestContext::new().await.unwrap();
    let app = test_app!(ctx);
    let jefe = ctx.jefe().await;
    let initiator = ctx.bombero(Balances::default()).await;
    let counterpart = ctx.bombero(Balances::default()).await;

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/shift-changes")
            .insert_header(ctx.auth_header(&initiator))
            .set_json(json!({
                "employeeId1": initiator.id,
                "employeeId2": counterpart.id,
                "date": "2025-03-10",
                "date2": "2025-03-17",
                "turno": "Día Completo",
                "motivo": "Boda familiar"
            }))
    );
    assert_eq!(status, StatusCode::CREATED);
    let request: ShiftChangeRequest = TestAssertions::assert_success(&body);
    assert_eq!(request.status, ShiftChangeStatus::EnTramite);
    assert!(request.is_mirror());

    let uri = format!("/api/v1/shift-changes/{}/status", request.id);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(ctx.auth_header(&counterpart))
            .set_json(json!({ "status": "aceptado_por_empleados" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("aceptado_por_empleados"));

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(ctx.auth_header(&jefe))
            .set_json(json!({ "status": "aceptado" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("aceptado"));

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(ctx.auth_header(&initiator))
            .set_json(json!({ "status": "rechazado" }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    TestAssertions::assert_error_code(&body, "invalid_state_transition");

    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/shift-changes/{}", request.id))
            .insert_header(ctx.auth_header(&initiator))
    );
    let current: ShiftChangeRequest = TestAssertions::assert_success(&body);
    assert_eq!(current.status, ShiftChangeStatus::Aceptado);

    let trail = ActivityRepository::new(ctx.pool().clone())
        .for_entity(EntityType::SHIFT_CHANGE, &request.id.to_string())
        .await
        .unwrap();
    let actions: Vec<_> = trail.iter().map(|a| a.action.as_str()).collect();
    assert_eq!(
        actions,
        vec![Action::CREATED, Action::STATUS_CHANGED, Action::STATUS_CHANGED]
    );
    assert_eq!(trail[2].actor_id, Some(jefe.id));
}

#[actix_web::test]
#[serial]
async fn test_rejected_swap_is_final() {
    let ctx = TestContext::new().await.unwrap();
    let app = test_app!(ctx);
    let jefe = ctx.jefe().await;
    let initiator = ctx.bombero(Balances::default()).await;
    let counterpart = ctx.bombero(Balances::default()).await;

    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/shift-changes")
            .insert_header(ctx.auth_header(&initiator))
            .set_json(json!({
                "employeeId1": initiator.id,
                "employeeId2": counterpart.id,
                "date": "2025-04-14",
                "turno": "Noche"
            }))
    );
    let request: ShiftChangeRequest = TestAssertions::assert_success(&body);
    let uri = format!("/api/v1/shift-changes/{}/status", request.id);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(ctx.auth_header(&counterpart))
            .set_json(json!({ "status": "rechazado" }))
    );
    assert_eq!(status, StatusCode::OK);

    for (actor, target) in [
        (&counterpart, "aceptado_por_empleados"),
        (&jefe, "aceptado"),
        (&jefe, "en_tramite"),
        (&initiator, "rechazado"),
    ] {
        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri(&uri)
                .insert_header(ctx.auth_header(actor))
                .set_json(json!({ "status": target }))
        );
        assert_eq!(status, StatusCode::CONFLICT, "moving to {}", target);
        TestAssertions::assert_error_code(&body, "invalid_state_transition");
    }

    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/shift-changes/{}", request.id))
            .insert_header(ctx.auth_header(&jefe))
    );
    let current: ShiftChangeRequest = TestAssertions::assert_success(&body);
    assert_eq!(current.status, ShiftChangeStatus::Rechazado);
}

#[actix_web::test]
#[serial]
async fn test_initiator_cannot_accept_on_behalf_of_counterpart() {
    let ctx = TestContext::new().await.unwrap();
    let app = test_app!(ctx);
    let initiator = ctx.bombero(Balances::default()).await;
    let counterpart = ctx.bombero(Balances::default()).await;
    let outsider = ctx.bombero(Balances::default()).await;

    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/shift-changes")
            .insert_header(ctx.auth_header(&initiator))
            .set_json(json!({
                "employeeId1": initiator.id,
                "employeeId2": counterpart.id,
                "date": "2025-04-14",
                "turno": "Mañana"
            }))
    );
    let request: ShiftChangeRequest = TestAssertions::assert_success(&body);
    let uri = format!("/api/v1/shift-changes/{}/status", request.id);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(ctx.auth_header(&initiator))
            .set_json(json!({ "status": "aceptado_por_empleados" }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(ctx.auth_header(&outsider))
            .set_json(json!({ "status": "rechazado" }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    TestAssertions::assert_error_code(&body, "forbidden");

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/shift-changes")
            .insert_header(ctx.auth_header(&outsider))
    );
    assert_eq!(status, StatusCode::OK);
    let visible: Vec<ShiftChangeRequest> = TestAssertions::assert_success(&body);
    assert!(visible.is_empty());

    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/shift-changes?status=en_tramite")
            .insert_header(ctx.auth_header(&counterpart))
    );
    let visible: Vec<ShiftChangeRequest> = TestAssertions::assert_success(&body);
    assert_eq!(visible.len(), 1);
}

#[actix_web::test]
#[serial]
async fn test_mirror_dates_too_far_apart_are_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let app = test_app!(ctx);
    let initiator = ctx.bombero(Balances::default()).await;
    let counterpart = ctx.bombero(Balances::default()).await;

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/shift-changes")
            .insert_header(ctx.auth_header(&initiator))
            .set_json(json!({
                "employeeId1": initiator.id,
                "employeeId2": counterpart.id,
                "date": "2025-03-10",
                "date2": "2025-03-31",
                "turno": "Tarde"
            }))
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_error_code(&body, "validation_error");
    TestAssertions::assert_record_count(ctx.pool(), "shift_change_requests", 0).await;
}

#[actix_web::test]
#[serial]
async fn test_mirror_gap_is_checked_at_the_earliest_calendar_dates() {
    let ctx = TestContext::new().await.unwrap();
    let app = test_app!(ctx);
    let initiator = ctx.bombero(Balances::default()).await;
    let counterpart = ctx.bombero(Balances::default()).await;
    let first = chrono::NaiveDate::MIN;
    let second = first.checked_add_days(chrono::Days::new(14)).unwrap();

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/shift-changes")
            .insert_header(ctx.auth_header(&initiator))
            .set_json(json!({
                "employeeId1": initiator.id,
                "employeeId2": counterpart.id,
                "date": first.to_string(),
                "date2": second.to_string(),
                "turno": "Noche"
            }))
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_error_code(&body, "validation_error");
    TestAssertions::assert_record_count(ctx.pool(), "shift_change_requests", 0).await;
}

#[actix_web::test]
#[serial]
async fn test_swap_with_unknown_employee_is_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let app = test_app!(ctx);
    let initiator = ctx.bombero(Balances::default()).await;

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/shift-changes")
            .insert_header(ctx.auth_header(&initiator))
            .set_json(json!({
                "employeeId1": initiator.id,
                "employeeId2": initiator.id + 999,
                "date": "2025-03-10",
                "turno": "Tarde"
            }))
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_error_code(&body, "validation_error");
}
