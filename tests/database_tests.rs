use guardias::AppError;
use guardias::database::models::{
    BalanceKind, BrigadeTransferInput, LeaveRequestInput, LeaveType, Turno, YearMonth,
};
use guardias::database::repositories::{
    GuardRepository, LeaveRequestRepository, LedgerRepository, ReserveOutcome,
};
use pretty_assertions::assert_eq;
use serial_test::serial;

mod common;

use common::{Balances, TestAssertions, TestContext, date};

fn month(s: &str) -> YearMonth {
    s.parse().unwrap()
}

async fn leave_request(ctx: &TestContext, employee_id: i64) -> i64 {
    LeaveRequestRepository::new(ctx.pool().clone())
        .create(
            &LeaveRequestInput {
                employee_id,
                leave_type: LeaveType::AsuntosPropios,
                date_start: date("2025-04-02"),
                date_end: None,
                turno: Some(Turno::MananaYTarde),
                start_time: None,
                end_time: None,
                hours: None,
            },
            None,
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
#[serial]
async fn test_reserve_is_idempotent_per_request() {
    let ctx = TestContext::new().await.unwrap();
    let bombero = ctx
        .bombero(Balances {
            ap_days: 5.0,
            ..Default::default()
        })
        .await;
    let request_id = leave_request(&ctx, bombero.id).await;

    let mut conn = ctx.pool().acquire().await.unwrap();
    let first = LedgerRepository::reserve(&mut conn, request_id, bombero.id, BalanceKind::ApDays, 2.0)
        .await
        .unwrap();
    let second =
        LedgerRepository::reserve(&mut conn, request_id, bombero.id, BalanceKind::ApDays, 2.0)
            .await
            .unwrap();
    drop(conn);

    assert_eq!(first, ReserveOutcome::Reserved);
    assert_eq!(second, ReserveOutcome::AlreadyReserved);
    assert_eq!(ctx.reload(&bombero).await.ap_days, 3.0);
}

#[tokio::test]
#[serial]
async fn test_insufficient_reserve_rolls_back_with_its_transaction() {
    let ctx = TestContext::new().await.unwrap();
    let bombero = ctx
        .bombero(Balances {
            ap_days: 1.0,
            ..Default::default()
        })
        .await;
    let request_id = leave_request(&ctx, bombero.id).await;

    let mut tx = ctx.pool().begin().await.unwrap();
    let outcome =
        LedgerRepository::reserve(&mut *tx, request_id, bombero.id, BalanceKind::ApDays, 2.0)
            .await
            .unwrap();
    drop(tx);

    assert_eq!(outcome, ReserveOutcome::Insufficient { remaining: 1.0 });
    assert_eq!(ctx.reload(&bombero).await.ap_days, 1.0);
    TestAssertions::assert_record_count(ctx.pool(), "ledger_movements", 0).await;
}

#[tokio::test]
#[serial]
async fn test_release_without_reservation_is_a_no_op() {
    let ctx = TestContext::new().await.unwrap();
    let bombero = ctx.bombero(Balances::default()).await;
    let request_id = leave_request(&ctx, bombero.id).await;

    let mut conn = ctx.pool().acquire().await.unwrap();
    assert!(!LedgerRepository::release(&mut conn, request_id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_copy_month_collision_surfaces_as_conflict() {
    let ctx = TestContext::new().await.unwrap();
    let park = ctx.park("Parque Norte").await;
    let brigade = ctx.brigade("Brigada A", &park).await;
    ctx.put_on_guard(&park, &brigade, &["2025-01-03", "2025-01-20", "2025-02-20"])
        .await;

    let mut tx = ctx.pool().begin().await.unwrap();
    let result = GuardRepository::copy_month(&mut *tx, month("2025-01"), month("2025-02")).await;
    drop(tx);

    let error = AppError::from(result.unwrap_err());
    assert!(matches!(error, AppError::Conflict(_)), "{:?}", error);
    TestAssertions::assert_record_count(ctx.pool(), "guard_assignments", 3).await;
}

#[tokio::test]
#[serial]
async fn test_writer_arriving_mid_copy_waits_and_finds_the_slot_taken() {
    let ctx = TestContext::new().await.unwrap();
    let park = ctx.park("Parque Norte").await;
    let brigade_a = ctx.brigade("Brigada A", &park).await;
    let brigade_b = ctx.brigade("Brigada B", &park).await;
    ctx.put_on_guard(&park, &brigade_a, &["2025-01-03", "2025-01-20"])
        .await;

    let mut tx = ctx.pool().begin_with("BEGIN IMMEDIATE").await.unwrap();
    assert_eq!(
        GuardRepository::count_in_month(&mut *tx, month("2025-02")).await.unwrap(),
        0
    );

    let guards = ctx.guards();
    let (park_id, brigade_id) = (park.id, brigade_b.id);
    let late_writer = tokio::spawn(async move {
        guards
            .insert_assignment(date("2025-02-03"), park_id, brigade_id)
            .await
    });
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let copied = GuardRepository::copy_month(&mut *tx, month("2025-01"), month("2025-02"))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(copied, 2);
    assert!(late_writer.await.unwrap().unwrap().is_none());

    let feb_third = ctx
        .guards()
        .get_assignment(date("2025-02-03"), park.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(feb_third.brigade_id, brigade_a.id);
    TestAssertions::assert_record_count(ctx.pool(), "guard_assignments", 4).await;
}

#[tokio::test]
#[serial]
async fn test_same_day_transfers_resolve_by_turno() {
    let ctx = TestContext::new().await.unwrap();
    let park = ctx.park("Parque Norte").await;
    let brigade_a = ctx.brigade("Brigada A", &park).await;
    let brigade_b = ctx.brigade("Brigada B", &park).await;
    let bombero = ctx.bombero(Balances::default()).await;
    let guards = ctx.guards();

    for (turno, brigade) in [(Turno::Manana, &brigade_a), (Turno::Tarde, &brigade_b)] {
        guards
            .insert_transfer(&BrigadeTransferInput {
                employee_id: bombero.id,
                from_brigade_id: None,
                to_brigade_id: brigade.id,
                effective_month: month("2025-03"),
                turno: Some(turno),
            })
            .await
            .unwrap();
    }

    let in_force = guards
        .transfer_in_force(bombero.id, date("2025-03-15"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(in_force.to_brigade_id, brigade_b.id);
    assert_eq!(in_force.turno, Some(Turno::Tarde));

    let duplicate = guards
        .insert_transfer(&BrigadeTransferInput {
            employee_id: bombero.id,
            from_brigade_id: None,
            to_brigade_id: brigade_a.id,
            effective_month: month("2025-03"),
            turno: Some(Turno::Tarde),
        })
        .await;
    assert!(matches!(
        duplicate.map_err(AppError::from),
        Err(AppError::Conflict(_))
    ));
}
