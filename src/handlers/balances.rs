use actix_web::{HttpResponse, Result, web};

use crate::AppState;
use crate::database::models::BalanceAdjustmentInput;
use crate::handlers::shared::ApiResponse;
use crate::services::ActorContext;

/// Remaining allowances of an employee
pub async fn get_balances(
    actor: ActorContext,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let summary = state
        .ledger_service
        .summary(&actor, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

/// Reservations, releases and manual adjustments, newest first
pub async fn get_balance_history(
    actor: ActorContext,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let history = state
        .ledger_service
        .history(&actor, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(history)))
}

pub async fn adjust_balance(
    actor: ActorContext,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    input: web::Json<BalanceAdjustmentInput>,
) -> Result<HttpResponse> {
    let summary = state
        .ledger_service
        .adjust(&actor, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(summary),
        "Balance adjusted",
    )))
}
