use actix_web::{HttpResponse, Result, web};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::AppState;
use crate::database::models::{CopyMonthInput, SetAssignmentInput, YearMonth};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::ActorContext;

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub park_id: Option<i64>,
}

/// Brigade on guard at a park on a given day. `data` is null for an empty slot.
pub async fn get_guard(
    _actor: ActorContext,
    state: web::Data<AppState>,
    path: web::Path<(NaiveDate, i64)>,
) -> Result<HttpResponse> {
    let (date, park_id) = path.into_inner();
    let assignment = state.calendar_service.get_assignment(date, park_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(assignment)))
}

pub async fn set_guard(
    actor: ActorContext,
    state: web::Data<AppState>,
    path: web::Path<(NaiveDate, i64)>,
    input: web::Json<SetAssignmentInput>,
) -> Result<HttpResponse> {
    let (date, park_id) = path.into_inner();
    let input = input.into_inner();

    let assignment = state
        .calendar_service
        .set_assignment(&actor, date, park_id, input.brigade_id, input.expected_version)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(assignment)))
}

pub async fn get_month(
    _actor: ActorContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse> {
    let month = path
        .parse::<YearMonth>()
        .map_err(AppError::Validation)?;

    let assignments = state
        .calendar_service
        .list_month(month, query.park_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(assignments)))
}

/// Replicate one month's guards onto another, empty, month
pub async fn copy_month(
    actor: ActorContext,
    state: web::Data<AppState>,
    input: web::Json<CopyMonthInput>,
) -> Result<HttpResponse> {
    let result = state
        .calendar_service
        .copy_month(&actor, input.source, input.target)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(result)))
}
