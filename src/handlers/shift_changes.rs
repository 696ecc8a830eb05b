use actix_web::{HttpResponse, Result, web};
use serde::Deserialize;

use crate::AppState;
use crate::database::models::{ShiftChangeInput, ShiftChangeStatus, ShiftChangeStatusUpdate};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::ActorContext;

#[derive(Debug, Deserialize)]
pub struct ShiftChangeQuery {
    pub employee_id: Option<i64>,
    pub status: Option<String>,
}

/// Request a shift change with another employee
pub async fn create_shift_change(
    actor: ActorContext,
    state: web::Data<AppState>,
    input: web::Json<ShiftChangeInput>,
) -> Result<HttpResponse> {
    let request = state
        .shift_change_service
        .create(&actor, input.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

pub async fn get_shift_changes(
    actor: ActorContext,
    state: web::Data<AppState>,
    query: web::Query<ShiftChangeQuery>,
) -> Result<HttpResponse> {
    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<ShiftChangeStatus>().map_err(AppError::Validation))
        .transpose()?;

    let requests = state
        .shift_change_service
        .list(&actor, query.employee_id, status)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

pub async fn get_shift_change(
    actor: ActorContext,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let request = state
        .shift_change_service
        .get(&actor, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Accept, approve or reject a shift change
pub async fn update_shift_change_status(
    actor: ActorContext,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    input: web::Json<ShiftChangeStatusUpdate>,
) -> Result<HttpResponse> {
    let request = state
        .shift_change_service
        .update_status(&actor, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(request),
        "Shift change status updated",
    )))
}
