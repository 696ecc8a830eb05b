use actix_web::{HttpResponse, Result, web};
use serde::Deserialize;

use crate::AppState;
use crate::database::models::{LeaveRequestInput, LeaveStatus, LeaveStatusUpdate};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::ActorContext;

#[derive(Debug, Deserialize)]
pub struct LeaveRequestQuery {
    pub employee_id: Option<i64>,
    pub status: Option<String>,
}

/// Create a new leave request
pub async fn create_leave_request(
    actor: ActorContext,
    state: web::Data<AppState>,
    input: web::Json<LeaveRequestInput>,
) -> Result<HttpResponse> {
    let request = state
        .leave_service
        .create(&actor, input.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

/// Get leave requests with optional filtering
pub async fn get_leave_requests(
    actor: ActorContext,
    state: web::Data<AppState>,
    query: web::Query<LeaveRequestQuery>,
) -> Result<HttpResponse> {
    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<LeaveStatus>().map_err(AppError::Validation))
        .transpose()?;

    let requests = state
        .leave_service
        .list(&actor, query.employee_id, status)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

pub async fn get_leave_request(
    actor: ActorContext,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let request = state.leave_service.get(&actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Approve, deny or cancel a leave request
pub async fn update_leave_request_status(
    actor: ActorContext,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    input: web::Json<LeaveStatusUpdate>,
) -> Result<HttpResponse> {
    let request = state
        .leave_service
        .update_status(&actor, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(request),
        "Leave request status updated",
    )))
}
