use actix_web::{HttpResponse, Result, web};

use crate::AppState;
use crate::database::models::BrigadeTransferInput;
use crate::handlers::shared::ApiResponse;
use crate::services::ActorContext;

/// Move an employee to another brigade from the start of a month
pub async fn transfer_employee(
    actor: ActorContext,
    state: web::Data<AppState>,
    input: web::Json<BrigadeTransferInput>,
) -> Result<HttpResponse> {
    let transfer = state
        .calendar_service
        .transfer_employee(&actor, input.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(transfer)))
}
