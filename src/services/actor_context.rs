use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures_util::future::LocalBoxFuture;

use crate::AppState;
use crate::auth::Claims;
use crate::database::models::Employee;
use crate::database::repositories::EmployeeRepository;
use crate::error::AppError;

/// The employee acting on a request, loaded fresh from the store so that
/// authority always reflects the current employee type rather than the
/// role baked into the token.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub employee: Employee,
}

impl ActorContext {
    pub async fn from_claims(
        claims: &Claims,
        employees: &EmployeeRepository,
    ) -> Result<Self, AppError> {
        let employee = employees
            .find_by_id(claims.employee_id())
            .await?
            .ok_or_else(|| {
                log::warn!("Token for unknown employee {}", claims.employee_id());
                AppError::Unauthorized
            })?;

        if claims.role != employee.employee_type {
            log::info!(
                "Token for employee {} carries role {}, acting as stored {}",
                employee.id,
                claims.role.as_str(),
                employee.employee_type.as_str()
            );
        }

        Ok(ActorContext { employee })
    }

    pub fn employee_id(&self) -> i64 {
        self.employee.id
    }

    pub fn is_supervisor(&self) -> bool {
        self.employee.is_supervisor()
    }

    /// Own resources are always reachable; supervisors reach everyone's.
    pub fn can_access_employee_resource(&self, owner_id: i64) -> bool {
        self.employee_id() == owner_id || self.is_supervisor()
    }

    pub fn require_supervisor(&self) -> Result<(), AppError> {
        if self.is_supervisor() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Employee {} is not a supervisor",
                self.employee_id()
            )))
        }
    }

    pub fn require_access_to(&self, owner_id: i64) -> Result<(), AppError> {
        if self.can_access_employee_resource(owner_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Employee {} cannot act on behalf of employee {}",
                self.employee_id(),
                owner_id
            )))
        }
    }
}

impl FromRequest for ActorContext {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let claims = Claims::from_request(req, payload).into_inner();
        let state = req.app_data::<Data<AppState>>().cloned();

        Box::pin(async move {
            let claims = claims?;
            let state = state.ok_or_else(|| {
                log::error!("AppState missing from app data");
                AppError::internal_server_error_message("application state unavailable")
            })?;

            ActorContext::from_claims(&claims, &state.employee_repository).await
        })
    }
}
