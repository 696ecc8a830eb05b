use crate::database::models::{
    Action, EntityType, ShiftChangeInput, ShiftChangeRequest, ShiftChangeStatus,
    ShiftChangeStatusUpdate,
};
use crate::database::repositories::{EmployeeRepository, ShiftChangeRepository};
use crate::error::AppError;
use crate::services::activity_logger::{ActivityLogger, metadata};
use crate::services::actor_context::ActorContext;
use crate::services::request_validator::validate_shift_change;

/// Shift swaps between two employees: the counterpart accepts, then a
/// supervisor approves. Accepted swaps are a record only; the guard
/// calendar is left untouched.
#[derive(Clone)]
pub struct ShiftChangeService {
    requests: ShiftChangeRepository,
    employees: EmployeeRepository,
    activity_logger: ActivityLogger,
    mirror_max_week_gap: i64,
}

impl ShiftChangeService {
    pub fn new(
        requests: ShiftChangeRepository,
        employees: EmployeeRepository,
        activity_logger: ActivityLogger,
        mirror_max_week_gap: i64,
    ) -> Self {
        Self {
            requests,
            employees,
            activity_logger,
            mirror_max_week_gap,
        }
    }

    pub async fn create(
        &self,
        actor: &ActorContext,
        input: ShiftChangeInput,
    ) -> Result<ShiftChangeRequest, AppError> {
        actor.require_access_to(input.employee_id1)?;
        validate_shift_change(&input, self.mirror_max_week_gap)?;

        for employee_id in [input.employee_id1, input.employee_id2] {
            if self.employees.find_by_id(employee_id).await?.is_none() {
                return Err(AppError::validation(format!(
                    "Unknown employee {}",
                    employee_id
                )));
            }
        }

        let request = self.requests.create(&input, actor.employee_id()).await?;

        self.activity_logger
            .log_activity(
                Some(actor.employee_id()),
                EntityType::SHIFT_CHANGE,
                request.id,
                Action::CREATED,
                format!(
                    "Shift change {} requested between {} and {} on {}",
                    request.id, request.employee_id1, request.employee_id2, request.date
                ),
                metadata! {
                    "turno" => request.turno.as_str(),
                    "mirror" => request.is_mirror(),
                },
            )
            .await;

        Ok(request)
    }

    pub async fn get(
        &self,
        actor: &ActorContext,
        id: i64,
    ) -> Result<ShiftChangeRequest, AppError> {
        let request = self.find(id).await?;
        if request.roles_of(actor.employee_id(), actor.is_supervisor()).none() {
            return Err(AppError::Forbidden(format!(
                "Employee {} is not a party to shift change {}",
                actor.employee_id(),
                id
            )));
        }
        Ok(request)
    }

    /// Requests where the actor is either party; supervisors may look at
    /// anyone's.
    pub async fn list(
        &self,
        actor: &ActorContext,
        employee_id: Option<i64>,
        status: Option<ShiftChangeStatus>,
    ) -> Result<Vec<ShiftChangeRequest>, AppError> {
        let employee_id = if actor.is_supervisor() {
            employee_id
        } else {
            Some(actor.employee_id())
        };

        Ok(self.requests.list(employee_id, status).await?)
    }

    pub async fn update_status(
        &self,
        actor: &ActorContext,
        id: i64,
        update: ShiftChangeStatusUpdate,
    ) -> Result<ShiftChangeRequest, AppError> {
        let request = self.find(id).await?;
        let from = request.status;
        let to = update.status;

        let roles = request.roles_of(actor.employee_id(), actor.is_supervisor());
        from.transition(to, roles)
            .map_err(|rejection| AppError::from_rejection(rejection, from, to))?;

        let updated = self
            .requests
            .update_status(id, from, to)
            .await?
            .ok_or_else(|| AppError::invalid_transition(from, to))?;

        self.activity_logger
            .log_activity(
                Some(actor.employee_id()),
                EntityType::SHIFT_CHANGE,
                updated.id,
                Action::STATUS_CHANGED,
                format!("Shift change {} moved from {} to {}", updated.id, from, to),
                metadata! {
                    "from" => from.as_str(),
                    "to" => to.as_str(),
                },
            )
            .await;

        Ok(updated)
    }

    async fn find(&self, id: i64) -> Result<ShiftChangeRequest, AppError> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shift change {} not found", id)))
    }
}
