use sqlx::SqlitePool;

use crate::database::models::{
    Action, ActorRoles, EntityType, LeaveRequest, LeaveRequestInput, LeaveStatus,
    LeaveStatusUpdate,
};
use crate::database::repositories::{
    EmployeeRepository, GuardRepository, LeaveRequestRepository, LedgerRepository, ReserveOutcome,
};
use crate::error::AppError;
use crate::services::activity_logger::{ActivityLogger, metadata};
use crate::services::actor_context::ActorContext;
use crate::services::request_validator::{LeaveTerms, validate_leave};

/// Leave requests and their approval lifecycle. Confirming a request
/// reserves its cost from the owner's allowance; cancelling or denying a
/// confirmed one hands it back.
#[derive(Clone)]
pub struct LeaveService {
    pool: SqlitePool,
    requests: LeaveRequestRepository,
    employees: EmployeeRepository,
    guards: GuardRepository,
    activity_logger: ActivityLogger,
}

impl LeaveService {
    pub fn new(
        pool: SqlitePool,
        requests: LeaveRequestRepository,
        employees: EmployeeRepository,
        guards: GuardRepository,
        activity_logger: ActivityLogger,
    ) -> Self {
        Self {
            pool,
            requests,
            employees,
            guards,
            activity_logger,
        }
    }

    pub async fn create(
        &self,
        actor: &ActorContext,
        input: LeaveRequestInput,
    ) -> Result<LeaveRequest, AppError> {
        actor.require_access_to(input.employee_id)?;

        let employee = self
            .employees
            .find_by_id(input.employee_id)
            .await?
            .ok_or_else(|| {
                AppError::validation(format!("Unknown employee {}", input.employee_id))
            })?;

        let cost = validate_leave(&self.guards, &employee, &LeaveTerms::from(&input)).await?;

        // Hour-based requests store the hours they will draw.
        let hours = match cost {
            Some(cost) if cost.kind.is_hours() => Some(cost.amount),
            _ => input.hours,
        };

        let request = self.requests.create(&input, hours).await?;

        self.activity_logger
            .log_activity(
                Some(actor.employee_id()),
                EntityType::LEAVE_REQUEST,
                request.id,
                Action::CREATED,
                format!(
                    "Leave request {} ({}) created for employee {}",
                    request.id, request.leave_type, request.employee_id
                ),
                metadata! {
                    "leave_type" => request.leave_type.as_str(),
                    "date_start" => request.date_start.to_string(),
                    "date_end" => request.last_day().to_string(),
                },
            )
            .await;

        Ok(request)
    }

    pub async fn get(&self, actor: &ActorContext, id: i64) -> Result<LeaveRequest, AppError> {
        let request = self.find(id).await?;
        actor.require_access_to(request.employee_id)?;
        Ok(request)
    }

    /// Employees only ever see their own requests.
    pub async fn list(
        &self,
        actor: &ActorContext,
        employee_id: Option<i64>,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>, AppError> {
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
        update: LeaveStatusUpdate,
    ) -> Result<LeaveRequest, AppError> {
        let request = self.find(id).await?;
        let from = request.status;
        let to = update.status;

        let roles = ActorRoles {
            requester: request.employee_id == actor.employee_id(),
            counterpart: false,
            supervisor: actor.is_supervisor(),
        };
        from.transition(to, roles)
            .map_err(|rejection| AppError::from_rejection(rejection, from, to))?;

        let updated = if to == LeaveStatus::Confirmada {
            self.confirm(&request, update).await?
        } else {
            let mut tx = self.pool.begin().await?;
            let updated = LeaveRequestRepository::update_status(&mut *tx, id, from, to, None)
                .await?
                .ok_or_else(|| AppError::invalid_transition(from, to))?;

            if from.releases_on(to) && !LedgerRepository::release(&mut *tx, id).await? {
                log::warn!("Leave request {} had no reservation to release", id);
            }
            tx.commit().await?;
            updated
        };

        self.activity_logger
            .log_activity(
                Some(actor.employee_id()),
                EntityType::LEAVE_REQUEST,
                updated.id,
                Action::STATUS_CHANGED,
                format!("Leave request {} moved from {} to {}", updated.id, from, to),
                metadata! {
                    "from" => from.as_str(),
                    "to" => to.as_str(),
                },
            )
            .await;

        Ok(updated)
    }

    /// Re-validates against current balances and calendar, then moves the
    /// request and reserves its cost in one transaction.
    async fn confirm(
        &self,
        request: &LeaveRequest,
        update: LeaveStatusUpdate,
    ) -> Result<LeaveRequest, AppError> {
        let employee = self
            .employees
            .find_by_id(request.employee_id)
            .await?
            .ok_or_else(|| {
                AppError::internal_server_error_message(format!(
                    "Leave request {} belongs to missing employee {}",
                    request.id, request.employee_id
                ))
            })?;

        let mut terms = LeaveTerms::from(request);
        if update.turno.is_some() {
            terms.turno = update.turno;
        }
        let cost = validate_leave(&self.guards, &employee, &terms).await?;

        let from = request.status;
        let to = update.status;

        let mut tx = self.pool.begin().await?;
        let updated =
            LeaveRequestRepository::update_status(&mut *tx, request.id, from, to, update.turno)
                .await?
                .ok_or_else(|| AppError::invalid_transition(from, to))?;

        if let Some(cost) = cost {
            match LedgerRepository::reserve(
                &mut *tx,
                request.id,
                employee.id,
                cost.kind,
                cost.amount,
            )
            .await?
            {
                ReserveOutcome::Reserved => {
                    log::debug!(
                        "Reserved {} {} for leave request {}",
                        cost.amount,
                        cost.kind,
                        request.id
                    );
                }
                ReserveOutcome::AlreadyReserved => {
                    log::warn!("Leave request {} was already reserved", request.id);
                }
                ReserveOutcome::Insufficient { remaining } => {
                    return Err(AppError::InsufficientBalance {
                        kind: cost.kind.to_string(),
                        requested: cost.amount,
                        remaining,
                    });
                }
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn find(&self, id: i64) -> Result<LeaveRequest, AppError> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave request {} not found", id)))
    }
}
