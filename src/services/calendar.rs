use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::database::models::{
    Action, BrigadeTransfer, BrigadeTransferInput, CopyMonthResult, EntityType, GuardAssignment,
    YearMonth,
};
use crate::database::repositories::{EmployeeRepository, GuardRepository};
use crate::error::AppError;
use crate::services::activity_logger::{ActivityLogger, metadata};
use crate::services::actor_context::ActorContext;
use crate::services::request_validator::GuardCalendar;

/// Guard calendar and brigade composition.
#[derive(Clone)]
pub struct CalendarService {
    pool: SqlitePool,
    guards: GuardRepository,
    employees: EmployeeRepository,
    activity_logger: ActivityLogger,
}

impl CalendarService {
    pub fn new(
        pool: SqlitePool,
        guards: GuardRepository,
        employees: EmployeeRepository,
        activity_logger: ActivityLogger,
    ) -> Self {
        Self {
            pool,
            guards,
            employees,
            activity_logger,
        }
    }

    async fn ensure_park(&self, park_id: i64) -> Result<(), AppError> {
        if !self.guards.park_exists(park_id).await? {
            return Err(AppError::validation(format!("Unknown park {}", park_id)));
        }
        Ok(())
    }

    async fn ensure_brigade(&self, brigade_id: i64) -> Result<(), AppError> {
        if !self.guards.brigade_exists(brigade_id).await? {
            return Err(AppError::validation(format!("Unknown brigade {}", brigade_id)));
        }
        Ok(())
    }

    /// The brigade on guard at `park_id` on `date`, if any.
    pub async fn get_assignment(
        &self,
        date: NaiveDate,
        park_id: i64,
    ) -> Result<Option<GuardAssignment>, AppError> {
        self.ensure_park(park_id).await?;
        Ok(self.guards.get_assignment(date, park_id).await?)
    }

    /// Puts `brigade_id` on guard. Without `expected_version` only an empty
    /// slot is filled; with it the slot is replaced only if nobody changed it
    /// since that version was read.
    pub async fn set_assignment(
        &self,
        actor: &ActorContext,
        date: NaiveDate,
        park_id: i64,
        brigade_id: i64,
        expected_version: Option<i64>,
    ) -> Result<GuardAssignment, AppError> {
        actor.require_supervisor()?;
        self.ensure_park(park_id).await?;
        self.ensure_brigade(brigade_id).await?;

        let assignment = match expected_version {
            None => self
                .guards
                .insert_assignment(date, park_id, brigade_id)
                .await?
                .ok_or_else(|| {
                    AppError::Conflict(format!(
                        "Park {} already has a brigade on guard on {}",
                        park_id, date
                    ))
                })?,
            Some(version) => self
                .guards
                .replace_assignment(date, park_id, brigade_id, version)
                .await?
                .ok_or_else(|| {
                    AppError::Conflict(format!(
                        "Guard of park {} on {} is not at version {}",
                        park_id, date, version
                    ))
                })?,
        };

        self.activity_logger
            .log_activity(
                Some(actor.employee_id()),
                EntityType::GUARD_ASSIGNMENT,
                format!("{}/{}", assignment.date, assignment.park_id),
                Action::UPDATED,
                format!(
                    "Brigade {} on guard at park {} on {}",
                    assignment.brigade_id, assignment.park_id, assignment.date
                ),
                metadata! {
                    "brigade_id" => assignment.brigade_id,
                    "version" => assignment.version,
                },
            )
            .await;

        Ok(assignment)
    }

    pub async fn list_month(
        &self,
        month: YearMonth,
        park_id: Option<i64>,
    ) -> Result<Vec<GuardAssignment>, AppError> {
        if let Some(park_id) = park_id {
            self.ensure_park(park_id).await?;
        }
        Ok(self.guards.list_month(month, park_id).await?)
    }

    /// Replicates `source` onto `target` day by day. Nothing is written if
    /// the target month already holds any assignment.
    pub async fn copy_month(
        &self,
        actor: &ActorContext,
        source: YearMonth,
        target: YearMonth,
    ) -> Result<CopyMonthResult, AppError> {
        actor.require_supervisor()?;
        if source == target {
            return Err(AppError::validation(
                "Source and target month must differ",
            ));
        }

        // Holds the write lock from the emptiness check through the copy.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        if GuardRepository::count_in_month(&mut *tx, target).await? > 0 {
            return Err(AppError::Conflict(format!(
                "Month {} already has guard assignments",
                target
            )));
        }

        let copied = GuardRepository::copy_month(&mut *tx, source, target).await?;
        tx.commit().await?;

        self.activity_logger
            .log_activity(
                Some(actor.employee_id()),
                EntityType::GUARD_ASSIGNMENT,
                target,
                Action::COPIED,
                format!("Copied {} guards from {} to {}", copied, source, target),
                metadata! {
                    "source" => source.to_string(),
                    "target" => target.to_string(),
                    "copied" => copied,
                },
            )
            .await;

        Ok(CopyMonthResult {
            source,
            target,
            copied,
        })
    }

    /// Records that an employee changes brigade from the first day of
    /// `effective_month`. Composition history is append-only: a transfer
    /// dated before the employee's latest one is refused.
    pub async fn transfer_employee(
        &self,
        actor: &ActorContext,
        input: BrigadeTransferInput,
    ) -> Result<BrigadeTransfer, AppError> {
        actor.require_supervisor()?;

        if input.from_brigade_id == Some(input.to_brigade_id) {
            return Err(AppError::validation(
                "Origin and destination brigade are the same",
            ));
        }
        if self.employees.find_by_id(input.employee_id).await?.is_none() {
            return Err(AppError::validation(format!(
                "Unknown employee {}",
                input.employee_id
            )));
        }
        self.ensure_brigade(input.to_brigade_id).await?;
        if let Some(from) = input.from_brigade_id {
            self.ensure_brigade(from).await?;
        }

        let effective_date = input.effective_month.first_day();

        if let Some(latest) = self.guards.latest_transfer(input.employee_id).await? {
            if latest.effective_date > effective_date {
                return Err(AppError::Conflict(format!(
                    "Employee {} already has a transfer effective {}",
                    input.employee_id, latest.effective_date
                )));
            }
        }

        let current = self.brigade_of(input.employee_id, effective_date).await?;
        if current != input.from_brigade_id {
            return Err(AppError::validation(format!(
                "Employee {} is in brigade {} on {}, not {}",
                input.employee_id,
                describe_brigade(current),
                effective_date,
                describe_brigade(input.from_brigade_id)
            )));
        }

        let transfer = self.guards.insert_transfer(&input).await?;

        self.activity_logger
            .log_activity(
                Some(actor.employee_id()),
                EntityType::BRIGADE_TRANSFER,
                transfer.id,
                Action::TRANSFERRED,
                format!(
                    "Employee {} moves to brigade {} from {}",
                    transfer.employee_id, transfer.to_brigade_id, transfer.effective_date
                ),
                metadata! {
                    "employee_id" => transfer.employee_id,
                    "from_brigade_id" => transfer.from_brigade_id,
                    "to_brigade_id" => transfer.to_brigade_id,
                },
            )
            .await;

        Ok(transfer)
    }

    /// Brigade the employee belongs to on `date`.
    pub async fn brigade_of(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> Result<Option<i64>, AppError> {
        self.guards.brigade_on(employee_id, date).await
    }
}

fn describe_brigade(brigade_id: Option<i64>) -> String {
    brigade_id.map_or_else(|| "none".to_string(), |id| id.to_string())
}
