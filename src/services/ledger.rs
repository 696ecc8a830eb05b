use sqlx::SqlitePool;

use crate::database::models::{
    Action, BalanceAdjustmentInput, BalanceKind, BalanceSummary, Employee, EntityType,
    LedgerMovement,
};
use crate::database::repositories::{EmployeeRepository, LedgerRepository};
use crate::error::AppError;
use crate::services::activity_logger::{ActivityLogger, metadata};
use crate::services::actor_context::ActorContext;

#[derive(Clone)]
pub struct LedgerService {
    pool: SqlitePool,
    ledger: LedgerRepository,
    employees: EmployeeRepository,
    activity_logger: ActivityLogger,
}

impl LedgerService {
    pub fn new(
        pool: SqlitePool,
        ledger: LedgerRepository,
        employees: EmployeeRepository,
        activity_logger: ActivityLogger,
    ) -> Self {
        Self {
            pool,
            ledger,
            employees,
            activity_logger,
        }
    }

    async fn employee(&self, employee_id: i64) -> Result<Employee, AppError> {
        self.employees
            .find_by_id(employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))
    }

    pub async fn remaining(&self, employee_id: i64, kind: BalanceKind) -> Result<f64, AppError> {
        self.ledger
            .remaining(employee_id, kind)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))
    }

    pub async fn summary(
        &self,
        actor: &ActorContext,
        employee_id: i64,
    ) -> Result<BalanceSummary, AppError> {
        actor.require_access_to(employee_id)?;
        let employee = self.employee(employee_id).await?;
        Ok(BalanceSummary::from(&employee))
    }

    pub async fn history(
        &self,
        actor: &ActorContext,
        employee_id: i64,
    ) -> Result<Vec<LedgerMovement>, AppError> {
        actor.require_access_to(employee_id)?;
        self.employee(employee_id).await?;
        Ok(self.ledger.history(employee_id).await?)
    }

    /// Manual correction by a supervisor. A correction that would leave the
    /// balance negative is refused.
    pub async fn adjust(
        &self,
        actor: &ActorContext,
        employee_id: i64,
        input: BalanceAdjustmentInput,
    ) -> Result<BalanceSummary, AppError> {
        actor.require_supervisor()?;
        if !input.delta.is_finite() || input.delta == 0.0 {
            return Err(AppError::validation(
                "Adjustment must be a non-zero amount",
            ));
        }

        let remaining = self.remaining(employee_id, input.balance_kind).await?;

        let mut tx = self.pool.begin().await?;
        let adjusted =
            LedgerRepository::adjust(&mut *tx, employee_id, input.balance_kind, input.delta)
                .await?;
        if adjusted.is_none() {
            return Err(AppError::InsufficientBalance {
                kind: input.balance_kind.to_string(),
                requested: -input.delta,
                remaining,
            });
        }
        tx.commit().await?;

        self.activity_logger
            .log_activity(
                Some(actor.employee_id()),
                EntityType::BALANCE,
                employee_id,
                Action::ADJUSTED,
                format!(
                    "Adjusted {} of employee {} by {}",
                    input.balance_kind, employee_id, input.delta
                ),
                metadata! {
                    "balance_kind" => input.balance_kind.as_str(),
                    "delta" => input.delta,
                },
            )
            .await;

        let employee = self.employee(employee_id).await?;
        Ok(BalanceSummary::from(&employee))
    }
}
