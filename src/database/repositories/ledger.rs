use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::database::models::{BalanceKind, LedgerMovement, MovementKind};

const MOVEMENT_COLUMNS: &str =
    "id, request_id, employee_id, balance_kind, movement, amount, created_at";

/// Tolerance for comparing fractional balances.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReserveOutcome {
    Reserved,
    /// The request already holds a reservation; nothing changed.
    AlreadyReserved,
    Insufficient { remaining: f64 },
}

#[derive(Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// `None` when the employee does not exist.
    pub async fn remaining(
        &self,
        employee_id: i64,
        kind: BalanceKind,
    ) -> Result<Option<f64>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        Self::remaining_in(&mut conn, employee_id, kind).await
    }

    async fn remaining_in(
        conn: &mut SqliteConnection,
        employee_id: i64,
        kind: BalanceKind,
    ) -> Result<Option<f64>, sqlx::Error> {
        let query = format!("SELECT {} FROM employees WHERE id = ?", kind.column());
        sqlx::query_scalar::<_, f64>(&query)
            .bind(employee_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Draws `amount` from the employee's balance on behalf of `request_id`.
    /// The movement insert and the conditional decrement share the caller's
    /// transaction; on `Insufficient` the caller must roll back.
    pub async fn reserve(
        conn: &mut SqliteConnection,
        request_id: i64,
        employee_id: i64,
        kind: BalanceKind,
        amount: f64,
    ) -> Result<ReserveOutcome, sqlx::Error> {
        let now = Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO ledger_movements (request_id, employee_id, balance_kind, movement, amount, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(request_id)
        .bind(employee_id)
        .bind(kind)
        .bind(MovementKind::Reserve)
        .bind(amount)
        .bind(now)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Ok(ReserveOutcome::AlreadyReserved);
        }

        let column = kind.column();
        let query = format!(
            r#"
            UPDATE employees
            SET
                {column} = MAX({column} - ?, 0),
                updated_at = ?
            WHERE
                id = ?
                AND {column} + ? >= ?
            "#
        );
        let updated = sqlx::query(&query)
            .bind(amount)
            .bind(now)
            .bind(employee_id)
            .bind(EPSILON)
            .bind(amount)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        if updated == 0 {
            let remaining = Self::remaining_in(conn, employee_id, kind)
                .await?
                .unwrap_or(0.0);
            return Ok(ReserveOutcome::Insufficient { remaining });
        }

        Ok(ReserveOutcome::Reserved)
    }

    /// Hands back whatever `request_id` reserved. Returns `false` when there
    /// was no reservation or it was already released.
    pub async fn release(conn: &mut SqliteConnection, request_id: i64) -> Result<bool, sqlx::Error> {
        let reservation = sqlx::query_as::<_, LedgerMovement>(&format!(
            "SELECT {} FROM ledger_movements WHERE request_id = ? AND movement = ?",
            MOVEMENT_COLUMNS
        ))
        .bind(request_id)
        .bind(MovementKind::Reserve)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(reservation) = reservation else {
            return Ok(false);
        };

        let now = Utc::now();
        let inserted = sqlx::query(
            r#"
            INSERT INTO ledger_movements (request_id, employee_id, balance_kind, movement, amount, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(request_id)
        .bind(reservation.employee_id)
        .bind(reservation.balance_kind)
        .bind(MovementKind::Release)
        .bind(reservation.amount)
        .bind(now)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Ok(false);
        }

        let column = reservation.balance_kind.column();
        sqlx::query(&format!(
            "UPDATE employees SET {column} = {column} + ?, updated_at = ? WHERE id = ?"
        ))
        .bind(reservation.amount)
        .bind(now)
        .bind(reservation.employee_id)
        .execute(&mut *conn)
        .await?;

        Ok(true)
    }

    /// Applies a signed manual correction. Returns the new balance, or
    /// `None` if it would go negative (nothing is written then).
    pub async fn adjust(
        conn: &mut SqliteConnection,
        employee_id: i64,
        kind: BalanceKind,
        delta: f64,
    ) -> Result<Option<f64>, sqlx::Error> {
        let now = Utc::now();
        let column = kind.column();

        let new_balance = sqlx::query_scalar::<_, f64>(&format!(
            r#"
            UPDATE employees
            SET
                {column} = MAX({column} + ?, 0),
                updated_at = ?
            WHERE
                id = ?
                AND {column} + ? + ? >= 0
            RETURNING {column}
            "#
        ))
        .bind(delta)
        .bind(now)
        .bind(employee_id)
        .bind(delta)
        .bind(EPSILON)
        .fetch_optional(&mut *conn)
        .await?;

        if new_balance.is_some() {
            sqlx::query(
                r#"
                INSERT INTO ledger_movements (request_id, employee_id, balance_kind, movement, amount, created_at)
                VALUES (NULL, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(employee_id)
            .bind(kind)
            .bind(MovementKind::Adjustment)
            .bind(delta)
            .bind(now)
            .execute(&mut *conn)
            .await?;
        }

        Ok(new_balance)
    }

    pub async fn history(&self, employee_id: i64) -> Result<Vec<LedgerMovement>, sqlx::Error> {
        sqlx::query_as::<_, LedgerMovement>(&format!(
            "SELECT {} FROM ledger_movements WHERE employee_id = ? ORDER BY id DESC",
            MOVEMENT_COLUMNS
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await
    }
}
