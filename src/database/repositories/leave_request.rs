use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::database::models::{LeaveRequest, LeaveRequestInput, LeaveStatus, Turno};

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, leave_type, date_start, date_end, turno,
    start_time, end_time, hours, status, created_at, updated_at
"#;

#[derive(Clone)]
pub struct LeaveRequestRepository {
    pool: SqlitePool,
}

impl LeaveRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new leave request in `Pendiente`
    pub async fn create(
        &self,
        input: &LeaveRequestInput,
        hours: Option<f64>,
    ) -> Result<LeaveRequest, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            INSERT INTO leave_requests (
                employee_id, leave_type, date_start, date_end, turno,
                start_time, end_time, hours, status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            LEAVE_COLUMNS
        ))
        .bind(input.employee_id)
        .bind(input.leave_type)
        .bind(input.date_start)
        .bind(input.date_end)
        .bind(input.turno)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(hours)
        .bind(LeaveStatus::Pendiente)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<LeaveRequest>, sqlx::Error> {
        sqlx::query_as::<_, LeaveRequest>(&format!(
            "SELECT {} FROM leave_requests WHERE id = ?",
            LEAVE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Get leave requests with optional filtering, newest first
    pub async fn list(
        &self,
        employee_id: Option<i64>,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>, sqlx::Error> {
        let mut query = format!("SELECT {} FROM leave_requests WHERE 1=1", LEAVE_COLUMNS);

        if employee_id.is_some() {
            query.push_str(" AND employee_id = ?");
        }
        if status.is_some() {
            query.push_str(" AND status = ?");
        }
        query.push_str(" ORDER BY date_start DESC, id DESC");

        let mut prepared = sqlx::query_as::<_, LeaveRequest>(&query);
        if let Some(employee_id) = employee_id {
            prepared = prepared.bind(employee_id);
        }
        if let Some(status) = status {
            prepared = prepared.bind(status);
        }

        prepared.fetch_all(&self.pool).await
    }

    /// Moves `id` from `from` to `to`, optionally replacing the turno.
    /// Returns `None` if the request is no longer in `from`.
    pub async fn update_status(
        conn: &mut SqliteConnection,
        id: i64,
        from: LeaveStatus,
        to: LeaveStatus,
        turno: Option<Turno>,
    ) -> Result<Option<LeaveRequest>, sqlx::Error> {
        sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            UPDATE leave_requests
            SET
                status = ?,
                turno = COALESCE(?, turno),
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING {}
            "#,
            LEAVE_COLUMNS
        ))
        .bind(to)
        .bind(turno)
        .bind(Utc::now())
        .bind(id)
        .bind(from)
        .fetch_optional(&mut *conn)
        .await
    }
}
