use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::{ShiftChangeInput, ShiftChangeRequest, ShiftChangeStatus};

const SHIFT_CHANGE_COLUMNS: &str = r#"
    id, employee_id1, employee_id2, date, date2, turno,
    status, motivo, created_by, created_at, updated_at
"#;

#[derive(Clone)]
pub struct ShiftChangeRepository {
    pool: SqlitePool,
}

impl ShiftChangeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new shift change request; every request starts `en_tramite`
    pub async fn create(
        &self,
        input: &ShiftChangeInput,
        created_by: i64,
    ) -> Result<ShiftChangeRequest, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, ShiftChangeRequest>(&format!(
            r#"
            INSERT INTO shift_change_requests (
                employee_id1, employee_id2, date, date2, turno,
                status, motivo, created_by, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            SHIFT_CHANGE_COLUMNS
        ))
        .bind(input.employee_id1)
        .bind(input.employee_id2)
        .bind(input.date)
        .bind(input.date2)
        .bind(input.turno)
        .bind(ShiftChangeStatus::EnTramite)
        .bind(&input.motivo)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ShiftChangeRequest>, sqlx::Error> {
        sqlx::query_as::<_, ShiftChangeRequest>(&format!(
            "SELECT {} FROM shift_change_requests WHERE id = ?",
            SHIFT_CHANGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Requests where `employee_id` is either party, newest first
    pub async fn list(
        &self,
        employee_id: Option<i64>,
        status: Option<ShiftChangeStatus>,
    ) -> Result<Vec<ShiftChangeRequest>, sqlx::Error> {
        let mut query = format!(
            "SELECT {} FROM shift_change_requests WHERE 1=1",
            SHIFT_CHANGE_COLUMNS
        );

        if employee_id.is_some() {
            query.push_str(" AND (employee_id1 = ? OR employee_id2 = ?)");
        }
        if status.is_some() {
            query.push_str(" AND status = ?");
        }
        query.push_str(" ORDER BY date DESC, id DESC");

        let mut prepared = sqlx::query_as::<_, ShiftChangeRequest>(&query);
        if let Some(employee_id) = employee_id {
            prepared = prepared.bind(employee_id).bind(employee_id);
        }
        if let Some(status) = status {
            prepared = prepared.bind(status);
        }

        prepared.fetch_all(&self.pool).await
    }

    /// Compare-and-set on the status column. Returns `None` if another
    /// transition got there first.
    pub async fn update_status(
        &self,
        id: i64,
        from: ShiftChangeStatus,
        to: ShiftChangeStatus,
    ) -> Result<Option<ShiftChangeRequest>, sqlx::Error> {
        sqlx::query_as::<_, ShiftChangeRequest>(&format!(
            r#"
            UPDATE shift_change_requests
            SET
                status = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = ?
            RETURNING {}
            "#,
            SHIFT_CHANGE_COLUMNS
        ))
        .bind(to)
        .bind(Utc::now())
        .bind(id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await
    }
}
