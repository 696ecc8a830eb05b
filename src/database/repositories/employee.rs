use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::{Employee, EmployeeInput};

const EMPLOYEE_COLUMNS: &str = r#"
    id, name, position, employee_type,
    vacation_days, ap_days, sp_hours, union_hours, compensation_days,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: EmployeeInput) -> Result<Employee, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Employee>(&format!(
            r#"
            INSERT INTO employees (
                name, position, employee_type,
                vacation_days, ap_days, sp_hours, union_hours, compensation_days,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        ))
        .bind(input.name)
        .bind(input.position)
        .bind(input.employee_type)
        .bind(input.vacation_days)
        .bind(input.ap_days)
        .bind(input.sp_hours)
        .bind(input.union_hours)
        .bind(input.compensation_days)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(&format!(
            "SELECT {} FROM employees WHERE id = ?",
            EMPLOYEE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
