use chrono::{Datelike, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::database::models::{
    Brigade, BrigadeTransfer, BrigadeTransferInput, GuardAssignment, Park, YearMonth,
};

const ASSIGNMENT_COLUMNS: &str = "date, park_id, brigade_id, version, created_at, updated_at";
const TRANSFER_COLUMNS: &str =
    "id, employee_id, from_brigade_id, to_brigade_id, effective_date, turno, created_at";

/// Calendar store: parks, brigades, guard days and brigade composition.
#[derive(Clone)]
pub struct GuardRepository {
    pool: SqlitePool,
}

impl GuardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_park(&self, name: &str) -> Result<Park, sqlx::Error> {
        sqlx::query_as::<_, Park>(
            "INSERT INTO parks (name, created_at) VALUES (?, ?) RETURNING id, name, created_at",
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn create_brigade(
        &self,
        name: &str,
        park_id: Option<i64>,
    ) -> Result<Brigade, sqlx::Error> {
        sqlx::query_as::<_, Brigade>(
            r#"
            INSERT INTO brigades (name, park_id, created_at)
            VALUES (?, ?, ?)
            RETURNING id, name, park_id, created_at
            "#,
        )
        .bind(name)
        .bind(park_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn park_exists(&self, park_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM parks WHERE id = ?)")
            .bind(park_id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn brigade_exists(&self, brigade_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM brigades WHERE id = ?)")
            .bind(brigade_id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn get_assignment(
        &self,
        date: NaiveDate,
        park_id: i64,
    ) -> Result<Option<GuardAssignment>, sqlx::Error> {
        sqlx::query_as::<_, GuardAssignment>(&format!(
            "SELECT {} FROM guard_assignments WHERE date = ? AND park_id = ?",
            ASSIGNMENT_COLUMNS
        ))
        .bind(date)
        .bind(park_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Fills an empty slot. Returns `None` when the slot is already taken.
    pub async fn insert_assignment(
        &self,
        date: NaiveDate,
        park_id: i64,
        brigade_id: i64,
    ) -> Result<Option<GuardAssignment>, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, GuardAssignment>(&format!(
            r#"
            INSERT INTO guard_assignments (date, park_id, brigade_id, version, created_at, updated_at)
            VALUES (?, ?, ?, 1, ?, ?)
            ON CONFLICT (date, park_id) DO NOTHING
            RETURNING {}
            "#,
            ASSIGNMENT_COLUMNS
        ))
        .bind(date)
        .bind(park_id)
        .bind(brigade_id)
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
    }

    /// Replaces the brigade only if the stored version still matches.
    /// Returns `None` on a stale or missing row.
    pub async fn replace_assignment(
        &self,
        date: NaiveDate,
        park_id: i64,
        brigade_id: i64,
        expected_version: i64,
    ) -> Result<Option<GuardAssignment>, sqlx::Error> {
        sqlx::query_as::<_, GuardAssignment>(&format!(
            r#"
            UPDATE guard_assignments
            SET
                brigade_id = ?,
                version = version + 1,
                updated_at = ?
            WHERE
                date = ?
                AND park_id = ?
                AND version = ?
            RETURNING {}
            "#,
            ASSIGNMENT_COLUMNS
        ))
        .bind(brigade_id)
        .bind(Utc::now())
        .bind(date)
        .bind(park_id)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_month(
        &self,
        month: YearMonth,
        park_id: Option<i64>,
    ) -> Result<Vec<GuardAssignment>, sqlx::Error> {
        let mut query = format!(
            "SELECT {} FROM guard_assignments WHERE date >= ? AND date < ?",
            ASSIGNMENT_COLUMNS
        );
        if park_id.is_some() {
            query.push_str(" AND park_id = ?");
        }
        query.push_str(" ORDER BY date ASC, park_id ASC");

        let mut prepared = sqlx::query_as::<_, GuardAssignment>(&query)
            .bind(month.first_day())
            .bind(month.end_exclusive());
        if let Some(park_id) = park_id {
            prepared = prepared.bind(park_id);
        }

        prepared.fetch_all(&self.pool).await
    }

    pub async fn count_in_month(
        conn: &mut SqliteConnection,
        month: YearMonth,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM guard_assignments WHERE date >= ? AND date < ?",
        )
        .bind(month.first_day())
        .bind(month.end_exclusive())
        .fetch_one(&mut *conn)
        .await
    }

    /// Copies every assignment of `source` onto the same day of `target`.
    /// Days missing from the target month are skipped. Run inside a
    /// transaction; a pre-existing target row aborts with a unique violation.
    pub async fn copy_month(
        conn: &mut SqliteConnection,
        source: YearMonth,
        target: YearMonth,
    ) -> Result<u64, sqlx::Error> {
        let rows = sqlx::query_as::<_, GuardAssignment>(&format!(
            r#"
            SELECT {}
            FROM guard_assignments
            WHERE date >= ? AND date < ?
            ORDER BY date ASC, park_id ASC
            "#,
            ASSIGNMENT_COLUMNS
        ))
        .bind(source.first_day())
        .bind(source.end_exclusive())
        .fetch_all(&mut *conn)
        .await?;

        let now = Utc::now();
        let mut copied = 0;
        for row in rows {
            let Some(date) = target.with_day(row.date.day()) else {
                continue;
            };

            sqlx::query(
                r#"
                INSERT INTO guard_assignments (date, park_id, brigade_id, version, created_at, updated_at)
                VALUES (?, ?, ?, 1, ?, ?)
                "#,
            )
            .bind(date)
            .bind(row.park_id)
            .bind(row.brigade_id)
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await?;
            copied += 1;
        }

        Ok(copied)
    }

    /// Whether `brigade_id` is on guard at any park on `date`.
    pub async fn brigade_on_guard(
        &self,
        brigade_id: i64,
        date: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM guard_assignments WHERE brigade_id = ? AND date = ?)",
        )
        .bind(brigade_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await
    }

    /// Composition entry in force on `date`: latest effective date first,
    /// then the lexically greatest turno.
    pub async fn transfer_in_force(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> Result<Option<BrigadeTransfer>, sqlx::Error> {
        sqlx::query_as::<_, BrigadeTransfer>(&format!(
            r#"
            SELECT {}
            FROM brigade_transfers
            WHERE employee_id = ? AND effective_date <= ?
            ORDER BY effective_date DESC, turno DESC
            LIMIT 1
            "#,
            TRANSFER_COLUMNS
        ))
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn latest_transfer(
        &self,
        employee_id: i64,
    ) -> Result<Option<BrigadeTransfer>, sqlx::Error> {
        sqlx::query_as::<_, BrigadeTransfer>(&format!(
            r#"
            SELECT {}
            FROM brigade_transfers
            WHERE employee_id = ?
            ORDER BY effective_date DESC, turno DESC
            LIMIT 1
            "#,
            TRANSFER_COLUMNS
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn insert_transfer(
        &self,
        input: &BrigadeTransferInput,
    ) -> Result<BrigadeTransfer, sqlx::Error> {
        sqlx::query_as::<_, BrigadeTransfer>(&format!(
            r#"
            INSERT INTO brigade_transfers (
                employee_id, from_brigade_id, to_brigade_id, effective_date, turno, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            TRANSFER_COLUMNS
        ))
        .bind(input.employee_id)
        .bind(input.from_brigade_id)
        .bind(input.to_brigade_id)
        .bind(input.effective_month.first_day())
        .bind(input.turno)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }
}
