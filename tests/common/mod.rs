#![allow(dead_code, unused_macros)]

use actix_web::web;
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use fake::Fake;
use fake::faker::name::en::Name;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;

use guardias::auth::Claims;
use guardias::config::Config;
use guardias::database::init_database;
use guardias::database::models::*;
use guardias::database::repositories::{EmployeeRepository, GuardRepository};
use guardias::handlers::shared::ApiResponse;
use guardias::AppState;

// Test database wrapper
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        Ok(TestDb {
            pool,
            _temp_dir: temp_dir,
        })
    }
}

pub struct TestContext {
    pub db: TestDb,
    pub config: Config,
    pub state: web::Data<AppState>,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        let db = TestDb::new().await?;
        let config = Config::test_config();
        let state = web::Data::new(AppState::new(db.pool.clone(), &config));

        Ok(TestContext { db, config, state })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    pub fn guards(&self) -> GuardRepository {
        GuardRepository::new(self.db.pool.clone())
    }

    pub async fn employee(&self, employee_type: EmployeeType, balances: Balances) -> Employee {
        EmployeeRepository::new(self.db.pool.clone())
            .create(EmployeeInput {
                name: Name().fake(),
                position: None,
                employee_type,
                vacation_days: balances.vacation_days,
                ap_days: balances.ap_days,
                sp_hours: balances.sp_hours,
                union_hours: balances.union_hours,
                compensation_days: balances.compensation_days,
            })
            .await
            .expect("Failed to insert test employee")
    }

    pub async fn bombero(&self, balances: Balances) -> Employee {
        self.employee(EmployeeType::Bombero, balances).await
    }

    pub async fn jefe(&self) -> Employee {
        self.employee(EmployeeType::Jefe, Balances::default()).await
    }

    pub async fn reload(&self, employee: &Employee) -> Employee {
        EmployeeRepository::new(self.db.pool.clone())
            .find_by_id(employee.id)
            .await
            .expect("Failed to load employee")
            .expect("Employee vanished")
    }

    pub async fn park(&self, name: &str) -> Park {
        self.guards()
            .create_park(name)
            .await
            .expect("Failed to insert test park")
    }

    pub async fn brigade(&self, name: &str, park: &Park) -> Brigade {
        self.guards()
            .create_brigade(name, Some(park.id))
            .await
            .expect("Failed to insert test brigade")
    }

    pub async fn put_on_guard(&self, park: &Park, brigade: &Brigade, dates: &[&str]) {
        for d in dates {
            self.guards()
                .insert_assignment(date(d), park.id, brigade.id)
                .await
                .expect("Failed to insert guard")
                .expect("Guard slot already taken");
        }
    }

    /// Places `employee` in `brigade` from the first day of `month`.
    pub async fn join_brigade(&self, employee: &Employee, brigade: &Brigade, month: &str) {
        self.guards()
            .insert_transfer(&BrigadeTransferInput {
                employee_id: employee.id,
                from_brigade_id: None,
                to_brigade_id: brigade.id,
                effective_month: month.parse().expect("Invalid month"),
                turno: None,
            })
            .await
            .expect("Failed to insert transfer");
    }

    pub fn token(&self, employee: &Employee) -> String {
        Claims::issue(
            &self.config,
            employee.id,
            employee.employee_type,
            Duration::hours(1),
        )
        .expect("Failed to issue token")
    }

    pub fn auth_header(&self, employee: &Employee) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token(employee)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Balances {
    pub vacation_days: f64,
    pub ap_days: f64,
    pub sp_hours: f64,
    pub union_hours: f64,
    pub compensation_days: f64,
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("Invalid date")
}

/// Builds the full API with the context's state and config.
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state.clone())
                .app_data(actix_web::web::Data::new($ctx.config.clone()))
                .configure(guardias::configure),
        )
        .await
    };
}

/// Sends a request and returns the status with the decoded JSON body.
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let res = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = res.status();
        let body: serde_json::Value = actix_web::test::read_body_json(res).await;
        (status, body)
    }};
}

// Test assertion helpers
pub struct TestAssertions;

impl TestAssertions {
    pub fn assert_success<T>(body: &Value) -> T
    where
        T: serde::de::DeserializeOwned,
    {
        let response: ApiResponse<T> =
            serde_json::from_value(body.clone()).expect("Failed to parse JSON response");

        assert!(
            response.success,
            "Expected successful response but got error: {:?}",
            response.message
        );
        response.data.expect("Expected data in successful response")
    }

    pub fn assert_error_code(body: &Value, code: &str) {
        assert_eq!(body["success"], Value::Bool(false), "body: {}", body);
        assert_eq!(body["code"], Value::String(code.to_string()), "body: {}", body);
    }

    pub async fn assert_record_count(pool: &SqlitePool, table: &str, expected_count: i64) {
        let query = format!("SELECT COUNT(*) FROM {}", table);
        let result = sqlx::query_scalar::<_, i64>(&query)
            .fetch_one(pool)
            .await
            .expect("Failed to count records");

        assert_eq!(
            result, expected_count,
            "Expected {} records in {} table, but found {}",
            expected_count, table, result
        );
    }
}
