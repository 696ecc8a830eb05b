pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use actix_web::web;
use sqlx::SqlitePool;

pub use config::Config;
pub use database::repositories::EmployeeRepository;
pub use error::AppError;
pub use services::{
    ActivityLogger, CalendarService, LeaveService, LedgerService, ShiftChangeService,
};

use database::repositories::{
    ActivityRepository, GuardRepository, LeaveRequestRepository, LedgerRepository,
    ShiftChangeRepository,
};
use handlers::{balances, brigades, guards, health, leave_requests, shift_changes};

pub struct AppState {
    pub calendar_service: CalendarService,
    pub leave_service: LeaveService,
    pub shift_change_service: ShiftChangeService,
    pub ledger_service: LedgerService,
    pub employee_repository: EmployeeRepository,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        let employee_repository = EmployeeRepository::new(pool.clone());
        let guard_repository = GuardRepository::new(pool.clone());
        let activity_logger = ActivityLogger::new(ActivityRepository::new(pool.clone()));

        AppState {
            calendar_service: CalendarService::new(
                pool.clone(),
                guard_repository.clone(),
                employee_repository.clone(),
                activity_logger.clone(),
            ),
            leave_service: LeaveService::new(
                pool.clone(),
                LeaveRequestRepository::new(pool.clone()),
                employee_repository.clone(),
                guard_repository,
                activity_logger.clone(),
            ),
            shift_change_service: ShiftChangeService::new(
                ShiftChangeRepository::new(pool.clone()),
                employee_repository.clone(),
                activity_logger.clone(),
                config.mirror_max_week_gap,
            ),
            ledger_service: LedgerService::new(
                pool.clone(),
                LedgerRepository::new(pool),
                employee_repository.clone(),
                activity_logger,
            ),
            employee_repository,
        }
    }
}

/// Mounts the API. Expects `Data<AppState>` and `Data<Config>` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::validation(format!("Invalid JSON body: {}", err)).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                AppError::validation(format!("Invalid path: {}", err)).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::validation(format!("Invalid query: {}", err)).into()
            }))
            .route("/health", web::get().to(health::health))
            .service(
                web::scope("/leave-requests")
                    .route("", web::post().to(leave_requests::create_leave_request))
                    .route("", web::get().to(leave_requests::get_leave_requests))
                    .route("/{id}", web::get().to(leave_requests::get_leave_request))
                    .route(
                        "/{id}/status",
                        web::post().to(leave_requests::update_leave_request_status),
                    ),
            )
            .service(
                web::scope("/shift-changes")
                    .route("", web::post().to(shift_changes::create_shift_change))
                    .route("", web::get().to(shift_changes::get_shift_changes))
                    .route("/{id}", web::get().to(shift_changes::get_shift_change))
                    .route(
                        "/{id}/status",
                        web::post().to(shift_changes::update_shift_change_status),
                    ),
            )
            .service(
                web::scope("/guards")
                    .route("/copy-month", web::post().to(guards::copy_month))
                    .route("/month/{month}", web::get().to(guards::get_month))
                    .route("/{date}/parks/{park_id}", web::get().to(guards::get_guard))
                    .route("/{date}/parks/{park_id}", web::put().to(guards::set_guard)),
            )
            .service(
                web::scope("/brigades")
                    .route("/transfers", web::post().to(brigades::transfer_employee)),
            )
            .service(
                web::scope("/balances")
                    .route("/{employee_id}", web::get().to(balances::get_balances))
                    .route(
                        "/{employee_id}/history",
                        web::get().to(balances::get_balance_history),
                    )
                    .route(
                        "/{employee_id}/adjust",
                        web::post().to(balances::adjust_balance),
                    ),
            ),
    );
}
