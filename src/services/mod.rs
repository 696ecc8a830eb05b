pub mod activity_logger;
pub mod actor_context;
pub mod calendar;
pub mod leave;
pub mod ledger;
pub mod request_validator;
pub mod shift_change;

pub use activity_logger::ActivityLogger;
pub use actor_context::ActorContext;
pub use calendar::CalendarService;
pub use leave::LeaveService;
pub use ledger::LedgerService;
pub use request_validator::GuardCalendar;
pub use shift_change::ShiftChangeService;
