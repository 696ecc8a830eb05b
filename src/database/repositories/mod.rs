pub mod activity;
pub mod employee;
pub mod guard;
pub mod leave_request;
pub mod ledger;
pub mod shift_change;

// Re-export all repositories for easy importing
pub use activity::ActivityRepository;
pub use employee::EmployeeRepository;
pub use guard::GuardRepository;
pub use leave_request::LeaveRequestRepository;
pub use ledger::{LedgerRepository, ReserveOutcome};
pub use shift_change::ShiftChangeRepository;
