pub mod activity;
pub mod employee;
pub mod guard;
pub mod leave;
pub mod ledger;
pub(crate) mod macros;
pub mod shift_change;
pub mod transition;

// Re-export all models for easy importing
pub use activity::*;
pub use employee::*;
pub use guard::*;
pub use leave::*;
pub use ledger::*;
pub use shift_change::*;
pub use transition::*;
