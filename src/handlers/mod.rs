pub mod balances;
pub mod brigades;
pub mod guards;
pub mod health;
pub mod leave_requests;
pub mod shared;
pub mod shift_changes;
