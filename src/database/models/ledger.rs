use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::employee::BalanceKind;
use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LedgerMovement {
    pub id: i64,
    pub request_id: Option<i64>,
    pub employee_id: i64,
    pub balance_kind: BalanceKind,
    pub movement: MovementKind,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum MovementKind {
        Reserve => "reserve",
        Release => "release",
        Adjustment => "adjustment",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAdjustmentInput {
    pub balance_kind: BalanceKind,
    /// Signed change; negative values draw the balance down.
    pub delta: f64,
}
