use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: i64,
    pub actor_id: Option<i64>,
    pub entity_type: String,
    pub entity_id: String,
    pub action: String,
    pub description: String,
    pub metadata: Option<String>, // JSON as String in SQLite
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityInput {
    pub actor_id: Option<i64>,
    pub entity_type: String,
    pub entity_id: String,
    pub action: String,
    pub description: String,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

#[allow(non_snake_case)]
pub mod EntityType {
    pub const LEAVE_REQUEST: &str = "leave_request";
    pub const SHIFT_CHANGE: &str = "shift_change";
    pub const GUARD_ASSIGNMENT: &str = "guard_assignment";
    pub const BRIGADE_TRANSFER: &str = "brigade_transfer";
    pub const BALANCE: &str = "balance";
}

#[allow(non_snake_case)]
pub mod Action {
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
    pub const STATUS_CHANGED: &str = "status_changed";
    pub const COPIED: &str = "copied";
    pub const TRANSFERRED: &str = "transferred";
    pub const ADJUSTED: &str = "adjusted";
}
