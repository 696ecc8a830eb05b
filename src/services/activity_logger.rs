use std::collections::HashMap;

use crate::database::models::CreateActivityInput;
use crate::database::repositories::ActivityRepository;

/// Best-effort audit trail. A failed write is logged and never fails the
/// operation it describes.
#[derive(Clone)]
pub struct ActivityLogger {
    repository: ActivityRepository,
}

impl ActivityLogger {
    pub fn new(repository: ActivityRepository) -> Self {
        Self { repository }
    }

    pub async fn log_activity(
        &self,
        actor_id: Option<i64>,
        entity_type: &str,
        entity_id: impl ToString,
        action: &str,
        description: String,
        metadata: Option<HashMap<String, serde_json::Value>>,
    ) {
        log::info!("[{}] {}", entity_type, description);

        let request = CreateActivityInput {
            actor_id,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            action: action.to_string(),
            description,
            metadata,
        };

        if let Err(e) = self.repository.log_activity(request).await {
            log::warn!("Failed to record {} activity: {}", entity_type, e);
        }
    }
}

/// Builds the metadata map from `key => value` pairs.
macro_rules! metadata {
    ($($key:literal => $value:expr),* $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(map.insert($key.to_string(), serde_json::json!($value));)*
        Some(map)
    }};
}

pub(crate) use metadata;
