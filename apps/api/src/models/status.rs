use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::new_id;

/// Client heartbeat record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusCheck {
    pub id: String,
    pub client_name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStatusCheck {
    pub client_name: String,
}

impl StatusCheck {
    pub fn create(input: NewStatusCheck) -> Self {
        StatusCheck {
            id: new_id(),
            client_name: input.client_name,
            timestamp: Utc::now(),
        }
    }
}
