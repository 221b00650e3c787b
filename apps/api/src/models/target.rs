use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::new_id;

pub const DEFAULT_LOCATION: &str = "India";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    NotConnected,
    Pending,
    Connected,
    Messaged,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::NotConnected => "not_connected",
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Messaged => "messaged",
        }
    }
}

/// A person being considered for outreach.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub title: String,
    pub company: String,
    pub linkedin_url: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: String,
    pub profile_summary: Option<String>,
    pub recent_activity: Option<String>,
    #[serde(default)]
    pub connection_status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for target creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTarget {
    pub name: String,
    pub title: String,
    pub company: String,
    pub linkedin_url: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default = "default_location")]
    pub location: String,
    pub profile_summary: Option<String>,
    pub recent_activity: Option<String>,
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

impl Target {
    pub fn create(input: NewTarget, now: DateTime<Utc>) -> Self {
        Target {
            id: new_id(),
            name: input.name,
            title: input.title,
            company: input.company,
            linkedin_url: input.linkedin_url,
            email: input.email,
            phone: input.phone,
            location: input.location,
            profile_summary: input.profile_summary,
            recent_activity: input.recent_activity,
            connection_status: ConnectionStatus::NotConnected,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a target. Only the mutable fields are listed;
/// any other key in the request body is rejected at deserialization.
///
/// The optional contact and profile fields distinguish an absent key (left
/// untouched) from an explicit `null` (cleared): `None` vs `Some(None)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_summary: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub recent_activity: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_status: Option<ConnectionStatus>,
}

/// Wraps whatever is present, including `null`, in `Some`. Absent keys never
/// reach this function and fall back to `default` (`None`).
fn clearable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl TargetPatch {
    /// The field set to merge into the stored document. Always stamps `updated_at`.
    pub fn into_set(self, now: DateTime<Utc>) -> Result<Map<String, Value>, serde_json::Error> {
        let mut set = match serde_json::to_value(self)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        set.insert("updated_at".to_string(), serde_json::to_value(now)?);
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_target_defaults_location() {
        let input: NewTarget = serde_json::from_value(json!({
            "name": "John Smith",
            "title": "AI Research Scientist",
            "company": "TechCorp AI",
            "linkedin_url": "https://linkedin.com/in/johnsmith"
        }))
        .unwrap();
        assert_eq!(input.location, DEFAULT_LOCATION);

        let target = Target::create(input, Utc::now());
        assert_eq!(target.connection_status, ConnectionStatus::NotConnected);
        assert_eq!(target.created_at, target.updated_at);
    }

    #[test]
    fn test_patch_rejects_unknown_keys() {
        let result = serde_json::from_value::<TargetPatch>(json!({"id": "overwrite-me"}));
        assert!(result.is_err());

        let result = serde_json::from_value::<TargetPatch>(json!({"connection_status": "bogus"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_set_contains_only_given_fields_plus_timestamp() {
        let patch: TargetPatch =
            serde_json::from_value(json!({"title": "CTO", "connection_status": "connected"}))
                .unwrap();
        let set = patch.into_set(Utc::now()).unwrap();

        let mut keys: Vec<&str> = set.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["connection_status", "title", "updated_at"]);
        assert_eq!(set["connection_status"], "connected");
    }

    #[test]
    fn test_patch_null_clears_optional_field() {
        let patch: TargetPatch =
            serde_json::from_value(json!({"email": null, "phone": "+91 98765 43210"})).unwrap();
        assert_eq!(patch.email, Some(None));
        assert_eq!(patch.phone, Some(Some("+91 98765 43210".to_string())));
        assert_eq!(patch.profile_summary, None);

        let set = patch.into_set(Utc::now()).unwrap();
        assert_eq!(set["email"], Value::Null);
        assert_eq!(set["phone"], "+91 98765 43210");
        assert!(!set.contains_key("profile_summary"));
    }
}
