//! Child-lock safe app allow-list model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Per (user, device) set of application identifiers permitted while the
/// child lock is active. Set semantics: duplicates collapse. A device
/// with no stored list denies everything while the lock is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeAppAllowList {
    pub user_id: String,
    pub device_id: String,
    pub allowed_apps: BTreeSet<String>,
    pub updated_at: DateTime<Utc>,
}

impl SafeAppAllowList {
    /// Membership test for an application identifier.
    pub fn permits(&self, app: &str) -> bool {
        self.allowed_apps.contains(app)
    }
}

/// Request payload for replacing an allow-list (upsert).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetSafeAppsRequest {
    #[validate(length(min = 1, max = 100, message = "User id must be 1-100 characters"))]
    pub user_id: String,

    #[validate(length(min = 1, max = 100, message = "Device id must be 1-100 characters"))]
    pub device_id: String,

    pub allowed_apps: Vec<String>,
}

/// Request payload for activating the child lock. The backend only
/// acknowledges; enforcement of the allow-list happens on the device.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivateChildLockRequest {
    #[validate(length(min = 1, max = 100, message = "User id must be 1-100 characters"))]
    pub user_id: String,

    #[serde(default)]
    pub device_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permits() {
        let list = SafeAppAllowList {
            user_id: "user-1".to_string(),
            device_id: "device-1".to_string(),
            allowed_apps: ["org.app.reader", "org.app.maps"]
                .into_iter()
                .map(String::from)
                .collect(),
            updated_at: Utc::now(),
        };

        assert!(list.permits("org.app.reader"));
        assert!(!list.permits("org.app.games"));
    }

    #[test]
    fn test_set_semantics_collapse_duplicates() {
        let apps: BTreeSet<String> = ["org.app.reader", "org.app.reader", "org.app.maps"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(apps.len(), 2);
    }

    #[test]
    fn test_request_deserialization() {
        let json = r#"{
            "userId": "user-1",
            "deviceId": "device-1",
            "allowedApps": ["org.app.reader", "org.app.reader"]
        }"#;
        let request: SetSafeAppsRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.allowed_apps.len(), 2);
        let as_set: BTreeSet<_> = request.allowed_apps.iter().collect();
        assert_eq!(as_set.len(), 1);
    }
}
