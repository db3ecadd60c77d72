//! Safe app allow-list repository.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use tokio::sync::RwLock;

use domain::models::SafeAppAllowList;

use crate::metrics::StoreTimer;

/// Holds child-lock allow-lists keyed by (user, device).
#[derive(Debug, Default)]
pub struct SafeAppRepository {
    lists: RwLock<HashMap<(String, String), SafeAppAllowList>>,
}

impl SafeAppRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current allow-list for the pair, if one has been set.
    pub async fn get(&self, user_id: &str, device_id: &str) -> Option<SafeAppAllowList> {
        self.lists
            .read()
            .await
            .get(&(user_id.to_string(), device_id.to_string()))
            .cloned()
    }

    /// Replaces the allow-list for the pair (upsert). Duplicate app
    /// identifiers collapse under set semantics.
    pub async fn set(
        &self,
        user_id: &str,
        device_id: &str,
        apps: Vec<String>,
    ) -> SafeAppAllowList {
        let timer = StoreTimer::new("set_safe_apps");
        let list = SafeAppAllowList {
            user_id: user_id.to_string(),
            device_id: device_id.to_string(),
            allowed_apps: apps.into_iter().collect::<BTreeSet<String>>(),
            updated_at: Utc::now(),
        };
        self.lists
            .write()
            .await
            .insert((user_id.to_string(), device_id.to_string()), list.clone());
        timer.record();
        list
    }
}
