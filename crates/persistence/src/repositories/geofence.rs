//! Geofence repository.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use domain::models::geofence::GeofenceEvaluation;
use domain::models::Geofence;
use domain::services::geo::fence_contains;

use crate::metrics::StoreTimer;

/// Repository for geofence definitions.
///
/// Ownership is part of every lookup key: a fence is only visible to and
/// deletable by its owning user, even when the id is known.
#[derive(Debug, Default)]
pub struct GeofenceRepository {
    fences: RwLock<HashMap<Uuid, Geofence>>,
}

impl GeofenceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new geofence. Inputs are validated by the caller.
    pub async fn create(
        &self,
        user_id: &str,
        device_id: &str,
        name: &str,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        active: bool,
    ) -> Geofence {
        let timer = StoreTimer::new("create_geofence");
        let now = Utc::now();
        let fence = Geofence {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            device_id: device_id.to_string(),
            name: name.to_string(),
            latitude,
            longitude,
            radius_meters,
            active,
            created_at: now,
            updated_at: now,
        };

        self.fences.write().await.insert(fence.id, fence.clone());
        timer.record();
        fence
    }

    /// Lists a user's fences, optionally filtered to one device,
    /// newest-first.
    pub async fn list(&self, user_id: &str, device_id: Option<&str>) -> Vec<Geofence> {
        let timer = StoreTimer::new("list_geofences");
        let fences = self.fences.read().await;
        let mut result: Vec<Geofence> = fences
            .values()
            .filter(|f| f.user_id == user_id)
            .filter(|f| device_id.map_or(true, |d| f.device_id == d))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        timer.record();
        result
    }

    /// Deletes a fence by (owning user, fence id). Returns false when no
    /// fence matches the pair, including when the id exists under a
    /// different user.
    pub async fn delete(&self, user_id: &str, geofence_id: Uuid) -> bool {
        let timer = StoreTimer::new("delete_geofence");
        let mut fences = self.fences.write().await;
        let owned = fences
            .get(&geofence_id)
            .map_or(false, |f| f.user_id == user_id);
        if owned {
            fences.remove(&geofence_id);
        }
        timer.record();
        owned
    }

    /// Number of fences owned by a user.
    pub async fn count_by_user(&self, user_id: &str) -> usize {
        self.fences
            .read()
            .await
            .values()
            .filter(|f| f.user_id == user_id)
            .count()
    }

    /// Evaluates a probe point against every ACTIVE fence of the owning
    /// user: one verdict per fence. Pure per call; repeated evaluation
    /// with the same inputs yields identical output and mutates nothing.
    pub async fn evaluate(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Vec<GeofenceEvaluation> {
        let timer = StoreTimer::new("evaluate_geofences");
        let fences = self.fences.read().await;
        let mut result: Vec<GeofenceEvaluation> = fences
            .values()
            .filter(|f| f.user_id == user_id && f.active)
            .map(|f| GeofenceEvaluation {
                is_inside: fence_contains(f, latitude, longitude),
                geofence: f.clone(),
            })
            .collect();
        result.sort_by(|a, b| {
            b.geofence
                .created_at
                .cmp(&a.geofence.created_at)
                .then(a.geofence.id.cmp(&b.geofence.id))
        });
        timer.record();
        result
    }
}
