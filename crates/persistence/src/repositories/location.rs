//! Device location repository.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use domain::models::DeviceLocation;

use crate::metrics::StoreTimer;

/// Holds the last-known location per device.
///
/// Exactly one record per device; a device is the sole writer of its own
/// location, so writes are last-write-wins with no conflict detection.
#[derive(Debug, Default)]
pub struct LocationRepository {
    locations: RwLock<HashMap<String, DeviceLocation>>,
}

impl LocationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the stored location and stamps it with the current
    /// time. Returns the new record plus the previous one, which feeds
    /// geofence transition detection.
    pub async fn update(
        &self,
        device_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> (DeviceLocation, Option<DeviceLocation>) {
        let timer = StoreTimer::new("update_location");
        let location = DeviceLocation {
            device_id: device_id.to_string(),
            latitude,
            longitude,
            last_updated: Utc::now(),
        };
        let previous = self
            .locations
            .write()
            .await
            .insert(device_id.to_string(), location.clone());
        timer.record();
        (location, previous)
    }

    /// Last stored location, or None when the device has never reported.
    pub async fn current(&self, device_id: &str) -> Option<DeviceLocation> {
        self.locations.read().await.get(device_id).cloned()
    }
}
