//! Device command state repository.

use std::collections::HashMap;

use tokio::sync::RwLock;

use domain::models::DeviceCommandState;

use crate::metrics::StoreTimer;

/// Holds per-device anti-theft command state.
///
/// Read-modify-write cycles across get/put are serialized by the command
/// controller's per-device mutex, not here; this store only guarantees
/// consistency of individual operations.
#[derive(Debug, Default)]
pub struct CommandStateRepository {
    states: RwLock<HashMap<String, DeviceCommandState>>,
}

impl CommandStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state, or the fresh Unlocked default for a device that has
    /// never received a command. The default is not persisted until a
    /// transition stores it.
    pub async fn get_or_default(&self, device_id: &str) -> DeviceCommandState {
        self.states
            .read()
            .await
            .get(device_id)
            .cloned()
            .unwrap_or_else(|| DeviceCommandState::new(device_id))
    }

    /// Stores a transitioned state record (upsert by device id).
    pub async fn put(&self, state: DeviceCommandState) {
        let timer = StoreTimer::new("put_command_state");
        self.states
            .write()
            .await
            .insert(state.device_id.clone(), state);
        timer.record();
    }
}
