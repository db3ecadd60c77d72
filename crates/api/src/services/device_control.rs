//! Anti-theft command controller.
//!
//! Applies the command state machine from `domain::models::command` to
//! stored per-device state. Transitions on one device are serialized by
//! a keyed mutex held for the whole read-verify-write cycle and released
//! on every exit path; different devices never contend.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{info, warn};

use domain::models::{CommandError, DeviceCommandState};
use domain::services::secret::SecretVerifier;
use persistence::repositories::CommandStateRepository;
use shared::crypto::{generate_confirmation_code, sha256_hex, verify_code_digest};

use crate::middleware::metrics::record_device_command;

/// Error reported by the device transport.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Outbound channel to the remote device for side-effecting commands.
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Triggers the audible alarm and waits for the device to
    /// acknowledge.
    async fn play_sound(&self, device_id: &str) -> Result<(), TransportError>;
}

/// Transport that logs commands and acknowledges immediately.
/// Development default; real delivery mechanics are out of scope.
#[derive(Debug, Clone, Default)]
pub struct LoggingDeviceTransport;

#[async_trait]
impl DeviceTransport for LoggingDeviceTransport {
    async fn play_sound(&self, device_id: &str) -> Result<(), TransportError> {
        info!(device_id = %device_id, "Play-sound command sent to device");
        Ok(())
    }
}

/// Bound on retained per-device transition locks. Device ids are
/// caller-chosen, so the map is swept of idle entries once it reaches
/// this size instead of growing without limit.
const MAX_TRACKED_DEVICES: usize = 1024;

/// Controller for lock, wipe, remote-wipe, wipe-request, and play-sound.
pub struct DeviceControlService {
    states: Arc<CommandStateRepository>,
    verifier: Arc<dyn SecretVerifier>,
    transport: Arc<dyn DeviceTransport>,
    ack_timeout: Duration,
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl DeviceControlService {
    pub fn new(
        states: Arc<CommandStateRepository>,
        verifier: Arc<dyn SecretVerifier>,
        transport: Arc<dyn DeviceTransport>,
        ack_timeout: Duration,
    ) -> Self {
        Self {
            states,
            verifier,
            transport,
            ack_timeout,
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Per-device transition mutex, created on first use.
    fn transition_lock(&self, device_id: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().expect("transition lock map poisoned");
            if let Some(lock) = locks.get(device_id) {
                return lock.clone();
            }
        }

        let mut locks = self.locks.write().expect("transition lock map poisoned");
        if locks.len() >= MAX_TRACKED_DEVICES {
            // Entries held by an in-flight transition survive the sweep.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks
            .entry(device_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Locks the device. The pin is opaque here; presence is the only
    /// guard (verification belongs to the secure-storage collaborator).
    pub async fn lock(&self, device_id: &str, pin: &str) -> Result<DeviceCommandState, CommandError> {
        let lock = self.transition_lock(device_id);
        let _guard = lock.lock().await;

        let mut state = self.states.get_or_default(device_id).await;
        match state.lock(pin) {
            Ok(()) => {
                self.states.put(state.clone()).await;
                record_device_command("lock", "success");
                info!(device_id = %device_id, "Device locked");
                Ok(state)
            }
            Err(err) => {
                record_device_command("lock", "rejected");
                Err(err)
            }
        }
    }

    /// Wipes the device after code verification.
    pub async fn wipe(&self, device_id: &str, code: &str) -> Result<DeviceCommandState, CommandError> {
        self.verified_wipe(device_id, code, "wipe").await
    }

    /// Remote wipe: same guard and resulting state as `wipe`, kept as a
    /// distinct entry point because it originates from a different trust
    /// boundary (theft-report flow vs. authenticated owner flow).
    pub async fn remote_wipe(
        &self,
        device_id: &str,
        code: &str,
    ) -> Result<DeviceCommandState, CommandError> {
        self.verified_wipe(device_id, code, "remote_wipe").await
    }

    async fn verified_wipe(
        &self,
        device_id: &str,
        code: &str,
        command: &'static str,
    ) -> Result<DeviceCommandState, CommandError> {
        let lock = self.transition_lock(device_id);
        let _guard = lock.lock().await;

        let mut state = self.states.get_or_default(device_id).await;

        // A pending wipe-request code supersedes the configured secret.
        let code_matches = match &state.pending_confirmation_code {
            Some(digest) => verify_code_digest(code, digest),
            None => self.verifier.verify(code),
        };

        match state.confirm_wipe(code_matches) {
            Ok(()) => {
                self.states.put(state.clone()).await;
                record_device_command(command, "success");
                warn!(device_id = %device_id, command = command, "Device wipe initiated");
                Ok(state)
            }
            Err(err) => {
                record_device_command(command, "rejected");
                Err(err)
            }
        }
    }

    /// Issues a wipe-request: generates a fresh confirmation code, stores
    /// only its digest, and returns the plaintext exactly once. A repeat
    /// request re-issues a fresh code.
    pub async fn request_wipe(
        &self,
        device_id: &str,
    ) -> Result<(DeviceCommandState, String), CommandError> {
        let lock = self.transition_lock(device_id);
        let _guard = lock.lock().await;

        let mut state = self.states.get_or_default(device_id).await;
        let code = generate_confirmation_code();
        match state.request_wipe(sha256_hex(&code)) {
            Ok(()) => {
                self.states.put(state.clone()).await;
                record_device_command("request_wipe", "success");
                info!(device_id = %device_id, "Wipe requested, confirmation code issued");
                Ok((state, code))
            }
            Err(err) => {
                record_device_command("request_wipe", "rejected");
                Err(err)
            }
        }
    }

    /// Triggers the audible alarm. Does not change state; returns whether
    /// the device acknowledged within the configured timeout.
    pub async fn play_sound(&self, device_id: &str) -> Result<bool, CommandError> {
        let state = self.states.get_or_default(device_id).await;
        state.ensure_can_play_sound()?;

        let acknowledged = match timeout(self.ack_timeout, self.transport.play_sound(device_id)).await
        {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(device_id = %device_id, error = %err, "Play-sound delivery failed");
                false
            }
            Err(_) => {
                warn!(device_id = %device_id, "Play-sound acknowledgment timed out");
                false
            }
        };

        record_device_command(
            "play_sound",
            if acknowledged { "success" } else { "unacknowledged" },
        );
        Ok(acknowledged)
    }

    /// Current command state, Unlocked for never-seen devices.
    pub async fn current_state(&self, device_id: &str) -> DeviceCommandState {
        self.states.get_or_default(device_id).await
    }
}
