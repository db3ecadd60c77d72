//! SOS notification fan-out.
//!
//! Scatter/gather: one concurrent delivery attempt per contact, each
//! bounded by a per-contact timeout, joined before the aggregate report
//! is produced. One contact's failure never blocks or fails the others,
//! and the call itself always succeeds; the report carries the detail.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::models::Contact;

/// Error returned by a delivery channel implementation.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct DeliveryError(pub String);

/// Which class of channel a dispatch attempt used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Sms,
    Email,
}

/// Why a dispatch attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The channel did not respond within the per-contact timeout.
    Timeout,
    /// The channel reported an error.
    Channel(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Timeout => f.write_str("timeout"),
            FailureReason::Channel(msg) => f.write_str(msg),
        }
    }
}

impl Serialize for FailureReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of one contact's dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DispatchOutcome {
    Delivered,
    Failed { reason: FailureReason },
    SkippedNoChannel,
}

/// Per-contact entry in the aggregate report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDispatch {
    pub contact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelKind>,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}

/// Aggregate result of an SOS fan-out. Carries one entry per contact in
/// input order plus summary counts; callers must not assume delivery
/// ordering across contacts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub results: Vec<ContactDispatch>,
    pub delivered: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl DispatchReport {
    fn from_results(results: Vec<ContactDispatch>) -> Self {
        let delivered = results
            .iter()
            .filter(|r| r.outcome == DispatchOutcome::Delivered)
            .count();
        let skipped = results
            .iter()
            .filter(|r| r.outcome == DispatchOutcome::SkippedNoChannel)
            .count();
        let failed = results.len() - delivered - skipped;
        Self {
            results,
            delivered,
            failed,
            skipped,
        }
    }

    /// Whether at least one dispatch attempt failed. A reportable
    /// outcome, not a hard error.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Delivery channel abstraction: something capable of sending an
/// SMS-class or email-class message.
#[async_trait::async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<(), DeliveryError>;
    async fn send_email(&self, email: &str, message: &str) -> Result<(), DeliveryError>;
}

/// Fans out SOS alerts to emergency contacts.
pub struct SosDispatcher {
    channel: Arc<dyn DeliveryChannel>,
    per_contact_timeout: Duration,
}

impl SosDispatcher {
    pub fn new(channel: Arc<dyn DeliveryChannel>, per_contact_timeout: Duration) -> Self {
        Self {
            channel,
            per_contact_timeout,
        }
    }

    /// Sends `message` to every contact over whichever channel it has:
    /// phone takes precedence over email; neither means the contact is
    /// recorded as skipped. Always returns a report, never an error.
    pub async fn send_sos(&self, contacts: &[Contact], message: &str) -> DispatchReport {
        let mut slots: Vec<Option<ContactDispatch>> = Vec::with_capacity(contacts.len());
        let mut tasks: JoinSet<(usize, ContactDispatch)> = JoinSet::new();

        for (index, contact) in contacts.iter().enumerate() {
            let label = contact.label();
            let (kind, target) = match (&contact.phone, &contact.email) {
                (Some(phone), _) => (ChannelKind::Sms, phone.clone()),
                (None, Some(email)) => (ChannelKind::Email, email.clone()),
                (None, None) => {
                    warn!(contact = %label, "SOS contact has no phone or email, skipping");
                    slots.push(Some(ContactDispatch {
                        contact: label,
                        channel: None,
                        outcome: DispatchOutcome::SkippedNoChannel,
                    }));
                    continue;
                }
            };

            slots.push(None);
            let channel = Arc::clone(&self.channel);
            let message = message.to_string();
            let per_contact_timeout = self.per_contact_timeout;

            tasks.spawn(async move {
                let attempt = async {
                    match kind {
                        ChannelKind::Sms => channel.send_sms(&target, &message).await,
                        ChannelKind::Email => channel.send_email(&target, &message).await,
                    }
                };

                let outcome = match timeout(per_contact_timeout, attempt).await {
                    Ok(Ok(())) => {
                        info!(contact = %label, channel = ?kind, "SOS delivered");
                        DispatchOutcome::Delivered
                    }
                    Ok(Err(err)) => {
                        warn!(contact = %label, channel = ?kind, error = %err, "SOS delivery failed");
                        DispatchOutcome::Failed {
                            reason: FailureReason::Channel(err.0),
                        }
                    }
                    Err(_) => {
                        warn!(contact = %label, channel = ?kind, "SOS delivery timed out");
                        DispatchOutcome::Failed {
                            reason: FailureReason::Timeout,
                        }
                    }
                };

                (
                    index,
                    ContactDispatch {
                        contact: label,
                        channel: Some(kind),
                        outcome,
                    },
                )
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, dispatch)) => slots[index] = Some(dispatch),
                Err(err) => {
                    // A panicked task loses its slot index; surface it
                    // without failing the remaining contacts.
                    warn!(error = %err, "SOS dispatch task failed to join");
                }
            }
        }

        let results = slots
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        DispatchReport::from_results(results)
    }
}

/// Mock delivery channel for development and testing.
///
/// Succeeds by default; specific targets can be scripted to fail or to
/// hang past any reasonable per-contact timeout.
#[derive(Debug, Default)]
pub struct MockDeliveryChannel {
    fail_targets: HashSet<String>,
    hang_targets: HashSet<String>,
    sent: std::sync::Mutex<Vec<(ChannelKind, String, String)>>,
}

impl MockDeliveryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a target (phone or email) to report a channel failure.
    pub fn failing_for(mut self, target: &str) -> Self {
        self.fail_targets.insert(target.to_string());
        self
    }

    /// Scripts a target to hang until the caller's timeout expires.
    pub fn hanging_for(mut self, target: &str) -> Self {
        self.hang_targets.insert(target.to_string());
        self
    }

    /// Messages recorded as sent, in completion order.
    pub fn sent(&self) -> Vec<(ChannelKind, String, String)> {
        self.sent.lock().expect("sent lock poisoned").clone()
    }

    async fn deliver(
        &self,
        kind: ChannelKind,
        target: &str,
        message: &str,
    ) -> Result<(), DeliveryError> {
        if self.hang_targets.contains(target) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_targets.contains(target) {
            return Err(DeliveryError(format!("scripted failure for {target}")));
        }
        self.sent
            .lock()
            .expect("sent lock poisoned")
            .push((kind, target.to_string(), message.to_string()));
        Ok(())
    }
}

#[async_trait::async_trait]
impl DeliveryChannel for MockDeliveryChannel {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<(), DeliveryError> {
        self.deliver(ChannelKind::Sms, phone, message).await
    }

    async fn send_email(&self, email: &str, message: &str) -> Result<(), DeliveryError> {
        self.deliver(ChannelKind::Email, email, message).await
    }
}
