//! Emergency contact model for SOS dispatch.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// An emergency contact reachable by phone (SMS-class channel) and/or
/// email. At least one channel is required for a contact to be useful;
/// a contact with neither is still accepted at the type level and is
/// reported as skipped by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[validate(custom(function = "validate_optional_phone"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[validate(email(message = "Email must be a valid address"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

fn validate_optional_phone(phone: &str) -> Result<(), validator::ValidationError> {
    shared::validation::validate_phone(phone)
}

impl Contact {
    /// Whether the contact has at least one reachable channel.
    pub fn has_channel(&self) -> bool {
        self.phone.is_some() || self.email.is_some()
    }

    /// Stable label for logs and dispatch reports: phone if present,
    /// else email, else name, else a placeholder.
    pub fn label(&self) -> String {
        self.phone
            .clone()
            .or_else(|| self.email.clone())
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| "<no channel>".to_string())
    }
}
