//! Domain services for Trinetra.
//!
//! Services contain business logic that operates on domain models.

pub mod dispatch;
pub mod geo;
pub mod secret;

pub use dispatch::{
    ChannelKind, ContactDispatch, DeliveryChannel, DeliveryError, DispatchOutcome, DispatchReport,
    FailureReason, MockDeliveryChannel, SosDispatcher,
};
pub use geo::{distance_meters, fence_contains};
pub use secret::{SecretVerifier, Sha256SecretVerifier};
