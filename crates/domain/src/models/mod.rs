//! Domain models for Trinetra.

pub mod command;
pub mod contact;
pub mod geofence;
pub mod location;
pub mod safe_apps;

pub use command::{CommandError, CommandState, DeviceCommandState};
pub use contact::Contact;
pub use geofence::Geofence;
pub use location::DeviceLocation;
pub use safe_apps::SafeAppAllowList;
