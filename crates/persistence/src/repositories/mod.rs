//! Repository implementations.
//!
//! One repository per entity, keyed by the entity's natural key:
//! geofences by (user, geofence id), locations and command state by
//! device id, allow-lists by (user, device).

pub mod command_state;
pub mod geofence;
pub mod location;
pub mod safe_apps;

pub use command_state::CommandStateRepository;
pub use geofence::GeofenceRepository;
pub use location::LocationRepository;
pub use safe_apps::SafeAppRepository;
