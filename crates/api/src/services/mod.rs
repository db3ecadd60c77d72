//! Application services.

pub mod delivery;
pub mod device_control;

pub use delivery::{ConsoleDeliveryChannel, GatewayDeliveryChannel};
pub use device_control::{
    DeviceControlService, DeviceTransport, LoggingDeviceTransport, TransportError,
};
