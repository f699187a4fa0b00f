// Hardware boundary of the robot
//
// Provides:
// - Capability traits for the chassis, motors, sensors, storage, buttons and panel
// - Shared value types (stop modes, buttons, colors, motion settings)
// - The error type every device call reports

mod devices;
pub mod types;

pub use devices::{Buttons, Chassis, Clock, ColorSensor, Imu, Motor, Panel, Storage};
pub use types::{ButtonSet, Color, MotionSettings, Pattern, Port, Stop};

/// Error types for hub devices
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Device on port {port} failed: {reason}")]
    Device { port: Port, reason: String },

    #[error("Storage access out of range: {count} bytes at offset {offset}")]
    StorageRange { offset: usize, count: usize },

    #[error("No run registered for selection {0}")]
    UnknownRun(u8),

    #[error("Button input disconnected")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, HubError>;
