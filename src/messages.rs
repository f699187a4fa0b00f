// Structured records the runtime writes to the log

use serde::{Deserialize, Serialize};

use crate::hub::MotionSettings;

/// Pose and encoder readings at the end of a run, logged as JSON so runs
/// can be compared while tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub run: String,
    pub left_wheel: f32,
    pub right_wheel: f32,
    pub distance: f32,
    pub heading: f32,
    pub elapsed_ms: u64,
}

/// Hub status logged once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubStatus {
    pub battery_mv: u32,
    pub settings: MotionSettings,
    /// Stored field configuration, after clamping
    pub field: u8,
}

/// Where the selector is, as seen from the outside
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum MenuState {
    Idle { selection: u8 },
    Running { selection: u8 },
    Configuring { field: u8 },
}
