// Tunables for the one physical build this runtime drives
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::drive::{EdgePoll, StallWait};
use crate::hub::{MotionSettings, Result};

// Chassis geometry
pub const WHEEL_DIAMETER_MM: f32 = 62.4;
pub const AXLE_TRACK_MM: f32 = 110.0;

// Chassis speed limits: straight_speed, straight_acceleration, turn_speed, turn_acceleration
pub const DEFAULT_SETTINGS: MotionSettings =
    MotionSettings::new(217.0 * 1.5, 816.0, 189.0, 851.0 * 0.75);

// Pause after a maneuver so the chassis stops rocking
pub const STRAIGHT_SETTLE_MS: u32 = 50;
pub const TURN_SETTLE_MS: u32 = 100;

// Wheel-angle moves bypass the chassis controller
pub const WHEEL_MOVE_SPEED: f32 = 700.0;

// Polling loops
pub const POLL_MS: u32 = 1;
pub const EDGE_MAX_TICKS: u32 = 30;
pub const STALL_TICK_BUDGET: u32 = 1000;

// Menu
pub const RUN_COUNT: u8 = 3;
pub const LONG_PRESS_MS: u64 = 2000;
pub const AFTER_RUN_PAUSE_MS: u32 = 100;

// Persisted field configuration: one byte at this offset
pub const FIELD_CONFIG_OFFSET: usize = 0;

/// Overridable tunables, loaded from a JSON file
///
/// Any field left out of the file keeps its compiled-in default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub settings: MotionSettings,
    pub wheel_diameter_mm: f32,
    pub axle_track_mm: f32,
    pub long_press_ms: u64,
    pub edge_poll: EdgePoll,
    pub stall_wait: StallWait,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            settings: DEFAULT_SETTINGS,
            wheel_diameter_mm: WHEEL_DIAMETER_MM,
            axle_track_mm: AXLE_TRACK_MM,
            long_press_ms: LONG_PRESS_MS,
            edge_poll: EdgePoll::default(),
            stall_wait: StallWait::default(),
        }
    }
}

impl RobotConfig {
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
