// Value types shared by every device on the hub

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// What a motor or the chassis does once a maneuver completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stop {
    /// Let the motor spin freely
    Coast,
    /// Coast, but remember the overshoot for the next relative maneuver
    CoastSmart,
    /// Passive short-circuit braking
    Brake,
    /// Actively hold the final position
    #[default]
    Hold,
    /// Keep moving at the current speed so the next command blends in
    None,
}

/// Ports on the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

bitflags! {
    /// Front panel buttons held at one instant
    ///
    /// A single flag names one button.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ButtonSet: u8 {
        const LEFT = 0b0001;
        const CENTER = 0b0010;
        const RIGHT = 0b0100;
        const BLUETOOTH = 0b1000;
    }
}

impl ButtonSet {
    /// True when LEFT or RIGHT is part of the set
    pub fn has_arrow(&self) -> bool {
        self.intersects(ButtonSet::LEFT | ButtonSet::RIGHT)
    }
}

/// Colors reported by the reflectance sensor and shown on the status light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    White,
    Red,
    Green,
    Blue,
    Magenta,
    Orange,
    Yellow,
    /// No color detected, or the light is off
    None,
}

impl Color {
    pub fn is_white(self) -> bool {
        self == Color::White
    }
}

/// Speed and acceleration limits of the chassis controller
///
/// Straight values are in mm/s and mm/s², turn values in deg/s and deg/s².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSettings {
    pub straight_speed: f32,
    pub straight_acceleration: f32,
    pub turn_speed: f32,
    pub turn_acceleration: f32,
}

impl MotionSettings {
    pub const fn new(
        straight_speed: f32,
        straight_acceleration: f32,
        turn_speed: f32,
        turn_acceleration: f32,
    ) -> Self {
        Self {
            straight_speed,
            straight_acceleration,
            turn_speed,
            turn_acceleration,
        }
    }

    pub fn with_straight_speed(self, straight_speed: f32) -> Self {
        Self {
            straight_speed,
            ..self
        }
    }

    pub fn with_turn_speed(self, turn_speed: f32) -> Self {
        Self { turn_speed, ..self }
    }
}

/// 5x5 brightness grid for the light matrix, rows top to bottom
pub type Pattern = [[u8; 5]; 5];
