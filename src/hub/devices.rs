// Capability traits for the hub's devices
//
// The drive wrapper, menu and runs only ever talk to hardware through these.
// Angles are degrees, distances millimetres, speeds per second. A method that
// takes `wait: bool` blocks until the maneuver completes when it is true and
// returns as soon as the command is issued when it is false.

use super::types::{ButtonSet, Color, MotionSettings, Pattern, Stop};
use super::Result;

/// Gyro-assisted differential drive controller
pub trait Chassis: Send {
    /// Drive straight for a relative distance
    fn straight(&mut self, distance: f32, then: Stop, wait: bool) -> Result<()>;

    /// Rotate in place by a relative angle (positive = clockwise)
    fn turn(&mut self, angle: f32, then: Stop, wait: bool) -> Result<()>;

    /// Drive along an arc; blocks until complete
    fn curve(&mut self, radius: f32, angle: f32, then: Stop) -> Result<()>;

    /// Open-loop velocity command, returns immediately
    fn drive(&mut self, speed: f32, turn_rate: f32) -> Result<()>;

    /// Distance accumulated since the last `reset`
    fn distance(&mut self) -> Result<f32>;

    fn settings(&mut self) -> Result<MotionSettings>;

    fn configure(&mut self, settings: MotionSettings) -> Result<()>;

    fn brake(&mut self) -> Result<()>;

    /// Stop without holding torque
    fn stop(&mut self) -> Result<()>;

    /// Zero the distance accumulator
    fn reset(&mut self) -> Result<()>;
}

/// Rotary actuator with an encoder
pub trait Motor: Send {
    /// Run at constant speed until told otherwise
    fn run(&mut self, speed: f32) -> Result<()>;

    /// Rotate by a relative angle
    fn run_angle(&mut self, speed: f32, angle: f32, then: Stop, wait: bool) -> Result<()>;

    /// Run until the firmware reports a stall and return the angle where it stopped
    ///
    /// `duty_limit` caps the torque in percent so the motor gives up against a
    /// hard stop instead of forcing it.
    fn run_until_stalled(&mut self, speed: f32, then: Stop, duty_limit: Option<u8>) -> Result<f32>;

    fn angle(&mut self) -> Result<f32>;

    fn reset_angle(&mut self, angle: f32) -> Result<()>;

    /// True once the last maneuver has completed
    fn done(&mut self) -> Result<bool>;

    /// True while the motor cannot reach the commanded speed
    fn stalled(&mut self) -> Result<bool>;

    fn brake(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;
}

/// Orientation sensor
pub trait Imu: Send {
    /// Accumulated heading (positive = clockwise)
    fn heading(&mut self) -> Result<f32>;

    fn reset_heading(&mut self, angle: f32) -> Result<()>;

    /// True once the gyro has calibrated and is not drifting
    fn ready(&mut self) -> Result<bool>;
}

pub trait ColorSensor: Send {
    fn color(&mut self) -> Result<Color>;
}

/// Non-volatile byte storage that survives power cycles
pub trait Storage: Send {
    fn read(&mut self, offset: usize, count: usize) -> Result<Vec<u8>>;

    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<()>;
}

pub trait Buttons: Send {
    fn pressed(&mut self) -> Result<ButtonSet>;
}

/// Operator-facing surface: light matrix, status light, speaker and battery gauge
pub trait Panel: Send {
    fn show_pattern(&mut self, pattern: &Pattern) -> Result<()>;

    fn show_char(&mut self, c: char) -> Result<()>;

    fn display_off(&mut self) -> Result<()>;

    /// Set the status light; `Color::None` turns it off
    fn light(&mut self, color: Color) -> Result<()>;

    /// Cycle the status light through `colors` until the next `light` call
    fn blink(&mut self, colors: &[Color], interval_ms: u32) -> Result<()>;

    /// Play a tone; blocks for `duration_ms`
    fn beep(&mut self, frequency: u32, duration_ms: u32) -> Result<()>;

    fn battery_voltage(&mut self) -> Result<u32>;
}

/// Monotonic time source with a blocking sleep
pub trait Clock: Send + Sync {
    fn wait(&self, ms: u32);

    fn now_ms(&self) -> u64;
}
