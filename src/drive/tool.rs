// Stall-aware actuation of the tool motors

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{POLL_MS, STALL_TICK_BUDGET};
use crate::hub::{Clock, Motor, Result, Stop};

/// Homing run against a mechanical hard stop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homing {
    pub speed: f32,
    pub then: Stop,
    /// Torque cap in percent while seeking the stop
    pub duty_limit: Option<u8>,
    /// Move off the stop before latching zero
    pub back_off: Option<BackOff>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackOff {
    pub speed: f32,
    pub angle: f32,
    pub wait: bool,
}

impl Homing {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            then: Stop::Hold,
            duty_limit: None,
            back_off: None,
        }
    }

    pub fn duty_limit(mut self, percent: u8) -> Self {
        self.duty_limit = Some(percent);
        self
    }

    pub fn back_off(mut self, speed: f32, angle: f32, wait: bool) -> Self {
        self.back_off = Some(BackOff { speed, angle, wait });
        self
    }
}

/// Drive a tool into its hard stop and make that the zero reference
///
/// Returns the encoder angle at which the stall was reported.
pub fn home(motor: &mut dyn Motor, homing: Homing) -> Result<f32> {
    let hit = motor.run_until_stalled(homing.speed, homing.then, homing.duty_limit)?;
    debug!("Tool stalled at {} ({:?})", hit, homing);

    if let Some(back_off) = homing.back_off {
        motor.run_angle(back_off.speed, back_off.angle, Stop::Hold, back_off.wait)?;
    }
    motor.reset_angle(0.0)?;
    Ok(hit)
}

/// Tick budget for waiting on a running tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StallWait {
    pub tick_budget: u32,
    pub poll_ms: u32,
}

impl Default for StallWait {
    fn default() -> Self {
        Self {
            tick_budget: STALL_TICK_BUDGET,
            poll_ms: POLL_MS,
        }
    }
}

/// How a bounded tool wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallOutcome {
    Done { ticks: u32 },
    Stalled { ticks: u32 },
    /// Neither flag came up; the motor was stopped
    TimedOut { ticks: u32 },
}

impl StallOutcome {
    pub fn ticks(self) -> u32 {
        match self {
            StallOutcome::Done { ticks }
            | StallOutcome::Stalled { ticks }
            | StallOutcome::TimedOut { ticks } => ticks,
        }
    }
}

/// Poll a running motor until it finishes or stalls, giving up after the tick budget
///
/// A timeout is not an error: the motor is stopped and the caller carries on.
pub fn wait_done_or_stalled(
    motor: &mut dyn Motor,
    clock: &dyn Clock,
    wait: StallWait,
) -> Result<StallOutcome> {
    for tick in 0..wait.tick_budget {
        if motor.done()? {
            return Ok(StallOutcome::Done { ticks: tick });
        }
        if motor.stalled()? {
            debug!("Tool stalled after {} ticks", tick);
            return Ok(StallOutcome::Stalled { ticks: tick });
        }
        clock.wait(wait.poll_ms);
    }

    warn!(
        "Tool neither done nor stalled after {} ticks of {}ms, stopping it",
        wait.tick_budget, wait.poll_ms
    );
    motor.stop()?;
    Ok(StallOutcome::TimedOut {
        ticks: wait.tick_budget,
    })
}
