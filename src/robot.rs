// Bundle of every collaborator a run needs
use std::sync::Arc;

use tracing::info;

use crate::config::RobotConfig;
use crate::drive::{self, DriveBase, Edge, Homing, StallOutcome, StallWait, Stripe};
use crate::hub::{Buttons, Clock, Color, ColorSensor, Motor, Panel, Result, Storage};
use crate::menu::FieldConfig;
use crate::messages::RunReport;

const TIMEOUT_TONE_HZ: u32 = 200;

/// Auxiliary tool motors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Left,
    Right,
}

/// The robot as handed to the selector and to every run
///
/// Built once at startup; nothing reaches hardware any other way.
pub struct Robot {
    pub drive: DriveBase,
    pub left_tool: Box<dyn Motor>,
    pub right_tool: Box<dyn Motor>,
    pub color: Box<dyn ColorSensor>,
    pub storage: Box<dyn Storage>,
    pub buttons: Box<dyn Buttons>,
    pub panel: Box<dyn Panel>,
    pub clock: Arc<dyn Clock>,
    pub tuning: RobotConfig,
}

impl Robot {
    pub fn wait(&self, ms: u32) {
        self.clock.wait(ms);
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn tool(&mut self, tool: Tool) -> &mut dyn Motor {
        match tool {
            Tool::Left => self.left_tool.as_mut(),
            Tool::Right => self.right_tool.as_mut(),
        }
    }

    /// Zero heading, wheel encoders and distance
    pub fn reset_pose(&mut self) -> Result<()> {
        self.drive.reset_heading()?;
        self.drive.reset_distance_and_wheels()
    }

    /// Block, beeping every 100 ms, until the gyro reports ready
    ///
    /// Returns the number of beeps it took.
    pub fn wait_for_gyro(&mut self) -> Result<u32> {
        let mut beeps = 0;
        while !self.drive.imu_ready()? {
            self.panel.beep(100, 100)?;
            self.clock.wait(100);
            beeps += 1;
        }
        if beeps > 0 {
            info!("Gyro ready after {} beeps", beeps);
        }
        Ok(beeps)
    }

    pub fn field_config(&mut self) -> Result<FieldConfig> {
        FieldConfig::load(self.storage.as_mut())
    }

    pub fn home_tool(&mut self, tool: Tool, homing: Homing) -> Result<f32> {
        drive::home(self.tool(tool), homing)
    }

    /// Wait for a running tool with the configured tick budget
    pub fn wait_tool(&mut self, tool: Tool) -> Result<StallOutcome> {
        let budget = self.tuning.stall_wait;
        self.wait_tool_for(tool, budget)
    }

    /// Wait for a running tool; a timeout is announced with a low tone
    pub fn wait_tool_for(&mut self, tool: Tool, budget: StallWait) -> Result<StallOutcome> {
        let motor = match tool {
            Tool::Left => self.left_tool.as_mut(),
            Tool::Right => self.right_tool.as_mut(),
        };
        let outcome = drive::wait_done_or_stalled(motor, self.clock.as_ref(), budget)?;
        if matches!(outcome, StallOutcome::TimedOut { .. }) {
            self.panel.beep(TIMEOUT_TONE_HZ, 100)?;
        }
        Ok(outcome)
    }

    /// Drive over a stripe with the configured edge budget
    pub fn find_stripe(&mut self) -> Result<Stripe> {
        drive::find_stripe(self.color.as_mut(), self.clock.as_ref(), self.tuning.edge_poll)
    }

    /// Wait for a single color edge with the configured budget
    pub fn wait_for_edge<P>(&mut self, target: P) -> Result<Edge>
    where
        P: Fn(Color) -> bool,
    {
        drive::wait_for_color_transition(
            self.color.as_mut(),
            self.clock.as_ref(),
            target,
            self.tuning.edge_poll,
        )
    }

    /// Snapshot pose and encoders for the end-of-run log
    pub fn report(&mut self, run: &str, started_ms: u64) -> Result<RunReport> {
        let (left_wheel, right_wheel) = self.drive.wheel_angles()?;
        Ok(RunReport {
            run: run.to_string(),
            left_wheel,
            right_wheel,
            distance: self.drive.distance()?,
            heading: self.drive.heading()?,
            elapsed_ms: self.clock.now_ms().saturating_sub(started_ms),
        })
    }
}
