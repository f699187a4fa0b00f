// Simulated SPIKE-style hub
//
// Provides:
// - A kinematic world stepped in 1 ms increments (chassis, wheels, tools, gyro, field)
// - Device handles implementing every hub trait over the shared world
// - Scripted buttons, recorded panel feedback, in-memory and file-backed storage
//
// Time only moves when a device blocks or the clock is waited on, so runs are
// deterministic. A `realtime` factor above zero paces the world against the
// wall clock for interactive use.

mod chassis;
mod devices;
mod motor;
mod storage;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::config::{AXLE_TRACK_MM, DEFAULT_SETTINGS, RobotConfig, WHEEL_DIAMETER_MM};
use crate::drive::{DriveBase, Geometry};
use crate::hub::{ButtonSet, Buttons, Chassis, HubError, MotionSettings, Port, Result, Storage};
use crate::robot::Robot;

pub use chassis::SimChassis;
pub use devices::{PanelEvent, SimButtons, SimClock, SimColorSensor, SimImu, SimPanel};
pub use motor::{MotorSlot, SimMotor};
pub use storage::{FileStorage, MemoryStorage, STORAGE_SIZE};

use chassis::ChassisModel;
use motor::MotorModel;

const STEP_MS: u64 = 1;
const PACE_CHUNK_MS: u64 = 10;
// Oldest panel events are dropped past this many
const PANEL_LOG_LIMIT: usize = 1024;

/// Physical setup of the simulated robot and field
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub geometry: Geometry,
    /// Chassis settings before anything configures it
    pub settings: MotionSettings,
    /// The gyro reports ready from this time on
    pub imu_ready_at_ms: u64,
    /// White stripes as [start, end) along the robot's net forward travel (mm)
    pub stripes: Vec<(f32, f32)>,
    pub left_tool_stops: (f32, f32),
    pub right_tool_stops: (f32, f32),
    pub battery_mv: u32,
    /// Wall-clock pacing; 0 runs as fast as possible
    pub realtime: f32,
    /// Scripted buttons disconnect this long after the last scripted release
    pub idle_limit_ms: u64,
    /// A blocking maneuver that takes longer than this is a device fault
    pub maneuver_limit_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::new(WHEEL_DIAMETER_MM, AXLE_TRACK_MM),
            settings: DEFAULT_SETTINGS,
            imu_ready_at_ms: 0,
            stripes: vec![(60.0, 85.0), (-85.0, -60.0)],
            left_tool_stops: (-400.0, 400.0),
            right_tool_stops: (-1000.0, 1200.0),
            battery_mv: 8324,
            realtime: 0.0,
            idle_limit_ms: 10_000,
            maneuver_limit_ms: 60_000,
        }
    }
}

impl SimConfig {
    /// Geometry and settings taken from the loaded tuning
    pub fn for_robot(tuning: &RobotConfig) -> Self {
        Self {
            geometry: Geometry::new(tuning.wheel_diameter_mm, tuning.axle_track_mm),
            settings: tuning.settings,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ScriptedPress {
    button: ButtonSet,
    start: u64,
    end: u64,
}

/// Shared state of the simulated robot and field
pub(crate) struct World {
    time_ms: u64,
    geometry: Geometry,
    wheels: [MotorModel; 2],
    tools: [MotorModel; 2],
    chassis: ChassisModel,
    /// True heading, never reset
    heading: f32,
    heading_offset: f32,
    /// Net forward travel over the field, never reset
    track: f32,
    imu_ready_at: u64,
    stripes: Vec<(f32, f32)>,
    presses: Vec<ScriptedPress>,
    idle_limit_ms: u64,
    maneuver_limit_ms: u64,
    panel: VecDeque<PanelEvent>,
    battery_mv: u32,
}

impl World {
    fn new(config: &SimConfig) -> Self {
        let (ll, lh) = config.left_tool_stops;
        let (rl, rh) = config.right_tool_stops;
        Self {
            time_ms: 0,
            geometry: config.geometry,
            wheels: [MotorModel::free(), MotorModel::free()],
            tools: [MotorModel::with_stops(ll, lh), MotorModel::with_stops(rl, rh)],
            chassis: ChassisModel::new(config.settings),
            heading: 0.0,
            heading_offset: 0.0,
            track: 0.0,
            imu_ready_at: config.imu_ready_at_ms,
            stripes: config.stripes.clone(),
            presses: Vec::new(),
            idle_limit_ms: config.idle_limit_ms,
            maneuver_limit_ms: config.maneuver_limit_ms,
            panel: VecDeque::new(),
            battery_mv: config.battery_mv,
        }
    }

    fn record_panel(&mut self, event: PanelEvent) {
        if self.panel.len() == PANEL_LOG_LIMIT {
            self.panel.pop_front();
        }
        self.panel.push_back(event);
    }

    /// Advance one millisecond
    fn step(&mut self) {
        let dt = STEP_MS as f32 / 1000.0;
        self.time_ms += STEP_MS;

        let (left, right) = match self.chassis.next_travel(dt, &self.geometry) {
            Some((left_mm, right_mm)) => (
                self.wheels[0].push(self.geometry.wheel_degrees(left_mm)),
                self.wheels[1].push(self.geometry.wheel_degrees(right_mm)),
            ),
            None => (self.wheels[0].advance(dt), self.wheels[1].advance(dt)),
        };
        for tool in &mut self.tools {
            tool.advance(dt);
        }

        self.heading += self.geometry.heading_change(left, right);
        self.track += self.geometry.distance(left, right);
    }

    fn pressed(&self) -> Result<ButtonSet> {
        let now = self.time_ms;
        let held: ButtonSet = self
            .presses
            .iter()
            .filter(|p| p.start <= now && now < p.end)
            .map(|p| p.button)
            .collect();

        if held.is_empty() {
            let last_release = self.presses.iter().map(|p| p.end).max().unwrap_or(0);
            let pending = self.presses.iter().any(|p| p.start > now);
            if !pending && now >= last_release + self.idle_limit_ms {
                return Err(HubError::Disconnected);
            }
        }
        Ok(held)
    }

    fn on_stripe(&self) -> bool {
        self.stripes
            .iter()
            .any(|&(start, end)| start <= self.track && self.track < end)
    }
}

/// Handle on the simulated hub; clones share the same world
#[derive(Clone)]
pub struct SimHub {
    world: Arc<Mutex<World>>,
    realtime: f32,
}

impl SimHub {
    pub fn new(config: SimConfig) -> Self {
        debug!("Simulated hub: {:?}", config);
        Self {
            realtime: config.realtime,
            world: Arc::new(Mutex::new(World::new(&config))),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Let `ms` of simulated time pass
    pub fn advance(&self, ms: u64) {
        let mut paced = 0;
        for _ in 0..ms / STEP_MS {
            self.lock().step();
            paced += STEP_MS;
            if paced >= PACE_CHUNK_MS {
                self.pace(paced);
                paced = 0;
            }
        }
        self.pace(paced);
    }

    /// Step until `done` holds, failing once the maneuver limit is exceeded
    pub(crate) fn advance_until<F>(&self, port: Port, mut done: F) -> Result<()>
    where
        F: FnMut(&World) -> bool,
    {
        let (started, limit) = {
            let world = self.lock();
            (world.time_ms, world.maneuver_limit_ms)
        };
        let mut paced = 0;
        loop {
            {
                let mut world = self.lock();
                if done(&world) {
                    break;
                }
                if world.time_ms - started >= limit {
                    return Err(HubError::Device {
                        port,
                        reason: format!("maneuver still running after {}ms", limit),
                    });
                }
                world.step();
            }
            paced += STEP_MS;
            if paced >= PACE_CHUNK_MS {
                self.pace(paced);
                paced = 0;
            }
        }
        self.pace(paced);
        Ok(())
    }

    /// Sleep off simulated time when running against the wall clock
    fn pace(&self, ms: u64) {
        if self.realtime > 0.0 && ms > 0 {
            thread::sleep(Duration::from_secs_f32(ms as f32 / 1000.0 / self.realtime));
        }
    }

    pub fn time_ms(&self) -> u64 {
        self.lock().time_ms
    }

    /// Hold `button` from `start_ms` for `hold_ms`
    pub fn press_at(&self, start_ms: u64, hold_ms: u64, button: ButtonSet) {
        self.lock().presses.push(ScriptedPress {
            button,
            start: start_ms,
            end: start_ms + hold_ms,
        });
    }

    pub fn set_imu_ready_at(&self, ms: u64) {
        self.lock().imu_ready_at = ms;
    }

    /// Feedback recorded so far, oldest first
    /// Panel feedback recorded so far, oldest first
    pub fn panel_events(&self) -> Vec<PanelEvent> {
        self.lock().panel.iter().cloned().collect()
    }

    /// Net forward travel of the robot over the field (mm)
    pub fn track(&self) -> f32 {
        self.lock().track
    }

    /// True heading, unaffected by gyro resets
    pub fn true_heading(&self) -> f32 {
        self.lock().heading
    }

    pub fn chassis(&self) -> SimChassis {
        SimChassis::new(self.clone())
    }

    pub fn motor(&self, slot: MotorSlot) -> SimMotor {
        SimMotor::new(self.clone(), slot)
    }

    pub fn imu(&self) -> SimImu {
        SimImu::new(self.clone())
    }

    pub fn color_sensor(&self) -> SimColorSensor {
        SimColorSensor::new(self.clone())
    }

    pub fn buttons(&self) -> SimButtons {
        SimButtons::new(self.clone())
    }

    pub fn panel(&self) -> SimPanel {
        SimPanel::new(self.clone())
    }

    pub fn clock(&self) -> SimClock {
        SimClock::new(self.clone())
    }

    /// Assemble a robot over this hub with scripted buttons
    pub fn robot(&self, storage: Box<dyn Storage>, tuning: RobotConfig) -> Result<Robot> {
        self.robot_with_buttons(storage, Box::new(self.buttons()), tuning)
    }

    /// Assemble a robot over this hub, taking button input from elsewhere
    pub fn robot_with_buttons(
        &self,
        storage: Box<dyn Storage>,
        buttons: Box<dyn Buttons>,
        tuning: RobotConfig,
    ) -> Result<Robot> {
        let clock = Arc::new(self.clock());
        let mut chassis = self.chassis();
        chassis.configure(tuning.settings)?;

        let drive = DriveBase::new(
            Box::new(chassis),
            Box::new(self.motor(MotorSlot::LeftWheel)),
            Box::new(self.motor(MotorSlot::RightWheel)),
            Box::new(self.imu()),
            clock.clone(),
        )?;

        Ok(Robot {
            drive,
            left_tool: Box::new(self.motor(MotorSlot::LeftTool)),
            right_tool: Box::new(self.motor(MotorSlot::RightTool)),
            color: Box::new(self.color_sensor()),
            storage,
            buttons,
            panel: Box::new(self.panel()),
            clock,
            tuning,
        })
    }
}
