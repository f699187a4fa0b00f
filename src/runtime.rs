// Startup sequence and the host loop around the menu
//
// The menu and the runs are blocking code driven by the hub clock, so they
// live on a blocking task. The keyboard stands in for the hub's buttons and
// is read on a second blocking task.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tracing::{info, warn};

use crate::config::RobotConfig;
use crate::hub::{self, ButtonSet, Buttons, Color, HubError, Storage};
use crate::menu::Selector;
use crate::messages::{HubStatus, RunReport};
use crate::robot::Robot;
use crate::runs::competition_runs;
use crate::sim::{FileStorage, MemoryStorage, SimConfig, SimHub};

// Simulated gyro calibration after power-on
const GYRO_WARMUP_MS: u64 = 1500;

// A key counts as held this long after its last press or repeat event
const KEY_HOLD: Duration = Duration::from_millis(700);
const KEY_POLL: Duration = Duration::from_millis(20);

/// Everything the binary takes from the command line
#[derive(Debug, Clone)]
pub struct Options {
    pub storage: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub realtime: f32,
    /// Run this script once without the menu, then exit
    pub run: Option<u8>,
}

/// Power-on sequence: report, wait for the gyro, confirm, zero everything
pub fn startup(robot: &mut Robot) -> hub::Result<HubStatus> {
    let field = robot.field_config()?;
    let status = HubStatus {
        battery_mv: robot.panel.battery_voltage()?,
        settings: robot.drive.settings()?,
        field: field.as_byte(),
    };
    info!("Hub status: {}", serde_json::to_string(&status)?);

    robot.panel.blink(&[Color::Red, Color::Black], 200)?;
    robot.wait_for_gyro()?;
    robot.panel.beep(440, 100)?;
    robot.panel.beep(590, 100)?;
    robot.panel.light(Color::Green)?;

    robot.left_tool.reset_angle(0.0)?;
    robot.right_tool.reset_angle(0.0)?;
    robot.reset_pose()?;
    Ok(status)
}

/// Start up and launch one run without the menu
pub fn run_once(robot: &mut Robot, number: u8) -> hub::Result<RunReport> {
    startup(robot)?;
    let mut selector = Selector::new(competition_runs(), robot.tuning.long_press_ms);
    selector.arm(number)?;
    selector.launch(robot)
}

#[derive(Default)]
struct KeyState {
    /// Button and the instant its hold expires
    held: Vec<(ButtonSet, Instant)>,
    closed: bool,
}

/// Hub buttons emulated from key events
///
/// Terminals only report presses and auto-repeats, so each event holds the
/// button for a short window.
#[derive(Clone)]
pub struct KeyboardButtons {
    state: Arc<Mutex<KeyState>>,
    hold: Duration,
}

impl KeyboardButtons {
    pub fn new(hold: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(KeyState::default())),
            hold,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, KeyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn press(&self, button: ButtonSet) {
        self.press_at(button, Instant::now());
    }

    fn press_at(&self, button: ButtonSet, at: Instant) {
        let mut state = self.lock();
        state.held.retain(|(b, _)| *b != button);
        state.held.push((button, at + self.hold));
    }

    pub fn release(&self, button: ButtonSet) {
        self.lock().held.retain(|(b, _)| *b != button);
    }

    /// Stop accepting input; the menu sees a disconnect on its next poll
    pub fn close(&self) {
        self.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn held_at(&self, now: Instant) -> hub::Result<ButtonSet> {
        let state = self.lock();
        if state.closed {
            return Err(HubError::Disconnected);
        }
        Ok(state
            .held
            .iter()
            .filter(|(_, until)| now < *until)
            .map(|(button, _)| *button)
            .collect())
    }
}

impl Buttons for KeyboardButtons {
    fn pressed(&mut self) -> hub::Result<ButtonSet> {
        self.held_at(Instant::now())
    }
}

fn button_for(code: KeyCode) -> Option<ButtonSet> {
    match code {
        KeyCode::Left | KeyCode::Char('a') => Some(ButtonSet::LEFT),
        KeyCode::Right | KeyCode::Char('d') => Some(ButtonSet::RIGHT),
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('s') => Some(ButtonSet::CENTER),
        _ => None,
    }
}

/// Feed key events into `keys` until quit is requested or the keys are closed
fn read_keys(keys: &KeyboardButtons) -> std::io::Result<()> {
    while !keys.is_closed() {
        if !event::poll(KEY_POLL)? {
            continue;
        }
        let Event::Key(KeyEvent {
            code,
            kind,
            modifiers,
            ..
        }) = event::read()?
        else {
            continue;
        };

        let quit = matches!(code, KeyCode::Char('q') | KeyCode::Esc)
            || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL));
        if quit {
            info!("Quit requested");
            keys.close();
            break;
        }

        if let Some(button) = button_for(code) {
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => keys.press(button),
                KeyEventKind::Release => keys.release(button),
            }
        }
    }
    Ok(())
}

pub async fn run(options: Options) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let tuning = match &options.config {
        Some(path) => RobotConfig::load(path)?,
        None => RobotConfig::default(),
    };
    let storage: Box<dyn Storage> = match &options.storage {
        Some(path) => Box::new(FileStorage::open(path)?),
        None => {
            info!("No storage file given, field config is kept in memory only");
            Box::new(MemoryStorage::new())
        }
    };

    let mut realtime = options.realtime;
    if options.run.is_none() && realtime <= 0.0 {
        warn!("The menu needs wall-clock pacing to time presses, using realtime 1.0");
        realtime = 1.0;
    }
    let hub = SimHub::new(SimConfig {
        realtime,
        imu_ready_at_ms: GYRO_WARMUP_MS,
        ..SimConfig::for_robot(&tuning)
    });

    if let Some(number) = options.run {
        let mut robot = hub.robot(storage, tuning)?;
        info!("Headless run {}", number);
        tokio::task::spawn_blocking(move || run_once(&mut robot, number)).await??;
        return Ok(());
    }

    let keys = KeyboardButtons::new(KEY_HOLD);
    let mut robot = hub.robot_with_buttons(storage, Box::new(keys.clone()), tuning)?;
    let long_press_ms = robot.tuning.long_press_ms;

    info!("Buttons: Left/A = LEFT, Right/D = RIGHT, Enter/Space/S = CENTER, Q/Esc = quit");
    info!("Hold LEFT or RIGHT for {}ms to edit the field config", long_press_ms);

    enable_raw_mode()?;
    let reader = tokio::task::spawn_blocking({
        let keys = keys.clone();
        move || read_keys(&keys)
    });
    let menu = tokio::task::spawn_blocking(move || -> hub::Result<()> {
        startup(&mut robot)?;
        Selector::new(competition_runs(), long_press_ms).run(&mut robot)
    });

    let result: Result<(), Box<dyn std::error::Error + Send + Sync>> = tokio::select! {
        joined = menu => match joined {
            Ok(outcome) => outcome.map_err(Into::into),
            Err(e) => Err(e.into()),
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, finishing the current move");
            Ok(())
        }
    };

    keys.close();
    let read = reader.await;
    disable_raw_mode()?;

    if let Ok(Err(e)) = read {
        warn!("Keyboard reader failed: {}", e);
    }
    info!("Runtime stopped");
    result
}
