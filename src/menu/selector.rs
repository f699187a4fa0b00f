// Run selector state machine
//
// Idle loop: re-zero the pose, make sure the gyro is usable, show the armed
// run and wait for a press. CENTER launches, LEFT/RIGHT move the selection,
// a long LEFT/RIGHT opens the field config sub-mode.

use tracing::{debug, info, warn};

use super::field::FieldConfig;
use super::press::{Press, await_press, wait_press, wait_release};
use super::selection::RunSelection;
use crate::config::AFTER_RUN_PAUSE_MS;
use crate::hub::{ButtonSet, Color, HubError, Pattern, Result};
use crate::messages::{MenuState, RunReport};
use crate::robot::Robot;
use crate::runs::RunScript;

const ONE: Pattern = [[0, 0, 100, 0, 0]; 5];

const TWO: Pattern = [
    [0, 100, 100, 0, 0],
    [0, 0, 0, 100, 0],
    [0, 0, 100, 0, 0],
    [0, 100, 0, 0, 0],
    [0, 100, 100, 100, 0],
];

const THREE: Pattern = [
    [0, 100, 100, 100, 0],
    [0, 0, 0, 100, 0],
    [0, 0, 100, 100, 0],
    [0, 0, 0, 100, 0],
    [0, 100, 100, 100, 0],
];

/// Shown when the selection has no pattern of its own
const FULL: Pattern = [[100; 5]; 5];

const MOVE_TONE_HZ: u32 = 440;
const CONFIG_TONE_HZ: u32 = 500;
const CHANGE_TONE_HZ: u32 = 400;
const INVALID_TONE_HZ: u32 = 200;
const TONE_MS: u32 = 100;

/// What one pass through the idle loop did
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEvent {
    Moved(RunSelection),
    Ran(RunReport),
    Configured(FieldConfig),
    Ignored,
}

pub struct Selector {
    selection: RunSelection,
    runs: Vec<Box<dyn RunScript>>,
    long_press_ms: u64,
}

impl Selector {
    pub fn new(runs: Vec<Box<dyn RunScript>>, long_press_ms: u64) -> Self {
        let count = u8::try_from(runs.len()).unwrap_or(u8::MAX);
        Self {
            selection: RunSelection::first(count),
            runs,
            long_press_ms,
        }
    }

    pub fn selection(&self) -> RunSelection {
        self.selection
    }

    /// Arm run `number` directly, bypassing the buttons
    pub fn arm(&mut self, number: u8) -> Result<()> {
        self.selection =
            RunSelection::nth(number, self.selection.count()).ok_or(HubError::UnknownRun(number))?;
        Ok(())
    }

    /// Loop until the button input goes away
    pub fn run(&mut self, robot: &mut Robot) -> Result<()> {
        loop {
            match self.step(robot) {
                Ok(event) => debug!("Menu: {:?}", event),
                Err(HubError::Disconnected) => {
                    info!("Button input closed, leaving the menu");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One idle iteration: wait for a press and act on it
    pub fn step(&mut self, robot: &mut Robot) -> Result<MenuEvent> {
        robot.reset_pose()?;
        ensure_gyro(robot)?;
        show_selection(robot, self.selection)?;
        log_state(MenuState::Idle {
            selection: self.selection.number(),
        });

        let press = await_press(
            robot.buttons.as_mut(),
            robot.clock.as_ref(),
            self.long_press_ms,
        )?;
        self.dispatch(robot, press)
    }

    /// Act on a classified press
    ///
    /// CENTER wins over LEFT, LEFT over RIGHT when several are held.
    pub fn dispatch(&mut self, robot: &mut Robot, press: Press) -> Result<MenuEvent> {
        match press {
            Press::Long(_) => {
                let field = configure(robot)?;
                robot.panel.display_off()?;
                robot.panel.light(Color::None)?;
                wait_release(robot.buttons.as_mut(), robot.clock.as_ref())?;
                Ok(MenuEvent::Configured(field))
            }
            Press::Short(buttons) if buttons.contains(ButtonSet::CENTER) => {
                Ok(MenuEvent::Ran(self.launch(robot)?))
            }
            Press::Short(buttons) if buttons.contains(ButtonSet::LEFT) => {
                self.moved(robot, self.selection.prev())
            }
            Press::Short(buttons) if buttons.contains(ButtonSet::RIGHT) => {
                self.moved(robot, self.selection.next())
            }
            Press::Short(_) | Press::Overheld(_) => Ok(MenuEvent::Ignored),
        }
    }

    fn moved(&mut self, robot: &mut Robot, selection: RunSelection) -> Result<MenuEvent> {
        self.selection = selection;
        show_selection(robot, selection)?;
        robot.panel.beep(MOVE_TONE_HZ, TONE_MS)?;
        Ok(MenuEvent::Moved(selection))
    }

    /// Run the armed script, then arm the next one
    pub fn launch(&mut self, robot: &mut Robot) -> Result<RunReport> {
        let number = self.selection.number();
        let run = self
            .runs
            .get(self.selection.index())
            .ok_or(HubError::UnknownRun(number))?;

        log_state(MenuState::Running { selection: number });
        info!("Starting {}", run.name());
        robot.reset_pose()?;
        let started = robot.now_ms();
        run.run(robot)?;

        let report = robot.report(run.name(), started)?;
        info!("Run finished: {}", serde_json::to_string(&report)?);

        self.selection = self.selection.next();
        robot.wait(AFTER_RUN_PAUSE_MS);
        Ok(report)
    }
}

fn log_state(state: MenuState) {
    match serde_json::to_string(&state) {
        Ok(json) => debug!("Menu state {}", json),
        Err(e) => warn!("Failed to encode menu state: {}", e),
    }
}

/// Block with a red light until the gyro is usable again
fn ensure_gyro(robot: &mut Robot) -> Result<()> {
    if robot.drive.imu_ready()? {
        return Ok(());
    }
    warn!("Gyro not ready, holding the menu");
    robot.panel.light(Color::Red)?;
    robot.panel.display_off()?;
    robot.wait_for_gyro()?;
    robot.panel.light(Color::Green)?;
    robot.panel.beep(CONFIG_TONE_HZ, TONE_MS)?;
    robot.wait(400);
    Ok(())
}

/// Digit and light color of the armed run
pub fn show_selection(robot: &mut Robot, selection: RunSelection) -> Result<()> {
    let shown = match selection.number() {
        1 => Some((ONE, Color::Green)),
        2 => Some((TWO, Color::Red)),
        3 => Some((THREE, Color::Blue)),
        _ => None,
    };
    match shown {
        Some((pattern, color)) => {
            robot.panel.show_pattern(&pattern)?;
            robot.panel.light(color)
        }
        None => {
            robot.panel.show_pattern(&FULL)?;
            robot.panel.beep(INVALID_TONE_HZ, TONE_MS)?;
            robot.panel.light(Color::None)
        }
    }
}

fn show_field(robot: &mut Robot, field: FieldConfig) -> Result<()> {
    robot.panel.display_off()?;
    robot.panel.show_char(field.letter())?;
    robot.panel.light(field.color())?;
    robot.panel.beep(CHANGE_TONE_HZ, TONE_MS)
}

/// Field config sub-mode
///
/// LEFT/RIGHT cycle the stored value and write it immediately; CENTER leaves.
pub fn configure(robot: &mut Robot) -> Result<FieldConfig> {
    robot.panel.display_off()?;
    robot.panel.beep(CONFIG_TONE_HZ, TONE_MS)?;
    robot.wait(50);
    robot.panel.beep(CONFIG_TONE_HZ, TONE_MS)?;

    let mut field = robot.field_config()?;
    log_state(MenuState::Configuring {
        field: field.as_byte(),
    });
    show_field(robot, field)?;

    loop {
        wait_release(robot.buttons.as_mut(), robot.clock.as_ref())?;
        let pressed = wait_press(robot.buttons.as_mut(), robot.clock.as_ref())?;

        if pressed.contains(ButtonSet::CENTER) {
            info!("Field config {:?} ({})", field, field.letter());
            robot.panel.beep(CONFIG_TONE_HZ, TONE_MS)?;
            robot.wait(300);
            return Ok(field);
        }
        let changed = if pressed.contains(ButtonSet::LEFT) {
            field.prev()
        } else if pressed.contains(ButtonSet::RIGHT) {
            field.next()
        } else {
            continue;
        };
        field = changed;
        field.save(robot.storage.as_mut())?;
        show_field(robot, field)?;
    }
}
