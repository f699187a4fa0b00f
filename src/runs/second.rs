// Run 2: mixer, expert and theater, then the far wall

use tracing::info;

use super::RunScript;
use crate::drive::{Direction, HeadingLimit, Homing, Move, Side, StallOutcome};
use crate::hub::{Color, Result, Stop};
use crate::menu::FieldConfig;
use crate::robot::{Robot, Tool};

pub struct SecondRun;

impl RunScript for SecondRun {
    fn name(&self) -> &'static str {
        "run 2"
    }

    fn run(&self, robot: &mut Robot) -> Result<()> {
        robot.reset_pose()?;

        robot.home_tool(
            Tool::Left,
            Homing::new(200.0).duty_limit(50).back_off(200.0, -20.0, false),
        )?;

        robot.right_tool.run_angle(900.0, 1100.0, Stop::None, true)?;
        if let StallOutcome::Stalled { .. } = robot.wait_tool(Tool::Right)? {
            robot.panel.beep(440, 100)?;
        }
        robot.right_tool.brake()?;

        robot.drive.goto_distance(-50.0, Move::new().speed(200.0).then(Stop::None))?;
        robot.drive.goto_wheel_angle(-10000.0, Move::new().speed(300.0).no_wait())?;
        robot.wait(400);
        robot.drive.brake()?;
        robot.reset_pose()?;

        robot.drive.pivot_until(Side::Left, 100.0, HeadingLimit::Above(37.0))?;
        robot.wait(100);
        robot.drive.goto_distance(280.0, Move::new().then(Stop::None))?;
        robot.drive.goto_distance(430.0, Move::new().speed(200.0).then(Stop::None))?;
        robot.drive.goto_distance(510.0, Move::new().speed(70.0).then(Stop::None))?;
        robot.drive.coast()?;
        robot.wait(300);
        robot.drive.brake()?;
        robot.reset_pose()?;

        // Mixer done
        robot.drive.goto_distance(-220.0, Move::new())?;
        robot.drive.goto_heading(-40.0, Move::new())?;
        robot.drive.goto_distance(179.0, Move::new())?;
        robot.drive.pivot_until(Side::Right, 200.0, HeadingLimit::Below(-84.0))?;
        robot.wait(100);
        robot.drive.goto_distance(285.0, Move::new())?;
        robot.left_tool.run_angle(70.0, -100.0, Stop::Hold, true)?;

        // Expert picked up, theater done. The scene on the other table decides
        // whether the theater needs a second push.
        let field = robot.field_config()?;
        info!("Field config {:?}", field);
        if matches!(field, FieldConfig::Blue | FieldConfig::Orange) {
            robot.drive.goto_distance(220.0, Move::new())?;
            robot.wait(200);
            robot.drive.goto_distance(285.0, Move::new())?;
        }

        robot.drive.pivot_until(Side::Left, -200.0, HeadingLimit::Below(-129.0))?;
        robot.drive.goto_distance(50.0, Move::new())?;
        robot.right_tool.run_angle(900.0, -950.0, Stop::Hold, true)?;
        robot.drive.goto_distance(-200.0, Move::new().then(Stop::None))?;
        robot.drive.goto_distance(-390.0, Move::new().speed(200.0).then(Stop::None))?;

        // Back onto the line: white, then off it again
        robot.drive.drive_continuous(Some(60.0), 0.0, Direction::Reverse)?;
        robot.wait_for_edge(Color::is_white)?;
        robot.wait_for_edge(|c| !c.is_white())?;
        robot.drive.brake()?;
        robot.panel.beep(500, 100)?;
        robot.wait(100);
        robot.drive.reset_distance_and_wheels()?;

        // Squared on the line
        robot.drive.goto_distance(-45.0, Move::new())?;
        robot.drive.pivot_until(Side::Left, 350.0, HeadingLimit::Above(-45.0))?;
        robot.wait(100);
        robot.drive.goto_distance(50.0, Move::new().then(Stop::None))?;
        robot.drive.goto_wheel_angle(-10000.0, Move::new().speed(400.0).no_wait())?;
        robot.wait(600);
        robot.drive.brake()?;
        robot.reset_pose()?;

        robot.right_tool.run_until_stalled(1000.0, Stop::Hold, None)?;
        robot.right_tool.run_angle(1000.0, -200.0, Stop::Hold, true)?;

        robot.drive.goto_distance(25.0, Move::new())?;
        robot.drive.pivot_until(Side::Left, 500.0, HeadingLimit::Above(95.0))?;
        robot.wait(100);
        robot.drive.goto_distance(650.0, Move::new().then(Stop::None))?;
        robot.drive.curve(300.0, 46.0, Stop::None)?;
        robot.drive.goto_wheel_angle(10000.0, Move::new().speed(800.0).no_wait())?;
        robot.wait(1000);
        robot.drive.coast()
    }
}
