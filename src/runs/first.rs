// Run 1: cart, chicken, speakers and lights, purple walls

use super::RunScript;
use crate::drive::{Direction, HeadingLimit, Homing, Move, Side};
use crate::hub::{Result, Stop};
use crate::robot::{Robot, Tool};

pub struct FirstRun;

impl RunScript for FirstRun {
    fn name(&self) -> &'static str {
        "run 1"
    }

    fn run(&self, robot: &mut Robot) -> Result<()> {
        // Arm against its stop so it always starts from the same place
        robot.home_tool(
            Tool::Left,
            Homing::new(-200.0).duty_limit(50).back_off(200.0, 20.0, true),
        )?;

        robot.drive.goto_distance(-150.0, Move::new())?;
        robot.wait(200);
        robot.drive.goto_distance(16.0, Move::new())?;

        // Cart released
        robot.drive.goto_heading(45.0, Move::new())?;
        robot.drive.goto_distance(400.0, Move::new().then(Stop::None))?;
        robot.drive.goto_wheel_angle(
            12400.0,
            Move::new().speed(130.0).then(Stop::CoastSmart).no_wait(),
        )?;
        robot.right_tool.run_angle(1000.0, -1800.0, Stop::Hold, false)?;
        robot.wait_tool(Tool::Right)?;
        robot.right_tool.stop()?;
        robot.drive.coast()?;
        robot.reset_pose()?;

        // Chicken done
        robot.drive.goto_distance(-40.0, Move::new().speed(80.0).then(Stop::None))?;
        robot.drive.goto_distance(-165.0, Move::new())?;
        robot.drive.goto_heading(-98.0, Move::new())?;
        robot.drive.goto_distance(-582.0, Move::new().then(Stop::None))?;
        robot.drive.coast()?;
        robot.wait(300);
        robot.right_tool.run_angle(300.0, 300.0, Stop::Hold, false)?;
        robot.wait(500);
        robot.drive.goto_distance(-535.0, Move::new())?;

        // Speakers and lights done
        robot.drive.goto_heading(-20.0, Move::new())?;
        robot.drive.goto_wheel_angle(-500.0, Move::new())?;
        robot.drive.goto_heading(-42.0, Move::new())?;
        robot.right_tool.run_angle(200.0, -250.0, Stop::Hold, false)?;
        robot.drive.goto_distance(130.0, Move::new().then(Stop::None))?;
        robot.drive.goto_distance(180.0, Move::new().speed(150.0).then(Stop::None))?;
        robot.drive.drive_continuous(Some(60.0), 0.0, Direction::Forward)?;
        robot.find_stripe()?;
        robot.drive.brake()?;
        robot.drive.reset_distance_and_wheels()?;

        // Squared on the line
        robot.wait(100);
        robot.drive.goto_heading(-132.0, Move::new())?;
        robot.left_tool.run_angle(200.0, 140.0, Stop::Hold, true)?;

        robot.drive.goto_distance(-70.0, Move::new().then(Stop::None))?;
        robot.drive.goto_distance(-100.0, Move::new().speed(250.0).then(Stop::None))?;
        robot.drive.goto_wheel_angle(-20000.0, Move::new().speed(200.0).no_wait())?;
        robot.wait(500);
        robot.left_tool.run_angle(200.0, -140.0, Stop::Hold, true)?;
        robot.reset_pose()?;

        // Purple walls done, head home
        robot.drive.goto_distance(155.0, Move::new())?;
        robot.drive.goto_heading(217.0, Move::new())?;
        robot.drive.goto_distance(-335.0, Move::new())?;
        robot.drive.pivot_until(Side::Right, -200.0, HeadingLimit::Above(250.0))?;
        robot.wait(100);
        robot.drive.goto_distance(-1000.0, Move::new().speed(600.0).then(Stop::Coast))
    }
}
