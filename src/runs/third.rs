// Run 3

use super::RunScript;
use crate::drive::{HeadingLimit, Move, Side};
use crate::hub::{Result, Stop};
use crate::robot::Robot;

pub struct ThirdRun;

impl RunScript for ThirdRun {
    fn name(&self) -> &'static str {
        "run 3"
    }

    fn run(&self, robot: &mut Robot) -> Result<()> {
        robot.reset_pose()?;
        robot.right_tool.run_until_stalled(200.0, Stop::Hold, Some(80))?;

        // Slow through the middle stretch
        robot.drive.goto_distance(-270.0, Move::new().then(Stop::None))?;
        robot.drive.goto_distance(-450.0, Move::new().speed(40.0).then(Stop::None))?;
        robot.drive.goto_distance(-600.0, Move::new().then(Stop::None))?;
        robot.drive.goto_distance(-650.0, Move::new().speed(200.0).then(Stop::None))?;
        robot.drive.goto_distance(-720.0, Move::new().speed(140.0).then(Stop::None))?;
        robot.drive.coast()?;
        robot.drive.goto_distance(-210.0, Move::new())?;
        robot.drive.goto_heading(-85.0, Move::new())?;
        robot.drive.goto_distance(-250.0, Move::new().then(Stop::None))?;
        robot.drive.goto_wheel_angle(-10000.0, Move::new().speed(600.0).no_wait())?;
        robot.wait(600);
        robot.drive.brake()?;
        robot.reset_pose()?;

        robot.drive.goto_distance(500.0, Move::new())?;
        robot.drive.pivot_until(Side::Right, 200.0, HeadingLimit::Below(-30.0))?;
        robot.wait(100);
        robot.drive.goto_distance(670.0, Move::new())?;
        robot.drive.pivot_until(Side::Left, 200.0, HeadingLimit::Above(44.0))?;
        robot.wait(100);
        robot.drive.goto_distance(900.0, Move::new().speed(120.0))?;
        robot.left_tool.run_angle(1000.0, -350.0, Stop::Hold, true)?;
        robot.drive.goto_distance(730.0, Move::new())?;
        robot.drive.goto_heading(90.0, Move::new())?;
        robot.drive.goto_distance(305.0, Move::new())?;
        robot.drive.goto_heading(178.0, Move::new())?;
        robot.drive.goto_distance(250.0, Move::new().then(Stop::None))?;
        robot.drive.goto_wheel_angle(-10000.0, Move::new().speed(400.0).no_wait())?;
        robot.wait(750);
        robot.right_tool.run_angle(200.0, -220.0, Stop::Hold, true)?;
        robot.drive.brake()?;
        robot.reset_pose()?;

        robot.drive.goto_distance(164.0, Move::new().speed(150.0))?;
        robot.drive.goto_heading(-90.0, Move::new().speed(40.0))?;
        robot.drive.goto_distance(482.0, Move::new())?;
        robot.drive.goto_heading(-181.0, Move::new())?;
        robot.drive.goto_distance(545.0, Move::new().then(Stop::None))?;
        robot.drive.coast()
    }
}
