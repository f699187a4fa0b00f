// Competition runs
//
// Provides:
// - The RunScript capability the selector launches
// - The three runs, in launch order
//
// Every run is a straight-line sequence of drive, tool and sensor
// primitives; distances and headings are absolute since the last reset.

mod first;
mod second;
mod third;

pub use first::FirstRun;
pub use second::SecondRun;
pub use third::ThirdRun;

use crate::hub::Result;
use crate::robot::Robot;

/// One scripted sequence of moves, launched from the menu
pub trait RunScript: Send {
    fn name(&self) -> &'static str;

    fn run(&self, robot: &mut Robot) -> Result<()>;
}

/// Runs in the order they are selected on the hub
pub fn competition_runs() -> Vec<Box<dyn RunScript>> {
    vec![Box::new(FirstRun), Box::new(SecondRun), Box::new(ThirdRun)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RUN_COUNT, RobotConfig};
    use crate::menu::FieldConfig;
    use crate::sim::{MemoryStorage, SimConfig, SimHub};

    fn robot(hub: &SimHub, storage: MemoryStorage) -> Robot {
        hub.robot(Box::new(storage), RobotConfig::default()).unwrap()
    }

    #[test]
    fn test_run_table_matches_menu() {
        let runs = competition_runs();
        assert_eq!(runs.len(), RUN_COUNT as usize);
        let names: Vec<_> = runs.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["run 1", "run 2", "run 3"]);
    }

    #[test]
    fn test_every_run_completes_in_sim() {
        for run in competition_runs() {
            let hub = SimHub::new(SimConfig::default());
            let mut robot = robot(&hub, MemoryStorage::new());
            robot.reset_pose().unwrap();
            run.run(&mut robot)
                .unwrap_or_else(|e| panic!("{} failed: {}", run.name(), e));
            assert!(hub.time_ms() > 5_000, "{} finished suspiciously fast", run.name());
        }
    }

    #[test]
    fn test_second_run_branches_on_field_config() {
        let elapsed = |byte: u8| {
            let hub = SimHub::new(SimConfig::default());
            let mut robot = robot(&hub, MemoryStorage::new());
            FieldConfig::from_byte(byte)
                .unwrap()
                .save(robot.storage.as_mut())
                .unwrap();
            SecondRun.run(&mut robot).unwrap();
            hub.time_ms()
        };
        let blue = elapsed(0);
        let magenta = elapsed(1);
        let orange = elapsed(2);
        // The extra approach costs at least its 200 ms pause
        assert!(blue >= magenta + 200, "blue {} magenta {}", blue, magenta);
        assert_eq!(blue, orange);
    }

    #[test]
    fn test_first_run_ends_on_its_last_move() {
        let hub = SimHub::new(SimConfig::default());
        let mut robot = robot(&hub, MemoryStorage::new());
        robot.reset_pose().unwrap();
        FirstRun.run(&mut robot).unwrap();
        // Last move is an absolute straight to -1000 mm after the final reset
        let distance = robot.drive.distance().unwrap();
        assert!((distance + 1000.0).abs() < 0.5, "distance {}", distance);
        // Settings restored after the 600 mm/s override
        assert_eq!(robot.drive.settings().unwrap(), robot.drive.defaults());
    }
}
