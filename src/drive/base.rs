// Drive wrapper for the two-wheel base
//
// Layers absolute-distance / absolute-heading moves, default-settings
// save/restore and coordinated stop/reset over the chassis controller and its
// two wheel motors.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{STRAIGHT_SETTLE_MS, TURN_SETTLE_MS, WHEEL_MOVE_SPEED};
use crate::hub::{Chassis, Clock, Imu, MotionSettings, Motor, Result, Stop};

/// Options for a single move
///
/// Unset fields fall back to the defaults of the move they are passed to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub speed: Option<f32>,
    pub then: Stop,
    pub settle_ms: Option<u32>,
    pub wait: bool,
}

impl Default for Move {
    fn default() -> Self {
        Self {
            speed: None,
            then: Stop::Hold,
            settle_ms: None,
            wait: true,
        }
    }
}

impl Move {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn then(mut self, then: Stop) -> Self {
        self.then = then;
        self
    }

    pub fn settle_ms(mut self, settle_ms: u32) -> Self {
        self.settle_ms = Some(settle_ms);
        self
    }

    /// Return as soon as the move is issued
    pub fn no_wait(mut self) -> Self {
        self.wait = false;
        self
    }
}

/// Direction of an open-loop drive command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

/// Which drive wheel a single-wheel command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Heading threshold that ends a pivot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingLimit {
    /// Stop once the heading rises past this value
    Above(f32),
    /// Stop once the heading falls past this value
    Below(f32),
}

impl HeadingLimit {
    pub fn reached(self, heading: f32) -> bool {
        match self {
            HeadingLimit::Above(limit) => heading > limit,
            HeadingLimit::Below(limit) => heading < limit,
        }
    }
}

/// Gyro-referenced drive wrapper
///
/// Owns the chassis, both wheel motors and the gyro. Moving takes `&mut self`,
/// so a settings override and its restore can never interleave with another move.
pub struct DriveBase {
    chassis: Box<dyn Chassis>,
    left: Box<dyn Motor>,
    right: Box<dyn Motor>,
    imu: Box<dyn Imu>,
    clock: Arc<dyn Clock>,
    defaults: MotionSettings,
}

impl DriveBase {
    /// Wrap the drive hardware, snapshotting the chassis settings as the restore target
    pub fn new(
        mut chassis: Box<dyn Chassis>,
        left: Box<dyn Motor>,
        right: Box<dyn Motor>,
        imu: Box<dyn Imu>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let defaults = chassis.settings()?;
        info!("Drive defaults: {:?}", defaults);
        Ok(Self {
            chassis,
            left,
            right,
            imu,
            clock,
            defaults,
        })
    }

    /// Drive to an absolute distance along the current accumulator
    ///
    /// `speed` overrides the straight speed for this call only.
    pub fn goto_distance(&mut self, target: f32, mv: Move) -> Result<()> {
        let settings = match mv.speed {
            Some(speed) => Some(self.chassis.settings()?.with_straight_speed(speed)),
            None => None,
        };
        let settle = mv.settle_ms.unwrap_or(STRAIGHT_SETTLE_MS);

        self.with_settings(settings, |base| {
            let delta = target - base.chassis.distance()?;
            debug!("goto_distance {} (delta {}, {:?})", target, delta, mv.then);
            base.chassis.straight(delta, mv.then, mv.wait)?;
            base.clock.wait(settle);
            Ok(())
        })
    }

    /// Turn to an absolute gyro heading
    ///
    /// `speed` overrides the turn speed for this call only.
    pub fn goto_heading(&mut self, target: f32, mv: Move) -> Result<()> {
        let settings = mv.speed.map(|speed| self.defaults.with_turn_speed(speed));
        let settle = mv.settle_ms.unwrap_or(TURN_SETTLE_MS);

        self.with_settings(settings, |base| {
            let delta = target - base.imu.heading()?;
            debug!("goto_heading {} (delta {}, {:?})", target, delta, mv.then);
            base.chassis.turn(delta, mv.then, mv.wait)?;
            base.clock.wait(settle);
            Ok(())
        })
    }

    /// Rotate both wheels to an absolute angle of the left wheel encoder
    ///
    /// Bypasses the chassis controller and the gyro; used to square up against walls.
    pub fn goto_wheel_angle(&mut self, target: f32, mv: Move) -> Result<()> {
        let speed = mv.speed.unwrap_or(WHEEL_MOVE_SPEED);
        let settle = mv.settle_ms.unwrap_or(TURN_SETTLE_MS);

        let delta = target - self.left.angle()?;
        debug!("goto_wheel_angle {} (delta {} at {})", target, delta, speed);
        self.left.run_angle(speed, delta, mv.then, false)?;
        self.right.run_angle(speed, delta, mv.then, false)?;

        if mv.wait {
            while !(self.left.done()? && self.right.done()?) {
                self.clock.wait(1);
            }
        }
        self.clock.wait(settle);
        Ok(())
    }

    /// Open-loop velocity command; defaults to the snapshot straight speed
    pub fn drive_continuous(
        &mut self,
        speed: Option<f32>,
        turn_rate: f32,
        direction: Direction,
    ) -> Result<()> {
        let speed = speed.unwrap_or(self.defaults.straight_speed);
        self.chassis.drive(speed * direction.sign(), turn_rate)
    }

    /// Drive an arc of `angle` degrees around `radius`
    pub fn curve(&mut self, radius: f32, angle: f32, then: Stop) -> Result<()> {
        self.chassis.curve(radius, angle, then)
    }

    /// Spin one wheel until the gyro crosses `limit`, then brake everything
    pub fn pivot_until(&mut self, side: Side, speed: f32, limit: HeadingLimit) -> Result<()> {
        debug!("pivot {:?} at {} until {:?}", side, speed, limit);
        self.wheel(side).run(speed)?;
        while !limit.reached(self.imu.heading()?) {
            self.clock.wait(1);
        }
        self.brake()
    }

    /// Active brake on the chassis and both wheels
    pub fn brake(&mut self) -> Result<()> {
        self.chassis.brake()?;
        self.left.brake()?;
        self.right.brake()
    }

    /// Passive stop on the chassis and both wheels
    pub fn coast(&mut self) -> Result<()> {
        self.chassis.stop()?;
        self.left.stop()?;
        self.right.stop()
    }

    pub fn reset_heading(&mut self) -> Result<()> {
        self.imu.reset_heading(0.0)
    }

    /// Zero both wheel encoders, then the distance accumulator
    ///
    /// Resetting a wheel encoder shifts the chassis distance, so the
    /// accumulator must be zeroed last.
    pub fn reset_distance_and_wheels(&mut self) -> Result<()> {
        self.left.reset_angle(0.0)?;
        self.right.reset_angle(0.0)?;
        self.chassis.reset()
    }

    pub fn distance(&mut self) -> Result<f32> {
        self.chassis.distance()
    }

    pub fn heading(&mut self) -> Result<f32> {
        self.imu.heading()
    }

    pub fn imu_ready(&mut self) -> Result<bool> {
        self.imu.ready()
    }

    /// Live chassis settings
    pub fn settings(&mut self) -> Result<MotionSettings> {
        self.chassis.settings()
    }

    /// Settings captured at construction
    pub fn defaults(&self) -> MotionSettings {
        self.defaults
    }

    /// Current (left, right) wheel encoder angles
    pub fn wheel_angles(&mut self) -> Result<(f32, f32)> {
        Ok((self.left.angle()?, self.right.angle()?))
    }

    pub fn wheel(&mut self, side: Side) -> &mut dyn Motor {
        match side {
            Side::Left => self.left.as_mut(),
            Side::Right => self.right.as_mut(),
        }
    }

    /// Apply `settings` (if any) for the duration of `motion`, then restore the
    /// defaults whether or not the motion succeeded
    fn with_settings<F>(&mut self, settings: Option<MotionSettings>, motion: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if let Some(settings) = settings {
            self.chassis.configure(settings)?;
        }
        let moved = motion(self);
        let restored = self.chassis.configure(self.defaults);
        moved.and(restored)
    }
}

impl Drop for DriveBase {
    fn drop(&mut self) {
        if let Err(e) = self.coast() {
            warn!("Failed to stop drive on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SETTINGS;
    use crate::hub::HubError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Bench {
        calls: Vec<String>,
        distance: f32,
        heading: f32,
        settings: Option<MotionSettings>,
        left_angle: f32,
        right_angle: f32,
        waited_ms: u64,
        spinning: bool,
        fail_straight: bool,
    }

    type Shared = Arc<Mutex<Bench>>;

    struct FakeChassis(Shared);
    struct FakeMotor(Shared, &'static str);
    struct FakeImu(Shared);
    struct FakeClock(Shared);

    impl Chassis for FakeChassis {
        fn straight(&mut self, distance: f32, then: Stop, _wait: bool) -> Result<()> {
            let mut b = self.0.lock().unwrap();
            let speed = b.settings.unwrap().straight_speed;
            b.calls.push(format!("straight {} {:?} @{}", distance, then, speed));
            if b.fail_straight {
                return Err(HubError::Device {
                    port: crate::hub::Port::A,
                    reason: "jammed".to_string(),
                });
            }
            b.distance += distance;
            Ok(())
        }
        fn turn(&mut self, angle: f32, _then: Stop, _wait: bool) -> Result<()> {
            let mut b = self.0.lock().unwrap();
            let speed = b.settings.unwrap().turn_speed;
            b.calls.push(format!("turn {} @{}", angle, speed));
            b.heading += angle;
            Ok(())
        }
        fn curve(&mut self, radius: f32, angle: f32, _then: Stop) -> Result<()> {
            self.0.lock().unwrap().calls.push(format!("curve {} {}", radius, angle));
            Ok(())
        }
        fn drive(&mut self, speed: f32, turn_rate: f32) -> Result<()> {
            self.0.lock().unwrap().calls.push(format!("drive {} {}", speed, turn_rate));
            Ok(())
        }
        fn distance(&mut self) -> Result<f32> {
            Ok(self.0.lock().unwrap().distance)
        }
        fn settings(&mut self) -> Result<MotionSettings> {
            Ok(self.0.lock().unwrap().settings.unwrap())
        }
        fn configure(&mut self, settings: MotionSettings) -> Result<()> {
            self.0.lock().unwrap().settings = Some(settings);
            Ok(())
        }
        fn brake(&mut self) -> Result<()> {
            self.0.lock().unwrap().calls.push("chassis.brake".to_string());
            Ok(())
        }
        fn stop(&mut self) -> Result<()> {
            self.0.lock().unwrap().calls.push("chassis.stop".to_string());
            Ok(())
        }
        fn reset(&mut self) -> Result<()> {
            let mut b = self.0.lock().unwrap();
            b.calls.push("chassis.reset".to_string());
            b.distance = 0.0;
            Ok(())
        }
    }

    impl FakeMotor {
        fn angle_mut<'a>(&self, b: &'a mut Bench) -> &'a mut f32 {
            if self.1 == "left" {
                &mut b.left_angle
            } else {
                &mut b.right_angle
            }
        }
    }

    impl Motor for FakeMotor {
        fn run(&mut self, speed: f32) -> Result<()> {
            let mut b = self.0.lock().unwrap();
            b.calls.push(format!("{}.run {}", self.1, speed));
            b.spinning = true;
            Ok(())
        }
        fn run_angle(&mut self, speed: f32, angle: f32, _then: Stop, wait: bool) -> Result<()> {
            let mut b = self.0.lock().unwrap();
            b.calls.push(format!("{}.run_angle {} {} {}", self.1, speed, angle, wait));
            *self.angle_mut(&mut b) += angle;
            Ok(())
        }
        fn run_until_stalled(&mut self, _speed: f32, _then: Stop, _duty: Option<u8>) -> Result<f32> {
            Ok(0.0)
        }
        fn angle(&mut self) -> Result<f32> {
            let mut b = self.0.lock().unwrap();
            Ok(*self.angle_mut(&mut b))
        }
        fn reset_angle(&mut self, angle: f32) -> Result<()> {
            let mut b = self.0.lock().unwrap();
            b.calls.push(format!("{}.reset_angle", self.1));
            *self.angle_mut(&mut b) = angle;
            // Encoder resets leak into the chassis accumulator
            b.distance += 7.0;
            Ok(())
        }
        fn done(&mut self) -> Result<bool> {
            Ok(true)
        }
        fn stalled(&mut self) -> Result<bool> {
            Ok(false)
        }
        fn brake(&mut self) -> Result<()> {
            let mut b = self.0.lock().unwrap();
            b.calls.push(format!("{}.brake", self.1));
            b.spinning = false;
            Ok(())
        }
        fn stop(&mut self) -> Result<()> {
            self.0.lock().unwrap().calls.push(format!("{}.stop", self.1));
            Ok(())
        }
    }

    impl Imu for FakeImu {
        fn heading(&mut self) -> Result<f32> {
            Ok(self.0.lock().unwrap().heading)
        }
        fn reset_heading(&mut self, angle: f32) -> Result<()> {
            let mut b = self.0.lock().unwrap();
            b.calls.push("imu.reset_heading".to_string());
            b.heading = angle;
            Ok(())
        }
        fn ready(&mut self) -> Result<bool> {
            Ok(true)
        }
    }

    impl Clock for FakeClock {
        fn wait(&self, ms: u32) {
            let mut b = self.0.lock().unwrap();
            b.calls.push(format!("wait {}", ms));
            b.waited_ms += ms as u64;
            // A spinning wheel swings the robot around
            if b.spinning {
                b.heading += 10.0;
            }
        }
        fn now_ms(&self) -> u64 {
            self.0.lock().unwrap().waited_ms
        }
    }

    fn bench() -> (DriveBase, Shared) {
        let shared: Shared = Arc::new(Mutex::new(Bench {
            settings: Some(DEFAULT_SETTINGS),
            ..Default::default()
        }));
        let base = DriveBase::new(
            Box::new(FakeChassis(shared.clone())),
            Box::new(FakeMotor(shared.clone(), "left")),
            Box::new(FakeMotor(shared.clone(), "right")),
            Box::new(FakeImu(shared.clone())),
            Arc::new(FakeClock(shared.clone())),
        )
        .unwrap();
        shared.lock().unwrap().calls.clear();
        (base, shared)
    }

    fn calls(shared: &Shared) -> Vec<String> {
        std::mem::take(&mut shared.lock().unwrap().calls)
    }

    #[test]
    fn test_goto_distance_is_idempotent() {
        let (mut base, shared) = bench();
        base.goto_distance(200.0, Move::new()).unwrap();
        base.goto_distance(200.0, Move::new()).unwrap();

        let straights: Vec<String> = calls(&shared)
            .into_iter()
            .filter(|c| c.starts_with("straight"))
            .collect();
        assert_eq!(straights.len(), 2);
        assert!(straights[0].starts_with("straight 200 "));
        assert!(
            straights[1].starts_with("straight 0 "),
            "second call should not move: {}",
            straights[1]
        );
    }

    #[test]
    fn test_goto_distance_is_relative_to_accumulator() {
        let (mut base, shared) = bench();
        base.goto_distance(-150.0, Move::new()).unwrap();
        base.goto_distance(16.0, Move::new()).unwrap();
        let calls = calls(&shared);
        assert!(calls.contains(&format!("straight 166 Hold @{}", DEFAULT_SETTINGS.straight_speed)));
    }

    #[test]
    fn test_speed_override_applies_then_restores() {
        let (mut base, shared) = bench();
        base.goto_distance(-40.0, Move::new().speed(80.0).then(Stop::None))
            .unwrap();

        let calls = calls(&shared);
        assert_eq!(calls[0], "straight -40 None @80");
        assert_eq!(base.settings().unwrap(), DEFAULT_SETTINGS);

        base.goto_heading(-90.0, Move::new().speed(40.0)).unwrap();
        assert!(calls_contain(&shared, "turn -90 @40"));
        assert_eq!(base.settings().unwrap(), DEFAULT_SETTINGS);
    }

    fn calls_contain(shared: &Shared, call: &str) -> bool {
        calls(shared).iter().any(|c| c == call)
    }

    #[test]
    fn test_omitted_speed_keeps_live_settings() {
        let (mut base, shared) = bench();
        // Someone reconfigured the chassis behind the wrapper's back
        shared.lock().unwrap().settings = Some(DEFAULT_SETTINGS.with_straight_speed(500.0));

        base.goto_distance(100.0, Move::new()).unwrap();
        assert!(calls(&shared).contains(&"straight 100 Hold @500".to_string()));
        // ...but the restore target is still the construction snapshot
        assert_eq!(base.settings().unwrap(), DEFAULT_SETTINGS);
    }

    #[test]
    fn test_settings_restored_when_motion_fails() {
        let (mut base, shared) = bench();
        shared.lock().unwrap().fail_straight = true;

        let result = base.goto_distance(100.0, Move::new().speed(90.0));
        assert!(result.is_err());
        assert_eq!(base.settings().unwrap(), DEFAULT_SETTINGS);
    }

    #[test]
    fn test_settle_delay_defaults() {
        let (mut base, shared) = bench();
        base.goto_distance(10.0, Move::new()).unwrap();
        base.goto_heading(45.0, Move::new()).unwrap();
        base.goto_heading(90.0, Move::new().settle_ms(0)).unwrap();
        let waits: Vec<String> = calls(&shared)
            .into_iter()
            .filter(|c| c.starts_with("wait"))
            .collect();
        assert_eq!(waits, vec!["wait 50", "wait 100", "wait 0"]);
    }

    #[test]
    fn test_goto_heading_uses_gyro_delta() {
        let (mut base, shared) = bench();
        shared.lock().unwrap().heading = 30.0;
        base.goto_heading(45.0, Move::new()).unwrap();
        assert!(calls(&shared).contains(&format!("turn 15 @{}", DEFAULT_SETTINGS.turn_speed)));
    }

    #[test]
    fn test_reset_zeroes_wheels_before_accumulator() {
        let (mut base, shared) = bench();
        base.goto_distance(300.0, Move::new()).unwrap();
        calls(&shared);

        base.reset_distance_and_wheels().unwrap();
        assert_eq!(
            calls(&shared),
            vec!["left.reset_angle", "right.reset_angle", "chassis.reset"]
        );
        assert_eq!(base.distance().unwrap(), 0.0);
    }

    #[test]
    fn test_brake_and_coast_reach_every_actuator() {
        let (mut base, shared) = bench();
        base.brake().unwrap();
        assert_eq!(calls(&shared), vec!["chassis.brake", "left.brake", "right.brake"]);
        base.coast().unwrap();
        assert_eq!(calls(&shared), vec!["chassis.stop", "left.stop", "right.stop"]);
    }

    #[test]
    fn test_drive_continuous_defaults_to_snapshot_speed() {
        let (mut base, shared) = bench();
        base.drive_continuous(None, 0.0, Direction::Forward).unwrap();
        base.drive_continuous(Some(60.0), 0.0, Direction::Reverse).unwrap();
        assert_eq!(
            calls(&shared),
            vec![
                format!("drive {} 0", DEFAULT_SETTINGS.straight_speed),
                "drive -60 0".to_string(),
            ]
        );
    }

    #[test]
    fn test_goto_wheel_angle_is_absolute() {
        let (mut base, shared) = bench();
        base.goto_wheel_angle(-280.0, Move::new()).unwrap();
        base.goto_wheel_angle(10.0, Move::new().no_wait()).unwrap();
        let calls = calls(&shared);
        assert!(calls.contains(&"left.run_angle 700 -280 false".to_string()));
        assert!(calls.contains(&"right.run_angle 700 -280 false".to_string()));
        assert!(calls.contains(&"left.run_angle 700 290 false".to_string()));
    }

    #[test]
    fn test_pivot_brakes_once_limit_crossed() {
        let (mut base, shared) = bench();
        base.pivot_until(Side::Left, 100.0, HeadingLimit::Above(37.0))
            .unwrap();
        let calls = calls(&shared);
        assert_eq!(calls[0], "left.run 100");
        assert!(base.heading().unwrap() > 37.0);
        assert_eq!(
            &calls[calls.len() - 3..],
            &["chassis.brake", "left.brake", "right.brake"]
        );
    }

    #[test]
    fn test_heading_limits() {
        assert!(HeadingLimit::Above(250.0).reached(250.5));
        assert!(!HeadingLimit::Above(250.0).reached(250.0));
        assert!(HeadingLimit::Below(-84.0).reached(-85.0));
        assert!(!HeadingLimit::Below(-84.0).reached(-84.0));
    }
}
