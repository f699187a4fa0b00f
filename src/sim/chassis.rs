// Simulated drive base controller
//
// While a maneuver is active the controller owns the wheels and drives them
// along the computed arc; a direct wheel command releases it.

use tracing::debug;

use super::SimHub;
use crate::drive::Geometry;
use crate::hub::{Chassis, MotionSettings, Port, Result, Stop};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Maneuver {
    Idle,
    Straight { remaining: f32 },
    Turn { remaining: f32 },
    Curve { remaining: f32, radius: f32 },
    Drive { speed: f32, turn_rate: f32 },
}

#[derive(Debug, Clone)]
pub(crate) struct ChassisModel {
    maneuver: Maneuver,
    settings: MotionSettings,
    distance_offset: f32,
}

/// Take at most `limit` off `remaining`, keeping its sign
fn consume(remaining: &mut f32, limit: f32) -> f32 {
    let step = limit.abs().min(remaining.abs()).copysign(*remaining);
    *remaining -= step;
    step
}

impl ChassisModel {
    pub(crate) fn new(settings: MotionSettings) -> Self {
        Self {
            maneuver: Maneuver::Idle,
            settings,
            distance_offset: 0.0,
        }
    }

    pub(crate) fn release(&mut self) {
        self.maneuver = Maneuver::Idle;
    }

    pub(crate) fn idle(&self) -> bool {
        self.maneuver == Maneuver::Idle
    }

    /// Rim travel (left, right) in mm for the next step, or None when idle
    pub(crate) fn next_travel(&mut self, dt: f32, geometry: &Geometry) -> Option<(f32, f32)> {
        let straight_step = self.settings.straight_speed * dt;
        let turn_step = self.settings.turn_speed * dt;

        let (travel, finished) = match &mut self.maneuver {
            Maneuver::Idle => return None,
            Maneuver::Straight { remaining } => {
                let step = consume(remaining, straight_step);
                ((step, step), *remaining == 0.0)
            }
            Maneuver::Turn { remaining } => {
                let step = consume(remaining, turn_step);
                (geometry.split(0.0, step), *remaining == 0.0)
            }
            Maneuver::Curve { remaining, radius } => {
                let limit = if *radius == 0.0 {
                    turn_step
                } else {
                    (straight_step / radius.abs()).to_degrees()
                };
                let step = consume(remaining, limit);
                let centre = radius.abs() * step.abs().to_radians() * radius.signum();
                (geometry.split(centre, step), *remaining == 0.0)
            }
            Maneuver::Drive { speed, turn_rate } => {
                (geometry.split(*speed * dt, *turn_rate * dt), false)
            }
        };
        if finished {
            self.maneuver = Maneuver::Idle;
        }
        Some(travel)
    }
}

/// Handle on the simulated drive base
pub struct SimChassis {
    hub: SimHub,
}

impl SimChassis {
    pub(crate) fn new(hub: SimHub) -> Self {
        Self { hub }
    }

    /// Start a maneuver, taking both wheels over
    fn begin(&mut self, maneuver: Maneuver) {
        let mut world = self.hub.lock();
        for wheel in &mut world.wheels {
            wheel.release();
        }
        world.chassis.maneuver = maneuver;
    }

    fn finish(&self) -> Result<()> {
        self.hub.advance_until(Port::A, |w| w.chassis.idle())
    }
}

impl Chassis for SimChassis {
    fn straight(&mut self, distance: f32, _then: Stop, wait: bool) -> Result<()> {
        self.begin(Maneuver::Straight {
            remaining: distance,
        });
        if wait {
            self.finish()?;
        }
        Ok(())
    }

    fn turn(&mut self, angle: f32, _then: Stop, wait: bool) -> Result<()> {
        self.begin(Maneuver::Turn { remaining: angle });
        if wait {
            self.finish()?;
        }
        Ok(())
    }

    fn curve(&mut self, radius: f32, angle: f32, _then: Stop) -> Result<()> {
        self.begin(Maneuver::Curve {
            remaining: angle,
            radius,
        });
        self.finish()
    }

    fn drive(&mut self, speed: f32, turn_rate: f32) -> Result<()> {
        self.begin(Maneuver::Drive { speed, turn_rate });
        Ok(())
    }

    fn distance(&mut self) -> Result<f32> {
        let world = self.hub.lock();
        let travelled = world
            .geometry
            .distance(world.wheels[0].angle(), world.wheels[1].angle());
        Ok(travelled - world.chassis.distance_offset)
    }

    fn settings(&mut self) -> Result<MotionSettings> {
        Ok(self.hub.lock().chassis.settings)
    }

    fn configure(&mut self, settings: MotionSettings) -> Result<()> {
        debug!("Chassis settings {:?}", settings);
        self.hub.lock().chassis.settings = settings;
        Ok(())
    }

    fn brake(&mut self) -> Result<()> {
        self.hub.lock().chassis.release();
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.hub.lock().chassis.release();
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        let mut world = self.hub.lock();
        let travelled = world
            .geometry
            .distance(world.wheels[0].angle(), world.wheels[1].angle());
        world.chassis.distance_offset = travelled;
        Ok(())
    }
}
