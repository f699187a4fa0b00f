// Simulated encoder motor with optional hard stops

use super::{SimHub, World};
use crate::hub::{HubError, Motor, Port, Result, Stop};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Idle,
    Run { speed: f32 },
    Target { speed: f32, target: f32 },
    Seek { speed: f32 },
}

/// Kinematic motor: moves at the commanded speed, clamps at its stops
#[derive(Debug, Clone)]
pub(crate) struct MotorModel {
    position: f32,
    offset: f32,
    command: Command,
    stalled: bool,
    stops: Option<(f32, f32)>,
}

impl MotorModel {
    pub(crate) fn free() -> Self {
        Self {
            position: 0.0,
            offset: 0.0,
            command: Command::Idle,
            stalled: false,
            stops: None,
        }
    }

    pub(crate) fn with_stops(low: f32, high: f32) -> Self {
        Self {
            stops: Some((low, high)),
            ..Self::free()
        }
    }

    pub(crate) fn angle(&self) -> f32 {
        self.position - self.offset
    }

    pub(crate) fn position(&self) -> f32 {
        self.position
    }

    fn reset_angle(&mut self, angle: f32) {
        self.offset = self.position - angle;
    }

    fn command(&mut self, command: Command) {
        self.command = command;
        self.stalled = false;
    }

    pub(crate) fn release(&mut self) {
        self.command(Command::Idle);
    }

    pub(crate) fn done(&self) -> bool {
        self.command == Command::Idle
    }

    pub(crate) fn stalled(&self) -> bool {
        self.stalled
    }

    /// Step under the motor's own command; returns the rotation in degrees
    pub(crate) fn advance(&mut self, dt: f32) -> f32 {
        let (velocity, target) = match self.command {
            Command::Idle => return 0.0,
            Command::Run { speed } | Command::Seek { speed } => (speed, None),
            Command::Target { speed, target } => {
                (speed.abs().copysign(target - self.position), Some(target))
            }
        };

        let step = velocity * dt;
        let mut next = self.position + step;
        if let Some(target) = target {
            if (target - self.position).abs() <= step.abs() {
                next = target;
            }
        }

        let clamped = match self.stops {
            Some((low, high)) => next.clamp(low, high),
            None => next,
        };

        if clamped != next {
            self.stalled = true;
            if let Command::Seek { .. } = self.command {
                self.command = Command::Idle;
            }
        } else if target == Some(clamped) {
            self.command = Command::Idle;
        }

        let delta = clamped - self.position;
        self.position = clamped;
        delta
    }

    /// Rotate by an externally imposed amount (the chassis driving the wheel)
    pub(crate) fn push(&mut self, degrees: f32) -> f32 {
        self.position += degrees;
        degrees
    }
}

/// Which motor of the robot a handle drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorSlot {
    LeftWheel,
    RightWheel,
    LeftTool,
    RightTool,
}

impl MotorSlot {
    pub fn port(self) -> Port {
        match self {
            MotorSlot::LeftWheel => Port::B,
            MotorSlot::RightWheel => Port::A,
            MotorSlot::LeftTool => Port::E,
            MotorSlot::RightTool => Port::F,
        }
    }

    fn is_wheel(self) -> bool {
        matches!(self, MotorSlot::LeftWheel | MotorSlot::RightWheel)
    }
}

impl World {
    pub(crate) fn motor(&self, slot: MotorSlot) -> &MotorModel {
        match slot {
            MotorSlot::LeftWheel => &self.wheels[0],
            MotorSlot::RightWheel => &self.wheels[1],
            MotorSlot::LeftTool => &self.tools[0],
            MotorSlot::RightTool => &self.tools[1],
        }
    }

    fn motor_mut(&mut self, slot: MotorSlot) -> &mut MotorModel {
        match slot {
            MotorSlot::LeftWheel => &mut self.wheels[0],
            MotorSlot::RightWheel => &mut self.wheels[1],
            MotorSlot::LeftTool => &mut self.tools[0],
            MotorSlot::RightTool => &mut self.tools[1],
        }
    }
}

/// Handle on one simulated motor
pub struct SimMotor {
    hub: SimHub,
    slot: MotorSlot,
}

impl SimMotor {
    pub(crate) fn new(hub: SimHub, slot: MotorSlot) -> Self {
        Self { hub, slot }
    }

    /// Issue a command; a direct wheel command takes the wheel away from the chassis
    fn command(&mut self, command: Command) {
        let mut world = self.hub.lock();
        if self.slot.is_wheel() {
            world.chassis.release();
        }
        world.motor_mut(self.slot).command(command);
    }

    fn block_until_settled(&self) -> Result<()> {
        let slot = self.slot;
        self.hub.advance_until(slot.port(), |w| {
            let motor = w.motor(slot);
            motor.done() || motor.stalled()
        })
    }
}

impl Motor for SimMotor {
    fn run(&mut self, speed: f32) -> Result<()> {
        self.command(Command::Run { speed });
        Ok(())
    }

    fn run_angle(&mut self, speed: f32, angle: f32, _then: Stop, wait: bool) -> Result<()> {
        let target = self.hub.lock().motor(self.slot).position() + angle;
        self.command(Command::Target { speed, target });
        if wait {
            self.block_until_settled()?;
        }
        Ok(())
    }

    fn run_until_stalled(&mut self, speed: f32, _then: Stop, _duty_limit: Option<u8>) -> Result<f32> {
        if self.hub.lock().motor(self.slot).stops.is_none() {
            return Err(HubError::Device {
                port: self.slot.port(),
                reason: "motor has nothing to stall against".to_string(),
            });
        }
        self.command(Command::Seek { speed });
        self.block_until_settled()?;
        self.angle()
    }

    fn angle(&mut self) -> Result<f32> {
        Ok(self.hub.lock().motor(self.slot).angle())
    }

    fn reset_angle(&mut self, angle: f32) -> Result<()> {
        self.hub.lock().motor_mut(self.slot).reset_angle(angle);
        Ok(())
    }

    fn done(&mut self) -> Result<bool> {
        Ok(self.hub.lock().motor(self.slot).done())
    }

    fn stalled(&mut self) -> Result<bool> {
        Ok(self.hub.lock().motor(self.slot).stalled())
    }

    fn brake(&mut self) -> Result<()> {
        self.command(Command::Idle);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.command(Command::Idle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_reached_exactly() {
        let mut motor = MotorModel::free();
        motor.command(Command::Target {
            speed: 1000.0,
            target: 10.5,
        });
        let mut moved = 0.0;
        for _ in 0..20 {
            moved += motor.advance(0.001);
        }
        assert_eq!(motor.position(), 10.5);
        assert!((moved - 10.5f32).abs() < 1e-4);
        assert!(motor.done());
        assert!(!motor.stalled());
    }

    #[test]
    fn test_negative_target_ignores_speed_sign() {
        let mut motor = MotorModel::free();
        motor.command(Command::Target {
            speed: 200.0,
            target: -1.0,
        });
        motor.advance(0.001);
        assert!(motor.position() < 0.0);
    }

    #[test]
    fn test_seek_stalls_at_stop() {
        let mut motor = MotorModel::with_stops(-30.0, 400.0);
        motor.command(Command::Seek { speed: -200.0 });
        for _ in 0..1000 {
            motor.advance(0.001);
        }
        assert_eq!(motor.position(), -30.0);
        assert!(motor.stalled());
        assert!(motor.done(), "seek ends once stalled");
    }

    #[test]
    fn test_target_past_stop_stalls_without_finishing() {
        let mut motor = MotorModel::with_stops(-30.0, 400.0);
        motor.command(Command::Target {
            speed: 1000.0,
            target: 1000.0,
        });
        for _ in 0..1000 {
            motor.advance(0.001);
        }
        assert_eq!(motor.position(), 400.0);
        assert!(motor.stalled());
        assert!(!motor.done());
    }

    #[test]
    fn test_reset_angle_keeps_position() {
        let mut motor = MotorModel::free();
        motor.push(90.0);
        motor.reset_angle(0.0);
        assert_eq!(motor.angle(), 0.0);
        assert_eq!(motor.position(), 90.0);
    }
}
