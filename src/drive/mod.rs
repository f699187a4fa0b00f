// Drive and actuation layer
//
// Provides:
// - The gyro-referenced drive wrapper with settings save/restore
// - Homing and bounded waits for the tool motors
// - Edge polling on the color sensor
// - Differential drive kinematics

mod base;
pub mod kinematics;
pub mod line;
pub mod tool;

pub use base::{Direction, DriveBase, HeadingLimit, Move, Side};
pub use kinematics::Geometry;
pub use line::{find_stripe, wait_for_color_transition, Edge, EdgePoll, Stripe};
pub use tool::{home, wait_done_or_stalled, BackOff, Homing, StallOutcome, StallWait};
