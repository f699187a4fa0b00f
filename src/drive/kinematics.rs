// Differential drive kinematics
// Converts between wheel rotation and chassis distance / heading.

use std::f32::consts::PI;

/// Wheel geometry of a two-wheel differential base
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub wheel_diameter: f32, // mm
    pub axle_track: f32,     // mm, distance between wheel contact points
}

impl Geometry {
    pub fn new(wheel_diameter: f32, axle_track: f32) -> Self {
        Self {
            wheel_diameter,
            axle_track,
        }
    }

    /// Millimetres travelled per degree of wheel rotation
    pub fn mm_per_degree(&self) -> f32 {
        PI * self.wheel_diameter / 360.0
    }

    /// Wheel rotation needed to roll `distance` mm
    pub fn wheel_degrees(&self, distance: f32) -> f32 {
        distance / self.mm_per_degree()
    }

    /// Chassis distance for the given wheel angles (average of both wheels)
    pub fn distance(&self, left_deg: f32, right_deg: f32) -> f32 {
        (left_deg + right_deg) / 2.0 * self.mm_per_degree()
    }

    /// Heading change caused by the given wheel rotations
    ///
    /// Positive = clockwise, matching the gyro: the left wheel rolling further
    /// than the right turns the robot right.
    pub fn heading_change(&self, left_deg: f32, right_deg: f32) -> f32 {
        let left_mm = left_deg * self.mm_per_degree();
        let right_mm = right_deg * self.mm_per_degree();
        ((left_mm - right_mm) / self.axle_track).to_degrees()
    }

    /// Rim travel of each wheel (mm) to turn in place by `angle` degrees
    pub fn pivot_arc(&self, angle: f32) -> f32 {
        angle.to_radians() * self.axle_track / 2.0
    }

    /// Left and right rim travel (mm) for a centre travel and heading change
    pub fn split(&self, centre_mm: f32, heading_deg: f32) -> (f32, f32) {
        let arc = self.pivot_arc(heading_deg);
        (centre_mm + arc, centre_mm - arc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AXLE_TRACK_MM, WHEEL_DIAMETER_MM};

    fn geometry() -> Geometry {
        Geometry::new(WHEEL_DIAMETER_MM, AXLE_TRACK_MM)
    }

    #[test]
    fn test_full_revolution_is_circumference() {
        let g = geometry();
        let circumference = PI * WHEEL_DIAMETER_MM;
        assert!((g.distance(360.0, 360.0) - circumference).abs() < 1e-3);
        assert!((g.wheel_degrees(circumference) - 360.0).abs() < 1e-3);
    }

    #[test]
    fn test_straight_motion_has_no_heading_change() {
        let g = geometry();
        assert_eq!(g.heading_change(500.0, 500.0), 0.0);
    }

    #[test]
    fn test_left_wheel_forward_turns_clockwise() {
        let g = geometry();
        assert!(g.heading_change(100.0, 0.0) > 0.0);
        assert!(g.heading_change(0.0, 100.0) < 0.0);
        // Pivoting one wheel moves the centre by half its travel
        assert!((g.distance(100.0, 0.0) - 50.0 * g.mm_per_degree()).abs() < 1e-4);
    }

    #[test]
    fn test_pivot_arc_round_trip() {
        let g = geometry();
        let (left, right) = g.split(0.0, 90.0);
        assert_eq!(left, -right);
        let heading = g.heading_change(g.wheel_degrees(left), g.wheel_degrees(right));
        assert!((heading - 90.0).abs() < 1e-3, "heading was {}", heading);
    }

    #[test]
    fn test_split_keeps_centre_travel() {
        let g = geometry();
        let (left, right) = g.split(120.0, 30.0);
        assert!(((left + right) / 2.0 - 120.0).abs() < 1e-4);
    }
}
