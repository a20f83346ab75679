//! Translation of body twists into the speed/radius command understood by
//! the base firmware.
//!
//! The firmware takes a translational speed (mm/s) and a turning radius (mm).
//! Radius `0` means "drive straight" and radius `1` means "pivot in place";
//! in the pivot case the speed is the tangential speed of the wheels.

use core::fmt;

use crate::config::TranslatorConfig;

/// Radius sentinel for straight-line motion.
pub const RADIUS_STRAIGHT: f64 = 0.0;
/// Radius sentinel for a pivot turn.
pub const RADIUS_PIVOT: f64 = 1.0;

/// Speed/radius pair before it is bounded for transmission.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FirmwareCommand {
    /// Translational speed (mm/s).
    pub speed: f64,
    /// Turning radius (mm), or one of the radius sentinels.
    pub radius: f64,
}

impl FirmwareCommand {
    pub const fn new(speed: f64, radius: f64) -> Self {
        Self { speed, radius }
    }

    /// Both fields saturated to the 16-bit range the firmware accepts.
    pub fn bounded(&self) -> (i16, i16) {
        (bound(self.speed), bound(self.radius))
    }
}

impl fmt::Display for FirmwareCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(speed: {:.2} mm/s, radius: {:.2} mm)", self.speed, self.radius)
    }
}

/// Which rule of the translation policy produced a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maneuver {
    Straight,
    Pivot,
    Turn,
}

/// Turn a twist (`vx` m/s, `wz` rad/s) into a firmware command.
///
/// Rules are tried in order:
/// 1. `|vx|` under the dead zone is treated as zero.
/// 2. `|wz|` under epsilon drives straight at `1000 * vx`.
/// 3. No forward speed, or a radius at or below `pivot_radius`, pivots at the
///    wheel tangential speed `1000 * separation * wz / 2`, never slower than
///    `min_pivot_speed`.
/// 4. Otherwise the turn radius is `1000 * vx / wz` and the speed is that of
///    the outer edge of the tread.
pub fn translate(
    vx: f64,
    wz: f64,
    wheel_separation: f64,
    config: &TranslatorConfig,
) -> (FirmwareCommand, Maneuver) {
    let vx = if vx.abs() < config.dead_zone { 0.0 } else { vx };

    if wz.abs() < config.epsilon {
        return (FirmwareCommand::new(1000.0 * vx, RADIUS_STRAIGHT), Maneuver::Straight);
    }

    let radius = 1000.0 * vx / wz;
    if vx.abs() < config.epsilon || radius.abs() <= config.pivot_radius {
        let mut speed = 1000.0 * wheel_separation * wz / 2.0;
        if speed.abs() < config.min_pivot_speed {
            speed = if speed > 0.0 {
                config.min_pivot_speed
            } else {
                -config.min_pivot_speed
            };
        }
        return (FirmwareCommand::new(speed, RADIUS_PIVOT), Maneuver::Pivot);
    }

    let half_tread = 1000.0 * wheel_separation / 2.0;
    let speed = if radius > 0.0 {
        (radius + half_tread) * wz
    } else {
        (radius - half_tread) * wz
    };
    (FirmwareCommand::new(speed, radius), Maneuver::Turn)
}

/// Saturate to the `i16` range, then truncate toward zero. NaN maps to zero.
pub fn bound(value: f64) -> i16 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;
    const SEPARATION: f64 = 0.485;

    fn run(vx: f64, wz: f64) -> (FirmwareCommand, Maneuver) {
        translate(vx, wz, SEPARATION, &TranslatorConfig::default())
    }

    #[test]
    fn test_straight_line() {
        let (cmd, maneuver) = run(1.0, 0.00005);
        assert_eq!(maneuver, Maneuver::Straight);
        assert_eq!(cmd.radius, 0.0);
        assert!((cmd.speed - 1000.0).abs() < EPSILON);
    }

    #[test]
    fn test_straight_reverse() {
        let (cmd, _) = run(-0.3, 0.0);
        assert!((cmd.speed + 300.0).abs() < EPSILON);
        assert_eq!(cmd.radius, RADIUS_STRAIGHT);
    }

    #[test]
    fn test_pivot_above_minimum_speed() {
        let (cmd, maneuver) = run(0.0, 0.5);
        assert_eq!(maneuver, Maneuver::Pivot);
        assert!((cmd.speed - 121.25).abs() < EPSILON);
        assert_eq!(cmd.radius, 1.0);
    }

    #[test]
    fn test_pivot_clamped_to_minimum_speed() {
        let (cmd, _) = run(0.0, 0.05);
        assert!((cmd.speed - 50.0).abs() < EPSILON);
        assert_eq!(cmd.radius, RADIUS_PIVOT);

        let (cmd, _) = run(0.0, -0.05);
        assert!((cmd.speed + 50.0).abs() < EPSILON);
        assert_eq!(cmd.radius, RADIUS_PIVOT);
    }

    #[test]
    fn test_general_turn() {
        let (cmd, maneuver) = run(0.5, 0.3);
        assert_eq!(maneuver, Maneuver::Turn);
        assert!((cmd.radius - 1666.666_667).abs() < 1e-3);
        assert!((cmd.speed - 572.75).abs() < EPSILON);
    }

    #[test]
    fn test_general_turn_negative_radius_widens_outward() {
        // Turning right while driving forward: radius < 0, wz < 0
        let (cmd, _) = run(0.5, -0.3);
        assert!((cmd.radius + 1666.666_667).abs() < 1e-3);
        assert!((cmd.speed - 572.75).abs() < EPSILON);
    }

    #[test]
    fn test_dead_zone_forces_pivot() {
        let (cmd, maneuver) = run(0.05, 1.0);
        assert_eq!(maneuver, Maneuver::Pivot);
        assert_eq!(cmd.radius, RADIUS_PIVOT);
        assert!((cmd.speed - 242.5).abs() < EPSILON);
    }

    #[test]
    fn test_tiny_radius_is_executed_as_pivot() {
        // 1000 * 0.2 / 250 = 0.8 mm
        let (_, maneuver) = run(0.2, 250.0);
        assert_eq!(maneuver, Maneuver::Pivot);
    }

    #[test]
    fn test_overridden_thresholds() {
        let config = TranslatorConfig {
            dead_zone: 0.0,
            min_pivot_speed: 100.0,
            ..Default::default()
        };
        let (cmd, maneuver) = translate(0.05, 1.0, SEPARATION, &config);
        assert_eq!(maneuver, Maneuver::Turn);
        assert!((cmd.radius - 50.0).abs() < EPSILON);

        let (cmd, _) = translate(0.0, 0.05, SEPARATION, &config);
        assert!((cmd.speed - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_bound_saturates_and_truncates() {
        assert_eq!(bound(40000.0), 32767);
        assert_eq!(bound(-40000.0), -32768);
        assert_eq!(bound(572.75), 572);
        assert_eq!(bound(-12.9), -12);
        assert_eq!(bound(f64::NAN), 0);
        assert_eq!(FirmwareCommand::new(1e9, 1666.67).bounded(), (32767, 1666));
    }
}
