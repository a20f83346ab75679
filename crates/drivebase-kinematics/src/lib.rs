#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for 2D differential-drive robot kinematics."]
#![doc = ""]
#![doc = "This crate provides pose, twist and wheel-speed types, the wheel-differential"]
#![doc = "pose update primitive used by odometry, and inverse kinematics."]

use core::f64::consts::PI;
use core::fmt;
use libm::{cos, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::KinematicsError;

/// A 2‑D pose `(x, y, θ)` in meters and radians (θ measured counter‑clockwise
/// from the x‑axis in the world frame).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World‑frame x position (m).
    pub x: f64,
    /// World‑frame y position (m).
    pub y: f64,
    /// Heading (rad), normalized to `[-PI, PI)`.
    pub theta: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position in meters.
    /// * `y`: World-frame y position in meters.
    /// * `theta`: Heading in radians.
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose { x, y, theta }
    }

    /// Normalize an angle to be within `[-PI, PI)`.
    ///
    /// Angles at `PI` will be normalized to `-PI`.
    pub fn normalize_angle(angle: f64) -> f64 {
        let a = angle % (2.0 * PI);
        if a >= PI {
            a - 2.0 * PI
        } else if a < -PI {
            a + 2.0 * PI
        } else {
            a
        }
    }

    /// Compose a pose delta expressed in the robot frame onto this world pose.
    ///
    /// The translation of `delta` is rotated by the current heading before it
    /// is added; the resulting heading is normalized to `[-PI, PI)`.
    pub fn compose(&self, delta: PoseDelta) -> Pose {
        let (s, c) = (sin(self.theta), cos(self.theta));
        Pose {
            x: self.x + delta.dx * c - delta.dy * s,
            y: self.y + delta.dx * s + delta.dy * c,
            theta: Pose::normalize_angle(self.theta + delta.dtheta),
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.2}, y: {:.2}, θ: {:.2} rad)", self.x, self.y, self.theta)
    }
}

/// Incremental motion over one sampling interval, in the robot frame at the
/// start of the interval.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseDelta {
    /// Forward displacement (m).
    pub dx: f64,
    /// Lateral displacement (m), positive to the left.
    pub dy: f64,
    /// Heading change (rad), positive counter-clockwise.
    pub dtheta: f64,
}

impl PoseDelta {
    /// Construct a new pose delta.
    pub const fn new(dx: f64, dy: f64, dtheta: f64) -> Self {
        PoseDelta { dx, dy, dtheta }
    }
}

impl fmt::Display for PoseDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(dx: {:.4} m, dy: {:.4} m, dθ: {:.4} rad)", self.dx, self.dy, self.dtheta)
    }
}

/// Rate of change of the pose, in the robot frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseRate {
    /// Forward velocity (m/s).
    pub vx: f64,
    /// Lateral velocity (m/s).
    pub vy: f64,
    /// Angular velocity (rad/s).
    pub omega: f64,
}

impl PoseRate {
    /// Construct a new pose rate.
    pub const fn new(vx: f64, vy: f64, omega: f64) -> Self {
        PoseRate { vx, vy, omega }
    }
}

impl fmt::Display for PoseRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(vx: {:.2} m/s, vy: {:.2} m/s, ω: {:.2} rad/s)", self.vx, self.vy, self.omega)
    }
}

/// A twist expressed in the robot base frame.
/// A twist represents the linear and angular velocities of the robot.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Twist {
    /// Linear x velocity (m/s) in the robot's base frame.
    pub vx: f64,
    /// Angular z velocity (rad/s) around the robot's base frame z-axis.
    pub wz: f64,
}

impl Twist {
    /// Construct a new twist.
    ///
    /// # Arguments
    ///
    /// * `vx`: Linear velocity along the robot's x-axis (m/s).
    /// * `wz`: Angular velocity around the robot's z-axis (rad/s).
    pub const fn new(vx: f64, wz: f64) -> Self {
        Twist { vx, wz }
    }
}

impl fmt::Display for Twist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(vx: {:.2} m/s, ωz: {:.2} rad/s)", self.vx, self.wz)
    }
}

/// Left and right wheel angular velocities.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds {
    /// Left wheel angular velocity (rad/s).
    pub omega_l: f64,
    /// Right wheel angular velocity (rad/s).
    pub omega_r: f64,
}

impl WheelSpeeds {
    /// Construct wheel speeds.
    pub const fn new(omega_l: f64, omega_r: f64) -> Self {
        WheelSpeeds { omega_l, omega_r }
    }
}

impl fmt::Display for WheelSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(ωL: {:.2} rad/s, ωR: {:.2} rad/s)", self.omega_l, self.omega_r)
    }
}

/// Linear and angular chassis velocities.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
    /// Linear speed of the chassis center (m/s).
    pub v: f64,
    /// Angular speed of the chassis (rad/s).
    pub omega: f64,
}

impl ChassisSpeeds {
    /// Construct chassis speeds.
    pub const fn new(v: f64, omega: f64) -> Self {
        ChassisSpeeds { v, omega }
    }
}

/// Turns per-wheel angular displacements into a pose delta.
///
/// Odometry consumers depend on this trait rather than a concrete model so a
/// different base geometry can be substituted without touching them.
pub trait WheelDifferential {
    /// Pose change produced by rotating the left and right wheels by the
    /// given angles (rad) over one sampling interval.
    fn pose_update(&self, left_radians: f64, right_radians: f64) -> PoseDelta;
}

/// Differential‑drive kinematics helper.
///
/// This struct encapsulates the physical parameters of a differential-drive robot
/// (wheel radius and wheel separation) and provides methods for kinematic calculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialDrive {
    /// Wheel radius (m).
    wheel_radius: f64,
    /// Distance between the drive wheel contact points (m).
    wheel_separation: f64,
}

impl DifferentialDrive {
    /// Construct a new differential‑drive kinematics helper.
    ///
    /// # Arguments
    ///
    /// * `wheel_radius`: The radius of the robot's wheels in meters.
    /// * `wheel_separation`: The distance between the centers of the two drive wheels in meters.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidWheelRadius)` if `wheel_radius` is not positive and finite.
    /// Returns `Err(KinematicsError::InvalidWheelSeparation)` if `wheel_separation` is not positive and finite.
    pub fn new(wheel_radius: f64, wheel_separation: f64) -> Result<Self, KinematicsError> {
        if wheel_radius <= 0.0 || !wheel_radius.is_finite() {
            return Err(KinematicsError::InvalidWheelRadius("must be positive"));
        }
        if wheel_separation <= 0.0 || !wheel_separation.is_finite() {
            return Err(KinematicsError::InvalidWheelSeparation("must be positive"));
        }
        Ok(DifferentialDrive {
            wheel_radius,
            wheel_separation,
        })
    }

    /// Returns the wheel radius.
    pub fn wheel_radius(&self) -> f64 {
        self.wheel_radius
    }

    /// Returns the wheel separation.
    pub fn wheel_separation(&self) -> f64 {
        self.wheel_separation
    }

    /// Calculates the wheel speeds required for the given chassis speeds
    /// (inverse kinematics).
    pub fn inverse_kinematics(&self, chassis_speeds: ChassisSpeeds) -> WheelSpeeds {
        let v_r = chassis_speeds.v + chassis_speeds.omega * (self.wheel_separation / 2.0);
        let v_l = chassis_speeds.v - chassis_speeds.omega * (self.wheel_separation / 2.0);

        WheelSpeeds::new(v_l / self.wheel_radius, v_r / self.wheel_radius)
    }
}

impl WheelDifferential for DifferentialDrive {
    /// The translation is reported along the robot's x axis only; the heading
    /// change follows from the difference in wheel travel.
    fn pose_update(&self, left_radians: f64, right_radians: f64) -> PoseDelta {
        let ds = self.wheel_radius * (left_radians + right_radians) / 2.0;
        let dtheta = self.wheel_radius * (right_radians - left_radians) / self.wheel_separation;
        PoseDelta::new(ds, 0.0, dtheta)
    }
}

impl fmt::Display for DifferentialDrive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DifferentialDrive (r: {:.3} m, b: {:.3} m)",
            self.wheel_radius, self.wheel_separation
        )
    }
}
