//! Wheel odometry from 16-bit encoder ticks and the firmware timestamp.

use drivebase_kinematics::{PoseDelta, PoseRate, WheelDifferential};

use crate::counter::{TickTracker, TimeBase};

/// Result of one odometry sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OdometryUpdate {
    /// Motion since the previous sample, in the robot frame.
    pub pose_delta: PoseDelta,
    /// `pose_delta` divided by the elapsed firmware time.
    ///
    /// `None` when the firmware clock did not advance since the previous
    /// sample (including the very first sample), since no interval is
    /// available to divide by.
    pub pose_rate: Option<PoseRate>,
}

/// Accumulated wheel angles and the most recent wheel rates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelJointStates {
    pub left_angle: f64,
    pub left_rate: f64,
    pub right_angle: f64,
    pub right_rate: f64,
}

/// State guarded by the odometry lock of a drive.
#[derive(Debug, Default)]
pub(crate) struct OdometryState {
    left_ticks: TickTracker,
    right_ticks: TickTracker,
    time: TimeBase,
    wheels: WheelJointStates,
}

impl OdometryState {
    pub(crate) fn update<K: WheelDifferential + ?Sized>(
        &mut self,
        kinematics: &K,
        tick_to_rad: f64,
        timestamp: u16,
        left_tick: u16,
        right_tick: u16,
    ) -> OdometryUpdate {
        let left_rad = tick_to_rad * f64::from(self.left_ticks.update(left_tick));
        let right_rad = tick_to_rad * f64::from(self.right_ticks.update(right_tick));
        self.wheels.left_angle += left_rad;
        self.wheels.right_angle += right_rad;

        let pose_delta = kinematics.pose_update(left_rad, right_rad);

        // Rates are only refreshed when the clock moved; otherwise the wheel
        // rates keep their last value and no pose rate is reported.
        let pose_rate = self.time.update(timestamp).map(|dt| {
            self.wheels.left_rate = left_rad / dt;
            self.wheels.right_rate = right_rad / dt;
            PoseRate::new(pose_delta.dx / dt, pose_delta.dy / dt, pose_delta.dtheta / dt)
        });

        OdometryUpdate {
            pose_delta,
            pose_rate,
        }
    }

    pub(crate) fn wheel_joint_states(&self) -> WheelJointStates {
        self.wheels
    }

    /// Clears angles and rates. Counter baselines are kept, so the next sample
    /// is still measured against the last one seen before the reset.
    pub(crate) fn reset(&mut self) {
        self.wheels = WheelJointStates::default();
    }

    pub(crate) fn last_elapsed(&self) -> f64 {
        self.time.last_elapsed()
    }
}
