use drivebase_core::OdometryUpdate;
use drivebase_kinematics::{Pose, PoseRate};

/// Dead-reckoned world pose built from successive odometry updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoseEstimator {
    pose: Pose,
    velocity: PoseRate,
}

impl PoseEstimator {
    pub fn new(initial: Pose) -> Self {
        Self {
            pose: initial,
            velocity: PoseRate::default(),
        }
    }

    /// Fold one update into the pose. The velocity estimate keeps its last
    /// value when the update carries no rate.
    pub fn apply(&mut self, update: &OdometryUpdate) -> Pose {
        self.pose = self.pose.compose(update.pose_delta);
        if let Some(rate) = update.pose_rate {
            self.velocity = rate;
        }
        self.pose
    }

    pub fn velocity(&self) -> PoseRate {
        self.velocity
    }
}
