use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use drivebase_kinematics::{Pose, Twist};

use crate::blackboard::{Blackboard, snapshot};
use crate::bus::Topic;

const KP_LINEAR: f64 = 0.5;
const KP_ANGULAR: f64 = 1.0;
const KP_ORIENTATION: f64 = 0.8;
const MAX_VX: f64 = 0.5; // m/s
// Stays above the translator's default dead zone (0.1 m/s) so the approach
// never degrades into pivoting short of the goal.
const MIN_VX: f64 = 0.15; // m/s
const MAX_WZ: f64 = 1.0; // rad/s
const DISTANCE_THRESHOLD: f64 = 0.1; // m
const ANGLE_THRESHOLD: f64 = 0.05; // rad

/// Go-to-goal task publishing twists at a fixed rate.
pub async fn nav_task(
    bb: Blackboard,
    mut pose_rx: broadcast::Receiver<Arc<Pose>>,
    twist_tx: Topic<Twist>,
    goal: Pose,
    period: Duration,
) -> anyhow::Result<()> {
    tracing::info!(%goal, "Navigation task started.");
    let mut ticker = time::interval(period);
    let mut current_pose = snapshot(&bb).pose;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let twist = compute_twist(&current_pose, &goal);
                tracing::debug!(vx = twist.vx, wz = twist.wz, pose = %current_pose, "Computed twist for navigation");
                twist_tx.publish(twist);
            }
            received = pose_rx.recv() => match received {
                Ok(pose) => current_pose = *pose,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Navigation pose receiver lagged.");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Pose topic closed, navigation task exiting.");
                    return Ok(());
                }
            },
        }
    }
}

/// Proportional controller: turn toward the goal while driving, then align
/// with the goal heading once within `DISTANCE_THRESHOLD`.
pub fn compute_twist(current: &Pose, goal: &Pose) -> Twist {
    let dx = goal.x - current.x;
    let dy = goal.y - current.y;
    let distance = (dx * dx + dy * dy).sqrt();

    if distance < DISTANCE_THRESHOLD {
        let dth_final = Pose::normalize_angle(goal.theta - current.theta);
        if dth_final.abs() < ANGLE_THRESHOLD {
            return Twist::default();
        }
        return Twist::new(0.0, (KP_ORIENTATION * dth_final).clamp(-MAX_WZ, MAX_WZ));
    }

    let dth_nav = Pose::normalize_angle(dy.atan2(dx) - current.theta);
    let mut vx = (KP_LINEAR * distance).clamp(MIN_VX, MAX_VX);
    let wz = (KP_ANGULAR * dth_nav).clamp(-MAX_WZ, MAX_WZ);

    // Large heading error: turn on the spot first
    if dth_nav.abs() > std::f64::consts::FRAC_PI_2 {
        vx = 0.0;
    }

    Twist::new(vx, wz)
}
