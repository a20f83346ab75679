use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use drivebase_kinematics::{Pose, PoseRate, Twist};

/// Latest values shared between the simulation threads and async tasks.
#[derive(Clone)]
pub struct State {
    pub pose: Pose,
    pub velocity: PoseRate,
    pub commanded: Twist,
    pub firmware_command: (i16, i16),
    pub last_cmd_ts: Instant,
    pub faults: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        State {
            pose: Pose::default(),
            velocity: PoseRate::default(),
            commanded: Twist::default(),
            firmware_command: (0, 0),
            last_cmd_ts: Instant::now(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn record_command(bb: &Blackboard, commanded: Twist, firmware_command: (i16, i16)) {
    let mut g = bb.write();
    g.commanded = commanded;
    g.firmware_command = firmware_command;
    g.last_cmd_ts = Instant::now();
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}

pub fn clear_fault(bb: &Blackboard, msg: &str) {
    bb.write().faults.retain(|s| s != msg);
}
