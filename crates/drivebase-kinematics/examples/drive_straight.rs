use drivebase_kinematics::*;

fn main() {
    let wheel_radius = 0.205;
    let wheel_separation = 0.485;
    let kinematics = match DifferentialDrive::new(wheel_radius, wheel_separation) {
        Ok(kinematics) => kinematics,
        Err(e) => {
            eprintln!("Failed to initialize kinematics: {}", e);
            return;
        }
    };

    // Each step the right wheel turns slightly further than the left.
    let (left, right) = (0.05, 0.055);
    let num_steps = 10;
    let mut pose = Pose::default();

    println!("{}", kinematics);
    println!("  Wheel rotation per step: L = {} rad, R = {} rad", left, right);
    for i in 0..num_steps {
        let delta = kinematics.pose_update(left, right);
        pose = pose.compose(delta);
        println!("Step {:>2}: delta {} -> pose {}", i + 1, delta, pose);
    }
    println!("Final Pose: {:?}", pose);
}
