mod blackboard;
mod bus;
mod config;
mod navigation;
mod simulation;
mod state_estimation;

use anyhow::{Context, anyhow};
use spin_sleep::SpinSleeper;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use blackboard::{Blackboard, clear_fault, raise_fault, record_command, snapshot};
use bus::Topic;
use drivebase_core::DiffDrive;
use drivebase_kinematics::{Pose, Twist};
use simulation::{Sample, SimulatedBase};
use state_estimation::PoseEstimator;

const CMD_TIMEOUT_FAULT: &str = "cmd_vel timeout";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app = config::load_config().context("loading configuration")?;
    app.simulation.validate()?;
    let sim = app.simulation;

    let drive = Arc::new(DiffDrive::from_config(app.drive).context("building differential drive")?);
    info!(kinematics = %drive.kinematics(), "Drive ready, starting simulation.");

    let bb: Blackboard = Arc::default();
    let running = Arc::new(AtomicBool::new(true));
    let pose_topic: Topic<Pose> = Topic::new(16);
    let twist_topic: Topic<Twist> = Topic::new(4);

    let pose_rx_for_nav = pose_topic.subscribe();
    let twist_rx_for_control = twist_topic.subscribe();

    info!("Spawning sensor thread...");
    let sensor = spawn_sensor_thread(
        Arc::clone(&drive),
        Arc::clone(&bb),
        pose_topic,
        Duration::from_millis(sim.sensor_period_ms),
        Arc::clone(&running),
    )?;

    info!("Spawning control thread...");
    let control = spawn_control_thread(
        Arc::clone(&drive),
        Arc::clone(&bb),
        twist_rx_for_control,
        Duration::from_millis(sim.control_period_ms),
        Arc::clone(&running),
    )?;

    let tasks = async {
        tokio::try_join!(
            navigation::nav_task(
                bb.clone(),
                pose_rx_for_nav,
                twist_topic,
                sim.goal,
                Duration::from_millis(sim.nav_period_ms),
            ),
            watchdog(bb.clone(), Arc::clone(&drive), Duration::from_millis(sim.watchdog_timeout_ms)),
        )
        .map(|_| ())
    };

    let outcome = if sim.run_for_secs == 0 {
        tasks.await
    } else {
        match tokio::time::timeout(Duration::from_secs(sim.run_for_secs), tasks).await {
            Ok(result) => result,
            Err(_) => {
                info!(secs = sim.run_for_secs, "Simulation time elapsed.");
                Ok(())
            }
        }
    };

    running.store(false, Ordering::Relaxed);
    sensor.join().map_err(|_| anyhow!("sensor thread panicked"))?;
    control.join().map_err(|_| anyhow!("control thread panicked"))?;

    let state = snapshot(&bb);
    info!(
        pose = %state.pose,
        velocity = %state.velocity,
        commanded = %state.commanded,
        firmware_command = ?state.firmware_command,
        faults = ?state.faults,
        "Simulation finished."
    );
    if let Err(e) = &outcome {
        error!("Simulation tasks failed: {:?}", e);
    }
    outcome
}

/// Samples the simulated base, runs odometry and publishes the pose.
fn spawn_sensor_thread(
    drive: Arc<DiffDrive>,
    bb: Blackboard,
    pose_topic: Topic<Pose>,
    period: Duration,
    running: Arc<AtomicBool>,
) -> anyhow::Result<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("sensor".into())
        .spawn(move || {
            info!("Sensor thread started.");
            let sleeper = SpinSleeper::new(10_000);
            // Start close to the top of the counters so the run exercises wraparound.
            let start = Sample {
                timestamp: 65_000,
                left_tick: 65_000,
                right_tick: 12,
            };
            let mut base = SimulatedBase::new(*drive.kinematics(), drive.parameters(), start);
            let mut estimator = PoseEstimator::new(Pose::default());
            let dt = period.as_secs_f64();

            drive.update(start.timestamp, start.left_tick, start.right_tick);
            while running.load(Ordering::Relaxed) {
                sleeper.sleep(period);
                let sample = base.step(drive.get_firmware_command(), dt);
                let update = drive.update(sample.timestamp, sample.left_tick, sample.right_tick);
                let pose = estimator.apply(&update);
                {
                    let mut g = bb.write();
                    g.pose = pose;
                    g.velocity = estimator.velocity();
                }
                pose_topic.publish(pose);
            }

            let wheels = drive.get_wheel_joint_states();
            info!(?wheels, "Sensor thread stopped.");
        })?;
    Ok(handle)
}

/// Turns received twists into firmware commands.
fn spawn_control_thread(
    drive: Arc<DiffDrive>,
    bb: Blackboard,
    mut twist_rx: tokio::sync::broadcast::Receiver<Arc<Twist>>,
    period: Duration,
    running: Arc<AtomicBool>,
) -> anyhow::Result<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("control".into())
        .spawn(move || {
            info!("Control thread started.");
            let sleeper = SpinSleeper::new(1_000);
            while running.load(Ordering::Relaxed) {
                match twist_rx.try_recv() {
                    Ok(twist) => {
                        drive.set_commanded_velocity(twist.vx, twist.wz);
                        drive.translate_velocity(twist.vx, twist.wz);
                        record_command(&bb, *twist, drive.get_firmware_command());
                        clear_fault(&bb, CMD_TIMEOUT_FAULT);
                    }
                    Err(TryRecvError::Lagged(skipped)) => {
                        warn!(skipped, "Control twist receiver lagged.");
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Closed) => break,
                }
                sleeper.sleep(period);
            }
            info!("Control thread stopped.");
        })?;
    Ok(handle)
}

/// Stops the base when no command arrived within `timeout`.
async fn watchdog(bb: Blackboard, drive: Arc<DiffDrive>, timeout: Duration) -> anyhow::Result<()> {
    info!("Watchdog task started.");
    let mut tick = tokio::time::interval(timeout / 4);
    let mut stopped = false;
    loop {
        tick.tick().await;
        let age = snapshot(&bb).last_cmd_ts.elapsed();
        if age > timeout {
            if !stopped {
                warn!(?age, "Command velocity timeout! Stopping the base.");
                raise_fault(&bb, CMD_TIMEOUT_FAULT);
                stopped = true;
            }
            drive.set_raw_firmware_command(0, 0);
        } else {
            stopped = false;
        }
    }
}
