//! Thread-safe differential-drive facade over odometry and command translation.

use parking_lot::Mutex;
use tracing::{debug, info, trace};

use drivebase_kinematics::{DifferentialDrive, Twist, WheelDifferential};

use crate::command::{self, FirmwareCommand};
use crate::config::{DriveConfig, KinematicsParameters, TranslatorConfig};
use crate::error::Result;
use crate::odometry::{OdometryState, OdometryUpdate, WheelJointStates};

#[derive(Debug, Default)]
struct CommandState {
    commanded: Twist,
    firmware: FirmwareCommand,
}

/// Differential-drive base: odometry from encoder samples and speed/radius
/// commands from twists.
///
/// Odometry and command state sit behind two independent locks, so a sensor
/// thread calling [`update`](Self::update) never waits on a control thread
/// calling [`translate_velocity`](Self::translate_velocity). No method takes
/// both locks.
#[derive(Debug)]
pub struct DiffDrive<K = DifferentialDrive> {
    kinematics: K,
    params: KinematicsParameters,
    translator: TranslatorConfig,
    odometry: Mutex<OdometryState>,
    command: Mutex<CommandState>,
}

impl DiffDrive<DifferentialDrive> {
    /// Build a drive using the stock two-wheel model for the configured geometry.
    pub fn from_config(config: DriveConfig) -> Result<Self> {
        let kinematics = DifferentialDrive::new(
            config.kinematics.wheel_radius,
            config.kinematics.wheel_separation,
        )?;
        Self::new(config, kinematics)
    }
}

impl<K: WheelDifferential> DiffDrive<K> {
    /// Build a drive around an arbitrary pose-update model.
    ///
    /// `config.kinematics.wheel_separation` is still used by the command
    /// translator; the geometry used for odometry is whatever `kinematics`
    /// encodes.
    pub fn new(config: DriveConfig, kinematics: K) -> Result<Self> {
        config.validate()?;
        info!(
            wheel_separation = config.kinematics.wheel_separation,
            wheel_radius = config.kinematics.wheel_radius,
            tick_to_rad = config.kinematics.tick_to_rad,
            "differential drive initialized"
        );
        Ok(Self {
            kinematics,
            params: config.kinematics,
            translator: config.translator,
            odometry: Mutex::new(OdometryState::default()),
            command: Mutex::new(CommandState::default()),
        })
    }

    /// Feed one firmware sample and get the motion since the previous one.
    pub fn update(&self, timestamp: u16, left_tick: u16, right_tick: u16) -> OdometryUpdate {
        let mut odometry = self.odometry.lock();
        let update = odometry.update(
            &self.kinematics,
            self.params.tick_to_rad,
            timestamp,
            left_tick,
            right_tick,
        );
        trace!(
            timestamp,
            left_tick,
            right_tick,
            delta = %update.pose_delta,
            rate = ?update.pose_rate,
            "odometry update"
        );
        update
    }

    /// Zero the accumulated wheel angles and rates.
    ///
    /// Tick and timestamp baselines survive, so the next [`update`](Self::update)
    /// measures against the last sample seen before the reset.
    pub fn reset(&self) {
        self.odometry.lock().reset();
        info!("wheel odometry reset");
    }

    pub fn get_wheel_joint_states(&self) -> WheelJointStates {
        self.odometry.lock().wheel_joint_states()
    }

    /// Elapsed time (s) of the last interval over which rates were computed.
    pub fn last_elapsed(&self) -> f64 {
        self.odometry.lock().last_elapsed()
    }

    /// Record the raw twist last requested. Telemetry only; does not change
    /// the firmware command.
    pub fn set_commanded_velocity(&self, vx: f64, wz: f64) {
        self.command.lock().commanded = Twist::new(vx, wz);
    }

    pub fn commanded_velocity(&self) -> Twist {
        self.command.lock().commanded
    }

    /// Translate a twist into a speed/radius pair and store it as the
    /// firmware command.
    pub fn translate_velocity(&self, vx: f64, wz: f64) -> FirmwareCommand {
        let mut state = self.command.lock();
        let (cmd, maneuver) =
            command::translate(vx, wz, self.params.wheel_separation, &self.translator);
        state.firmware = cmd;
        debug!(vx, wz, speed = cmd.speed, radius = cmd.radius, ?maneuver, "velocity command");
        cmd
    }

    /// Store a speed (mm/s) and radius (mm) pair as-is.
    pub fn set_raw_firmware_command(&self, speed: i16, radius: i16) {
        self.command.lock().firmware = FirmwareCommand::new(f64::from(speed), f64::from(radius));
        debug!(speed, radius, "raw firmware command");
    }

    /// Current firmware command, saturated to `i16` and ready for transmission.
    pub fn get_firmware_command(&self) -> (i16, i16) {
        self.command.lock().firmware.bounded()
    }

    /// Current firmware command before bounding.
    pub fn firmware_command_raw(&self) -> FirmwareCommand {
        self.command.lock().firmware
    }

    pub fn parameters(&self) -> &KinematicsParameters {
        &self.params
    }

    pub fn translator_config(&self) -> &TranslatorConfig {
        &self.translator
    }

    pub fn kinematics(&self) -> &K {
        &self.kinematics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriveError;
    use drivebase_kinematics::{KinematicsError, PoseDelta, PoseRate};
    use std::sync::Arc;
    use std::thread;

    const EPSILON: f64 = 1e-9;

    fn drive() -> DiffDrive {
        DiffDrive::from_config(DriveConfig::default()).unwrap()
    }

    /// Reports wheel angles directly so tests can see what the drive passes in.
    struct Passthrough;

    impl WheelDifferential for Passthrough {
        fn pose_update(&self, left_radians: f64, right_radians: f64) -> PoseDelta {
            PoseDelta::new(left_radians, right_radians, 0.0)
        }
    }

    #[test]
    fn test_first_update_has_zero_delta() {
        let drive = drive();
        let update = drive.update(31000, 54321, 777);
        assert_eq!(update.pose_delta, PoseDelta::default());
        assert_eq!(update.pose_rate, None);
    }

    #[test]
    fn test_injected_kinematics_receives_wheel_radians() {
        let config = DriveConfig {
            kinematics: KinematicsParameters {
                tick_to_rad: 0.01,
                ..Default::default()
            },
            ..Default::default()
        };
        let drive = DiffDrive::new(config, Passthrough).unwrap();
        drive.update(0, 65535, 10);
        let update = drive.update(100, 99, 0);
        assert!((update.pose_delta.dx - 1.0).abs() < EPSILON);
        assert!((update.pose_delta.dy + 0.1).abs() < EPSILON);
        let PoseRate { vx, vy, .. } = update.pose_rate.unwrap();
        assert!((vx - 10.0).abs() < EPSILON);
        assert!((vy + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_instances_have_independent_baselines() {
        let a = drive();
        let b = drive();
        a.update(0, 100, 100);
        // `b` has never seen a sample, so this only seeds it
        let update = b.update(10, 5000, 5000);
        assert_eq!(update.pose_delta, PoseDelta::default());
        assert_eq!(b.get_wheel_joint_states(), WheelJointStates::default());
    }

    #[test]
    fn test_reset_measures_from_pre_reset_baseline() {
        let drive = drive();
        let tick_to_rad = drive.parameters().tick_to_rad;
        drive.update(0, 1000, 1000);
        drive.update(10, 1100, 1100);
        drive.reset();
        assert_eq!(drive.get_wheel_joint_states(), WheelJointStates::default());

        drive.update(30, 1150, 1150);
        let wheels = drive.get_wheel_joint_states();
        assert!((wheels.left_angle - 50.0 * tick_to_rad).abs() < EPSILON);
        assert!((wheels.left_rate - 50.0 * tick_to_rad / 0.020).abs() < EPSILON);
        assert!((drive.last_elapsed() - 0.020).abs() < EPSILON);
    }

    #[test]
    fn test_translate_then_read_bounded_command() {
        let drive = drive();
        let cmd = drive.translate_velocity(0.5, 0.3);
        assert!((cmd.speed - 572.75).abs() < 1e-6);
        assert_eq!(drive.get_firmware_command(), (572, 1666));
        assert_eq!(drive.firmware_command_raw(), cmd);
    }

    #[test]
    fn test_commanded_velocity_is_telemetry_only() {
        let drive = drive();
        drive.translate_velocity(0.0, 0.5);
        drive.set_commanded_velocity(1.0, 0.0);
        assert_eq!(drive.commanded_velocity(), Twist::new(1.0, 0.0));
        assert_eq!(drive.get_firmware_command(), (121, 1));
    }

    #[test]
    fn test_raw_command_bypasses_translation() {
        let drive = drive();
        drive.translate_velocity(1.0, 0.0);
        drive.set_raw_firmware_command(-200, 1);
        assert_eq!(drive.get_firmware_command(), (-200, 1));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = DriveConfig {
            kinematics: KinematicsParameters {
                wheel_radius: -0.2,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            DiffDrive::from_config(config),
            Err(DriveError::Kinematics(KinematicsError::InvalidWheelRadius(_)))
        ));

        let config = DriveConfig {
            kinematics: KinematicsParameters {
                tick_to_rad: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            DiffDrive::from_config(config),
            Err(DriveError::InvalidParameter { name: "tick_to_rad", .. })
        ));
    }

    #[test]
    fn test_concurrent_odometry_and_commands() {
        let drive = Arc::new(drive());

        let producer = {
            let drive = Arc::clone(&drive);
            thread::spawn(move || {
                let mut tick: u16 = 65000;
                for i in 0..2000u16 {
                    tick = tick.wrapping_add(7);
                    drive.update(i.wrapping_mul(10), tick, tick);
                }
            })
        };
        let commander = {
            let drive = Arc::clone(&drive);
            thread::spawn(move || {
                for i in 0..2000 {
                    let wz = if i % 2 == 0 { 0.5 } else { 0.0 };
                    drive.set_commanded_velocity(0.5, wz);
                    drive.translate_velocity(0.5, wz);
                    drive.get_firmware_command();
                }
            })
        };
        producer.join().unwrap();
        commander.join().unwrap();

        let tick_to_rad = drive.parameters().tick_to_rad;
        let wheels = drive.get_wheel_joint_states();
        assert!((wheels.left_angle - 1999.0 * 7.0 * tick_to_rad).abs() < 1e-6);
        assert_eq!(drive.commanded_velocity(), Twist::new(0.5, 0.0));
        assert_eq!(drive.get_firmware_command(), (500, 0));
    }
}
