//! Odometry and command translation for a two-wheel differential base whose
//! firmware reports 16-bit encoder and millisecond counters and accepts
//! speed/radius motion commands.
//!
//! ```
//! use drivebase_core::{DiffDrive, DriveConfig};
//!
//! let drive = DiffDrive::from_config(DriveConfig::default()).unwrap();
//! drive.update(1000, 65530, 10);
//! let odom = drive.update(1020, 4, 30);
//! assert!(odom.pose_rate.is_some());
//!
//! drive.translate_velocity(0.5, 0.3);
//! assert_eq!(drive.get_firmware_command(), (572, 1666));
//! ```

pub mod command;
pub mod config;
pub mod counter;
pub mod drive;
pub mod error;
pub mod odometry;

pub use command::{FirmwareCommand, Maneuver, RADIUS_PIVOT, RADIUS_STRAIGHT, bound, translate};
pub use config::{DriveConfig, KinematicsParameters, TranslatorConfig};
pub use counter::{TickTracker, TimeBase, wrapping_delta};
pub use drive::DiffDrive;
pub use error::{DriveError, Result};
pub use odometry::{OdometryUpdate, WheelJointStates};

pub use drivebase_kinematics as kinematics;
