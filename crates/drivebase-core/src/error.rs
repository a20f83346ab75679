//! Error types for drive construction.
//!
//! Runtime operations on a drive cannot fail; only building one can.

use drivebase_kinematics::KinematicsError;

pub type Result<T> = std::result::Result<T, DriveError>;

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    /// A configuration value is out of range.
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The default kinematics model rejected the geometry.
    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),
}
