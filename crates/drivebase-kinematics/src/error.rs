#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! Construction of a kinematics model validates its geometry; everything
//! else in this crate is infallible.

use core::fmt;

/// Errors that can occur when building a kinematics model.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for invalid wheel radius.
    /// This variant is returned when a wheel radius is not a positive, finite number.
    InvalidWheelRadius(&'static str),
    /// Error for invalid wheel separation.
    /// This variant is returned when the distance between the drive wheels is not a positive, finite number.
    InvalidWheelSeparation(&'static str),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidWheelRadius(msg) => write!(f, "Invalid wheel radius: {}", msg),
            KinematicsError::InvalidWheelSeparation(msg) => {
                write!(f, "Invalid wheel separation: {}", msg)
            }
        }
    }
}

impl core::error::Error for KinematicsError {}
