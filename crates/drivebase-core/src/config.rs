//! Construction-time parameters for [`DiffDrive`](crate::DiffDrive).

use serde::Deserialize;

use crate::error::DriveError;

/// Geometry and encoder scaling of the base. Fixed once a drive is built.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct KinematicsParameters {
    /// Distance between the drive wheels (m), a.k.a. bias or tread.
    pub wheel_separation: f64,
    /// Drive wheel radius (m).
    pub wheel_radius: f64,
    /// Wheel rotation per encoder tick (rad).
    pub tick_to_rad: f64,
}

impl Default for KinematicsParameters {
    fn default() -> Self {
        Self {
            wheel_separation: 0.485,
            wheel_radius: 0.205,
            tick_to_rad: 0.000_716_740_29,
        }
    }
}

impl KinematicsParameters {
    pub fn validate(&self) -> Result<(), DriveError> {
        positive("wheel_separation", self.wheel_separation)?;
        positive("wheel_radius", self.wheel_radius)?;
        positive("tick_to_rad", self.tick_to_rad)
    }
}

/// Thresholds used when turning a twist into a speed/radius command.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Angular rate (rad/s) and linear speed (m/s) below which a component counts as zero.
    pub epsilon: f64,
    /// Linear speeds (m/s) below this are dropped before branch selection.
    pub dead_zone: f64,
    /// Smallest speed magnitude (mm/s) sent for a pivot turn.
    pub min_pivot_speed: f64,
    /// Turning radii (mm) at or below this are executed as a pivot.
    pub pivot_radius: f64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-4,
            dead_zone: 0.1,
            min_pivot_speed: 50.0,
            pivot_radius: 1.0,
        }
    }
}

impl TranslatorConfig {
    pub fn validate(&self) -> Result<(), DriveError> {
        positive("epsilon", self.epsilon)?;
        non_negative("dead_zone", self.dead_zone)?;
        non_negative("min_pivot_speed", self.min_pivot_speed)?;
        non_negative("pivot_radius", self.pivot_radius)
    }
}

/// Everything a drive needs at construction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub kinematics: KinematicsParameters,
    pub translator: TranslatorConfig,
}

impl DriveConfig {
    pub fn validate(&self) -> Result<(), DriveError> {
        self.kinematics.validate()?;
        self.translator.validate()
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), DriveError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(DriveError::InvalidParameter {
            name,
            value,
            reason: "must be positive and finite",
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), DriveError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(DriveError::InvalidParameter {
            name,
            value,
            reason: "must be non-negative and finite",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DriveConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_geometry() {
        let params = KinematicsParameters {
            wheel_separation: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(DriveError::InvalidParameter { name: "wheel_separation", .. })
        ));

        let params = KinematicsParameters {
            tick_to_rad: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(DriveError::InvalidParameter { name: "tick_to_rad", .. })
        ));
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let config = DriveConfig {
            translator: TranslatorConfig {
                min_pivot_speed: -1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DriveError::InvalidParameter { name: "min_pivot_speed", .. })
        ));
    }

    #[test]
    fn test_rejects_zero_epsilon() {
        let translator = TranslatorConfig {
            epsilon: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            translator.validate(),
            Err(DriveError::InvalidParameter { name: "epsilon", .. })
        ));
    }
}
