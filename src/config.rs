use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

use drivebase_core::DriveConfig;
use drivebase_kinematics::Pose;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub drive: DriveConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub sensor_period_ms: u64,
    pub control_period_ms: u64,
    pub nav_period_ms: u64,
    pub watchdog_timeout_ms: u64,
    /// 0 runs until interrupted.
    pub run_for_secs: u64,
    pub goal: Pose,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            sensor_period_ms: 10,
            control_period_ms: 1,
            nav_period_ms: 50,
            watchdog_timeout_ms: 200,
            run_for_secs: 30,
            goal: Pose::new(3.0, 1.5, std::f64::consts::FRAC_PI_2),
        }
    }
}

/// Load `config/default.toml` if present, then apply `DRIVEBASE__*`
/// environment overrides (e.g. `DRIVEBASE__DRIVE__KINEMATICS__WHEEL_RADIUS`).
pub fn load_config() -> anyhow::Result<AppConfig> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("DRIVEBASE")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|config| config.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.sensor_period_ms > 0, "sensor_period_ms must be positive");
        anyhow::ensure!(self.control_period_ms > 0, "control_period_ms must be positive");
        anyhow::ensure!(self.nav_period_ms > 0, "nav_period_ms must be positive");
        anyhow::ensure!(self.watchdog_timeout_ms >= 4, "watchdog_timeout_ms must be at least 4");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_simulation_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_period_is_rejected() {
        let config = SimulationConfig {
            nav_period_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserializes_partial_toml() {
        let app: AppConfig = Config::builder()
            .add_source(File::from_str(
                "[drive.translator]\nmin_pivot_speed = 80.0\n[simulation]\nrun_for_secs = 5\n",
                FileFormat::Toml,
            ))
            .build()
            .and_then(|config| config.try_deserialize())
            .unwrap();
        assert_eq!(app.drive.translator.min_pivot_speed, 80.0);
        assert_eq!(app.drive.translator.dead_zone, 0.1);
        assert_eq!(app.drive.kinematics.wheel_separation, 0.485);
        assert_eq!(app.simulation.run_for_secs, 5);
        assert_eq!(app.simulation.sensor_period_ms, 10);
    }
}
