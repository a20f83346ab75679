//! Simulated base firmware.
//!
//! Executes speed/radius commands the way the base would and reports wrapping
//! 16-bit encoder counters and a wrapping millisecond timestamp.

use drivebase_core::{KinematicsParameters, RADIUS_PIVOT, RADIUS_STRAIGHT};
use drivebase_kinematics::{ChassisSpeeds, DifferentialDrive, WheelSpeeds};

/// One firmware sample as delivered to odometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub timestamp: u16,
    pub left_tick: u16,
    pub right_tick: u16,
}

pub struct SimulatedBase {
    kinematics: DifferentialDrive,
    tick_to_rad: f64,
    // Fractional ticks/ms carried between steps
    left_accumulator: f64,
    right_accumulator: f64,
    ms_accumulator: f64,
    left_ticks: u16,
    right_ticks: u16,
    timestamp: u16,
}

impl SimulatedBase {
    pub fn new(kinematics: DifferentialDrive, params: &KinematicsParameters, start: Sample) -> Self {
        Self {
            kinematics,
            tick_to_rad: params.tick_to_rad,
            left_accumulator: 0.0,
            right_accumulator: 0.0,
            ms_accumulator: 0.0,
            left_ticks: start.left_tick,
            right_ticks: start.right_tick,
            timestamp: start.timestamp,
        }
    }

    /// Chassis motion the firmware performs for a bounded speed (mm/s) and
    /// radius (mm) command.
    pub fn chassis_speeds(&self, speed: i16, radius: i16) -> ChassisSpeeds {
        let speed = f64::from(speed) / 1000.0;
        let radius = f64::from(radius);
        let half_tread = self.kinematics.wheel_separation() / 2.0;

        if radius == RADIUS_STRAIGHT {
            ChassisSpeeds::new(speed, 0.0)
        } else if radius == RADIUS_PIVOT {
            ChassisSpeeds::new(0.0, speed / half_tread)
        } else {
            // `speed` is that of the outer tread edge
            let radius = radius / 1000.0;
            let omega = speed / (radius + half_tread.copysign(radius));
            ChassisSpeeds::new(omega * radius, omega)
        }
    }

    pub fn wheel_speeds(&self, speed: i16, radius: i16) -> WheelSpeeds {
        self.kinematics
            .inverse_kinematics(self.chassis_speeds(speed, radius))
    }

    /// Run the command for `dt` seconds and return the resulting sample.
    pub fn step(&mut self, command: (i16, i16), dt: f64) -> Sample {
        let wheels = self.wheel_speeds(command.0, command.1);

        self.left_accumulator += wheels.omega_l * dt / self.tick_to_rad;
        self.right_accumulator += wheels.omega_r * dt / self.tick_to_rad;
        self.ms_accumulator += dt * 1000.0;

        let left_whole = self.left_accumulator.trunc();
        let right_whole = self.right_accumulator.trunc();
        let ms_whole = self.ms_accumulator.trunc();
        self.left_accumulator -= left_whole;
        self.right_accumulator -= right_whole;
        self.ms_accumulator -= ms_whole;

        // Counters wrap like the firmware's
        self.left_ticks = self.left_ticks.wrapping_add(left_whole as i64 as u16);
        self.right_ticks = self.right_ticks.wrapping_add(right_whole as i64 as u16);
        self.timestamp = self.timestamp.wrapping_add(ms_whole as i64 as u16);

        self.sample()
    }

    pub fn sample(&self) -> Sample {
        Sample {
            timestamp: self.timestamp,
            left_tick: self.left_ticks,
            right_tick: self.right_ticks,
        }
    }
}
