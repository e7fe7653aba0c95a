//! Per-vehicle data: loop timing, controller tuning, button bindings and
//! port wiring. Every vehicle runs the same [`ControlCore`](crate::control::ControlCore);
//! only this data differs between them.

extern crate alloc;
use alloc::vec::Vec;
use core::time::Duration;

use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::{
    error::{AdiPortSnafu, ConfigError, EmptyGroupSnafu, PeriodSnafu, SmartPortSnafu},
    heading::HeadingConfig,
    range::RangeConfig,
    shooter::ShooterConfig,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonId {
    A,
    B,
    X,
    Y,
    Up,
    Down,
    Left,
    Right,
    L1,
    L2,
    R1,
    R2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    pub assist: ButtonId,
    pub solenoid: ButtonId,
    pub top_direction: ButtonId,
    pub top_stop: ButtonId,
    pub bottom_direction: ButtonId,
    pub bottom_stop: ButtonId,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            assist: ButtonId::L1,
            solenoid: ButtonId::R1,
            top_direction: ButtonId::A,
            top_stop: ButtonId::X,
            bottom_direction: ButtonId::Y,
            bottom_stop: ButtonId::B,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorPort {
    pub port: u8,
    #[serde(default)]
    pub reversed: bool,
}

impl MotorPort {
    pub const fn forward(port: u8) -> Self {
        Self {
            port,
            reversed: false,
        }
    }

    pub const fn reverse(port: u8) -> Self {
        Self {
            port,
            reversed: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wiring {
    pub left_drive: Vec<MotorPort>,
    pub right_drive: Vec<MotorPort>,
    pub top_shooter: Vec<MotorPort>,
    pub bottom_shooter: Vec<MotorPort>,
    pub imu: u8,
    pub sight: u8,
    /// ADI port (1 = A) driving the pneumatic valve.
    pub solenoid: u8,
}

impl Default for Wiring {
    fn default() -> Self {
        Self {
            left_drive: alloc::vec![MotorPort::reverse(1), MotorPort::reverse(2)],
            right_drive: alloc::vec![MotorPort::forward(3), MotorPort::forward(4)],
            top_shooter: alloc::vec![MotorPort::forward(6), MotorPort::forward(5)],
            bottom_shooter: alloc::vec![MotorPort::forward(7), MotorPort::reverse(8)],
            imu: 10,
            sight: 11,
            solenoid: 1,
        }
    }
}

impl Wiring {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(!self.left_drive.is_empty(), EmptyGroupSnafu { group: "left_drive" });
        ensure!(!self.right_drive.is_empty(), EmptyGroupSnafu { group: "right_drive" });

        let mut used = [false; 22];
        let motors = self
            .left_drive
            .iter()
            .chain(&self.right_drive)
            .chain(&self.top_shooter)
            .chain(&self.bottom_shooter)
            .map(|m| m.port);
        for port in motors.chain([self.imu, self.sight]) {
            ensure!((1..=21).contains(&port), SmartPortSnafu { port });
            ensure!(!used[usize::from(port)], SmartPortSnafu { port });
            used[usize::from(port)] = true;
        }
        ensure!(
            (1..=8).contains(&self.solenoid),
            AdiPortSnafu {
                port: self.solenoid
            }
        );
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfig {
    pub period: Duration,
    pub heading: HeadingConfig,
    pub range: RangeConfig,
    pub shooter: ShooterConfig,
    pub bindings: Bindings,
    pub wiring: Wiring,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(20),
            heading: HeadingConfig::default(),
            range: RangeConfig::default(),
            shooter: ShooterConfig::default(),
            bindings: Bindings::default(),
            wiring: Wiring::default(),
        }
    }
}

impl VehicleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(!self.period.is_zero(), PeriodSnafu);
        self.heading.validate()?;
        self.range.validate()?;
        self.wiring.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vehicle_is_valid() {
        assert_eq!(VehicleConfig::default().validate(), Ok(()));
    }

    #[test]
    fn duplicate_port_is_rejected() {
        let mut config = VehicleConfig::default();
        config.wiring.sight = config.wiring.imu;
        assert_eq!(
            config.validate(),
            Err(ConfigError::SmartPort {
                port: config.wiring.imu
            })
        );
    }

    #[test]
    fn empty_drive_group_is_rejected() {
        let mut config = VehicleConfig::default();
        config.wiring.right_drive.clear();
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyGroup {
                group: "right_drive"
            })
        );
    }

    #[test]
    fn adi_port_range() {
        let mut config = VehicleConfig::default();
        config.wiring.solenoid = 9;
        assert_eq!(config.validate(), Err(ConfigError::AdiPort { port: 9 }));
    }
}
