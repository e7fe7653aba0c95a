use serde::{Deserialize, Serialize};

use crate::toggle::{Edge, Toggle};

/// Native velocity units of a 4096-count encoder reported per 100 ms.
pub const NATIVE_TO_RPM: f64 = 600.0 / 4096.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WheelState {
    Stopped,
    Forward,
    Reverse,
}

impl WheelState {
    pub fn name(self) -> &'static str {
        match self {
            WheelState::Stopped => "stopped",
            WheelState::Forward => "forward",
            WheelState::Reverse => "reverse",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShooterConfig {
    /// Power magnitude written while a wheel group spins, in `[0, 1]`.
    pub speed: f64,
    /// Multiplier from the sensor's velocity units to RPM.
    pub velocity_to_rpm: f64,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            speed: 0.1,
            velocity_to_rpm: NATIVE_TO_RPM,
        }
    }
}

/// One shooter wheel group: a direction toggle plus a stop button.
///
/// The group starts stopped. Every press of the direction button flips
/// between forward and reverse and (re)starts the wheel; a stop press idles
/// it until the direction button is pressed again.
#[derive(Copy, Clone, Debug)]
pub struct ShooterWheel {
    direction: Toggle,
    stop: Edge,
    stopped: bool,
    speed: f64,
}

impl ShooterWheel {
    pub fn new(speed: f64) -> Self {
        Self {
            direction: Toggle::new(),
            stop: Edge::new(),
            stopped: true,
            speed: if speed.is_finite() {
                libm::fabs(speed).min(1.0)
            } else {
                0.0
            },
        }
    }

    /// Returns the power for this cycle.
    pub fn update(&mut self, direction_level: bool, stop_level: bool) -> f64 {
        let before = self.direction.mode();
        if self.direction.update(direction_level) != before {
            self.stopped = false;
        }
        if self.stop.rising(stop_level) {
            self.stopped = true;
        }
        self.power()
    }

    pub fn state(&self) -> WheelState {
        if self.stopped {
            WheelState::Stopped
        } else if self.direction.is_on() {
            WheelState::Forward
        } else {
            WheelState::Reverse
        }
    }

    pub fn power(&self) -> f64 {
        match self.state() {
            WheelState::Stopped => 0.0,
            WheelState::Forward => self.speed,
            WheelState::Reverse => -self.speed,
        }
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Converts a raw wheel velocity into unsigned RPM for telemetry.
pub fn wheel_rpm(raw_velocity: f64, velocity_to_rpm: f64) -> Option<f64> {
    let rpm = libm::fabs(raw_velocity * velocity_to_rpm);
    rpm.is_finite().then_some(rpm)
}
