//! What the control core reads and writes each cycle.
//!
//! The core never touches devices. The vehicle program polls its hardware
//! into a [`ControlInputs`] snapshot, hands it to the core, and implements
//! [`Actuators`] to carry the resulting commands back out.

use crate::arbiter::DriveCommand;

/// Button levels for this cycle, already mapped from the physical
/// controller through the vehicle's bindings.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Buttons {
    pub assist: bool,
    pub solenoid: bool,
    pub top_direction: bool,
    pub top_stop: bool,
    pub bottom_direction: bool,
    pub bottom_stop: bool,
}

/// One cycle of sensor and operator input.
///
/// Sensor fields are `None` when the read failed or the device had nothing
/// new; the core then holds its previous output.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ControlInputs {
    pub forward: f64,
    pub rotation: f64,
    pub buttons: Buttons,
    /// Vehicle heading from the inertial sensor, degrees.
    pub heading_deg: Option<f64>,
    /// Horizontal angle from the vehicle's nose to the target, degrees.
    pub target_bearing_deg: Option<f64>,
    /// Elevation angle the target is sighted at, degrees.
    pub target_elevation_deg: Option<f64>,
    /// Raw shooter wheel velocities in sensor units.
    pub top_wheel_velocity: Option<f64>,
    pub bottom_wheel_velocity: Option<f64>,
}

pub trait Actuators {
    fn drive(&mut self, command: DriveCommand);

    /// Shooter wheel group powers in `[-1, 1]`.
    fn shooter(&mut self, top: f64, bottom: f64);

    fn solenoid(&mut self, extended: bool);
}
