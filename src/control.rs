//! The per-cycle control core shared by every vehicle.
//!
//! The vehicle program calls one of the cycle entry points once per loop
//! period with a fresh [`ControlInputs`] snapshot. Each cycle goes
//! input -> toggles / sequencer -> heading hold -> arbitration -> actuator
//! write, and publishes telemetry on the way out.

use core::time::Duration;

use log::{info, warn};

use crate::{
    arbiter::{self, DriveCommand, DriveMode},
    config::VehicleConfig,
    error::ConfigError,
    heading::HeadingController,
    io::{Actuators, ControlInputs},
    range::{RangeEstimate, RangeEstimator},
    routines::{AutonCommand, Routine},
    sequencer::{Conditions, PhaseId, PhaseSequencer},
    shooter::{ShooterWheel, wheel_rpm},
    telemetry::{Telemetry, keys},
    toggle::{Mode, Toggle},
    utils::wrap_degrees,
};

/// Conditions the core answers itself before asking the caller.
pub mod conditions {
    /// Heading hold is engaged and inside its tolerance.
    pub const ALIGNED: &str = "aligned";
    /// The sight reports a bearing to the target this cycle.
    pub const TARGET_VISIBLE: &str = "target_visible";
}

pub struct ControlCore {
    assist: Toggle,
    solenoid: Toggle,
    top: ShooterWheel,
    bottom: ShooterWheel,
    heading: HeadingController,
    range: RangeEstimator,
    velocity_to_rpm: f64,
    routine: Option<PhaseSequencer<AutonCommand>>,
    drive_mode: DriveMode,
    last_range: Option<RangeEstimate>,
    range_ok: bool,
}

impl ControlCore {
    pub fn new(config: &VehicleConfig, routine: Option<Routine>) -> Result<Self, ConfigError> {
        config.validate()?;
        let routine = routine.map(Routine::into_sequencer).transpose()?;
        Ok(Self {
            assist: Toggle::new(),
            solenoid: Toggle::new(),
            top: ShooterWheel::new(config.shooter.speed),
            bottom: ShooterWheel::new(config.shooter.speed),
            heading: HeadingController::new(config.heading, config.period)?,
            range: RangeEstimator::new(config.range)?,
            velocity_to_rpm: config.shooter.velocity_to_rpm,
            routine,
            drive_mode: DriveMode::Manual,
            last_range: None,
            range_ok: true,
        })
    }

    pub fn on_autonomous_enter(&mut self) {
        info!("autonomous start");
        self.reset_operator_state();
        if let Some(seq) = self.routine.as_mut() {
            seq.reset();
        }
    }

    pub fn on_teleop_enter(&mut self) {
        info!("driver control start");
        self.reset_operator_state();
        if let Some(seq) = self.routine.as_mut() {
            seq.reset();
        }
    }

    /// Writes the zero command to everything. Called while the vehicle is
    /// disabled and whenever a cycle can't run.
    pub fn on_disabled(&mut self, actuators: &mut impl Actuators) {
        self.reset_operator_state();
        actuators.drive(DriveCommand::ZERO);
        actuators.shooter(0.0, 0.0);
        actuators.solenoid(false);
    }

    fn reset_operator_state(&mut self) {
        self.heading.reset();
        self.assist.set(Mode::Off);
        self.solenoid.set(Mode::Off);
        self.top.stop();
        self.bottom.stop();
        self.drive_mode = DriveMode::Manual;
    }

    pub fn teleop_cycle(
        &mut self,
        inputs: &ControlInputs,
        actuators: &mut impl Actuators,
        telemetry: &mut impl Telemetry,
    ) -> DriveCommand {
        let buttons = inputs.buttons;

        if self.assist.update(buttons.assist).is_on() {
            if !self.heading.is_enabled() {
                self.engage_heading_hold(inputs);
            }
        } else {
            self.heading.disable();
        }
        let assisted = self.heading.sample_or_hold(inputs.heading_deg);
        self.drive_mode = if self.heading.is_enabled() {
            DriveMode::Assisted
        } else {
            DriveMode::Manual
        };
        let drive = arbiter::resolve(self.drive_mode, inputs.rotation, assisted, inputs.forward);

        let extended = self.solenoid.update(buttons.solenoid).is_on();
        let top = self.top.update(buttons.top_direction, buttons.top_stop);
        let bottom = self.bottom.update(buttons.bottom_direction, buttons.bottom_stop);

        actuators.drive(drive);
        actuators.shooter(top, bottom);
        actuators.solenoid(extended);

        telemetry.text(keys::TOP_WHEEL, self.top.state().name());
        telemetry.text(keys::BOTTOM_WHEEL, self.bottom.state().name());
        self.publish(inputs, telemetry, "teleop");
        drive
    }

    // heading hold needs a heading to hold; without one the toggle stays
    // latched and we try again next cycle
    fn engage_heading_hold(&mut self, inputs: &ControlInputs) {
        let Some(heading) = inputs.heading_deg.filter(|h| h.is_finite()) else {
            return;
        };
        let bearing = inputs
            .target_bearing_deg
            .filter(|b| b.is_finite())
            .unwrap_or(0.0);
        self.heading.set_setpoint(wrap_degrees(heading + bearing));
        self.heading.enable();
        info!(
            "heading hold engaged at {:.1} deg",
            self.heading.setpoint()
        );
    }

    /// Runs the selected routine at `elapsed` since autonomous started.
    ///
    /// Besides [`conditions::ALIGNED`] and [`conditions::TARGET_VISIBLE`],
    /// condition names are looked up in `extra`.
    pub fn autonomous_cycle(
        &mut self,
        elapsed: Duration,
        inputs: &ControlInputs,
        extra: &impl Conditions,
        actuators: &mut impl Actuators,
        telemetry: &mut impl Telemetry,
    ) -> DriveCommand {
        let Some(seq) = self.routine.as_mut() else {
            self.on_disabled(actuators);
            self.publish(inputs, telemetry, "none");
            return DriveCommand::ZERO;
        };

        let heading = &self.heading;
        let target_visible = inputs.target_bearing_deg.is_some();
        let conds = |name: &str| match name {
            conditions::ALIGNED => heading.is_enabled() && heading.at_setpoint(),
            conditions::TARGET_VISIBLE => target_visible,
            other => extra.is_met(other),
        };
        let command = *seq.tick(elapsed, &conds).1;

        let assisted = match command.heading {
            Some(target) => {
                self.heading.set_setpoint(wrap_degrees(target));
                self.heading.enable();
                self.heading.sample_or_hold(inputs.heading_deg)
            }
            None => {
                self.heading.disable();
                0.0
            }
        };
        self.drive_mode = if self.heading.is_enabled() {
            DriveMode::Assisted
        } else {
            DriveMode::Manual
        };
        let drive = arbiter::resolve(self.drive_mode, command.rotation, assisted, command.forward);

        actuators.drive(drive);
        actuators.shooter(
            arbiter::sanitize(command.top),
            arbiter::sanitize(command.bottom),
        );
        actuators.solenoid(command.solenoid);

        let phase_name = self
            .routine
            .as_ref()
            .map_or("none", PhaseSequencer::phase_name);
        Self::publish_state(&self.heading, self.drive_mode, phase_name, telemetry);
        self.publish_sensors(inputs, telemetry);
        drive
    }

    fn publish(&mut self, inputs: &ControlInputs, telemetry: &mut impl Telemetry, phase: &str) {
        Self::publish_state(&self.heading, self.drive_mode, phase, telemetry);
        self.publish_sensors(inputs, telemetry);
    }

    fn publish_state(
        heading: &HeadingController,
        mode: DriveMode,
        phase: &str,
        telemetry: &mut impl Telemetry,
    ) {
        telemetry.flag(keys::AT_HEADING, heading.is_enabled() && heading.at_setpoint());
        telemetry.text(keys::DRIVE_MODE, mode.name());
        telemetry.text(keys::PHASE, phase);
    }

    fn publish_sensors(&mut self, inputs: &ControlInputs, telemetry: &mut impl Telemetry) {
        self.last_range = inputs
            .target_elevation_deg
            .map(|angle| self.range.estimate(angle));
        match self.last_range.map(|est| est.distance) {
            Some(Ok(distance)) => {
                self.range_ok = true;
                telemetry.number(keys::DISTANCE, distance);
                telemetry.flag(keys::DISTANCE_VALID, true);
            }
            Some(Err(e)) => {
                if self.range_ok {
                    warn!("range estimate rejected: {e}");
                }
                self.range_ok = false;
                telemetry.flag(keys::DISTANCE_VALID, false);
            }
            None => telemetry.flag(keys::DISTANCE_VALID, false),
        }

        let rpm = |v: Option<f64>| v.and_then(|v| wheel_rpm(v, self.velocity_to_rpm));
        if let Some(top) = rpm(inputs.top_wheel_velocity) {
            telemetry.number(keys::TOP_RPM, top);
        }
        if let Some(bottom) = rpm(inputs.bottom_wheel_velocity) {
            telemetry.number(keys::BOTTOM_RPM, bottom);
        }
    }

    pub fn drive_mode(&self) -> DriveMode {
        self.drive_mode
    }

    pub fn heading(&self) -> &HeadingController {
        &self.heading
    }

    pub fn last_range(&self) -> Option<RangeEstimate> {
        self.last_range
    }

    pub fn phase(&self) -> Option<PhaseId> {
        self.routine.as_ref().map(PhaseSequencer::current_phase)
    }

    pub fn solenoid_extended(&self) -> bool {
        self.solenoid.is_on()
    }
}
