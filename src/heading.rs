//! Closed-loop heading hold.
//!
//! The controller turns a heading error into a rotation command in
//! `[output_min, output_max]`. Errors are always taken along the shortest
//! way around the circle, see [`wrap_degrees`].

use core::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::{
    error::{ConfigError, GainSnafu, OutputBoundsSnafu, PeriodSnafu, ToleranceSnafu},
    pid::{Pid, PidGains},
    utils::wrap_degrees,
};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeadingConfig {
    pub gains: PidGains,
    pub output_min: f64,
    pub output_max: f64,
    pub tolerance_deg: f64,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            gains: PidGains::new(0.02, 0.0, 0.001),
            output_min: -0.6,
            output_max: 0.6,
            tolerance_deg: 2.0,
        }
    }
}

impl HeadingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.output_min, self.output_max);
        ensure!(
            min.is_finite() && max.is_finite() && min <= max,
            OutputBoundsSnafu { min, max }
        );
        ensure!(
            self.tolerance_deg.is_finite() && self.tolerance_deg >= 0.0,
            ToleranceSnafu {
                tolerance: self.tolerance_deg
            }
        );
        if let Some((name, value)) = self.gains.first_non_finite() {
            return GainSnafu { name, value }.fail();
        }
        Ok(())
    }
}

pub struct HeadingController {
    pid: Pid,
    output_min: f64,
    output_max: f64,
    tolerance_deg: f64,
    dt: f64,
    setpoint_deg: f64,
    measured_deg: Option<f64>,
    enabled: bool,
    output: f64,
}

impl HeadingController {
    pub fn new(config: HeadingConfig, period: Duration) -> Result<Self, ConfigError> {
        config.validate()?;
        ensure!(!period.is_zero(), PeriodSnafu);
        Ok(Self {
            pid: Pid::new(config.gains),
            output_min: config.output_min,
            output_max: config.output_max,
            tolerance_deg: config.tolerance_deg,
            dt: period.as_secs_f64(),
            setpoint_deg: 0.0,
            measured_deg: None,
            enabled: false,
            output: 0.0,
        })
    }

    /// Starts closing the loop. Accumulated integral from an earlier use is
    /// dropped. Calling this while already enabled does nothing.
    pub fn enable(&mut self) {
        if self.enabled {
            return;
        }
        self.enabled = true;
        self.pid.reset();
        self.output = 0.0;
        debug!("heading hold enabled at {:.1} deg", self.setpoint_deg);
    }

    /// Stops closing the loop and zeroes the held output so nothing
    /// downstream can apply a stale correction. The last measurement is
    /// forgotten too.
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.pid.reset();
        self.output = 0.0;
        self.measured_deg = None;
        debug!("heading hold disabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Non-finite setpoints are ignored.
    pub fn set_setpoint(&mut self, setpoint_deg: f64) {
        if setpoint_deg.is_finite() {
            self.setpoint_deg = setpoint_deg;
        }
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint_deg
    }

    /// Runs one control step against a fresh heading measurement.
    ///
    /// Returns 0 without touching any state while disabled. A non-finite
    /// measurement is treated as a missed sample and the previous output is
    /// held.
    pub fn sample(&mut self, measured_deg: f64) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        if !measured_deg.is_finite() {
            return self.output;
        }
        self.measured_deg = Some(measured_deg);
        let error = wrap_degrees(self.setpoint_deg - measured_deg);
        let raw = self.pid.next(error, self.dt);
        self.output = if raw.is_finite() {
            raw.clamp(self.output_min, self.output_max)
        } else {
            0.0
        };
        self.output
    }

    /// Like [`sample`](Self::sample), but `None` (no reading this cycle)
    /// holds the previous output instead of stepping the loop.
    pub fn sample_or_hold(&mut self, measured_deg: Option<f64>) -> f64 {
        match measured_deg {
            Some(m) => self.sample(m),
            None => self.output,
        }
    }

    /// Last output; always 0 while disabled.
    pub fn output(&self) -> f64 {
        self.output
    }

    /// Shortest-path error for the last accepted measurement.
    pub fn error(&self) -> Option<f64> {
        self.measured_deg
            .map(|measured| wrap_degrees(self.setpoint_deg - measured))
    }

    /// False until a sample has been taken since the last enable.
    pub fn at_setpoint(&self) -> bool {
        self.error()
            .is_some_and(|e| libm::fabs(e) <= self.tolerance_deg)
    }

    /// Forgets the last measurement along with the loop history. Used when a
    /// new match phase starts.
    pub fn reset(&mut self) {
        self.disable();
        self.pid.reset();
        self.measured_deg = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(20);

    fn p_only(kp: f64) -> HeadingController {
        let config = HeadingConfig {
            gains: PidGains::new(kp, 0.0, 0.0),
            output_min: -1.0,
            output_max: 1.0,
            tolerance_deg: 2.0,
        };
        HeadingController::new(config, PERIOD).unwrap()
    }

    #[test]
    fn rejects_inverted_bounds() {
        let config = HeadingConfig {
            output_min: 0.5,
            output_max: -0.5,
            ..HeadingConfig::default()
        };
        assert_eq!(
            HeadingController::new(config, PERIOD).err(),
            Some(ConfigError::OutputBounds { min: 0.5, max: -0.5 })
        );
    }

    #[test]
    fn rejects_negative_tolerance() {
        let config = HeadingConfig {
            tolerance_deg: -1.0,
            ..HeadingConfig::default()
        };
        assert!(matches!(
            HeadingController::new(config, PERIOD),
            Err(ConfigError::Tolerance { .. })
        ));
    }

    #[test]
    fn rejects_zero_period() {
        assert!(matches!(
            HeadingController::new(HeadingConfig::default(), Duration::ZERO),
            Err(ConfigError::Period)
        ));
    }

    #[test]
    fn disabled_sample_returns_zero() {
        let mut hc = p_only(0.1);
        hc.set_setpoint(90.0);
        assert_eq!(hc.sample(0.0), 0.0);
        assert_eq!(hc.error(), None);
    }

    #[test]
    fn error_takes_short_way_around() {
        let mut hc = p_only(0.01);
        hc.set_setpoint(170.0);
        hc.enable();
        // 170 - (-170) = 340, which is really -20
        let out = hc.sample(-170.0);
        assert!((out - (-0.2)).abs() < 1e-9, "got {out}");
        assert!((hc.error().unwrap() - (-20.0)).abs() < 1e-9);
    }

    #[test]
    fn half_turn_error_is_positive() {
        let mut hc = p_only(0.001);
        hc.set_setpoint(0.0);
        hc.enable();
        assert!(hc.sample(180.0) > 0.0);
        assert_eq!(hc.error(), Some(180.0));
    }

    #[test]
    fn output_stays_within_bounds() {
        let config = HeadingConfig {
            gains: PidGains::new(5.0, 2.0, 1.0),
            output_min: -0.4,
            output_max: 0.3,
            tolerance_deg: 1.0,
        };
        let mut hc = HeadingController::new(config, PERIOD).unwrap();
        hc.set_setpoint(45.0);
        hc.enable();
        let mut heading = -180.0;
        while heading < 540.0 {
            let out = hc.sample(heading);
            assert!((-0.4..=0.3).contains(&out), "out of range: {out}");
            heading += 13.0;
        }
    }

    #[test]
    fn disable_zeroes_output_and_is_idempotent() {
        let mut hc = p_only(0.1);
        hc.set_setpoint(30.0);
        hc.enable();
        assert!(hc.sample(0.0) > 0.0);

        hc.disable();
        assert_eq!(hc.output(), 0.0);
        let once = (hc.is_enabled(), hc.output(), hc.pid.integral(), hc.pid.prev_error());
        hc.disable();
        let twice = (hc.is_enabled(), hc.output(), hc.pid.integral(), hc.pid.prev_error());
        assert_eq!(once, twice);
        assert_eq!(hc.sample(0.0), 0.0);
    }

    #[test]
    fn disable_forgets_measurement() {
        let mut hc = p_only(0.1);
        hc.set_setpoint(30.0);
        hc.enable();
        hc.sample(29.5);
        assert!(hc.at_setpoint());

        hc.disable();
        assert_eq!(hc.error(), None);
        assert!(!hc.at_setpoint());
        hc.enable();
        assert!(!hc.at_setpoint());
        hc.sample(30.0);
        assert!(hc.at_setpoint());
    }

    #[test]
    fn enable_drops_old_integral() {
        let config = HeadingConfig {
            gains: PidGains::new(0.0, 1.0, 0.0),
            output_min: -10.0,
            output_max: 10.0,
            tolerance_deg: 1.0,
        };
        let mut hc = HeadingController::new(config, PERIOD).unwrap();
        hc.set_setpoint(10.0);
        hc.enable();
        for _ in 0..10 {
            hc.sample(0.0);
        }
        assert!(hc.pid.integral() > 0.0);
        hc.disable();
        hc.enable();
        assert_eq!(hc.pid.integral(), 0.0);
    }

    #[test]
    fn tolerance_reports_but_still_runs() {
        let mut hc = p_only(0.1);
        hc.set_setpoint(10.0);
        hc.enable();
        let out = hc.sample(9.0);
        assert!(hc.at_setpoint());
        assert!(out > 0.0, "controller keeps correcting inside tolerance");
        hc.sample(0.0);
        assert!(!hc.at_setpoint());
    }

    #[test]
    fn missing_sample_holds_output() {
        let mut hc = p_only(0.1);
        hc.set_setpoint(5.0);
        hc.enable();
        let out = hc.sample(0.0);
        assert_eq!(hc.sample_or_hold(None), out);
        assert_eq!(hc.sample(f64::NAN), out);
    }
}
