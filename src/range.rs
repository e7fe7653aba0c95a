//! Distance to a target from the elevation angle it is sighted at.
//!
//! With the sight mounted `reference_height` below the target, the floor
//! distance is `reference_height / tan(angle + offset)`. A sight line close to
//! parallel with the floor has no finite answer, and that case is reported as
//! [`RangeError::Singularity`] instead of being nudged by an epsilon.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RangeError, RangeParameterSnafu};

/// `|tan|` below this is treated as a horizontal sight line.
pub const TAN_EPSILON: f64 = 1e-6;

pub fn estimate(
    angle_deg: f64,
    known_offset_deg: f64,
    reference_height: f64,
) -> Result<f64, RangeError> {
    if !(angle_deg.is_finite() && known_offset_deg.is_finite() && reference_height.is_finite()) {
        return Err(RangeError::NonFinite);
    }
    let total = angle_deg + known_offset_deg;
    let tan = libm::tan(total.to_radians());
    if libm::fabs(tan) < TAN_EPSILON {
        return Err(RangeError::Singularity { angle_deg: total });
    }
    let distance = reference_height / tan;
    // still possible for a huge height over a tiny tangent
    if distance.is_finite() {
        Ok(distance)
    } else {
        Err(RangeError::NonFinite)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Mounting angle of the sight, added to every sample.
    pub offset_deg: f64,
    /// Height of the target above the sight.
    pub reference_height: f64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            offset_deg: 0.0,
            reference_height: 12.5,
        }
    }
}

impl RangeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("offset_deg", self.offset_deg),
            ("reference_height", self.reference_height),
        ] {
            if !value.is_finite() {
                return RangeParameterSnafu { name, value }.fail();
            }
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RangeEstimate {
    pub angle_deg: f64,
    pub distance: Result<f64, RangeError>,
}

impl RangeEstimate {
    pub fn is_valid(&self) -> bool {
        self.distance.is_ok()
    }
}

#[derive(Copy, Clone, Debug)]
pub struct RangeEstimator {
    config: RangeConfig,
}

impl RangeEstimator {
    pub fn new(config: RangeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn estimate(&self, angle_deg: f64) -> RangeEstimate {
        RangeEstimate {
            angle_deg,
            distance: estimate(
                angle_deg,
                self.config.offset_deg,
                self.config.reference_height,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forty_five_degrees_is_the_height() {
        let d = estimate(45.0, 0.0, 12.5).unwrap();
        assert!((d - 12.5).abs() < 1e-9, "got {d}");
    }

    #[test]
    fn offset_is_added_to_the_sample() {
        let d = estimate(15.0, 30.0, 12.5).unwrap();
        assert!((d - 12.5).abs() < 1e-9);
        let d = estimate(30.0, 0.0, 10.0).unwrap();
        assert!((d - 10.0 * 3f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn horizon_is_a_singularity() {
        for angle in [0.0, 1e-9, -1e-9, 180.0, -180.0] {
            assert!(
                matches!(estimate(angle, 0.0, 12.5), Err(RangeError::Singularity { .. })),
                "angle {angle}"
            );
        }
        // approaching from above never produces NaN or infinity
        let mut angle = 1.0;
        while angle > 1e-12 {
            match estimate(angle, 0.0, 12.5) {
                Ok(d) => assert!(d.is_finite()),
                Err(e) => assert!(matches!(e, RangeError::Singularity { .. })),
            }
            angle /= 2.0;
        }
    }

    #[test]
    fn non_finite_inputs_are_rejected() {
        assert_eq!(estimate(f64::NAN, 0.0, 1.0), Err(RangeError::NonFinite));
        assert_eq!(estimate(10.0, f64::INFINITY, 1.0), Err(RangeError::NonFinite));
        assert_eq!(estimate(10.0, 0.0, f64::NEG_INFINITY), Err(RangeError::NonFinite));
    }

    #[test]
    fn estimator_uses_config() {
        let estimator = RangeEstimator::new(RangeConfig {
            offset_deg: 5.0,
            reference_height: 20.0,
        })
        .unwrap();
        let est = estimator.estimate(40.0);
        assert_eq!(est.angle_deg, 40.0);
        assert!((est.distance.unwrap() - 20.0).abs() < 1e-9);
        assert!(!estimator.estimate(-5.0).is_valid());
    }

    #[test]
    fn config_rejects_nan_height() {
        let config = RangeConfig {
            offset_deg: 0.0,
            reference_height: f64::NAN,
        };
        assert!(matches!(
            RangeEstimator::new(config),
            Err(ConfigError::RangeParameter { name: "reference_height", .. })
        ));
    }
}
