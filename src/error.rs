use snafu::Snafu;

/// Rejected vehicle or controller configuration.
///
/// Every constructor in the control core validates its inputs up front, so a
/// core that was built successfully never has to re-check them per cycle.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    /// The controller's output range is inverted or not finite.
    #[snafu(display("output bounds [{min}, {max}] are not a valid range"))]
    OutputBounds { min: f64, max: f64 },

    /// The at-setpoint tolerance is negative or not finite.
    #[snafu(display("heading tolerance {tolerance} must be a finite, non-negative angle"))]
    Tolerance { tolerance: f64 },

    /// A gain is not finite.
    #[snafu(display("controller gain {name} = {value} is not finite"))]
    Gain { name: &'static str, value: f64 },

    /// The control loop period must be longer than zero.
    #[snafu(display("control period must be non-zero"))]
    Period,

    /// A conditional phase did not name the condition it waits on.
    #[snafu(display("phase {index} waits on a condition with an empty name"))]
    UnnamedCondition { index: usize },

    /// A smart port number is outside 1..=21 or used twice.
    #[snafu(display("smart port {port} is out of range or assigned twice"))]
    SmartPort { port: u8 },

    /// An ADI port number is outside 1..=8.
    #[snafu(display("adi port {port} is out of range"))]
    AdiPort { port: u8 },

    /// A motor group that drives the vehicle has no motors in it.
    #[snafu(display("motor group {group} is empty"))]
    EmptyGroup { group: &'static str },

    /// A range estimator parameter is not finite.
    #[snafu(display("range estimator {name} = {value} is not finite"))]
    RangeParameter { name: &'static str, value: f64 },
}

/// A bearing sample that can't be turned into a distance.
#[derive(Debug, Clone, Copy, PartialEq, Snafu)]
pub enum RangeError {
    /// The sight line is parallel to the floor, so the tangent is (close to) zero.
    #[snafu(display("sight angle {angle_deg} deg is too close to the horizon"))]
    Singularity { angle_deg: f64 },

    /// One of the inputs was NaN or infinite.
    #[snafu(display("range inputs are not finite"))]
    NonFinite,
}
