//! Picks the rotation source for the drive every cycle.

use crate::toggle::Mode;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DriveMode {
    /// Rotation comes straight from the operator's stick.
    #[default]
    Manual,
    /// Rotation comes from the heading controller, which the caller must
    /// have enabled.
    Assisted,
}

impl DriveMode {
    pub fn name(self) -> &'static str {
        match self {
            DriveMode::Manual => "manual",
            DriveMode::Assisted => "assisted",
        }
    }
}

impl From<Mode> for DriveMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::On => DriveMode::Assisted,
            Mode::Off => DriveMode::Manual,
        }
    }
}

/// Final arcade command, both axes in `[-1, 1]`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DriveCommand {
    pub forward: f64,
    pub rotation: f64,
}

impl DriveCommand {
    pub const ZERO: Self = Self {
        forward: 0.0,
        rotation: 0.0,
    };

    /// Clamps both axes into `[-1, 1]`; a NaN or infinite axis becomes 0.
    pub fn new(forward: f64, rotation: f64) -> Self {
        Self {
            forward: sanitize(forward),
            rotation: sanitize(rotation),
        }
    }

    /// Left/right side powers, scaled down together so neither side
    /// saturates and the turn ratio is kept.
    pub fn tank(&self) -> (f64, f64) {
        let left = self.forward + self.rotation;
        let right = self.forward - self.rotation;
        let peak = libm::fmax(libm::fabs(left), libm::fabs(right));
        if peak > 1.0 {
            (left / peak, right / peak)
        } else {
            (left, right)
        }
    }
}

pub(crate) fn sanitize(axis: f64) -> f64 {
    if axis.is_finite() {
        axis.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Combines the candidate rotation sources into the command written to the
/// drive. `forward` always passes through.
pub fn resolve(
    mode: DriveMode,
    manual_rotation: f64,
    assisted_rotation: f64,
    forward: f64,
) -> DriveCommand {
    let rotation = match mode {
        DriveMode::Manual => manual_rotation,
        DriveMode::Assisted => assisted_rotation,
    };
    DriveCommand::new(forward, rotation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_uses_operator_rotation() {
        for assisted in [-1.0, 0.0, 0.7, f64::NAN] {
            assert_eq!(
                resolve(DriveMode::Manual, 0.4, assisted, 0.2),
                DriveCommand {
                    forward: 0.2,
                    rotation: 0.4
                }
            );
        }
    }

    #[test]
    fn assisted_uses_controller_rotation() {
        for manual in [-1.0, 0.0, 0.9] {
            assert_eq!(
                resolve(DriveMode::Assisted, manual, -0.3, 0.2),
                DriveCommand {
                    forward: 0.2,
                    rotation: -0.3
                }
            );
        }
    }

    #[test]
    fn out_of_range_inputs_are_made_safe() {
        let cmd = resolve(DriveMode::Manual, 3.0, 0.0, f64::INFINITY);
        assert_eq!(cmd, DriveCommand::new(0.0, 1.0));
        let cmd = resolve(DriveMode::Assisted, 0.0, f64::NAN, -1.5);
        assert_eq!(cmd, DriveCommand::new(-1.0, 0.0));
    }

    #[test]
    fn tank_desaturates() {
        let (l, r) = DriveCommand::new(1.0, 0.5).tank();
        assert!((l - 1.0).abs() < 1e-12);
        assert!((r - 1.0 / 3.0).abs() < 1e-12);
        let (l, r) = DriveCommand::new(0.2, 0.1).tank();
        assert!((l - 0.3).abs() < 1e-12);
        assert!((r - 0.1).abs() < 1e-12);
    }

    #[test]
    fn toggle_mode_maps_to_drive_mode() {
        assert_eq!(DriveMode::from(Mode::On), DriveMode::Assisted);
        assert_eq!(DriveMode::from(Mode::Off), DriveMode::Manual);
    }
}
