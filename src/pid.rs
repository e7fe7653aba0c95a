use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Symmetric bound on the accumulated integral; `0.0` disables the bound.
    #[serde(default)]
    pub integral_limit: f64,
    /// Multiplier applied to the integral every step, `1.0` keeps it all.
    #[serde(default = "PidGains::default_decay")]
    pub integral_decay: f64,
}

impl PidGains {
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral_limit: 0.0,
            integral_decay: 1.0,
        }
    }

    fn default_decay() -> f64 {
        1.0
    }

    pub(crate) fn first_non_finite(&self) -> Option<(&'static str, f64)> {
        [
            ("kp", self.kp),
            ("ki", self.ki),
            ("kd", self.kd),
            ("integral_limit", self.integral_limit),
            ("integral_decay", self.integral_decay),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Pid {
    pub gains: PidGains,
    prev_error: Option<f64>,
    integral: f64,
}

impl Pid {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            prev_error: None,
            integral: 0.0,
        }
    }

    pub fn next(&mut self, error: f64, dt: f64) -> f64 {
        let PidGains {
            kp,
            ki,
            kd,
            integral_limit,
            integral_decay,
        } = self.gains;

        self.integral *= integral_decay;
        self.integral += error * dt;
        if integral_limit > 0.0 {
            self.integral = self.integral.clamp(-integral_limit, integral_limit);
        }

        // no derivative kick on the first step after a reset
        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };

        self.prev_error = Some(error);
        (kp * error) + (ki * self.integral) + (kd * derivative)
    }

    pub fn reset(&mut self) {
        self.prev_error = None;
        self.integral = 0.0;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn prev_error(&self) -> Option<f64> {
        self.prev_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_only() {
        let mut pid = Pid::new(PidGains::new(0.5, 0.0, 0.0));
        assert_eq!(pid.next(10.0, 0.02), 5.0);
        assert_eq!(pid.next(-4.0, 0.02), -2.0);
    }

    #[test]
    fn integral_accumulates_and_clamps() {
        let mut gains = PidGains::new(0.0, 1.0, 0.0);
        gains.integral_limit = 0.5;
        let mut pid = Pid::new(gains);
        pid.next(10.0, 0.02);
        assert!((pid.integral() - 0.2).abs() < 1e-12);
        pid.next(10.0, 0.02);
        pid.next(10.0, 0.02);
        assert_eq!(pid.integral(), 0.5);
    }

    #[test]
    fn derivative_skips_first_step() {
        let mut pid = Pid::new(PidGains::new(0.0, 0.0, 1.0));
        assert_eq!(pid.next(3.0, 0.5), 0.0);
        assert_eq!(pid.next(4.0, 0.5), 2.0);
    }

    #[test]
    fn reset_clears_history() {
        let mut pid = Pid::new(PidGains::new(1.0, 1.0, 1.0));
        pid.next(5.0, 0.1);
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.prev_error(), None);
    }
}
