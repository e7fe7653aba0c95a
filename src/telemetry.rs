use core::{fmt, time::Duration};

/// A value published under a dashboard key.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value<'a> {
    Number(f64),
    Bool(bool),
    Text(&'a str),
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n:.3}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Fire-and-forget sink for named values. Implementations must not block.
pub trait Telemetry {
    fn publish(&mut self, key: &str, value: Value<'_>);

    /// Skips values that aren't finite so dashboards never see NaN.
    fn number(&mut self, key: &str, value: f64) {
        if value.is_finite() {
            self.publish(key, Value::Number(value));
        }
    }

    fn flag(&mut self, key: &str, value: bool) {
        self.publish(key, Value::Bool(value));
    }

    fn text(&mut self, key: &str, value: &str) {
        self.publish(key, Value::Text(value));
    }
}

/// Forwards values to `inner` at most once per `period`.
///
/// [`begin_cycle`](Self::begin_cycle) is called with the current time before
/// each control cycle. Everything published during an open cycle goes
/// through; the rest is dropped.
pub struct Throttled<T> {
    inner: T,
    period: Duration,
    last: Option<Duration>,
    open: bool,
}

impl<T: Telemetry> Throttled<T> {
    pub fn new(inner: T, period: Duration) -> Self {
        Self {
            inner,
            period,
            last: None,
            open: false,
        }
    }

    /// Returns whether this cycle's values will be forwarded.
    pub fn begin_cycle(&mut self, now: Duration) -> bool {
        self.open = self
            .last
            .is_none_or(|last| now.saturating_sub(last) >= self.period);
        if self.open {
            self.last = Some(now);
        }
        self.open
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Telemetry> Telemetry for Throttled<T> {
    fn publish(&mut self, key: &str, value: Value<'_>) {
        if self.open {
            self.inner.publish(key, value);
        }
    }
}

pub mod keys {
    pub const TOP_RPM: &str = "Top Encoder";
    pub const BOTTOM_RPM: &str = "Bottom Encoder";
    pub const DISTANCE: &str = "Dist:";
    pub const DISTANCE_VALID: &str = "Dist Valid";
    pub const AT_HEADING: &str = "At Heading";
    pub const PHASE: &str = "Phase";
    pub const DRIVE_MODE: &str = "Drive Mode";
    pub const TOP_WHEEL: &str = "Top Wheel";
    pub const BOTTOM_WHEEL: &str = "Bottom Wheel";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Count(usize);

    impl Telemetry for Count {
        fn publish(&mut self, _: &str, _: Value<'_>) {
            self.0 += 1;
        }
    }

    #[test]
    fn non_finite_numbers_are_dropped() {
        let mut sink = Count::default();
        sink.number(keys::DISTANCE, f64::NAN);
        sink.number(keys::DISTANCE, f64::INFINITY);
        assert_eq!(sink.0, 0);
        sink.number(keys::DISTANCE, 3.0);
        sink.flag(keys::AT_HEADING, false);
        assert_eq!(sink.0, 2);
    }

    #[test]
    fn throttled_forwards_one_cycle_per_period() {
        let period = Duration::from_millis(100);
        let mut sink = Throttled::new(Count::default(), period);

        // nothing goes out before the first cycle starts
        sink.flag(keys::AT_HEADING, true);
        assert_eq!(sink.inner().0, 0);

        let mut forwarded = 0;
        for now in (0..1000).step_by(20) {
            if sink.begin_cycle(Duration::from_millis(now)) {
                forwarded += 1;
            }
            sink.number(keys::DISTANCE, 1.0);
            sink.text(keys::PHASE, "idle");
        }
        assert_eq!(forwarded, 10);
        assert_eq!(sink.inner().0, 20);
    }

    #[test]
    fn throttled_waits_a_full_period_after_a_late_cycle() {
        let mut sink = Throttled::new(Count::default(), Duration::from_millis(100));
        assert!(sink.begin_cycle(Duration::from_millis(0)));
        assert!(!sink.begin_cycle(Duration::from_millis(99)));
        assert!(sink.begin_cycle(Duration::from_millis(130)));
        assert!(!sink.begin_cycle(Duration::from_millis(200)));
        assert!(sink.begin_cycle(Duration::from_millis(230)));
        // a clock that steps back never reopens early
        assert!(!sink.begin_cycle(Duration::from_millis(10)));
    }
}
