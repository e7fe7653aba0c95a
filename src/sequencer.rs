//! Declarative autonomous phase tables.
//!
//! A [`PhaseSequencer`] walks a fixed list of [`Phase`]s. Each phase emits
//! one command until its [`Trigger`] is satisfied, then the sequencer moves
//! on and never comes back. Once the table is exhausted it sits in
//! [`PhaseId::Idle`] and emits the idle (default) command.
//!
//! The sequencer only looks at the elapsed time it is handed and at named
//! conditions; it has no notion of buttons or match state. Re-arming a
//! routine is always an explicit [`PhaseSequencer::reset`].

extern crate alloc;
use alloc::{string::String, vec::Vec};
use core::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, UnnamedConditionSnafu};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Ends once the phase has run for this long.
    Timed(Duration),
    /// Ends on the first tick where the named condition holds.
    Conditional(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Phase<C> {
    pub name: String,
    pub trigger: Trigger,
    pub command: C,
}

impl<C> Phase<C> {
    pub fn timed(name: impl Into<String>, duration: Duration, command: C) -> Self {
        Self {
            name: name.into(),
            trigger: Trigger::Timed(duration),
            command,
        }
    }

    pub fn until(name: impl Into<String>, condition: impl Into<String>, command: C) -> Self {
        Self {
            name: name.into(),
            trigger: Trigger::Conditional(condition.into()),
            command,
        }
    }
}

/// Where the next phase's clock starts after a transition.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseClock {
    /// A timed phase hands over at its scheduled deadline, so phase
    /// boundaries don't drift with the tick rate. Conditional phases hand
    /// over at the tick where the condition was seen.
    #[default]
    Scheduled,
    /// Every phase starts at the tick where its predecessor was seen to end.
    Restart,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PhaseId {
    Active(usize),
    Idle,
}

/// External predicates a conditional phase can wait on.
pub trait Conditions {
    fn is_met(&self, name: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Conditions for F {
    fn is_met(&self, name: &str) -> bool {
        self(name)
    }
}

/// No condition is ever met; only timed phases advance.
pub fn no_conditions(_: &str) -> bool {
    false
}

pub struct PhaseSequencer<C> {
    phases: Vec<Phase<C>>,
    clock: PhaseClock,
    idle: C,
    current: usize,
    phase_start: Duration,
    elapsed: Duration,
    // the active phase's command has been handed out at least once
    emitted: bool,
}

impl<C: Default> PhaseSequencer<C> {
    pub fn new(phases: Vec<Phase<C>>, clock: PhaseClock) -> Result<Self, ConfigError> {
        if let Some(index) = phases
            .iter()
            .position(|p| matches!(&p.trigger, Trigger::Conditional(name) if name.is_empty()))
        {
            return UnnamedConditionSnafu { index }.fail();
        }
        Ok(Self {
            phases,
            clock,
            idle: C::default(),
            current: 0,
            phase_start: Duration::ZERO,
            elapsed: Duration::ZERO,
            emitted: false,
        })
    }
}

impl<C> PhaseSequencer<C> {
    /// Back to the first phase with the clock at zero.
    pub fn reset(&mut self) {
        self.current = 0;
        self.phase_start = Duration::ZERO;
        self.elapsed = Duration::ZERO;
        self.emitted = false;
    }

    /// Advances through every phase whose trigger is satisfied at
    /// `elapsed` and returns the phase that is active afterwards together
    /// with its command.
    ///
    /// `elapsed` is measured from the last [`reset`](Self::reset). A value
    /// earlier than one already seen is treated as the latest one, so time
    /// never runs backwards inside the sequencer.
    ///
    /// A conditional phase is only tested once its command has been returned
    /// by an earlier tick, which gives the caller one cycle to act on it
    /// (e.g. to move a setpoint the condition depends on).
    pub fn tick(&mut self, elapsed: Duration, conditions: &impl Conditions) -> (PhaseId, &C) {
        let elapsed = elapsed.max(self.elapsed);
        self.elapsed = elapsed;

        while let Some(phase) = self.phases.get(self.current) {
            let next_start = match &phase.trigger {
                Trigger::Timed(duration) => {
                    let deadline = self.phase_start.saturating_add(*duration);
                    if elapsed < deadline {
                        break;
                    }
                    match self.clock {
                        PhaseClock::Scheduled => deadline,
                        PhaseClock::Restart => elapsed,
                    }
                }
                Trigger::Conditional(name) => {
                    if !self.emitted || !conditions.is_met(name) {
                        break;
                    }
                    elapsed
                }
            };
            info!(
                "phase {} '{}' done at {} ms",
                self.current,
                phase.name,
                elapsed.as_millis()
            );
            self.current += 1;
            self.phase_start = next_start;
            self.emitted = false;
        }

        self.emitted = true;
        (self.current_phase(), self.command())
    }

    pub fn current_phase(&self) -> PhaseId {
        if self.current < self.phases.len() {
            PhaseId::Active(self.current)
        } else {
            PhaseId::Idle
        }
    }

    pub fn phase_name(&self) -> &str {
        self.phases
            .get(self.current)
            .map_or("idle", |p| p.name.as_str())
    }

    pub fn command(&self) -> &C {
        self.phases
            .get(self.current)
            .map_or(&self.idle, |p| &p.command)
    }

    /// Deadline of the active phase if it is timed, relative to the last reset.
    pub fn phase_deadline(&self) -> Option<Duration> {
        match self.phases.get(self.current)?.trigger {
            Trigger::Timed(duration) => Some(self.phase_start.saturating_add(duration)),
            Trigger::Conditional(_) => None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.phases.len()
    }
}
