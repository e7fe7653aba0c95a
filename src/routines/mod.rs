extern crate alloc;
use alloc::{string::String, vec::Vec};
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    sequencer::{Phase, PhaseClock, PhaseSequencer},
};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct IRCommand {
    forward: f64,
    rotation: f64,
    heading: Option<f64>,
    top: f64,
    bottom: f64,
    solenoid: bool,
}
#[derive(Serialize, Deserialize, Debug, Clone)]
enum IRTrigger {
    Timed(u64),
    Until(String),
}
#[derive(Serialize, Deserialize, Debug, Clone)]
struct IRPhase {
    name: String,
    trigger: IRTrigger,
    command: IRCommand,
}
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
enum IRClock {
    Scheduled,
    Restart,
}
#[derive(Serialize, Deserialize, Debug, Clone)]
struct IRRoutine {
    name: String,
    clock: IRClock,
    phases: Vec<IRPhase>,
}

include!(concat!(env!("OUT_DIR"), "/routines_index.rs"));

/// What one autonomous phase asks of the vehicle.
///
/// With `heading` set the drive turns under heading hold toward that
/// setpoint and `rotation` is ignored.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AutonCommand {
    pub forward: f64,
    pub rotation: f64,
    pub heading: Option<f64>,
    pub top: f64,
    pub bottom: f64,
    pub solenoid: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Routine {
    pub name: String,
    pub clock: PhaseClock,
    pub phases: Vec<Phase<AutonCommand>>,
}

impl Routine {
    pub fn into_sequencer(self) -> Result<PhaseSequencer<AutonCommand>, ConfigError> {
        PhaseSequencer::new(self.phases, self.clock)
    }
}

fn map_command(c: IRCommand) -> AutonCommand {
    AutonCommand {
        forward: c.forward,
        rotation: c.rotation,
        heading: c.heading,
        top: c.top,
        bottom: c.bottom,
        solenoid: c.solenoid,
    }
}

fn map_phase(p: IRPhase) -> Phase<AutonCommand> {
    let command = map_command(p.command);
    match p.trigger {
        IRTrigger::Timed(ms) => Phase::timed(p.name, Duration::from_millis(ms), command),
        IRTrigger::Until(condition) => Phase::until(p.name, condition, command),
    }
}

fn map_routine(ir: IRRoutine) -> Routine {
    Routine {
        name: ir.name,
        clock: match ir.clock {
            IRClock::Scheduled => PhaseClock::Scheduled,
            IRClock::Restart => PhaseClock::Restart,
        },
        phases: ir.phases.into_iter().map(map_phase).collect(),
    }
}

/// Every routine embedded at build time, in file name order. Blobs that
/// fail to decode are skipped.
pub fn load_all() -> Vec<Routine> {
    let mut out = Vec::new();
    for (name, bytes) in ROUTINE_BLOBS {
        match postcard::from_bytes::<IRRoutine>(bytes) {
            Ok(ir) => out.push(map_routine(ir)),
            Err(e) => log::warn!("routine {name} failed to decode: {e}"),
        }
    }
    out
}

pub fn list_names() -> Vec<String> {
    ROUTINE_BLOBS
        .iter()
        .map(|(name, _)| String::from(*name))
        .collect()
}

pub fn find(name: &str) -> Option<Routine> {
    load_all().into_iter().find(|r| r.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::Trigger;

    #[test]
    fn embedded_routines_decode() {
        let names = list_names();
        let routines = load_all();
        assert_eq!(routines.len(), names.len());
        assert!(names.iter().any(|n| n == "shoot_from_line"));
        assert!(names.iter().any(|n| n == "taxi"));
    }

    #[test]
    fn shoot_from_line_table() {
        let routine = find("shoot_from_line").unwrap();
        assert_eq!(routine.clock, PhaseClock::Scheduled);
        let names: Vec<&str> = routine.phases.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["leave_line", "face_goal", "spin_up", "fire", "retract"]);

        let leave = &routine.phases[0];
        assert_eq!(leave.trigger, Trigger::Timed(Duration::from_millis(1500)));
        assert_eq!(leave.command.forward, -0.5);
        assert_eq!(leave.command.heading, None);

        let face = &routine.phases[1];
        assert_eq!(face.trigger, Trigger::Conditional(String::from("aligned")));
        assert_eq!(face.command.heading, Some(30.0));

        let fire = &routine.phases[3];
        assert!(fire.command.solenoid);
        assert_eq!((fire.command.top, fire.command.bottom), (0.8, 0.8));
    }

    #[test]
    fn taxi_uses_restart_clock() {
        let routine = find("TAXI").unwrap();
        assert_eq!(routine.clock, PhaseClock::Restart);
        assert!(routine.into_sequencer().is_ok());
    }
}
