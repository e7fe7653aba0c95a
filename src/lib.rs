//! Tempest: the periodic control core for a competition ground vehicle.
//!
//! Everything here is hardware-agnostic and runs on the host. The robot
//! binary (`src/main.rs`, built with the `robot` feature) owns the devices
//! and feeds a [`ControlCore`](control::ControlCore) once per loop period.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod arbiter;
pub mod config;
pub mod control;
pub mod error;
pub mod heading;
pub mod io;
pub mod pid;
pub mod range;
pub mod routines;
pub mod sequencer;
pub mod shooter;
pub mod telemetry;
pub mod toggle;
pub mod utils;
