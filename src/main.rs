#![no_main]
#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::time::Duration;

use log::{LevelFilter, info, warn};
use tempest::{
    arbiter::DriveCommand,
    config::{ButtonId, MotorPort, VehicleConfig},
    control::ControlCore,
    io::{Actuators, Buttons, ControlInputs},
    routines,
    sequencer::no_conditions,
    telemetry::{Telemetry, Throttled, Value},
};
use vexide::{
    devices::{controller::ControllerState, smart::imu::InertialSensor},
    prelude::*,
    time::Instant,
};

mod logger;

const ROUTINE: &str = "shoot_from_line";
const MAX_VOLTS: f64 = 12.0;
const DIAGNOSTICS_PERIOD: Duration = Duration::from_millis(100);

/// Everything the control core writes to.
struct Outputs {
    left: Vec<Motor>,
    right: Vec<Motor>,
    top: Vec<Motor>,
    bottom: Vec<Motor>,
    solenoid: AdiDigitalOut,
}

impl Actuators for Outputs {
    fn drive(&mut self, command: DriveCommand) {
        let (left, right) = command.tank();
        for m in self.left.iter_mut() {
            let _ = m.set_voltage(left * MAX_VOLTS);
        }
        for m in self.right.iter_mut() {
            let _ = m.set_voltage(right * MAX_VOLTS);
        }
    }

    fn shooter(&mut self, top: f64, bottom: f64) {
        for m in self.top.iter_mut() {
            let _ = m.set_voltage(top * MAX_VOLTS);
        }
        for m in self.bottom.iter_mut() {
            let _ = m.set_voltage(bottom * MAX_VOLTS);
        }
    }

    fn solenoid(&mut self, extended: bool) {
        let _ = if extended {
            self.solenoid.set_high()
        } else {
            self.solenoid.set_low()
        };
    }
}

struct ConsoleTelemetry;

impl Telemetry for ConsoleTelemetry {
    fn publish(&mut self, key: &str, value: Value<'_>) {
        info!("{key} {value}");
    }
}

pub struct Robot {
    config: VehicleConfig,
    core: ControlCore,
    controller: Controller,
    imu: InertialSensor,
    sight: RotationSensor,
    outputs: Outputs,
    telemetry: Throttled<ConsoleTelemetry>,
    started: Instant,
}

fn motor_group(peripherals: &mut DynamicPeripherals, ports: &[MotorPort]) -> Vec<Motor> {
    ports
        .iter()
        .map(|m| {
            let direction = if m.reversed {
                Direction::Reverse
            } else {
                Direction::Forward
            };
            Motor::new(
                peripherals.take_smart_port(m.port).expect("motor port"),
                Gearset::Blue,
                direction,
            )
        })
        .collect()
}

fn is_pressed(state: &ControllerState, button: ButtonId) -> bool {
    match button {
        ButtonId::A => state.button_a.is_pressed(),
        ButtonId::B => state.button_b.is_pressed(),
        ButtonId::X => state.button_x.is_pressed(),
        ButtonId::Y => state.button_y.is_pressed(),
        ButtonId::Up => state.button_up.is_pressed(),
        ButtonId::Down => state.button_down.is_pressed(),
        ButtonId::Left => state.button_left.is_pressed(),
        ButtonId::Right => state.button_right.is_pressed(),
        ButtonId::L1 => state.button_l1.is_pressed(),
        ButtonId::L2 => state.button_l2.is_pressed(),
        ButtonId::R1 => state.button_r1.is_pressed(),
        ButtonId::R2 => state.button_r2.is_pressed(),
    }
}

fn group_velocity(motors: &[Motor]) -> Option<f64> {
    let readings: Vec<f64> = motors
        .iter()
        .filter_map(|m| m.velocity().ok())
        .map(|v| v as f64)
        .collect();
    if readings.is_empty() {
        return None;
    }
    Some(readings.iter().sum::<f64>() / readings.len() as f64)
}

impl Robot {
    async fn new(peripherals: &mut DynamicPeripherals, config: VehicleConfig) -> Self {
        let routine = routines::find(ROUTINE);
        if routine.is_none() {
            warn!("routine {ROUTINE} not found, autonomous will hold still");
        }
        let core = match ControlCore::new(&config, routine) {
            Ok(core) => core,
            Err(e) => panic!("vehicle config rejected: {e}"),
        };

        let wiring = &config.wiring;
        let outputs = Outputs {
            left: motor_group(peripherals, &wiring.left_drive),
            right: motor_group(peripherals, &wiring.right_drive),
            top: motor_group(peripherals, &wiring.top_shooter),
            bottom: motor_group(peripherals, &wiring.bottom_shooter),
            solenoid: AdiDigitalOut::new(
                peripherals
                    .take_adi_port(wiring.solenoid)
                    .expect("solenoid port"),
            ),
        };
        let mut imu = InertialSensor::new(peripherals.take_smart_port(wiring.imu).expect("imu port"));
        let sight = RotationSensor::new(
            peripherals.take_smart_port(wiring.sight).expect("sight port"),
            Direction::Forward,
        );
        let controller = peripherals
            .take_primary_controller()
            .expect("primary controller");

        if let Err(e) = imu.calibrate().await {
            warn!("IMU calibration failed: {e:?}");
        }
        let _ = imu.reset_heading();

        Robot {
            config,
            core,
            controller,
            imu,
            sight,
            outputs,
            telemetry: Throttled::new(ConsoleTelemetry, DIAGNOSTICS_PERIOD),
            started: Instant::now(),
        }
    }

    fn read_inputs(&self) -> ControlInputs {
        let state = self.controller.state().unwrap_or_default();
        let b = self.config.bindings;
        ControlInputs {
            forward: state.left_stick.y(),
            rotation: state.right_stick.x(),
            buttons: Buttons {
                assist: is_pressed(&state, b.assist),
                solenoid: is_pressed(&state, b.solenoid),
                top_direction: is_pressed(&state, b.top_direction),
                top_stop: is_pressed(&state, b.top_stop),
                bottom_direction: is_pressed(&state, b.bottom_direction),
                bottom_stop: is_pressed(&state, b.bottom_stop),
            },
            heading_deg: self.imu.heading().ok(),
            // no camera on this vehicle, assist holds the heading it engaged at
            target_bearing_deg: None,
            target_elevation_deg: self.sight.position().ok().map(|p| p.as_degrees()),
            top_wheel_velocity: group_velocity(&self.outputs.top),
            bottom_wheel_velocity: group_velocity(&self.outputs.bottom),
        }
    }
}

impl Compete for Robot {
    async fn autonomous(&mut self) {
        self.core.on_autonomous_enter();
        let start = Instant::now();
        loop {
            let inputs = self.read_inputs();
            self.telemetry.begin_cycle(self.started.elapsed());
            self.core.autonomous_cycle(
                start.elapsed(),
                &inputs,
                &no_conditions,
                &mut self.outputs,
                &mut self.telemetry,
            );
            sleep(self.config.period).await;
        }
    }

    async fn driver(&mut self) {
        self.core.on_teleop_enter();
        loop {
            let inputs = self.read_inputs();
            self.telemetry.begin_cycle(self.started.elapsed());
            self.core
                .teleop_cycle(&inputs, &mut self.outputs, &mut self.telemetry);
            sleep(self.config.period).await;
        }
    }

    async fn disabled(&mut self) {
        self.core.on_disabled(&mut self.outputs);
        loop {
            sleep(Duration::from_millis(50)).await;
        }
    }
}

#[vexide::main]
async fn main(peripherals: Peripherals) {
    let _ = logger::init(LevelFilter::Info);
    let mut peripherals = DynamicPeripherals::new(peripherals);
    info!("routines: {:?}", routines::list_names());
    let robot = Robot::new(&mut peripherals, VehicleConfig::default()).await;
    robot.compete().await;
}
