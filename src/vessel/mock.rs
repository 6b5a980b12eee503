//! Scripted in-memory vessel for controller and mission-loop tests.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use super::{
    AttitudeTarget, ManeuverNode, ResourceLevel, SasMode, StageResources, Vessel, VesselError,
    VesselResult,
};
use crate::mission::Clock;

/// Readouts and command log of the mock. Tests poke the fields directly.
#[derive(Debug, Clone)]
pub(crate) struct MockState {
    pub ut: f64,
    pub apoapsis_altitude: f64,
    pub periapsis_altitude: f64,
    pub body_radius: f64,
    pub semi_major_axis: f64,
    pub orbital_speed: f64,
    pub inclination: f64,
    pub time_to_apoapsis: f64,
    pub time_to_periapsis: f64,
    pub mu: f64,
    pub surface_gravity: f64,
    pub atmosphere_depth: f64,
    pub mean_altitude: f64,
    pub vertical_speed: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub dynamic_pressure: f64,
    pub g_force: f64,
    pub mass: f64,
    pub available_thrust: f64,
    pub specific_impulse: f64,
    pub current_stage: i32,
    pub stages: HashMap<i32, StageResources>,

    pub throttle: f64,
    pub throttle_log: Vec<f64>,
    pub sas: bool,
    pub sas_mode: SasMode,
    pub sas_mode_writes: usize,
    pub autopilot: Option<AttitudeTarget>,
    pub activations: usize,
    pub nodes: Vec<ManeuverNode>,
    pub physics_warp: u8,
    pub warped_to: Option<f64>,
    pub solar_panels: bool,

    /// When set, every call except `set_throttle` fails.
    pub faulted: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            ut: 1_000.0,
            apoapsis_altitude: 0.0,
            periapsis_altitude: -600_000.0,
            body_radius: 600_000.0,
            semi_major_axis: 300_000.0,
            orbital_speed: 0.0,
            inclination: 0.0,
            time_to_apoapsis: 0.0,
            time_to_periapsis: 0.0,
            mu: 3.531_6e12,
            surface_gravity: 9.81,
            atmosphere_depth: 70_000.0,
            mean_altitude: 0.0,
            vertical_speed: 0.0,
            latitude: 0.0,
            longitude: 0.0,
            dynamic_pressure: 0.0,
            g_force: 1.0,
            mass: 10_000.0,
            available_thrust: 200_000.0,
            specific_impulse: 300.0,
            current_stage: 0,
            stages: HashMap::new(),
            throttle: 0.0,
            throttle_log: Vec::new(),
            sas: false,
            sas_mode: SasMode::StabilityAssist,
            sas_mode_writes: 0,
            autopilot: None,
            activations: 0,
            nodes: Vec::new(),
            physics_warp: 0,
            warped_to: None,
            solar_panels: false,
            faulted: false,
        }
    }
}

impl MockState {
    pub fn set_stage(&mut self, stage: i32, resources: StageResources) {
        self.stages.insert(stage, resources);
    }

    pub fn liquid_stage(capacity: f64, amount: f64) -> StageResources {
        StageResources {
            liquid_fuel: ResourceLevel::new(capacity, amount),
            ..StageResources::default()
        }
    }

    pub fn solid_stage(capacity: f64, amount: f64) -> StageResources {
        StageResources {
            solid_fuel: ResourceLevel::new(capacity, amount),
            ..StageResources::default()
        }
    }
}

/// Cheap-to-clone handle; clones share state so a test can keep one while
/// the mission loop flies another.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockVessel {
    state: Rc<RefCell<MockState>>,
}

impl MockVessel {
    pub fn new(state: MockState) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn state(&self) -> Ref<'_, MockState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, MockState> {
        self.state.borrow_mut()
    }

    pub fn arm_fault(&self) {
        self.state_mut().faulted = true;
    }

    fn read<T>(&self, f: impl FnOnce(&MockState) -> T) -> VesselResult<T> {
        let state = self.state.borrow();
        if state.faulted {
            return Err(VesselError::Disconnected("injected fault".into()));
        }
        Ok(f(&state))
    }

    fn write(&mut self, f: impl FnOnce(&mut MockState)) -> VesselResult<()> {
        let mut state = self.state.borrow_mut();
        if state.faulted {
            return Err(VesselError::Disconnected("injected fault".into()));
        }
        f(&mut state);
        Ok(())
    }
}

impl Vessel for MockVessel {
    fn ut(&self) -> VesselResult<f64> {
        self.read(|s| s.ut)
    }

    fn apoapsis_altitude(&self) -> VesselResult<f64> {
        self.read(|s| s.apoapsis_altitude)
    }

    fn periapsis_altitude(&self) -> VesselResult<f64> {
        self.read(|s| s.periapsis_altitude)
    }

    fn apoapsis_radius(&self) -> VesselResult<f64> {
        self.read(|s| s.apoapsis_altitude + s.body_radius)
    }

    fn periapsis_radius(&self) -> VesselResult<f64> {
        self.read(|s| s.periapsis_altitude + s.body_radius)
    }

    fn semi_major_axis(&self) -> VesselResult<f64> {
        self.read(|s| s.semi_major_axis)
    }

    fn orbital_speed(&self) -> VesselResult<f64> {
        self.read(|s| s.orbital_speed)
    }

    fn inclination(&self) -> VesselResult<f64> {
        self.read(|s| s.inclination)
    }

    fn time_to_apoapsis(&self) -> VesselResult<f64> {
        self.read(|s| s.time_to_apoapsis)
    }

    fn time_to_periapsis(&self) -> VesselResult<f64> {
        self.read(|s| s.time_to_periapsis)
    }

    fn gravitational_parameter(&self) -> VesselResult<f64> {
        self.read(|s| s.mu)
    }

    fn surface_gravity(&self) -> VesselResult<f64> {
        self.read(|s| s.surface_gravity)
    }

    fn atmosphere_depth(&self) -> VesselResult<f64> {
        self.read(|s| s.atmosphere_depth)
    }

    fn mean_altitude(&self) -> VesselResult<f64> {
        self.read(|s| s.mean_altitude)
    }

    fn vertical_speed(&self) -> VesselResult<f64> {
        self.read(|s| s.vertical_speed)
    }

    fn latitude(&self) -> VesselResult<f64> {
        self.read(|s| s.latitude)
    }

    fn longitude(&self) -> VesselResult<f64> {
        self.read(|s| s.longitude)
    }

    fn dynamic_pressure(&self) -> VesselResult<f64> {
        self.read(|s| s.dynamic_pressure)
    }

    fn g_force(&self) -> VesselResult<f64> {
        self.read(|s| s.g_force)
    }

    fn mass(&self) -> VesselResult<f64> {
        self.read(|s| s.mass)
    }

    fn available_thrust(&self) -> VesselResult<f64> {
        self.read(|s| s.available_thrust)
    }

    fn specific_impulse(&self) -> VesselResult<f64> {
        self.read(|s| s.specific_impulse)
    }

    fn current_stage(&self) -> VesselResult<i32> {
        self.read(|s| s.current_stage)
    }

    fn stage_resources(&self, stage: i32) -> VesselResult<StageResources> {
        self.read(|s| s.stages.get(&stage).copied().unwrap_or_default())
    }

    fn throttle(&self) -> VesselResult<f64> {
        self.read(|s| s.throttle)
    }

    fn set_throttle(&mut self, throttle: f64) -> VesselResult<()> {
        // Never faulted: the abort path must always be able to cut the engines.
        let mut state = self.state.borrow_mut();
        state.throttle = throttle;
        state.throttle_log.push(throttle);
        Ok(())
    }

    fn sas_enabled(&self) -> VesselResult<bool> {
        self.read(|s| s.sas)
    }

    fn set_sas(&mut self, enabled: bool) -> VesselResult<()> {
        self.write(|s| s.sas = enabled)
    }

    fn sas_mode(&self) -> VesselResult<SasMode> {
        self.read(|s| s.sas_mode)
    }

    fn set_sas_mode(&mut self, mode: SasMode) -> VesselResult<()> {
        self.write(|s| {
            s.sas_mode = mode;
            s.sas_mode_writes += 1;
        })
    }

    fn engage_autopilot(&mut self, target: AttitudeTarget) -> VesselResult<()> {
        self.write(|s| {
            s.sas = false;
            s.autopilot = Some(target);
        })
    }

    fn disengage_autopilot(&mut self) -> VesselResult<()> {
        self.write(|s| s.autopilot = None)
    }

    fn activate_next_stage(&mut self) -> VesselResult<()> {
        self.write(|s| {
            s.current_stage -= 1;
            s.activations += 1;
        })
    }

    fn nodes(&self) -> VesselResult<Vec<ManeuverNode>> {
        self.read(|s| s.nodes.clone())
    }

    fn add_node(&mut self, node: ManeuverNode) -> VesselResult<()> {
        self.write(|s| s.nodes.push(node))
    }

    fn remove_nodes(&mut self) -> VesselResult<()> {
        self.write(|s| s.nodes.clear())
    }

    fn physics_warp_factor(&self) -> VesselResult<u8> {
        self.read(|s| s.physics_warp)
    }

    fn set_physics_warp_factor(&mut self, factor: u8) -> VesselResult<()> {
        self.write(|s| s.physics_warp = factor)
    }

    fn warp_to(&mut self, ut: f64) -> VesselResult<()> {
        self.write(|s| {
            s.warped_to = Some(ut);
            s.ut = ut;
        })
    }

    fn set_solar_panels(&mut self, deployed: bool) -> VesselResult<()> {
        self.write(|s| s.solar_panels = deployed)
    }
}

/// Clock that only moves when slept on.
#[derive(Debug, Default)]
pub(crate) struct ManualClock {
    pub now: Duration,
    pub sleeps: Vec<Duration>,
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
        self.sleeps.push(duration);
    }
}
