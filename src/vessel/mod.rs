//! Vehicle control interface.
//!
//! Everything the flight software knows about the vehicle comes through the
//! [`Vessel`] trait: orbit and flight readouts, body constants, resources,
//! and the command surface (throttle, attitude, staging, nodes, warp).
//! Implementations may talk to a remote game over the network or to the
//! bundled simulator in [`crate::sim`].

pub mod telemetry;

#[cfg(test)]
pub(crate) mod mock;

pub use telemetry::TelemetrySnapshot;

use thiserror::Error;

/// Failure reported by the vehicle interface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VesselError {
    #[error("connection to vessel lost: {0}")]
    Disconnected(String),
    #[error("vessel rejected `{command}`: {reason}")]
    Rejected {
        command: &'static str,
        reason: String,
    },
    #[error("no stage left to activate")]
    NoActiveStage,
}

pub type VesselResult<T> = Result<T, VesselError>;

/// Fuel types the staging logic watches for exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuelType {
    LiquidFuel,
    SolidFuel,
}

impl FuelType {
    pub const TRACKED: [FuelType; 2] = [FuelType::LiquidFuel, FuelType::SolidFuel];
}

/// Capacity and current amount of one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceLevel {
    pub capacity: f64,
    pub amount: f64,
}

impl ResourceLevel {
    pub fn new(capacity: f64, amount: f64) -> Self {
        Self { capacity, amount }
    }

    pub fn full(capacity: f64) -> Self {
        Self::new(capacity, capacity)
    }
}

/// Tracked resources contained in the parts of a single decouple stage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageResources {
    pub liquid_fuel: ResourceLevel,
    pub solid_fuel: ResourceLevel,
}

impl StageResources {
    pub fn level(&self, fuel: FuelType) -> ResourceLevel {
        match fuel {
            FuelType::LiquidFuel => self.liquid_fuel,
            FuelType::SolidFuel => self.solid_fuel,
        }
    }

    /// The stage has tank capacity for this fuel.
    pub fn carries(&self, fuel: FuelType) -> bool {
        self.level(fuel).capacity > 0.0
    }

    /// The stage still holds some of this fuel.
    pub fn has(&self, fuel: FuelType) -> bool {
        self.level(fuel).amount > 0.0
    }
}

/// SAS hold modes used by guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SasMode {
    StabilityAssist,
    Prograde,
    Maneuver,
}

/// Autopilot attitude targets, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeTarget {
    pub pitch: f64,
    pub heading: f64,
    pub roll: Option<f64>,
}

/// A scheduled prograde burn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManeuverNode {
    /// Universal time of the burn, s.
    pub ut: f64,
    /// Prograde delta-v, m/s (negative = retrograde).
    pub prograde: f64,
}

impl ManeuverNode {
    pub fn new(ut: f64, prograde: f64) -> Self {
        Self { ut, prograde }
    }

    /// Magnitude of the planned velocity change.
    pub fn delta_v(&self) -> f64 {
        self.prograde.abs()
    }

    /// Seconds from `ut` until the node.
    pub fn time_to(&self, ut: f64) -> f64 {
        self.ut - ut
    }
}

/// The remote vehicle as seen by the flight software.
///
/// Reads take `&self`; commands take `&mut self`. Every call may fail, and
/// every failure is treated as a flight fault by the mission loop.
pub trait Vessel {
    /// Universal time, s.
    fn ut(&self) -> VesselResult<f64>;

    // --- orbit ---------------------------------------------------------------

    fn apoapsis_altitude(&self) -> VesselResult<f64>;
    fn periapsis_altitude(&self) -> VesselResult<f64>;
    /// Apoapsis distance from the body centre, m.
    fn apoapsis_radius(&self) -> VesselResult<f64>;
    /// Periapsis distance from the body centre, m.
    fn periapsis_radius(&self) -> VesselResult<f64>;
    fn semi_major_axis(&self) -> VesselResult<f64>;
    /// Inertial speed, m/s.
    fn orbital_speed(&self) -> VesselResult<f64>;
    /// Orbit inclination, rad.
    fn inclination(&self) -> VesselResult<f64>;
    fn time_to_apoapsis(&self) -> VesselResult<f64>;
    fn time_to_periapsis(&self) -> VesselResult<f64>;

    // --- body ----------------------------------------------------------------

    /// Gravitational parameter of the orbited body, m^3/s^2.
    fn gravitational_parameter(&self) -> VesselResult<f64>;
    /// Surface gravity of the orbited body, m/s^2.
    fn surface_gravity(&self) -> VesselResult<f64>;
    /// Altitude of the top of the atmosphere, m (0 without atmosphere).
    fn atmosphere_depth(&self) -> VesselResult<f64>;

    // --- flight --------------------------------------------------------------

    fn mean_altitude(&self) -> VesselResult<f64>;
    fn vertical_speed(&self) -> VesselResult<f64>;
    /// Degrees.
    fn latitude(&self) -> VesselResult<f64>;
    /// Degrees.
    fn longitude(&self) -> VesselResult<f64>;
    /// Pa.
    fn dynamic_pressure(&self) -> VesselResult<f64>;
    fn g_force(&self) -> VesselResult<f64>;

    // --- vehicle -------------------------------------------------------------

    /// Total mass, kg.
    fn mass(&self) -> VesselResult<f64>;
    /// Thrust at full throttle of all active engines, N.
    fn available_thrust(&self) -> VesselResult<f64>;
    /// Combined specific impulse of the active engines, s.
    fn specific_impulse(&self) -> VesselResult<f64>;
    fn current_stage(&self) -> VesselResult<i32>;
    /// Tracked resources in the parts decoupled when `stage` activates.
    fn stage_resources(&self, stage: i32) -> VesselResult<StageResources>;

    // --- commands ------------------------------------------------------------

    fn throttle(&self) -> VesselResult<f64>;
    fn set_throttle(&mut self, throttle: f64) -> VesselResult<()>;

    fn sas_enabled(&self) -> VesselResult<bool>;
    fn set_sas(&mut self, enabled: bool) -> VesselResult<()>;
    fn sas_mode(&self) -> VesselResult<SasMode>;
    fn set_sas_mode(&mut self, mode: SasMode) -> VesselResult<()>;

    /// Engage the attitude autopilot on explicit targets.
    fn engage_autopilot(&mut self, target: AttitudeTarget) -> VesselResult<()>;
    fn disengage_autopilot(&mut self) -> VesselResult<()>;

    fn activate_next_stage(&mut self) -> VesselResult<()>;

    fn nodes(&self) -> VesselResult<Vec<ManeuverNode>>;
    fn add_node(&mut self, node: ManeuverNode) -> VesselResult<()>;
    fn remove_nodes(&mut self) -> VesselResult<()>;

    fn physics_warp_factor(&self) -> VesselResult<u8>;
    fn set_physics_warp_factor(&mut self, factor: u8) -> VesselResult<()>;
    /// Time-accelerate on rails until universal time `ut`.
    fn warp_to(&mut self, ut: f64) -> VesselResult<()>;

    fn set_solar_panels(&mut self, deployed: bool) -> VesselResult<()>;
}
