use crate::mission::{Clock, Phase};
use crate::vessel::{Vessel, VesselResult};

/// What a controller may touch during a tick: the vehicle and the clock.
pub struct FlightContext<'a> {
    pub vessel: &'a mut dyn Vessel,
    pub clock: &'a mut dyn Clock,
}

impl<'a> FlightContext<'a> {
    pub fn new(vessel: &'a mut dyn Vessel, clock: &'a mut dyn Clock) -> Self {
        Self { vessel, clock }
    }
}

/// Trait for flight controllers.
///
/// Implement this to replace one of the five controller roles. The mission
/// loop calls `set_phase` on every phase change and `process` once per
/// tick; any error returned aborts the flight.
pub trait Controller {
    /// Record the new mission phase. Runs synchronously inside the phase
    /// change, before any further `process` call.
    fn set_phase(&mut self, phase: Phase, ctx: &mut FlightContext<'_>) -> VesselResult<()>;

    /// Act on the vehicle for the current phase.
    fn process(&mut self, ctx: &mut FlightContext<'_>) -> VesselResult<()>;

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
