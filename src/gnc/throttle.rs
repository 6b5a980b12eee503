use std::rc::Rc;

use super::burn::plan_next_burn;
use super::controller::{Controller, FlightContext};
use crate::mission::{MissionParameters, Phase};
use crate::vessel::{Vessel, VesselResult};

/// Lowest throttle the max-Q limiter will command.
pub const MIN_LIMITED_THROTTLE: f64 = 0.3;

/// Throttle that keeps dynamic pressure near `max_q`.
///
/// Full throttle while `q <= max_q`; above it the throttle scales with
/// `max_q / q`, never dropping below [`MIN_LIMITED_THROTTLE`]. A
/// non-positive `max_q` disables the limiter.
pub fn max_q_throttle(q: f64, max_q: f64) -> f64 {
    if max_q <= 0.0 || q <= max_q {
        1.0
    } else {
        (max_q / q).clamp(MIN_LIMITED_THROTTLE, 1.0)
    }
}

/// Engine throttle across the ascent.
pub struct ThrottleController {
    params: Rc<MissionParameters>,
    phase: Phase,
}

impl ThrottleController {
    pub fn new(params: Rc<MissionParameters>) -> Self {
        Self {
            params,
            phase: Phase::Idle,
        }
    }

    /// Full throttle once the burn, centred on the node, should have begun.
    fn circularize(&self, vessel: &mut dyn Vessel) -> VesselResult<()> {
        let burn = match plan_next_burn(vessel)? {
            Some(plan) => vessel.ut()? + plan.burn_time / 2.0 >= plan.node.ut,
            None => false,
        };
        vessel.set_throttle(if burn { 1.0 } else { 0.0 })
    }
}

impl Controller for ThrottleController {
    fn set_phase(&mut self, phase: Phase, _ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        self.phase = phase;
        Ok(())
    }

    fn process(&mut self, ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        let vessel = &mut *ctx.vessel;
        match self.phase {
            Phase::Prelaunch => vessel.set_throttle(1.0),
            Phase::Liftoff | Phase::Pitch => {
                let q = vessel.dynamic_pressure()?;
                vessel.set_throttle(max_q_throttle(q, self.params.max_dynamic_pressure))
            }
            Phase::Coast | Phase::Finalize | Phase::Done => vessel.set_throttle(0.0),
            Phase::Circularize => self.circularize(vessel),
            Phase::Idle | Phase::Launch => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "throttle"
    }
}
