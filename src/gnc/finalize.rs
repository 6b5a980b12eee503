use std::rc::Rc;

use super::controller::{Controller, FlightContext};
use crate::mission::{MissionParameters, Phase};
use crate::vessel::VesselResult;

/// Post-insertion housekeeping: clear maneuver nodes, deploy solar panels.
pub struct FinalizeController {
    params: Rc<MissionParameters>,
    phase: Phase,
}

impl FinalizeController {
    pub fn new(params: Rc<MissionParameters>) -> Self {
        Self {
            params,
            phase: Phase::Idle,
        }
    }
}

impl Controller for FinalizeController {
    fn set_phase(&mut self, phase: Phase, _ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        self.phase = phase;
        Ok(())
    }

    fn process(&mut self, ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        if self.phase != Phase::Finalize {
            return Ok(());
        }
        ctx.vessel.remove_nodes()?;
        if self.params.deploy_solar_panels {
            ctx.vessel.set_solar_panels(true)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "finalize"
    }
}
