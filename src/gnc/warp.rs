use tracing::debug;

use super::burn::plan_next_burn;
use super::controller::{Controller, FlightContext};
use crate::mission::Phase;
use crate::vessel::{Vessel, VesselResult};

/// Highest physics warp level (0 = none, 3 = 4x).
pub const MAX_PHYSICS_WARP: u8 = 3;
/// Time left between the end of an on-rails warp and engine ignition, s.
pub const WARP_LEAD_TIME: f64 = 5.0;

/// Time acceleration during the coast to apoapsis.
///
/// Physics warp while still in the atmosphere; once clear of it, drop out
/// of physics warp and warp on rails to just before the burn.
pub struct WarpController {
    phase: Phase,
}

impl WarpController {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    fn coast(&self, vessel: &mut dyn Vessel) -> VesselResult<()> {
        if vessel.mean_altitude()? <= vessel.atmosphere_depth()? {
            return vessel.set_physics_warp_factor(MAX_PHYSICS_WARP);
        }
        if vessel.physics_warp_factor()? == 0 {
            return Ok(());
        }
        vessel.set_physics_warp_factor(0)?;
        if let Some(plan) = plan_next_burn(vessel)? {
            let target = plan.ignition_ut() - WARP_LEAD_TIME;
            if target > vessel.ut()? {
                debug!(target, "warping to burn");
                vessel.warp_to(target)?;
            }
        }
        Ok(())
    }
}

impl Default for WarpController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for WarpController {
    fn set_phase(&mut self, phase: Phase, _ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        self.phase = phase;
        Ok(())
    }

    fn process(&mut self, ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        match self.phase {
            Phase::Coast => self.coast(ctx.vessel),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "warp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbital::maneuvers::burn_time;
    use crate::vessel::mock::{ManualClock, MockState, MockVessel};
    use crate::vessel::ManeuverNode;

    fn tick(vessel: &MockVessel, phase: Phase) {
        let mut ctl = WarpController::new();
        let mut handle = vessel.clone();
        let mut clock = ManualClock::default();
        let mut ctx = FlightContext::new(&mut handle, &mut clock);
        ctl.set_phase(phase, &mut ctx).unwrap();
        ctl.process(&mut ctx).unwrap();
    }

    #[test]
    fn physics_warp_inside_atmosphere() {
        let vessel = MockVessel::new(MockState {
            mean_altitude: 45_000.0,
            ..Default::default()
        });
        tick(&vessel, Phase::Coast);
        assert_eq!(vessel.state().physics_warp, MAX_PHYSICS_WARP);
        assert_eq!(vessel.state().warped_to, None);
    }

    #[test]
    fn rails_warp_to_burn_after_leaving_atmosphere() {
        let node = ManeuverNode::new(3_000.0, 700.0);
        let vessel = MockVessel::new(MockState {
            ut: 2_000.0,
            mean_altitude: 71_000.0,
            physics_warp: MAX_PHYSICS_WARP,
            nodes: vec![node],
            ..Default::default()
        });
        tick(&vessel, Phase::Coast);

        let bt = burn_time(10_000.0, 200_000.0, 300.0, 700.0, 9.81).unwrap();
        let s = vessel.state();
        assert_eq!(s.physics_warp, 0);
        let target = s.warped_to.unwrap();
        assert!((target - (3_000.0 - bt / 2.0 - WARP_LEAD_TIME)).abs() < 1e-9);
    }

    #[test]
    fn no_rails_warp_without_physics_warp() {
        let vessel = MockVessel::new(MockState {
            mean_altitude: 71_000.0,
            nodes: vec![ManeuverNode::new(3_000.0, 700.0)],
            ..Default::default()
        });
        tick(&vessel, Phase::Coast);
        assert_eq!(vessel.state().warped_to, None);
    }

    #[test]
    fn missing_node_only_drops_physics_warp() {
        let vessel = MockVessel::new(MockState {
            mean_altitude: 71_000.0,
            physics_warp: 2,
            ..Default::default()
        });
        tick(&vessel, Phase::Coast);
        assert_eq!(vessel.state().physics_warp, 0);
        assert_eq!(vessel.state().warped_to, None);
    }

    #[test]
    fn idle_outside_coast() {
        for phase in [Phase::Pitch, Phase::Circularize] {
            let vessel = MockVessel::new(MockState {
                mean_altitude: 45_000.0,
                ..Default::default()
            });
            tick(&vessel, phase);
            assert_eq!(vessel.state().physics_warp, 0);
        }
    }
}
