use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info};

use super::controller::{Controller, FlightContext};
use crate::mission::{MissionParameters, Phase};
use crate::vessel::{FuelType, StageResources, VesselResult};

/// Debris cleanup only runs once the periapsis is above this altitude, m.
pub const DEBRIS_PERIAPSIS_FLOOR: f64 = 10_000.0;
/// Pause after cutting the engines before jettisoning spent stages.
pub const ENGINE_CUTOFF_PAUSE: Duration = Duration::from_millis(500);
/// Pause after jettisoning so debris drifts clear before relighting.
pub const SEPARATION_PAUSE: Duration = Duration::from_millis(1_500);

/// Whether the stage about to be jettisoned is done.
///
/// A tracked fuel the stage carries but has run out of means it is spent.
/// A stage carrying no tracked fuel at all (decouplers, clamps, fairings)
/// is always ready to go.
pub fn stage_spent(resources: &StageResources) -> bool {
    let mut carries_fuel = false;
    for fuel in FuelType::TRACKED {
        if resources.carries(fuel) {
            carries_fuel = true;
            if !resources.has(fuel) {
                return true;
            }
        }
    }
    !carries_fuel
}

/// Automatic staging on fuel exhaustion, plus the orbital debris policy.
pub struct StagingController {
    params: Rc<MissionParameters>,
    phase: Phase,
}

impl StagingController {
    pub fn new(params: Rc<MissionParameters>) -> Self {
        Self {
            params,
            phase: Phase::Idle,
        }
    }

    /// Drop every non-final stage before it can reach orbit.
    fn cleanup_debris(&self, ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        if !self.params.no_orbital_debris || self.phase != Phase::Circularize {
            return Ok(());
        }
        if ctx.vessel.periapsis_altitude()? < DEBRIS_PERIAPSIS_FLOOR {
            return Ok(());
        }
        let final_stage = self.params.max_auto_stage + 1;
        let stage = ctx.vessel.current_stage()?;
        if stage <= final_stage {
            return Ok(());
        }

        info!(from = stage, to = final_stage, "jettisoning spent stages");
        let throttle = ctx.vessel.throttle()?;
        ctx.vessel.set_throttle(0.0)?;
        ctx.clock.sleep(ENGINE_CUTOFF_PAUSE);
        for _ in final_stage..stage {
            if ctx.vessel.current_stage()? <= final_stage {
                break;
            }
            ctx.vessel.activate_next_stage()?;
        }
        ctx.clock.sleep(SEPARATION_PAUSE);
        ctx.vessel.set_throttle(throttle)
    }
}

impl Controller for StagingController {
    fn set_phase(&mut self, phase: Phase, _ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        self.phase = phase;
        Ok(())
    }

    fn process(&mut self, ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        if ctx.vessel.current_stage()? <= self.params.max_auto_stage {
            return Ok(());
        }
        self.cleanup_debris(ctx)?;

        let stage = ctx.vessel.current_stage()?;
        let resources = ctx.vessel.stage_resources(stage - 1)?;
        if stage_spent(&resources) {
            debug!(stage, "activating next stage");
            ctx.vessel.activate_next_stage()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "staging"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessel::mock::{ManualClock, MockState, MockVessel};

    fn params(max_auto_stage: i32) -> MissionParameters {
        MissionParameters {
            max_auto_stage,
            ..Default::default()
        }
    }

    /// Run one tick of staging in `phase`, returning the clock afterwards.
    fn tick(vessel: &MockVessel, phase: Phase, params: MissionParameters) -> ManualClock {
        let mut ctl = StagingController::new(Rc::new(params));
        let mut handle = vessel.clone();
        let mut clock = ManualClock::default();
        {
            let mut ctx = FlightContext::new(&mut handle, &mut clock);
            ctl.set_phase(phase, &mut ctx).unwrap();
            ctl.process(&mut ctx).unwrap();
        }
        clock
    }

    #[test]
    fn spent_stage_rules() {
        assert!(stage_spent(&StageResources::default()));
        assert!(stage_spent(&MockState::solid_stage(100.0, 0.0)));
        assert!(!stage_spent(&MockState::solid_stage(100.0, 3.0)));
        assert!(stage_spent(&MockState::liquid_stage(400.0, 0.0)));
        assert!(!stage_spent(&MockState::liquid_stage(400.0, 0.5)));

        // mixed: either fuel running out is enough
        let mut mixed = MockState::liquid_stage(400.0, 200.0);
        mixed.solid_fuel = crate::vessel::ResourceLevel::new(50.0, 0.0);
        assert!(stage_spent(&mixed));
    }

    #[test]
    fn empty_solid_stage_activates_once() {
        let vessel = MockVessel::new(MockState {
            current_stage: 3,
            ..Default::default()
        });
        vessel.state_mut().set_stage(2, MockState::solid_stage(150.0, 0.0));
        tick(&vessel, Phase::Pitch, params(0));
        assert_eq!(vessel.state().activations, 1);
        assert_eq!(vessel.state().current_stage, 2);
    }

    #[test]
    fn interstage_without_fuel_activates_once() {
        let vessel = MockVessel::new(MockState {
            current_stage: 3,
            ..Default::default()
        });
        tick(&vessel, Phase::Prelaunch, params(0));
        assert_eq!(vessel.state().activations, 1);
    }

    #[test]
    fn fuel_remaining_means_no_activation() {
        let vessel = MockVessel::new(MockState {
            current_stage: 3,
            ..Default::default()
        });
        vessel.state_mut().set_stage(2, MockState::liquid_stage(400.0, 12.0));
        tick(&vessel, Phase::Pitch, params(0));
        assert_eq!(vessel.state().activations, 0);
    }

    #[test]
    fn stops_at_max_auto_stage() {
        let vessel = MockVessel::new(MockState {
            current_stage: 2,
            ..Default::default()
        });
        tick(&vessel, Phase::Pitch, params(2));
        tick(&vessel, Phase::Pitch, params(3));
        assert_eq!(vessel.state().activations, 0);
    }

    #[test]
    fn debris_cleanup_drops_to_final_stage_and_restores_throttle() {
        let max = 1;
        let vessel = MockVessel::new(MockState {
            current_stage: max + 3,
            periapsis_altitude: 15_000.0,
            throttle: 0.75,
            ..Default::default()
        });
        // final stage still fuelled
        vessel
            .state_mut()
            .set_stage(max, MockState::liquid_stage(400.0, 400.0));

        let clock = tick(&vessel, Phase::Circularize, params(max));

        let s = vessel.state();
        assert_eq!(s.current_stage, max + 1);
        assert_eq!(s.activations, 2);
        assert_eq!(s.throttle, 0.75);
        assert_eq!(s.throttle_log, vec![0.0, 0.75]);
        assert_eq!(clock.sleeps, vec![ENGINE_CUTOFF_PAUSE, SEPARATION_PAUSE]);
    }

    #[test]
    fn debris_policy_guards() {
        let cases = [
            // policy off
            (false, Phase::Circularize, 15_000.0),
            // wrong phase
            (true, Phase::Coast, 15_000.0),
            // periapsis too low
            (true, Phase::Circularize, 9_000.0),
        ];
        for (policy, phase, periapsis) in cases {
            let vessel = MockVessel::new(MockState {
                current_stage: 4,
                periapsis_altitude: periapsis,
                ..Default::default()
            });
            vessel
                .state_mut()
                .set_stage(3, MockState::liquid_stage(400.0, 400.0));
            let p = MissionParameters {
                no_orbital_debris: policy,
                max_auto_stage: 1,
                ..Default::default()
            };
            let clock = tick(&vessel, phase, p);
            assert_eq!(vessel.state().activations, 0, "{policy} {phase} {periapsis}");
            assert!(clock.sleeps.is_empty());
        }
    }

    #[test]
    fn already_at_final_stage_skips_cleanup() {
        let vessel = MockVessel::new(MockState {
            current_stage: 2,
            periapsis_altitude: 50_000.0,
            ..Default::default()
        });
        vessel
            .state_mut()
            .set_stage(1, MockState::liquid_stage(400.0, 100.0));
        let clock = tick(&vessel, Phase::Circularize, params(1));
        assert!(clock.sleeps.is_empty());
        assert_eq!(vessel.state().activations, 0);
    }
}
