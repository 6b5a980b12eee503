use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

use super::controller::{Controller, FlightContext};
use crate::mission::{MissionParameters, Phase};
use crate::orbital::maneuvers::circularization_delta_v;
use crate::vessel::{AttitudeTarget, ManeuverNode, SasMode, Vessel, VesselResult};

// ---------------------------------------------------------------------------
// Guidance laws
// ---------------------------------------------------------------------------

/// Gravity-turn pitch program (ease-out quadratic), degrees above horizon.
///
/// 90 at the pad, 0 at `finish_altitude`, strictly decreasing in between.
/// Progress is clamped so the vehicle stays horizontal above the finish
/// altitude.
pub fn pitch_program(altitude: f64, finish_altitude: f64) -> f64 {
    if finish_altitude <= 0.0 {
        return 0.0;
    }
    let p = (altitude / finish_altitude).clamp(0.0, 1.0);
    90.0 - (-90.0 * p * (p - 2.0))
}

/// Compass heading that puts the vehicle on an orbit of the given
/// inclination (degrees). Out-of-range requests fall back to due east.
pub fn inc_to_heading(inclination: f64) -> f64 {
    if !(-180.0..=180.0).contains(&inclination) {
        return 90.0;
    }
    let heading = if inclination >= 0.0 {
        90.0 - inclination
    } else {
        -(inclination - 90.0)
    };
    if heading < 0.0 {
        heading + 360.0
    } else {
        heading
    }
}

/// Pause between switching SAS on and selecting its mode.
pub const SAS_SETTLE: Duration = Duration::from_millis(100);

/// Switch to an SAS hold, taking over from the attitude autopilot if needed.
/// The mode is only written when it differs from the active one.
pub fn hold(ctx: &mut FlightContext<'_>, mode: SasMode) -> VesselResult<()> {
    if !ctx.vessel.sas_enabled()? {
        ctx.vessel.disengage_autopilot()?;
        ctx.vessel.set_sas(true)?;
        ctx.clock.sleep(SAS_SETTLE);
    }
    if ctx.vessel.sas_mode()? != mode {
        ctx.vessel.set_sas_mode(mode)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Guidance controller
// ---------------------------------------------------------------------------

/// Attitude control for the whole ascent; also plans the circularization
/// node when the coast begins.
pub struct GuidanceController {
    params: Rc<MissionParameters>,
    phase: Phase,
}

impl GuidanceController {
    pub fn new(params: Rc<MissionParameters>) -> Self {
        Self {
            params,
            phase: Phase::Idle,
        }
    }

    fn pitch(&self, vessel: &mut dyn Vessel) -> VesselResult<()> {
        let target = AttitudeTarget {
            pitch: pitch_program(
                vessel.mean_altitude()?,
                self.params.gravity_turn_finish_altitude,
            ),
            heading: inc_to_heading(self.params.inclination_deg),
            roll: self.params.roll_deg,
        };
        vessel.engage_autopilot(target)
    }

    fn track_node(&self, ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        if ctx.vessel.nodes()?.is_empty() {
            warn!("no maneuver node to track, holding prograde");
            hold(ctx, SasMode::Prograde)
        } else {
            hold(ctx, SasMode::Maneuver)
        }
    }

    /// Replace any existing node with a prograde burn at apoapsis that
    /// raises the periapsis to the current apoapsis.
    fn plan_circularization(&self, vessel: &mut dyn Vessel) -> VesselResult<()> {
        let dv = circularization_delta_v(
            vessel.gravitational_parameter()?,
            vessel.apoapsis_radius()?,
            vessel.semi_major_axis()?,
        );
        let node = ManeuverNode::new(vessel.ut()? + vessel.time_to_apoapsis()?, dv);
        vessel.remove_nodes()?;
        vessel.add_node(node)?;
        debug!(ut = node.ut, delta_v = node.prograde, "circularization node planned");
        Ok(())
    }
}

impl Controller for GuidanceController {
    fn set_phase(&mut self, phase: Phase, ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        self.phase = phase;
        if phase == Phase::Coast {
            self.plan_circularization(ctx.vessel)?;
        }
        Ok(())
    }

    fn process(&mut self, ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        match self.phase {
            Phase::Prelaunch => hold(ctx, SasMode::StabilityAssist),
            Phase::Pitch => self.pitch(ctx.vessel),
            Phase::Coast | Phase::Finalize => hold(ctx, SasMode::Prograde),
            Phase::Circularize => self.track_node(ctx),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "guidance"
    }
}
