use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info};

use super::registry::{ControllerRegistry, ControllerRole};
use super::{Clock, LoopSettings, MissionParameters, ParamsError, Phase};
use crate::gnc::{plan_next_burn, Controller, FlightContext};
use crate::io::TelemetrySink;
use crate::vessel::{TelemetrySnapshot, Vessel, VesselError, VesselResult};

/// Liftoff is confirmed above this altitude, m.
pub const LIFTOFF_ALTITUDE: f64 = 100.0;
/// ... and above this orbital speed, m/s.
pub const LIFTOFF_SPEED: f64 = 50.0;
/// Fraction of the target altitude the apoapsis must reach before coasting.
pub const COAST_APOAPSIS_FRACTION: f64 = 0.95;
/// Circularization ends once the periapsis reaches this fraction of target.
pub const INSERTION_PERIAPSIS_FRACTION: f64 = 0.90;
/// ... or the apoapsis overshoots past this fraction of target.
pub const INSERTION_APOAPSIS_FRACTION: f64 = 1.10;

/// Why a flight was aborted. The throttle cut has always been attempted by
/// the time one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MissionError {
    #[error("{source} (during {phase})")]
    Fault {
        phase: Phase,
        #[source]
        source: VesselError,
    },
    #[error("tick limit of {ticks} reached during {phase}")]
    TickLimit { phase: Phase, ticks: u64 },
}

impl MissionError {
    /// Phase the mission was in when it stopped.
    pub fn phase(&self) -> Phase {
        match self {
            MissionError::Fault { phase, .. } | MissionError::TickLimit { phase, .. } => *phase,
        }
    }
}

// ---------------------------------------------------------------------------
// Mission controller
// ---------------------------------------------------------------------------

/// Drives a vehicle from the pad to the target orbit.
///
/// Owns the mission phase and the five controllers; borrows the vehicle,
/// the clock and the status/telemetry sink for the duration of the flight.
pub struct MissionControl<'a> {
    name: String,
    params: Rc<MissionParameters>,
    settings: LoopSettings,
    vessel: &'a mut dyn Vessel,
    clock: &'a mut dyn Clock,
    sink: &'a mut dyn TelemetrySink,
    controllers: Vec<(ControllerRole, Box<dyn Controller>)>,
    phase: Phase,
    ticks: u64,
    last_report: Option<Duration>,
}

impl<'a> MissionControl<'a> {
    /// Validate the configuration and instantiate the controllers.
    ///
    /// Nothing is sent to the vehicle until [`run`](Self::run).
    pub fn new(
        name: impl Into<String>,
        params: MissionParameters,
        settings: LoopSettings,
        registry: &ControllerRegistry,
        vessel: &'a mut dyn Vessel,
        clock: &'a mut dyn Clock,
        sink: &'a mut dyn TelemetrySink,
    ) -> Result<Self, ParamsError> {
        params.validate()?;
        settings.validate()?;
        let params = Rc::new(params);
        let controllers = registry.build(&params);
        Ok(Self {
            name: name.into(),
            params,
            settings,
            vessel,
            clock,
            sink,
            controllers,
            phase: Phase::Idle,
            ticks: 0,
            last_report: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn parameters(&self) -> &MissionParameters {
        &self.params
    }

    /// Ticks executed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Fly the mission to `Done`.
    ///
    /// Any failure cuts the throttle, reports a `SOFTWARE CRASH` status and
    /// ends the run; a failed mission is never resumed.
    pub fn run(&mut self) -> Result<Phase, MissionError> {
        info!(mission = %self.name, "starting ascent");
        match panic::catch_unwind(AssertUnwindSafe(|| self.fly())) {
            Ok(Ok(())) => {
                info!(mission = %self.name, ticks = self.ticks, "ascent complete");
                Ok(self.phase)
            }
            Ok(Err(err)) => {
                self.abort(&err);
                Err(err)
            }
            Err(payload) => {
                // engines off before the panic carries on
                error!(mission = %self.name, phase = %self.phase, "controller panicked, aborting ascent");
                self.cut_throttle();
                self.sink
                    .status(&format!("SOFTWARE CRASH: panic during {}", self.phase));
                panic::resume_unwind(payload)
            }
        }
    }

    fn fly(&mut self) -> Result<(), MissionError> {
        self.set_phase(Phase::Prelaunch)?;

        let period = self.settings.tick_period();
        let mut next_tick = self.clock.now();
        while self.phase != Phase::Done {
            if let Some(limit) = self.settings.tick_limit {
                if self.ticks >= limit {
                    return Err(MissionError::TickLimit {
                        phase: self.phase,
                        ticks: limit,
                    });
                }
            }
            self.tick()?;

            let now = self.clock.now();
            match next_tick.checked_add(period) {
                Some(due) if due > now => {
                    self.clock.sleep(due - now);
                    next_tick = due;
                }
                // Overran the tick (or the vehicle warped): resync.
                _ => next_tick = now,
            }
        }

        // Let every controller see `Done` once (engines off).
        self.process_all()
    }

    /// One control cycle: every controller in role order, a telemetry
    /// report when due, then at most one phase transition.
    pub fn tick(&mut self) -> Result<(), MissionError> {
        self.ticks += 1;
        self.process_all()?;
        self.report_if_due()?;
        self.advance()
    }

    fn process_all(&mut self) -> Result<(), MissionError> {
        let mut ctx = FlightContext::new(&mut *self.vessel, &mut *self.clock);
        for (role, controller) in self.controllers.iter_mut() {
            if let Err(source) = controller.process(&mut ctx) {
                error!(role = %role, controller = controller.name(), error = %source, "controller failed");
                return Err(MissionError::Fault {
                    phase: self.phase,
                    source,
                });
            }
        }
        Ok(())
    }

    fn report_if_due(&mut self) -> Result<(), MissionError> {
        let now = self.clock.now();
        if let Some(last) = self.last_report {
            match last.checked_add(self.settings.telemetry_interval()) {
                Some(due) if now >= due => {}
                _ => return Ok(()),
            }
        }
        let snapshot = TelemetrySnapshot::capture(&*self.vessel).map_err(|e| self.fault(e))?;
        self.sink.telemetry(&snapshot);
        self.last_report = Some(now);
        Ok(())
    }

    /// Evaluate the exit predicate of the current phase and move on if it
    /// holds.
    pub fn advance(&mut self) -> Result<(), MissionError> {
        let ready = self.exit_condition().map_err(|e| self.fault(e))?;
        match self.phase.next() {
            Some(next) if ready => self.set_phase(next),
            _ => Ok(()),
        }
    }

    fn exit_condition(&self) -> VesselResult<bool> {
        let vessel = &*self.vessel;
        let target = self.params.target_orbit_altitude;
        Ok(match self.phase {
            Phase::Idle | Phase::Done => false,
            Phase::Prelaunch | Phase::Launch | Phase::Finalize => true,
            Phase::Liftoff => {
                vessel.mean_altitude()? > LIFTOFF_ALTITUDE
                    && vessel.orbital_speed()? > LIFTOFF_SPEED
            }
            Phase::Pitch => vessel.apoapsis_altitude()? > target * COAST_APOAPSIS_FRACTION,
            Phase::Coast => match plan_next_burn(vessel)? {
                Some(plan) => plan.node.time_to(vessel.ut()?) <= plan.burn_time,
                None => false,
            },
            Phase::Circularize => {
                vessel.periapsis_altitude()? > target * INSERTION_PERIAPSIS_FRACTION
                    || vessel.apoapsis_altitude()? > target * INSERTION_APOAPSIS_FRACTION
            }
        })
    }

    /// Single mutation point of the mission phase: report it, store it,
    /// then tell every controller before anything else runs.
    pub fn set_phase(&mut self, phase: Phase) -> Result<(), MissionError> {
        info!(from = %self.phase, to = %phase, "phase change");
        self.sink.status(phase.name());
        self.phase = phase;

        let mut ctx = FlightContext::new(&mut *self.vessel, &mut *self.clock);
        for (role, controller) in self.controllers.iter_mut() {
            debug!(role = %role, controller = controller.name(), %phase, "propagating phase");
            if let Err(source) = controller.set_phase(phase, &mut ctx) {
                return Err(MissionError::Fault { phase, source });
            }
        }
        Ok(())
    }

    fn fault(&self, source: VesselError) -> MissionError {
        MissionError::Fault {
            phase: self.phase,
            source,
        }
    }

    fn cut_throttle(&mut self) {
        if let Err(cut) = self.vessel.set_throttle(0.0) {
            error!(error = %cut, "throttle cutoff failed");
        }
    }

    fn abort(&mut self, err: &MissionError) {
        error!(mission = %self.name, error = %err, "aborting ascent");
        self.cut_throttle();
        self.sink.status(&format!("SOFTWARE CRASH: {err}"));
    }
}
