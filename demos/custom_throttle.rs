use std::rc::Rc;

use ascent_control::gnc::{Controller, FlightContext, ThrottleController};
use ascent_control::io::{ConsoleSink, FlightSummary, Fanout, RecordingSink};
use ascent_control::mission::{
    ControllerRegistry, LoopSettings, MissionControl, MissionParameters, Phase,
};
use ascent_control::sim::{self, presets, Body};
use ascent_control::vessel::VesselResult;

/// A bang-bang throttle: full power for the whole powered ascent, no
/// dynamic pressure limiting, and the stock behaviour everywhere else.
struct BangBangThrottle {
    stock: ThrottleController,
    phase: Phase,
}

impl BangBangThrottle {
    fn new(params: Rc<MissionParameters>) -> Self {
        Self {
            stock: ThrottleController::new(params),
            phase: Phase::Idle,
        }
    }
}

impl Controller for BangBangThrottle {
    fn set_phase(&mut self, phase: Phase, ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        self.phase = phase;
        self.stock.set_phase(phase, ctx)
    }

    fn process(&mut self, ctx: &mut FlightContext<'_>) -> VesselResult<()> {
        match self.phase {
            Phase::Liftoff | Phase::Pitch => ctx.vessel.set_throttle(1.0),
            _ => self.stock.process(ctx),
        }
    }

    fn name(&self) -> &str {
        "bang-bang throttle"
    }
}

fn main() -> anyhow::Result<()> {
    let mut registry = ControllerRegistry::default();
    registry.register("throttle", |p| Box::new(BangBangThrottle::new(p)))?;

    let params = MissionParameters {
        target_orbit_altitude: 90_000.0,
        ..Default::default()
    };
    let settings = LoopSettings {
        telemetry_interval_s: 10.0,
        tick_limit: Some(10_000),
        ..Default::default()
    };

    let (mut vessel, mut clock) = sim::new_flight(Body::kerbin(), presets::kestrel());
    let mut console = ConsoleSink::stdout().quiet();
    let mut recording = RecordingSink::new();
    let outcome = {
        let mut sink = Fanout::new();
        sink.push(&mut console);
        sink.push(&mut recording);
        let mut control = MissionControl::new(
            "BangBang Demo",
            params,
            settings,
            &registry,
            &mut vessel,
            &mut clock,
            &mut sink,
        )?;
        control.run()
    };

    let summary = FlightSummary::from_recording("BangBang Demo", &recording, &outcome);
    println!();
    println!("Max Q with an unlimited throttle: {:.0} Pa", summary.max_dynamic_pressure_pa);
    if let Some(orbit) = summary.final_orbit {
        println!(
            "Final orbit: {:.1} x {:.1} km",
            orbit.apoapsis_m / 1000.0,
            orbit.periapsis_m / 1000.0
        );
    }
    outcome?;
    Ok(())
}
