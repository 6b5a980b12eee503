use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ascent_control::config::{load_mission, MissionFile};
use ascent_control::io::{json, ConsoleSink, CsvSink, Fanout, FlightSummary, RecordingSink};
use ascent_control::mission::{ControllerRegistry, MissionControl};
use ascent_control::sim;

/// Fly an autonomous ascent to orbit on the bundled simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "Autonomous ascent-to-orbit flight controller")]
struct Cli {
    /// Mission file (TOML); flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mission name shown in logs and the summary
    #[arg(long)]
    name: Option<String>,

    /// Target circular orbit altitude in m
    #[arg(long)]
    target_altitude: Option<f64>,

    /// Target inclination in degrees, -180..=180
    #[arg(long, allow_hyphen_values = true)]
    inclination: Option<f64>,

    /// Control loop rate in Hz
    #[arg(long)]
    refresh_hz: Option<f64>,

    /// Give up after this many control ticks
    #[arg(long)]
    tick_limit: Option<u64>,

    /// Craft preset (kestrel, hornet)
    #[arg(long)]
    craft: Option<String>,

    /// Body to launch from (kerbin, mun)
    #[arg(long)]
    body: Option<String>,

    /// Pace the simulation against the wall clock
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// Write every telemetry report to this CSV file
    #[arg(long)]
    telemetry_csv: Option<PathBuf>,

    /// Write a JSON flight summary to this file
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Print phase changes only, no telemetry tables
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

impl Cli {
    fn mission(&self) -> anyhow::Result<MissionFile> {
        let mut mission = match &self.config {
            Some(path) => load_mission(path)?,
            None => MissionFile::default(),
        };
        if let Some(name) = &self.name {
            mission.name = name.clone();
        }
        if let Some(alt) = self.target_altitude {
            mission.parameters.target_orbit_altitude = alt;
        }
        if let Some(inc) = self.inclination {
            mission.parameters.inclination_deg = inc;
        }
        if let Some(hz) = self.refresh_hz {
            mission.loop_settings.refresh_hz = hz;
        }
        if let Some(limit) = self.tick_limit {
            mission.loop_settings.tick_limit = Some(limit);
        }
        if let Some(craft) = &self.craft {
            mission.sim.craft = craft.clone();
        }
        if let Some(body) = &self.body {
            mission.sim.body = body.clone();
        }
        mission.sim.realtime |= self.realtime;
        mission.validate()?;
        Ok(mission)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mission = cli.mission()?;
    let body = mission.sim.body()?;
    let craft = mission.sim.craft()?;
    info!(
        mission = %mission.name,
        craft = %craft.name,
        body = body.name,
        delta_v = craft.total_delta_v(body.surface_gravity),
        "preparing launch"
    );

    let (mut vessel, clock) = sim::new_flight(body, craft);
    let mut clock = clock.realtime(mission.sim.realtime);

    let mut console = if cli.quiet {
        ConsoleSink::stdout().quiet()
    } else {
        ConsoleSink::stdout()
    };
    let mut csv = match &cli.telemetry_csv {
        Some(path) => Some(
            CsvSink::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => None,
    };
    let mut recording = RecordingSink::new();

    let outcome = {
        let mut sink = Fanout::new();
        sink.push(&mut console);
        if let Some(csv) = csv.as_mut() {
            sink.push(csv);
        }
        sink.push(&mut recording);

        let registry = ControllerRegistry::default();
        let mut control = MissionControl::new(
            &mission.name,
            mission.parameters.clone(),
            mission.loop_settings.clone(),
            &registry,
            &mut vessel,
            &mut clock,
            &mut sink,
        )?;
        control.run()
    };

    if let Some(csv) = csv {
        csv.finish().context("flushing telemetry CSV")?;
    }

    let summary = FlightSummary::from_recording(&mission.name, &recording, &outcome);
    if let Some(path) = &cli.summary_json {
        json::write_summary_file(path, &summary)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    // -----------------------------------------------------------------------
    // Results
    // -----------------------------------------------------------------------
    let world = vessel.world();
    let elements = world.elements();
    println!();
    println!("  Mission:       {}", summary.mission);
    println!("  Final phase:   {}", summary.final_phase);
    println!("  Flight time:   {:>10.1} s", world.ut());
    println!("  Max altitude:  {:>10.1} km", summary.max_altitude_m / 1000.0);
    println!("  Max Q:         {:>10.0} Pa", summary.max_dynamic_pressure_pa);
    println!("  Max G:         {:>10.2}", summary.max_g_force);
    if !world.is_destroyed() {
        println!(
            "  Orbit:         {:>10.1} x {:.1} km, {:.2} deg",
            (elements.apoapsis_radius() - world.body.radius) / 1000.0,
            (elements.periapsis_radius() - world.body.radius) / 1000.0,
            elements.inc.to_degrees()
        );
    }
    println!();

    match outcome {
        Ok(phase) => {
            info!(%phase, "mission complete");
            Ok(())
        }
        Err(err) => {
            error!(%err, "mission failed");
            Err(err.into())
        }
    }
}
