use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints, VLine};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ascent_control::config::{load_mission, MissionFile};
use ascent_control::io::{FlightSummary, RecordingSink};
use ascent_control::mission::{ControllerRegistry, MissionControl};
use ascent_control::sim;
use ascent_control::vessel::TelemetrySnapshot;

/// Flies the mission given as the first argument (or the stock mission),
/// then plots the recorded telemetry.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer())
        .init();

    let mut mission = match std::env::args().nth(1) {
        Some(path) => load_mission(path)?,
        None => MissionFile::default(),
    };
    // denser samples for the plots
    mission.loop_settings.telemetry_interval_s = mission.loop_settings.telemetry_interval_s.min(0.5);

    let (mut vessel, mut clock) = sim::new_flight(mission.sim.body()?, mission.sim.craft()?);
    let mut recording = RecordingSink::new();
    let outcome = {
        let registry = ControllerRegistry::default();
        let mut control = MissionControl::new(
            &mission.name,
            mission.parameters.clone(),
            mission.loop_settings.clone(),
            &registry,
            &mut vessel,
            &mut clock,
            &mut recording,
        )?;
        control.run()
    };
    let summary = FlightSummary::from_recording(&mission.name, &recording, &outcome);

    let app = FlightViz {
        samples: recording.samples,
        summary,
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Ascent Flight", options, Box::new(|_| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

struct FlightViz {
    samples: Vec<TelemetrySnapshot>,
    summary: FlightSummary,
}

impl FlightViz {
    fn series(&self, f: impl Fn(&TelemetrySnapshot) -> f64) -> PlotPoints<'static> {
        self.samples
            .iter()
            .map(|s| [s.ut, f(s)])
            .filter(|p| p[1].is_finite())
            .collect()
    }

    fn phase_markers(&self) -> Vec<VLine> {
        self.summary
            .timeline
            .iter()
            .map(|mark| VLine::new(mark.phase.clone(), mark.ut))
            .collect()
    }

    fn plot(&self, ui: &mut egui::Ui, id: &str, size: egui::Vec2, lines: Vec<Line<'static>>) {
        Plot::new(id)
            .width(size.x)
            .height(size.y)
            .x_axis_label("UT (s)")
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for marker in self.phase_markers() {
                    plot_ui.vline(marker);
                }
                for line in lines {
                    plot_ui.line(line);
                }
            });
    }
}

impl eframe::App for FlightViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Mission: {}", self.summary.mission));
            let outcome = match &self.summary.crash {
                Some(crash) => crash.clone(),
                None => format!("reached {}", self.summary.final_phase),
            };
            let orbit = self.summary.final_orbit.map_or(String::from("-"), |o| {
                format!("{:.1} x {:.1} km", o.apoapsis_m / 1000.0, o.periapsis_m / 1000.0)
            });
            ui.label(format!(
                "{outcome}  |  Orbit: {orbit}  |  Max Q: {:.0} Pa  |  Max G: {:.2}  |  Flight: {:.0} s",
                self.summary.max_dynamic_pressure_pa,
                self.summary.max_g_force,
                self.summary.flight_time_s,
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half = egui::vec2(available.x / 2.0 - 8.0, available.y / 2.0 - 8.0);

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Altitude and apsides (km)");
                    let lines = vec![
                        Line::new("Altitude", self.series(|s| s.mean_altitude / 1000.0)),
                        Line::new("Apoapsis", self.series(|s| s.apoapsis / 1000.0)),
                        Line::new("Periapsis", self.series(|s| s.periapsis.max(0.0) / 1000.0)),
                    ];
                    self.plot(ui, "altitude", half, lines);
                });
                ui.vertical(|ui| {
                    ui.label("Speed (m/s)");
                    let lines = vec![
                        Line::new("Orbital", self.series(|s| s.orbital_speed)),
                        Line::new("Vertical", self.series(|s| s.vertical_speed)),
                    ];
                    self.plot(ui, "speed", half, lines);
                });
            });

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Dynamic pressure (Pa)");
                    let lines = vec![Line::new("Q", self.series(|s| s.dynamic_pressure))];
                    self.plot(ui, "q", half, lines);
                });
                ui.vertical(|ui| {
                    ui.label("Acceleration (g)");
                    let lines = vec![Line::new("G", self.series(|s| s.g_force))];
                    self.plot(ui, "g", half, lines);
                });
            });
        });
    }
}
