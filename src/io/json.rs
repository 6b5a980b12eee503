use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::RecordingSink;
use crate::mission::{MissionError, Phase};

/// When a phase was entered, by vehicle universal time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseMark {
    pub phase: String,
    pub ut: f64,
}

/// Orbit at the last telemetry report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitSummary {
    pub apoapsis_m: f64,
    pub periapsis_m: f64,
    pub inclination_deg: f64,
    pub orbital_speed_ms: f64,
}

/// Summary statistics computed from a recorded flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub mission: String,
    /// `true` when the mission reached `DONE`.
    pub success: bool,
    pub final_phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crash: Option<String>,
    pub timeline: Vec<PhaseMark>,
    pub samples: usize,
    pub flight_time_s: f64,
    pub max_altitude_m: f64,
    pub max_dynamic_pressure_pa: f64,
    pub max_g_force: f64,
    pub final_orbit: Option<OrbitSummary>,
}

impl FlightSummary {
    /// Compute the summary from a recording and the mission result.
    pub fn from_recording(
        mission: &str,
        recording: &RecordingSink,
        outcome: &Result<Phase, MissionError>,
    ) -> Self {
        let samples = &recording.samples;
        let max = |f: fn(&crate::vessel::TelemetrySnapshot) -> f64| {
            samples.iter().map(f).fold(0.0_f64, f64::max)
        };
        let flight_time_s = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => last.ut - first.ut,
            _ => 0.0,
        };
        let timeline = recording
            .status_times()
            .into_iter()
            .filter(|(_, line)| Phase::from_name(line).is_some())
            .map(|(ut, line)| PhaseMark {
                phase: line.to_string(),
                ut,
            })
            .collect();

        let (final_phase, crash) = match outcome {
            Ok(phase) => (*phase, None),
            Err(e) => (e.phase(), Some(e.to_string())),
        };

        FlightSummary {
            mission: mission.to_string(),
            success: crash.is_none() && final_phase == Phase::Done,
            final_phase,
            crash,
            timeline,
            samples: samples.len(),
            flight_time_s,
            max_altitude_m: max(|s| s.mean_altitude),
            max_dynamic_pressure_pa: max(|s| s.dynamic_pressure),
            max_g_force: max(|s| s.g_force),
            final_orbit: samples.last().map(|s| OrbitSummary {
                apoapsis_m: s.apoapsis,
                periapsis_m: s.periapsis,
                inclination_deg: s.inclination,
                orbital_speed_ms: s.orbital_speed,
            }),
        }
    }
}

/// Write flight summary as JSON to a writer.
pub fn write_summary<W: Write>(writer: &mut W, summary: &FlightSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)
}

/// Write flight summary JSON to a file.
pub fn write_summary_file(path: impl AsRef<Path>, summary: &FlightSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}
