//! Where status lines and telemetry snapshots go.

pub mod console;
pub mod csv;
pub mod json;

pub use self::console::ConsoleSink;
pub use self::csv::CsvSink;
pub use self::json::FlightSummary;

use crate::vessel::TelemetrySnapshot;

/// Receiver for mission status lines and periodic telemetry.
///
/// Sinks never fail the mission: a sink that cannot write logs the problem
/// and carries on.
pub trait TelemetrySink {
    /// Called on every phase change (with the phase name) and once on a
    /// crash (`SOFTWARE CRASH: ...`).
    fn status(&mut self, line: &str);

    /// Called at the telemetry interval with a fresh snapshot.
    fn telemetry(&mut self, snapshot: &TelemetrySnapshot);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn status(&mut self, _line: &str) {}

    fn telemetry(&mut self, _snapshot: &TelemetrySnapshot) {}
}

/// Forwards to several sinks in order.
#[derive(Default)]
pub struct Fanout<'a> {
    sinks: Vec<&'a mut dyn TelemetrySink>,
}

impl<'a> Fanout<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn push(&mut self, sink: &'a mut dyn TelemetrySink) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl TelemetrySink for Fanout<'_> {
    fn status(&mut self, line: &str) {
        for sink in self.sinks.iter_mut() {
            sink.status(line);
        }
    }

    fn telemetry(&mut self, snapshot: &TelemetrySnapshot) {
        for sink in self.sinks.iter_mut() {
            sink.telemetry(snapshot);
        }
    }
}

/// A status line and how many telemetry samples preceded it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEntry {
    pub line: String,
    pub sample_index: usize,
}

/// Keeps the whole flight in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub statuses: Vec<StatusEntry>,
    pub samples: Vec<TelemetrySnapshot>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_lines(&self) -> Vec<String> {
        self.statuses.iter().map(|s| s.line.clone()).collect()
    }

    /// The most recent status line, if any.
    pub fn last_status(&self) -> Option<&str> {
        self.statuses.last().map(|s| s.line.as_str())
    }

    /// Mission time of each status line: the UT of the next sample, or of
    /// the last one for statuses reported after the final sample.
    pub fn status_times(&self) -> Vec<(f64, &str)> {
        self.statuses
            .iter()
            .filter_map(|s| {
                let sample = self
                    .samples
                    .get(s.sample_index)
                    .or_else(|| self.samples.last())?;
                Some((sample.ut, s.line.as_str()))
            })
            .collect()
    }
}

impl TelemetrySink for RecordingSink {
    fn status(&mut self, line: &str) {
        self.statuses.push(StatusEntry {
            line: line.to_string(),
            sample_index: self.samples.len(),
        });
    }

    fn telemetry(&mut self, snapshot: &TelemetrySnapshot) {
        self.samples.push(*snapshot);
    }
}

#[cfg(test)]
pub(crate) fn sample(ut: f64, altitude: f64) -> TelemetrySnapshot {
    TelemetrySnapshot {
        ut,
        apoapsis: altitude + 1_000.0,
        periapsis: -500_000.0,
        time_to_apoapsis: 30.0,
        time_to_periapsis: 1_200.0,
        orbital_speed: 900.0,
        inclination: 0.5,
        mean_altitude: altitude,
        vertical_speed: 120.0,
        latitude: -0.1,
        longitude: -74.6,
        dynamic_pressure: 12_000.0,
        g_force: 1.7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_indexes_statuses_by_sample() {
        let mut rec = RecordingSink::new();
        rec.status("PRELAUNCH");
        rec.telemetry(&sample(10.0, 0.0));
        rec.telemetry(&sample(11.0, 50.0));
        rec.status("LIFTOFF");
        assert_eq!(rec.statuses[0].sample_index, 0);
        assert_eq!(rec.statuses[1].sample_index, 2);
        assert_eq!(rec.last_status(), Some("LIFTOFF"));
        // LIFTOFF came after the last sample, so it takes the last UT
        assert_eq!(rec.status_times(), vec![(10.0, "PRELAUNCH"), (11.0, "LIFTOFF")]);
    }

    #[test]
    fn fanout_forwards_in_order() {
        let mut a = RecordingSink::new();
        let mut b = RecordingSink::new();
        let mut null = NullSink;
        {
            let mut fan = Fanout::new();
            assert!(fan.is_empty());
            fan.push(&mut a);
            fan.push(&mut null);
            fan.push(&mut b);
            fan.status("COAST");
            fan.telemetry(&sample(1.0, 2.0));
        }
        assert_eq!(a.status_lines(), vec!["COAST"]);
        assert_eq!(b.status_lines(), vec!["COAST"]);
        assert_eq!(a.samples.len(), 1);
        assert_eq!(b.samples[0].mean_altitude, 2.0);
    }

    #[test]
    fn no_samples_means_no_status_times() {
        let mut rec = RecordingSink::new();
        rec.status("PRELAUNCH");
        assert!(rec.status_times().is_empty());
    }
}
