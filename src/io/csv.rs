use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use super::TelemetrySink;
use crate::vessel::TelemetrySnapshot;

/// One telemetry row, tagged with the phase it was captured in.
#[derive(Debug, Serialize)]
struct TelemetryRow<'a> {
    phase: &'a str,
    ut: f64,
    mean_altitude: f64,
    apoapsis: f64,
    periapsis: f64,
    time_to_apoapsis: f64,
    time_to_periapsis: f64,
    orbital_speed: f64,
    vertical_speed: f64,
    inclination_deg: f64,
    latitude: f64,
    longitude: f64,
    dynamic_pressure: f64,
    g_force: f64,
}

/// Telemetry log in CSV form, one row per report.
///
/// Write errors are logged once and remembered; [`finish`](Self::finish)
/// returns the first one.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    phase: String,
    rows: usize,
    error: Option<csv::Error>,
}

impl CsvSink<File> {
    pub fn create(path: impl AsRef<Path>) -> csv::Result<Self> {
        Ok(Self::from_writer(csv::Writer::from_path(path)?))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        Self::from_writer(csv::Writer::from_writer(out))
    }

    fn from_writer(writer: csv::Writer<W>) -> Self {
        Self {
            writer,
            phase: String::new(),
            rows: 0,
            error: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the writer.
    pub fn finish(mut self) -> csv::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }

    fn record(&mut self, result: csv::Result<()>) {
        if let Err(e) = result {
            if self.error.is_none() {
                warn!(error = %e, "telemetry csv write failed");
                self.error = Some(e);
            }
        }
    }
}

impl<W: Write> TelemetrySink for CsvSink<W> {
    fn status(&mut self, line: &str) {
        self.phase = line.to_string();
    }

    fn telemetry(&mut self, t: &TelemetrySnapshot) {
        if self.error.is_some() {
            return;
        }
        let row = TelemetryRow {
            phase: &self.phase,
            ut: t.ut,
            mean_altitude: t.mean_altitude,
            apoapsis: t.apoapsis,
            periapsis: t.periapsis,
            time_to_apoapsis: t.time_to_apoapsis,
            time_to_periapsis: t.time_to_periapsis,
            orbital_speed: t.orbital_speed,
            vertical_speed: t.vertical_speed,
            inclination_deg: t.inclination,
            latitude: t.latitude,
            longitude: t.longitude,
            dynamic_pressure: t.dynamic_pressure,
            g_force: t.g_force,
        };
        let result = self.writer.serialize(row);
        if result.is_ok() {
            self.rows += 1;
        }
        self.record(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sample;

    #[test]
    fn csv_output_has_header_and_rows() {
        let mut sink = CsvSink::new(Vec::new());
        sink.status("LIFTOFF");
        sink.telemetry(&sample(10.0, 120.0));
        sink.status("PITCH");
        sink.telemetry(&sample(11.0, 400.0));
        assert_eq!(sink.rows(), 2);

        let output = String::from_utf8(sink.finish().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert!(lines[0].starts_with("phase,ut,mean_altitude,apoapsis,"));
        assert!(lines[1].starts_with("LIFTOFF,10.0,120.0,"));
        assert!(lines[2].starts_with("PITCH,11.0,400.0,"));
    }

    #[test]
    fn rows_before_first_status_have_empty_phase() {
        let mut sink = CsvSink::new(Vec::new());
        sink.telemetry(&sample(0.0, 0.0));
        let output = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert!(output.lines().nth(1).unwrap().starts_with(",0.0,"));
    }

    #[test]
    fn writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.csv");
        let mut sink = CsvSink::create(&path).unwrap();
        sink.status("COAST");
        sink.telemetry(&sample(5.0, 71_000.0));
        sink.finish().unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 14);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "COAST");
        assert_eq!(rows[0][2].parse::<f64>().unwrap(), 71_000.0);
    }
}
