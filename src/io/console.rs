use std::io::{self, Stdout, Write};

use tracing::warn;

use super::TelemetrySink;
use crate::vessel::TelemetrySnapshot;

const RULE_WIDTH: usize = 60;

/// Format `value` with `decimals` places and `,` thousands separators.
/// Non-finite values print as `inf`, `-inf` or `nan`.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    let text = format!("{:.*}", decimals, value.abs());
    let (int, frac) = match text.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(text.len() + int.len() / 3 + 1);
    // "-0" is not worth printing
    if value < 0.0 && text.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        grouped.push('-');
    }
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Two-column telemetry table, one block per report.
pub fn telemetry_table(t: &TelemetrySnapshot) -> Vec<String> {
    let rows = [
        (
            ("Apoapsis", group_thousands(t.apoapsis, 0)),
            ("Periapsis", group_thousands(t.periapsis, 0)),
        ),
        (
            ("Time to apo", group_thousands(t.time_to_apoapsis, 0)),
            ("Time to peri", group_thousands(t.time_to_periapsis, 0)),
        ),
        (
            ("Altitude", group_thousands(t.mean_altitude, 0)),
            ("Inclination", group_thousands(t.inclination, 1)),
        ),
        (
            ("Orbital velocity", group_thousands(t.orbital_speed, 0)),
            ("Vertical speed", group_thousands(t.vertical_speed, 0)),
        ),
        (
            ("Latitude", group_thousands(t.latitude, 1)),
            ("Longitude", group_thousands(t.longitude, 1)),
        ),
        (
            ("Dynamic pressure", group_thousands(t.dynamic_pressure, 0)),
            ("G-force", group_thousands(t.g_force, 1)),
        ),
    ];
    rows.iter()
        .map(|((l1, v1), (l2, v2))| {
            format!("{:<18}{:>10}     {:<14}{:>12}", format!("{l1}:"), v1, format!("{l2}:"), v2)
        })
        .collect()
}

/// Prints status lines and telemetry tables to a terminal (or any writer).
pub struct ConsoleSink<W: Write> {
    out: W,
    show_telemetry: bool,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            show_telemetry: true,
        }
    }

    /// Status lines only.
    pub fn quiet(mut self) -> Self {
        self.show_telemetry = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_block(&mut self, lines: &[String]) -> io::Result<()> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }
}

impl<W: Write> TelemetrySink for ConsoleSink<W> {
    fn status(&mut self, line: &str) {
        if let Err(e) = self.write_block(&[line.to_string()]) {
            warn!(error = %e, "console status write failed");
        }
    }

    fn telemetry(&mut self, snapshot: &TelemetrySnapshot) {
        if !self.show_telemetry {
            return;
        }
        let mut block = vec!["-".repeat(RULE_WIDTH)];
        block.extend(telemetry_table(snapshot));
        block.push("-".repeat(RULE_WIDTH));
        block.push(String::new());
        if let Err(e) = self.write_block(&block) {
            warn!(error = %e, "console telemetry write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sample;

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0.0, 0), "0");
        assert_eq!(group_thousands(999.0, 0), "999");
        assert_eq!(group_thousands(1_000.0, 0), "1,000");
        assert_eq!(group_thousands(100_000.4, 0), "100,000");
        assert_eq!(group_thousands(1_234_567.89, 1), "1,234,567.9");
        assert_eq!(group_thousands(-600_000.0, 0), "-600,000");
        assert_eq!(group_thousands(-0.2, 0), "0");
        assert_eq!(group_thousands(-74.6, 1), "-74.6");
        assert_eq!(group_thousands(f64::INFINITY, 0), "inf");
        assert_eq!(group_thousands(f64::NAN, 0), "NaN");
    }

    #[test]
    fn table_has_both_columns() {
        let rows = telemetry_table(&sample(10.0, 45_000.0));
        assert_eq!(rows.len(), 6);
        assert!(rows[0].starts_with("Apoapsis:"));
        assert!(rows[0].contains("46,000"));
        assert!(rows[0].contains("Periapsis:"));
        assert!(rows[0].contains("-500,000"));
        assert!(rows[2].contains("45,000"));
        assert!(rows[5].contains("12,000"));
        assert!(rows[5].trim_end().ends_with("1.7"));
    }

    #[test]
    fn writes_status_and_tables() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.status("PRELAUNCH");
        sink.telemetry(&sample(1.0, 0.0));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "PRELAUNCH");
        assert_eq!(lines[1], "-".repeat(RULE_WIDTH));
        assert_eq!(lines[8], "-".repeat(RULE_WIDTH));
        assert_eq!(lines.len(), 10);
    }

    #[test]
    fn quiet_prints_statuses_only() {
        let mut sink = ConsoleSink::new(Vec::new()).quiet();
        sink.telemetry(&sample(1.0, 0.0));
        sink.status("DONE");
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "DONE\n");
    }
}
