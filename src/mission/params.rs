use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected mission or loop parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("inclination must lie in [-180, 180] degrees, got {0}")]
    InclinationOutOfRange(f64),
    #[error("max_auto_stage must not be negative, got {0}")]
    NegativeStage(i32),
    #[error("{field} of {value} s is not a representable duration")]
    DurationOutOfRange { field: &'static str, value: f64 },
}

fn finite(field: &'static str, value: f64) -> Result<f64, ParamsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParamsError::NotFinite { field, value })
    }
}

fn duration(field: &'static str, secs: f64) -> Result<Duration, ParamsError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ParamsError::DurationOutOfRange {
        field,
        value: secs,
    })
}

fn positive(field: &'static str, value: f64) -> Result<f64, ParamsError> {
    if finite(field, value)? > 0.0 {
        Ok(value)
    } else {
        Err(ParamsError::NotPositive { field, value })
    }
}

// ---------------------------------------------------------------------------
// Mission parameters
// ---------------------------------------------------------------------------

/// Everything the controllers need to know about the requested ascent.
///
/// Fixed for the whole run and shared read-only with every controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MissionParameters {
    /// Automatic staging stops once the current stage reaches this number.
    pub max_auto_stage: i32,
    /// Jettison all spent non-final stages before reaching orbit.
    pub no_orbital_debris: bool,
    /// Target circular orbit altitude, m.
    pub target_orbit_altitude: f64,
    /// Altitude at which the gravity turn reaches horizontal, m.
    pub gravity_turn_finish_altitude: f64,
    /// Target inclination, degrees.
    pub inclination_deg: f64,
    /// Autopilot roll target during the gravity turn, degrees.
    pub roll_deg: Option<f64>,
    pub deploy_solar_panels: bool,
    /// Dynamic pressure limit during the powered ascent, Pa. Non-positive
    /// disables the limiter.
    pub max_dynamic_pressure: f64,
}

impl Default for MissionParameters {
    fn default() -> Self {
        Self {
            max_auto_stage: 0,
            no_orbital_debris: true,
            target_orbit_altitude: 100_000.0,
            gravity_turn_finish_altitude: 55_000.0,
            inclination_deg: 0.0,
            roll_deg: Some(90.0),
            deploy_solar_panels: true,
            max_dynamic_pressure: 20_000.0,
        }
    }
}

impl MissionParameters {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.max_auto_stage < 0 {
            return Err(ParamsError::NegativeStage(self.max_auto_stage));
        }
        positive("target_orbit_altitude", self.target_orbit_altitude)?;
        positive(
            "gravity_turn_finish_altitude",
            self.gravity_turn_finish_altitude,
        )?;
        let inc = finite("inclination_deg", self.inclination_deg)?;
        if !(-180.0..=180.0).contains(&inc) {
            return Err(ParamsError::InclinationOutOfRange(inc));
        }
        if let Some(roll) = self.roll_deg {
            finite("roll_deg", roll)?;
        }
        finite("max_dynamic_pressure", self.max_dynamic_pressure)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loop settings
// ---------------------------------------------------------------------------

/// Control loop pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopSettings {
    /// Control ticks per second.
    pub refresh_hz: f64,
    /// Minimum spacing of telemetry reports, s.
    pub telemetry_interval_s: f64,
    /// Abort after this many ticks without reaching `Done`.
    pub tick_limit: Option<u64>,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            refresh_hz: 5.0,
            telemetry_interval_s: 1.0,
            tick_limit: None,
        }
    }
}

impl LoopSettings {
    pub fn validate(&self) -> Result<(), ParamsError> {
        positive("refresh_hz", self.refresh_hz)?;
        if finite("telemetry_interval_s", self.telemetry_interval_s)? < 0.0 {
            return Err(ParamsError::NotPositive {
                field: "telemetry_interval_s",
                value: self.telemetry_interval_s,
            });
        }
        duration("tick period", 1.0 / self.refresh_hz)?;
        duration("telemetry_interval_s", self.telemetry_interval_s)?;
        Ok(())
    }

    /// Spacing of control ticks. Saturates for settings that fail
    /// [`validate`](Self::validate).
    pub fn tick_period(&self) -> Duration {
        duration("tick period", 1.0 / self.refresh_hz).unwrap_or(Duration::MAX)
    }

    pub fn telemetry_interval(&self) -> Duration {
        duration("telemetry_interval_s", self.telemetry_interval_s).unwrap_or(Duration::MAX)
    }
}
