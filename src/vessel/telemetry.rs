use serde::{Deserialize, Serialize};

use super::{Vessel, VesselResult};

/// Flight and orbit readouts captured at one instant.
///
/// Built fresh for every telemetry report and never modified afterwards;
/// the next report supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub ut: f64,
    pub apoapsis: f64,
    pub periapsis: f64,
    pub time_to_apoapsis: f64,
    pub time_to_periapsis: f64,
    pub orbital_speed: f64,
    /// Degrees.
    pub inclination: f64,
    pub mean_altitude: f64,
    pub vertical_speed: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub dynamic_pressure: f64,
    pub g_force: f64,
}

impl TelemetrySnapshot {
    pub fn capture(vessel: &dyn Vessel) -> VesselResult<Self> {
        Ok(Self {
            ut: vessel.ut()?,
            apoapsis: vessel.apoapsis_altitude()?,
            periapsis: vessel.periapsis_altitude()?,
            time_to_apoapsis: vessel.time_to_apoapsis()?,
            time_to_periapsis: vessel.time_to_periapsis()?,
            orbital_speed: vessel.orbital_speed()?,
            inclination: vessel.inclination()?.to_degrees(),
            mean_altitude: vessel.mean_altitude()?,
            vertical_speed: vessel.vertical_speed()?,
            latitude: vessel.latitude()?,
            longitude: vessel.longitude()?,
            dynamic_pressure: vessel.dynamic_pressure()?,
            g_force: vessel.g_force()?,
        })
    }
}
