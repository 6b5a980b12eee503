// ---------------------------------------------------------------------------
// Exponential atmosphere with a hard ceiling
// ---------------------------------------------------------------------------

/// Isothermal atmosphere: density decays with a single scale height and is
/// zero above `depth`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialAtmosphere {
    pub surface_density: f64, // kg/m^3
    pub scale_height: f64,    // m
    pub depth: f64,           // m, top of the atmosphere
}

impl ExponentialAtmosphere {
    /// Airless body.
    pub const VACUUM: ExponentialAtmosphere = ExponentialAtmosphere {
        surface_density: 0.0,
        scale_height: 1.0,
        depth: 0.0,
    };

    /// Density at a given altitude. Negative altitudes clamp to the surface.
    pub fn density(&self, altitude: f64) -> f64 {
        if altitude >= self.depth || self.scale_height <= 0.0 {
            return 0.0;
        }
        let h = altitude.max(0.0);
        self.surface_density * (-h / self.scale_height).exp()
    }

    pub fn contains(&self, altitude: f64) -> bool {
        altitude <= self.depth
    }
}
