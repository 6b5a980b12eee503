use nalgebra::Vector3;

use crate::physics::ExponentialAtmosphere;

/// Spherical, non-rotating celestial body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub name: &'static str,
    pub radius: f64,          // m
    pub mu: f64,              // m^3/s^2
    pub surface_gravity: f64, // m/s^2, also the Isp reference
    pub atmosphere: ExponentialAtmosphere,
}

impl Body {
    /// Kerbin-like home world: small, dense, 70 km of air.
    pub fn kerbin() -> Self {
        Body {
            name: "Kerbin",
            radius: 600_000.0,
            mu: 3.531_6e12,
            surface_gravity: 9.81,
            atmosphere: ExponentialAtmosphere {
                surface_density: 1.225,
                scale_height: 5_600.0,
                depth: 70_000.0,
            },
        }
    }

    /// Airless Mun-like moon.
    pub fn mun() -> Self {
        Body {
            name: "Mun",
            radius: 200_000.0,
            mu: 6.514_2e10,
            surface_gravity: 1.63,
            atmosphere: ExponentialAtmosphere::VACUUM,
        }
    }

    pub fn by_name(name: &str) -> Option<Body> {
        match name.to_ascii_lowercase().as_str() {
            "kerbin" => Some(Body::kerbin()),
            "mun" => Some(Body::mun()),
            _ => None,
        }
    }

    pub fn altitude(&self, pos: &Vector3<f64>) -> f64 {
        pos.norm() - self.radius
    }

    pub fn density_at(&self, pos: &Vector3<f64>) -> f64 {
        self.atmosphere.density(self.altitude(pos))
    }
}
