use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;

/// Classical Keplerian orbital elements.
#[derive(Debug, Clone, Copy)]
pub struct KeplerianElements {
    pub sma: f64,       // semi-major axis, m
    pub ecc: f64,       // eccentricity (0 = circular)
    pub inc: f64,       // inclination, rad
    pub raan: f64,      // right ascension of ascending node, rad
    pub argp: f64,      // argument of periapsis, rad
    pub true_anom: f64, // true anomaly, rad
}

impl KeplerianElements {
    /// Convert to a body-centred inertial state vector (position, velocity).
    pub fn to_state_vector(&self, mu: f64) -> (Vector3<f64>, Vector3<f64>) {
        let p = self.sma * (1.0 - self.ecc * self.ecc); // semi-latus rectum
        let r_pqw = p / (1.0 + self.ecc * self.true_anom.cos());

        // Position and velocity in perifocal frame (PQW)
        let r_pqw_vec = Vector3::new(
            r_pqw * self.true_anom.cos(),
            r_pqw * self.true_anom.sin(),
            0.0,
        );
        let sqrt_mu_p = (mu / p).sqrt();
        let v_pqw_vec = Vector3::new(
            -sqrt_mu_p * self.true_anom.sin(),
            sqrt_mu_p * (self.ecc + self.true_anom.cos()),
            0.0,
        );

        // Rotation matrix from PQW to inertial
        let (sin_raan, cos_raan) = self.raan.sin_cos();
        let (sin_argp, cos_argp) = self.argp.sin_cos();
        let (sin_inc, cos_inc) = self.inc.sin_cos();

        let rot = |v: &Vector3<f64>| -> Vector3<f64> {
            Vector3::new(
                (cos_raan * cos_argp - sin_raan * sin_argp * cos_inc) * v.x
                    + (-cos_raan * sin_argp - sin_raan * cos_argp * cos_inc) * v.y,
                (sin_raan * cos_argp + cos_raan * sin_argp * cos_inc) * v.x
                    + (-sin_raan * sin_argp + cos_raan * cos_argp * cos_inc) * v.y,
                (sin_argp * sin_inc) * v.x + (cos_argp * sin_inc) * v.y,
            )
        };

        (rot(&r_pqw_vec), rot(&v_pqw_vec))
    }

    /// Elements of the orbit through `pos` with velocity `vel`.
    ///
    /// Degenerate states (at rest, purely radial motion) still produce
    /// finite elements: the semi-major axis comes from the orbital energy
    /// and undefined angles are reported as zero.
    pub fn from_state_vector(pos: &Vector3<f64>, vel: &Vector3<f64>, mu: f64) -> Self {
        let r = pos.norm();
        let v = vel.norm();

        // Angular momentum
        let h = pos.cross(vel);
        let h_mag = h.norm();

        // Node vector
        let n = Vector3::new(-h.y, h.x, 0.0);
        let n_mag = n.norm();

        // Eccentricity vector
        let e_vec = ((v * v - mu / r) * pos - pos.dot(vel) * vel) / mu;
        let ecc = e_vec.norm();

        // Semi-major axis
        let energy = 0.5 * v * v - mu / r;
        let sma = if energy < 0.0 {
            -mu / (2.0 * energy)
        } else {
            -h_mag * h_mag / (mu * (ecc * ecc - 1.0).abs())
        };

        // Inclination
        let inc = if h_mag > 1e-9 {
            (h.z / h_mag).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        // RAAN
        let raan = if n_mag > 1e-10 {
            let r = (n.x / n_mag).clamp(-1.0, 1.0).acos();
            if n.y < 0.0 { TAU - r } else { r }
        } else {
            0.0
        };

        // Argument of periapsis
        let argp = if n_mag > 1e-10 && ecc > 1e-10 {
            let cos_argp = (n.dot(&e_vec) / (n_mag * ecc)).clamp(-1.0, 1.0);
            let w = cos_argp.acos();
            if e_vec.z < 0.0 { TAU - w } else { w }
        } else {
            0.0
        };

        // True anomaly
        let true_anom = if ecc > 1e-10 {
            let cos_nu = (e_vec.dot(pos) / (ecc * r)).clamp(-1.0, 1.0);
            let nu = cos_nu.acos();
            if pos.dot(vel) < 0.0 { TAU - nu } else { nu }
        } else {
            0.0
        };

        KeplerianElements {
            sma,
            ecc,
            inc,
            raan,
            argp,
            true_anom,
        }
    }

    /// Create a circular orbit of the given radius and inclination.
    pub fn circular(radius: f64, inc: f64) -> Self {
        KeplerianElements {
            sma: radius,
            ecc: 0.0,
            inc,
            raan: 0.0,
            argp: 0.0,
            true_anom: 0.0,
        }
    }

    /// Bound orbit (negative energy). Hyperbolic orbits carry a negative
    /// semi-major axis.
    pub fn is_closed(&self) -> bool {
        self.sma.is_finite() && self.sma > 0.0
    }

    /// Orbital period for a closed orbit (s).
    pub fn period(&self, mu: f64) -> f64 {
        TAU * (self.sma.powi(3) / mu).sqrt()
    }

    /// Periapsis distance from the body centre, m.
    pub fn periapsis_radius(&self) -> f64 {
        self.sma * (1.0 - self.ecc)
    }

    /// Apoapsis distance from the body centre, m; infinite on open orbits.
    pub fn apoapsis_radius(&self) -> f64 {
        if self.is_closed() {
            self.sma * (1.0 + self.ecc.min(1.0))
        } else {
            f64::INFINITY
        }
    }

    /// Mean anomaly in [0, 2pi) for a closed orbit.
    fn mean_anomaly(&self) -> f64 {
        let half = 0.5 * self.true_anom;
        let ecc = self.ecc.min(1.0 - 1e-12);
        let ecc_anom = 2.0
            * ((1.0 - ecc).sqrt() * half.sin()).atan2((1.0 + ecc).sqrt() * half.cos());
        (ecc_anom - ecc * ecc_anom.sin()).rem_euclid(TAU)
    }

    /// Seconds until the next periapsis passage.
    pub fn time_to_periapsis(&self, mu: f64) -> f64 {
        if !self.is_closed() {
            return if self.true_anom > PI { f64::INFINITY } else { 0.0 };
        }
        let n = (mu / self.sma.powi(3)).sqrt();
        (TAU - self.mean_anomaly()).rem_euclid(TAU) / n
    }

    /// Seconds until the next apoapsis passage; infinite on open orbits.
    pub fn time_to_apoapsis(&self, mu: f64) -> f64 {
        if !self.is_closed() {
            return f64::INFINITY;
        }
        let n = (mu / self.sma.powi(3)).sqrt();
        (PI - self.mean_anomaly()).rem_euclid(TAU) / n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MU: f64 = 3.531_6e12;
    const R: f64 = 600_000.0;

    #[test]
    fn circular_orbit_state_vector() {
        let r = R + 100_000.0;
        let orbit = KeplerianElements::circular(r, 28.5_f64.to_radians());
        let (pos, vel) = orbit.to_state_vector(MU);

        let recovered = KeplerianElements::from_state_vector(&pos, &vel, MU);
        assert!((recovered.sma - r).abs() < 1.0, "SMA mismatch");
        assert!(recovered.ecc < 1e-6, "Should be nearly circular");
        assert!((recovered.inc - orbit.inc).abs() < 1e-6, "Inclination mismatch");
        assert!((vel.norm() - (MU / r).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn apsides_of_elliptic_orbit() {
        let orbit = KeplerianElements {
            sma: 750_000.0,
            ecc: 0.1,
            inc: 0.0,
            raan: 0.0,
            argp: 0.0,
            true_anom: 1.0,
        };
        let (pos, vel) = orbit.to_state_vector(MU);
        let el = KeplerianElements::from_state_vector(&pos, &vel, MU);
        assert!((el.apoapsis_radius() - 825_000.0).abs() < 1.0);
        assert!((el.periapsis_radius() - 675_000.0).abs() < 1.0);
    }

    #[test]
    fn time_to_apsides_at_known_anomalies() {
        let mut orbit = KeplerianElements {
            sma: 750_000.0,
            ecc: 0.1,
            inc: 0.0,
            raan: 0.0,
            argp: 0.0,
            true_anom: 0.0,
        };
        let period = orbit.period(MU);
        // at periapsis: half an orbit to apoapsis
        assert!((orbit.time_to_apoapsis(MU) - 0.5 * period).abs() < 1e-6);
        assert!(orbit.time_to_periapsis(MU) < 1e-6 || (orbit.time_to_periapsis(MU) - period).abs() < 1e-6);

        orbit.true_anom = PI;
        assert!(orbit.time_to_apoapsis(MU) < 1e-6 || (orbit.time_to_apoapsis(MU) - period).abs() < 1e-6);
        assert!((orbit.time_to_periapsis(MU) - 0.5 * period).abs() < 1e-6);
    }

    #[test]
    fn vehicle_at_rest_on_surface_is_finite() {
        let pos = Vector3::new(R, 0.0, 0.0);
        let vel = Vector3::zeros();
        let el = KeplerianElements::from_state_vector(&pos, &vel, MU);
        assert!((el.sma - 0.5 * R).abs() < 1e-6);
        assert!((el.apoapsis_radius() - R).abs() < 1e-3);
        assert!(el.periapsis_radius().abs() < 1e-3);
        assert_eq!(el.inc, 0.0);
        assert!(el.time_to_apoapsis(MU) < 1e-3);
    }

    #[test]
    fn kerbin_low_orbit_period() {
        let orbit = KeplerianElements::circular(R + 100_000.0, 0.0);
        let period = orbit.period(MU);
        // ~32 min at 100 km
        assert!(period > 1_900.0 && period < 2_000.0, "got {:.0} s", period);
    }
}
