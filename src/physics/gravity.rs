use nalgebra::Vector3;

/// Point-mass gravity at `pos` (body-centred inertial frame).
pub fn gravity_pointmass(pos: &Vector3<f64>, mu: f64) -> Vector3<f64> {
    let r = pos.norm();
    if r < 1.0 {
        return Vector3::zeros();
    }
    -mu / (r * r * r) * pos
}

/// Gravity magnitude at a given radius from the body centre.
pub fn gravity_at_radius(radius: f64, mu: f64) -> f64 {
    if radius < 1.0 {
        return 0.0;
    }
    mu / (radius * radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MU: f64 = 3.531_6e12;
    const R: f64 = 600_000.0;

    #[test]
    fn surface_gravity_of_kerbin() {
        let g = gravity_at_radius(R, MU);
        assert!((g - 9.81).abs() < 0.01, "got {}", g);
    }

    #[test]
    fn gravity_points_to_centre_and_decreases() {
        let low = gravity_pointmass(&Vector3::new(R, 0.0, 0.0), MU);
        let high = gravity_pointmass(&Vector3::new(0.0, R + 100_000.0, 0.0), MU);
        assert!(low.x < 0.0 && low.y.abs() < 1e-12);
        assert!(high.y < 0.0);
        assert!(high.norm() < low.norm());
    }
}
