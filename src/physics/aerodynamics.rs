use nalgebra::Vector3;

/// Dynamic pressure q = 1/2 rho v^2, Pa.
pub fn dynamic_pressure(density: f64, speed: f64) -> f64 {
    0.5 * density * speed * speed
}

/// Aerodynamic drag force (inertial frame, opposing velocity).
///
/// `cd_area` is the drag coefficient times reference area, m^2.
pub fn drag_force(vel: &Vector3<f64>, density: f64, cd_area: f64) -> Vector3<f64> {
    let speed = vel.norm();
    if speed > 1e-6 {
        let drag_mag = dynamic_pressure(density, speed) * cd_area;
        -vel / speed * drag_mag
    } else {
        Vector3::zeros()
    }
}
