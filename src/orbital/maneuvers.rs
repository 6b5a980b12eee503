// ---------------------------------------------------------------------------
// Impulsive maneuver planning
// ---------------------------------------------------------------------------

/// Speed on an orbit of semi-major axis `sma` at radius `r` (vis-viva).
///
/// Returns 0 where the radius lies outside the orbit.
pub fn vis_viva_speed(mu: f64, r: f64, sma: f64) -> f64 {
    (mu * (2.0 / r - 1.0 / sma)).max(0.0).sqrt()
}

/// Circular orbit velocity at a given radius.
pub fn circular_velocity_mu(r: f64, mu: f64) -> f64 {
    (mu / r).max(0.0).sqrt()
}

/// Prograde delta-v that circularizes an orbit at its apoapsis.
///
/// `r_apo` is the apoapsis radius (from the body centre), `sma` the current
/// semi-major axis. The result is the circular speed at `r_apo` minus the
/// speed the vehicle will have there.
pub fn circularization_delta_v(mu: f64, r_apo: f64, sma: f64) -> f64 {
    let v_apo = vis_viva_speed(mu, r_apo, sma);
    let v_circ = circular_velocity_mu(r_apo, mu);
    v_circ - v_apo
}

/// Time to burn `dv` at full thrust, from the rocket equation.
///
/// `g0` is the reference gravity for `isp` (the body's surface gravity).
/// Returns `None` when thrust, Isp, mass or `g0` are not positive, which
/// callers treat as "not ready to burn". Negative `dv` counts as zero.
pub fn burn_time(mass: f64, thrust: f64, isp: f64, dv: f64, g0: f64) -> Option<f64> {
    let valid = |x: f64| x.is_finite() && x > 0.0;
    if !(valid(mass) && valid(thrust) && valid(isp) && valid(g0)) || !dv.is_finite() {
        return None;
    }
    let ve = isp * g0;
    let flow = thrust / ve;
    let propellant = mass - mass * (-dv.max(0.0) / ve).exp();
    Some(propellant / flow)
}
