use nalgebra::Vector3;

use crate::physics::gravity::gravity_pointmass;

/// Simplified 3DOF orbital state (no attitude).
#[derive(Debug, Clone)]
pub struct OrbitalState {
    pub time: f64,
    pub pos: Vector3<f64>, // m, body-centred inertial
    pub vel: Vector3<f64>, // m/s
}

impl OrbitalState {
    pub fn radius(&self) -> f64 {
        self.pos.norm()
    }

    pub fn speed(&self) -> f64 {
        self.vel.norm()
    }
}

/// RK4 step with an acceleration depending on position and velocity.
pub fn rk4_orbital_step(
    state: &OrbitalState,
    dt: f64,
    accel_fn: &dyn Fn(&Vector3<f64>, &Vector3<f64>) -> Vector3<f64>,
) -> OrbitalState {
    let deriv = |pos: &Vector3<f64>, vel: &Vector3<f64>| -> (Vector3<f64>, Vector3<f64>) {
        (*vel, accel_fn(pos, vel))
    };

    let (k1_dr, k1_dv) = deriv(&state.pos, &state.vel);
    let (k2_dr, k2_dv) = deriv(
        &(state.pos + k1_dr * dt * 0.5),
        &(state.vel + k1_dv * dt * 0.5),
    );
    let (k3_dr, k3_dv) = deriv(
        &(state.pos + k2_dr * dt * 0.5),
        &(state.vel + k2_dv * dt * 0.5),
    );
    let (k4_dr, k4_dv) = deriv(&(state.pos + k3_dr * dt), &(state.vel + k3_dv * dt));

    OrbitalState {
        time: state.time + dt,
        pos: state.pos + (k1_dr + 2.0 * k2_dr + 2.0 * k3_dr + k4_dr) * (dt / 6.0),
        vel: state.vel + (k1_dv + 2.0 * k2_dv + 2.0 * k3_dv + k4_dv) * (dt / 6.0),
    }
}

/// Coast under point-mass gravity until `t_end`, stepping at most
/// `max_step` seconds at a time. The last step is shortened to land on
/// `t_end` exactly.
pub fn propagate_to(initial: &OrbitalState, t_end: f64, max_step: f64, mu: f64) -> OrbitalState {
    let accel = |pos: &Vector3<f64>, _vel: &Vector3<f64>| gravity_pointmass(pos, mu);
    let mut state = initial.clone();
    while state.time < t_end {
        let dt = max_step.min(t_end - state.time);
        if dt <= 0.0 {
            break;
        }
        state = rk4_orbital_step(&state, dt, &accel);
    }
    state
}
