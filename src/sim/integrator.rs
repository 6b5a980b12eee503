use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// 3DOF point-mass state and RK4 integrator
// ---------------------------------------------------------------------------

/// Translational state of the craft, body-centred inertial frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMass {
    pub time: f64,
    pub pos: Vector3<f64>, // m
    pub vel: Vector3<f64>, // m/s
    pub mass: f64,         // kg
}

/// Time derivatives of a [`PointMass`].
#[derive(Debug, Clone, Copy)]
pub struct Deriv {
    pub dpos: Vector3<f64>,
    pub dvel: Vector3<f64>,
    pub dmass: f64,
}

impl PointMass {
    /// `self + deriv * dt`, used for the intermediate RK4 stages.
    pub fn apply(&self, d: &Deriv, dt: f64) -> PointMass {
        PointMass {
            time: self.time + dt,
            pos: self.pos + d.dpos * dt,
            vel: self.vel + d.dvel * dt,
            mass: self.mass + d.dmass * dt,
        }
    }
}

/// Single RK4 step; `derivatives` is held constant in its inputs (controls,
/// attitude) over the step.
pub fn rk4_step(state: &PointMass, dt: f64, derivatives: impl Fn(&PointMass) -> Deriv) -> PointMass {
    let k1 = derivatives(state);
    let k2 = derivatives(&state.apply(&k1, dt * 0.5));
    let k3 = derivatives(&state.apply(&k2, dt * 0.5));
    let k4 = derivatives(&state.apply(&k3, dt));

    PointMass {
        time: state.time + dt,
        pos: state.pos + (k1.dpos + 2.0 * k2.dpos + 2.0 * k3.dpos + k4.dpos) * (dt / 6.0),
        vel: state.vel + (k1.dvel + 2.0 * k2.dvel + 2.0 * k3.dvel + k4.dvel) * (dt / 6.0),
        mass: (state.mass + (k1.dmass + 2.0 * k2.dmass + 2.0 * k3.dmass + k4.dmass) * (dt / 6.0))
            .max(0.0),
    }
}
