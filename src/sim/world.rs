use std::time::Duration;

use nalgebra::{Unit, UnitQuaternion, Vector3};
use tracing::{debug, info, warn};

use super::body::Body;
use super::craft::Craft;
use super::integrator::{rk4_step, Deriv, PointMass};
use crate::orbital::{propagate_to, KeplerianElements, OrbitalState};
use crate::physics::aerodynamics::{drag_force, dynamic_pressure};
use crate::physics::gravity::gravity_pointmass;
use crate::vessel::{AttitudeTarget, ManeuverNode, SasMode, VesselError, VesselResult};

/// Fixed physics step, s.
pub const PHYSICS_STEP: f64 = 0.02;
/// Step used when coasting on rails, s.
pub const RAILS_STEP: f64 = 1.0;
/// Attitude slew rate, deg/s.
pub const SLEW_RATE: f64 = 20.0;
/// Highest physics warp level the simulator accepts.
pub const PHYSICS_WARP_LIMIT: u8 = 3;
/// Descent speed above which touching the ground destroys the craft, m/s.
pub const CRASH_SPEED: f64 = 10.0;

/// The whole simulated universe: one body, one craft, and the craft's
/// control state.
#[derive(Debug, Clone)]
pub struct SimWorld {
    pub body: Body,
    pub craft: Craft,
    state: OrbitalState,
    facing: Vector3<f64>,
    pub(crate) throttle: f64,
    pub(crate) sas: bool,
    pub(crate) sas_mode: SasMode,
    pub(crate) autopilot: Option<AttitudeTarget>,
    pub(crate) nodes: Vec<ManeuverNode>,
    pub(crate) physics_warp: u8,
    pub(crate) solar_panels: bool,
    destroyed: bool,
    g_force: f64,
    pending: f64,
    elapsed: Duration,
}

impl SimWorld {
    /// Craft standing on the equator at longitude 0, pointing straight up.
    pub fn on_pad(body: Body, craft: Craft) -> Self {
        let pos = Vector3::new(body.radius, 0.0, 0.0);
        SimWorld {
            body,
            craft,
            state: OrbitalState {
                time: 0.0,
                pos,
                vel: Vector3::zeros(),
            },
            facing: Vector3::x(),
            throttle: 0.0,
            sas: false,
            sas_mode: SasMode::StabilityAssist,
            autopilot: None,
            nodes: Vec::new(),
            physics_warp: 0,
            solar_panels: false,
            destroyed: false,
            g_force: 1.0,
            pending: 0.0,
            elapsed: Duration::ZERO,
        }
    }

    // -----------------------------------------------------------------------
    // Readouts
    // -----------------------------------------------------------------------

    pub fn ut(&self) -> f64 {
        self.state.time
    }

    pub fn state(&self) -> &OrbitalState {
        &self.state
    }

    pub fn facing(&self) -> Vector3<f64> {
        self.facing
    }

    /// Time spent inside `advance`, excluding on-rails warps.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn solar_panels_deployed(&self) -> bool {
        self.solar_panels
    }

    pub(crate) fn ensure_intact(&self) -> VesselResult<()> {
        if self.destroyed {
            Err(VesselError::Disconnected("vessel destroyed".into()))
        } else {
            Ok(())
        }
    }

    pub fn altitude(&self) -> f64 {
        self.body.altitude(&self.state.pos)
    }

    pub fn elements(&self) -> KeplerianElements {
        KeplerianElements::from_state_vector(&self.state.pos, &self.state.vel, self.body.mu)
    }

    pub fn vertical_speed(&self) -> f64 {
        self.state.vel.dot(&self.up())
    }

    /// Degrees.
    pub fn latitude(&self) -> f64 {
        (self.state.pos.z / self.state.radius()).clamp(-1.0, 1.0).asin().to_degrees()
    }

    /// Degrees.
    pub fn longitude(&self) -> f64 {
        self.state.pos.y.atan2(self.state.pos.x).to_degrees()
    }

    pub fn dynamic_pressure(&self) -> f64 {
        dynamic_pressure(self.body.density_at(&self.state.pos), self.state.speed())
    }

    pub fn g_force(&self) -> f64 {
        self.g_force
    }

    fn up(&self) -> Vector3<f64> {
        self.state.pos.normalize()
    }

    // -----------------------------------------------------------------------
    // Attitude
    // -----------------------------------------------------------------------

    /// Unit vector for a pitch above the horizon and a compass heading.
    pub fn direction(&self, pitch_deg: f64, heading_deg: f64) -> Vector3<f64> {
        let up = self.up();
        let east = Unit::try_new(Vector3::z().cross(&up), 1e-9)
            .map(Unit::into_inner)
            .unwrap_or_else(Vector3::y);
        let north = up.cross(&east);
        let (p, h) = (pitch_deg.to_radians(), heading_deg.to_radians());
        (north * h.cos() + east * h.sin()) * p.cos() + up * p.sin()
    }

    /// Where the attitude control wants the nose.
    fn attitude_target(&self) -> Vector3<f64> {
        if let Some(target) = self.autopilot {
            return self.direction(target.pitch, target.heading);
        }
        let speed = self.state.speed();
        if self.sas && speed > 1.0 {
            let prograde = self.state.vel / speed;
            match self.sas_mode {
                SasMode::Prograde => return prograde,
                SasMode::Maneuver => {
                    if let Some(node) = self.nodes.first() {
                        return prograde * node.prograde.signum();
                    }
                }
                SasMode::StabilityAssist => {}
            }
        }
        self.facing
    }

    fn slew(&mut self, dt: f64) {
        let target = self.attitude_target();
        let max = SLEW_RATE.to_radians() * dt;
        if self.facing.angle(&target) <= max {
            self.facing = target;
            return;
        }
        let axis = Unit::try_new(self.facing.cross(&target), 1e-12).unwrap_or_else(Vector3::z_axis);
        self.facing = (UnitQuaternion::from_axis_angle(&axis, max) * self.facing).normalize();
    }

    // -----------------------------------------------------------------------
    // Physics
    // -----------------------------------------------------------------------

    /// Let `real` of wall time pass, sped up by the physics warp level.
    pub fn advance(&mut self, real: Duration) {
        self.elapsed += real;
        self.pending += real.as_secs_f64() * f64::from(self.physics_warp + 1);
        while self.pending >= PHYSICS_STEP - 1e-9 {
            self.pending -= PHYSICS_STEP;
            if self.destroyed {
                continue;
            }
            self.step(PHYSICS_STEP);
        }
    }

    fn step(&mut self, dt: f64) {
        self.slew(dt);
        let g0 = self.body.surface_gravity;
        let throttle = self.throttle;

        if self.craft.clamped() {
            self.craft.burn(throttle, g0, dt);
            self.state.time += dt;
            self.g_force = 1.0;
            return;
        }

        let thrust = self.facing * self.craft.thrust_at(throttle);
        let flow = self.craft.mass_flow(throttle, g0);
        let cd_area = self.craft.cd_area();
        let body = self.body;
        let derivatives = |s: &PointMass| {
            let drag = drag_force(&s.vel, body.density_at(&s.pos), cd_area);
            Deriv {
                dpos: s.vel,
                dvel: gravity_pointmass(&s.pos, body.mu) + (thrust + drag) / s.mass.max(1e-6),
                dmass: -flow,
            }
        };

        let start = PointMass {
            time: self.state.time,
            pos: self.state.pos,
            vel: self.state.vel,
            mass: self.craft.mass(),
        };
        let next = rk4_step(&start, dt, derivatives);
        self.craft.burn(throttle, g0, dt);

        let drag = drag_force(&start.vel, body.density_at(&start.pos), cd_area);
        self.g_force = (thrust + drag).norm() / (start.mass.max(1e-6) * g0);
        self.state = OrbitalState {
            time: next.time,
            pos: next.pos,
            vel: next.vel,
        };
        self.ground_contact();
    }

    fn ground_contact(&mut self) {
        let r = self.state.radius();
        if r >= self.body.radius {
            return;
        }
        let up = self.state.pos / r;
        let descent = -self.state.vel.dot(&up);
        if descent > CRASH_SPEED {
            warn!(descent, ut = self.state.time, "craft hit the ground");
            self.destroyed = true;
            return;
        }
        self.state.pos = up * self.body.radius;
        self.state.vel = Vector3::zeros();
        self.g_force = 1.0;
    }

    // -----------------------------------------------------------------------
    // Commands that are more than a field write
    // -----------------------------------------------------------------------

    pub(crate) fn set_throttle(&mut self, throttle: f64) -> VesselResult<()> {
        if !throttle.is_finite() {
            return Err(VesselError::Rejected {
                command: "set_throttle",
                reason: format!("throttle {throttle} is not a number"),
            });
        }
        self.throttle = throttle.clamp(0.0, 1.0);
        Ok(())
    }

    pub(crate) fn activate_next_stage(&mut self) -> VesselResult<()> {
        self.craft.activate_next_stage()?;
        debug!(stage = self.craft.current_stage, ut = self.state.time, "stage activated");
        Ok(())
    }

    pub(crate) fn set_physics_warp(&mut self, factor: u8) -> VesselResult<()> {
        if factor > PHYSICS_WARP_LIMIT {
            return Err(VesselError::Rejected {
                command: "set_physics_warp_factor",
                reason: format!("factor {factor} above {PHYSICS_WARP_LIMIT}"),
            });
        }
        self.physics_warp = factor;
        Ok(())
    }

    /// Coast on rails until `ut`. Only allowed above the atmosphere with the
    /// engines off.
    pub(crate) fn warp_to(&mut self, ut: f64) -> VesselResult<()> {
        if ut <= self.state.time {
            return Ok(());
        }
        if self.body.atmosphere.depth > 0.0 && self.body.atmosphere.contains(self.altitude()) {
            return Err(VesselError::Rejected {
                command: "warp_to",
                reason: "cannot warp on rails inside the atmosphere".into(),
            });
        }
        if self.craft.thrust_at(self.throttle) > 0.0 {
            return Err(VesselError::Rejected {
                command: "warp_to",
                reason: "cannot warp on rails under thrust".into(),
            });
        }
        info!(from = self.state.time, to = ut, "warping on rails");
        self.physics_warp = 0;
        self.state = propagate_to(&self.state, ut, RAILS_STEP, self.body.mu);
        if self.state.radius() < self.body.radius {
            warn!(ut, "trajectory intersects the surface during warp");
            self.destroyed = true;
        }
        Ok(())
    }
}
