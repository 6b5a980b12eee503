use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use super::world::SimWorld;
use crate::mission::Clock;
use crate::vessel::{
    AttitudeTarget, ManeuverNode, SasMode, StageResources, Vessel, VesselError, VesselResult,
};

/// [`Vessel`] backed by the in-process simulator.
///
/// Shares its [`SimWorld`] with the [`SimClock`] of the same flight, so
/// commands issued here take effect when the clock advances.
#[derive(Debug, Clone)]
pub struct SimVessel {
    world: Rc<RefCell<SimWorld>>,
}

impl SimVessel {
    pub fn new(world: Rc<RefCell<SimWorld>>) -> Self {
        Self { world }
    }

    pub fn world(&self) -> Ref<'_, SimWorld> {
        self.world.borrow()
    }

    fn read<T>(&self, f: impl FnOnce(&SimWorld) -> T) -> VesselResult<T> {
        let world = self.world.borrow();
        world.ensure_intact()?;
        Ok(f(&world))
    }

    fn write<T>(&mut self, f: impl FnOnce(&mut SimWorld) -> VesselResult<T>) -> VesselResult<T> {
        let mut world = self.world.borrow_mut();
        world.ensure_intact()?;
        f(&mut world)
    }
}

impl Vessel for SimVessel {
    fn ut(&self) -> VesselResult<f64> {
        self.read(SimWorld::ut)
    }

    fn apoapsis_altitude(&self) -> VesselResult<f64> {
        self.read(|w| w.elements().apoapsis_radius() - w.body.radius)
    }

    fn periapsis_altitude(&self) -> VesselResult<f64> {
        self.read(|w| w.elements().periapsis_radius() - w.body.radius)
    }

    fn apoapsis_radius(&self) -> VesselResult<f64> {
        self.read(|w| w.elements().apoapsis_radius())
    }

    fn periapsis_radius(&self) -> VesselResult<f64> {
        self.read(|w| w.elements().periapsis_radius())
    }

    fn semi_major_axis(&self) -> VesselResult<f64> {
        self.read(|w| w.elements().sma)
    }

    fn orbital_speed(&self) -> VesselResult<f64> {
        self.read(|w| w.state().speed())
    }

    fn inclination(&self) -> VesselResult<f64> {
        self.read(|w| w.elements().inc)
    }

    fn time_to_apoapsis(&self) -> VesselResult<f64> {
        self.read(|w| w.elements().time_to_apoapsis(w.body.mu))
    }

    fn time_to_periapsis(&self) -> VesselResult<f64> {
        self.read(|w| w.elements().time_to_periapsis(w.body.mu))
    }

    fn gravitational_parameter(&self) -> VesselResult<f64> {
        self.read(|w| w.body.mu)
    }

    fn surface_gravity(&self) -> VesselResult<f64> {
        self.read(|w| w.body.surface_gravity)
    }

    fn atmosphere_depth(&self) -> VesselResult<f64> {
        self.read(|w| w.body.atmosphere.depth)
    }

    fn mean_altitude(&self) -> VesselResult<f64> {
        self.read(SimWorld::altitude)
    }

    fn vertical_speed(&self) -> VesselResult<f64> {
        self.read(SimWorld::vertical_speed)
    }

    fn latitude(&self) -> VesselResult<f64> {
        self.read(SimWorld::latitude)
    }

    fn longitude(&self) -> VesselResult<f64> {
        self.read(SimWorld::longitude)
    }

    fn dynamic_pressure(&self) -> VesselResult<f64> {
        self.read(SimWorld::dynamic_pressure)
    }

    fn g_force(&self) -> VesselResult<f64> {
        self.read(SimWorld::g_force)
    }

    fn mass(&self) -> VesselResult<f64> {
        self.read(|w| w.craft.mass())
    }

    fn available_thrust(&self) -> VesselResult<f64> {
        self.read(|w| w.craft.available_thrust())
    }

    fn specific_impulse(&self) -> VesselResult<f64> {
        self.read(|w| w.craft.specific_impulse())
    }

    fn current_stage(&self) -> VesselResult<i32> {
        self.read(|w| w.craft.current_stage)
    }

    fn stage_resources(&self, stage: i32) -> VesselResult<StageResources> {
        self.read(|w| w.craft.stage_resources(stage))
    }

    fn throttle(&self) -> VesselResult<f64> {
        self.read(|w| w.throttle)
    }

    fn set_throttle(&mut self, throttle: f64) -> VesselResult<()> {
        self.write(|w| w.set_throttle(throttle))
    }

    fn sas_enabled(&self) -> VesselResult<bool> {
        self.read(|w| w.sas)
    }

    fn set_sas(&mut self, enabled: bool) -> VesselResult<()> {
        self.write(|w| {
            w.sas = enabled;
            Ok(())
        })
    }

    fn sas_mode(&self) -> VesselResult<SasMode> {
        self.read(|w| w.sas_mode)
    }

    fn set_sas_mode(&mut self, mode: SasMode) -> VesselResult<()> {
        self.write(|w| {
            w.sas_mode = mode;
            Ok(())
        })
    }

    fn engage_autopilot(&mut self, target: AttitudeTarget) -> VesselResult<()> {
        if !(target.pitch.is_finite() && target.heading.is_finite()) {
            return Err(VesselError::Rejected {
                command: "engage_autopilot",
                reason: format!("non-finite target {target:?}"),
            });
        }
        self.write(|w| {
            w.sas = false;
            w.autopilot = Some(target);
            Ok(())
        })
    }

    fn disengage_autopilot(&mut self) -> VesselResult<()> {
        self.write(|w| {
            w.autopilot = None;
            Ok(())
        })
    }

    fn activate_next_stage(&mut self) -> VesselResult<()> {
        self.write(SimWorld::activate_next_stage)
    }

    fn nodes(&self) -> VesselResult<Vec<ManeuverNode>> {
        self.read(|w| w.nodes.clone())
    }

    fn add_node(&mut self, node: ManeuverNode) -> VesselResult<()> {
        self.write(|w| {
            w.nodes.push(node);
            w.nodes.sort_by(|a, b| a.ut.total_cmp(&b.ut));
            Ok(())
        })
    }

    fn remove_nodes(&mut self) -> VesselResult<()> {
        self.write(|w| {
            w.nodes.clear();
            Ok(())
        })
    }

    fn physics_warp_factor(&self) -> VesselResult<u8> {
        self.read(|w| w.physics_warp)
    }

    fn set_physics_warp_factor(&mut self, factor: u8) -> VesselResult<()> {
        self.write(|w| w.set_physics_warp(factor))
    }

    fn warp_to(&mut self, ut: f64) -> VesselResult<()> {
        self.write(|w| w.warp_to(ut))
    }

    fn set_solar_panels(&mut self, deployed: bool) -> VesselResult<()> {
        self.write(|w| {
            w.solar_panels = deployed;
            Ok(())
        })
    }
}

/// [`Clock`] that drives the simulator: sleeping advances physics.
///
/// With `realtime` set, each sleep also blocks the thread for the same
/// wall time so the flight can be watched.
#[derive(Debug, Clone)]
pub struct SimClock {
    world: Rc<RefCell<SimWorld>>,
    realtime: bool,
}

impl SimClock {
    pub fn new(world: Rc<RefCell<SimWorld>>) -> Self {
        Self {
            world,
            realtime: false,
        }
    }

    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }
}

impl Clock for SimClock {
    fn now(&self) -> Duration {
        self.world.borrow().elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        self.world.borrow_mut().advance(duration);
        if self.realtime {
            std::thread::sleep(duration);
        }
    }
}
