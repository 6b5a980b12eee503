//! In-process flight simulator.
//!
//! A point-mass craft over a spherical, non-rotating body with an
//! exponential atmosphere, integrated with RK4 at a fixed step. The
//! simulator implements [`Vessel`](crate::vessel::Vessel) and
//! [`Clock`](crate::mission::Clock), so the mission loop flies it exactly
//! as it would fly a remote game.

pub mod body;
pub mod craft;
pub mod integrator;
pub mod vessel;
pub mod world;

use std::cell::RefCell;
use std::rc::Rc;

pub use body::Body;
pub use craft::{presets, Craft, CraftBuilder, PartGroup, StageBuilder};
pub use integrator::rk4_step;
pub use vessel::{SimClock, SimVessel};
pub use world::SimWorld;

/// Put `craft` on the pad of `body` and hand out the two views of it the
/// mission loop needs.
pub fn new_flight(body: Body, craft: Craft) -> (SimVessel, SimClock) {
    let world = Rc::new(RefCell::new(SimWorld::on_pad(body, craft)));
    (SimVessel::new(Rc::clone(&world)), SimClock::new(world))
}
