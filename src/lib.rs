//! Autonomous launch-to-orbit flight control.
//!
//! [`mission::MissionControl`] runs a fixed-rate loop over a
//! [`vessel::Vessel`], moving through the ascent phases and driving the
//! guidance, throttle, staging, warp and finalize controllers from
//! [`gnc`]. The bundled [`sim`] module provides a simulated vessel to fly.

pub mod config;
pub mod gnc;
pub mod io;
pub mod mission;
pub mod orbital;
pub mod physics;
pub mod sim;
pub mod vessel;
