pub mod elements;
pub mod maneuvers;
pub mod propagator;

pub use elements::KeplerianElements;
pub use maneuvers::{burn_time, circularization_delta_v};
pub use propagator::{propagate_to, OrbitalState};
