//! Guidance, navigation and control: the five controller roles that fly
//! the ascent, and the trait they share.

pub mod burn;
pub mod controller;
pub mod finalize;
pub mod guidance;
pub mod staging;
pub mod throttle;
pub mod warp;

pub use burn::{plan_next_burn, PlannedBurn};
pub use controller::{Controller, FlightContext};
pub use finalize::FinalizeController;
pub use guidance::{inc_to_heading, pitch_program, GuidanceController};
pub use staging::StagingController;
pub use throttle::ThrottleController;
pub use warp::WarpController;
