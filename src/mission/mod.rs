//! Mission layer: phases, parameters, the controller registry and the
//! fixed-rate loop that ties them to a vehicle.

pub mod clock;
pub mod params;
pub mod phase;
pub mod registry;
pub mod runner;

pub use clock::{Clock, SystemClock};
pub use params::{LoopSettings, MissionParameters, ParamsError};
pub use phase::Phase;
pub use registry::{ControllerFactory, ControllerRegistry, ControllerRole, RegistryError};
pub use runner::{MissionControl, MissionError};
