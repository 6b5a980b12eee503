use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use thiserror::Error;

use super::MissionParameters;
use crate::gnc::{
    Controller, FinalizeController, GuidanceController, StagingController, ThrottleController,
    WarpController,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown controller role `{0}` (expected one of guidance, throttle, staging, warp, finalize)")]
    UnknownRole(String),
}

/// The five controller slots, in the order they run each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControllerRole {
    Guidance,
    Throttle,
    Staging,
    Warp,
    Finalize,
}

impl ControllerRole {
    pub const ALL: [ControllerRole; 5] = [
        ControllerRole::Guidance,
        ControllerRole::Throttle,
        ControllerRole::Staging,
        ControllerRole::Warp,
        ControllerRole::Finalize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ControllerRole::Guidance => "guidance",
            ControllerRole::Throttle => "throttle",
            ControllerRole::Staging => "staging",
            ControllerRole::Warp => "warp",
            ControllerRole::Finalize => "finalize",
        }
    }
}

impl fmt::Display for ControllerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControllerRole {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControllerRole::ALL
            .into_iter()
            .find(|role| role.name() == s)
            .ok_or_else(|| RegistryError::UnknownRole(s.to_string()))
    }
}

/// Builds a controller for one mission.
pub type ControllerFactory = Box<dyn Fn(Rc<MissionParameters>) -> Box<dyn Controller>>;

/// Role -> implementation table, consulted once when a mission is built.
///
/// Starts out with the built-in controller for every role; `register`
/// swaps one out.
pub struct ControllerRegistry {
    factories: BTreeMap<ControllerRole, ControllerFactory>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: BTreeMap::new(),
        };
        registry.replace(ControllerRole::Guidance, |p| {
            Box::new(GuidanceController::new(p))
        });
        registry.replace(ControllerRole::Throttle, |p| {
            Box::new(ThrottleController::new(p))
        });
        registry.replace(ControllerRole::Staging, |p| {
            Box::new(StagingController::new(p))
        });
        registry.replace(ControllerRole::Warp, |_| Box::new(WarpController::new()));
        registry.replace(ControllerRole::Finalize, |p| {
            Box::new(FinalizeController::new(p))
        });
        registry
    }

    /// Replace the controller for the role called `name`.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(Rc<MissionParameters>) -> Box<dyn Controller> + 'static,
    {
        let role: ControllerRole = name.parse()?;
        self.replace(role, factory);
        Ok(())
    }

    pub fn replace<F>(&mut self, role: ControllerRole, factory: F)
    where
        F: Fn(Rc<MissionParameters>) -> Box<dyn Controller> + 'static,
    {
        self.factories.insert(role, Box::new(factory));
    }

    /// Instantiate every role, in run order.
    pub fn build(&self, params: &Rc<MissionParameters>) -> Vec<(ControllerRole, Box<dyn Controller>)> {
        self.factories
            .iter()
            .map(|(role, factory)| (*role, factory(Rc::clone(params))))
            .collect()
    }
}

impl Default for ControllerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
