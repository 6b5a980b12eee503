use crate::orbital::maneuvers;
use crate::vessel::{ManeuverNode, Vessel, VesselResult};

/// The next maneuver node and how long it takes to execute at full thrust.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedBurn {
    pub node: ManeuverNode,
    pub burn_time: f64,
}

impl PlannedBurn {
    /// Universal time at which the engines should light so the burn is
    /// centred on the node.
    pub fn ignition_ut(&self) -> f64 {
        self.node.ut - 0.5 * self.burn_time
    }
}

/// Burn plan for the first maneuver node, from live mass, thrust and Isp.
///
/// `Ok(None)` when there is no node or the vehicle cannot produce thrust
/// right now; both are transient and callers fall back locally.
pub fn plan_next_burn(vessel: &dyn Vessel) -> VesselResult<Option<PlannedBurn>> {
    let Some(node) = vessel.nodes()?.into_iter().next() else {
        return Ok(None);
    };
    let burn_time = maneuvers::burn_time(
        vessel.mass()?,
        vessel.available_thrust()?,
        vessel.specific_impulse()?,
        node.delta_v(),
        vessel.surface_gravity()?,
    );
    Ok(burn_time.map(|burn_time| PlannedBurn { node, burn_time }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessel::mock::{MockState, MockVessel};

    #[test]
    fn no_node_means_no_plan() {
        let vessel = MockVessel::default();
        assert_eq!(plan_next_burn(&vessel).unwrap(), None);
    }

    #[test]
    fn no_thrust_means_no_plan() {
        let vessel = MockVessel::new(MockState {
            available_thrust: 0.0,
            nodes: vec![ManeuverNode::new(1_060.0, 800.0)],
            ..Default::default()
        });
        assert_eq!(plan_next_burn(&vessel).unwrap(), None);
    }

    #[test]
    fn plans_first_node() {
        let vessel = MockVessel::new(MockState {
            nodes: vec![
                ManeuverNode::new(1_060.0, 800.0),
                ManeuverNode::new(2_000.0, 10.0),
            ],
            ..Default::default()
        });
        let plan = plan_next_burn(&vessel).unwrap().unwrap();
        assert_eq!(plan.node.ut, 1_060.0);
        let expected =
            maneuvers::burn_time(10_000.0, 200_000.0, 300.0, 800.0, 9.81).unwrap();
        assert!((plan.burn_time - expected).abs() < 1e-12);
        assert!((plan.ignition_ut() - (1_060.0 - expected / 2.0)).abs() < 1e-12);
    }

    #[test]
    fn retrograde_node_uses_magnitude() {
        let vessel = MockVessel::new(MockState {
            nodes: vec![ManeuverNode::new(1_060.0, -300.0)],
            ..Default::default()
        });
        let plan = plan_next_burn(&vessel).unwrap().unwrap();
        assert!(plan.burn_time > 0.0);
    }

    #[test]
    fn read_failure_propagates() {
        let vessel = MockVessel::new(MockState {
            nodes: vec![ManeuverNode::new(1_060.0, 800.0)],
            ..Default::default()
        });
        vessel.arm_fault();
        assert!(plan_next_burn(&vessel).is_err());
    }
}
