use crate::vessel::{FuelType, ResourceLevel, StageResources, VesselError, VesselResult};

// ---------------------------------------------------------------------------
// Part group (everything that leaves the craft in one decouple stage)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PartGroup {
    pub name: String,
    pub dry_mass: f64,       // kg
    pub fuel_type: FuelType, // what the tanks hold and the engine burns
    pub fuel_capacity: f64,  // kg
    pub fuel: f64,           // kg remaining
    pub thrust: f64,         // N, vacuum, full throttle
    pub isp: f64,            // s
    pub cd_area: f64,        // m^2
    pub launch_clamp: bool,  // holds the craft on the pad while attached
    pub ignited: bool,
}

impl PartGroup {
    pub fn mass(&self) -> f64 {
        self.dry_mass + self.fuel
    }

    pub fn has_engine(&self) -> bool {
        self.thrust > 0.0 && self.isp > 0.0
    }

    /// Lit and not yet starved.
    pub fn is_firing(&self) -> bool {
        self.ignited && self.has_engine() && self.fuel > 0.0
    }

    /// Solid motors cannot be throttled.
    pub fn thrust_at(&self, throttle: f64) -> f64 {
        if !self.is_firing() {
            return 0.0;
        }
        match self.fuel_type {
            FuelType::SolidFuel => self.thrust,
            FuelType::LiquidFuel => self.thrust * throttle.clamp(0.0, 1.0),
        }
    }

    pub fn mass_flow(&self, throttle: f64, g0: f64) -> f64 {
        let thrust = self.thrust_at(throttle);
        if thrust > 0.0 {
            thrust / (self.isp * g0)
        } else {
            0.0
        }
    }

    pub fn resources(&self) -> StageResources {
        let mut res = StageResources::default();
        let level = ResourceLevel::new(self.fuel_capacity, self.fuel);
        match self.fuel_type {
            FuelType::LiquidFuel => res.liquid_fuel = level,
            FuelType::SolidFuel => res.solid_fuel = level,
        }
        res
    }

    /// Ideal delta-v of this group's engine pushing `payload_mass` on top.
    pub fn delta_v(&self, payload_mass: f64, g0: f64) -> f64 {
        if !self.has_engine() {
            return 0.0;
        }
        let m0 = self.dry_mass + self.fuel_capacity + payload_mass;
        let mf = self.dry_mass + payload_mass;
        self.isp * g0 * (m0 / mf).ln()
    }
}

// ---------------------------------------------------------------------------
// Stage builder
// ---------------------------------------------------------------------------

pub struct StageBuilder {
    name: String,
    dry_mass: f64,
    fuel_type: FuelType,
    fuel_capacity: f64,
    thrust: f64,
    isp: f64,
    cd_area: f64,
    launch_clamp: bool,
}

impl StageBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dry_mass: 100.0,
            fuel_type: FuelType::LiquidFuel,
            fuel_capacity: 0.0,
            thrust: 0.0,
            isp: 0.0,
            cd_area: 0.0,
            launch_clamp: false,
        }
    }

    pub fn dry_mass(mut self, v: f64) -> Self { self.dry_mass = v; self }
    pub fn liquid_fuel(mut self, kg: f64) -> Self { self.fuel_type = FuelType::LiquidFuel; self.fuel_capacity = kg; self }
    pub fn solid_fuel(mut self, kg: f64) -> Self { self.fuel_type = FuelType::SolidFuel; self.fuel_capacity = kg; self }
    pub fn engine(mut self, thrust: f64, isp: f64) -> Self { self.thrust = thrust; self.isp = isp; self }
    pub fn cd_area(mut self, v: f64) -> Self { self.cd_area = v; self }

    /// Ground support that stays behind on the pad.
    pub fn launch_clamp(mut self) -> Self {
        self.launch_clamp = true;
        self.dry_mass = 0.0;
        self
    }

    pub fn build(self) -> PartGroup {
        PartGroup {
            name: self.name,
            dry_mass: self.dry_mass,
            fuel_type: self.fuel_type,
            fuel_capacity: self.fuel_capacity,
            fuel: self.fuel_capacity,
            thrust: self.thrust,
            isp: self.isp,
            cd_area: self.cd_area,
            launch_clamp: self.launch_clamp,
            ignited: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Craft: part groups indexed by decouple stage
// ---------------------------------------------------------------------------

/// A staged vehicle.
///
/// `groups[s]` is dropped when stage `s` activates, which also lights the
/// engines of `groups[s - 1]`. The craft starts with `current_stage ==
/// groups.len()`, so the first activation releases the bottom group.
#[derive(Debug, Clone, PartialEq)]
pub struct Craft {
    pub name: String,
    pub groups: Vec<PartGroup>,
    pub payload_mass: f64,
    pub current_stage: i32,
}

impl Craft {
    pub fn attached(&self) -> impl Iterator<Item = &PartGroup> {
        let current = self.current_stage.max(0) as usize;
        self.groups.iter().take(current)
    }

    pub fn mass(&self) -> f64 {
        self.payload_mass + self.attached().map(PartGroup::mass).sum::<f64>()
    }

    pub fn clamped(&self) -> bool {
        self.attached().any(|g| g.launch_clamp)
    }

    pub fn cd_area(&self) -> f64 {
        self.attached().map(|g| g.cd_area).sum()
    }

    pub fn available_thrust(&self) -> f64 {
        self.attached()
            .filter(|g| g.is_firing())
            .map(|g| g.thrust)
            .sum()
    }

    /// Thrust-weighted Isp of the firing engines; 0 when none are.
    pub fn specific_impulse(&self) -> f64 {
        let (thrust, flow) = self
            .attached()
            .filter(|g| g.is_firing())
            .fold((0.0, 0.0), |(t, f), g| (t + g.thrust, f + g.thrust / g.isp));
        if flow > 0.0 {
            thrust / flow
        } else {
            0.0
        }
    }

    pub fn thrust_at(&self, throttle: f64) -> f64 {
        self.attached().map(|g| g.thrust_at(throttle)).sum()
    }

    pub fn mass_flow(&self, throttle: f64, g0: f64) -> f64 {
        self.attached().map(|g| g.mass_flow(throttle, g0)).sum()
    }

    /// Drain fuel for `dt` seconds of burning.
    pub fn burn(&mut self, throttle: f64, g0: f64, dt: f64) {
        let current = self.current_stage.max(0) as usize;
        for group in self.groups.iter_mut().take(current) {
            let used = group.mass_flow(throttle, g0) * dt;
            group.fuel = (group.fuel - used).max(0.0);
        }
    }

    /// Resources in the group decoupled by `stage`; empty once it is gone.
    pub fn stage_resources(&self, stage: i32) -> StageResources {
        if stage < 0 || stage >= self.current_stage {
            return StageResources::default();
        }
        self.groups
            .get(stage as usize)
            .map(PartGroup::resources)
            .unwrap_or_default()
    }

    pub fn activate_next_stage(&mut self) -> VesselResult<()> {
        if self.current_stage <= 0 {
            return Err(VesselError::NoActiveStage);
        }
        self.current_stage -= 1;
        if self.current_stage > 0 {
            if let Some(next) = self.groups.get_mut(self.current_stage as usize - 1) {
                next.ignited = true;
            }
        }
        Ok(())
    }

    /// Total ideal delta-v, each group computed with everything above it
    /// as payload.
    pub fn total_delta_v(&self, g0: f64) -> f64 {
        let mut dv = 0.0;
        for (i, group) in self.groups.iter().enumerate() {
            let payload = self.payload_mass + self.groups[..i].iter().map(|g| g.dry_mass + g.fuel_capacity).sum::<f64>();
            dv += group.delta_v(payload, g0);
        }
        dv
    }
}

// ---------------------------------------------------------------------------
// Craft builder
// ---------------------------------------------------------------------------

pub struct CraftBuilder {
    name: String,
    groups: Vec<PartGroup>,
    payload_mass: f64,
}

impl CraftBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: vec![],
            payload_mass: 0.0,
        }
    }

    pub fn payload(mut self, kg: f64) -> Self {
        self.payload_mass = kg;
        self
    }

    /// Add the next group, top down: the first call is stage 0, the last
    /// dropped.
    pub fn stage(mut self, group: PartGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn build(self) -> Craft {
        let current_stage = self.groups.len() as i32;
        Craft {
            name: self.name,
            groups: self.groups,
            payload_mass: self.payload_mass,
            current_stage,
        }
    }
}

// ---------------------------------------------------------------------------
// Preset craft
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    pub const NAMES: [&str; 2] = ["kestrel", "hornet"];

    /// Two liquid stages on launch clamps.
    pub fn kestrel() -> Craft {
        CraftBuilder::new("Kestrel")
            .payload(300.0)
            .stage(
                StageBuilder::new("K2-Upper")
                    .dry_mass(500.0)
                    .liquid_fuel(2_500.0)
                    .engine(60_000.0, 340.0)
                    .cd_area(0.5)
                    .build(),
            )
            .stage(
                StageBuilder::new("K1-Booster")
                    .dry_mass(1_500.0)
                    .liquid_fuel(9_000.0)
                    .engine(230_000.0, 290.0)
                    .cd_area(1.2)
                    .build(),
            )
            .stage(StageBuilder::new("Clamps").launch_clamp().build())
            .build()
    }

    /// Solid booster under a liquid upper stage.
    pub fn hornet() -> Craft {
        CraftBuilder::new("Hornet")
            .payload(250.0)
            .stage(
                StageBuilder::new("H2-Upper")
                    .dry_mass(500.0)
                    .liquid_fuel(3_000.0)
                    .engine(60_000.0, 340.0)
                    .cd_area(0.4)
                    .build(),
            )
            .stage(
                StageBuilder::new("H1-SRB")
                    .dry_mass(800.0)
                    .solid_fuel(3_500.0)
                    .engine(200_000.0, 250.0)
                    .cd_area(1.0)
                    .build(),
            )
            .stage(StageBuilder::new("Clamps").launch_clamp().build())
            .build()
    }

    pub fn by_name(name: &str) -> Option<Craft> {
        match name.to_ascii_lowercase().as_str() {
            "kestrel" => Some(kestrel()),
            "hornet" => Some(hornet()),
            _ => None,
        }
    }
}
