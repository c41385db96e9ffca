//! Simulation engine - main entry point for running the room

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::*;
use crate::config::{ConfigError, ConfigIssue, SceneSpec, SimConfig};
use crate::context::{DayClock, FlatRoom, Projector, SimContext};
use crate::effects::{Effect, Effects};
use crate::schedule::{TickDriver, TickRegime};
use crate::systems::*;

/// Entities created by [`SimulationEngine::build_scene`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneEntities {
    pub furniture: Vec<Entity>,
    pub pets: Vec<Entity>,
    pub appliances: Vec<Entity>,
}

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world: furniture registry plus agent components
    pub world: World,
    config: SimConfig,
    room: FlatRoom,
    clock: DayClock,
    rng: StdRng,
    effects: Effects,
    driver: TickDriver,
    /// Simulated seconds since start
    sim_time: f64,
}

impl SimulationEngine {
    /// Create an empty room with default settings
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            room: config.room,
            clock: config.clock,
            rng: StdRng::seed_from_u64(config.seed),
            effects: Effects::new(),
            driver: TickDriver::new(config.schedule),
            sim_time: 0.0,
            config,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &DayClock {
        &self.clock
    }

    pub fn set_hour(&mut self, hour: f32) {
        self.clock.hour = hour.rem_euclid(24.0);
    }

    /// Simulated seconds since start
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Populate the room from a scene description
    pub fn build_scene(&mut self, scene: &SceneSpec) -> Result<SceneEntities, ConfigError> {
        let configs = scene
            .furniture
            .iter()
            .map(|placement| placement.resolve())
            .collect::<Result<Vec<_>, ConfigIssue>>()
            .map_err(|issue| ConfigError::Invalid(vec![issue]))?;

        let mut spawned = SceneEntities::default();
        for (placement, config) in scene.furniture.iter().zip(configs) {
            let entity = self.place_furniture(config, placement.position(), placement.rotation);
            if placement.tipped {
                self.set_box_tipped(entity, true);
            }
            spawned.furniture.push(entity);
        }
        for spawn in &scene.pets {
            let position = Vec3::ground(spawn.x, spawn.z);
            let mut pet = match spawn.patience {
                Some(patience) => Pet::new(position, patience),
                None => Pet::spawn(position, &mut self.rng),
            }
            .with_decay(self.config.needs);
            if let Some(needs) = spawn.needs {
                pet = pet.with_needs(Needs::new(needs.hunger, needs.toilet));
            }
            spawned.pets.push(self.spawn_pet_with(pet));
        }
        for spawn in &scene.appliances {
            spawned
                .appliances
                .push(self.spawn_appliance(Vec3::ground(spawn.x, spawn.z), spawn.facing));
        }

        log::info!(
            "scene built: {} furniture, {} pets, {} appliances",
            spawned.furniture.len(),
            spawned.pets.len(),
            spawned.appliances.len()
        );
        Ok(spawned)
    }

    pub fn place_furniture(&mut self, config: FurnitureConfig, position: Vec3, rotation: f32) -> Entity {
        self.world
            .spawn((Furniture::new(config), Transform::new(position, rotation)))
    }

    /// Remove an item from the registry. Agents referencing it recover on
    /// their next tick.
    pub fn remove_furniture(&mut self, entity: Entity) -> bool {
        if self.world.get::<&Furniture>(entity).is_err() {
            return false;
        }
        self.world.despawn(entity).is_ok()
    }

    pub fn set_furniture_visible(&mut self, entity: Entity, visible: bool) -> bool {
        match self.world.get::<&mut Furniture>(entity) {
            Ok(mut furniture) => {
                furniture.visible = visible;
                true
            }
            Err(_) => false,
        }
    }

    pub fn set_box_tipped(&mut self, entity: Entity, tipped: bool) -> bool {
        match self.world.get::<&mut Furniture>(entity) {
            Ok(mut furniture) if furniture.config.is_box => {
                furniture.tipped = tipped;
                true
            }
            _ => false,
        }
    }

    /// Spawn a pet with random patience
    pub fn spawn_pet(&mut self, position: Vec3) -> Entity {
        let pet = Pet::spawn(position, &mut self.rng).with_decay(self.config.needs);
        self.spawn_pet_with(pet)
    }

    pub fn spawn_pet_with(&mut self, pet: Pet) -> Entity {
        self.world.spawn((pet,))
    }

    /// Spawn a robot vacuum: a vehicle furniture item that drives itself
    pub fn spawn_appliance(&mut self, position: Vec3, facing: f32) -> Entity {
        let appliance = Appliance::new(position, facing, self.config.appliance);
        self.world.spawn((
            Furniture::new(FurnitureConfig::robot_vacuum()),
            Transform::new(position, appliance.facing),
            appliance,
        ))
    }

    pub fn pets(&self) -> Vec<Entity> {
        self.world.query::<&Pet>().iter().map(|(e, _)| e).collect()
    }

    pub fn appliances(&self) -> Vec<Entity> {
        self.world.query::<&Appliance>().iter().map(|(e, _)| e).collect()
    }

    pub fn furniture_entities(&self) -> Vec<Entity> {
        self.world.query::<&Furniture>().iter().map(|(e, _)| e).collect()
    }

    pub fn pet_state(&self, pet: Entity) -> Option<PetState> {
        self.world.get::<&Pet>(pet).ok().map(|p| p.state())
    }

    pub fn appliance_phase(&self, appliance: Entity) -> Option<(Phase, SubState)> {
        self.world
            .get::<&Appliance>(appliance)
            .ok()
            .map(|a| (a.phase(), a.sub_state()))
    }

    /// Run `advance` for `elapsed` wall-clock seconds under `regime`.
    /// Returns the number of fixed steps simulated.
    pub fn advance(&mut self, elapsed: f32, regime: TickRegime) -> u32 {
        let steps = self.driver.advance(elapsed, regime);
        let step = self.driver.step_size();
        for _ in 0..steps {
            self.update(step);
        }
        steps
    }

    /// One simulation tick. `dt` is clamped to the configured maximum.
    pub fn update(&mut self, dt: f32) {
        let dt = self.driver.clamp_dt(dt);
        self.sim_time += dt as f64;
        self.clock.advance(dt);

        self.update_appliances(dt);
        self.update_pets(dt);
        self.sync_riders();
    }

    fn update_appliances(&mut self, dt: f32) {
        let appliances: Vec<Entity> = self
            .world
            .query::<(&Appliance, &Furniture)>()
            .iter()
            .filter(|(_, (_, furniture))| furniture.visible)
            .map(|(e, _)| e)
            .collect();

        for entity in appliances {
            let pose = {
                let Ok(mut appliance) = self.world.get::<&mut Appliance>(entity) else {
                    continue;
                };
                let mut ctx = SimContext::new(
                    &self.world,
                    &self.room,
                    &self.clock,
                    &mut self.rng,
                    &mut self.effects,
                );
                appliance.update(&mut ctx, entity, dt);
                (appliance.position, appliance.facing)
            };
            if let Ok(mut transform) = self.world.get::<&mut Transform>(entity) {
                transform.position = pose.0;
                transform.rotation = pose.1;
            }
        }
    }

    fn update_pets(&mut self, dt: f32) {
        let pets = self.pets();
        for entity in pets {
            let Ok(mut pet) = self.world.get::<&mut Pet>(entity) else {
                continue;
            };
            let mut ctx = SimContext::new(
                &self.world,
                &self.room,
                &self.clock,
                &mut self.rng,
                &mut self.effects,
            );
            pet.update(&mut ctx, entity, dt);
        }
    }

    /// Carry riders along with their vehicles; drop riders that no longer
    /// exist or have stepped off.
    fn sync_riders(&mut self) {
        let vehicles: Vec<(Entity, Entity, Vec3, f32)> = self
            .world
            .query::<&Appliance>()
            .iter()
            .filter_map(|(e, a)| a.rider().map(|rider| (e, rider, a.position, a.facing)))
            .collect();

        for (vehicle, rider, position, facing) in vehicles {
            let seated = match self.world.get::<&mut Pet>(rider) {
                Ok(mut pet) if pet.riding() == Some(vehicle) => {
                    pet.follow_vehicle(position, facing);
                    true
                }
                _ => false,
            };
            if !seated {
                if let Ok(mut appliance) = self.world.get::<&mut Appliance>(vehicle) {
                    appliance.dismount();
                }
            }
        }
    }

    /// The player pets `pet`. `None` if the entity isn't a pet.
    pub fn pet(&mut self, pet: Entity) -> Option<PetResponse> {
        let mut agent = self.world.get::<&mut Pet>(pet).ok()?;
        let mut ctx = SimContext::new(&self.world, &self.room, &self.clock, &mut self.rng, &mut self.effects);
        Some(agent.pet(&mut ctx))
    }

    pub fn set_dragged(&mut self, pet: Entity, dragged: bool) -> bool {
        let Ok(mut agent) = self.world.get::<&mut Pet>(pet) else {
            return false;
        };
        let mut ctx = SimContext::new(&self.world, &self.room, &self.clock, &mut self.rng, &mut self.effects);
        agent.set_dragged(&mut ctx, dragged)
    }

    pub fn drag_pet_to(&mut self, pet: Entity, point: Vec3) {
        if let Ok(mut agent) = self.world.get::<&mut Pet>(pet) {
            agent.drag_to(point);
        }
    }

    /// Play a sound at `point`; returns how many pets came to look.
    pub fn react_to_sound(&mut self, point: Vec3) -> usize {
        let mut reacted = 0;
        for entity in self.pets() {
            let Ok(mut agent) = self.world.get::<&mut Pet>(entity) else {
                continue;
            };
            let mut ctx = SimContext::new(&self.world, &self.room, &self.clock, &mut self.rng, &mut self.effects);
            if agent.react_to_sound(&mut ctx, point) {
                reacted += 1;
            }
        }
        reacted
    }

    pub fn start_begging(&mut self, pet: Entity) -> bool {
        let Ok(mut agent) = self.world.get::<&mut Pet>(pet) else {
            return false;
        };
        let mut ctx = SimContext::new(&self.world, &self.room, &self.clock, &mut self.rng, &mut self.effects);
        agent.start_begging(&mut ctx)
    }

    /// Player clicked an item. `Some(true)` when a refill confirmation
    /// should be shown.
    pub fn interact(&self, item: Entity) -> Option<bool> {
        self.world.get::<&Furniture>(item).ok().map(|f| f.interact())
    }

    /// Confirmed refill, paid for by `economy`.
    pub fn refill(&mut self, item: Entity, economy: &mut dyn Economy) -> Option<RefillOutcome> {
        let at = self.world.get::<&Transform>(item).ok()?.position;
        let mut furniture = self.world.get::<&mut Furniture>(item).ok()?;
        Some(furniture.apply_refill(economy, at, &mut self.effects))
    }

    /// Take every effect queued since the last drain
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.effects.drain()
    }

    pub fn pending_effects(&self) -> &Effects {
        &self.effects
    }

    /// Screen position for a pet's speech bubble
    pub fn speech_bubble_position(&self, pet: Entity, projector: &dyn Projector) -> Option<(f32, f32)> {
        let anchor = self.world.get::<&Pet>(pet).ok()?.bubble_anchor();
        projector.world_to_screen(anchor)
    }

    /// Save the room to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), crate::persistence::SaveError> {
        crate::persistence::save_simulation(writer, &self.world, self.clock.hour, self.sim_time)
    }

    /// Load a room from a reader, replacing the current one
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), crate::persistence::SaveError> {
        let loaded = crate::persistence::load_simulation(reader)?;
        self.world = loaded.world;
        self.clock.hour = loaded.hour;
        self.sim_time = loaded.sim_time;
        self.driver = TickDriver::new(self.config.schedule);
        self.effects = Effects::new();
        Ok(())
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}
