//! Pet behavior - needs-driven goal selection over a small state machine.
//!
//! Each tick the pet decays its needs, drops any furniture reference that
//! has gone stale, then runs the handler for its current state. Goal
//! selection lives in `goals`, player-facing entry points in `social`.

mod goals;
mod social;

pub use social::{PetResponse, Refusal};

use hecs::Entity;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::appliance::Appliance;
use super::spatial::Spatial;
use super::steering::{ObstacleSensor, SteerOutcome, Steering, WALK_SPEED};
use crate::components::{
    normalize_angle, DecayRates, Furniture, NeedKind, Needs, Vec3, NEED_CRITICAL, NEED_URGENT,
};
use crate::context::SimContext;
use crate::effects::{DiaryEvent, Emote, Sound};

/// Footprint radius used when standing flush against furniture
pub const PET_RADIUS: f32 = 0.2;
pub const EAT_DURATION: f32 = 5.0;
pub const POOP_DURATION: f32 = 4.0;
pub const JUMP_DURATION: f32 = 0.6;
/// Apex of the jump arc above the straight line
pub const JUMP_HEIGHT: f32 = 0.5;
pub const BOX_PLAY_DURATION: f32 = 8.0;
pub const PETTING_TIMEOUT: f32 = 2.0;
/// Fifteen minutes of sulking
pub const ANGER_COOLDOWN: f32 = 900.0;
pub const MEOW_COOLDOWN: f32 = 10.0;
/// Fraction of the gap to the surface closed per tick
pub const GROUND_SNAP_RATE: f32 = 0.2;
/// Seat height above a ridden vehicle
pub const RIDE_HEIGHT: f32 = 0.25;
/// Idle pause after an interruption
pub const SETTLE_TIME: f32 = 0.5;
/// Idle pause after being put down
pub const DROP_SETTLE_TIME: f32 = 1.0;
/// Speech bubble offset above the pet's position
pub const BUBBLE_HEIGHT: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PetState {
    Idle,
    Walking,
    Eating,
    Pooping,
    Sleeping,
    Interacting,
    Jumping,
    Petting,
    Angry,
    Begging,
    Dragged,
}

impl PetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PetState::Idle => "idle",
            PetState::Walking => "walking",
            PetState::Eating => "eating",
            PetState::Pooping => "pooping",
            PetState::Sleeping => "sleeping",
            PetState::Interacting => "interacting",
            PetState::Jumping => "jumping",
            PetState::Petting => "petting",
            PetState::Angry => "angry",
            PetState::Begging => "begging",
            PetState::Dragged => "dragged",
        }
    }
}

impl std::fmt::Display for PetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do on arrival, beyond the target's own affordances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PendingAction {
    #[default]
    None,
    Eat,
    Poop,
    /// Walk to a point of interest and look around
    Inspect,
}

/// The furniture the pet is bound to. One variant at a time, so the pet
/// can never be approaching one item while engaged with another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Target {
    #[default]
    None,
    Approaching(Entity),
    Engaged(Entity),
}

impl Target {
    fn entity(&self) -> Option<Entity> {
        match *self {
            Target::None => None,
            Target::Approaching(e) | Target::Engaged(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct JumpArc {
    from: Vec3,
    to: Vec3,
    elapsed: f32,
}

/// Pet agent component
#[derive(Debug, Clone)]
pub struct Pet {
    pub position: Vec3,
    /// Yaw in radians, 0 faces +z
    pub facing: f32,
    pub stats: Needs,
    decay: DecayRates,
    state: PetState,
    target: Target,
    /// Last item chosen as a goal, skipped by the next selection
    previous_target: Option<Entity>,
    pending: PendingAction,
    steering: Steering,
    /// Countdown for the current state
    timer: f32,
    sleep_timer: f32,
    anger_timer: f32,
    meow_cooldown: f32,
    pet_count: u32,
    patience: u32,
    jump: Option<JumpArc>,
    riding: Option<Entity>,
    goals_abandoned: u32,
}

impl Pet {
    pub fn new(position: Vec3, patience: u32) -> Self {
        Self {
            position,
            facing: 0.0,
            stats: Needs::default(),
            decay: DecayRates::default(),
            state: PetState::Idle,
            target: Target::None,
            previous_target: None,
            pending: PendingAction::None,
            steering: Steering::new(),
            timer: 1.0,
            sleep_timer: 0.0,
            anger_timer: 0.0,
            meow_cooldown: 0.0,
            pet_count: 0,
            patience,
            jump: None,
            riding: None,
            goals_abandoned: 0,
        }
    }

    /// New pet with a random patience threshold and a staggered first goal.
    pub fn spawn(position: Vec3, rng: &mut impl Rng) -> Self {
        let mut pet = Self::new(position, rng.gen_range(5..=10));
        pet.timer = rng.gen_range(0.5..2.0);
        pet
    }

    pub fn with_needs(mut self, stats: Needs) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_decay(mut self, decay: DecayRates) -> Self {
        self.decay = decay;
        self
    }

    pub fn decay(&self) -> DecayRates {
        self.decay
    }

    pub fn state(&self) -> PetState {
        self.state
    }

    /// Furniture the pet is currently engaged with
    pub fn interact_target(&self) -> Option<Entity> {
        match self.target {
            Target::Engaged(e) => Some(e),
            _ => None,
        }
    }

    /// Furniture the pet is walking toward
    pub fn target_furniture(&self) -> Option<Entity> {
        match self.target {
            Target::Approaching(e) => Some(e),
            _ => None,
        }
    }

    pub fn previous_target(&self) -> Option<Entity> {
        self.previous_target
    }

    pub fn pending_action(&self) -> PendingAction {
        self.pending
    }

    pub fn steering(&self) -> &Steering {
        &self.steering
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn anger_remaining(&self) -> f32 {
        self.anger_timer
    }

    pub fn pet_count(&self) -> u32 {
        self.pet_count
    }

    pub fn patience(&self) -> u32 {
        self.patience
    }

    pub fn riding(&self) -> Option<Entity> {
        self.riding
    }

    pub fn is_riding(&self) -> bool {
        self.riding.is_some()
    }

    pub fn goals_abandoned(&self) -> u32 {
        self.goals_abandoned
    }

    /// World-space anchor for the speech bubble
    pub fn bubble_anchor(&self) -> Vec3 {
        self.position + Vec3::UP * BUBBLE_HEIGHT
    }

    /// Seat the pet on a moving vehicle. Called by the engine after the
    /// vehicle has moved.
    pub fn follow_vehicle(&mut self, position: Vec3, facing: f32) {
        if self.riding.is_some() {
            self.position = position + Vec3::UP * RIDE_HEIGHT;
            self.facing = normalize_angle(facing + std::f32::consts::PI);
        }
    }

    /// Advance the pet by `dt` seconds. `me` is the pet's own entity.
    pub fn update(&mut self, ctx: &mut SimContext, me: Entity, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.stats.decay(dt, &self.decay);
        self.meow_cooldown = (self.meow_cooldown - dt).max(0.0);

        if !self.references_live(&ctx.spatial()) {
            log::debug!("pet {:?}: furniture vanished while {}", me, self.state);
            self.interrupt(ctx);
        }

        match self.state {
            PetState::Idle => self.tick_idle(ctx, dt),
            PetState::Walking => self.tick_walking(ctx, me, dt),
            PetState::Eating => self.tick_using(ctx, dt, NeedKind::Hunger),
            PetState::Pooping => self.tick_using(ctx, dt, NeedKind::Toilet),
            PetState::Sleeping => self.tick_sleeping(ctx, dt),
            PetState::Interacting => self.tick_interacting(ctx, dt),
            PetState::Jumping => self.tick_jumping(dt),
            PetState::Petting => self.tick_petting(dt),
            PetState::Angry => self.tick_angry(ctx, dt),
            PetState::Begging => self.tick_begging(ctx),
            PetState::Dragged => {}
        }

        if !self.position.is_finite() {
            log::warn!("pet {:?}: non-finite position, resetting", me);
            self.position = ctx.spatial().clamp_to_room(Vec3::ZERO, 0.0);
            self.interrupt(ctx);
        }

        if !matches!(self.state, PetState::Jumping | PetState::Dragged) && self.riding.is_none() {
            let surface = ctx.spatial().surface_height(self.position, None);
            self.position.y += (surface - self.position.y) * GROUND_SNAP_RATE;
        }
    }

    fn references_live(&self, spatial: &Spatial) -> bool {
        let target_ok = self.target.entity().map_or(true, |e| spatial.is_live(e));
        let vehicle_ok = self.riding.map_or(true, |e| spatial.is_live(e));
        target_ok && vehicle_ok
    }

    /// Drop whatever the pet was doing and settle.
    fn interrupt(&mut self, ctx: &mut SimContext) {
        self.clear_goal(ctx);
        self.enter_idle(SETTLE_TIME);
    }

    /// Forget target, pending action, path and jump; step off any vehicle.
    fn clear_goal(&mut self, ctx: &mut SimContext) {
        self.target = Target::None;
        self.pending = PendingAction::None;
        self.steering.clear();
        self.jump = None;
        if let Some(vehicle) = self.riding.take() {
            if let Ok(mut appliance) = ctx.world.get::<&mut Appliance>(vehicle) {
                appliance.dismount();
            }
        }
    }

    fn enter_idle(&mut self, wait: f32) {
        self.state = PetState::Idle;
        self.timer = wait;
    }

    fn tick_idle(&mut self, ctx: &mut SimContext, dt: f32) {
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.choose_goal(ctx);
        }
    }

    fn tick_walking(&mut self, ctx: &mut SimContext, me: Entity, dt: f32) {
        let sensor = PetSensor {
            spatial: ctx.spatial(),
            ignore: self.target.entity(),
        };
        match self.steering.step(self.position, dt, WALK_SPEED, &sensor) {
            SteerOutcome::Moved { position, facing } => {
                self.position = position;
                self.facing = facing;
            }
            SteerOutcome::Rerouted | SteerOutcome::Blocked => {}
            SteerOutcome::Arrived => self.on_arrival(ctx, me),
            SteerOutcome::GaveUp => self.abandon_goal(ctx),
        }
    }

    fn tick_using(&mut self, ctx: &mut SimContext, dt: f32, kind: NeedKind) {
        self.timer -= dt;
        if self.timer > 0.0 {
            return;
        }

        if let Some(item) = self.target.entity() {
            self.stats.satisfy(kind);
            if let Ok(mut furniture) = ctx.world.get::<&mut Furniture>(item) {
                furniture.mark_used_by_agent(self.position, ctx.effects);
            }
            let event = match kind {
                NeedKind::Hunger => DiaryEvent::Ate,
                NeedKind::Toilet => DiaryEvent::UsedToilet,
            };
            ctx.effects.diary(event, 2);
            self.previous_target = Some(item);
        }

        self.clear_goal(ctx);
        let wait = ctx.rng.gen_range(2.0..5.0);
        self.enter_idle(wait);
    }

    fn tick_sleeping(&mut self, ctx: &mut SimContext, dt: f32) {
        self.sleep_timer -= dt;
        let woken = self.stats.most_pressing(NEED_CRITICAL).is_some();
        if woken || self.sleep_timer <= 0.0 {
            ctx.effects.diary(DiaryEvent::Slept, 1);
            self.clear_goal(ctx);
            let wait = ctx.rng.gen_range(1.0..3.0);
            self.enter_idle(wait);
        }
    }

    fn tick_interacting(&mut self, ctx: &mut SimContext, dt: f32) {
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.clear_goal(ctx);
            let wait = ctx.rng.gen_range(2.0..5.0);
            self.enter_idle(wait);
        }
    }

    fn tick_jumping(&mut self, dt: f32) {
        let Some(arc) = self.jump.as_mut() else {
            self.enter_idle(SETTLE_TIME);
            return;
        };
        arc.elapsed += dt;
        let t = (arc.elapsed / JUMP_DURATION).min(1.0);
        let mut position = arc.from.lerp(&arc.to, t);
        position.y += 4.0 * JUMP_HEIGHT * t * (1.0 - t);
        self.position = position;

        if t >= 1.0 {
            self.jump = None;
            self.state = PetState::Interacting;
            self.timer = BOX_PLAY_DURATION;
        }
    }

    fn tick_petting(&mut self, dt: f32) {
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.pet_count = 0;
            self.enter_idle(DROP_SETTLE_TIME);
        }
    }

    fn tick_angry(&mut self, ctx: &mut SimContext, dt: f32) {
        self.anger_timer -= dt;
        if self.anger_timer <= 0.0 {
            self.anger_timer = 0.0;
            self.pet_count = 0;
            self.patience = ctx.rng.gen_range(5..=10);
            log::info!("pet calmed down, new patience {}", self.patience);
            self.enter_idle(DROP_SETTLE_TIME);
        }
    }

    fn tick_begging(&mut self, ctx: &mut SimContext) {
        let unmet = self.stats.most_pressing(NEED_URGENT);
        if self.meow_cooldown <= 0.0 {
            let emote = match unmet {
                Some(NeedKind::Hunger) => Emote::Hungry,
                Some(NeedKind::Toilet) => Emote::NeedsToilet,
                None => Emote::Heart,
            };
            self.meow(ctx, emote);
        }

        let resolved = match unmet {
            None => true,
            Some(kind) => self.find_resource(&ctx.spatial(), kind).is_some(),
        };
        if resolved {
            self.enter_idle(0.0);
        }
    }

    /// Emote plus a meow, rate limited
    fn meow(&mut self, ctx: &mut SimContext, emote: Emote) {
        if self.meow_cooldown > 0.0 {
            return;
        }
        ctx.effects.emote(self.bubble_anchor(), emote);
        ctx.effects.sound(Sound::Meow);
        self.meow_cooldown = MEOW_COOLDOWN;
    }

    /// Drop the goal after avoidance ran out and pick another one right away.
    fn abandon_goal(&mut self, ctx: &mut SimContext) {
        self.goals_abandoned += 1;
        log::info!(
            "pet gave up on {:?} after repeated blocked steps ({} total)",
            self.target.entity(),
            self.goals_abandoned
        );
        self.clear_goal(ctx);
        self.state = PetState::Idle;
        self.choose_goal(ctx);
    }

    fn mount(&mut self, ctx: &mut SimContext, me: Entity, vehicle: Entity) -> bool {
        let Ok(mut appliance) = ctx.world.get::<&mut Appliance>(vehicle) else {
            return false;
        };
        if !appliance.mount(me) {
            return false;
        }
        let (position, facing) = (appliance.position, appliance.facing);
        drop(appliance);

        self.riding = Some(vehicle);
        self.follow_vehicle(position, facing);
        true
    }
}

/// Forward sensor that ignores the pet's own target, floor coverings,
/// wall-mounted items and whatever it is riding.
struct PetSensor<'a> {
    spatial: Spatial<'a>,
    ignore: Option<Entity>,
}

impl ObstacleSensor for PetSensor<'_> {
    fn sense(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<f32> {
        self.spatial
            .raycast(origin, dir, max_distance, |entity, furniture| {
                Some(entity) != self.ignore && furniture.blocks_pets()
            })
            .map(|hit| hit.distance)
    }
}
