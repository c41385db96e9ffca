//! Goal selection and arrival handling.

use std::f32::consts::PI;

use hecs::Entity;
use rand::Rng;

use super::{
    JumpArc, PendingAction, Pet, PetState, Target, BOX_PLAY_DURATION, EAT_DURATION, PET_RADIUS,
    POOP_DURATION, SETTLE_TIME,
};
use crate::components::{Furniture, Layer, NeedKind, Transform, Utility, Vec3, NEED_URGENT};
use crate::context::SimContext;
use crate::effects::{DiaryEvent, Emote, Sound};
use crate::systems::Spatial;

/// Food and toilet approach distance
pub const USE_STOP_DISTANCE: f32 = 0.5;
pub const BOX_STOP_DISTANCE: f32 = 0.6;
pub const PLAY_STOP_DISTANCE: f32 = 0.6;
/// Arriving farther than this from food or toilet re-paths instead of using it
pub const REPATH_DISTANCE: f32 = 1.5;
/// A moving vehicle can be boarded from this far away
pub const MOUNT_DISTANCE: f32 = 1.5;
pub const BOX_CHANCE: f64 = 0.6;
pub const SLEEP_CHANCE_DAY: f64 = 0.7;
pub const SLEEP_CHANCE_NIGHT: f64 = 0.3;
pub const PLAY_CHANCE: f64 = 0.5;
/// Wander targets stay this far from the walls
pub const WANDER_MARGIN: f32 = 0.5;
/// Idle wait before re-checking a need nothing could satisfy
const UNMET_NEED_RETRY: f32 = 3.0;

impl Pet {
    /// Pick the next goal: pressing needs first, then boxes, beds, other
    /// furniture and finally a random wander.
    pub(super) fn choose_goal(&mut self, ctx: &mut SimContext) {
        let spatial = ctx.spatial();

        if let Some(kind) = self.stats.most_pressing(NEED_URGENT) {
            match self.find_resource(&spatial, kind) {
                Some((item, transform)) => {
                    let action = match kind {
                        NeedKind::Hunger => PendingAction::Eat,
                        NeedKind::Toilet => PendingAction::Poop,
                    };
                    self.walk_to(item, transform.position, USE_STOP_DISTANCE, action, &spatial);
                }
                None => {
                    let emote = match kind {
                        NeedKind::Hunger => Emote::Hungry,
                        NeedKind::Toilet => Emote::NeedsToilet,
                    };
                    self.meow(ctx, emote);
                    self.enter_idle(UNMET_NEED_RETRY);
                }
            }
            return;
        }

        let previous = self.previous_target;
        let boxes = spatial.find_furniture(|e, f| f.is_open_box() && Some(e) != previous);
        if !boxes.is_empty() && ctx.rng.gen_bool(BOX_CHANCE) {
            let (item, transform) = boxes[ctx.rng.gen_range(0..boxes.len())];
            self.walk_to(item, transform.position, BOX_STOP_DISTANCE, PendingAction::None, &spatial);
            return;
        }

        let beds = spatial.find_furniture(|e, f| f.config.can_sleep && Some(e) != previous);
        let sleep_chance = if ctx.is_night() {
            SLEEP_CHANCE_NIGHT
        } else {
            SLEEP_CHANCE_DAY
        };
        if !beds.is_empty() && ctx.rng.gen_bool(sleep_chance) {
            let (item, transform) = beds[ctx.rng.gen_range(0..beds.len())];
            self.walk_to(item, transform.position, 0.0, PendingAction::None, &spatial);
            return;
        }

        let toys = spatial.find_furniture(|e, f| is_plaything(f) && Some(e) != previous);
        if !toys.is_empty() && ctx.rng.gen_bool(PLAY_CHANCE) {
            let (item, transform) = toys[ctx.rng.gen_range(0..toys.len())];
            self.walk_to(item, transform.position, PLAY_STOP_DISTANCE, PendingAction::None, &spatial);
            return;
        }

        let heading = ctx.rng.gen_range(-PI..PI);
        let distance = ctx.rng.gen_range(1.0..=4.0);
        let point = spatial.clamp_to_room(self.position + Vec3::from_heading(heading) * distance, WANDER_MARGIN);
        self.target = Target::None;
        self.previous_target = None;
        self.pending = PendingAction::None;
        self.steering.set_path(self.position, point, 0.0);
        self.state = PetState::Walking;
    }

    /// Nearest usable item satisfying `kind`.
    pub(super) fn find_resource(&self, spatial: &Spatial, kind: NeedKind) -> Option<(Entity, Transform)> {
        let utility = match kind {
            NeedKind::Hunger => Utility::Food,
            NeedKind::Toilet => Utility::Toilet,
        };
        spatial
            .find_furniture(|_, f| f.config.utility == utility && f.is_usable())
            .into_iter()
            .min_by(|(_, a), (_, b)| {
                let da = self.position.flat_distance(&a.position);
                let db = self.position.flat_distance(&b.position);
                da.total_cmp(&db)
            })
    }

    pub(super) fn walk_to(
        &mut self,
        item: Entity,
        target: Vec3,
        stop_distance: f32,
        action: PendingAction,
        spatial: &Spatial,
    ) {
        // Food is always approached to the same distance
        let is_food = spatial.furniture(item).is_some_and(|(f, _)| f.is_food());
        let stop_distance = if is_food { USE_STOP_DISTANCE } else { stop_distance };

        self.target = Target::Approaching(item);
        self.previous_target = Some(item);
        self.pending = action;
        self.steering.set_path(self.position, target, stop_distance);
        self.state = PetState::Walking;
        log::debug!("pet heading for {:?} ({:?})", item, action);
    }

    pub(super) fn on_arrival(&mut self, ctx: &mut SimContext, me: Entity) {
        let pending = std::mem::take(&mut self.pending);

        let Some(item) = self.target.entity() else {
            if pending == PendingAction::Inspect {
                ctx.effects.emote(self.bubble_anchor(), Emote::Curious);
                ctx.effects.diary(DiaryEvent::Investigated, 1);
            }
            let dwell = ctx.rng.gen_range(5.0..10.0);
            self.start_interacting(dwell);
            return;
        };

        let Some((furniture, transform)) = ctx.spatial().furniture(item) else {
            self.interrupt(ctx);
            return;
        };
        let distance = self.position.flat_distance(&transform.position);

        if matches!(pending, PendingAction::Eat | PendingAction::Poop) {
            if distance > REPATH_DISTANCE {
                log::debug!("pet stopped {:.2} from {:?}, re-pathing", distance, item);
                self.pending = pending;
                self.steering.set_path(self.position, transform.position, USE_STOP_DISTANCE);
                return;
            }
            if !furniture.is_usable() {
                self.clear_goal(ctx);
                self.enter_idle(SETTLE_TIME);
                return;
            }
            let (state, duration) = match pending {
                PendingAction::Eat => (PetState::Eating, EAT_DURATION),
                _ => (PetState::Pooping, POOP_DURATION),
            };
            self.stand_flush(&furniture, &transform, &ctx.spatial());
            self.target = Target::Engaged(item);
            self.state = state;
            self.timer = duration;
            return;
        }

        self.target = Target::Engaged(item);

        if furniture.is_open_box() {
            self.facing = (transform.position - self.position).heading();
            self.jump = Some(JumpArc {
                from: self.position,
                to: transform.position,
                elapsed: 0.0,
            });
            self.state = PetState::Jumping;
            ctx.effects.sound(Sound::Jump);
            ctx.effects.diary(DiaryEvent::PlayedInBox, 2);
        } else if furniture.config.can_sleep {
            self.state = PetState::Sleeping;
            self.sleep_timer = ctx.rng.gen_range(10.0..20.0);
            ctx.effects.emote(self.bubble_anchor(), Emote::Sleepy);
        } else if furniture.config.is_vehicle && distance <= MOUNT_DISTANCE && self.mount(ctx, me, item) {
            ctx.effects.emote(self.bubble_anchor(), Emote::Happy);
            ctx.effects.diary(DiaryEvent::RodeVacuum, 2);
            let dwell = ctx.rng.gen_range(5.0..10.0);
            self.start_interacting(dwell);
        } else {
            let dwell = if furniture.config.is_box {
                BOX_PLAY_DURATION
            } else {
                ctx.rng.gen_range(5.0..10.0)
            };
            ctx.effects.diary(DiaryEvent::Played, 1);
            self.start_interacting(dwell);
        }
    }

    fn start_interacting(&mut self, dwell: f32) {
        self.state = PetState::Interacting;
        self.timer = dwell;
    }

    /// Step up against the item's edge, facing its center.
    fn stand_flush(&mut self, furniture: &Furniture, transform: &Transform, spatial: &Spatial) {
        let offset = (transform.position - self.position).flat();
        let dir = if offset.length() > 1e-4 {
            offset.normalize()
        } else {
            Vec3::from_heading(self.facing)
        };
        let standoff = furniture.bounds(transform).extent_along(&dir) + PET_RADIUS;
        let flush = Vec3::new(
            transform.position.x - dir.x * standoff,
            self.position.y,
            transform.position.z - dir.z * standoff,
        );
        self.position = spatial.clamp_to_room(flush, PET_RADIUS);
        self.facing = dir.heading();
    }
}

/// Floor furniture with no special affordance of its own
fn is_plaything(furniture: &Furniture) -> bool {
    let config = &furniture.config;
    config.layer == Layer::Floor
        && config.utility == Utility::None
        && !config.is_box
        && !config.can_sleep
        && !config.wall_mounted
}
