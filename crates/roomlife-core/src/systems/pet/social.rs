//! Player-facing entry points: petting, dragging, sounds and begging.

use super::goals::WANDER_MARGIN;
use super::{PendingAction, Pet, PetState, Target, ANGER_COOLDOWN, DROP_SETTLE_TIME, PETTING_TIMEOUT};
use crate::components::{Vec3, NEED_GRUMPY};
use crate::context::SimContext;
use crate::effects::{DiaryEvent, Effect, Emote, Sound};

/// Reward granted per accepted petting
pub const PETTING_REWARD: u32 = 1;
/// Stop distance when walking over to investigate a sound
pub const INSPECT_STOP_DISTANCE: f32 = 0.5;

/// Why a petting attempt was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    Angry,
    Hungry,
    NeedsToilet,
    /// Mid-air or held by the player
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetResponse {
    /// Accepted; `count` is the running tally toward the patience limit
    Rewarded { count: u32 },
    /// That was one petting too many
    BecameAngry,
    Refused(Refusal),
}

impl Pet {
    /// The player pets the agent.
    pub fn pet(&mut self, ctx: &mut SimContext) -> PetResponse {
        let anchor = self.bubble_anchor();
        match self.state {
            PetState::Angry => {
                ctx.effects.emote(anchor, Emote::Angry);
                return PetResponse::Refused(Refusal::Angry);
            }
            PetState::Dragged | PetState::Jumping => return PetResponse::Refused(Refusal::Busy),
            _ => {}
        }

        if self.stats.hunger < NEED_GRUMPY {
            ctx.effects.emote(anchor, Emote::Hungry);
            ctx.effects.sound(Sound::Meow);
            return PetResponse::Refused(Refusal::Hungry);
        }
        if self.stats.toilet < NEED_GRUMPY {
            ctx.effects.emote(anchor, Emote::NeedsToilet);
            return PetResponse::Refused(Refusal::NeedsToilet);
        }

        self.pet_count += 1;
        if self.pet_count > self.patience {
            self.become_angry(ctx);
            return PetResponse::BecameAngry;
        }

        self.clear_goal(ctx);
        self.state = PetState::Petting;
        self.timer = PETTING_TIMEOUT;
        ctx.effects.emote(anchor, Emote::Heart);
        ctx.effects.sound(Sound::Purr);
        ctx.effects.diary(DiaryEvent::Petted, 1);
        ctx.effects.push(Effect::Reward(PETTING_REWARD));
        PetResponse::Rewarded {
            count: self.pet_count,
        }
    }

    fn become_angry(&mut self, ctx: &mut SimContext) {
        log::info!("pet lost patience after {} pettings", self.pet_count);
        self.clear_goal(ctx);
        self.state = PetState::Angry;
        self.anger_timer = ANGER_COOLDOWN;
        ctx.effects.emote(self.bubble_anchor(), Emote::Angry);
        ctx.effects.sound(Sound::Hiss);
        ctx.effects.diary(DiaryEvent::GotAngry, 3);
    }

    /// Begin or end a player drag. An angry pet can't be picked up.
    pub fn set_dragged(&mut self, ctx: &mut SimContext, dragged: bool) -> bool {
        if dragged {
            match self.state {
                PetState::Angry => return false,
                PetState::Dragged => return true,
                _ => {}
            }
            self.clear_goal(ctx);
            self.state = PetState::Dragged;
            true
        } else {
            if self.state == PetState::Dragged {
                self.enter_idle(DROP_SETTLE_TIME);
            }
            true
        }
    }

    /// Move a dragged pet. Ignored in every other state.
    pub fn drag_to(&mut self, point: Vec3) {
        if self.state == PetState::Dragged && point.is_finite() {
            self.position = point;
        }
    }

    /// Walk over to a noise. Returns false if the pet is too busy to care.
    pub fn react_to_sound(&mut self, ctx: &mut SimContext, at: Vec3) -> bool {
        let curious = matches!(
            self.state,
            PetState::Idle
                | PetState::Walking
                | PetState::Interacting
                | PetState::Petting
                | PetState::Begging
        );
        if !curious || self.riding.is_some() || !at.is_finite() {
            return false;
        }

        self.clear_goal(ctx);
        let point = ctx.spatial().clamp_to_room(at, WANDER_MARGIN);
        self.target = Target::None;
        self.pending = PendingAction::Inspect;
        self.steering.set_path(self.position, point, INSPECT_STOP_DISTANCE);
        self.state = PetState::Walking;
        ctx.effects.emote(self.bubble_anchor(), Emote::Curious);
        true
    }

    /// Meow at the player until the unmet need is taken care of.
    pub fn start_begging(&mut self, ctx: &mut SimContext) -> bool {
        if !matches!(
            self.state,
            PetState::Idle | PetState::Walking | PetState::Interacting
        ) {
            return false;
        }
        self.clear_goal(ctx);
        self.state = PetState::Begging;
        self.meow_cooldown = 0.0;
        true
    }
}
