//! Fire-and-forget effect hooks.
//!
//! Agents never call presentation code directly. They push an [`Effect`] into
//! the tick's [`Effects`] queue and move on; whoever drives the engine drains
//! the queue and shows emotes, writes diary entries, plays sounds or saves.
//! The queue is bounded: a driver that stops draining loses the oldest
//! effects, never a pending save request.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::components::Vec3;

/// Transient emoji shown above a world position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emote {
    Hungry,
    NeedsToilet,
    Heart,
    Angry,
    Sleepy,
    Curious,
    Happy,
    Sparkle,
    Dirty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    Meow,
    Purr,
    Hiss,
    Eat,
    Dig,
    Jump,
    Refill,
}

/// Diary entries the pet produces; the weight ranks how memorable it was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiaryEvent {
    Ate,
    UsedToilet,
    Slept,
    PlayedInBox,
    Played,
    Petted,
    GotAngry,
    RodeVacuum,
    Investigated,
    Refilled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Emote { at: Vec3, emote: Emote },
    Diary { event: DiaryEvent, weight: u32 },
    Sound(Sound),
    /// Currency or affection granted to the player
    Reward(u32),
    SaveRequested,
}

/// Effects held before the oldest start being dropped
pub const MAX_PENDING_EFFECTS: usize = 1024;

/// Outbox of effects produced during ticks. Must be drained regularly.
#[derive(Debug, Clone, Default)]
pub struct Effects {
    pending: VecDeque<Effect>,
    dropped: u64,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect) {
        if self.pending.len() >= MAX_PENDING_EFFECTS {
            self.drop_oldest();
        }
        self.pending.push_back(effect);
    }

    fn drop_oldest(&mut self) {
        // At most one save request is queued, so it sits at index 0 or 1
        let oldest = self
            .pending
            .iter()
            .position(|e| !matches!(e, Effect::SaveRequested))
            .unwrap_or(0);
        self.pending.remove(oldest);
        if self.dropped == 0 {
            log::warn!("effect queue full at {}, dropping oldest effects", MAX_PENDING_EFFECTS);
        }
        self.dropped += 1;
    }

    /// Effects discarded because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn emote(&mut self, at: Vec3, emote: Emote) {
        self.push(Effect::Emote { at, emote });
    }

    pub fn diary(&mut self, event: DiaryEvent, weight: u32) {
        self.push(Effect::Diary { event, weight });
    }

    pub fn sound(&mut self, sound: Sound) {
        self.push(Effect::Sound(sound));
    }

    pub fn request_save(&mut self) {
        // One request per batch is enough for the persistence collaborator
        if !self.pending.iter().any(|e| matches!(e, Effect::SaveRequested)) {
            self.push(Effect::SaveRequested);
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.pending.iter()
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        self.pending.drain(..).collect()
    }
}
