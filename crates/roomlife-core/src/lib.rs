//! RoomLife Core - Household Agent Simulation
//!
//! A single furnished room inhabited by autonomous agents: pets that walk
//! between food, litter, beds and boxes as their needs decay, and a robot
//! vacuum that covers the floor with a perimeter pass followed by zig-zag
//! sweeps.
//!
//! # Architecture
//!
//! The room is an Entity Component System world via `hecs`:
//! - **Entities**: furniture items, pets, robot vacuums
//! - **Components**: `Furniture` + `Transform` for every placed object, plus
//!   `Pet` or `Appliance` for agents
//! - **Systems**: spatial queries, steering and the two agent state machines
//!
//! Agents never touch globals. Each tick the engine hands them a
//! [`context::SimContext`] carrying the registry, room geometry, clock, RNG
//! and the effect outbox.
//!
//! # Example
//!
//! ```rust,no_run
//! use roomlife_core::prelude::*;
//! use roomlife_core::config::SceneSpec;
//!
//! let mut engine = SimulationEngine::new();
//! engine.build_scene(&SceneSpec::household()).unwrap();
//!
//! loop {
//!     engine.advance(1.0 / 60.0, TickRegime::Foreground);
//!     for effect in engine.drain_effects() {
//!         println!("{:?}", effect);
//!     }
//! }
//! ```

pub mod components;
pub mod config;
pub mod context;
pub mod effects;
pub mod engine;
pub mod persistence;
pub mod schedule;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::effects::{DiaryEvent, Effect, Emote, Sound};
    pub use crate::engine::SimulationEngine;
    pub use crate::schedule::TickRegime;
    pub use crate::systems::{Appliance, Pet, PetResponse, PetState, Phase, SubState};
}
