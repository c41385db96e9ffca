//! Systems - agent behavior and the queries it runs on

mod spatial;
mod steering;
pub mod appliance;
pub mod pet;

pub use spatial::*;
pub use steering::*;
pub use appliance::{Appliance, ApplianceConfig, Phase, SubState};
pub use pet::{PendingAction, Pet, PetResponse, PetState, Refusal};
