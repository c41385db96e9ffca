//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities. Agent behavior
//! lives in systems.

mod common;
mod furniture;
mod needs;

pub use common::*;
pub use furniture::*;
pub use needs::*;
