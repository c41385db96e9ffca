//! Save/Load of the room snapshot
//!
//! Uses bincode for a compact binary payload. Only durable state is kept:
//! placements, functional states, agent poses and needs. Goals in flight
//! are dropped, so loaded pets start idle and loaded appliances restart
//! their perimeter pass.

use hecs::World;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::components::*;
use crate::systems::{Appliance, ApplianceConfig, Pet};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    /// Clock hour at save time
    pub hour: f32,
    /// Simulated seconds since the engine started
    pub sim_time: f64,
    pub entities: Vec<SerializableEntity>,
}

/// Robot vacuum pose and tunables
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct AppliancePose {
    pub position: Vec3,
    pub facing: f32,
    pub config: ApplianceConfig,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PetRecord {
    pub position: Vec3,
    pub facing: f32,
    pub stats: Needs,
    pub decay: DecayRates,
    pub patience: u32,
}

/// All persisted components for an entity, serialized as optionals
#[derive(Serialize, Deserialize, Default)]
pub struct SerializableEntity {
    pub furniture: Option<Furniture>,
    pub transform: Option<Transform>,
    pub appliance: Option<AppliancePose>,
    pub pet: Option<PetRecord>,
}

fn serialize_entities(world: &World) -> Vec<SerializableEntity> {
    let mut entities = Vec::new();

    for entity_ref in world.iter() {
        let mut se = SerializableEntity::default();

        if let Some(c) = entity_ref.get::<&Furniture>() {
            se.furniture = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&Transform>() {
            se.transform = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Appliance>() {
            se.appliance = Some(AppliancePose {
                position: c.position,
                facing: c.facing,
                config: c.config,
            });
        }
        if let Some(c) = entity_ref.get::<&Pet>() {
            se.pet = Some(PetRecord {
                position: c.position,
                facing: c.facing,
                stats: c.stats,
                decay: c.decay(),
                patience: c.patience(),
            });
        }

        if se.furniture.is_some() || se.pet.is_some() {
            entities.push(se);
        }
    }

    entities
}

fn spawn_entity(world: &mut World, se: SerializableEntity) {
    let entity = world.spawn(());

    if let Some(c) = se.furniture {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.transform {
        let _ = world.insert_one(entity, c);
    }
    if let Some(pose) = se.appliance {
        let _ = world.insert_one(entity, Appliance::new(pose.position, pose.facing, pose.config));
    }
    if let Some(record) = se.pet {
        let mut pet = Pet::new(record.position, record.patience)
            .with_needs(record.stats)
            .with_decay(record.decay);
        pet.facing = record.facing;
        let _ = world.insert_one(entity, pet);
    }
}

/// Save the room to a writer
pub fn save_simulation<W: Write>(writer: W, world: &World, hour: f32, sim_time: f64) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        hour,
        sim_time,
        entities: serialize_entities(world),
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a room from a reader
pub fn load_simulation<R: Read>(reader: R) -> Result<LoadedSimulation, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut world = World::new();
    for se in save_data.entities {
        spawn_entity(&mut world, se);
    }

    Ok(LoadedSimulation {
        world,
        hour: save_data.hour,
        sim_time: save_data.sim_time,
    })
}

pub struct LoadedSimulation {
    pub world: World,
    pub hour: f32,
    pub sim_time: f64,
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(f, "Save version mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for SaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneSpec;
    use crate::engine::SimulationEngine;
    use crate::systems::{Phase, PetState, SubState};

    #[test]
    fn test_save_load_roundtrip() {
        let mut engine = SimulationEngine::new();
        engine.build_scene(&SceneSpec::household()).unwrap();
        for _ in 0..200 {
            engine.update(0.05);
        }

        let bowl = engine
            .furniture_entities()
            .into_iter()
            .find(|e| engine.world.get::<&Furniture>(*e).is_ok_and(|f| f.is_food()))
            .unwrap();
        engine.world.get::<&mut Furniture>(bowl).unwrap().state = Some(FunctionalState::Empty);

        let pet = engine.pets()[0];
        let (pet_pos, hunger) = {
            let p = engine.world.get::<&Pet>(pet).unwrap();
            (p.position, p.stats.hunger)
        };

        let mut buffer = Vec::new();
        engine.save(&mut buffer).expect("Save failed");

        let mut loaded = SimulationEngine::new();
        loaded.load(&buffer[..]).expect("Load failed");

        assert_eq!(loaded.furniture_entities().len(), engine.furniture_entities().len());
        assert_eq!(loaded.pets().len(), 1);
        assert!((loaded.sim_time() - engine.sim_time()).abs() < 1e-6);

        let loaded_pet = loaded.pets()[0];
        let p = loaded.world.get::<&Pet>(loaded_pet).unwrap();
        assert_eq!(p.position, pet_pos);
        assert_eq!(p.stats.hunger, hunger);
        assert_eq!(p.state(), PetState::Idle);
        drop(p);

        let empty_bowls = loaded
            .world
            .query::<&Furniture>()
            .iter()
            .filter(|(_, f)| f.is_food() && f.requires_refill())
            .count();
        assert_eq!(empty_bowls, 1);

        let appliance = loaded.appliances()[0];
        let a = loaded.world.get::<&Appliance>(appliance).unwrap();
        assert_eq!(a.phase(), Phase::WallFollow);
        assert_eq!(a.sub_state(), SubState::Init);
    }

    #[test]
    fn test_version_mismatch() {
        let data = SaveData {
            version: SAVE_VERSION + 1,
            hour: 0.0,
            sim_time: 0.0,
            entities: Vec::new(),
        };
        let bytes = bincode::serialize(&data).unwrap();
        match load_simulation(&bytes[..]) {
            Err(SaveError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SAVE_VERSION);
                assert_eq!(found, SAVE_VERSION + 1);
            }
            _ => panic!("expected version mismatch"),
        }
    }

    #[test]
    fn test_truncated_input() {
        assert!(matches!(load_simulation(&[1u8, 0][..]), Err(SaveError::Bincode(_))));
    }
}
