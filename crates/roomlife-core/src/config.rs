//! Simulation configuration and scene descriptions.
//!
//! Everything is plain serde data with defaults on every field, so a JSON
//! file only needs to mention what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::{DecayRates, FurnitureConfig, Needs, Vec3};
use crate::context::{DayClock, FlatRoom};
use crate::schedule::ScheduleConfig;
use crate::systems::ApplianceConfig;

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the shared RNG
    pub seed: u64,
    pub room: FlatRoom,
    pub clock: DayClock,
    pub schedule: ScheduleConfig,
    pub needs: DecayRates,
    pub appliance: ApplianceConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            room: FlatRoom::default(),
            clock: DayClock::default(),
            schedule: ScheduleConfig::default(),
            needs: DecayRates::default(),
            appliance: ApplianceConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Every problem found, empty when the config is usable.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if !(self.room.boundary > 0.0) {
            issues.push(ConfigIssue::RoomTooSmall(self.room.boundary));
        }
        let schedule = &self.schedule;
        for (name, value) in [
            ("schedule.fixed_step", schedule.fixed_step),
            ("schedule.max_dt", schedule.max_dt),
            ("schedule.background_interval", schedule.background_interval),
            ("appliance.move_speed", self.appliance.move_speed),
            ("appliance.turn_speed", self.appliance.turn_speed),
            ("appliance.lane_width", self.appliance.lane_width),
            ("appliance.radius", self.appliance.radius),
        ] {
            if !(value > 0.0) {
                issues.push(ConfigIssue::NotPositive(name));
            }
        }
        if schedule.fixed_step > schedule.max_dt {
            issues.push(ConfigIssue::StepExceedsMaxDt {
                fixed_step: schedule.fixed_step,
                max_dt: schedule.max_dt,
            });
        }
        if !(self.needs.hunger_per_sec >= 0.0) || !(self.needs.toilet_per_sec >= 0.0) {
            issues.push(ConfigIssue::NegativeDecay);
        }

        issues
    }

    fn check(&self) -> Result<(), ConfigError> {
        let issues = self.validate();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    /// Room boundary must be positive
    RoomTooSmall(f32),
    /// Named field must be positive
    NotPositive(&'static str),
    /// A fixed step larger than the dt clamp would be silently shortened
    StepExceedsMaxDt { fixed_step: f32, max_dt: f32 },
    NegativeDecay,
    /// Scene placement names a preset that doesn't exist
    UnknownPreset(String),
    /// Scene placement gives neither a preset nor a config
    MissingFurnitureConfig,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigIssue::RoomTooSmall(b) => write!(f, "room boundary must be positive, got {}", b),
            ConfigIssue::NotPositive(name) => write!(f, "{} must be positive", name),
            ConfigIssue::StepExceedsMaxDt { fixed_step, max_dt } => {
                write!(f, "fixed step {} exceeds max dt {}", fixed_step, max_dt)
            }
            ConfigIssue::NegativeDecay => write!(f, "need decay rates must not be negative"),
            ConfigIssue::UnknownPreset(name) => write!(f, "unknown furniture preset '{}'", name),
            ConfigIssue::MissingFurnitureConfig => {
                write!(f, "placement needs a preset or a config")
            }
        }
    }
}

/// Errors from loading configuration or scenes
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(Vec<ConfigIssue>),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigError::Invalid(issues) => {
                write!(f, "invalid config:")?;
                for issue in issues {
                    write!(f, " {};", issue)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// One piece of furniture in a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Named preset, see [`FurnitureConfig::preset`]
    #[serde(default)]
    pub preset: Option<String>,
    /// Full config; wins over `preset` when both are given
    #[serde(default)]
    pub config: Option<FurnitureConfig>,
    pub x: f32,
    pub z: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub tipped: bool,
}

impl Placement {
    pub fn preset(name: &str, x: f32, z: f32) -> Self {
        Self {
            preset: Some(name.to_string()),
            config: None,
            x,
            z,
            rotation: 0.0,
            tipped: false,
        }
    }

    pub fn resolve(&self) -> Result<FurnitureConfig, ConfigIssue> {
        if let Some(config) = &self.config {
            return Ok(config.clone());
        }
        match &self.preset {
            Some(name) => {
                FurnitureConfig::preset(name).ok_or_else(|| ConfigIssue::UnknownPreset(name.clone()))
            }
            None => Err(ConfigIssue::MissingFurnitureConfig),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::ground(self.x, self.z)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetSpawn {
    pub x: f32,
    pub z: f32,
    /// Random 5..=10 when absent
    #[serde(default)]
    pub patience: Option<u32>,
    #[serde(default)]
    pub needs: Option<Needs>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceSpawn {
    pub x: f32,
    pub z: f32,
    #[serde(default)]
    pub facing: f32,
}

/// Room contents to build an engine from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSpec {
    pub furniture: Vec<Placement>,
    pub pets: Vec<PetSpawn>,
    pub appliances: Vec<ApplianceSpawn>,
}

impl SceneSpec {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let scene: SceneSpec = serde_json::from_str(json)?;
        let issues: Vec<ConfigIssue> = scene
            .furniture
            .iter()
            .filter_map(|placement| placement.resolve().err())
            .collect();
        if !issues.is_empty() {
            return Err(ConfigError::Invalid(issues));
        }
        Ok(scene)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// A small furnished room with one pet and one robot vacuum.
    pub fn household() -> Self {
        Self {
            furniture: vec![
                Placement::preset("food_bowl", 2.5, -2.5),
                Placement::preset("litter_box", -3.0, -3.0),
                Placement::preset("bed", -2.5, 2.5),
                Placement::preset("sofa", 1.5, 3.2),
                Placement::preset("cardboard_box", 2.8, 0.5),
                Placement::preset("rug", 0.0, 0.0),
                Placement::preset("plant", -3.3, 0.0),
                Placement::preset("wall_shelf", 0.0, -3.8),
            ],
            pets: vec![PetSpawn {
                x: 0.0,
                z: 0.0,
                patience: None,
                needs: None,
            }],
            appliances: vec![ApplianceSpawn {
                x: -1.0,
                z: -1.0,
                facing: 0.0,
            }],
        }
    }
}
