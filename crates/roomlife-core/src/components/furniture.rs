//! Furniture components and the usage protocol agents share with them.
//!
//! Config records are capability-flag structs: every flag has a defined
//! default, so an item whose config omits `can_sleep` simply is not a bed.

use serde::{Deserialize, Serialize};

use super::common::{BoundingBox, Transform, Vec3};
use crate::effects::{DiaryEvent, Effects, Emote, Sound};

/// Placement layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Rugs and other floor coverings
    Decor,
    /// Regular floor objects
    #[default]
    Floor,
    /// Small objects that sit on top of things
    Small,
}

/// Sub-type for furniture an agent consumes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Utility {
    #[default]
    None,
    Food,
    Toilet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionalState {
    Full,
    Empty,
    Clean,
    Dirty,
}

impl FunctionalState {
    /// State a freshly placed or refilled item starts in
    pub fn ready(utility: Utility) -> Option<Self> {
        match utility {
            Utility::None => None,
            Utility::Food => Some(FunctionalState::Full),
            Utility::Toilet => Some(FunctionalState::Clean),
        }
    }
}

/// Immutable per-item configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FurnitureConfig {
    pub category: String,
    pub utility: Utility,
    pub can_sleep: bool,
    pub is_box: bool,
    pub is_vehicle: bool,
    pub wall_mounted: bool,
    pub layer: Layer,
    /// Footprint along local x
    pub width: f32,
    /// Footprint along local z
    pub depth: f32,
    pub height: f32,
    /// Price of a refill, checked by the economy collaborator
    pub refill_cost: u32,
}

impl Default for FurnitureConfig {
    fn default() -> Self {
        Self {
            category: "misc".into(),
            utility: Utility::None,
            can_sleep: false,
            is_box: false,
            is_vehicle: false,
            wall_mounted: false,
            layer: Layer::Floor,
            width: 0.5,
            depth: 0.5,
            height: 0.5,
            refill_cost: 0,
        }
    }
}

impl FurnitureConfig {
    pub fn new(category: impl Into<String>, width: f32, depth: f32, height: f32) -> Self {
        Self {
            category: category.into(),
            width,
            depth,
            height,
            ..Default::default()
        }
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_utility(mut self, utility: Utility, refill_cost: u32) -> Self {
        self.utility = utility;
        self.refill_cost = refill_cost;
        self
    }

    pub fn food_bowl() -> Self {
        Self::new("food_bowl", 0.3, 0.3, 0.1)
            .with_layer(Layer::Small)
            .with_utility(Utility::Food, 10)
    }

    pub fn litter_box() -> Self {
        Self::new("litter_box", 0.6, 0.45, 0.2).with_utility(Utility::Toilet, 5)
    }

    pub fn bed() -> Self {
        Self {
            can_sleep: true,
            ..Self::new("bed", 0.8, 0.6, 0.15)
        }
    }

    pub fn sofa() -> Self {
        Self {
            can_sleep: true,
            ..Self::new("sofa", 2.0, 0.9, 0.45)
        }
    }

    pub fn cardboard_box() -> Self {
        Self {
            is_box: true,
            ..Self::new("cardboard_box", 0.5, 0.5, 0.35)
        }
    }

    pub fn cat_tower() -> Self {
        Self::new("cat_tower", 0.5, 0.5, 1.2)
    }

    pub fn rug() -> Self {
        Self::new("rug", 2.0, 1.4, 0.01).with_layer(Layer::Decor)
    }

    pub fn plant() -> Self {
        Self::new("plant", 0.3, 0.3, 0.6).with_layer(Layer::Small)
    }

    pub fn wall_shelf() -> Self {
        Self {
            wall_mounted: true,
            ..Self::new("wall_shelf", 1.0, 0.25, 0.05)
        }
    }

    pub fn robot_vacuum() -> Self {
        Self {
            is_vehicle: true,
            ..Self::new("robot_vacuum", 0.7, 0.7, 0.1)
        }
    }

    /// Look up a named preset
    pub fn preset(name: &str) -> Option<Self> {
        let config = match name {
            "food_bowl" => Self::food_bowl(),
            "litter_box" => Self::litter_box(),
            "bed" => Self::bed(),
            "sofa" => Self::sofa(),
            "cardboard_box" => Self::cardboard_box(),
            "cat_tower" => Self::cat_tower(),
            "rug" => Self::rug(),
            "plant" => Self::plant(),
            "wall_shelf" => Self::wall_shelf(),
            "robot_vacuum" => Self::robot_vacuum(),
            _ => return None,
        };
        Some(config)
    }
}

/// Result of an external refill request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillOutcome {
    Refilled,
    /// Item was not empty or dirty
    NotNeeded,
    /// The economy refused to pay
    Declined,
}

/// Economy collaborator that owns currency and prices
pub trait Economy {
    /// Try to pay `cost`; returns false when the player cannot afford it.
    fn try_spend(&mut self, cost: u32) -> bool;
}

/// An economy that accepts every payment
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeRefills;

impl Economy for FreeRefills {
    fn try_spend(&mut self, _cost: u32) -> bool {
        true
    }
}

/// Registry component for every placed object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Furniture {
    pub config: FurnitureConfig,
    pub state: Option<FunctionalState>,
    pub visible: bool,
    /// Boxes only: a tipped box can't be jumped into
    pub tipped: bool,
}

impl Furniture {
    pub fn new(config: FurnitureConfig) -> Self {
        Self {
            state: FunctionalState::ready(config.utility),
            config,
            visible: true,
            tipped: false,
        }
    }

    pub fn is_food(&self) -> bool {
        self.config.utility == Utility::Food
    }

    /// Ready to be consumed by an agent
    pub fn is_usable(&self) -> bool {
        matches!(self.state, Some(FunctionalState::Full | FunctionalState::Clean))
    }

    pub fn requires_refill(&self) -> bool {
        matches!(self.state, Some(FunctionalState::Empty | FunctionalState::Dirty))
    }

    /// Upright box a pet can jump into
    pub fn is_open_box(&self) -> bool {
        self.config.is_box && !self.tipped
    }

    /// Objects the appliance has to steer around
    pub fn blocks_vehicles(&self) -> bool {
        self.visible
            && self.config.layer == Layer::Floor
            && !self.config.wall_mounted
            && !self.config.is_vehicle
    }

    /// Objects a pet's forward sensor can hit
    pub fn blocks_pets(&self) -> bool {
        self.visible && self.config.layer != Layer::Decor && !self.config.wall_mounted
    }

    /// Surfaces a pet settles on top of
    pub fn supports_pets(&self) -> bool {
        self.visible
            && self.config.layer == Layer::Floor
            && !self.config.is_box
            && !self.config.is_vehicle
            && !self.config.wall_mounted
    }

    /// Footprint of this item at `transform`, rotated by its yaw
    pub fn bounds(&self, transform: &Transform) -> BoundingBox {
        let (sin, cos) = transform.rotation.sin_cos();
        let hw = self.config.width.max(0.0) * 0.5;
        let hd = self.config.depth.max(0.0) * 0.5;
        let half_x = cos.abs() * hw + sin.abs() * hd;
        let half_z = sin.abs() * hw + cos.abs() * hd;
        BoundingBox::around(transform.position, half_x, half_z, self.config.height.max(0.0))
    }

    /// Consumed by an agent: full -> empty, clean -> dirty.
    ///
    /// Fires the usage emote and sound and asks for a save. Returns false
    /// when there was nothing to consume.
    pub fn mark_used_by_agent(&mut self, at: Vec3, effects: &mut Effects) -> bool {
        let (next, emote, sound) = match self.state {
            Some(FunctionalState::Full) => (FunctionalState::Empty, Emote::Sparkle, Sound::Eat),
            Some(FunctionalState::Clean) => (FunctionalState::Dirty, Emote::Dirty, Sound::Dig),
            _ => return false,
        };
        self.state = Some(next);
        effects.emote(at, emote);
        effects.sound(sound);
        effects.request_save();
        log::debug!("{} marked used -> {:?}", self.config.category, next);
        true
    }

    /// External refill: empty -> full, dirty -> clean, if the economy pays.
    pub fn apply_refill(
        &mut self,
        economy: &mut dyn Economy,
        at: Vec3,
        effects: &mut Effects,
    ) -> RefillOutcome {
        if !self.requires_refill() {
            return RefillOutcome::NotNeeded;
        }
        if !economy.try_spend(self.config.refill_cost) {
            return RefillOutcome::Declined;
        }
        self.state = FunctionalState::ready(self.config.utility);
        effects.emote(at, Emote::Sparkle);
        effects.sound(Sound::Refill);
        effects.diary(DiaryEvent::Refilled, 1);
        effects.request_save();
        RefillOutcome::Refilled
    }

    /// Player clicked the item. True when a refill confirmation should be shown.
    pub fn interact(&self) -> bool {
        self.requires_refill()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;
    use std::f32::consts::FRAC_PI_2;

    struct Wallet(u32);

    impl Economy for Wallet {
        fn try_spend(&mut self, cost: u32) -> bool {
            if self.0 >= cost {
                self.0 -= cost;
                true
            } else {
                false
            }
        }
    }

    #[test]
    fn test_food_cycle() {
        let mut bowl = Furniture::new(FurnitureConfig::food_bowl());
        let mut effects = Effects::new();
        assert_eq!(bowl.state, Some(FunctionalState::Full));
        assert!(!bowl.interact());

        assert!(bowl.mark_used_by_agent(Vec3::ZERO, &mut effects));
        assert_eq!(bowl.state, Some(FunctionalState::Empty));
        assert!(bowl.requires_refill());
        assert!(bowl.interact());
        assert!(effects.iter().any(|e| matches!(e, Effect::SaveRequested)));

        // Nothing left to eat
        assert!(!bowl.mark_used_by_agent(Vec3::ZERO, &mut effects));
    }

    #[test]
    fn test_refill_is_gated_by_economy() {
        let mut litter = Furniture::new(FurnitureConfig::litter_box());
        let mut effects = Effects::new();
        litter.mark_used_by_agent(Vec3::ZERO, &mut effects);
        assert_eq!(litter.state, Some(FunctionalState::Dirty));

        let mut broke = Wallet(1);
        assert_eq!(
            litter.apply_refill(&mut broke, Vec3::ZERO, &mut effects),
            RefillOutcome::Declined
        );
        assert_eq!(litter.state, Some(FunctionalState::Dirty));

        let mut wallet = Wallet(20);
        assert_eq!(
            litter.apply_refill(&mut wallet, Vec3::ZERO, &mut effects),
            RefillOutcome::Refilled
        );
        assert_eq!(litter.state, Some(FunctionalState::Clean));
        assert_eq!(wallet.0, 15);

        assert_eq!(
            litter.apply_refill(&mut wallet, Vec3::ZERO, &mut effects),
            RefillOutcome::NotNeeded
        );
    }

    #[test]
    fn test_missing_flags_mean_feature_absent() {
        let config: FurnitureConfig = serde_json::from_str(r#"{"category": "lamp"}"#).unwrap();
        assert!(!config.can_sleep);
        assert!(!config.is_box);
        assert_eq!(config.layer, Layer::Floor);
        assert_eq!(Furniture::new(config).state, None);
    }

    #[test]
    fn test_rotated_bounds_swap_extents() {
        let sofa = Furniture::new(FurnitureConfig::sofa());
        let flat = sofa.bounds(&Transform::at(Vec3::ZERO));
        assert!((flat.width() - 2.0).abs() < 1e-4);

        let turned = sofa.bounds(&Transform::new(Vec3::ZERO, FRAC_PI_2));
        assert!((turned.width() - 0.9).abs() < 1e-4);
        assert!((turned.depth() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_layer_filters() {
        let rug = Furniture::new(FurnitureConfig::rug());
        let plant = Furniture::new(FurnitureConfig::plant());
        let vacuum = Furniture::new(FurnitureConfig::robot_vacuum());
        let mut sofa = Furniture::new(FurnitureConfig::sofa());

        assert!(!rug.blocks_pets() && !rug.blocks_vehicles());
        assert!(plant.blocks_pets() && !plant.blocks_vehicles());
        assert!(vacuum.blocks_pets() && !vacuum.blocks_vehicles());
        assert!(sofa.blocks_vehicles());

        sofa.visible = false;
        assert!(!sofa.blocks_vehicles());
    }
}
