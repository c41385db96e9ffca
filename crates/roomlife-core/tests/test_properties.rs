//! Property tests: random player input interleaved with ticks must never
//! leave the household in an inconsistent state.

use proptest::prelude::*;
use roomlife_core::config::SceneSpec;
use roomlife_core::engine::{SceneEntities, SimulationEngine};
use roomlife_core::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    Tick(u8),
    Pet,
    Drag(f32, f32),
    Drop,
    Sound(f32, f32),
    Beg,
    Hide(usize),
    Show(usize),
    TipBox(bool),
    Refill(usize),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (1u8..80).prop_map(Action::Tick),
        1 => Just(Action::Pet),
        1 => (-3.5f32..3.5, -3.5f32..3.5).prop_map(|(x, z)| Action::Drag(x, z)),
        1 => Just(Action::Drop),
        1 => (-5.0f32..5.0, -5.0f32..5.0).prop_map(|(x, z)| Action::Sound(x, z)),
        1 => Just(Action::Beg),
        1 => (0usize..9).prop_map(Action::Hide),
        1 => (0usize..9).prop_map(Action::Show),
        1 => any::<bool>().prop_map(Action::TipBox),
        1 => (0usize..8).prop_map(Action::Refill),
    ]
}

/// Every furniture entity, the vacuum last
fn items(scene: &SceneEntities) -> Vec<hecs::Entity> {
    scene.furniture.iter().chain(&scene.appliances).copied().collect()
}

fn apply(engine: &mut SimulationEngine, scene: &SceneEntities, action: &Action) {
    let pet = scene.pets[0];
    let items = items(scene);
    match *action {
        Action::Tick(n) => {
            for _ in 0..n {
                engine.update(0.05);
            }
        }
        Action::Pet => {
            engine.pet(pet);
        }
        Action::Drag(x, z) => {
            engine.set_dragged(pet, true);
            engine.drag_pet_to(pet, Vec3::new(x, 0.5, z));
        }
        Action::Drop => {
            engine.set_dragged(pet, false);
        }
        Action::Sound(x, z) => {
            engine.react_to_sound(Vec3::ground(x, z));
        }
        Action::Beg => {
            engine.start_begging(pet);
        }
        Action::Hide(i) => {
            engine.set_furniture_visible(items[i % items.len()], false);
        }
        Action::Show(i) => {
            engine.set_furniture_visible(items[i % items.len()], true);
        }
        Action::TipBox(tipped) => {
            for &item in &scene.furniture {
                engine.set_box_tipped(item, tipped);
            }
        }
        Action::Refill(i) => {
            engine.refill(scene.furniture[i % scene.furniture.len()], &mut FreeRefills);
        }
    }
}

fn check(engine: &SimulationEngine, scene: &SceneEntities) -> Result<(), TestCaseError> {
    let boundary = engine.config().room.boundary;
    let pet_entity = scene.pets[0];
    let pet = engine.world.get::<&Pet>(pet_entity).unwrap();

    prop_assert!(pet.position.is_finite());
    prop_assert!(pet.position.x.abs() <= boundary && pet.position.z.abs() <= boundary);
    prop_assert!((0.0..=100.0).contains(&pet.stats.hunger));
    prop_assert!((0.0..=100.0).contains(&pet.stats.toilet));
    prop_assert!(pet.target_furniture().is_none() || pet.interact_target().is_none());
    prop_assert!(pet.pet_count() <= pet.patience() + 1);
    if pet.state() == PetState::Angry {
        prop_assert!(pet.anger_remaining() > 0.0);
    }
    if let Some(vehicle) = pet.riding() {
        let appliance = engine.world.get::<&Appliance>(vehicle).unwrap();
        prop_assert_eq!(appliance.rider(), Some(pet_entity));
    }

    let vacuum = engine.world.get::<&Appliance>(scene.appliances[0]).unwrap();
    prop_assert!(vacuum.position.is_finite());
    prop_assert!(vacuum.position.x.abs() <= boundary && vacuum.position.z.abs() <= boundary);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn household_stays_consistent(actions in proptest::collection::vec(action(), 1..60)) {
        let mut engine = SimulationEngine::new();
        let scene = engine.build_scene(&SceneSpec::household()).unwrap();

        for action in &actions {
            apply(&mut engine, &scene, action);
            if matches!(action, Action::Tick(_)) {
                check(&engine, &scene)?;
            }
        }
    }

    #[test]
    fn angle_normalization_stays_in_range(angle in -1000.0f32..1000.0) {
        let a = normalize_angle(angle);
        prop_assert!(a > -std::f32::consts::PI - 1e-5 && a <= std::f32::consts::PI + 1e-5);
        prop_assert!((a.sin() - angle.sin()).abs() < 1e-3);
    }
}
