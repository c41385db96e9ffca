//! Integration tests for the robot vacuum coverage cycle.
//!
//! Exercises: WALL_FOLLOW → ZIGZAG → IDLE → WALL_FOLLOW, and RESCUE
//! from a blocked position, through the engine tick loop.

use std::f32::consts::FRAC_PI_2;

use roomlife_core::config::{SceneSpec, SimConfig};
use roomlife_core::context::FlatRoom;
use roomlife_core::engine::SimulationEngine;
use roomlife_core::prelude::*;

// ── Helpers ────────────────────────────────────────────────────────────

const DT: f32 = 0.05;

fn engine_with_boundary(boundary: f32) -> SimulationEngine {
    SimulationEngine::with_config(SimConfig {
        room: FlatRoom::new(boundary),
        ..Default::default()
    })
}

fn phase(engine: &SimulationEngine, vacuum: hecs::Entity) -> (Phase, SubState) {
    engine.appliance_phase(vacuum).unwrap()
}

/// Tick until the vacuum's phase satisfies `pred`, returning the ticks taken.
fn ticks_until(
    engine: &mut SimulationEngine,
    vacuum: hecs::Entity,
    max_ticks: usize,
    pred: impl Fn(Phase) -> bool,
) -> usize {
    for n in 1..=max_ticks {
        engine.update(DT);
        if pred(phase(engine, vacuum).0) {
            return n;
        }
    }
    panic!("phase condition not reached within {} ticks", max_ticks);
}

/// Ring of cat towers tight enough that no heading is free.
fn enclose(engine: &mut SimulationEngine) -> Vec<hecs::Entity> {
    (0..8)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::TAU / 8.0;
            let at = Vec3::ground(0.55 * angle.cos(), 0.55 * angle.sin());
            engine.place_furniture(FurnitureConfig::cat_tower(), at, 0.0)
        })
        .collect()
}

// ── Perimeter and sweep ────────────────────────────────────────────────

#[test]
fn full_cycle_in_square_room() {
    let mut engine = engine_with_boundary(2.5);
    let vacuum = engine.spawn_appliance(Vec3::ground(-1.5, -1.5), -FRAC_PI_2);

    let mut saw_following = false;
    for _ in 0..3000 {
        engine.update(DT);
        match phase(&engine, vacuum) {
            (Phase::WallFollow, SubState::FollowingWall) => saw_following = true,
            (Phase::Zigzag, _) => break,
            (Phase::Rescue, _) => panic!("got stuck during the perimeter pass"),
            _ => {}
        }
    }
    assert!(saw_following);
    {
        let a = engine.world.get::<&Appliance>(vacuum).unwrap();
        assert_eq!(a.phase(), Phase::Zigzag);
        assert!(a.loop_distance() > a.config.min_loop_distance);
        let anchor = a.anchor().unwrap();
        assert!(a.position.flat_distance(&anchor) < 0.8);
        // Anchor sits against the west wall
        assert!(anchor.x < -2.0);
    }

    ticks_until(&mut engine, vacuum, 5000, |p| {
        assert_ne!(p, Phase::Rescue);
        p == Phase::Idle
    });
    let rows = engine.world.get::<&Appliance>(vacuum).unwrap().row();
    assert!(rows >= 6, "only {} rows swept", rows);

    let idle_ticks = ticks_until(&mut engine, vacuum, 200, |p| p != Phase::Idle);
    assert!((59..=62).contains(&idle_ticks), "idled {} ticks", idle_ticks);
    assert_eq!(phase(&engine, vacuum), (Phase::WallFollow, SubState::Init));
}

#[test]
fn household_scene_closes_perimeter_then_sweeps() {
    let mut engine = SimulationEngine::new();
    let scene = engine.build_scene(&SceneSpec::household()).unwrap();
    let vacuum = scene.appliances[0];

    ticks_until(&mut engine, vacuum, 4000, |p| p == Phase::Zigzag);
    {
        let a = engine.world.get::<&Appliance>(vacuum).unwrap();
        let anchor = a.anchor().unwrap();
        // Closed on the anchor rather than falling back after two laps
        assert!(a.position.flat_distance(&anchor) < 0.8);
        assert!(a.loop_distance() < 2.0 * 8.0 * engine.config().room.boundary);
    }

    ticks_until(&mut engine, vacuum, 6000, |p| p == Phase::Idle);
    let a = engine.world.get::<&Appliance>(vacuum).unwrap();
    assert!(a.row() > 0);
}

#[test]
fn vacuum_stays_out_of_furniture() {
    let mut engine = engine_with_boundary(4.0);
    let sofa = engine.place_furniture(FurnitureConfig::sofa(), Vec3::ground(1.0, 1.0), 0.0);
    let tower = engine.place_furniture(FurnitureConfig::cat_tower(), Vec3::ground(-2.0, 2.0), 0.0);
    let vacuum = engine.spawn_appliance(Vec3::ground(-1.0, -1.0), 0.0);
    let radius = engine.config().appliance.radius;

    let keep_out: Vec<_> = [sofa, tower]
        .iter()
        .map(|&e| {
            let f = engine.world.get::<&Furniture>(e).unwrap();
            let t = *engine.world.get::<&Transform>(e).unwrap();
            f.bounds(&t).expanded(radius - 0.1)
        })
        .collect();

    for _ in 0..4000 {
        engine.update(DT);
        let position = engine.world.get::<&Appliance>(vacuum).unwrap().position;
        assert!(position.x.abs() < 4.0 && position.z.abs() < 4.0);
        for bounds in &keep_out {
            assert!(!bounds.contains_flat(&position), "drove into furniture at {:?}", position);
        }
    }
}

#[test]
fn flat_and_wall_mounted_items_do_not_block() {
    let mut engine = engine_with_boundary(4.0);
    engine.place_furniture(FurnitureConfig::rug(), Vec3::ground(-1.0, 0.0), 0.0);
    engine.place_furniture(FurnitureConfig::wall_shelf(), Vec3::ground(-2.5, 0.0), FRAC_PI_2);
    let vacuum = engine.spawn_appliance(Vec3::ZERO, -FRAC_PI_2);

    for _ in 0..400 {
        engine.update(DT);
        if phase(&engine, vacuum).1 == SubState::FollowingWall {
            break;
        }
    }
    let a = engine.world.get::<&Appliance>(vacuum).unwrap();
    assert_eq!(a.sub_state(), SubState::FollowingWall);
    assert!(a.position.x < -3.5);
}

// ── Rescue ─────────────────────────────────────────────────────────────

#[test]
fn boxed_in_vacuum_rescues_then_times_out() {
    let mut engine = engine_with_boundary(4.0);
    enclose(&mut engine);
    let vacuum = engine.spawn_appliance(Vec3::ZERO, 0.0);

    ticks_until(&mut engine, vacuum, 400, |p| p == Phase::Rescue);
    assert_eq!(engine.world.get::<&Appliance>(vacuum).unwrap().rescue_moves(), 0);

    // Nothing moves, so only the timeout ends the rescue
    let rescue_ticks = ticks_until(&mut engine, vacuum, 200, |p| p != Phase::Rescue);
    assert!((99..=102).contains(&rescue_ticks), "rescued for {} ticks", rescue_ticks);
    assert_eq!(phase(&engine, vacuum), (Phase::WallFollow, SubState::Init));
    assert_eq!(engine.world.get::<&Appliance>(vacuum).unwrap().position, Vec3::ZERO);
}

#[test]
fn freed_vacuum_escapes_after_clean_moves() {
    let mut engine = engine_with_boundary(4.0);
    let walls = enclose(&mut engine);
    let vacuum = engine.spawn_appliance(Vec3::ZERO, 0.0);

    ticks_until(&mut engine, vacuum, 400, |p| p == Phase::Rescue);
    for wall in walls {
        assert!(engine.remove_furniture(wall));
    }

    let escape_ticks = ticks_until(&mut engine, vacuum, 200, |p| p != Phase::Rescue);
    assert_eq!(escape_ticks, 30);
    assert_eq!(phase(&engine, vacuum), (Phase::WallFollow, SubState::Init));

    let a = engine.world.get::<&Appliance>(vacuum).unwrap();
    assert!((a.position.flat_distance(&Vec3::ZERO) - 0.9).abs() < 1e-3);
}

// ── Riders ─────────────────────────────────────────────────────────────

#[test]
fn seat_is_released_when_rider_is_not_aboard() {
    let mut engine = SimulationEngine::new();
    let vacuum = engine.spawn_appliance(Vec3::ZERO, 0.0);
    let pet = engine.spawn_pet_with(Pet::new(Vec3::ground(2.0, 2.0), 5));

    assert!(engine.world.get::<&mut Appliance>(vacuum).unwrap().mount(pet));
    engine.update(DT);
    assert_eq!(engine.world.get::<&Appliance>(vacuum).unwrap().rider(), None);
}

#[test]
fn hidden_vacuum_stands_still() {
    let mut engine = SimulationEngine::new();
    let vacuum = engine.spawn_appliance(Vec3::ZERO, 0.0);
    engine.set_furniture_visible(vacuum, false);

    for _ in 0..50 {
        engine.update(DT);
    }
    let a = engine.world.get::<&Appliance>(vacuum).unwrap();
    assert_eq!(a.position, Vec3::ZERO);
    assert_eq!(a.distance_traveled(), 0.0);
}
