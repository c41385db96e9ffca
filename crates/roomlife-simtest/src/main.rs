//! RoomLife Headless Scenario Harness
//!
//! Runs the pet and robot vacuum behaviors through the engine and checks the
//! outcomes. Runs entirely in-process: no renderer, no input devices.
//!
//! Usage:
//!   cargo run -p roomlife-simtest
//!   cargo run -p roomlife-simtest -- --verbose
//!   cargo run -p roomlife-simtest -- --config my_room.json --json

use std::f32::consts::FRAC_PI_2;

use roomlife_core::config::{SceneSpec, SimConfig};
use roomlife_core::context::FlatRoom;
use roomlife_core::prelude::*;
use roomlife_core::schedule::ScheduleConfig;
use roomlife_core::systems::Refusal;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

// ── Scene data (same JSON a front end would ship) ───────────────────────
const HOUSEHOLD_JSON: &str = include_str!("../../../data/household.json");

const DT: f32 = 0.05;

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    passed: usize,
    failed: usize,
    results: &'a [TestResult],
}

/// Engine `log` records reach stderr through the tracing-log bridge.
/// `RUST_LOG` overrides the default `info` filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

struct Args {
    verbose: bool,
    json: bool,
    config: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1).cloned());
    Args {
        verbose: args.iter().any(|a| a == "--verbose"),
        json: args.iter().any(|a| a == "--json"),
        config,
    }
}

fn main() {
    let args = parse_args();
    if args.verbose {
        init_tracing();
    }
    println!("=== RoomLife Scenario Harness ===\n");

    let mut results = Vec::new();

    // 0. Configuration
    let config = match &args.config {
        Some(path) => match SimConfig::load(path) {
            Ok(config) => {
                results.push(TestResult {
                    name: "config_load".into(),
                    passed: true,
                    detail: format!("loaded {}", path),
                });
                config
            }
            Err(e) => {
                results.push(TestResult {
                    name: "config_load".into(),
                    passed: false,
                    detail: format!("{}: {}", path, e),
                });
                SimConfig::default()
            }
        },
        None => SimConfig::default(),
    };

    // 1. Scene data
    results.extend(validate_scene_data(&config, args.verbose));

    // 2. Needs loop
    results.extend(validate_needs(args.verbose));

    // 3. Player interaction
    results.extend(validate_social(args.verbose));

    // 4. Stale furniture references
    results.extend(validate_stale_references(args.verbose));

    // 5. Robot vacuum coverage
    results.extend(validate_coverage(args.verbose));

    // 6. Tick scheduling
    results.extend(validate_scheduling(args.verbose));

    // 7. Save / load
    results.extend(validate_persistence(args.verbose));

    // 8. Long soak on the shipped household
    results.extend(validate_soak(&config, args.verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    if args.json {
        let report = Report {
            passed,
            failed,
            results: &results,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("failed to encode report: {}", e),
        }
    } else {
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || args.verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Tick until `pred` holds for `pet`. Returns the ticks taken.
fn run_pet_until(
    engine: &mut SimulationEngine,
    pet: hecs::Entity,
    max_ticks: usize,
    pred: impl Fn(&Pet) -> bool,
) -> Option<usize> {
    for n in 1..=max_ticks {
        engine.update(DT);
        let done = engine.world.get::<&Pet>(pet).map(|p| pred(&p)).unwrap_or(false);
        if done {
            return Some(n);
        }
    }
    None
}

/// Tick until the vacuum's phase satisfies `pred`. Returns the ticks taken.
fn run_vacuum_until(
    engine: &mut SimulationEngine,
    vacuum: hecs::Entity,
    max_ticks: usize,
    pred: impl Fn(Phase, SubState) -> bool,
) -> Option<usize> {
    for n in 1..=max_ticks {
        engine.update(DT);
        if let Some((phase, sub)) = engine.appliance_phase(vacuum) {
            if pred(phase, sub) {
                return Some(n);
            }
        }
    }
    None
}

fn count_diary(effects: &[Effect], event: DiaryEvent) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::Diary { event: ev, .. } if *ev == event))
        .count()
}

fn engine_with_boundary(boundary: f32) -> SimulationEngine {
    SimulationEngine::with_config(SimConfig {
        room: FlatRoom::new(boundary),
        ..Default::default()
    })
}

// ── 1. Scene Data ───────────────────────────────────────────────────────

fn validate_scene_data(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Scene Data ---");
    let mut results = Vec::new();

    let issues = config.validate();
    results.push(TestResult {
        name: "config_valid".into(),
        passed: issues.is_empty(),
        detail: if issues.is_empty() {
            format!("seed {}, room boundary {}", config.seed, config.room.boundary)
        } else {
            issues.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("; ")
        },
    });

    let scene = match SceneSpec::from_json(HOUSEHOLD_JSON) {
        Ok(scene) => scene,
        Err(e) => {
            results.push(TestResult {
                name: "scene_parse".into(),
                passed: false,
                detail: format!("household.json: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "scene_not_empty".into(),
        passed: !scene.furniture.is_empty() && !scene.pets.is_empty(),
        detail: format!(
            "{} furniture, {} pets, {} appliances",
            scene.furniture.len(),
            scene.pets.len(),
            scene.appliances.len()
        ),
    });

    // Everything placed inside the room
    let boundary = config.room.boundary;
    let outside: Vec<_> = scene
        .furniture
        .iter()
        .filter(|p| p.x.abs() > boundary || p.z.abs() > boundary)
        .collect();
    results.push(TestResult {
        name: "scene_inside_room".into(),
        passed: outside.is_empty(),
        detail: format!("{} placements outside ±{}", outside.len(), boundary),
    });

    // A pet needs somewhere to eat and somewhere to go
    let resolved: Vec<FurnitureConfig> = scene
        .furniture
        .iter()
        .filter_map(|p| p.resolve().ok())
        .collect();
    let has_food = resolved.iter().any(|c| c.utility == Utility::Food);
    let has_toilet = resolved.iter().any(|c| c.utility == Utility::Toilet);
    results.push(TestResult {
        name: "scene_has_resources".into(),
        passed: has_food && has_toilet,
        detail: format!("food={} toilet={}", has_food, has_toilet),
    });

    let mut engine = SimulationEngine::with_config(config.clone());
    match engine.build_scene(&scene) {
        Ok(spawned) => {
            if verbose {
                for &e in &spawned.furniture {
                    if let Ok(f) = engine.world.get::<&Furniture>(e) {
                        println!("  placed {} ({:?})", f.config.category, f.config.layer);
                    }
                }
            }
            results.push(TestResult {
                name: "scene_builds".into(),
                passed: spawned.furniture.len() == scene.furniture.len()
                    && spawned.pets.len() == scene.pets.len(),
                detail: format!("{} entities spawned", engine.world.len()),
            });
        }
        Err(e) => results.push(TestResult {
            name: "scene_builds".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    results
}

// ── 2. Needs ────────────────────────────────────────────────────────────

fn validate_needs(_verbose: bool) -> Vec<TestResult> {
    println!("--- Needs Loop ---");
    let mut results = Vec::new();

    // Hungry pet walks to the bowl, eats, and leaves it empty
    let mut engine = SimulationEngine::new();
    let bowl = engine.place_furniture(FurnitureConfig::food_bowl(), Vec3::ground(3.0, 0.0), 0.0);
    let pet = engine.spawn_pet_with(Pet::new(Vec3::ZERO, 5).with_needs(Needs::new(20.0, 100.0)));

    let reached = run_pet_until(&mut engine, pet, 400, |p| p.state() == PetState::Eating);
    results.push(TestResult {
        name: "needs_walks_to_food".into(),
        passed: reached.is_some(),
        detail: format!("eating after {:?} ticks", reached),
    });

    let finished = run_pet_until(&mut engine, pet, 200, |p| p.state() != PetState::Eating);
    let hunger = engine.world.get::<&Pet>(pet).map(|p| p.stats.hunger).unwrap_or(0.0);
    let bowl_empty = engine.interact(bowl) == Some(true);
    results.push(TestResult {
        name: "needs_meal_consumes_bowl".into(),
        passed: finished.is_some() && hunger > 99.0 && bowl_empty,
        detail: format!("hunger {:.1}, bowl needs refill: {}", hunger, bowl_empty),
    });

    let effects = engine.drain_effects();
    let ate = count_diary(&effects, DiaryEvent::Ate);
    let saves = effects.iter().filter(|e| matches!(e, Effect::SaveRequested)).count();
    results.push(TestResult {
        name: "needs_meal_effects".into(),
        passed: ate == 1 && saves == 1,
        detail: format!("diary Ate x{}, save requests x{}", ate, saves),
    });

    // Empty bowl: the pet complains instead of walking over
    let mut engine = SimulationEngine::new();
    let bowl = engine.place_furniture(FurnitureConfig::food_bowl(), Vec3::ground(3.0, 0.0), 0.0);
    if let Ok(mut f) = engine.world.get::<&mut Furniture>(bowl) {
        f.state = Some(FunctionalState::Empty);
    }
    let pet = engine.spawn_pet_with(Pet::new(Vec3::ZERO, 5).with_needs(Needs::new(20.0, 100.0)));
    for _ in 0..300 {
        engine.update(DT);
    }
    let meows = engine
        .drain_effects()
        .iter()
        .filter(|e| matches!(e, Effect::Sound(Sound::Meow)))
        .count();
    results.push(TestResult {
        name: "needs_unmet_meow_throttled".into(),
        passed: meows == 2 && engine.pet_state(pet) == Some(PetState::Idle),
        detail: format!("{} meows in 15s", meows),
    });

    // Refill restores the bowl
    let outcome = engine.refill(bowl, &mut FreeRefills);
    results.push(TestResult {
        name: "needs_refill".into(),
        passed: outcome == Some(RefillOutcome::Refilled) && engine.interact(bowl) == Some(false),
        detail: format!("{:?}", outcome),
    });

    results
}

// ── 3. Player Interaction ───────────────────────────────────────────────

fn validate_social(_verbose: bool) -> Vec<TestResult> {
    println!("--- Player Interaction ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::new();
    let pet = engine.spawn_pet_with(Pet::new(Vec3::ZERO, 5));

    let responses: Vec<_> = (0..7).filter_map(|_| engine.pet(pet)).collect();
    let rewarded = responses
        .iter()
        .filter(|r| matches!(r, PetResponse::Rewarded { .. }))
        .count();
    results.push(TestResult {
        name: "social_patience_limit".into(),
        passed: rewarded == 5
            && responses.get(5) == Some(&PetResponse::BecameAngry)
            && responses.get(6) == Some(&PetResponse::Refused(Refusal::Angry)),
        detail: format!("{:?}", responses),
    });

    let refused_drag = !engine.set_dragged(pet, true);
    results.push(TestResult {
        name: "social_angry_not_draggable".into(),
        passed: refused_drag,
        detail: format!("drag refused: {}", refused_drag),
    });

    engine.advance(905.0, TickRegime::Background);
    let calm = engine.pet_state(pet) != Some(PetState::Angry);
    let again = engine.pet(pet);
    results.push(TestResult {
        name: "social_anger_cools_down".into(),
        passed: calm && again == Some(PetResponse::Rewarded { count: 1 }),
        detail: format!("after 15 min: {:?}", again),
    });

    let mut engine = SimulationEngine::new();
    let hungry = engine.spawn_pet_with(Pet::new(Vec3::ZERO, 5).with_needs(Needs::new(10.0, 100.0)));
    let response = engine.pet(hungry);
    results.push(TestResult {
        name: "social_hungry_refuses".into(),
        passed: response == Some(PetResponse::Refused(Refusal::Hungry)),
        detail: format!("{:?}", response),
    });

    let reacted = engine.react_to_sound(Vec3::ground(2.0, 2.0));
    results.push(TestResult {
        name: "social_sound_draws_pet".into(),
        passed: reacted == 1 && engine.pet_state(hungry) == Some(PetState::Walking),
        detail: format!("{} pets reacted", reacted),
    });

    results
}

// ── 4. Stale References ─────────────────────────────────────────────────

fn validate_stale_references(_verbose: bool) -> Vec<TestResult> {
    println!("--- Stale References ---");
    let mut results = Vec::new();

    for (name, hide) in [("stale_removed_target", false), ("stale_hidden_target", true)] {
        let mut engine = SimulationEngine::new();
        let bowl = engine.place_furniture(FurnitureConfig::food_bowl(), Vec3::ground(3.0, 0.0), 0.0);
        let pet = engine.spawn_pet_with(Pet::new(Vec3::ZERO, 5).with_needs(Needs::new(20.0, 100.0)));
        run_pet_until(&mut engine, pet, 100, |p| p.state() == PetState::Walking);

        if hide {
            engine.set_furniture_visible(bowl, false);
        } else {
            engine.remove_furniture(bowl);
        }
        engine.update(DT);

        let (state, target) = engine
            .world
            .get::<&Pet>(pet)
            .map(|p| (p.state(), p.target_furniture()))
            .unwrap_or((PetState::Walking, None));
        results.push(TestResult {
            name: name.into(),
            passed: state == PetState::Idle && target.is_none(),
            detail: format!("pet {} with target {:?}", state, target),
        });
    }

    results
}

// ── 5. Coverage ─────────────────────────────────────────────────────────

fn validate_coverage(verbose: bool) -> Vec<TestResult> {
    println!("--- Robot Vacuum Coverage ---");
    let mut results = Vec::new();

    let mut engine = engine_with_boundary(2.5);
    let vacuum = engine.spawn_appliance(Vec3::ground(-1.5, -1.5), -FRAC_PI_2);

    let looped = run_vacuum_until(&mut engine, vacuum, 3000, |phase, _| phase != Phase::WallFollow);
    let loop_distance = engine
        .world
        .get::<&Appliance>(vacuum)
        .map(|a| a.loop_distance())
        .unwrap_or(0.0);
    results.push(TestResult {
        name: "coverage_perimeter_closes".into(),
        passed: looped.is_some() && engine.appliance_phase(vacuum).map(|p| p.0) == Some(Phase::Zigzag),
        detail: format!("loop of {:.1} after {:?} ticks", loop_distance, looped),
    });

    let swept = run_vacuum_until(&mut engine, vacuum, 5000, |phase, _| phase != Phase::Zigzag);
    let rows = engine.world.get::<&Appliance>(vacuum).map(|a| a.row()).unwrap_or(0);
    results.push(TestResult {
        name: "coverage_zigzag_completes".into(),
        passed: swept.is_some() && engine.appliance_phase(vacuum).map(|p| p.0) == Some(Phase::Idle),
        detail: format!("{} rows", rows),
    });

    let idle = run_vacuum_until(&mut engine, vacuum, 200, |phase, _| phase != Phase::Idle);
    results.push(TestResult {
        name: "coverage_idle_then_restart".into(),
        passed: idle.is_some_and(|t| (59..=62).contains(&t))
            && engine.appliance_phase(vacuum) == Some((Phase::WallFollow, SubState::Init)),
        detail: format!("idled {:?} ticks", idle),
    });

    // Boxed in by furniture: rescue, then time out
    let mut engine = SimulationEngine::new();
    for i in 0..8 {
        let angle = i as f32 * std::f32::consts::TAU / 8.0;
        engine.place_furniture(
            FurnitureConfig::cat_tower(),
            Vec3::ground(0.55 * angle.cos(), 0.55 * angle.sin()),
            0.0,
        );
    }
    let vacuum = engine.spawn_appliance(Vec3::ZERO, 0.0);
    let stuck = run_vacuum_until(&mut engine, vacuum, 400, |phase, _| phase == Phase::Rescue);
    let released = run_vacuum_until(&mut engine, vacuum, 200, |phase, _| phase != Phase::Rescue);
    if verbose {
        println!("  rescue entered after {:?} ticks, left after {:?}", stuck, released);
    }
    results.push(TestResult {
        name: "coverage_rescue_timeout".into(),
        passed: stuck.is_some() && released.is_some_and(|t| (99..=102).contains(&t)),
        detail: format!("stuck after {:?}, rescue lasted {:?} ticks", stuck, released),
    });

    results
}

// ── 6. Scheduling ───────────────────────────────────────────────────────

fn validate_scheduling(_verbose: bool) -> Vec<TestResult> {
    println!("--- Tick Scheduling ---");
    let mut results = Vec::new();

    let config = SimConfig {
        schedule: ScheduleConfig {
            fixed_step: 0.0625,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut fore = SimulationEngine::with_config(config.clone());
    let mut back = SimulationEngine::with_config(config);
    let built = fore
        .build_scene(&SceneSpec::household())
        .and_then(|scene| back.build_scene(&SceneSpec::household()).map(|_| scene));
    let scene = match built {
        Ok(scene) => scene,
        Err(e) => {
            results.push(TestResult {
                name: "schedule_scene".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    let fore_steps: u32 = (0..640).map(|_| fore.advance(1.0 / 64.0, TickRegime::Foreground)).sum();
    let back_steps: u32 = (0..20).map(|_| back.advance(0.5, TickRegime::Background)).sum();
    results.push(TestResult {
        name: "schedule_step_counts".into(),
        passed: fore_steps == 160 && back_steps == 160,
        detail: format!("foreground {} steps, background {} steps", fore_steps, back_steps),
    });

    let pet_pos = |engine: &SimulationEngine| engine.world.get::<&Pet>(scene.pets[0]).map(|p| p.position).ok();
    let vac_pos = |engine: &SimulationEngine| {
        engine
            .world
            .get::<&Appliance>(scene.appliances[0])
            .map(|a| a.position)
            .ok()
    };
    results.push(TestResult {
        name: "schedule_regimes_agree".into(),
        passed: pet_pos(&fore) == pet_pos(&back) && vac_pos(&fore) == vac_pos(&back),
        detail: format!("pet {:?} vs {:?}", pet_pos(&fore), pet_pos(&back)),
    });

    let mut engine = SimulationEngine::new();
    let steps = engine.advance(1.0e9, TickRegime::Background);
    results.push(TestResult {
        name: "schedule_catch_up_capped".into(),
        passed: steps == 72_000 || steps == 71_999,
        detail: format!("{} steps for an absurd gap", steps),
    });

    results
}

// ── 7. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(_verbose: bool) -> Vec<TestResult> {
    println!("--- Save / Load ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::new();
    if let Err(e) = engine.build_scene(&SceneSpec::household()) {
        results.push(TestResult {
            name: "persist_scene".into(),
            passed: false,
            detail: e.to_string(),
        });
        return results;
    }
    for _ in 0..400 {
        engine.update(DT);
    }

    let mut buffer = Vec::new();
    let saved = engine.save(&mut buffer);
    results.push(TestResult {
        name: "persist_save".into(),
        passed: saved.is_ok(),
        detail: format!("{} bytes", buffer.len()),
    });

    let mut loaded = SimulationEngine::new();
    let restored = loaded.load(&buffer[..]);
    results.push(TestResult {
        name: "persist_load".into(),
        passed: restored.is_ok()
            && loaded.furniture_entities().len() == engine.furniture_entities().len()
            && loaded.pets().len() == engine.pets().len(),
        detail: match restored {
            Ok(()) => format!(
                "{} furniture, {} pets restored",
                loaded.furniture_entities().len(),
                loaded.pets().len()
            ),
            Err(e) => e.to_string(),
        },
    });

    let garbage = SimulationEngine::new().load(&[0xFFu8, 0xFF, 0xFF][..]);
    results.push(TestResult {
        name: "persist_rejects_garbage".into(),
        passed: garbage.is_err(),
        detail: match garbage {
            Ok(()) => "garbage accepted".into(),
            Err(e) => e.to_string(),
        },
    });

    results
}

// ── 8. Soak ─────────────────────────────────────────────────────────────

fn validate_soak(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Household Soak ---");
    let mut results = Vec::new();

    let scene = match SceneSpec::from_json(HOUSEHOLD_JSON) {
        Ok(scene) => scene,
        Err(e) => {
            results.push(TestResult {
                name: "soak_scene".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let mut engine = SimulationEngine::with_config(config.clone());
    let spawned = match engine.build_scene(&scene) {
        Ok(spawned) => spawned,
        Err(e) => {
            results.push(TestResult {
                name: "soak_scene".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    let boundary = config.room.boundary;
    let mut violations = Vec::new();
    let mut diary = std::collections::HashMap::new();
    for chunk in 0..24 {
        engine.advance(300.0, TickRegime::Background);
        for &pet in &spawned.pets {
            let Ok(p) = engine.world.get::<&Pet>(pet) else {
                continue;
            };
            if !p.position.is_finite() || p.position.x.abs() > boundary || p.position.z.abs() > boundary {
                violations.push(format!("chunk {}: pet at {:?}", chunk, p.position));
            }
            if p.target_furniture().is_some() && p.interact_target().is_some() {
                violations.push(format!("chunk {}: pet holds two targets", chunk));
            }
        }
        for effect in engine.drain_effects() {
            if let Effect::Diary { event, .. } = effect {
                *diary.entry(event).or_insert(0u32) += 1;
            }
        }
    }

    if verbose {
        let mut entries: Vec<_> = diary.iter().collect();
        entries.sort_by_key(|(_, n)| std::cmp::Reverse(**n));
        for (event, n) in entries {
            println!("  diary {:?} x{}", event, n);
        }
    }

    results.push(TestResult {
        name: "soak_invariants".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            format!("2h simulated, {:.0}s", engine.sim_time())
        } else {
            violations.join("; ")
        },
    });

    let ate = diary.get(&DiaryEvent::Ate).copied().unwrap_or(0);
    results.push(TestResult {
        name: "soak_pets_eat".into(),
        passed: ate > 0,
        detail: format!("{} meals", ate),
    });

    let abandoned: u32 = spawned
        .pets
        .iter()
        .filter_map(|&pet| engine.world.get::<&Pet>(pet).ok().map(|p| p.goals_abandoned()))
        .sum();
    let traveled = spawned
        .appliances
        .iter()
        .filter_map(|&v| engine.world.get::<&Appliance>(v).ok().map(|a| a.distance_traveled()))
        .sum::<f32>();
    results.push(TestResult {
        name: "soak_vacuum_moves".into(),
        passed: traveled > 100.0,
        detail: format!("vacuum traveled {:.0}, pets abandoned {} goals", traveled, abandoned),
    });

    // Distance alone passes for a vacuum circling the perimeter forever
    let rows: u32 = spawned
        .appliances
        .iter()
        .filter_map(|&v| engine.world.get::<&Appliance>(v).ok().map(|a| a.row()))
        .sum();
    results.push(TestResult {
        name: "soak_vacuum_sweeps".into(),
        passed: rows > 0,
        detail: format!("{} sweep rows", rows),
    });

    results
}
