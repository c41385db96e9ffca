//! Robot vacuum coverage - perimeter pass, then boustrophedon sweeps.
//!
//! Phases cycle forever:
//! 1. WALL_FOLLOW: find a wall, keep it on the right until the loop closes
//! 2. ZIGZAG: sweep lanes one brush width apart until a lane shift is refused
//! 3. IDLE: rest, then start over
//!
//! RESCUE preempts any phase once too many moves in a row are blocked.

use std::f32::consts::{FRAC_PI_2, PI};

use hecs::Entity;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::spatial::{Spatial, APPLIANCE_RADIUS};
use crate::components::{normalize_angle, Vec3};
use crate::context::SimContext;

/// Consecutive blocked moves tolerated before rescue
pub const STUCK_LIMIT: u32 = 5;
/// Turns finish once within this many radians of the target
pub const TURN_SNAP: f32 = 0.05;
/// Obstacle sensor distance past the projected step
pub const STEP_LOOKAHEAD: f32 = 0.05;
/// Distance since the last turn before the right side is checked
pub const WALL_CHECK_DISTANCE: f32 = 0.3;
/// Sideways reach of the right-hand wall sensor, past the body radius
pub const WALL_SENSOR_REACH: f32 = 0.15;
/// Loop closes within this distance of the anchor
pub const LOOP_CLOSE_RADIUS: f32 = 0.8;
/// Perimeter pass gives up after this many room perimeters without closing
pub const LOOP_GIVE_UP_LAPS: f32 = 2.0;
/// A lane shift refused before this fraction of the lane width ends coverage
pub const SHIFT_COMPLETE_FRACTION: f32 = 0.3;
pub const IDLE_DURATION: f32 = 3.0;
pub const RESCUE_TIMEOUT: f32 = 5.0;
/// Clean moves in a row that count as escaped
pub const RESCUE_ESCAPE_MOVES: u32 = 30;

/// Tunables, usually loaded as part of the simulation config
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplianceConfig {
    /// Units per second
    pub move_speed: f32,
    pub radius: f32,
    /// Radians per second
    pub turn_speed: f32,
    /// Distance between sweep rows
    pub lane_width: f32,
    /// Perimeter length required before the loop can close
    pub min_loop_distance: f32,
}

impl Default for ApplianceConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.6,
            radius: APPLIANCE_RADIUS,
            turn_speed: 2.0,
            lane_width: 0.5,
            min_loop_distance: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    WallFollow,
    Zigzag,
    Rescue,
    Idle,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::WallFollow => "WALL_FOLLOW",
            Phase::Zigzag => "ZIGZAG",
            Phase::Rescue => "RESCUE",
            Phase::Idle => "IDLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubState {
    Init,
    FindingWall,
    FollowingWall,
    ZigzagHorizontal,
    ZigzagShifting,
    /// Rescue and idle have no sub-states
    None,
}

impl SubState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubState::Init => "INIT",
            SubState::FindingWall => "FINDING_WALL",
            SubState::FollowingWall => "FOLLOWING_WALL",
            SubState::ZigzagHorizontal => "ZIGZAG_HORIZONTAL",
            SubState::ZigzagShifting => "ZIGZAG_SHIFTING",
            SubState::None => "NONE",
        }
    }
}

/// Robot vacuum component. Lives on a furniture entity flagged as a vehicle;
/// the engine copies `position` and `facing` into its transform each tick.
#[derive(Debug, Clone)]
pub struct Appliance {
    pub position: Vec3,
    /// Yaw in radians, normalized to (-pi, pi]
    pub facing: f32,
    pub config: ApplianceConfig,
    phase: Phase,
    sub_state: SubState,
    /// Set while an interpolated turn is in progress
    turn_target: Option<f32>,
    stuck_counter: u32,
    distance_traveled: f32,

    // Perimeter pass
    anchor: Option<Vec3>,
    loop_distance: f32,
    since_turn: f32,

    // Sweeps
    /// +1 or -1 along x
    sweep_dir: f32,
    /// +1 or -1 along z
    lane_dir: f32,
    shift_step: u8,
    shift_traveled: f32,
    row: u32,

    idle_timer: f32,
    rescue_time: f32,
    rescue_moves: u32,

    rider: Option<Entity>,
}

impl Appliance {
    pub fn new(position: Vec3, facing: f32, config: ApplianceConfig) -> Self {
        Self {
            position,
            facing: normalize_angle(facing),
            config,
            phase: Phase::WallFollow,
            sub_state: SubState::Init,
            turn_target: None,
            stuck_counter: 0,
            distance_traveled: 0.0,
            anchor: None,
            loop_distance: 0.0,
            since_turn: 0.0,
            sweep_dir: 1.0,
            lane_dir: 1.0,
            shift_step: 0,
            shift_traveled: 0.0,
            row: 0,
            idle_timer: 0.0,
            rescue_time: 0.0,
            rescue_moves: 0,
            rider: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn sub_state(&self) -> SubState {
        self.sub_state
    }

    pub fn is_turning(&self) -> bool {
        self.turn_target.is_some()
    }

    pub fn stuck_counter(&self) -> u32 {
        self.stuck_counter
    }

    /// Total distance moved since spawn
    pub fn distance_traveled(&self) -> f32 {
        self.distance_traveled
    }

    /// Perimeter distance in the current wall-follow pass
    pub fn loop_distance(&self) -> f32 {
        self.loop_distance
    }

    pub fn anchor(&self) -> Option<Vec3> {
        self.anchor
    }

    /// Sweep rows completed
    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn rescue_moves(&self) -> u32 {
        self.rescue_moves
    }

    pub fn rider(&self) -> Option<Entity> {
        self.rider
    }

    /// Seat a rider. Fails if someone is already aboard.
    pub fn mount(&mut self, rider: Entity) -> bool {
        if self.rider.is_some_and(|r| r != rider) {
            return false;
        }
        self.rider = Some(rider);
        true
    }

    pub fn dismount(&mut self) -> Option<Entity> {
        self.rider.take()
    }

    pub fn update(&mut self, ctx: &mut SimContext, me: Entity, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let spatial = ctx.spatial();

        match self.phase {
            Phase::WallFollow => {
                if !self.tick_turn(dt) {
                    self.tick_wall_follow(&spatial, me, dt);
                }
            }
            Phase::Zigzag => {
                if !self.tick_turn(dt) {
                    self.tick_zigzag(&spatial, me, dt);
                }
            }
            Phase::Rescue => self.tick_rescue(&spatial, ctx, me, dt),
            Phase::Idle => self.tick_idle(dt),
        }

        if self.stuck_counter > STUCK_LIMIT && self.phase != Phase::Rescue {
            self.enter_rescue(ctx);
        }

        if !self.position.is_finite() || !self.facing.is_finite() {
            log::warn!("appliance {:?}: non-finite pose, restarting coverage", me);
            self.position = spatial.clamp_to_room(Vec3::ZERO, self.config.radius);
            self.facing = 0.0;
            self.restart_wall_follow();
        }
    }

    /// Try to advance along the current facing, at most `max_distance`.
    /// Returns the distance covered, or `None` when the step was refused.
    fn try_move(&mut self, spatial: &Spatial, me: Entity, dt: f32, max_distance: Option<f32>) -> Option<f32> {
        let mut step = self.config.move_speed * dt;
        if let Some(max) = max_distance {
            step = step.min(max.max(0.0));
        }
        if step <= 0.0 {
            return Some(0.0);
        }

        let forward = Vec3::from_heading(self.facing);
        let next = self.position + forward * step;
        let radius = self.config.radius;
        if spatial.is_near_boundary(next, radius)
            || spatial.has_obstacle_at(next + forward * STEP_LOOKAHEAD, radius, Some(me))
        {
            self.stuck_counter += 1;
            return None;
        }

        self.position = next;
        self.distance_traveled += step;
        self.stuck_counter = 0;
        Some(step)
    }

    fn turn_clockwise(&mut self) {
        self.turn_target = Some(normalize_angle(self.facing - FRAC_PI_2));
    }

    fn turn_counter_clockwise(&mut self) {
        self.turn_target = Some(normalize_angle(self.facing + FRAC_PI_2));
    }

    /// Rotate toward the turn target. True while the tick was spent turning.
    fn tick_turn(&mut self, dt: f32) -> bool {
        let Some(target) = self.turn_target else {
            return false;
        };
        let diff = normalize_angle(target - self.facing);
        let step = (self.config.turn_speed * dt).min(diff.abs());
        self.facing = normalize_angle(self.facing + step * diff.signum());

        if normalize_angle(target - self.facing).abs() <= TURN_SNAP {
            self.facing = normalize_angle(target);
            self.turn_target = None;
        }
        true
    }

    fn wall_on_right(&self, spatial: &Spatial, me: Entity) -> bool {
        let right = Vec3::from_heading(self.facing - FRAC_PI_2);
        let sensor = self.position + right * (self.config.radius + WALL_SENSOR_REACH);
        spatial.is_near_boundary(sensor, 0.0) || spatial.has_obstacle_at(sensor, 0.0, Some(me))
    }

    fn restart_wall_follow(&mut self) {
        self.set_phase(Phase::WallFollow, SubState::Init);
        self.turn_target = None;
        self.stuck_counter = 0;
        self.anchor = None;
        self.loop_distance = 0.0;
        self.since_turn = 0.0;
    }

    fn set_phase(&mut self, phase: Phase, sub_state: SubState) {
        if self.phase != phase || self.sub_state != sub_state {
            log::debug!(
                "appliance {}/{} -> {}/{}",
                self.phase.as_str(),
                self.sub_state.as_str(),
                phase.as_str(),
                sub_state.as_str()
            );
        }
        self.phase = phase;
        self.sub_state = sub_state;
    }

    fn tick_wall_follow(&mut self, spatial: &Spatial, me: Entity, dt: f32) {
        match self.sub_state {
            SubState::Init => self.set_phase(Phase::WallFollow, SubState::FindingWall),
            SubState::FindingWall => {
                if self.try_move(spatial, me, dt, None).is_none() {
                    // Put the wall on the right-hand side
                    self.turn_counter_clockwise();
                    self.anchor = Some(self.position);
                    self.loop_distance = 0.0;
                    self.since_turn = 0.0;
                    self.set_phase(Phase::WallFollow, SubState::FollowingWall);
                }
            }
            SubState::FollowingWall => {
                let Some(moved) = self.try_move(spatial, me, dt, None) else {
                    self.turn_counter_clockwise();
                    self.since_turn = 0.0;
                    return;
                };
                self.loop_distance += moved;
                self.since_turn += moved;

                if self.since_turn > WALL_CHECK_DISTANCE && !self.wall_on_right(spatial, me) {
                    // Outside corner or lost wall: swing back toward it
                    self.turn_clockwise();
                    self.since_turn = 0.0;
                }

                let closed = self
                    .anchor
                    .is_some_and(|anchor| self.position.flat_distance(&anchor) < LOOP_CLOSE_RADIUS);
                if self.loop_distance > self.config.min_loop_distance && closed {
                    log::info!("appliance closed perimeter loop after {:.1}", self.loop_distance);
                    self.begin_zigzag();
                } else if self.loop_distance > self.give_up_distance(spatial) {
                    log::info!(
                        "appliance perimeter loop never closed after {:.1}, sweeping anyway",
                        self.loop_distance
                    );
                    self.begin_zigzag();
                }
            }
            other => {
                log::warn!("appliance in WALL_FOLLOW with sub-state {}", other.as_str());
                self.restart_wall_follow();
            }
        }
    }

    /// Perimeter length after which an unclosed loop is abandoned.
    fn give_up_distance(&self, spatial: &Spatial) -> f32 {
        // Square room, so one lap is 8 half-widths
        LOOP_GIVE_UP_LAPS * 8.0 * spatial.boundary()
    }

    /// Start sweeping from the current position toward the far side of the room.
    pub fn begin_zigzag(&mut self) {
        self.sweep_dir = if self.position.x > 0.0 { -1.0 } else { 1.0 };
        self.lane_dir = if self.position.z > 0.0 { -1.0 } else { 1.0 };
        self.shift_step = 0;
        self.shift_traveled = 0.0;
        self.turn_target = Some(self.sweep_dir * FRAC_PI_2);
        self.set_phase(Phase::Zigzag, SubState::ZigzagHorizontal);
    }

    fn tick_zigzag(&mut self, spatial: &Spatial, me: Entity, dt: f32) {
        if self.sub_state == SubState::ZigzagHorizontal {
            if self.try_move(spatial, me, dt, None).is_none() {
                self.shift_step = 0;
                self.shift_traveled = 0.0;
                self.set_phase(Phase::Zigzag, SubState::ZigzagShifting);
            }
            return;
        }

        match self.shift_step {
            0 => {
                self.turn_toward_lane();
                self.shift_step = 1;
            }
            1 => {
                let remaining = self.config.lane_width - self.shift_traveled;
                match self.try_move(spatial, me, dt, Some(remaining)) {
                    Some(moved) => {
                        self.shift_traveled += moved;
                        if self.shift_traveled >= self.config.lane_width - 1e-4 {
                            self.shift_step = 2;
                        }
                    }
                    None if self.shift_traveled < SHIFT_COMPLETE_FRACTION * self.config.lane_width => {
                        log::info!("appliance coverage complete after {} rows", self.row);
                        self.idle_timer = IDLE_DURATION;
                        self.set_phase(Phase::Idle, SubState::None);
                    }
                    None => self.shift_step = 2,
                }
            }
            2 => {
                self.turn_toward_lane();
                self.shift_step = 3;
            }
            _ => {
                self.sweep_dir = -self.sweep_dir;
                self.row += 1;
                self.shift_step = 0;
                self.set_phase(Phase::Zigzag, SubState::ZigzagHorizontal);
            }
        }
    }

    /// Quarter turn that rotates a sweep heading into the lane direction,
    /// and then the lane direction into the reversed sweep.
    fn turn_toward_lane(&mut self) {
        if self.sweep_dir * self.lane_dir > 0.0 {
            self.turn_clockwise();
        } else {
            self.turn_counter_clockwise();
        }
    }

    fn tick_idle(&mut self, dt: f32) {
        self.idle_timer -= dt;
        if self.idle_timer <= 0.0 {
            self.restart_wall_follow();
        }
    }

    fn enter_rescue(&mut self, ctx: &mut SimContext) {
        log::info!(
            "appliance stuck after {} blocked moves in {}",
            self.stuck_counter,
            self.phase.as_str()
        );
        self.turn_target = None;
        self.rescue_time = 0.0;
        self.rescue_moves = 0;
        self.facing = ctx.rng.gen_range(-PI..PI);
        self.set_phase(Phase::Rescue, SubState::None);
    }

    fn tick_rescue(&mut self, spatial: &Spatial, ctx: &mut SimContext, me: Entity, dt: f32) {
        self.rescue_time += dt;
        if self.rescue_time >= RESCUE_TIMEOUT {
            log::info!("appliance rescue timed out, resuming coverage");
            self.restart_wall_follow();
            return;
        }

        match self.try_move(spatial, me, dt, None) {
            // A zero-length step proves nothing about being free
            Some(moved) if moved <= 0.0 => {}
            Some(_) => {
                self.rescue_moves += 1;
                if self.rescue_moves >= RESCUE_ESCAPE_MOVES {
                    log::info!("appliance escaped");
                    self.restart_wall_follow();
                }
            }
            None => {
                self.rescue_moves = 0;
                self.facing = ctx.rng.gen_range(-PI..PI);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Furniture, FurnitureConfig, Transform};
    use crate::context::{DayClock, FlatRoom};
    use crate::effects::Effects;
    use hecs::World;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Rig {
        world: World,
        room: FlatRoom,
        clock: DayClock,
        rng: StdRng,
        effects: Effects,
        me: Entity,
    }

    impl Rig {
        fn new(boundary: f32, position: Vec3, facing: f32) -> (Self, Appliance) {
            let mut world = World::new();
            let me = world.spawn((
                Furniture::new(FurnitureConfig::robot_vacuum()),
                Transform::new(position, facing),
            ));
            let rig = Self {
                world,
                room: FlatRoom::new(boundary),
                clock: DayClock::default(),
                rng: StdRng::seed_from_u64(7),
                effects: Effects::new(),
                me,
            };
            (rig, Appliance::new(position, facing, ApplianceConfig::default()))
        }

        fn tick(&mut self, appliance: &mut Appliance, dt: f32) {
            let mut ctx = SimContext {
                world: &self.world,
                room: &self.room,
                clock: &self.clock,
                rng: &mut self.rng,
                effects: &mut self.effects,
            };
            appliance.update(&mut ctx, self.me, dt);
        }
    }

    #[test]
    fn test_starts_in_wall_follow_init() {
        let appliance = Appliance::new(Vec3::ZERO, 0.0, ApplianceConfig::default());
        assert_eq!(appliance.phase(), Phase::WallFollow);
        assert_eq!(appliance.sub_state(), SubState::Init);
    }

    #[test]
    fn test_turn_interpolates_then_snaps() {
        let (mut rig, mut appliance) = Rig::new(4.0, Vec3::ZERO, 0.0);
        appliance.turn_clockwise();
        appliance.set_phase(Phase::WallFollow, SubState::FollowingWall);

        rig.tick(&mut appliance, 0.1);
        assert!(appliance.is_turning());
        assert!((appliance.facing + 0.2).abs() < 1e-5);

        for _ in 0..20 {
            rig.tick(&mut appliance, 0.1);
            if !appliance.is_turning() {
                break;
            }
        }
        assert!(!appliance.is_turning());
        assert!((appliance.facing + FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_turn_across_pi_stays_normalized() {
        let (mut rig, mut appliance) = Rig::new(4.0, Vec3::ZERO, 3.0);
        appliance.turn_counter_clockwise();
        appliance.set_phase(Phase::WallFollow, SubState::FollowingWall);
        for _ in 0..40 {
            rig.tick(&mut appliance, 0.05);
            assert!(appliance.facing > -PI && appliance.facing <= PI);
            if !appliance.is_turning() {
                break;
            }
        }
        assert!((appliance.facing - normalize_angle(3.0 + FRAC_PI_2)).abs() < 1e-5);
    }

    #[test]
    fn test_finding_wall_turns_wall_to_the_right() {
        // Heading -x toward the west wall
        let (mut rig, mut appliance) = Rig::new(2.5, Vec3::ground(-1.5, 0.0), -FRAC_PI_2);
        for _ in 0..200 {
            rig.tick(&mut appliance, 0.05);
            if appliance.sub_state() == SubState::FollowingWall {
                break;
            }
        }
        assert_eq!(appliance.sub_state(), SubState::FollowingWall);
        assert!(appliance.anchor().is_some());
        assert!(appliance.position.x < -2.1);

        while appliance.is_turning() {
            rig.tick(&mut appliance, 0.05);
        }
        // Now facing +z with the wall on the right
        assert!(appliance.facing.abs() < 1e-5);
        let spatial = Spatial::new(&rig.world, &rig.room);
        assert!(appliance.wall_on_right(&spatial, rig.me));
    }

    #[test]
    fn test_zigzag_in_tiny_room_goes_idle_then_restarts() {
        let (mut rig, mut appliance) = Rig::new(0.4, Vec3::ZERO, 0.0);
        appliance.begin_zigzag();

        let mut ticks = 0;
        while appliance.phase() == Phase::Zigzag && ticks < 500 {
            rig.tick(&mut appliance, 0.05);
            ticks += 1;
        }
        assert_eq!(appliance.phase(), Phase::Idle);
        assert_eq!(appliance.row(), 0);

        for _ in 0..59 {
            rig.tick(&mut appliance, 0.05);
        }
        assert_eq!(appliance.phase(), Phase::Idle);
        rig.tick(&mut appliance, 0.05);
        rig.tick(&mut appliance, 0.05);
        assert_eq!(appliance.phase(), Phase::WallFollow);
    }

    #[test]
    fn test_sixth_blocked_move_enters_rescue() {
        // Room smaller than the body: every step is refused
        let (mut rig, mut appliance) = Rig::new(0.3, Vec3::ZERO, 0.0);
        appliance.set_phase(Phase::WallFollow, SubState::FollowingWall);

        for blocked in 1..=STUCK_LIMIT {
            appliance.turn_target = None;
            rig.tick(&mut appliance, 0.05);
            assert_eq!(appliance.stuck_counter(), blocked);
            assert_eq!(appliance.phase(), Phase::WallFollow);
        }

        appliance.turn_target = None;
        rig.tick(&mut appliance, 0.05);
        assert_eq!(appliance.phase(), Phase::Rescue);
        assert_eq!(appliance.sub_state(), SubState::None);
    }

    #[test]
    fn test_zero_dt_rescue_ticks_never_count_as_escape() {
        let (mut rig, mut appliance) = Rig::new(0.3, Vec3::ZERO, 0.0);
        appliance.set_phase(Phase::WallFollow, SubState::FollowingWall);
        while appliance.phase() != Phase::Rescue {
            appliance.turn_target = None;
            rig.tick(&mut appliance, 0.05);
        }

        for _ in 0..(RESCUE_ESCAPE_MOVES + 10) {
            rig.tick(&mut appliance, 0.0);
        }
        rig.tick(&mut appliance, f32::NAN);
        assert_eq!(appliance.phase(), Phase::Rescue);
        assert_eq!(appliance.rescue_moves(), 0);
        assert_eq!(appliance.position, Vec3::ZERO);
    }

    #[test]
    fn test_unclosed_perimeter_gives_up_after_two_laps() {
        let (mut rig, mut appliance) = Rig::new(2.5, Vec3::ground(-1.5, -1.5), -FRAC_PI_2);
        // Loop can never be long enough to close
        appliance.config = ApplianceConfig {
            min_loop_distance: 1000.0,
            ..Default::default()
        };

        let mut ticks = 0;
        while appliance.phase() == Phase::WallFollow && ticks < 4000 {
            rig.tick(&mut appliance, 0.05);
            ticks += 1;
        }
        assert_eq!(appliance.phase(), Phase::Zigzag);
        let give_up = LOOP_GIVE_UP_LAPS * 8.0 * 2.5;
        assert!(appliance.loop_distance() > give_up);
        assert!(appliance.loop_distance() < give_up + 0.5);
    }

    #[test]
    fn test_mount_is_exclusive() {
        let mut world = World::new();
        let a = world.spawn(());
        let b = world.spawn(());
        let mut appliance = Appliance::new(Vec3::ZERO, 0.0, ApplianceConfig::default());
        assert!(appliance.mount(a));
        assert!(!appliance.mount(b));
        assert_eq!(appliance.dismount(), Some(a));
        assert!(appliance.mount(b));
    }
}
