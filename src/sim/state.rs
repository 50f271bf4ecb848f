//! Cursor game state
//!
//! One `CursorState` is created per page and owns every entity, timer and
//! flag. Nothing lives in globals; the host holds the state and drives it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::input::{InputEvent, InputTracker};
use super::obstacles::{FallingObject, ObstacleField};
use super::particles::{CLICK_BURST, DAMAGE_BURST, OBSTACLE_BURST, ParticleSystem};
use super::player::{PhaseTransition, PlayerPhase};
use super::timer::{TimerEvent, TimerQueue};
use crate::consts::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::ms_to_us;
use crate::tuning::Tuning;

/// What destroyed a falling object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyCause {
    Laser,
    Collision,
}

/// Things that happened since the host last drained events
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LaserFired { id: u32, pos: Vec2 },
    ObstacleSpawned { id: u32 },
    ObstacleDestroyed { id: u32, pos: Vec2, cause: DestroyCause },
    /// Fell off the bottom of the viewport
    ObstacleEscaped { id: u32 },
    /// Removed by cap enforcement
    ObstacleTrimmed { id: u32 },
    PlayerHit { pos: Vec2 },
    PhaseChanged { phase: PlayerPhase },
}

/// Presentation flags, one CSS class each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CursorFlags {
    pub hovering: bool,
    pub dragging: bool,
    pub clicking: bool,
    pub damaged: bool,
    pub invulnerable: bool,
    pub visible: bool,
}

impl CursorFlags {
    /// Active state class names
    pub fn class_names(&self) -> Vec<&'static str> {
        let mut classes = Vec::new();
        if self.hovering {
            classes.push("hovering");
        }
        if self.dragging {
            classes.push("dragging");
        }
        if self.clicking {
            classes.push("clicking");
        }
        if self.damaged {
            classes.push("damaged");
        }
        if self.invulnerable {
            classes.push("invulnerable");
        }
        classes
    }
}

/// Complete cursor state (deterministic for a given seed and input replay)
#[derive(Debug, Clone)]
pub struct CursorState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub tuning: Tuning,
    /// Simulation clock in whole microseconds (timers and cooldown)
    pub clock_us: u64,
    /// `clock_us` in milliseconds, for presentation
    pub now_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Raw pointer and interaction flags
    pub input: InputTracker,
    /// Smoothed ship position
    pub display_pos: Vec2,
    /// Damage phase (only mutated through transitions)
    pub phase: PlayerPhase,
    /// Viewport size in px
    pub viewport: Vec2,
    pub particles: ParticleSystem,
    pub obstacles: ObstacleField,
    pub timers: TimerQueue<TimerEvent>,
    pub rng: Pcg32,
    /// Pending events for the host (drain every frame)
    pub events: Vec<GameEvent>,
    next_id: u32,
    attached: bool,
}

impl CursorState {
    /// Create a cursor with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a cursor and arm the obstacle spawner
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            particles: ParticleSystem::new(tuning.max_particles),
            tuning,
            clock_us: 0,
            now_ms: 0.0,
            time_ticks: 0,
            input: InputTracker::new(),
            display_pos: Vec2::ZERO,
            phase: PlayerPhase::Normal,
            viewport: Vec2::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            obstacles: ObstacleField::new(),
            timers: TimerQueue::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
            attached: true,
        };

        if state.tuning.obstacles_enabled {
            state.schedule(state.tuning.spawn_interval_ms, TimerEvent::SpawnObstacle);
        }

        log::info!(
            "Spaceship cursor initialized (seed {}, budget {}, obstacles {})",
            seed,
            state.tuning.max_particles,
            state.tuning.obstacles_enabled
        );
        state
    }

    /// Allocate a new obstacle ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Arm a one-shot timer `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: f64, event: TimerEvent) {
        self.timers.schedule(self.clock_us, ms_to_us(delay_ms), event);
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Tear down: drop every entity and pending timer, stop ticking
    pub fn detach(&mut self) {
        self.timers.clear();
        self.particles.clear();
        self.obstacles.clear();
        self.events.clear();
        self.attached = false;
        log::info!("Spaceship cursor detached");
    }

    /// Update viewport size (read at spawn and off-screen checks)
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    /// Live particle count
    pub fn particle_count(&self) -> usize {
        self.particles.count()
    }

    /// Feed one input event at the current clock time
    pub fn handle_input(&mut self, event: InputEvent) {
        if !self.attached {
            return;
        }
        let cooldown_us = ms_to_us(self.tuning.shoot_cooldown_ms);
        if let Some(origin) = self.input.apply(event, self.clock_us, cooldown_us) {
            self.fire_laser(origin);
        }
    }

    /// Emit a laser plus the muzzle burst. Returns the laser id.
    pub fn fire_laser(&mut self, origin: Vec2) -> Option<u32> {
        let id = self.particles.spawn_laser(origin, self.tuning.laser_speed)?;
        self.schedule(self.tuning.laser_timeout_ms, TimerEvent::LaserTimeout(id));
        self.events.push(GameEvent::LaserFired { id, pos: origin });
        self.particles
            .spawn_explosion(origin, &CLICK_BURST, &mut self.rng);
        Some(id)
    }

    /// Apply a phase transition and arm its timer
    pub fn apply_transition(&mut self, transition: PhaseTransition) {
        self.phase = transition.next;
        if let Some((event, delay)) = transition.arm {
            self.schedule(delay, event);
        }
        self.events.push(GameEvent::PhaseChanged {
            phase: transition.next,
        });
        log::debug!("Player phase -> {:?}", transition.next);
    }

    /// Ship got hit. Returns false if the hit was ignored.
    pub fn take_damage(&mut self) -> bool {
        let Some(transition) = self.phase.on_hit(&self.tuning) else {
            return false;
        };
        self.apply_transition(transition);

        let pos = self.display_pos;
        self.particles
            .spawn_explosion(pos, &DAMAGE_BURST, &mut self.rng);
        self.events.push(GameEvent::PlayerHit { pos });
        true
    }

    /// Spawn one falling object if below the cap
    pub fn spawn_obstacle(&mut self) -> Option<u32> {
        if self.obstacles.live_count() >= self.tuning.max_falling_objects {
            return None;
        }
        let id = self.next_entity_id();
        let width = self.viewport.x;
        self.obstacles.spawn(id, width, &mut self.rng);
        self.events.push(GameEvent::ObstacleSpawned { id });
        Some(id)
    }

    /// Place a prepared falling object (scripted scenarios)
    pub fn insert_obstacle(&mut self, object: FallingObject) {
        let id = object.id;
        self.next_id = self.next_id.max(id.saturating_add(1));
        self.obstacles.insert(object);
        self.events.push(GameEvent::ObstacleSpawned { id });
    }

    /// Silently drop the oldest live objects beyond the cap
    pub fn enforce_obstacle_cap(&mut self) {
        for id in self.obstacles.trim_excess(self.tuning.max_falling_objects) {
            log::debug!("Trimmed excess falling object {}", id);
            self.events.push(GameEvent::ObstacleTrimmed { id });
        }
    }

    /// Destroy a falling object. Returns false if it was already destroyed.
    pub fn destroy_obstacle(&mut self, id: u32, cause: DestroyCause) -> bool {
        match self.obstacles.mark_destroyed(id, self.now_ms) {
            Some(pos) => {
                self.finish_destroy(id, pos, cause);
                true
            }
            None => false,
        }
    }

    /// Side effects of a fresh destruction: explosion and deferred removal
    pub(crate) fn finish_destroy(&mut self, id: u32, pos: Vec2, cause: DestroyCause) {
        self.particles
            .spawn_explosion(pos, &OBSTACLE_BURST, &mut self.rng);
        self.schedule(self.tuning.destroy_removal_ms, TimerEvent::RemoveObstacle(id));
        self.events.push(GameEvent::ObstacleDestroyed { id, pos, cause });
    }

    /// Presentation flags
    pub fn flags(&self) -> CursorFlags {
        CursorFlags {
            hovering: self.input.hovering,
            dragging: self.input.dragging,
            clicking: self.input.clicking,
            damaged: self.phase == PlayerPhase::Damaged,
            invulnerable: self.phase == PlayerPhase::Invulnerable,
            visible: self.input.visible,
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacles::ObstacleKind;

    fn quiet_tuning() -> Tuning {
        Tuning {
            obstacles_enabled: false,
            trails_enabled: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_arms_spawner() {
        let state = CursorState::new(1);
        assert_eq!(state.timers.len(), 1);
        assert_eq!(state.timers.next_due(), Some(3_000_000));
        assert!(state.is_attached());

        let state = CursorState::with_tuning(1, quiet_tuning());
        assert!(state.timers.is_empty());
    }

    #[test]
    fn test_fire_laser_arms_timeout_and_burst() {
        let mut state = CursorState::with_tuning(1, quiet_tuning());
        let id = state.fire_laser(Vec2::new(50.0, 60.0)).expect("room");
        assert_eq!(state.particles.lasers().count(), 1);
        // Laser + 6 fragments + flash
        assert_eq!(state.particle_count(), 8);
        assert_eq!(state.timers.next_due(), Some(400_000));
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::LaserFired {
                id,
                pos: Vec2::new(50.0, 60.0)
            }]
        );
    }

    #[test]
    fn test_take_damage_once() {
        let mut state = CursorState::with_tuning(1, quiet_tuning());
        assert!(state.take_damage());
        assert_eq!(state.phase, PlayerPhase::Damaged);
        assert_eq!(state.particle_count(), DAMAGE_BURST.count as usize);

        assert!(!state.take_damage());
        assert_eq!(state.particle_count(), DAMAGE_BURST.count as usize);

        let hits = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PlayerHit { .. }))
            .count();
        assert_eq!(hits, 1);
        assert!(state.flags().damaged);
        assert_eq!(state.flags().class_names(), vec!["damaged"]);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut state = CursorState::with_tuning(1, quiet_tuning());
        state.insert_obstacle(FallingObject::new(
            7,
            ObstacleKind::Rock,
            Vec2::new(10.0, 10.0),
            2.0,
            0.0,
        ));
        state.drain_events();

        assert!(state.destroy_obstacle(7, DestroyCause::Laser));
        let after_first = state.particle_count();
        assert_eq!(after_first, OBSTACLE_BURST.count as usize);

        assert!(!state.destroy_obstacle(7, DestroyCause::Collision));
        assert_eq!(state.particle_count(), after_first);
        assert_eq!(state.timers.len(), 1);
        assert_eq!(state.drain_events().len(), 1);

        // Inserted ids never collide with allocated ones
        assert_eq!(state.next_entity_id(), 8);
    }

    #[test]
    fn test_inserting_highest_id_does_not_overflow() {
        let mut state = CursorState::with_tuning(1, quiet_tuning());
        state.insert_obstacle(FallingObject::new(
            u32::MAX,
            ObstacleKind::Brick,
            Vec2::ZERO,
            2.0,
            0.0,
        ));
        assert_eq!(state.next_entity_id(), u32::MAX);
        // Allocation wraps instead of panicking
        assert_eq!(state.next_entity_id(), 0);
        assert!(state.obstacles.get(u32::MAX).is_some());
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut state = CursorState::with_tuning(1, quiet_tuning());
        for _ in 0..3 {
            assert!(state.spawn_obstacle().is_some());
        }
        assert!(state.spawn_obstacle().is_none());
        assert_eq!(state.obstacles.live_count(), 3);
    }

    #[test]
    fn test_detach_clears_everything() {
        let mut state = CursorState::new(1);
        state.fire_laser(Vec2::ZERO);
        state.spawn_obstacle();
        state.detach();

        assert!(!state.is_attached());
        assert!(state.timers.is_empty());
        assert_eq!(state.particle_count(), 0);
        assert!(state.obstacles.is_empty());

        // Input after teardown is ignored
        state.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        assert_eq!(state.particle_count(), 0);
    }

    #[test]
    fn test_flags_and_classes() {
        let mut state = CursorState::with_tuning(1, quiet_tuning());
        state.handle_input(InputEvent::HoverStart);
        state.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        let flags = state.flags();
        assert!(flags.hovering && flags.clicking && flags.visible);
        assert_eq!(flags.class_names(), vec!["hovering", "clicking"]);

        state.handle_input(InputEvent::PointerUp);
        state.handle_input(InputEvent::PointerLeave);
        assert!(!state.flags().visible);
        assert!(!state.flags().clicking);
    }
}
