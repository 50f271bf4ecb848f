//! Fixed timestep simulation tick
//!
//! Per tick, in order: advance the clock, fire due timers, ease the ship
//! toward the pointer, maybe emit a trail puff, advance particles (lasers
//! test against falling objects), then advance falling objects (which
//! test against the ship). The ship therefore always moves before any
//! obstacle collision test of the same tick.

use rand::Rng;

use super::collision::laser_target;
use super::particles::{Tint, trail_origin, trail_spawn_chance};
use super::player::PlayerPhase;
use super::state::{CursorState, DestroyCause, GameEvent};
use super::timer::TimerEvent;
use crate::consts::{MAX_SUBSTEPS, TICK_MS};
use crate::{ease_toward, step_us};

/// Advance the cursor by one fixed timestep of `dt_ms`
pub fn tick(state: &mut CursorState, dt_ms: f64) {
    if !state.is_attached() {
        return;
    }

    state.clock_us = state.clock_us.saturating_add(step_us(dt_ms));
    state.now_ms = state.clock_us as f64 / 1000.0;
    state.time_ticks += 1;

    fire_timers(state);

    state.display_pos = ease_toward(
        state.display_pos,
        state.input.raw,
        state.tuning.smoothing_factor,
    );

    if state.tuning.trails_enabled {
        emit_trail(state);
    }

    advance_particles(state);
    advance_obstacles(state);
}

/// Run every timer due at the current clock time
fn fire_timers(state: &mut CursorState) {
    for event in state.timers.pop_due(state.clock_us) {
        match event {
            TimerEvent::SpawnObstacle => {
                if let Some(id) = state.spawn_obstacle() {
                    log::debug!("Spawned falling object {}", id);
                }
                state.enforce_obstacle_cap();
                state.schedule(state.tuning.spawn_interval_ms, TimerEvent::SpawnObstacle);
            }
            TimerEvent::DamageOver | TimerEvent::InvulnerabilityOver => {
                if let Some(transition) = state.phase.on_timer(event, &state.tuning) {
                    state.apply_transition(transition);
                }
            }
            TimerEvent::RemoveObstacle(id) => {
                state.obstacles.remove(id);
            }
            TimerEvent::LaserTimeout(id) => {
                state.particles.retire(id);
            }
        }
    }
}

/// Smoke puff behind the engine, thinned out under particle load
fn emit_trail(state: &mut CursorState) {
    let chance = trail_spawn_chance(
        state.particles.count(),
        state.tuning.trail_busy_load(),
        state.tuning.trail_ceiling_load(),
    );
    if chance <= 0.0 || state.rng.random::<f32>() >= chance {
        return;
    }

    let tint = if state.phase == PlayerPhase::Damaged {
        Tint::Damaged
    } else {
        Tint::Normal
    };
    let origin = trail_origin(state.display_pos, &mut state.rng);
    state.particles.spawn_trail(origin, tint, &mut state.rng);
}

/// Move every particle; lasers destroy the first object they touch
fn advance_particles(state: &mut CursorState) {
    let CursorState {
        particles,
        obstacles,
        tuning,
        now_ms,
        ..
    } = &mut *state;

    let radius = tuning.laser_hit_radius;
    let now = *now_ms;
    let mut destroyed = Vec::new();

    particles.advance(|laser_pos| {
        let Some(id) = laser_target(obstacles.objects(), laser_pos, radius) else {
            return false;
        };
        if let Some(pos) = obstacles.mark_destroyed(id, now) {
            destroyed.push((id, pos));
        }
        true
    });

    for (id, pos) in destroyed {
        log::debug!("Laser destroyed falling object {}", id);
        state.finish_destroy(id, pos, DestroyCause::Laser);
    }
}

/// Move falling objects; the first one touching the ship hurts it
fn advance_obstacles(state: &mut CursorState) {
    state.enforce_obstacle_cap();

    let step = state.obstacles.advance(
        state.display_pos,
        state.phase.can_take_damage(),
        state.tuning.cursor_hit_radius,
        state.viewport.y,
        state.now_ms,
    );

    for id in step.escaped {
        state.events.push(GameEvent::ObstacleEscaped { id });
    }

    if let Some((id, pos)) = step.hit {
        state.take_damage();
        state.finish_destroy(id, pos, DestroyCause::Collision);
    }
}

/// Fixed-step accumulator between display frames and simulation ticks
///
/// At most `max_steps` ticks run per frame; any backlog beyond that is
/// dropped so a stalled tab does not fast-forward on resume.
#[derive(Debug, Clone)]
pub struct FrameClock {
    step_ms: f64,
    accumulator: f64,
    max_steps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TICK_MS, MAX_SUBSTEPS)
    }
}

impl FrameClock {
    pub fn new(step_ms: f64, max_steps: u32) -> Self {
        Self {
            step_ms,
            accumulator: 0.0,
            max_steps,
        }
    }

    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    /// Add a frame's elapsed time. Returns the number of ticks to run.
    pub fn accumulate(&mut self, frame_ms: f64) -> u32 {
        self.accumulator += frame_ms.max(0.0);

        let mut steps = 0;
        while self.accumulator >= self.step_ms && steps < self.max_steps {
            self.accumulator -= self.step_ms;
            steps += 1;
        }
        if self.accumulator >= self.step_ms {
            self.accumulator %= self.step_ms;
        }
        steps
    }
}

/// Run as many fixed ticks as `frame_ms` of wall time allows
pub fn run_frame(state: &mut CursorState, clock: &mut FrameClock, frame_ms: f64) -> u32 {
    let steps = clock.accumulate(frame_ms);
    for _ in 0..steps {
        tick(state, clock.step_ms());
    }
    steps
}
