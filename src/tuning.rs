//! Data-driven gameplay balance
//!
//! Every number the simulation reads lives here so the host can override
//! them from JSON without touching the sim.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Gameplay constants for one cursor session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Cursor follow easing per tick (0-1)
    pub smoothing_factor: f32,
    /// Global particle budget
    pub max_particles: usize,
    /// Emit smoke trail behind the ship
    pub trails_enabled: bool,

    // === Shooting ===
    pub shoot_cooldown_ms: f64,
    pub laser_speed: f32,
    pub laser_timeout_ms: f64,

    // === Falling objects ===
    /// Spawn falling objects at all
    pub obstacles_enabled: bool,
    pub max_falling_objects: usize,
    pub spawn_interval_ms: f64,
    pub destroy_removal_ms: f64,

    // === Collision ===
    pub cursor_hit_radius: f32,
    pub laser_hit_radius: f32,

    // === Player phases ===
    pub damage_ms: f64,
    pub invulnerable_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            smoothing_factor: SMOOTHING_FACTOR,
            max_particles: MAX_PARTICLES,
            trails_enabled: true,

            shoot_cooldown_ms: SHOOT_COOLDOWN_MS,
            laser_speed: LASER_SPEED,
            laser_timeout_ms: LASER_TIMEOUT_MS,

            obstacles_enabled: true,
            max_falling_objects: MAX_FALLING_OBJECTS,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            destroy_removal_ms: DESTROY_REMOVAL_MS,

            cursor_hit_radius: CURSOR_HIT_RADIUS,
            laser_hit_radius: LASER_HIT_RADIUS,

            damage_ms: DAMAGE_MS,
            invulnerable_ms: INVULNERABLE_MS,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning override; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Live particle count above which trail spawning slows down
    pub fn trail_busy_load(&self) -> usize {
        self.max_particles * 5 / 8
    }

    /// Live particle count at which trail spawning stops
    pub fn trail_ceiling_load(&self) -> usize {
        self.max_particles * 7 / 8
    }
}
