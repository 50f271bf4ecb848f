//! Particle effects: smoke trail, explosions, muzzle flash and lasers
//!
//! All particles live in one arena and are advanced together once per
//! tick. The live count is the arena length, so every retirement path
//! (fade out, collision, off screen, timeout) releases budget exactly once.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{CLICK_BURST_HEADROOM, OFFSCREEN_MARGIN};
use crate::radial_velocity;

/// Particle behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Smoke puff that drifts sideways and falls
    Trail,
    /// Fragment flying outward from a blast
    Explosion,
    /// Bright expanding blob at a blast origin
    Flash,
    /// Player shot travelling straight up
    Laser,
}

impl ParticleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleKind::Trail => "trail",
            ParticleKind::Explosion => "explosion",
            ParticleKind::Flash => "flash",
            ParticleKind::Laser => "laser",
        }
    }
}

/// Colour variant for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tint {
    #[default]
    Normal,
    /// Red, used while the ship is damaged
    Damaged,
}

/// A single particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub kind: ParticleKind,
    pub pos: Vec2,
    /// px per tick
    pub vel: Vec2,
    /// Added to `vel.y` every tick
    pub gravity: f32,
    /// Remaining ticks (explosions)
    pub life: f32,
    pub max_life: f32,
    pub opacity: f32,
    /// Opacity removed per tick (trail, flash)
    pub fade: f32,
    /// Edge length in px
    pub size: f32,
    pub scale: f32,
    /// Scale added per tick (flash)
    pub grow: f32,
    pub tint: Tint,
}

/// Trail tuning (per tick)
const TRAIL_SIZE: f32 = 12.0;
const TRAIL_FADE: f32 = 0.04;
const TRAIL_SHRINK: f32 = 0.25;
const TRAIL_MIN_SIZE: f32 = 1.0;
const TRAIL_FALL_SPEED: f32 = 0.5;
const TRAIL_GRAVITY: f32 = 0.2;
const TRAIL_DRIFT: f32 = 0.75;

const LASER_WIDTH: f32 = 6.0;

impl Particle {
    /// Advance one tick. Returns false once the particle has expired.
    ///
    /// Lasers never expire on their own; the owner retires them.
    pub fn tick(&mut self) -> bool {
        match self.kind {
            ParticleKind::Trail => {
                self.opacity -= self.fade;
                self.size -= TRAIL_SHRINK;
                self.pos += self.vel;
                self.vel.y += self.gravity;
                self.opacity > 0.0 && self.size > TRAIL_MIN_SIZE
            }
            ParticleKind::Explosion => {
                self.pos += self.vel;
                self.life -= 1.0;
                self.opacity = (self.life / self.max_life).max(0.0);
                self.life > 0.0
            }
            ParticleKind::Flash => {
                self.scale += self.grow;
                self.opacity -= self.fade;
                self.opacity > 0.0
            }
            ParticleKind::Laser => {
                self.pos += self.vel;
                true
            }
        }
    }
}

/// Central flash added to a burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashSpec {
    pub size: f32,
    pub start_scale: f32,
    /// Scale added per tick
    pub grow: f32,
    /// Opacity removed per tick
    pub fade: f32,
}

/// Radial burst description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionSpec {
    pub count: u32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Lifetime in ticks
    pub life: u32,
    pub size: f32,
    pub tint: Tint,
    /// Burst is skipped when the live count exceeds budget minus headroom
    pub headroom: usize,
    pub flash: Option<FlashSpec>,
}

/// Small burst at the muzzle on every accepted shot
pub const CLICK_BURST: ExplosionSpec = ExplosionSpec {
    count: 6,
    min_speed: 3.0,
    max_speed: 6.0,
    life: 15,
    size: 8.0,
    tint: Tint::Normal,
    headroom: CLICK_BURST_HEADROOM,
    flash: Some(FlashSpec {
        size: 20.0,
        start_scale: 1.2,
        grow: 0.4,
        fade: 0.2,
    }),
};

/// Burst where a falling object was destroyed
pub const OBSTACLE_BURST: ExplosionSpec = ExplosionSpec {
    count: 8,
    min_speed: 3.0,
    max_speed: 6.0,
    life: 20,
    size: 6.0,
    tint: Tint::Normal,
    headroom: 0,
    flash: None,
};

/// Red burst around the ship when it takes a hit
pub const DAMAGE_BURST: ExplosionSpec = ExplosionSpec {
    count: 12,
    min_speed: 4.0,
    max_speed: 8.0,
    life: 25,
    size: 10.0,
    tint: Tint::Damaged,
    headroom: 0,
    flash: None,
};

/// Chance that a trail puff spawns this tick, given the live particle load
///
/// Trails thin out as the load passes `busy` and stop at `ceiling`.
pub fn trail_spawn_chance(load: usize, busy: usize, ceiling: usize) -> f32 {
    if load >= ceiling {
        0.0
    } else if load > busy {
        0.4
    } else {
        0.6
    }
}

/// Where a trail puff appears relative to the ship (behind the engine)
pub fn trail_origin(ship: Vec2, rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        ship.x + rng.random_range(-6.0f32..6.0) + 8.0,
        ship.y + 18.0 + rng.random_range(0.0f32..8.0),
    )
}

/// Owns every live particle
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    max_particles: usize,
    next_id: u32,
}

impl ParticleSystem {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::with_capacity(max_particles + 16),
            max_particles,
            next_id: 1,
        }
    }

    /// Number of live particles
    pub fn count(&self) -> usize {
        self.particles.len()
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn lasers(&self) -> impl Iterator<Item = &Particle> {
        self.particles
            .iter()
            .filter(|p| p.kind == ParticleKind::Laser)
    }

    /// Whether a spawn reserving `headroom` slots is allowed right now
    fn has_room(&self, headroom: usize) -> bool {
        self.particles.len() <= self.max_particles.saturating_sub(headroom)
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Emit a smoke puff at `pos`
    pub fn spawn_trail(&mut self, pos: Vec2, tint: Tint, rng: &mut impl Rng) -> Option<u32> {
        if !self.has_room(0) {
            return None;
        }
        let id = self.alloc_id();
        self.particles.push(Particle {
            id,
            kind: ParticleKind::Trail,
            pos,
            vel: Vec2::new(
                rng.random_range(-TRAIL_DRIFT..TRAIL_DRIFT),
                TRAIL_FALL_SPEED,
            ),
            gravity: TRAIL_GRAVITY,
            life: 1.0,
            max_life: 1.0,
            opacity: 1.0,
            fade: TRAIL_FADE,
            size: TRAIL_SIZE,
            scale: 1.0,
            grow: 0.0,
            tint,
        });
        Some(id)
    }

    /// Fire one laser upward from `pos`
    pub fn spawn_laser(&mut self, pos: Vec2, speed: f32) -> Option<u32> {
        if !self.has_room(0) {
            log::debug!("Particle limit reached - laser skipped");
            return None;
        }
        let id = self.alloc_id();
        self.particles.push(Particle {
            id,
            kind: ParticleKind::Laser,
            pos,
            vel: Vec2::new(0.0, -speed),
            gravity: 0.0,
            life: 1.0,
            max_life: 1.0,
            opacity: 1.0,
            fade: 0.0,
            size: LASER_WIDTH,
            scale: 1.0,
            grow: 0.0,
            tint: Tint::Normal,
        });
        Some(id)
    }

    /// Emit a radial burst (plus optional flash) centred on `pos`
    ///
    /// The budget is checked once for the whole batch. Returns the number
    /// of particles spawned.
    pub fn spawn_explosion(&mut self, pos: Vec2, spec: &ExplosionSpec, rng: &mut impl Rng) -> usize {
        if !self.has_room(spec.headroom) {
            log::debug!("Particle limit reached - explosion skipped");
            return 0;
        }

        let life = spec.life.max(1) as f32;
        for i in 0..spec.count {
            let theta = TAU * i as f32 / spec.count as f32;
            let speed = if spec.max_speed > spec.min_speed {
                rng.random_range(spec.min_speed..spec.max_speed)
            } else {
                spec.min_speed
            };
            let id = self.alloc_id();
            self.particles.push(Particle {
                id,
                kind: ParticleKind::Explosion,
                pos,
                vel: radial_velocity(theta, speed),
                gravity: 0.0,
                life,
                max_life: life,
                opacity: 1.0,
                fade: 0.0,
                size: spec.size,
                scale: 1.0,
                grow: 0.0,
                tint: spec.tint,
            });
        }

        let mut spawned = spec.count as usize;
        if let Some(flash) = spec.flash {
            let id = self.alloc_id();
            self.particles.push(Particle {
                id,
                kind: ParticleKind::Flash,
                pos,
                vel: Vec2::ZERO,
                gravity: 0.0,
                life: 1.0,
                max_life: 1.0,
                opacity: 1.0,
                fade: flash.fade,
                size: flash.size,
                scale: flash.start_scale,
                grow: flash.grow,
                tint: spec.tint,
            });
            spawned += 1;
        }
        spawned
    }

    /// Advance every particle by one tick and drop the expired ones
    ///
    /// After each laser moves, `laser_hit` is asked whether it struck
    /// something at its new position; a hit retires the laser. Lasers
    /// that climb past the top margin are retired too.
    pub fn advance(&mut self, mut laser_hit: impl FnMut(Vec2) -> bool) {
        self.particles.retain_mut(|p| {
            if !p.tick() {
                return false;
            }
            if p.kind == ParticleKind::Laser {
                if laser_hit(p.pos) {
                    return false;
                }
                return p.pos.y >= -OFFSCREEN_MARGIN;
            }
            true
        });
    }

    /// Retire a particle early. Returns false if it is already gone.
    pub fn retire(&mut self, id: u32) -> bool {
        let before = self.particles.len();
        self.particles.retain(|p| p.id != id);
        self.particles.len() != before
    }

    /// Drop everything (teardown)
    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
