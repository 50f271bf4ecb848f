//! Spaceship Cursor - a custom cursor with a falling-brick shooter overlay
//!
//! Core modules:
//! - `sim`: Deterministic simulation (cursor follow, particles, obstacles, damage)
//! - `tuning`: Data-driven gameplay constants
//! - `settings`: User preferences persisted in LocalStorage

pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation tick (60 Hz, one display refresh)
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Fraction of the remaining distance the ship covers each tick
    pub const SMOOTHING_FACTOR: f32 = 0.2;

    /// Global particle budget (soft cap)
    pub const MAX_PARTICLES: usize = 80;
    /// Click burst is skipped when this close to the budget
    pub const CLICK_BURST_HEADROOM: usize = 10;

    /// Minimum time between accepted shots
    pub const SHOOT_COOLDOWN_MS: f64 = 200.0;
    /// Laser upward speed (px per tick)
    pub const LASER_SPEED: f32 = 22.0;
    /// Laser is retired after this long even if still on screen
    pub const LASER_TIMEOUT_MS: f64 = 400.0;

    /// Falling objects
    pub const MAX_FALLING_OBJECTS: usize = 3;
    pub const SPAWN_INTERVAL_MS: f64 = 3000.0;
    pub const SPAWN_Y: f32 = -50.0;
    /// Distance past the viewport edge before an entity counts as off screen
    pub const OFFSCREEN_MARGIN: f32 = 50.0;
    /// Shrink animation length before a destroyed object leaves the arena
    pub const DESTROY_REMOVAL_MS: f64 = 300.0;

    /// Hit radii (exclusive)
    pub const CURSOR_HIT_RADIUS: f32 = 25.0;
    pub const LASER_HIT_RADIUS: f32 = 30.0;

    /// Player phase durations
    pub const DAMAGE_MS: f64 = 600.0;
    pub const INVULNERABLE_MS: f64 = 1500.0;

    /// Default viewport (replaced by the host on the first frame)
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;
}

/// Move `current` a fraction of the way toward `target`
#[inline]
pub fn ease_toward(current: Vec2, target: Vec2, factor: f32) -> Vec2 {
    current + (target - current) * factor
}

/// Duration in milliseconds as whole microseconds (nearest)
#[inline]
pub fn ms_to_us(ms: f64) -> u64 {
    (ms.max(0.0) * 1000.0).round() as u64
}

/// Microseconds one tick of `dt_ms` adds to the simulation clock
///
/// Rounded up, so a duration that spans an exact number of ticks in real
/// time elapses on that tick and not one later. The small bias keeps
/// already-whole values like `100.0` from rounding past themselves.
#[inline]
pub fn step_us(dt_ms: f64) -> u64 {
    (dt_ms.max(0.0) * 1000.0 - 1e-6).ceil().max(0.0) as u64
}

/// Unit vector at angle `theta` scaled by `speed`
#[inline]
pub fn radial_velocity(theta: f32, speed: f32) -> Vec2 {
    Vec2::new(theta.cos() * speed, theta.sin() * speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_toward_converges() {
        let target = Vec2::new(100.0, 50.0);
        let mut pos = Vec2::ZERO;

        pos = ease_toward(pos, target, consts::SMOOTHING_FACTOR);
        assert!((pos.x - 20.0).abs() < 1e-4);
        assert!((pos.y - 10.0).abs() < 1e-4);

        for _ in 0..100 {
            pos = ease_toward(pos, target, consts::SMOOTHING_FACTOR);
        }
        assert!(pos.distance(target) < 0.01);
    }

    #[test]
    fn test_ease_toward_is_unclamped() {
        // Overshoot is allowed when the factor exceeds 1
        let pos = ease_toward(Vec2::ZERO, Vec2::new(10.0, 0.0), 1.5);
        assert!((pos.x - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_clock_conversions() {
        assert_eq!(ms_to_us(200.0), 200_000);
        assert_eq!(ms_to_us(-5.0), 0);
        assert_eq!(step_us(100.0), 100_000);
        assert_eq!(step_us(0.0), 0);
        assert_eq!(step_us(consts::TICK_MS), 16_667);
        assert_eq!(step_us(1000.0 / 30.0), 33_334);
    }

    #[test]
    fn test_whole_tick_durations_land_on_their_tick() {
        let step = step_us(consts::TICK_MS);
        for (ms, ticks) in [(200.0, 12), (300.0, 18), (400.0, 24), (600.0, 36), (1500.0, 90), (3000.0, 180)] {
            let due = ms_to_us(ms);
            assert!(step * ticks >= due, "{} ms not reached after {} ticks", ms, ticks);
            assert!(step * (ticks - 1) < due, "{} ms reached early", ms);
        }
    }

    #[test]
    fn test_radial_velocity() {
        let v = radial_velocity(0.0, 4.0);
        assert!((v.x - 4.0).abs() < 1e-5);
        assert!(v.y.abs() < 1e-5);

        let v = radial_velocity(std::f32::consts::FRAC_PI_2, 3.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 3.0).abs() < 1e-5);
    }
}
