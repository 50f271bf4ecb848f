//! Deterministic simulation module
//!
//! All cursor gameplay lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Timers fire from the simulation clock, never from wall time
//! - No DOM or platform dependencies

pub mod collision;
pub mod input;
pub mod obstacles;
pub mod particles;
pub mod player;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{laser_target, obstacle_hits_cursor, within};
pub use input::{InputEvent, InputTracker};
pub use obstacles::{FallingObject, ObstacleField, ObstacleKind};
pub use particles::{
    CLICK_BURST, DAMAGE_BURST, ExplosionSpec, OBSTACLE_BURST, Particle, ParticleKind,
    ParticleSystem, Tint,
};
pub use player::{PhaseTransition, PlayerPhase};
pub use state::{CursorFlags, CursorState, DestroyCause, GameEvent};
pub use tick::{FrameClock, run_frame, tick};
pub use timer::{TimerEvent, TimerId, TimerQueue};
