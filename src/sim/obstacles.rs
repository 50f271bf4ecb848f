//! Falling bricks and rocks
//!
//! Objects spawn above the viewport at a random x and fall straight down
//! while spinning. A destroyed object lingers for its shrink animation but
//! takes no further part in movement or collisions.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::obstacle_hits_cursor;
use crate::consts::{OFFSCREEN_MARGIN, SPAWN_Y};

/// Visual variant (same behaviour)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Brick,
    Rock,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Brick => "brick",
            ObstacleKind::Rock => "rock",
        }
    }
}

/// A falling obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingObject {
    pub id: u32,
    pub kind: ObstacleKind,
    /// x is fixed at spawn; y grows every tick
    pub pos: Vec2,
    /// px per tick
    pub velocity_y: f32,
    /// degrees
    pub rotation: f32,
    /// degrees per tick
    pub rotation_speed: f32,
    /// Clock time the object was destroyed at
    pub destroyed_at_ms: Option<f64>,
}

impl FallingObject {
    pub fn new(id: u32, kind: ObstacleKind, pos: Vec2, velocity_y: f32, rotation_speed: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            velocity_y,
            rotation: 0.0,
            rotation_speed,
            destroyed_at_ms: None,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed_at_ms.is_some()
    }

    /// Mark destroyed. Returns false if it already was.
    pub fn mark_destroyed(&mut self, now_ms: f64) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.destroyed_at_ms = Some(now_ms);
        true
    }

    /// Fall and spin by one tick
    pub fn advance(&mut self) {
        self.pos.y += self.velocity_y;
        self.rotation += self.rotation_speed;
    }

    /// Past the bottom edge of a viewport of the given height
    pub fn is_below(&self, viewport_height: f32) -> bool {
        self.pos.y > viewport_height + OFFSCREEN_MARGIN
    }

    /// Shrink animation progress (0 = intact, 1 = gone)
    pub fn destroy_progress(&self, now_ms: f64, duration_ms: f64) -> f32 {
        match self.destroyed_at_ms {
            Some(at) if duration_ms > 0.0 => ((now_ms - at) / duration_ms).clamp(0.0, 1.0) as f32,
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    /// Display scale, shrinking to nothing while destroyed
    pub fn scale(&self, now_ms: f64, duration_ms: f64) -> f32 {
        1.0 - self.destroy_progress(now_ms, duration_ms)
    }

    /// Display rotation, adding a full spin while destroyed
    pub fn display_rotation(&self, now_ms: f64, duration_ms: f64) -> f32 {
        self.rotation + 360.0 * self.destroy_progress(now_ms, duration_ms)
    }
}

/// What happened to the field during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStep {
    /// Object that struck the ship (already marked destroyed)
    pub hit: Option<(u32, Vec2)>,
    /// Objects that fell off the bottom and were removed
    pub escaped: Vec<u32>,
}

/// Owns every falling object, oldest first
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    objects: Vec<FallingObject>,
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    /// All objects including ones playing their destroy animation
    pub fn objects(&self) -> &[FallingObject] {
        &self.objects
    }

    pub fn get(&self, id: u32) -> Option<&FallingObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Objects that still move and collide
    pub fn live_count(&self) -> usize {
        self.objects.iter().filter(|o| !o.is_destroyed()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Spawn a randomized object above the viewport
    pub fn spawn(&mut self, id: u32, viewport_width: f32, rng: &mut impl Rng) -> &FallingObject {
        let x = rng.random_range(0.0..viewport_width.max(1.0));
        let kind = if rng.random_bool(0.5) {
            ObstacleKind::Brick
        } else {
            ObstacleKind::Rock
        };
        let velocity_y = rng.random_range(2.0f32..4.0);
        let rotation_speed = rng.random_range(-2.0f32..2.0);
        self.insert(FallingObject::new(
            id,
            kind,
            Vec2::new(x, SPAWN_Y),
            velocity_y,
            rotation_speed,
        ))
    }

    /// Add a prepared object as the newest entry
    pub fn insert(&mut self, object: FallingObject) -> &FallingObject {
        self.objects.push(object);
        &self.objects[self.objects.len() - 1]
    }

    /// Mark an object destroyed, returning where it was
    ///
    /// `None` if it is unknown or already destroyed, so destruction
    /// side effects run at most once.
    pub fn mark_destroyed(&mut self, id: u32, now_ms: f64) -> Option<Vec2> {
        let object = self.objects.iter_mut().find(|o| o.id == id)?;
        object.mark_destroyed(now_ms).then_some(object.pos)
    }

    /// Drop an object from the arena. Safe to call twice.
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| o.id != id);
        self.objects.len() != before
    }

    /// Silently remove the oldest live objects beyond `cap`
    pub fn trim_excess(&mut self, cap: usize) -> Vec<u32> {
        let mut trimmed = Vec::new();
        while self.live_count() > cap {
            let Some(idx) = self.objects.iter().position(|o| !o.is_destroyed()) else {
                break;
            };
            trimmed.push(self.objects.remove(idx).id);
        }
        trimmed
    }

    /// Advance every live object by one tick, newest first
    ///
    /// While `can_collide` holds, the first object within `hit_radius` of
    /// `cursor` is marked destroyed and reported; later objects in the same
    /// tick pass through, since the ship is already hurt.
    pub fn advance(
        &mut self,
        cursor: Vec2,
        mut can_collide: bool,
        hit_radius: f32,
        viewport_height: f32,
        now_ms: f64,
    ) -> FieldStep {
        let mut step = FieldStep::default();

        for i in (0..self.objects.len()).rev() {
            let object = &mut self.objects[i];
            if object.is_destroyed() {
                continue;
            }

            object.advance();

            if can_collide && obstacle_hits_cursor(object.pos, cursor, hit_radius) {
                object.mark_destroyed(now_ms);
                step.hit = Some((object.id, object.pos));
                can_collide = false;
                continue;
            }

            if object.is_below(viewport_height) {
                step.escaped.push(self.objects.remove(i).id);
            }
        }

        step
    }

    /// Drop everything (teardown)
    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn brick(id: u32, x: f32, y: f32, vy: f32) -> FallingObject {
        FallingObject::new(id, ObstacleKind::Brick, Vec2::new(x, y), vy, 1.5)
    }

    #[test]
    fn test_spawn_ranges() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut field = ObstacleField::new();
        for id in 0..200 {
            let o = field.spawn(id, 800.0, &mut rng).clone();
            assert!((0.0..800.0).contains(&o.pos.x));
            assert_eq!(o.pos.y, SPAWN_Y);
            assert!((2.0..4.0).contains(&o.velocity_y));
            assert!((-2.0..2.0).contains(&o.rotation_speed));
            assert!(!o.is_destroyed());
        }
        assert_eq!(field.live_count(), 200);
    }

    #[test]
    fn test_advance_moves_and_spins() {
        let mut field = ObstacleField::new();
        field.insert(brick(1, 400.0, -50.0, 2.0));
        field.advance(Vec2::ZERO, true, 25.0, 500.0, 0.0);
        let o = field.get(1).expect("still there");
        assert_eq!(o.pos, Vec2::new(400.0, -48.0));
        assert_eq!(o.rotation, 1.5);
    }

    #[test]
    fn test_mark_destroyed_is_idempotent() {
        let mut field = ObstacleField::new();
        field.insert(brick(1, 10.0, 20.0, 2.0));

        assert_eq!(field.mark_destroyed(1, 5.0), Some(Vec2::new(10.0, 20.0)));
        assert_eq!(field.mark_destroyed(1, 6.0), None);
        assert_eq!(field.mark_destroyed(99, 6.0), None);
        assert_eq!(field.get(1).and_then(|o| o.destroyed_at_ms), Some(5.0));
        assert_eq!(field.live_count(), 0);
        assert!(!field.is_empty());

        assert!(field.remove(1));
        assert!(!field.remove(1));
    }

    #[test]
    fn test_destroyed_objects_freeze() {
        let mut field = ObstacleField::new();
        field.insert(brick(1, 0.0, 0.0, 2.0));
        field.mark_destroyed(1, 0.0);
        let step = field.advance(Vec2::ZERO, true, 25.0, 500.0, 16.0);
        assert_eq!(step, FieldStep::default());
        assert_eq!(field.get(1).map(|o| o.pos), Some(Vec2::ZERO));
    }

    #[test]
    fn test_cursor_hit_only_first_object() {
        let mut field = ObstacleField::new();
        field.insert(brick(1, 0.0, -2.0, 2.0));
        field.insert(brick(2, 5.0, -2.0, 2.0));

        let step = field.advance(Vec2::ZERO, true, 25.0, 500.0, 10.0);
        // Newest is checked first
        assert_eq!(step.hit, Some((2, Vec2::new(5.0, 0.0))));
        assert!(field.get(2).is_some_and(|o| o.is_destroyed()));
        assert!(field.get(1).is_some_and(|o| !o.is_destroyed()));
    }

    #[test]
    fn test_no_hit_when_collisions_disabled() {
        let mut field = ObstacleField::new();
        field.insert(brick(1, 0.0, 0.0, 2.0));
        let step = field.advance(Vec2::ZERO, false, 25.0, 500.0, 0.0);
        assert_eq!(step.hit, None);
        assert_eq!(field.live_count(), 1);
    }

    #[test]
    fn test_escapes_off_bottom() {
        let mut field = ObstacleField::new();
        field.insert(brick(1, 100.0, 549.0, 2.0));
        field.insert(brick(2, 200.0, 100.0, 2.0));
        let step = field.advance(Vec2::ZERO, true, 25.0, 500.0, 0.0);
        assert_eq!(step.escaped, vec![1]);
        assert!(field.get(1).is_none());
        assert!(field.get(2).is_some());
    }

    #[test]
    fn test_trim_excess_drops_oldest_live() {
        let mut field = ObstacleField::new();
        for id in 1..=5 {
            field.insert(brick(id, 0.0, 0.0, 2.0));
        }
        field.mark_destroyed(1, 0.0);

        let trimmed = field.trim_excess(3);
        assert_eq!(trimmed, vec![2]);
        assert_eq!(field.live_count(), 3);
        // Destroyed object keeps its slot until its removal timer
        assert!(field.get(1).is_some());
        assert!(field.trim_excess(3).is_empty());
    }

    #[test]
    fn test_shrink_animation() {
        let mut o = brick(1, 0.0, 0.0, 2.0);
        o.rotation = 10.0;
        assert_eq!(o.scale(100.0, 300.0), 1.0);

        o.mark_destroyed(100.0);
        assert!((o.scale(250.0, 300.0) - 0.5).abs() < 1e-6);
        assert!((o.display_rotation(250.0, 300.0) - 190.0).abs() < 1e-4);
        assert_eq!(o.scale(1000.0, 300.0), 0.0);
        assert_eq!(o.scale(100.0, 0.0), 0.0);
    }
}
