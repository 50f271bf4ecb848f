//! Proximity tests between the ship, lasers and falling objects
//!
//! All checks are pure distance predicates with an exclusive radius.
//! Callers decide what a hit means (damage, destruction).

use glam::Vec2;

use super::obstacles::FallingObject;

/// True when `a` and `b` are strictly closer than `radius`
#[inline]
pub fn within(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// Does a falling object at `object_pos` touch the ship at `cursor_pos`?
#[inline]
pub fn obstacle_hits_cursor(object_pos: Vec2, cursor_pos: Vec2, radius: f32) -> bool {
    within(object_pos, cursor_pos, radius)
}

/// Find the falling object a laser at `laser_pos` hits, if any
///
/// Destroyed objects are skipped. Scans from the most recently spawned
/// object backwards and returns the first match, so when two objects
/// overlap the laser the newer one wins.
pub fn laser_target(objects: &[FallingObject], laser_pos: Vec2, radius: f32) -> Option<u32> {
    objects
        .iter()
        .rev()
        .filter(|o| !o.is_destroyed())
        .find(|o| within(o.pos, laser_pos, radius))
        .map(|o| o.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CURSOR_HIT_RADIUS, LASER_HIT_RADIUS};
    use crate::sim::obstacles::ObstacleKind;

    fn object(id: u32, x: f32, y: f32) -> FallingObject {
        FallingObject::new(id, ObstacleKind::Brick, Vec2::new(x, y), 2.0, 0.0)
    }

    #[test]
    fn test_cursor_boundary() {
        let cursor = Vec2::new(100.0, 100.0);
        assert!(obstacle_hits_cursor(
            Vec2::new(124.0, 100.0),
            cursor,
            CURSOR_HIT_RADIUS
        ));
        assert!(!obstacle_hits_cursor(
            Vec2::new(126.0, 100.0),
            cursor,
            CURSOR_HIT_RADIUS
        ));
        // Exactly on the radius is a miss
        assert!(!obstacle_hits_cursor(
            Vec2::new(100.0, 125.0),
            cursor,
            CURSOR_HIT_RADIUS
        ));
    }

    #[test]
    fn test_cursor_diagonal_distance() {
        // (15, 20) away = 25 exactly, miss; (15, 19) ≈ 24.2, hit
        let cursor = Vec2::ZERO;
        assert!(!obstacle_hits_cursor(
            Vec2::new(15.0, 20.0),
            cursor,
            CURSOR_HIT_RADIUS
        ));
        assert!(obstacle_hits_cursor(
            Vec2::new(15.0, 19.0),
            cursor,
            CURSOR_HIT_RADIUS
        ));
    }

    #[test]
    fn test_laser_boundary() {
        let objects = vec![object(1, 0.0, 0.0)];
        assert_eq!(
            laser_target(&objects, Vec2::new(0.0, 29.0), LASER_HIT_RADIUS),
            Some(1)
        );
        assert_eq!(
            laser_target(&objects, Vec2::new(0.0, 31.0), LASER_HIT_RADIUS),
            None
        );
        assert_eq!(
            laser_target(&objects, Vec2::new(30.0, 0.0), LASER_HIT_RADIUS),
            None
        );
    }

    #[test]
    fn test_laser_prefers_newest() {
        let objects = vec![object(1, 0.0, 0.0), object(2, 10.0, 0.0), object(3, 500.0, 0.0)];
        assert_eq!(
            laser_target(&objects, Vec2::new(5.0, 0.0), LASER_HIT_RADIUS),
            Some(2)
        );
    }

    #[test]
    fn test_laser_skips_destroyed() {
        let mut objects = vec![object(1, 0.0, 0.0), object(2, 10.0, 0.0)];
        objects[1].mark_destroyed(0.0);
        assert_eq!(
            laser_target(&objects, Vec2::new(5.0, 0.0), LASER_HIT_RADIUS),
            Some(1)
        );
        objects[0].mark_destroyed(0.0);
        assert_eq!(
            laser_target(&objects, Vec2::new(5.0, 0.0), LASER_HIT_RADIUS),
            None
        );
    }
}
