//! Player damage state machine
//!
//! Normal --hit--> Damaged --timer--> Invulnerable --timer--> Normal

use serde::{Deserialize, Serialize};

use super::timer::TimerEvent;
use crate::tuning::Tuning;

/// Current damage phase of the ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerPhase {
    /// Collisions with falling objects hurt
    #[default]
    Normal,
    /// Just got hit (red blink)
    Damaged,
    /// Post-damage grace window (flashing), hits are ignored
    Invulnerable,
}

/// Result of a phase transition: the next phase and the timer to arm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTransition {
    pub next: PlayerPhase,
    /// (event, delay in ms)
    pub arm: Option<(TimerEvent, f64)>,
}

impl PlayerPhase {
    /// Whether an obstacle touching the ship counts as a hit
    pub fn can_take_damage(self) -> bool {
        self == PlayerPhase::Normal
    }

    /// React to an obstacle hit. `None` means the hit is ignored.
    pub fn on_hit(self, tuning: &Tuning) -> Option<PhaseTransition> {
        match self {
            PlayerPhase::Normal => Some(PhaseTransition {
                next: PlayerPhase::Damaged,
                arm: Some((TimerEvent::DamageOver, tuning.damage_ms)),
            }),
            PlayerPhase::Damaged | PlayerPhase::Invulnerable => None,
        }
    }

    /// React to a phase timer firing. Unrelated or stale timers return `None`.
    pub fn on_timer(self, event: TimerEvent, tuning: &Tuning) -> Option<PhaseTransition> {
        match (self, event) {
            (PlayerPhase::Damaged, TimerEvent::DamageOver) => Some(PhaseTransition {
                next: PlayerPhase::Invulnerable,
                arm: Some((TimerEvent::InvulnerabilityOver, tuning.invulnerable_ms)),
            }),
            (PlayerPhase::Invulnerable, TimerEvent::InvulnerabilityOver) => Some(PhaseTransition {
                next: PlayerPhase::Normal,
                arm: None,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let tuning = Tuning::default();

        let t = PlayerPhase::Normal.on_hit(&tuning).expect("normal takes hits");
        assert_eq!(t.next, PlayerPhase::Damaged);
        assert_eq!(t.arm, Some((TimerEvent::DamageOver, 600.0)));

        let t = t
            .next
            .on_timer(TimerEvent::DamageOver, &tuning)
            .expect("damage ends");
        assert_eq!(t.next, PlayerPhase::Invulnerable);
        assert_eq!(t.arm, Some((TimerEvent::InvulnerabilityOver, 1500.0)));

        let t = t
            .next
            .on_timer(TimerEvent::InvulnerabilityOver, &tuning)
            .expect("invulnerability ends");
        assert_eq!(t.next, PlayerPhase::Normal);
        assert_eq!(t.arm, None);
    }

    #[test]
    fn test_hits_ignored_while_recovering() {
        let tuning = Tuning::default();
        assert!(PlayerPhase::Damaged.on_hit(&tuning).is_none());
        assert!(PlayerPhase::Invulnerable.on_hit(&tuning).is_none());
        assert!(!PlayerPhase::Damaged.can_take_damage());
        assert!(!PlayerPhase::Invulnerable.can_take_damage());
        assert!(PlayerPhase::Normal.can_take_damage());
    }

    #[test]
    fn test_stale_timers_ignored() {
        let tuning = Tuning::default();
        assert!(
            PlayerPhase::Normal
                .on_timer(TimerEvent::DamageOver, &tuning)
                .is_none()
        );
        assert!(
            PlayerPhase::Damaged
                .on_timer(TimerEvent::InvulnerabilityOver, &tuning)
                .is_none()
        );
        assert!(
            PlayerPhase::Invulnerable
                .on_timer(TimerEvent::SpawnObstacle, &tuning)
                .is_none()
        );
    }

    #[test]
    fn test_durations_come_from_tuning() {
        let tuning = Tuning {
            damage_ms: 100.0,
            invulnerable_ms: 250.0,
            ..Default::default()
        };
        let hit = PlayerPhase::Normal.on_hit(&tuning).expect("hit");
        assert_eq!(hit.arm, Some((TimerEvent::DamageOver, 100.0)));
        let over = hit
            .next
            .on_timer(TimerEvent::DamageOver, &tuning)
            .expect("over");
        assert_eq!(over.arm, Some((TimerEvent::InvulnerabilityOver, 250.0)));
    }
}
