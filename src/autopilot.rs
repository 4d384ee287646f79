//! Idle/demo mode - AI plays the game
//!
//! Produces the same `TickInput` a keyboard would, so the simulation cannot
//! tell the difference. Used by the headless native runner and the web
//! demo toggle.

use glam::Vec2;

use crate::consts::{HEIGHT, PLAYER_SPAWN_OFFSET_Y, WIDTH};
use crate::sim::{GamePhase, GameState, TickInput};

/// Enemy bullets closer than this are dodged
const DODGE_RADIUS: f32 = 110.0;
/// Enemies closer than this are backed away from
const KEEP_AWAY_RADIUS: f32 = 150.0;
/// Axis components smaller than this are treated as zero
const DEADZONE: f32 = 0.3;

/// Decide this tick's input for the current state
pub fn autopilot_input(state: &GameState) -> TickInput {
    if matches!(state.phase, GamePhase::GameOver(_)) {
        return TickInput {
            restart: true,
            ..Default::default()
        };
    }

    let desired = steering(state);
    TickInput {
        fire: true,
        ..axis_to_input(desired)
    }
}

fn steering(state: &GameState) -> Vec2 {
    let me = state.player.pos;

    // Most dangerous incoming bullet: close and still approaching
    let threat = state
        .enemy_bullets
        .iter()
        .filter(|b| b.pos.distance(me) < DODGE_RADIUS && b.vel.dot(me - b.pos) > 0.0)
        .min_by(|a, b| {
            a.pos
                .distance_squared(me)
                .partial_cmp(&b.pos.distance_squared(me))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(bullet) = threat {
        // Sidestep across the bullet's path, toward whichever side we're already on
        let across = bullet.vel.perp().normalize_or_zero();
        let side = if across.dot(me - bullet.pos) >= 0.0 { 1.0 } else { -1.0 };
        return across * side;
    }

    let crowding = state
        .enemies
        .iter()
        .filter(|e| e.pos.distance(me) < KEEP_AWAY_RADIUS + e.radius)
        .fold(Vec2::ZERO, |acc, e| acc + (me - e.pos).normalize_or_zero());
    if crowding != Vec2::ZERO {
        return crowding;
    }

    let nearest_pickup = state.pickups.iter().min_by(|a, b| {
        a.pos
            .distance_squared(me)
            .partial_cmp(&b.pos.distance_squared(me))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some(pickup) = nearest_pickup {
        return pickup.pos - me;
    }

    // Patrol along the bottom of the screen while waiting
    let time_factor = state.time_ticks as f32 * 0.01;
    let home = Vec2::new(
        WIDTH / 2.0 + time_factor.sin() * WIDTH * 0.3,
        HEIGHT - PLAYER_SPAWN_OFFSET_Y,
    );
    home - me
}

/// Turn a desired heading into held direction flags
fn axis_to_input(desired: Vec2) -> TickInput {
    let dir = desired.normalize_or_zero();
    TickInput {
        left: dir.x < -DEADZONE,
        right: dir.x > DEADZONE,
        up: dir.y < -DEADZONE,
        down: dir.y > DEADZONE,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{AuraPickup, Bullet, BulletOwner, RunOutcome, tick};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_heads_for_pickup() {
        let mut state = GameState::new(1);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pickup = AuraPickup::new(&mut rng);
        pickup.pos = state.player.pos + Vec2::new(-200.0, 0.0);
        state.pickups.push(pickup);

        let input = autopilot_input(&state);
        assert!(input.left && !input.right);
        assert!(input.fire);
    }

    #[test]
    fn test_dodges_incoming_bullet() {
        let mut state = GameState::new(2);
        let me = state.player.pos;
        state.enemy_bullets.push(Bullet::new(
            BulletOwner::Enemy,
            me + Vec2::new(5.0, -60.0),
            Vec2::new(0.0, 4.0),
            1,
            4.0,
        ));
        let input = autopilot_input(&state);
        assert!(input.right || input.left);
        assert!(!input.up && !input.down);
    }

    #[test]
    fn test_restarts_after_game_over() {
        let mut state = GameState::new(3);
        state.phase = GamePhase::GameOver(RunOutcome::Defeated);
        assert!(autopilot_input(&state).restart);
    }

    #[test]
    fn test_holds_fire_with_no_enemies() {
        let state = GameState::new(5);
        assert!(state.enemies.is_empty());
        assert!(autopilot_input(&state).fire);
    }

    #[test]
    fn test_autopilot_drives_simulation() {
        let mut state = GameState::new(4);
        for _ in 0..600 {
            let input = autopilot_input(&state);
            tick(&mut state, &input);
            let p = state.player.pos;
            assert!(p.x >= 0.0 && p.x <= WIDTH && p.y >= 0.0 && p.y <= HEIGHT);
        }
        assert!(state.time_ticks > 0);
    }
}
