//! Collision detection and combat resolution
//!
//! Resolution order within a tick is fixed: pickups, then player bullets
//! against enemies, then enemy bullets against the player. Removals are
//! marked during each scan and compacted once the scan finishes.

use super::state::{GameEvent, GamePhase, GameState, RunOutcome};
use crate::circles_touch;

/// Player collects every overlapping pickup
pub fn collect_pickups(state: &mut GameState) {
    let player_pos = state.player.pos;
    let player_radius = state.player.radius;
    let before = state.pickups.len();
    state
        .pickups
        .retain(|p| !circles_touch(p.pos, p.radius, player_pos, player_radius));

    for _ in state.pickups.len()..before {
        state.player.aura += state.world.aura_gain_per_pickup;
        state.events.push(GameEvent::PickupCollected {
            aura: state.player.aura,
        });
    }
}

/// Player bullets damage enemies.
///
/// Enemies are tested in spawn order and the first overlap wins, so one
/// bullet damages at most one enemy per tick.
pub fn resolve_player_bullets(state: &mut GameState) {
    let mut destroyed = vec![false; state.enemies.len()];

    for bullet in state.player_bullets.iter_mut().filter(|b| b.alive) {
        let target = state
            .enemies
            .iter()
            .enumerate()
            .find(|(i, e)| {
                !destroyed[*i] && circles_touch(e.pos, e.radius, bullet.pos, bullet.radius)
            })
            .map(|(i, _)| i);

        let Some(i) = target else { continue };
        let enemy = &mut state.enemies[i];
        enemy.hp -= bullet.damage;
        bullet.alive = false;

        if enemy.hp <= 0 {
            destroyed[i] = true;
            let reward = enemy.kill_reward();
            state.player.aura += reward;
            if enemy.boss {
                state.boss_defeated = true;
            }
            log::debug!(
                "Destroyed level {} {} (+{} aura)",
                enemy.level,
                if enemy.boss { "boss" } else { "enemy" },
                reward
            );
            state.events.push(GameEvent::EnemyDestroyed {
                level: enemy.level,
                boss: enemy.boss,
                pos: enemy.pos,
                reward,
            });
        }
    }

    let mut flags = destroyed.into_iter();
    state.enemies.retain(|_| !flags.next().unwrap_or(false));
    state.player_bullets.retain(|b| b.alive);
}

/// Enemy bullets hit the player; running out of lives ends the run at once
pub fn resolve_enemy_bullets(state: &mut GameState) {
    let player_pos = state.player.pos;
    let player_radius = state.player.radius;

    for bullet in state.enemy_bullets.iter_mut().filter(|b| b.alive) {
        if !circles_touch(bullet.pos, bullet.radius, player_pos, player_radius) {
            continue;
        }
        bullet.alive = false;
        let damage = bullet.damage.max(0) as u32;
        state.player.lives = state.player.lives.saturating_sub(damage);
        state.events.push(GameEvent::PlayerHit {
            lives: state.player.lives,
        });
    }
    state.enemy_bullets.retain(|b| b.alive);

    if state.player.lives == 0 && state.phase == GamePhase::Playing {
        state.phase = GamePhase::GameOver(RunOutcome::Defeated);
        state.clear_combat();
        state.events.push(GameEvent::GameOver {
            outcome: RunOutcome::Defeated,
        });
        log::info!(
            "Game over in world {} with {} aura",
            state.world.world_number,
            state.player.aura
        );
    }
}

/// Resolve every interaction for this tick, in order
pub fn handle_collisions(state: &mut GameState) {
    collect_pickups(state);
    resolve_player_bullets(state);
    resolve_enemy_bullets(state);
}
