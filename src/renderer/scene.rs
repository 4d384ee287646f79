//! Scene building: game state to a flat triangle list
//!
//! Coordinates stay in playfield pixels (origin top-left, y down); the
//! pipeline maps them to clip space.

use glam::Vec2;

use super::shapes::{bullet_trail, circle, rect, triangle};
use super::vertex::{Vertex, colors, rgba, with_alpha};
use crate::consts::{HEIGHT, WIDTH};
use crate::settings::Settings;
use crate::sim::{AuraPickup, Bullet, Enemy, GamePhase, GameState, Player, Star};

/// Aura at which the background tint saturates
const TINT_FULL_AURA: f32 = 900.0;
/// Alpha of the full-screen tint wash
const TINT_WASH_ALPHA: u8 = 28;

/// Background tint for an aura total, 0..=255 per channel
pub fn background_tint(aura: u32) -> [u8; 3] {
    let f = (aura as f32 / TINT_FULL_AURA).min(1.0);
    [
        (20.0 + 70.0 * f) as u8,
        (10.0 + 50.0 * f) as u8,
        (30.0 + 90.0 * f) as u8,
    ]
}

/// Color the frame is cleared to before any geometry
pub fn clear_color(aura: u32) -> [f32; 4] {
    let [r, g, b] = background_tint(aura);
    rgba(8 + r / 4, 8 + g / 4, 16 + b / 4, 255)
}

fn star_color(tint: [u8; 3]) -> [f32; 4] {
    let channel = |t: u8| (140 + u32::from(t) / 2).min(255) as u8;
    rgba(channel(tint[0]), channel(tint[1]), channel(tint[2]), 255)
}

/// Build all geometry for one frame, back to front
pub fn build_scene(state: &GameState, settings: &Settings) -> Vec<Vertex> {
    let segments = settings.quality.circle_segments();
    let glow = settings.quality.glow_enabled();
    let tint = background_tint(state.player.aura);

    let mut verts = Vec::with_capacity(4096);

    if settings.starfield {
        let color = star_color(tint);
        for star in &state.stars {
            push_star(&mut verts, star, color);
        }
    }
    verts.extend(rect(
        Vec2::ZERO,
        Vec2::new(WIDTH, HEIGHT),
        rgba(tint[0], tint[1], tint[2], TINT_WASH_ALPHA),
    ));

    for pickup in &state.pickups {
        push_pickup(&mut verts, pickup, segments);
    }
    for bullet in &state.player_bullets {
        push_bullet(&mut verts, bullet, colors::PLAYER_BULLET, settings.trails, segments);
    }
    for bullet in &state.enemy_bullets {
        push_bullet(&mut verts, bullet, colors::ENEMY_BULLET, settings.trails, segments);
    }
    for enemy in &state.enemies {
        push_enemy(&mut verts, enemy, glow, segments);
    }
    push_player(&mut verts, &state.player, glow, segments);

    if matches!(state.phase, GamePhase::GameOver(_)) {
        verts.extend(rect(Vec2::ZERO, Vec2::new(WIDTH, HEIGHT), colors::OVERLAY));
    }

    verts
}

fn push_star(verts: &mut Vec<Vertex>, star: &Star, color: [f32; 4]) {
    // Stars are tiny; a quad reads the same as a circle
    let size = star.size as f32;
    verts.extend(rect(star.pos - Vec2::splat(size), Vec2::splat(size * 2.0), color));
}

fn push_pickup(verts: &mut Vec<Vertex>, pickup: &AuraPickup, segments: u32) {
    let r = pickup.radius + pickup.pulse.sin() * 2.0;
    verts.extend(circle(pickup.pos, r, colors::PICKUP, segments));
    verts.extend(circle(pickup.pos, r * 0.55, colors::PICKUP_CORE, segments));
}

fn push_bullet(
    verts: &mut Vec<Vertex>,
    bullet: &Bullet,
    color: [f32; 4],
    trails: bool,
    segments: u32,
) {
    let segments = (segments / 2).max(6);
    if trails {
        verts.extend(bullet_trail(&bullet.trail, bullet.radius, color, segments));
    }
    verts.extend(circle(bullet.pos, bullet.radius, color, segments));
}

fn push_enemy(verts: &mut Vec<Vertex>, enemy: &Enemy, glow: bool, segments: u32) {
    let r = enemy.radius;
    let pos = enemy.pos;

    if glow {
        let glow_r = r + enemy.level as f32 * 2.0 + enemy.glow_boost as f32;
        let alpha = (45 + enemy.level * 8 + enemy.glow_boost * 6).min(180) as f32 / 255.0;
        let color = if enemy.boss { colors::BOSS_GLOW } else { colors::ENEMY_GLOW };
        verts.extend(circle(pos, glow_r, with_alpha(color, alpha), segments));
    }

    let body = if enemy.boss { colors::BOSS_BODY } else { colors::ENEMY_BODY };
    verts.extend(circle(pos - Vec2::new(0.0, r / 2.0), r / 3.0, colors::ENEMY_HEAD, segments));
    verts.extend(rect(
        pos + Vec2::new(-r / 3.0, -r / 8.0),
        Vec2::new(r * 2.0 / 3.0, r),
        body,
    ));
    verts.extend(rect(
        pos + Vec2::new(r / 3.0, 0.0),
        Vec2::new(r / 2.0, r / 5.0),
        colors::ENEMY_GUN,
    ));
}

fn push_player(verts: &mut Vec<Vertex>, player: &Player, glow: bool, segments: u32) {
    let pos = player.pos;

    if glow {
        let strength = (60 + player.aura / 3).min(220) as f32 / 255.0;
        let glow_r = player.radius + 10.0 + (player.aura / 35).min(26) as f32;
        verts.extend(circle(pos, glow_r, with_alpha(colors::PLAYER_GLOW, strength), segments));
    }

    verts.extend(circle(pos, player.radius, colors::PLAYER_BODY, segments));
    verts.extend(triangle(
        pos + Vec2::new(0.0, -24.0),
        pos + Vec2::new(-12.0, 18.0),
        pos + Vec2::new(12.0, 18.0),
        colors::PLAYER_FIN,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::QualityPreset;
    use crate::sim::RunOutcome;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_tint_saturates() {
        assert_eq!(background_tint(0), [20, 10, 30]);
        assert_eq!(background_tint(900), [90, 60, 120]);
        assert_eq!(background_tint(5000), background_tint(900));
        assert_eq!(clear_color(0), rgba(13, 10, 23, 255));
    }

    #[test]
    fn test_star_color_brightens_with_tint() {
        let dim = star_color(background_tint(0));
        let bright = star_color(background_tint(900));
        assert!(bright[0] > dim[0] && bright[2] > dim[2]);
    }

    #[test]
    fn test_scene_contains_entities() {
        let mut state = GameState::new(1);
        let settings = Settings::default();
        let empty_len = build_scene(&state, &settings).len();

        let mut rng = Pcg32::seed_from_u64(1);
        state
            .enemies
            .push(Enemy::new(2, Vec2::new(100.0, 100.0), false, &mut rng));
        assert!(build_scene(&state, &settings).len() > empty_len);
        assert!(empty_len % 3 == 0);
    }

    #[test]
    fn test_starfield_toggle_and_game_over_dim() {
        let state = GameState::new(2);
        let mut settings = Settings::default();
        let with_stars = build_scene(&state, &settings).len();
        settings.starfield = false;
        let without = build_scene(&state, &settings).len();
        assert_eq!(with_stars - without, state.stars.len() * 6);

        let mut over = state.clone();
        over.phase = GamePhase::GameOver(RunOutcome::Defeated);
        let verts = build_scene(&over, &settings);
        assert_eq!(verts.len(), without + 6);
        assert_eq!(verts[verts.len() - 1].color, colors::OVERLAY);
    }

    #[test]
    fn test_low_quality_drops_glow() {
        let state = GameState::new(3);
        let high = build_scene(&state, &Settings::from_preset(QualityPreset::High)).len();
        let low = build_scene(&state, &Settings::from_preset(QualityPreset::Low)).len();
        assert!(low < high);
    }
}
