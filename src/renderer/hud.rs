//! Heads-up display text
//!
//! The HUD is plain strings; the web build pushes them into DOM elements
//! and the headless runner logs them.

use crate::audio::AudioStatus;
use crate::sim::{GamePhase, GameState, RunOutcome};

/// Centered message drawn over the playfield
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub title: String,
    pub subtitle: String,
    /// Darken the playfield behind the text
    pub dim: bool,
}

/// Everything the HUD shows for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudSnapshot {
    pub world: String,
    pub aura: String,
    pub lives: String,
    pub weapon: String,
    pub track: String,
    pub boss: String,
    pub overlay: Option<Overlay>,
}

impl HudSnapshot {
    pub fn new(state: &GameState, audio: &AudioStatus) -> Self {
        let boss = if !state.boss_spawned {
            format!("Boss spawn at Aura {}", state.world.aura_required_for_boss_spawn)
        } else if state.boss_alive() {
            "Boss: ACTIVE".to_string()
        } else {
            "Boss: DEFEATED".to_string()
        };

        Self {
            world: format!("World: {}", state.world.world_number),
            aura: format!("Aura: {}", state.player.aura),
            lives: format!("Lives: {}", state.player.lives),
            weapon: format!("Weapon Lv: {}", state.player.weapon_tier().as_str()),
            track: format!("Track: {} ({}s)", audio.track_name, audio.seconds_to_switch),
            boss,
            overlay: overlay_for(state),
        }
    }

    /// Left column lines, top to bottom
    pub fn status_lines(&self) -> [&str; 5] {
        [
            self.world.as_str(),
            self.aura.as_str(),
            self.lives.as_str(),
            self.weapon.as_str(),
            self.track.as_str(),
        ]
    }
}

fn overlay_for(state: &GameState) -> Option<Overlay> {
    match state.phase {
        GamePhase::Playing => None,
        GamePhase::WorldComplete => Some(Overlay {
            title: format!("World {} Complete!", state.world.world_number),
            subtitle: "Preparing next world...".to_string(),
            dim: false,
        }),
        GamePhase::GameOver(outcome) => Some(Overlay {
            title: match outcome {
                RunOutcome::Victory => "Victory! All worlds cleared.".to_string(),
                RunOutcome::Defeated => "Game Over".to_string(),
            },
            subtitle: "Press R to restart or ESC to quit".to_string(),
            dim: true,
        }),
    }
}
