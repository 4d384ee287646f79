//! Simulation driver
//!
//! Owns the simulation state and its collaborators and advances the state
//! in fixed ticks from variable frame times. Ticks are atomic: quitting
//! takes effect between ticks, never inside one.

use crate::audio::{AudioManager, SoundEffect};
use crate::autopilot::autopilot_input;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::renderer::HudSnapshot;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, RunOutcome, TickInput, tick};

/// Game instance holding all state
pub struct Game {
    pub state: GameState,
    pub audio: AudioManager,
    /// Input held for the next tick
    pub input: TickInput,
    /// Let the autopilot play instead of `input`
    pub idle_mode: bool,
    accumulator: f32,
    running: bool,
}

impl Game {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self::with_audio(GameState::new(seed), AudioManager::new(settings))
    }

    pub fn with_audio(state: GameState, audio: AudioManager) -> Self {
        log::info!("Game initialized with seed: {}", state.seed);
        Self {
            state,
            audio,
            input: TickInput::default(),
            idle_mode: false,
            accumulator: 0.0,
            running: true,
        }
    }

    /// False once a quit command has been processed
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run as many fixed ticks as `frame_dt` seconds allow; returns ticks run
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        let dt = frame_dt.clamp(0.0, 0.25);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS && self.running {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Falling behind; drop the backlog rather than spiral
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Advance exactly one tick
    pub fn step(&mut self) {
        if !self.running {
            return;
        }
        if self.input.quit {
            log::info!("Quit requested");
            self.running = false;
            return;
        }

        let input = if self.idle_mode {
            autopilot_input(&self.state)
        } else {
            self.input.clone()
        };
        tick(&mut self.state, &input);
        self.audio.update();
        self.dispatch_events();

        // One-shot commands apply to a single tick
        self.input.clear_one_shots();
    }

    /// Forward this tick's events to audio and the log
    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::PlayerFired { .. } => self.audio.play(SoundEffect::Shoot),
                GameEvent::EnemyDestroyed { .. } => self.audio.play(SoundEffect::Explosion),
                GameEvent::WorldComplete { .. } => self.audio.play(SoundEffect::WorldClear),
                GameEvent::GameOver { outcome } => {
                    if outcome == RunOutcome::Defeated {
                        self.audio.play(SoundEffect::GameOver);
                    } else {
                        self.audio.play(SoundEffect::WorldClear);
                    }
                }
                GameEvent::PlayerHit { lives } => log::debug!("Player hit, {} lives left", lives),
                GameEvent::EnemyFired { .. }
                | GameEvent::PickupCollected { .. }
                | GameEvent::BossSpawned { .. }
                | GameEvent::WorldStarted { .. } => {}
            }
        }
    }

    /// Text for the heads-up display
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::new(&self.state, &self.audio.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;

    fn silent_game(seed: u64) -> Game {
        let settings = Settings::default();
        Game::with_audio(GameState::new(seed), AudioManager::disabled(&settings))
    }

    #[test]
    fn test_update_runs_fixed_ticks() {
        let mut game = silent_game(1);
        assert_eq!(game.update(SIM_DT * 3.5), 3);
        assert_eq!(game.state.time_ticks, 3);
        // Leftover half tick carries into the next frame
        assert_eq!(game.update(SIM_DT * 0.75), 1);
    }

    #[test]
    fn test_update_caps_substeps() {
        let mut game = silent_game(2);
        assert_eq!(game.update(10.0), MAX_SUBSTEPS);
        assert!(game.update(0.0) <= 1);
    }

    #[test]
    fn test_quit_stops_between_ticks() {
        let mut game = silent_game(3);
        game.step();
        game.input.quit = true;
        game.step();
        assert!(!game.is_running());
        let ticks = game.state.time_ticks;
        assert_eq!(game.update(1.0), 0);
        assert_eq!(game.state.time_ticks, ticks);
    }

    #[test]
    fn test_restart_is_one_shot() {
        let mut game = silent_game(4);
        game.state.player.aura = 50;
        game.state.phase = GamePhase::GameOver(RunOutcome::Defeated);
        game.input.restart = true;
        game.step();
        assert_eq!(game.state.phase, GamePhase::Playing);
        assert_eq!(game.state.player.aura, 0);
        assert!(!game.input.restart);
    }

    #[test]
    fn test_events_are_drained_each_tick() {
        let mut game = silent_game(5);
        game.input.fire = true;
        game.step();
        assert!(game.state.events.is_empty());
        assert_eq!(game.state.player_bullets.len(), 1);
    }

    #[test]
    fn test_idle_mode_plays_itself() {
        let mut game = silent_game(6);
        game.idle_mode = true;
        for _ in 0..120 {
            game.step();
        }
        assert_eq!(game.state.time_ticks, 120);
    }
}
