//! Audio: sound effects and a rotating music playlist
//!
//! Audio is strictly optional. Every failure (no device, missing track,
//! blocked autoplay) degrades to silence and never reaches the simulation.
//! On the web, effects are synthesized with the Web Audio API and music
//! streams through `<audio>` elements; native builds run silent.

use crate::consts::TICK_RATE;
use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player volley
    Shoot,
    /// Enemy destroyed
    Explosion,
    /// Boss beaten, world cleared
    WorldClear,
    /// Run ended
    GameOver,
}

/// Output device for effects and music
pub trait AudioBackend {
    /// Fire-and-forget; failures are swallowed by the backend
    fn play_sfx(&mut self, effect: SoundEffect, volume: f32);
    /// Start looping `path`, replacing the current track. Returns false if it could not start.
    fn play_track(&mut self, path: &str, volume: f32) -> bool;
    /// Adjust the volume of the track already playing
    fn set_music_volume(&mut self, _volume: f32) {}
    /// True once if the current track failed after `play_track` accepted it
    /// (streamed media reports load errors later)
    fn take_track_failure(&mut self) -> bool {
        false
    }
}

/// Rotates through a list of tracks on a fixed interval.
///
/// Timing is counted in simulation ticks. Tracks that fail to start, or fail
/// later while loading, are skipped; once every track has failed in a row
/// the playlist goes quiet for a full interval and then tries again.
#[derive(Debug, Clone)]
pub struct MusicPlaylist {
    tracks: Vec<String>,
    switch_ticks: u64,
    current_index: Option<usize>,
    current_track_name: String,
    ticks_until_switch: u64,
    failures_in_a_row: usize,
}

impl MusicPlaylist {
    pub fn new(tracks: Vec<String>, switch_seconds: u32) -> Self {
        Self {
            tracks,
            switch_ticks: (switch_seconds.max(1) as u64) * TICK_RATE as u64,
            current_index: None,
            current_track_name: "No Track".to_string(),
            ticks_until_switch: 0,
            failures_in_a_row: 0,
        }
    }

    pub fn current_track_name(&self) -> &str {
        &self.current_track_name
    }

    fn try_play(&mut self, index: usize, backend: &mut dyn AudioBackend, volume: f32) -> bool {
        if self.tracks.is_empty() {
            return false;
        }
        let index = index % self.tracks.len();
        let path = &self.tracks[index];
        if !backend.play_track(path, volume) {
            log::warn!("Could not play music track {path}");
            return false;
        }
        self.current_index = Some(index);
        self.current_track_name = track_file_name(path).to_string();
        self.ticks_until_switch = self.switch_ticks;
        log::info!("Now playing {}", self.current_track_name);
        true
    }

    /// Start the first playable track
    pub fn start(&mut self, backend: &mut dyn AudioBackend, volume: f32) {
        self.advance_from(0, backend, volume);
    }

    /// Advance one tick; switch tracks when the interval runs out or the
    /// current track turns out to be unplayable
    pub fn update(&mut self, backend: &mut dyn AudioBackend, volume: f32) {
        if self.tracks.is_empty() {
            return;
        }

        if let Some(current) = self.current_index {
            if backend.take_track_failure() {
                log::warn!("Music track {} failed to load", self.current_track_name);
                self.failures_in_a_row += 1;
                self.advance_from(current + 1, backend, volume);
                return;
            }
        }

        self.ticks_until_switch = self.ticks_until_switch.saturating_sub(1);
        if self.ticks_until_switch > 0 {
            return;
        }
        self.failures_in_a_row = 0;
        let next = self.current_index.map_or(0, |i| i + 1);
        self.advance_from(next, backend, volume);
    }

    /// Play the first track that starts, searching forward from `first`
    fn advance_from(&mut self, first: usize, backend: &mut dyn AudioBackend, volume: f32) {
        if self.failures_in_a_row < self.tracks.len() {
            for step in 0..self.tracks.len() {
                if self.try_play(first + step, backend, volume) {
                    return;
                }
            }
        }
        self.current_index = None;
        self.current_track_name = "No Track".to_string();
        self.failures_in_a_row = 0;
        self.ticks_until_switch = self.switch_ticks;
    }

    /// Whole seconds until the next switch (0 when nothing is playing)
    pub fn time_to_switch(&self) -> u64 {
        if self.current_index.is_none() {
            return 0;
        }
        self.ticks_until_switch / TICK_RATE as u64
    }
}

fn track_file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// What the HUD shows about audio
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStatus {
    pub enabled: bool,
    pub track_name: String,
    pub seconds_to_switch: u64,
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Option<Box<dyn AudioBackend>>,
    playlist: MusicPlaylist,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl AudioManager {
    /// Open the platform's audio output; falls back to silence
    pub fn new(settings: &Settings) -> Self {
        Self::with_backend(open_platform_backend(), settings)
    }

    /// Manager with an explicit backend (`None` = audio disabled)
    pub fn with_backend(backend: Option<Box<dyn AudioBackend>>, settings: &Settings) -> Self {
        let mut manager = Self {
            backend,
            playlist: MusicPlaylist::new(
                settings.music_playlist.clone(),
                settings.music_switch_seconds,
            ),
            master_volume: settings.master_volume.clamp(0.0, 1.0),
            sfx_volume: settings.sfx_volume.clamp(0.0, 1.0),
            music_volume: settings.music_volume.clamp(0.0, 1.0),
            muted: settings.muted,
        };
        manager.start_music();
        manager
    }

    /// Silent manager
    pub fn disabled(settings: &Settings) -> Self {
        Self::with_backend(None, settings)
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        let volume = self.music_gain();
        if let Some(backend) = self.backend.as_deref_mut() {
            backend.set_music_volume(volume);
        }
    }

    fn sfx_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn music_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    fn start_music(&mut self) {
        let volume = self.music_gain();
        if let Some(backend) = self.backend.as_deref_mut() {
            self.playlist.start(backend, volume);
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let volume = self.sfx_gain();
        if volume <= 0.0 {
            return;
        }
        if let Some(backend) = self.backend.as_deref_mut() {
            backend.play_sfx(effect, volume);
        }
    }

    /// Advance the music playlist by one tick
    pub fn update(&mut self) {
        let volume = self.music_gain();
        if let Some(backend) = self.backend.as_deref_mut() {
            self.playlist.update(backend, volume);
        }
    }

    pub fn status(&self) -> AudioStatus {
        AudioStatus {
            enabled: self.is_enabled(),
            track_name: if self.is_enabled() {
                self.playlist.current_track_name().to_string()
            } else {
                "Audio Off".to_string()
            },
            seconds_to_switch: if self.is_enabled() {
                self.playlist.time_to_switch()
            } else {
                0
            },
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn open_platform_backend() -> Option<Box<dyn AudioBackend>> {
    log::warn!("No native audio output available - audio disabled");
    None
}

#[cfg(target_arch = "wasm32")]
fn open_platform_backend() -> Option<Box<dyn AudioBackend>> {
    web::WebAudioBackend::new().map(|b| Box::new(b) as Box<dyn AudioBackend>)
}

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::Cell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

    use super::{AudioBackend, SoundEffect};

    /// Web Audio effects plus `<audio>` element music
    pub struct WebAudioBackend {
        ctx: AudioContext,
        music: Option<HtmlAudioElement>,
        /// Set by the current track's error handlers
        music_failed: Rc<Cell<bool>>,
        /// Autoplay refused the current track until a user gesture
        music_blocked: Rc<Cell<bool>>,
    }

    impl WebAudioBackend {
        pub fn new() -> Option<Self> {
            // May fail outside a secure context
            let Ok(ctx) = AudioContext::new() else {
                log::warn!("Failed to create AudioContext - audio disabled");
                return None;
            };
            Some(Self {
                ctx,
                music: None,
                music_failed: Rc::new(Cell::new(false)),
                music_blocked: Rc::new(Cell::new(false)),
            })
        }

        /// Flag load errors and rejected playback for one track element.
        /// Each track gets fresh flags so late events from a replaced
        /// element cannot fail its successor.
        fn watch_track(&mut self, element: &HtmlAudioElement, playing: js_sys::Promise) {
            let failed = Rc::new(Cell::new(false));
            let blocked = Rc::new(Cell::new(false));

            let on_error = {
                let failed = failed.clone();
                Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| failed.set(true))
            };
            let _ = element
                .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref());
            on_error.forget();

            let on_reject = {
                let failed = failed.clone();
                let blocked = blocked.clone();
                Closure::<dyn FnMut(_)>::new(move |err: JsValue| {
                    let name = js_sys::Reflect::get(&err, &JsValue::from_str("name"))
                        .ok()
                        .and_then(|n| n.as_string());
                    if name.as_deref() == Some("NotAllowedError") {
                        blocked.set(true);
                    } else {
                        failed.set(true);
                    }
                })
            };
            let _ = playing.catch(&on_reject);
            on_reject.forget();

            self.music_failed = failed;
            self.music_blocked = blocked;
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let ctx = &self.ctx;
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Shoot - short rising zap
        fn play_shoot(&self, vol: f32) {
            let Some((osc, gain)) = self.create_osc(900.0, OscillatorType::Square) else {
                return;
            };
            let t = self.ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.12, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.frequency().set_value_at_time(900.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(1600.0, t + 0.06)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Explosion - boom!
        fn play_explosion(&self, vol: f32) {
            let Some((osc, gain)) = self.create_osc(100.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = self.ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                .ok();
            osc.frequency().set_value_at_time(100.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, t + 0.4)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();

            // High frequency crack
            if let Some((osc2, gain2)) = self.create_osc(1500.0, OscillatorType::Square) {
                gain2.gain().set_value_at_time(vol * 0.2, t).ok();
                gain2
                    .gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                osc2.start().ok();
                osc2.stop_with_when(t + 0.15).ok();
            }
        }

        /// Arpeggio helper for jingles
        fn play_notes(&self, notes: &[f32], spacing: f64, osc_type: OscillatorType, vol: f32) {
            for (i, freq) in notes.iter().enumerate() {
                let delay = i as f64 * spacing;
                if let Some((osc, gain)) = self.create_osc(*freq, osc_type) {
                    let t = self.ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.4).ok();
                }
            }
        }
    }

    impl AudioBackend for WebAudioBackend {
        fn play_sfx(&mut self, effect: SoundEffect, volume: f32) {
            // Browsers suspend the context until a user gesture
            if self.ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = self.ctx.resume();
            }
            if self.music_blocked.replace(false) {
                if let Some(music) = &self.music {
                    let _ = music.play();
                }
            }
            match effect {
                SoundEffect::Shoot => self.play_shoot(volume),
                SoundEffect::Explosion => self.play_explosion(volume),
                SoundEffect::WorldClear => self.play_notes(
                    &[500.0, 630.0, 750.0, 1000.0],
                    0.1,
                    OscillatorType::Triangle,
                    volume,
                ),
                SoundEffect::GameOver => self.play_notes(
                    &[400.0, 350.0, 300.0, 200.0],
                    0.2,
                    OscillatorType::Sine,
                    volume,
                ),
            }
        }

        fn play_track(&mut self, path: &str, volume: f32) -> bool {
            let Ok(element) = HtmlAudioElement::new_with_src(path) else {
                return false;
            };
            element.set_loop(true);
            element.set_volume(volume as f64);
            let Ok(playing) = element.play() else {
                return false;
            };
            self.watch_track(&element, playing);
            if let Some(previous) = self.music.replace(element) {
                let _ = previous.pause();
            }
            true
        }

        fn take_track_failure(&mut self) -> bool {
            self.music_failed.replace(false)
        }

        fn set_music_volume(&mut self, volume: f32) {
            if let Some(music) = &self.music {
                music.set_volume(volume as f64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Records calls; tracks whose path contains "missing" fail to load,
    /// and nothing loads while `offline` is set. Setting `late_failure`
    /// makes the current track fail after it was accepted.
    #[derive(Default)]
    struct Recorder {
        sfx: Rc<RefCell<Vec<SoundEffect>>>,
        tracks: Rc<RefCell<Vec<String>>>,
        offline: Rc<Cell<bool>>,
        late_failure: Rc<Cell<bool>>,
    }

    impl AudioBackend for Recorder {
        fn play_sfx(&mut self, effect: SoundEffect, _volume: f32) {
            self.sfx.borrow_mut().push(effect);
        }

        fn play_track(&mut self, path: &str, _volume: f32) -> bool {
            if path.contains("missing") || self.offline.get() {
                return false;
            }
            self.tracks.borrow_mut().push(path.to_string());
            true
        }

        fn take_track_failure(&mut self) -> bool {
            self.late_failure.replace(false)
        }
    }

    fn settings_with(tracks: &[&str], switch_seconds: u32) -> Settings {
        Settings {
            music_playlist: tracks.iter().map(|t| t.to_string()).collect(),
            music_switch_seconds: switch_seconds,
            ..Settings::default()
        }
    }

    #[test]
    fn test_playlist_skips_missing_and_rotates() {
        let recorder = Recorder::default();
        let tracks = recorder.tracks.clone();
        let settings = settings_with(&["music/missing.mp3", "music/a.mp3", "music/b.mp3"], 1);
        let mut audio = AudioManager::with_backend(Some(Box::new(recorder)), &settings);

        assert_eq!(audio.status().track_name, "a.mp3");
        assert_eq!(audio.status().seconds_to_switch, 1);

        for _ in 0..TICK_RATE {
            audio.update();
        }
        assert_eq!(audio.status().track_name, "b.mp3");

        // Wraps past the missing track back to the first playable one
        for _ in 0..TICK_RATE {
            audio.update();
        }
        assert_eq!(
            *tracks.borrow(),
            vec!["music/a.mp3", "music/b.mp3", "music/a.mp3"]
        );
    }

    #[test]
    fn test_playlist_with_no_playable_tracks_stays_idle() {
        let settings = settings_with(&["missing1.mp3", "missing2.mp3"], 1);
        let mut audio = AudioManager::with_backend(Some(Box::new(Recorder::default())), &settings);
        audio.update();
        let status = audio.status();
        assert!(status.enabled);
        assert_eq!(status.track_name, "No Track");
        assert_eq!(status.seconds_to_switch, 0);
    }

    #[test]
    fn test_playlist_retries_after_interval() {
        let recorder = Recorder::default();
        let offline = recorder.offline.clone();
        offline.set(true);
        let settings = settings_with(&["a.mp3"], 1);
        let mut audio = AudioManager::with_backend(Some(Box::new(recorder)), &settings);
        assert_eq!(audio.status().track_name, "No Track");

        offline.set(false);
        for _ in 0..TICK_RATE - 1 {
            audio.update();
        }
        assert_eq!(audio.status().track_name, "No Track");
        audio.update();
        assert_eq!(audio.status().track_name, "a.mp3");
    }

    #[test]
    fn test_late_failure_skips_to_next_track() {
        let recorder = Recorder::default();
        let late_failure = recorder.late_failure.clone();
        let settings = settings_with(&["a.mp3", "b.mp3", "c.mp3"], 300);
        let mut audio = AudioManager::with_backend(Some(Box::new(recorder)), &settings);
        audio.update();
        assert_eq!(audio.status().track_name, "a.mp3");

        late_failure.set(true);
        audio.update();
        let status = audio.status();
        assert_eq!(status.track_name, "b.mp3");
        assert_eq!(status.seconds_to_switch, 300);
    }

    #[test]
    fn test_every_track_failing_late_goes_quiet_then_retries() {
        let recorder = Recorder::default();
        let late_failure = recorder.late_failure.clone();
        let tracks = recorder.tracks.clone();
        let settings = settings_with(&["a.mp3", "b.mp3", "c.mp3"], 1);
        let mut audio = AudioManager::with_backend(Some(Box::new(recorder)), &settings);

        for _ in 0..3 {
            late_failure.set(true);
            audio.update();
        }
        assert_eq!(*tracks.borrow(), vec!["a.mp3", "b.mp3", "c.mp3"]);
        let status = audio.status();
        assert_eq!(status.track_name, "No Track");
        assert_eq!(status.seconds_to_switch, 0);

        for _ in 0..TICK_RATE {
            audio.update();
        }
        assert_eq!(audio.status().track_name, "a.mp3");
        assert_eq!(tracks.borrow().len(), 4);
    }

    #[test]
    fn test_disabled_audio_is_silent() {
        let mut audio = AudioManager::disabled(&Settings::default());
        audio.play(SoundEffect::Shoot);
        audio.update();
        let status = audio.status();
        assert!(!status.enabled);
        assert_eq!(status.track_name, "Audio Off");
        assert_eq!(status.seconds_to_switch, 0);
    }

    #[test]
    fn test_mute_drops_effects() {
        let recorder = Recorder::default();
        let sfx = recorder.sfx.clone();
        let mut audio =
            AudioManager::with_backend(Some(Box::new(recorder)), &settings_with(&[], 300));
        audio.play(SoundEffect::Explosion);
        audio.set_muted(true);
        audio.play(SoundEffect::Shoot);
        assert_eq!(*sfx.borrow(), vec![SoundEffect::Explosion]);
    }

    #[test]
    fn test_track_file_name() {
        assert_eq!(track_file_name("assets/music/music1.mp3"), "music1.mp3");
        assert_eq!(track_file_name("music2.mp3"), "music2.mp3");
    }
}
