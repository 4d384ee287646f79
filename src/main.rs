//! Light War entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent};

    use light_war::consts::SIM_DT;
    use light_war::renderer::{HudSnapshot, RenderState, build_scene, clear_color};
    use light_war::sim::TickInput;
    use light_war::{Game, Settings};

    /// Browser-side wrapper around the simulation driver
    struct WebGame {
        game: Game,
        settings: Settings,
        render_state: Option<RenderState>,
        last_time: f64,
        last_hud: Option<HudSnapshot>,
    }

    impl WebGame {
        fn new(seed: u64, settings: Settings) -> Self {
            Self {
                game: Game::new(seed, &settings),
                settings,
                render_state: None,
                last_time: 0.0,
                last_hud: None,
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                let vertices = build_scene(&self.game.state, &self.settings);
                let clear = clear_color(self.game.state.player.aura);
                match render_state.render(&vertices, clear) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM, touching only what changed
        fn update_hud(&mut self, document: &Document) {
            let hud = self.game.hud();
            if self.last_hud.as_ref() == Some(&hud) {
                return;
            }

            let set_text = |id: &str, text: &str| {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(text));
                }
            };
            set_text("hud-world", &hud.world);
            set_text("hud-aura", &hud.aura);
            set_text("hud-lives", &hud.lives);
            set_text("hud-weapon", &hud.weapon);
            set_text("hud-track", &hud.track);
            set_text("hud-boss", &hud.boss);

            if let Some(el) = document.get_element_by_id("overlay") {
                match &hud.overlay {
                    Some(overlay) => {
                        set_text("overlay-title", &overlay.title);
                        set_text("overlay-subtitle", &overlay.subtitle);
                        let class = if overlay.dim { "dim" } else { "" };
                        let _ = el.set_attribute("class", class);
                    }
                    None => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }

            self.last_hud = Some(hud);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Light War starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = match document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok())
        {
            Some(canvas) => canvas,
            None => {
                log::error!("No <canvas id=\"canvas\"> element");
                return;
            }
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        log::info!("Quality preset: {}", settings.quality.as_str());
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let game = Rc::new(RefCell::new(WebGame::new(seed, settings)));

        // Initialize WebGPU; without it the game still runs with the DOM HUD only
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                match instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::HighPerformance,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await
                {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match RenderState::new(surface, &adapter, width, height).await {
                            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
                            Err(e) => log::error!("Failed to set up renderer: {}", e),
                        }
                    }
                    Err(e) => log::error!("Failed to get adapter: {}", e),
                }
            }
            Err(e) => log::error!("Failed to create surface: {}", e),
        }

        setup_input_handlers(game.clone());
        setup_auto_mute(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Light War running!");
    }

    /// Map a key to the held flag it drives
    fn held_flag<'a>(input: &'a mut TickInput, key: &str) -> Option<&'a mut bool> {
        match key {
            "ArrowUp" | "w" | "W" => Some(&mut input.up),
            "ArrowDown" | "s" | "S" => Some(&mut input.down),
            "ArrowLeft" | "a" | "A" => Some(&mut input.left),
            "ArrowRight" | "d" | "D" => Some(&mut input.right),
            " " => Some(&mut input.fire),
            _ => None,
        }
    }

    fn setup_input_handlers(game: Rc<RefCell<WebGame>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down: held movement/fire plus one-shot commands
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if let Some(flag) = held_flag(&mut g.game.input, &key) {
                    *flag = true;
                    event.prevent_default();
                    return;
                }
                match key.as_str() {
                    "r" | "R" => g.game.input.restart = true,
                    "m" | "M" => {
                        let muted = !g.settings.muted;
                        g.settings.muted = muted;
                        g.game.audio.set_muted(muted);
                        g.settings.save();
                        log::info!("Muted: {}", muted);
                    }
                    "Escape" => g.game.input.quit = true,
                    "i" | "I" => {
                        g.game.idle_mode = !g.game.idle_mode;
                        log::info!("Idle mode: {}", g.game.idle_mode);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up: release held flags
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if let Some(flag) = held_flag(&mut g.game.input, &event.key()) {
                    *flag = false;
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Mute while the window is unfocused, if the player asked for it
    fn setup_auto_mute(game: Rc<RefCell<WebGame>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.game.audio.set_muted(true);
                    // Keys released while unfocused never send keyup
                    g.game.input = TickInput::default();
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    let muted = g.settings.muted;
                    g.game.audio.set_muted(muted);
                }
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<WebGame>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<WebGame>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.game.update(dt);
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }

            if !g.game.is_running() {
                log::info!("Light War stopped");
                return;
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Headless native run: the autopilot plays for a fixed number of ticks
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use light_war::{Game, Settings};

    env_logger::init();
    log::info!("Light War (native) starting...");

    let settings = Settings::load();
    log::info!("Quality preset: {}", settings.quality.as_str());
    let seed = settings.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });

    let mut game = Game::new(seed, &settings);
    game.idle_mode = true;

    for _ in 0..settings.headless_ticks {
        game.step();
        if !game.is_running() {
            break;
        }
    }

    let hud = game.hud();
    log::info!(
        "Finished after {} ticks (seed {}): {}",
        game.state.time_ticks,
        seed,
        hud.status_lines().join(", ")
    );
    log::info!("{}", hud.boss);
    if let Some(overlay) = hud.overlay {
        log::info!("{}", overlay.title);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
