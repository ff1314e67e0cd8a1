//! Grid Snake entry point
//!
//! Handles browser setup and runs the refresh-driven game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent};

    use grid_snake::hud::{Hud, HudChanges};
    use grid_snake::input::InputResponse;
    use grid_snake::renderer::{QuadBatch, RenderState, draw};
    use grid_snake::sim::{Frame, GamePhase, GameState, StepEvent, frame};
    use grid_snake::{InputMapper, Key, Settings, SpeedPreset};

    /// Page elements outside the canvas; any of them may be absent
    struct Page {
        score: Option<Element>,
        high_score: Option<Element>,
        game_over_popup: Option<HtmlElement>,
        pause_button: Option<Element>,
        on_label: Option<HtmlElement>,
        off_label: Option<HtmlElement>,
    }

    impl Page {
        fn find(document: &Document) -> Self {
            let html = |id: &str| {
                document
                    .get_element_by_id(id)
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            };
            Self {
                score: document.get_element_by_id("score"),
                high_score: document.get_element_by_id("high-score"),
                game_over_popup: html("game-over-popup"),
                pause_button: document.get_element_by_id("pause-button"),
                on_label: html("on-label"),
                off_label: html("off-label"),
            }
        }

        fn apply(&self, changes: &HudChanges) {
            if let (Some(el), Some(text)) = (&self.score, &changes.score) {
                el.set_text_content(Some(text));
            }
            if let (Some(el), Some(text)) = (&self.high_score, &changes.high_score) {
                el.set_text_content(Some(text));
            }
            if let (Some(el), Some(label)) = (&self.pause_button, changes.pause_label) {
                el.set_text_content(Some(label));
            }
            if let (Some(el), Some(show)) = (&self.game_over_popup, changes.game_over) {
                let _ = el
                    .style()
                    .set_property("display", if show { "block" } else { "none" });
            }
            if let Some(on) = changes.wrap_around {
                if let Some(el) = &self.on_label {
                    let _ = el.style().set_property("color", if on { "green" } else { "white" });
                }
                if let Some(el) = &self.off_label {
                    let _ = el.style().set_property("color", if on { "white" } else { "red" });
                }
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        input: InputMapper,
        batch: QuadBatch,
        render_state: Option<RenderState>,
        hud: Hud,
        page: Page,
    }

    impl Game {
        fn new(settings: &Settings, seed: u64, page: Page) -> Self {
            Self {
                state: GameState::new(settings, seed),
                input: InputMapper::new(),
                batch: QuadBatch::new(),
                render_state: None,
                hud: Hud::new(),
                page,
            }
        }

        /// One refresh: maybe step the snake
        fn update(&mut self) {
            if let Frame::Stepped(StepEvent::GameOver(_)) = frame(&mut self.state) {
                // Held keys must not steer the next run
                self.input.clear();
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            draw(&self.state, &mut self.batch);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.batch) {
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

        /// Push score, pause label, popup and switch labels when they change
        fn update_hud(&mut self) {
            let changes = self.hud.update(&self.state);
            if !changes.is_empty() {
                self.page.apply(&changes);
            }
        }

        fn restart(&mut self) {
            self.state.restart();
            self.input.clear();
            log::info!("Game restarted (high score {})", self.state.high_score);
        }
    }

    /// Settings from the canvas: `data-settings` JSON, else the canvas size
    fn load_settings(canvas: &HtmlCanvasElement) -> Settings {
        if let Some(json) = canvas.get_attribute("data-settings") {
            match Settings::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from data-settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring data-settings: {}", e),
            }
        }

        let sized = Settings::with_board_size(canvas.width() as i32, canvas.height() as i32);
        match sized.validate() {
            Ok(()) => sized,
            Err(e) => {
                log::warn!("Canvas size unusable ({}), using default board", e);
                Settings::default()
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Grid Snake starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game")
            .ok_or("no #game canvas")?
            .dyn_into()?;

        let settings = load_settings(&canvas);

        // Backing store at device resolution, CSS size at board resolution
        let dpr = window.device_pixel_ratio();
        let width = (settings.board_width as f64 * dpr) as u32;
        let height = (settings.board_height as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        let style = canvas.style();
        style.set_property("width", &format!("{}px", settings.board_width))?;
        style.set_property("height", &format!("{}px", settings.board_height))?;

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(&settings, seed, Page::find(&document))));
        log::info!(
            "Game initialized with seed {} on a {}x{} board",
            seed,
            settings.board_width,
            settings.board_height
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_keyboard(&document, game.clone())?;
        setup_controls(&document, game.clone())?;

        request_animation_frame(game);

        log::info!("Grid Snake running!");
        Ok(())
    }

    fn setup_keyboard(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(key) = Key::from_key_name(&event.key()) else {
                    return;
                };
                // Arrows and space would scroll the page
                event.prevent_default();

                let mut guard = game.borrow_mut();
                let g = &mut *guard;
                if let InputResponse::PauseToggled(phase) = g.input.key_down(key, &mut g.state) {
                    log::info!("{}", if phase == GamePhase::Paused { "Paused" } else { "Resumed" });
                }
            });
            document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_key_name(&event.key()) {
                    let mut guard = game.borrow_mut();
                    let g = &mut *guard;
                    g.input.key_up(key, &mut g.state);
                }
            });
            document.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn on_click(
        target: &Element,
        game: &Rc<RefCell<Game>>,
        mut handler: impl FnMut(&mut Game) + 'static,
    ) -> Result<(), JsValue> {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            handler(&mut game.borrow_mut());
        });
        target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_controls(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        if let Some(btn) = document.get_element_by_id("restart-button") {
            on_click(&btn, &game, Game::restart)?;
        }

        if let Some(btn) = document.get_element_by_id("pause-button") {
            on_click(&btn, &game, |g| {
                g.state.toggle_pause();
            })?;
        }

        if let Some(switch) = document.get_element_by_id("special-switch") {
            on_click(&switch, &game, |g| {
                let on = g.state.toggle_wrap_around();
                log::info!("Wrap-around mode {}", if on { "on" } else { "off" });
            })?;
        }

        let buttons = document.query_selector_all(".speed-button")?;
        for i in 0..buttons.length() {
            let Some(btn) = buttons.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let raw = btn.get_attribute("data-speed").unwrap_or_default();
            let Some(preset) = SpeedPreset::from_str(&raw) else {
                log::warn!("Speed button with unknown data-speed {:?}", raw);
                continue;
            };
            on_click(&btn, &game, move |g| {
                g.state.set_speed_divisor(preset.divisor());
                log::info!("Speed set to {}", preset.as_str());
            })?;
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Re-scheduled on every refresh, paused or not
    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.update();
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Grid Snake (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(2024);
    headless_run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive the snake around a square for a few laps without a display
#[cfg(not(target_arch = "wasm32"))]
fn headless_run(seed: u64) {
    use grid_snake::sim::{Frame, GameState, StepEvent, frame};
    use grid_snake::{InputMapper, Key, Settings};

    const SIDE: u32 = 6;
    const LAPS: u32 = 2;
    let turns = [Key::Right, Key::Down, Key::Left, Key::Up];

    let mut state = GameState::new(&Settings::default(), seed);
    let mut input = InputMapper::new();
    let mut steps = 0;
    let mut held = turns[0];
    input.key_down(held, &mut state);

    while steps < SIDE * 4 * LAPS {
        match frame(&mut state) {
            Frame::Stepped(StepEvent::GameOver(cause)) => {
                log::warn!("Run ended early after {} steps: {:?}", steps, cause);
                break;
            }
            Frame::Stepped(StepEvent::AteApple { score, .. }) => {
                log::info!("Apple eaten, score {}", score);
                steps += 1;
            }
            Frame::Stepped(StepEvent::Moved) => steps += 1,
            Frame::Throttled | Frame::Idle => continue,
        }

        if steps % SIDE == 0 {
            input.key_up(held, &mut state);
            held = turns[(steps / SIDE % 4) as usize];
            input.key_down(held, &mut state);
        }
    }

    match serde_json::to_string_pretty(&state) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not serialize final state: {}", e),
    }
}
