//! Hellrun entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use hellrun::Session;
    use hellrun::backend::{HttpBackend, OfflineBackend, ScoreBackend};
    use hellrun::consts::NOMINAL_DT;
    use hellrun::levels;
    use hellrun::renderer::{CanvasRenderer, Renderer};
    use hellrun::tuning::Tuning;

    /// Game instance holding all state
    struct Game {
        session: Session,
        renderer: CanvasRenderer,
        last_time: f64,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                NOMINAL_DT
            };
            self.last_time = time;

            self.session.frame(dt);
            let frame = self.session.render_frame();
            self.renderer.render(&frame);
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Hellrun starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()
            .map_err(|_| "not a canvas")?;

        // Leaderboard endpoint comes from the page; none means local-only
        let backend: Box<dyn ScoreBackend> = match canvas.get_attribute("data-leaderboard") {
            Some(url) if !url.is_empty() => Box::new(HttpBackend::new(url)),
            _ => Box::new(OfflineBackend),
        };

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;

        let mut renderer = CanvasRenderer::new(canvas).ok_or("no 2d context")?;
        renderer.resize(width.max(1), height.max(1));

        let seed = js_sys::Date::now() as u64;
        let mut session = Session::new(levels::campaign(), Tuning::default(), backend, seed);
        session.input.allow_debug = cfg!(debug_assertions);

        let game = Rc::new(RefCell::new(Game {
            session,
            renderer,
            last_time: 0.0,
        }));

        setup_keyboard(game.clone())?;
        setup_auto_pause(game.clone())?;
        request_animation_frame(game);

        log::info!("Hellrun running!");
        Ok(())
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let bound = game.borrow_mut().session.input.key_down(&event.key(), event.repeat());
                if bound {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().session.input.key_up(&event.key());
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().session.auto_pause("tab hidden");
                }
            });
            document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game_blur = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game_blur.borrow_mut();
                g.session.set_focused(false);
                g.session.auto_pause("window blur");
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().session.set_focused(true);
            });
            window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hellrun (native) starting...");
    log::info!("The playable build is web-only - run with `trunk serve`. Running a headless demo.");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run through the campaign: start, run right while shooting, jump
/// now and then. Logs a summary of what happened.
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use hellrun::Session;
    use hellrun::backend::OfflineBackend;
    use hellrun::consts::NOMINAL_DT;
    use hellrun::levels;
    use hellrun::sim::{GameEvent, GamePhase};
    use hellrun::tuning::Tuning;

    const MAX_FRAMES: u32 = 60 * 120;

    pub fn run() {
        let mut session = Session::new(levels::campaign(), Tuning::default(), Box::new(OfflineBackend), 42);
        session.input.key_down("Enter", false);

        let mut kills = 0u32;
        let mut levels_cleared = 0u32;
        let mut deaths = 0u32;
        let mut frames = 0u32;

        while frames < MAX_FRAMES {
            frames += 1;
            // Press and release jump on a fixed rhythm
            if frames % 45 == 0 {
                session.input.key_down(" ", false);
            } else if frames % 45 == 20 {
                session.input.key_up(" ");
            }
            if frames == 2 {
                session.input.key_down("ArrowRight", false);
                session.input.key_down("x", false);
            }

            for event in session.frame(NOMINAL_DT) {
                match event {
                    GameEvent::EnemyKilled { .. } => kills += 1,
                    GameEvent::LevelCompleted { index } => {
                        levels_cleared += 1;
                        log::info!("Cleared level {}", index);
                    }
                    GameEvent::PlayerDied { lives_left } => {
                        deaths += 1;
                        log::info!("Died, {} lives left", lives_left);
                    }
                    _ => {}
                }
            }
            if matches!(session.state.phase, GamePhase::GameOver | GamePhase::Victory) {
                break;
            }
        }

        log::info!(
            "Headless run finished after {} frames: phase {:?}, score {}, kills {}, levels cleared {}, deaths {}",
            frames,
            session.state.phase,
            session.state.score,
            kills,
            levels_cleared,
            deaths
        );
        println!(
            "phase={:?} score={} kills={} levels={} deaths={}",
            session.state.phase, session.state.score, kills, levels_cleared, deaths
        );
    }
}
