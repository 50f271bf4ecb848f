//! Spaceship cursor entry point
//!
//! On the web this mounts the cursor and mirrors the simulation into DOM
//! elements every animation frame. Natively it runs a scripted headless
//! session and logs a summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, EventTarget, HtmlElement, MouseEvent};

    use spaceship_cursor::Settings;
    use spaceship_cursor::consts::TICK_MS;
    use spaceship_cursor::sim::{
        CursorState, FallingObject, FrameClock, GameEvent, InputEvent, Particle, ParticleKind,
        Tint, run_frame,
    };

    /// Elements that switch the ship into its hover look
    const INTERACTIVE_SELECTOR: &str = "a, button, .link, input, textarea, .skill-card, \
        .project-btn, .certificate-image, .experience-tab, .menu-link";
    /// Draggable widget
    const DRAG_TARGET_ID: &str = "skillsWheel";
    /// Longest frame fed to the accumulator (ms)
    const MAX_FRAME_MS: f64 = 100.0;
    const BODY_CLASS: &str = "spaceship-cursor-active";

    const CURSOR_CSS: &str = "
        body.spaceship-cursor-active, body.spaceship-cursor-active * { cursor: none !important; }
        .spaceship-cursor { position: fixed; left: 0; top: 0; pointer-events: none; z-index: 10000; }
        .spaceship-cursor .spaceship { width: 32px; height: 32px; transform: translate(-50%, -50%);
            background: linear-gradient(180deg, #00ffff, #0088ff); image-rendering: pixelated;
            clip-path: polygon(50% 0, 100% 100%, 50% 75%, 0 100%); }
        .spaceship-cursor.hovering .spaceship { transform: translate(-50%, -50%) scale(1.3); }
        .spaceship-cursor.clicking .spaceship { transform: translate(-50%, -50%) scale(0.9); }
        .spaceship-cursor.dragging .spaceship { filter: hue-rotate(90deg); }
        .spaceship-cursor.damaged .spaceship { background: #ff0000; }
        .spaceship-cursor.invulnerable .spaceship { animation: ship-blink 0.15s steps(2) infinite; }
        @keyframes ship-blink { 50% { opacity: 0.3; } }
        .trail-particle, .explosion-particle, .shoot-particle, .falling-object {
            position: fixed; pointer-events: none; z-index: 9999; }
        .trail-particle { background: rgba(0, 200, 255, 0.8); }
        .trail-particle.damaged-trail { background: rgba(255, 40, 40, 0.8); }
        .explosion-particle { background: linear-gradient(135deg, #ffff00, #ff8800); }
        .explosion-particle.flash { background: linear-gradient(135deg, #ffffff, #ffff00);
            box-shadow: 0 0 20px rgba(255, 255, 255, 1); }
        .explosion-particle.damaged-particle { background: linear-gradient(135deg, #ff0000, #cc0000); }
        .shoot-particle { height: 20px; background: linear-gradient(180deg, #00ffff, transparent); }
        .falling-object { width: 30px; height: 30px; }
        .falling-object.brick { background: #b5482a; border: 2px solid #7a2c16; }
        .falling-object.rock { background: #777; border-radius: 40%; }
    ";

    /// Presenter holding the simulation and its DOM mirror
    struct Game {
        state: CursorState,
        clock: FrameClock,
        last_time: f64,
        document: Document,
        body: HtmlElement,
        cursor: Element,
        particles: HashMap<u32, Element>,
        obstacles: HashMap<u32, Element>,
    }

    impl Game {
        /// Run simulation ticks for one display frame
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).min(MAX_FRAME_MS)
            } else {
                TICK_MS
            };
            self.last_time = time;

            if let Some(window) = web_sys::window() {
                let width = window.inner_width().ok().and_then(|v| v.as_f64());
                let height = window.inner_height().ok().and_then(|v| v.as_f64());
                if let (Some(w), Some(h)) = (width, height) {
                    self.state.set_viewport(w as f32, h as f32);
                }
            }

            run_frame(&mut self.state, &mut self.clock, dt);

            for event in self.state.drain_events() {
                match event {
                    GameEvent::PlayerHit { .. } => log::info!("Ship hit!"),
                    other => log::debug!("{:?}", other),
                }
            }
        }

        /// Mirror the simulation into the DOM
        fn render(&mut self) {
            let flags = self.state.flags();
            let mut class = String::from("spaceship-cursor");
            for name in flags.class_names() {
                class.push(' ');
                class.push_str(name);
            }
            self.cursor.set_class_name(&class);
            let pos = self.state.display_pos;
            let _ = self.cursor.set_attribute(
                "style",
                &format!(
                    "transform: translate({:.1}px, {:.1}px); opacity: {}",
                    pos.x,
                    pos.y,
                    if flags.visible { 1 } else { 0 }
                ),
            );

            let particles = self.state.particles.particles();
            reconcile(
                &self.document,
                &self.body,
                &mut self.particles,
                particles.iter().map(|p| (p.id, particle_class(p), particle_style(p))),
            );

            let now = self.state.now_ms;
            let removal = self.state.tuning.destroy_removal_ms;
            reconcile(
                &self.document,
                &self.body,
                &mut self.obstacles,
                self.state
                    .obstacles
                    .objects()
                    .iter()
                    .map(|o| (o.id, obstacle_class(o), obstacle_style(o, now, removal))),
            );
        }

        /// Tear down: stop the simulation and drop every element
        fn detach(&mut self) {
            self.state.detach();
            for (_, el) in self.particles.drain().chain(self.obstacles.drain()) {
                el.remove();
            }
            self.cursor.remove();
            let _ = self.body.class_list().remove_1(BODY_CLASS);
        }
    }

    fn particle_class(p: &Particle) -> String {
        let damaged = p.tint == Tint::Damaged;
        match p.kind {
            ParticleKind::Trail if damaged => "trail-particle damaged-trail".into(),
            ParticleKind::Trail => "trail-particle".into(),
            ParticleKind::Flash => "explosion-particle flash".into(),
            ParticleKind::Explosion if damaged => "explosion-particle damaged-particle".into(),
            ParticleKind::Explosion => "explosion-particle".into(),
            ParticleKind::Laser => "shoot-particle".into(),
        }
    }

    fn particle_style(p: &Particle) -> String {
        format!(
            "left: {:.1}px; top: {:.1}px; width: {:.1}px; height: {:.1}px; opacity: {:.3}; \
             transform: translate(-50%, -50%) scale({:.2})",
            p.pos.x,
            p.pos.y,
            p.size,
            if p.kind == ParticleKind::Laser { 20.0 } else { p.size },
            p.opacity.max(0.0),
            p.scale
        )
    }

    fn obstacle_class(o: &FallingObject) -> String {
        if o.is_destroyed() {
            format!("falling-object {} destroyed", o.kind.as_str())
        } else {
            format!("falling-object {}", o.kind.as_str())
        }
    }

    fn obstacle_style(o: &FallingObject, now_ms: f64, removal_ms: f64) -> String {
        format!(
            "left: {:.1}px; top: {:.1}px; transform: translate(-50%, -50%) rotate({:.1}deg) scale({:.2})",
            o.pos.x,
            o.pos.y,
            o.display_rotation(now_ms, removal_ms),
            o.scale(now_ms, removal_ms)
        )
    }

    /// Keep exactly one element per live id, updating class and style
    fn reconcile(
        document: &Document,
        parent: &HtmlElement,
        elements: &mut HashMap<u32, Element>,
        live: impl Iterator<Item = (u32, String, String)>,
    ) {
        let mut seen = HashSet::new();
        for (id, class, style) in live {
            seen.insert(id);
            if !elements.contains_key(&id) {
                let Ok(el) = document.create_element("div") else {
                    continue;
                };
                if parent.append_child(&el).is_err() {
                    continue;
                }
                elements.insert(id, el);
            }
            if let Some(el) = elements.get(&id) {
                if el.class_name() != class {
                    el.set_class_name(&class);
                }
                let _ = el.set_attribute("style", &style);
            }
        }
        elements.retain(|id, el| {
            let keep = seen.contains(id);
            if !keep {
                el.remove();
            }
            keep
        });
    }

    /// Is the event target inside an interactive element?
    fn is_interactive(target: Option<EventTarget>) -> bool {
        target
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest(INTERACTIVE_SELECTOR).ok().flatten())
            .is_some()
    }

    /// Forward a mouse event to the simulation through `map`
    fn listen(
        target: &EventTarget,
        name: &str,
        game: &Rc<RefCell<Game>>,
        map: impl Fn(&MouseEvent) -> Option<InputEvent> + 'static,
    ) {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            if let Some(input) = map(&event) {
                game.borrow_mut().state.handle_input(input);
            }
        });
        let _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?;

        let style = document.create_element("style")?;
        style.set_text_content(Some(CURSOR_CSS));
        body.append_child(&style)?;

        let cursor = document.create_element("div")?;
        cursor.set_class_name("spaceship-cursor");
        let ship = document.create_element("div")?;
        ship.set_class_name("spaceship");
        cursor.append_child(&ship)?;
        body.append_child(&cursor)?;
        body.class_list().add_1(BODY_CLASS)?;

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let state = CursorState::with_tuning(seed, settings.tuning());
        log::info!(
            "Spaceship cursor starting (quality {}, seed {})",
            settings.quality.as_str(),
            seed
        );

        let game = Rc::new(RefCell::new(Game {
            state,
            clock: FrameClock::default(),
            last_time: 0.0,
            document: document.clone(),
            body,
            cursor,
            particles: HashMap::new(),
            obstacles: HashMap::new(),
        }));

        setup_input_handlers(&document, &game);
        setup_teardown(&window, &game);

        request_animation_frame(game);
        Ok(())
    }

    fn setup_input_handlers(document: &Document, game: &Rc<RefCell<Game>>) {
        listen(document, "mousemove", game, |e| {
            Some(InputEvent::PointerMove {
                x: e.client_x() as f32,
                y: e.client_y() as f32,
            })
        });
        listen(document, "mousedown", game, |e| {
            Some(InputEvent::PointerDown {
                x: e.client_x() as f32,
                y: e.client_y() as f32,
            })
        });
        listen(document, "mouseup", game, |_| Some(InputEvent::PointerUp));
        listen(document, "mouseleave", game, |_| Some(InputEvent::PointerLeave));
        listen(document, "mouseenter", game, |_| Some(InputEvent::PointerEnter));

        // Delegated hover so elements added later are covered too
        listen(document, "mouseover", game, |e| {
            is_interactive(e.target()).then_some(InputEvent::HoverStart)
        });
        listen(document, "mouseout", game, |e| {
            (is_interactive(e.target()) && !is_interactive(e.related_target()))
                .then_some(InputEvent::HoverEnd)
        });

        if let Some(wheel) = document.get_element_by_id(DRAG_TARGET_ID) {
            listen(&wheel, "mousedown", game, |_| Some(InputEvent::DragStart));
        }
    }

    fn setup_teardown(window: &web_sys::Window, game: &Rc<RefCell<Game>>) {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().detach();
            log::info!("Spaceship cursor removed");
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
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
        {
            let mut g = game.borrow_mut();
            if !g.state.is_attached() {
                return;
            }
            g.update(time);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

/// Persist a quality preset ("low", "medium", "high"); applies on next load
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_cursor_quality(name: &str) -> bool {
    use spaceship_cursor::{QualityPreset, Settings};

    let Some(preset) = QualityPreset::parse(name) else {
        log::warn!("Unknown cursor quality '{}'", name);
        return false;
    };
    let mut settings = Settings::load();
    settings.quality = preset;
    settings.save();
    log::info!("Cursor quality set to {}", preset.as_str());
    true
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use spaceship_cursor::consts::TICK_MS;
    use spaceship_cursor::sim::{CursorState, DestroyCause, GameEvent, InputEvent, tick};
    use spaceship_cursor::{QualityPreset, Settings};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345u64);
    let seconds = args.next().and_then(|s| s.parse().ok()).unwrap_or(30u32);
    let settings = match args.next() {
        Some(name) => match QualityPreset::parse(&name) {
            Some(preset) => Settings::from_preset(preset),
            None => {
                log::warn!("Unknown quality preset '{}', using stored settings", name);
                Settings::load()
            }
        },
        None => Settings::load(),
    };
    let mut state = CursorState::with_tuning(seed, settings.tuning());
    let (width, height) = (state.viewport.x, state.viewport.y);

    let mut lasers = 0;
    let mut spawned = 0;
    let mut shot_down = 0;
    let mut collided = 0;
    let mut escaped = 0;
    let mut trimmed = 0;
    let mut hits = 0;
    let mut peak_particles = 0;

    log::info!(
        "Headless run: seed {}, {} s, {} quality",
        seed,
        seconds,
        settings.quality.as_str()
    );

    let ticks = seconds.saturating_mul(60);
    for i in 0..ticks {
        // Figure-eight sweep across the lower half of the viewport
        let t = i as f32 * TICK_MS as f32 / 1000.0;
        let x = width * (0.5 + 0.4 * (t * 0.7).sin());
        let y = height * (0.7 + 0.2 * (t * 1.4).sin());
        state.handle_input(InputEvent::PointerMove { x, y });
        if i % 15 == 0 {
            state.handle_input(InputEvent::PointerDown { x, y });
        } else if i % 15 == 2 {
            state.handle_input(InputEvent::PointerUp);
        }

        tick(&mut state, TICK_MS);
        peak_particles = peak_particles.max(state.particle_count());

        for event in state.drain_events() {
            match event {
                GameEvent::LaserFired { .. } => lasers += 1,
                GameEvent::ObstacleSpawned { .. } => spawned += 1,
                GameEvent::ObstacleDestroyed { cause, .. } => match cause {
                    DestroyCause::Laser => shot_down += 1,
                    DestroyCause::Collision => collided += 1,
                },
                GameEvent::ObstacleEscaped { .. } => escaped += 1,
                GameEvent::ObstacleTrimmed { .. } => trimmed += 1,
                GameEvent::PlayerHit { .. } => hits += 1,
                GameEvent::PhaseChanged { phase } => log::debug!("t={:.2}s phase {:?}", t, phase),
            }
        }
    }

    log::info!(
        "Lasers fired: {}, obstacles spawned: {}, shot down: {}, rammed: {}, escaped: {}, trimmed: {}",
        lasers,
        spawned,
        shot_down,
        collided,
        escaped,
        trimmed
    );
    log::info!(
        "Ship hits: {}, peak particles: {} / {}",
        hits,
        peak_particles,
        state.tuning.max_particles
    );

    state.detach();
}
