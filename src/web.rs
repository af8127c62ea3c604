//! Browser glue: canvas surface, ball image, start/reset buttons, pointer and
//! resize listeners, and the `requestAnimationFrame` loop driving `Game::frame`.

use crate::config::GameConfig;
use crate::game::{AssetStatus, FrameEvent, Game};
use crate::geometry::Point;
use crate::input::{self, Action, ClientRect};
use crate::surface::{Surface, SurfaceError, SurfaceResult};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlButtonElement, HtmlCanvasElement, HtmlImageElement,
    Window, window,
};

fn canvas_err(e: JsValue) -> SurfaceError {
    SurfaceError::Canvas(format!("{e:?}"))
}

// --- Canvas surface ---------------------------------------------------------

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    ball_image: HtmlImageElement,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ball_image: HtmlImageElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;
        Ok(Self { canvas, ctx, ball_image })
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> f64 {
        self.canvas.width() as f64
    }

    fn height(&self) -> f64 {
        self.canvas.height() as f64
    }

    fn clear(&mut self) -> SurfaceResult {
        self.ctx.clear_rect(0.0, 0.0, self.width(), self.height());
        Ok(())
    }

    fn line(&mut self, from: Point, to: Point, stroke: &str) -> SurfaceResult {
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.set_stroke_style_str(stroke);
        self.ctx.stroke();
        Ok(())
    }

    fn circle(&mut self, center: Point, radius: f64, fill: &str, stroke: Option<&str>) -> SurfaceResult {
        self.ctx.begin_path();
        self.ctx
            .arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU)
            .map_err(canvas_err)?;
        self.ctx.set_fill_style_str(fill);
        self.ctx.fill();
        if let Some(stroke) = stroke {
            self.ctx.set_stroke_style_str(stroke);
            self.ctx.stroke();
        }
        Ok(())
    }

    fn text(&mut self, text: &str, at: Point, font: &str, color: &str) -> SurfaceResult {
        self.ctx.save();
        self.ctx.set_font(font);
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(color);
        let res = self.ctx.fill_text(text, at.x, at.y).map_err(canvas_err);
        self.ctx.restore();
        res
    }

    fn text_width(&mut self, text: &str, font: &str) -> SurfaceResult<f64> {
        self.ctx.save();
        self.ctx.set_font(font);
        let res = self.ctx.measure_text(text).map(|m| m.width()).map_err(canvas_err);
        self.ctx.restore();
        res
    }

    fn rounded_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64, fill: &str) -> SurfaceResult {
        let r = radius.min(w / 2.0).min(h / 2.0);
        self.ctx.begin_path();
        self.ctx.move_to(x + r, y);
        self.ctx.arc_to(x + w, y, x + w, y + h, r).map_err(canvas_err)?;
        self.ctx.arc_to(x + w, y + h, x, y + h, r).map_err(canvas_err)?;
        self.ctx.arc_to(x, y + h, x, y, r).map_err(canvas_err)?;
        self.ctx.arc_to(x, y, x + w, y, r).map_err(canvas_err)?;
        self.ctx.close_path();
        self.ctx.set_fill_style_str(fill);
        self.ctx.fill();
        Ok(())
    }

    fn ball(&mut self, x: f64, y: f64, size: f64, alpha: f64) -> SurfaceResult {
        if !self.ball_image.complete() || self.ball_image.natural_width() == 0 {
            return Err(SurfaceError::AssetNotReady);
        }
        self.ctx.save();
        self.ctx.set_global_alpha(alpha);
        let res = self
            .ctx
            .draw_image_with_html_image_element_and_dw_and_dh(&self.ball_image, x, y, size, size)
            .map_err(canvas_err);
        self.ctx.restore();
        res
    }
}

// --- App state --------------------------------------------------------------

struct App {
    game: Game,
    surface: CanvasSurface,
    canvas: HtmlCanvasElement,
    start_button: Option<HtmlButtonElement>,
    reset_button: Option<HtmlButtonElement>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
    static LOOP_STARTED: Cell<bool> = const { Cell::new(false) };
}

fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn seed_from_clock(win: &Window) -> u64 {
    win.performance()
        .map(|p| ((p.time_origin() + p.now()) * 1_000.0) as u64)
        .unwrap_or(0x5eed)
}

/// Match the canvas backing store to the viewport. Returns the new size.
fn fit_canvas(win: &Window, canvas: &HtmlCanvasElement) -> Result<(f64, f64), JsValue> {
    let w = win.inner_width()?.as_f64().unwrap_or(800.0);
    let h = win.inner_height()?.as_f64().unwrap_or(600.0);
    canvas.set_attribute("style", &format!("width:{w}px; height:{h}px; display:block;"))?;
    canvas.set_width(w as u32);
    canvas.set_height(h as u32);
    Ok((w, h))
}

// --- Entry points -----------------------------------------------------------

pub fn start(config: GameConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas: HtmlCanvasElement = doc
        .get_element_by_id(&config.dom.canvas_id)
        .ok_or_else(|| JsValue::from_str("canvas element not found"))?
        .dyn_into()?;
    let (w, h) = fit_canvas(&win, &canvas)?;

    let ball_image = HtmlImageElement::new()?;
    let surface = CanvasSurface::new(canvas.clone(), ball_image.clone())?;

    let start_button: Option<HtmlButtonElement> = match doc.get_element_by_id(&config.dom.start_button_id) {
        Some(el) => Some(el.dyn_into()?),
        None => {
            log::warn!("start button #{} not found", config.dom.start_button_id);
            None
        }
    };
    if let Some(btn) = &start_button {
        btn.set_disabled(true);
    }

    let ball_src = config.dom.ball_src.clone();
    let game = Game::new(config, w, h, seed_from_clock(&win));
    APP.with(|cell| {
        cell.replace(Some(App {
            game,
            surface,
            canvas: canvas.clone(),
            start_button: start_button.clone(),
            reset_button: None,
        }))
    });

    install_asset_handlers(&ball_image)?;
    ball_image.set_src(&ball_src);
    if ball_image.complete() && ball_image.natural_width() > 0 {
        on_asset_loaded();
    }

    if let Some(btn) = &start_button {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            log::info!("start button clicked");
            let started = with_app(|app| {
                if let Some(btn) = &app.start_button {
                    btn.set_attribute("style", "display:none").ok();
                }
                app.game.start()
            });
            if started == Some(true) {
                start_frame_loop();
            }
        }) as Box<dyn FnMut(_)>);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            with_app(|app| {
                let rect = app.canvas.get_bounding_client_rect();
                let click = input::to_surface_coords(
                    evt.client_x() as f64,
                    evt.client_y() as f64,
                    ClientRect {
                        left: rect.left(),
                        top: rect.top(),
                        width: rect.width(),
                        height: rect.height(),
                    },
                    app.surface.width(),
                    app.surface.height(),
                );
                if let Action::Hit = app.game.handle_click(click) {
                    log::debug!("hit at ({:.1}, {:.1})", click.x, click.y);
                }
            });
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move || {
            let Some(win) = window() else { return };
            with_app(|app| match fit_canvas(&win, &app.canvas) {
                Ok((w, h)) => {
                    app.game.resize(w, h);
                    remove_reset_button(app);
                }
                Err(e) => log::warn!("resize failed: {e:?}"),
            });
        }) as Box<dyn FnMut()>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    log::info!("game initialized ({w}x{h})");
    Ok(())
}

fn install_asset_handlers(image: &HtmlImageElement) -> Result<(), JsValue> {
    let onload = Closure::wrap(Box::new(on_asset_loaded) as Box<dyn FnMut()>);
    image.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();

    let onerror = Closure::wrap(Box::new(on_asset_failed) as Box<dyn FnMut()>);
    image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();
    Ok(())
}

fn on_asset_loaded() {
    settle_asset(AssetStatus::Loaded);
}

fn on_asset_failed() {
    log::error!("failed to load ball image; ball will not be drawn");
    settle_asset(AssetStatus::Failed);
}

/// Record the image outcome, enable the start button, and kick the loop if the
/// game was started while the image was still pending.
fn settle_asset(status: AssetStatus) {
    let running = with_app(|app| {
        if app.game.asset_settled() {
            return false;
        }
        match status {
            AssetStatus::Loaded => {
                log::info!("ball image loaded");
                app.game.set_asset_loaded();
            }
            _ => app.game.set_asset_failed(),
        }
        if let Some(btn) = &app.start_button {
            btn.set_disabled(false);
        }
        app.game.is_running()
    });
    if running == Some(true) {
        start_frame_loop();
    }
}

// --- Reset control ----------------------------------------------------------

fn show_reset_button(app: &mut App, doc: &Document) -> Result<(), JsValue> {
    if app.reset_button.is_some() {
        return Ok(());
    }
    let button: HtmlButtonElement = doc.create_element("button")?.dyn_into()?;
    button.set_text_content(Some(&app.game.config().overlay.reset_label));
    let top = app.surface.height() / 4.0 + 80.0;
    button.set_attribute(
        "style",
        &format!(
            "position:fixed; top:{top}px; left:50%; transform:translateX(-50%); padding:10px 30px; font-size:18px; background:#4CAF50; color:white; border:none; border-radius:5px; cursor:pointer; z-index:100;"
        ),
    )?;
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        with_app(|app| {
            app.game.restart();
            remove_reset_button(app);
        });
    }) as Box<dyn FnMut(_)>);
    button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();

    doc.body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&button)?;
    app.reset_button = Some(button);
    Ok(())
}

fn remove_reset_button(app: &mut App) {
    if let Some(button) = app.reset_button.take() {
        button.remove();
    }
}

// --- Frame loop -------------------------------------------------------------

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    if LOOP_STARTED.with(|s| s.replace(true)) {
        return;
    }
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        with_app(|app| {
            for event in app.game.frame(ts, &mut app.surface) {
                match event {
                    FrameEvent::ShowResetControl => {
                        let Some(doc) = window().and_then(|w| w.document()) else { continue };
                        if let Err(e) = show_reset_button(app, &doc) {
                            log::error!("could not create reset button: {e:?}");
                        }
                    }
                }
            }
        });
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
    log::debug!("frame loop started at {:.0}ms", now_ms());
}

fn request_frame(cb: &FrameCallback) {
    let Some(w) = window() else { return };
    if let Some(closure) = cb.borrow().as_ref() {
        if let Err(e) = w.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {e:?}");
        }
    }
}
