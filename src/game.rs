//! Top-level driver: owns the round state, the animation tasks and the frame
//! handler slot. The browser glue calls `frame` once per display frame and
//! forwards clicks, resizes and button presses.

use crate::anim::{Celebration, Deferred, Scheduler, Shake, Task, TaskEvent};
use crate::config::{GameConfig, OverlayConfig};
use crate::geometry::Point;
use crate::input::{self, Action};
use crate::render;
use crate::state::GameState;
use crate::surface::{self, Surface};
use rand::SeedableRng;
use rand_pcg::Pcg32;

const OVERLAY_FONT: &str = "bold 36px Arial";
const OVERLAY_PADDING: f64 = 20.0;
const OVERLAY_HEIGHT: f64 = 60.0;
const OVERLAY_RADIUS: f64 = 10.0;
const OVERLAY_BG: &str = "rgba(0, 0, 0, 0.7)";
const OVERLAY_FG: &str = "#ffffff";

/// End-of-round message box drawn on top of the running frame. The box is
/// painted at full strength from its first frame; `opacity` only paces the
/// reset control.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageOverlay {
    pub text: String,
    pub opacity: f64,
    fade_step: f64,
    reset_requested: bool,
}

impl MessageOverlay {
    pub fn new(cfg: &OverlayConfig) -> Self {
        Self { text: cfg.text.clone(), opacity: 0.0, fade_step: cfg.fade_step, reset_requested: false }
    }

    /// Advance the timer; returns true on the single frame the reset control is due.
    fn advance(&mut self) -> bool {
        if self.opacity < 1.0 {
            self.opacity = (self.opacity + self.fade_step).min(1.0);
            return false;
        }
        if self.reset_requested {
            return false;
        }
        self.reset_requested = true;
        true
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let text_w = match surface.text_width(&self.text, OVERLAY_FONT) {
            Ok(w) => w,
            Err(e) => {
                log::warn!("could not measure overlay text: {e}");
                return;
            }
        };
        let box_w = text_w + OVERLAY_PADDING * 2.0;
        let box_x = (surface.width() - box_w) / 2.0;
        let box_y = surface.height() / 4.0;
        surface::report(
            "overlay box",
            surface.rounded_rect(box_x, box_y, box_w, OVERLAY_HEIGHT, OVERLAY_RADIUS, OVERLAY_BG),
        );
        let center = Point::new(surface.width() / 2.0, box_y + OVERLAY_HEIGHT / 2.0);
        surface::report("overlay text", surface.text(&self.text, center, OVERLAY_FONT, OVERLAY_FG));
    }
}

/// The one slot deciding what a display frame does.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameHandler {
    /// Waiting for the start button; frames draw nothing.
    Idle,
    Running,
    /// Running plus the end-of-round message.
    Overlay(MessageOverlay),
}

/// Requests from the game to the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameEvent {
    ShowResetControl,
}

/// Ball image lifecycle. A failed load still lets the game run; ball draws are
/// then skipped by the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetStatus {
    Pending,
    Loaded,
    Failed,
}

pub struct Game {
    config: GameConfig,
    state: GameState,
    scheduler: Scheduler,
    handler: FrameHandler,
    rng: Pcg32,
    asset: AssetStatus,
}

impl Game {
    pub fn new(config: GameConfig, width: f64, height: f64, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = GameState::new(width, height, &config.grid, &mut rng);
        Self {
            config,
            state,
            scheduler: Scheduler::new(),
            handler: FrameHandler::Idle,
            rng,
            asset: AssetStatus::Pending,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn handler(&self) -> &FrameHandler {
        &self.handler
    }

    pub fn overlay(&self) -> Option<&MessageOverlay> {
        match &self.handler {
            FrameHandler::Overlay(o) => Some(o),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.handler, FrameHandler::Idle)
    }

    pub fn asset_status(&self) -> AssetStatus {
        self.asset
    }

    /// Ball image load resolved one way or the other.
    pub fn asset_settled(&self) -> bool {
        self.asset != AssetStatus::Pending
    }

    /// Ball image finished loading; frames start drawing from now on even if
    /// the start button was pressed earlier.
    pub fn set_asset_loaded(&mut self) {
        self.asset = AssetStatus::Loaded;
    }

    /// Ball image could not be loaded. Frames still run; every ball draw is
    /// skipped and logged by the surface.
    pub fn set_asset_failed(&mut self) {
        self.asset = AssetStatus::Failed;
    }

    /// Idle -> Running. Returns false if the game was already started.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.state.game_started = true;
        self.new_round(self.state.width, self.state.height);
        log::info!("game started ({} positions)", self.state.positions.len());
        true
    }

    /// Fresh round after the reset control; never passes through Idle.
    pub fn restart(&mut self) {
        self.state.game_started = true;
        self.new_round(self.state.width, self.state.height);
        log::info!("round reset");
    }

    /// Surface changed size: recenter and regenerate. A round in progress is
    /// replaced, including any overlay.
    pub fn resize(&mut self, width: f64, height: f64) {
        if self.is_running() {
            self.new_round(width, height);
        } else {
            self.state.reset(width, height, &self.config.grid, &mut self.rng);
        }
    }

    fn new_round(&mut self, width: f64, height: f64) {
        self.scheduler.cancel_all();
        self.state.reset(width, height, &self.config.grid, &mut self.rng);
        self.handler = FrameHandler::Running;
    }

    /// Click in surface coordinates.
    pub fn handle_click(&mut self, click: Point) -> Action {
        if !self.is_running() {
            return Action::Ignored;
        }
        let action = input::resolve(&self.state, click, &self.config.input);
        match &action {
            Action::Hit => self.on_hit(),
            Action::NearMissShake(points) => {
                log::debug!("near miss at ({:.1}, {:.1})", click.x, click.y);
                for &p in points {
                    let shake = Shake::new(p, &self.config.shake, self.config.render.marker_radius);
                    // shakes write nothing, scheduling cannot fail
                    let _ = self.scheduler.schedule(Task::Shake(shake));
                }
            }
            Action::Ignored => {}
        }
        action
    }

    fn on_hit(&mut self) {
        log::info!("correct position clicked");
        let st = &mut self.state;
        st.target.visible = true;
        st.show_positions = false;
        st.ball.pos = st.player;

        let burst = Celebration::spawn(st.target.pos, &self.config.particles, &mut self.rng);
        let _ = self.scheduler.schedule(Task::Celebration(burst));
        let (from, to) = (st.player, st.target.pos);
        if let Err(e) = self.scheduler.start_travel(&mut st.ball, from, to, &self.config) {
            log::warn!("kick ignored: {e}");
        }
    }

    /// One display frame: advance tasks, paint the round, then effects and overlay.
    pub fn frame(&mut self, now: f64, surface: &mut dyn Surface) -> Vec<FrameEvent> {
        let mut out = Vec::new();
        if !self.is_running() || !self.asset_settled() {
            return out;
        }

        for event in self.scheduler.tick(now, &mut self.state.ball) {
            match event {
                TaskEvent::TravelFinished => {
                    let delay = Deferred::new(self.config.overlay.delay_ms);
                    let _ = self.scheduler.schedule(Task::Deferred(delay));
                }
                TaskEvent::ShowMessage => {
                    log::info!("showing message: {}", self.config.overlay.text);
                    self.handler = FrameHandler::Overlay(MessageOverlay::new(&self.config.overlay));
                }
            }
        }

        render::draw_game(&self.state, surface, &self.config.render);
        self.scheduler.draw(surface);

        if let FrameHandler::Overlay(overlay) = &mut self.handler {
            overlay.draw(surface);
            if overlay.advance() {
                out.push(FrameEvent::ShowResetControl);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCall, RecordingSurface};

    fn running_game() -> (Game, RecordingSurface) {
        let mut g = Game::new(GameConfig::default(), 800.0, 600.0, 11);
        g.set_asset_loaded();
        assert!(g.start());
        (g, RecordingSurface::new(800.0, 600.0))
    }

    #[test]
    fn idle_frames_draw_nothing() {
        let mut g = Game::new(GameConfig::default(), 800.0, 600.0, 1);
        g.set_asset_loaded();
        let mut s = RecordingSurface::new(800.0, 600.0);
        assert!(g.frame(0.0, &mut s).is_empty());
        assert!(s.calls.is_empty());
        assert_eq!(g.handle_click(g.state().target.pos), Action::Ignored);
    }

    #[test]
    fn start_is_one_shot() {
        let (mut g, _) = running_game();
        assert!(g.state().game_started);
        assert!(!g.start());
        assert_eq!(g.handler(), &FrameHandler::Running);
    }

    #[test]
    fn frames_wait_for_ball_asset() {
        let mut g = Game::new(GameConfig::default(), 800.0, 600.0, 1);
        g.start();
        let mut s = RecordingSurface::new(800.0, 600.0);
        g.frame(0.0, &mut s);
        assert!(s.calls.is_empty());
        g.set_asset_loaded();
        g.frame(16.0, &mut s);
        assert_eq!(s.balls().count(), 1);
    }

    #[test]
    fn failed_ball_asset_still_runs_the_round() {
        let mut g = Game::new(GameConfig::default(), 800.0, 600.0, 3);
        g.start();
        g.set_asset_failed();
        assert!(g.asset_settled());
        let mut s = RecordingSurface::new(800.0, 600.0);
        s.ball_ready = false;
        g.frame(0.0, &mut s);
        assert!(s.calls.iter().any(|c| matches!(c, DrawCall::Line { .. })));
        assert_eq!(s.balls().count(), 0);

        // a hit still plays out through to the message and reset control
        assert_eq!(g.handle_click(g.state().target.pos), Action::Hit);
        let mut events = Vec::new();
        for i in 1..400 {
            events.extend(g.frame(i as f64 * 16.0, &mut s));
        }
        assert!(g.overlay().is_some());
        assert_eq!(events, vec![FrameEvent::ShowResetControl]);
        assert_eq!(s.balls().count(), 0);
    }

    #[test]
    fn near_miss_shakes_without_touching_state() {
        let (mut g, _) = running_game();
        let target = g.state().target.pos;
        let other = *g
            .state()
            .positions
            .iter()
            .find(|p| p.distance(target) > 100.0)
            .unwrap();
        let before = g.state().clone();
        let action = g.handle_click(Point::new(other.x + 5.0, other.y));
        assert_eq!(action, Action::NearMissShake(vec![other]));
        assert_eq!(g.scheduler().len(), 1);
        assert_eq!(g.state().target, before.target);
        assert_eq!(g.state().ball, before.ball);
        assert!(g.state().show_positions);
    }

    #[test]
    fn overlay_timer_requests_reset_once() {
        let mut o = MessageOverlay::new(&OverlayConfig::default());
        let mut requests = 0;
        for _ in 0..40 {
            if o.advance() {
                requests += 1;
            }
        }
        assert_eq!(o.opacity, 1.0);
        assert_eq!(requests, 1);
    }

    #[test]
    fn overlay_box_is_centered_at_quarter_height() {
        let o = MessageOverlay::new(&OverlayConfig::default());
        let mut s = RecordingSurface::new(800.0, 600.0);
        o.draw(&mut s);
        // "NICE HIT!" is 9 chars -> 180px in the recording surface
        assert_eq!(
            s.calls[0],
            DrawCall::RoundedRect {
                x: 290.0,
                y: 150.0,
                w: 220.0,
                h: 60.0,
                radius: 10.0,
                fill: "rgba(0, 0, 0, 0.7)".into(),
            }
        );
        assert_eq!(s.texts().collect::<Vec<_>>(), vec!["NICE HIT!"]);
        assert!(matches!(&s.calls[1], DrawCall::Text { color, .. } if color == "#ffffff"));
    }

    #[test]
    fn first_overlay_frame_paints_full_strength_box() {
        let (mut g, mut s) = running_game();
        g.handle_click(g.state().target.pos);
        let mut now = 0.0;
        while g.overlay().is_none() {
            s.take();
            g.frame(now, &mut s);
            now += 16.0;
            assert!(now < 10_000.0, "message never shown");
        }
        let calls = s.take();
        assert!(calls.iter().any(|c| matches!(
            c,
            DrawCall::RoundedRect { fill, .. } if fill == "rgba(0, 0, 0, 0.7)"
        )));
        assert!(calls.iter().any(|c| matches!(
            c,
            DrawCall::Text { text, color, .. } if text == "NICE HIT!" && color == "#ffffff"
        )));
    }

    #[test]
    fn restart_cancels_pending_message() {
        let (mut g, mut s) = running_game();
        g.handle_click(g.state().target.pos);
        // run until the ball has landed and the delay is armed
        let mut now = 0.0;
        while g.state().ball.moving {
            g.frame(now, &mut s);
            now += 16.0;
        }
        g.frame(now, &mut s);
        assert!(g.scheduler().tasks().iter().any(|t| matches!(t, Task::Deferred(_))));
        g.restart();
        assert!(g.scheduler().is_empty());
        for i in 0..200 {
            g.frame(now + i as f64 * 16.0, &mut s);
        }
        assert_eq!(g.handler(), &FrameHandler::Running);
    }
}
