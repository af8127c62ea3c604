// Integration tests (native) for the `kick-target` crate.
// These tests avoid wasm-specific functionality and drive `Game` through a
// `RecordingSurface` so they can run under `cargo test` on the host.

use kick_target::anim::Task;
use kick_target::surface::{DrawCall, RecordingSurface};
use kick_target::{Action, FrameEvent, FrameHandler, Game, GameConfig, Point};

const FRAME_MS: f64 = 1000.0 / 60.0;

fn started_game(seed: u64) -> (Game, RecordingSurface) {
    let mut game = Game::new(GameConfig::default(), 800.0, 600.0, seed);
    game.set_asset_loaded();
    assert!(game.start());
    (game, RecordingSurface::new(800.0, 600.0))
}

#[test]
fn full_round_from_click_to_reset_control() {
    let (mut game, mut surface) = started_game(2024);
    let state = game.state();
    assert_eq!(state.positions.len(), 80);
    assert_eq!(state.player, Point::new(400.0, 300.0));
    let target = state.target.pos;

    // click slightly off the exact spot, still inside the hit radius
    let action = game.handle_click(Point::new(target.x + 30.0, target.y - 20.0));
    assert_eq!(action, Action::Hit);
    assert!(game.state().target.visible);
    assert!(!game.state().show_positions);
    assert_eq!(game.state().ball.pos, Point::new(400.0, 300.0));
    assert!(game.state().ball.moving);

    let celebration = game
        .scheduler()
        .tasks()
        .iter()
        .find_map(|t| match t {
            Task::Celebration(c) => Some(c),
            _ => None,
        })
        .expect("celebration scheduled");
    assert_eq!(celebration.particles().len(), 50);

    // further clicks are ignored once the grid is hidden
    assert_eq!(game.handle_click(target), Action::Ignored);

    // first frame: grid hidden, teammate footprints shown, particles burst
    game.frame(0.0, &mut surface);
    let calls = surface.take();
    assert!(!calls.iter().any(|c| matches!(c, DrawCall::Line { .. })));
    assert_eq!(calls.iter().filter(|c| matches!(c, DrawCall::Text { .. })).count(), 2);
    assert_eq!(calls.iter().filter(|c| matches!(c, DrawCall::Circle { .. })).count(), 50);

    let mut now = 0.0;
    let mut landed_at = None;
    let mut message_at = None;
    let mut reset_events = 0;
    for _ in 0..600 {
        now += FRAME_MS;
        let events = game.frame(now, &mut surface);
        if landed_at.is_none() && !game.state().ball.moving {
            landed_at = Some(now);
            assert_eq!(game.state().ball.pos, target);
        }
        if message_at.is_none() && game.overlay().is_some() {
            message_at = Some(now);
        }
        reset_events += events.iter().filter(|e| **e == FrameEvent::ShowResetControl).count();
        surface.calls.clear();
    }

    let landed_at = landed_at.expect("ball landed");
    let message_at = message_at.expect("message shown");
    assert!(message_at - landed_at >= 1000.0, "message {message_at} landed {landed_at}");
    assert!(message_at - landed_at < 1000.0 + 3.0 * FRAME_MS);
    assert_eq!(reset_events, 1);
    assert_eq!(game.overlay().map(|o| o.opacity), Some(1.0));

    // overlay keeps drawing on top of the normal frame
    game.frame(now + FRAME_MS, &mut surface);
    assert!(surface.texts().any(|t| t == "NICE HIT!"));
    assert!(matches!(surface.calls[0], DrawCall::Clear));
}

#[test]
fn reset_twice_gives_independent_clean_rounds() {
    let (mut game, mut surface) = started_game(99);
    let target = game.state().target.pos;
    game.handle_click(target);
    for i in 0..30 {
        game.frame(i as f64 * FRAME_MS, &mut surface);
    }
    // travel and confetti still in flight
    assert!(!game.scheduler().is_empty());

    game.restart();
    assert!(game.scheduler().is_empty());
    let first_grid = game.state().positions.clone();
    game.restart();
    let st = game.state();
    assert_eq!(st.positions, first_grid);
    assert!(!st.ball.moving);
    assert!(!st.target.visible);
    assert!(st.show_positions);
    assert_eq!(st.ball.pos, st.player);
    assert!(st.positions.contains(&st.target.pos));
    assert!(game.scheduler().is_empty());
    assert_eq!(game.handler(), &FrameHandler::Running);

    surface.calls.clear();
    game.frame(10_000.0, &mut surface);
    // grid is back: 80 lines and 80 markers, no particles
    let lines = surface.calls.iter().filter(|c| matches!(c, DrawCall::Line { .. })).count();
    let circles = surface.calls.iter().filter(|c| matches!(c, DrawCall::Circle { .. })).count();
    assert_eq!(lines, 80);
    assert_eq!(circles, 80);
}

#[test]
fn resize_recenters_and_drops_overlay() {
    let (mut game, mut surface) = started_game(5);
    game.handle_click(game.state().target.pos);
    let mut now = 0.0;
    while game.overlay().is_none() {
        now += FRAME_MS;
        game.frame(now, &mut surface);
        assert!(now < 10_000.0);
    }
    game.resize(1200.0, 900.0);
    assert_eq!(game.state().player, Point::new(600.0, 450.0));
    assert_eq!(game.handler(), &FrameHandler::Running);
    assert!(game.state().show_positions);
    let max_r = game
        .state()
        .positions
        .iter()
        .map(|p| p.distance(game.state().player))
        .fold(0.0, f64::max);
    assert!((max_r - 450.0).abs() < 1e-9);
}

#[test]
fn custom_config_changes_grid_and_message() {
    let cfg = GameConfig::from_json(r#"{"grid":{"layers":2},"overlay":{"text":"GOAL!","delay_ms":0}}"#)
        .unwrap();
    let mut game = Game::new(cfg, 800.0, 600.0, 8);
    game.set_asset_loaded();
    game.start();
    assert_eq!(game.state().positions.len(), 24);
    game.handle_click(game.state().target.pos);
    let mut surface = RecordingSurface::new(800.0, 600.0);
    let mut now = 0.0;
    while game.overlay().is_none() {
        now += FRAME_MS;
        game.frame(now, &mut surface);
        assert!(now < 10_000.0);
    }
    assert_eq!(game.overlay().map(|o| o.text.as_str()), Some("GOAL!"));
}
