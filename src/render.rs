//! Per-frame painting of the round. Reads `GameState`, never writes it.

use crate::config::RenderConfig;
use crate::geometry::Point;
use crate::state::GameState;
use crate::surface::{self, Surface};

const GRID_LINE: &str = "rgba(255, 255, 255, 0.2)";
const MARKER_FILL: &str = "rgba(255, 255, 255, 0.4)";
const MARKER_STROKE: &str = "rgba(255, 255, 255, 0.6)";
const PLAYER_COLOR: &str = "#ffffff";
const TEAMMATE_COLOR: &str = "#000000";

pub fn draw_game(state: &GameState, surface: &mut dyn Surface, cfg: &RenderConfig) {
    surface::report("clear", surface.clear());

    if state.show_positions {
        for &pos in &state.positions {
            surface::report("grid line", surface.line(state.player, pos, GRID_LINE));
            surface::report(
                "grid marker",
                surface.circle(pos, cfg.marker_radius, MARKER_FILL, Some(MARKER_STROKE)),
            );
        }
    }

    draw_footprints(surface, state.player, PLAYER_COLOR, cfg);
    if state.target.visible {
        draw_footprints(surface, state.target.pos, TEAMMATE_COLOR, cfg);
    }

    if state.ball.moving {
        // Trail fades back towards the player
        let n = cfg.trail_len;
        for i in 0..n {
            let frac = i as f64 / n as f64;
            let alpha = 0.3 * (1.0 - frac);
            let at = state.ball.pos.lerp(state.player, frac);
            draw_ball(surface, at, alpha, cfg);
        }
        draw_ball(surface, state.ball.pos, 1.0, cfg);
    } else {
        draw_ball(surface, state.ball_anchor(), 1.0, cfg);
    }
}

fn draw_footprints(surface: &mut dyn Surface, at: Point, color: &str, cfg: &RenderConfig) {
    surface::report(
        "footprints",
        surface.text(&cfg.footprint_glyph, at, &cfg.footprint_font, color),
    );
}

/// Ball centered horizontally on `at`, lifted so it sits just ahead of the foot.
fn draw_ball(surface: &mut dyn Surface, at: Point, alpha: f64, cfg: &RenderConfig) {
    surface::report(
        "ball",
        surface.ball(at.x - cfg.ball_size / 2.0, at.y - cfg.ball_lift, cfg.ball_size, alpha),
    );
}
