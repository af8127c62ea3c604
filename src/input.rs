// --- Pointer input ------------------------------------------------------------

use crate::config::InputConfig;
use crate::geometry::Point;
use crate::state::GameState;

/// What a click on the surface means for the current round.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Hit,
    /// Grid positions within the near-miss radius; one shake each, duplicates kept.
    NearMissShake(Vec<Point>),
    Ignored,
}

/// On-page rectangle occupied by the canvas (client pixels).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Map client coordinates to surface pixels, correcting for CSS scaling of the canvas.
pub fn to_surface_coords(
    client_x: f64,
    client_y: f64,
    rect: ClientRect,
    surface_width: f64,
    surface_height: f64,
) -> Point {
    let sx = if rect.width > 0.0 { surface_width / rect.width } else { 1.0 };
    let sy = if rect.height > 0.0 { surface_height / rect.height } else { 1.0 };
    Point::new((client_x - rect.left) * sx, (client_y - rect.top) * sy)
}

pub fn resolve(state: &GameState, click: Point, cfg: &InputConfig) -> Action {
    if !state.show_positions {
        return Action::Ignored;
    }
    if click.distance(state.target.pos) < cfg.hit_radius {
        return Action::Hit;
    }
    let near: Vec<Point> = state
        .positions
        .iter()
        .copied()
        .filter(|p| click.distance(*p) < cfg.near_miss_radius)
        .collect();
    if near.is_empty() { Action::Ignored } else { Action::NearMissShake(near) }
}
