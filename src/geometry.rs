// --- Points & Position Grid ---------------------------------------------------

use crate::config::GridConfig;
use serde::{Deserialize, Serialize};

/// 2D coordinate in surface pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation towards `to`; `t = 0` is `self`, `t = 1` is `to`.
    pub fn lerp(&self, to: Point, t: f64) -> Point {
        Point::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

/// Ring spacing that keeps the outermost ring of a 3-layer grid on screen.
pub fn base_radius(width: f64, height: f64, divisor: f64) -> f64 {
    width.min(height) / divisor
}

/// Concentric rings around `(center_x, center_y)`. Ring `layer` (1-based) has
/// `layer * 8` points spaced evenly by angle, starting at angle 0.
pub fn generate(center_x: f64, center_y: f64, base_radius: f64, layer_count: u32) -> Vec<Point> {
    let total = 4 * layer_count as usize * (layer_count as usize + 1);
    let mut points = Vec::with_capacity(total);
    for layer in 1..=layer_count {
        let radius = layer as f64 * base_radius;
        let count = layer * 8;
        for i in 0..count {
            let angle = std::f64::consts::TAU * i as f64 / count as f64;
            points.push(Point::new(
                center_x + angle.cos() * radius,
                center_y + angle.sin() * radius,
            ));
        }
    }
    points
}

/// Grid centered on a `width` x `height` surface.
pub fn grid_for_surface(width: f64, height: f64, cfg: &GridConfig) -> Vec<Point> {
    generate(
        width / 2.0,
        height / 2.0,
        base_radius(width, height, cfg.radius_divisor),
        cfg.layers,
    )
}
