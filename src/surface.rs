//! Drawing-surface capability used by the renderer, animation tasks and overlay.
//!
//! The browser build implements this on a `CanvasRenderingContext2d` (see
//! `web::CanvasSurface`). `RecordingSurface` keeps a list of draw calls instead,
//! which is what the host tests inspect.

use crate::geometry::Point;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SurfaceError {
    #[error("ball image not loaded yet")]
    AssetNotReady,
    #[error("canvas call failed: {0}")]
    Canvas(String),
}

pub type SurfaceResult<T = ()> = Result<T, SurfaceError>;

pub trait Surface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn clear(&mut self) -> SurfaceResult;
    fn line(&mut self, from: Point, to: Point, stroke: &str) -> SurfaceResult;
    fn circle(&mut self, center: Point, radius: f64, fill: &str, stroke: Option<&str>) -> SurfaceResult;
    /// Text centered on `at` (both axes).
    fn text(&mut self, text: &str, at: Point, font: &str, color: &str) -> SurfaceResult;
    fn text_width(&mut self, text: &str, font: &str) -> SurfaceResult<f64>;
    fn rounded_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64, fill: &str) -> SurfaceResult;
    /// Ball image with its top-left corner at `(x, y)`.
    fn ball(&mut self, x: f64, y: f64, size: f64, alpha: f64) -> SurfaceResult;
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Clear,
    Line { from: Point, to: Point, stroke: String },
    Circle { center: Point, radius: f64, fill: String, stroke: Option<String> },
    Text { text: String, at: Point, font: String, color: String },
    RoundedRect { x: f64, y: f64, w: f64, h: f64, radius: f64, fill: String },
    Ball { x: f64, y: f64, size: f64, alpha: f64 },
}

/// Headless surface that records every call. Text width is estimated from the
/// character count so overlay layout is deterministic.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    pub width: f64,
    pub height: f64,
    pub calls: Vec<DrawCall>,
    /// When false, `ball` fails with `AssetNotReady` like an unloaded image.
    pub ball_ready: bool,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, calls: Vec::new(), ball_ready: true }
    }

    pub fn take(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn balls(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(|c| matches!(c, DrawCall::Ball { .. }))
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f64 {
        self.width
    }
    fn height(&self) -> f64 {
        self.height
    }
    fn clear(&mut self) -> SurfaceResult {
        self.calls.push(DrawCall::Clear);
        Ok(())
    }
    fn line(&mut self, from: Point, to: Point, stroke: &str) -> SurfaceResult {
        self.calls.push(DrawCall::Line { from, to, stroke: stroke.to_string() });
        Ok(())
    }
    fn circle(&mut self, center: Point, radius: f64, fill: &str, stroke: Option<&str>) -> SurfaceResult {
        self.calls.push(DrawCall::Circle {
            center,
            radius,
            fill: fill.to_string(),
            stroke: stroke.map(str::to_string),
        });
        Ok(())
    }
    fn text(&mut self, text: &str, at: Point, font: &str, color: &str) -> SurfaceResult {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            at,
            font: font.to_string(),
            color: color.to_string(),
        });
        Ok(())
    }
    fn text_width(&mut self, text: &str, _font: &str) -> SurfaceResult<f64> {
        Ok(text.chars().count() as f64 * 20.0)
    }
    fn rounded_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64, fill: &str) -> SurfaceResult {
        self.calls.push(DrawCall::RoundedRect { x, y, w, h, radius, fill: fill.to_string() });
        Ok(())
    }
    fn ball(&mut self, x: f64, y: f64, size: f64, alpha: f64) -> SurfaceResult {
        if !self.ball_ready {
            return Err(SurfaceError::AssetNotReady);
        }
        self.calls.push(DrawCall::Ball { x, y, size, alpha });
        Ok(())
    }
}

/// Log a failed draw call and carry on with the frame.
pub(crate) fn report(what: &str, result: SurfaceResult) {
    match result {
        Ok(()) => {}
        Err(SurfaceError::AssetNotReady) => log::debug!("skipped {what}: ball image not ready"),
        Err(e) => log::warn!("error drawing {what}: {e}"),
    }
}
