//! Round state: player, hidden teammate, ball, and the clickable position grid.
//!
//! `GameState` is owned by `Game`; the renderer borrows it immutably and animation
//! tasks only ever see the fields they are handed (see `anim`).

use crate::config::GridConfig;
use crate::geometry::{self, Point};
use rand::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Target {
    pub pos: Point,
    pub visible: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ball {
    pub pos: Point,
    pub moving: bool,
}

#[derive(Clone, Debug, Default)]
pub struct GameState {
    pub width: f64,
    pub height: f64,
    pub player: Point,
    pub target: Target,
    pub ball: Ball,
    pub positions: Vec<Point>,
    /// Grid is drawn and clickable.
    pub show_positions: bool,
    pub game_started: bool,
    pub(crate) target_index: usize,
}

impl GameState {
    /// Fresh round for a `width` x `height` surface.
    pub fn new<R: Rng + ?Sized>(width: f64, height: f64, grid: &GridConfig, rng: &mut R) -> Self {
        let mut state = GameState::default();
        state.reset(width, height, grid, rng);
        state
    }

    /// Replace every round field. `game_started` is the only value carried over.
    pub fn reset<R: Rng + ?Sized>(&mut self, width: f64, height: f64, grid: &GridConfig, rng: &mut R) {
        let player = Point::new(width / 2.0, height / 2.0);
        *self = GameState {
            width,
            height,
            player,
            target: Target::default(),
            ball: Ball { pos: player, moving: false },
            positions: geometry::grid_for_surface(width, height, grid),
            show_positions: true,
            game_started: self.game_started,
            target_index: 0,
        };
        self.pick_target(rng);
    }

    /// Move the hidden teammate to a uniformly random grid position.
    pub fn pick_target<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.positions.is_empty() {
            return;
        }
        self.target_index = rng.random_range(0..self.positions.len());
        self.target.pos = self.positions[self.target_index];
        log::debug!(
            "teammate position set to ({:.1}, {:.1})",
            self.target.pos.x,
            self.target.pos.y
        );
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// Where the resting ball sits: in front of the teammate once revealed.
    pub fn ball_anchor(&self) -> Point {
        if self.target.visible { self.target.pos } else { self.player }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn reset_builds_a_clean_round() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut st = GameState::new(800.0, 600.0, &GridConfig::default(), &mut rng);
        st.game_started = true;
        st.target.visible = true;
        st.ball.moving = true;
        st.show_positions = false;

        st.reset(1024.0, 768.0, &GridConfig::default(), &mut rng);
        assert_eq!(st.player, Point::new(512.0, 384.0));
        assert_eq!(st.ball.pos, st.player);
        assert!(!st.ball.moving);
        assert!(!st.target.visible);
        assert!(st.show_positions);
        assert!(st.game_started);
        assert_eq!(st.positions.len(), 80);
        assert_eq!(st.positions[st.target_index()], st.target.pos);
    }

    #[test]
    fn ball_anchor_follows_target_visibility() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut st = GameState::new(800.0, 600.0, &GridConfig::default(), &mut rng);
        assert_eq!(st.ball_anchor(), st.player);
        st.target.visible = true;
        assert_eq!(st.ball_anchor(), st.target.pos);
    }
}
