//! Frame-stepped animation tasks: ball travel, celebration burst, near-miss shake,
//! and the deferred end-of-round message.
//!
//! Each task advances once per display frame until its own stop condition holds.
//! Tasks never see `GameState` as a whole: the step function of each kind takes
//! exactly the fields it may touch, and `Task::access` names that contract so the
//! scheduler can refuse two writers of the same field.

use crate::config::{GameConfig, ParticleConfig, ShakeConfig};
use crate::geometry::Point;
use crate::state::Ball;
use crate::surface::{self, Surface};
use rand::Rng;
use thiserror::Error;

/// State fields a task writes while it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Draws only; owns all of its data.
    None,
    /// Writes `GameState::ball`.
    Ball,
}

/// Notifications surfaced to the game when a task finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskEvent {
    TravelFinished,
    ShowMessage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Done(Option<TaskEvent>),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("a task writing {0:?} is already running")]
    Busy(Access),
}

// --- Ball travel ------------------------------------------------------------

/// Eased flight of the ball from the player to the teammate.
#[derive(Clone, Debug)]
pub struct BallTravel {
    from: Point,
    to: Point,
    progress: f64,
    step: f64,
}

/// Cubic ease-out: fast start, gentle landing.
pub fn ease_out_cubic(p: f64) -> f64 {
    1.0 - (1.0 - p).powi(3)
}

impl BallTravel {
    pub fn new(from: Point, to: Point, step: f64) -> Self {
        Self { from, to, progress: 0.0, step }
    }

    fn step(&mut self, ball: &mut Ball) -> Step {
        self.progress += self.step;
        if self.progress >= 1.0 {
            // snap: accumulated steps may overshoot or undershoot by an ulp
            ball.pos = self.to;
            ball.moving = false;
            return Step::Done(Some(TaskEvent::TravelFinished));
        }
        ball.pos = self.from.lerp(self.to, ease_out_cubic(self.progress));
        ball.moving = true;
        Step::Continue
    }
}

// --- Celebration ------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Point,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub color: String,
    pub life: f64,
}

impl Particle {
    /// `#RRGGBB` plus an alpha byte scaled by remaining life.
    pub fn fill(&self) -> String {
        let alpha = (self.life.clamp(0.0, 1.0) * 255.0).floor() as u8;
        format!("{}{:02x}", self.color, alpha)
    }
}

/// Confetti burst at the teammate's position.
#[derive(Clone, Debug)]
pub struct Celebration {
    particles: Vec<Particle>,
    gravity: f64,
    decay: f64,
}

impl Celebration {
    pub fn spawn<R: Rng + ?Sized>(at: Point, cfg: &ParticleConfig, rng: &mut R) -> Self {
        let particles = (0..cfg.count)
            .map(|_| {
                let vx = (rng.random::<f64>() - 0.5) * 10.0;
                let vy = (rng.random::<f64>() - 4.0) * 5.0;
                let color = cfg.palette[rng.random_range(0..cfg.palette.len())].clone();
                let size = rng.random::<f64>() * 8.0 + 4.0;
                Particle { pos: at, vx, vy, size, color, life: 1.0 }
            })
            .collect();
        Self { particles, gravity: cfg.gravity, decay: cfg.decay }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn step(&mut self) -> Step {
        for p in &mut self.particles {
            p.pos.x += p.vx;
            p.pos.y += p.vy;
            p.vy += self.gravity;
            p.life -= self.decay;
        }
        self.particles.retain(|p| p.life > 0.0);
        if self.particles.is_empty() { Step::Done(None) } else { Step::Continue }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        for p in &self.particles {
            surface::report("particle", surface.circle(p.pos, p.size, &p.fill(), None));
        }
    }
}

// --- Shake ------------------------------------------------------------------

/// Red marker wobbling left/right over a wrongly clicked position.
#[derive(Clone, Debug)]
pub struct Shake {
    center: Point,
    count: u32,
    max: u32,
    offset: f64,
    radius: f64,
}

impl Shake {
    pub fn new(center: Point, cfg: &ShakeConfig, radius: f64) -> Self {
        Self { center, count: 0, max: cfg.ticks, offset: cfg.offset, radius }
    }

    /// Marker center for the current tick; odd ticks lean right.
    pub fn current(&self) -> Point {
        let dx = if self.count % 2 == 1 { self.offset } else { -self.offset };
        Point::new(self.center.x + dx, self.center.y)
    }

    fn step(&mut self) -> Step {
        if self.count >= self.max {
            return Step::Done(None);
        }
        self.count += 1;
        Step::Continue
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if self.count == 0 {
            return;
        }
        surface::report(
            "shake marker",
            surface.circle(
                self.current(),
                self.radius,
                "rgba(255, 99, 71, 0.6)",
                Some("rgba(255, 99, 71, 0.8)"),
            ),
        );
    }
}

// --- Deferred action --------------------------------------------------------

/// Fires `ShowMessage` once `delay_ms` has passed since its first tick.
#[derive(Clone, Debug)]
pub struct Deferred {
    delay_ms: f64,
    fire_at: Option<f64>,
}

impl Deferred {
    pub fn new(delay_ms: f64) -> Self {
        Self { delay_ms, fire_at: None }
    }

    fn step(&mut self, now: f64) -> Step {
        let fire_at = *self.fire_at.get_or_insert(now + self.delay_ms);
        if now >= fire_at { Step::Done(Some(TaskEvent::ShowMessage)) } else { Step::Continue }
    }
}

// --- Scheduler --------------------------------------------------------------

#[derive(Clone, Debug)]
pub enum Task {
    Travel(BallTravel),
    Celebration(Celebration),
    Shake(Shake),
    Deferred(Deferred),
}

impl Task {
    pub fn access(&self) -> Access {
        match self {
            Task::Travel(_) => Access::Ball,
            Task::Celebration(_) | Task::Shake(_) | Task::Deferred(_) => Access::None,
        }
    }

    fn step(&mut self, now: f64, ball: &mut Ball) -> Step {
        match self {
            Task::Travel(t) => t.step(ball),
            Task::Celebration(c) => c.step(),
            Task::Shake(s) => s.step(),
            Task::Deferred(d) => d.step(now),
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        match self {
            Task::Celebration(c) => c.draw(surface),
            Task::Shake(s) => s.draw(surface),
            Task::Travel(_) | Task::Deferred(_) => {}
        }
    }
}

/// Set of in-flight tasks. Tasks run in insertion order each frame, but nothing
/// depends on that order.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: Task) -> Result<(), ScheduleError> {
        let access = task.access();
        if access != Access::None && self.tasks.iter().any(|t| t.access() == access) {
            return Err(ScheduleError::Busy(access));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Kick the ball from `from` to `to`. The ball is marked moving right away so
    /// the very next frame already draws the trail.
    pub fn start_travel(
        &mut self,
        ball: &mut Ball,
        from: Point,
        to: Point,
        cfg: &GameConfig,
    ) -> Result<(), ScheduleError> {
        self.schedule(Task::Travel(BallTravel::new(from, to, cfg.travel.step)))?;
        ball.pos = from;
        ball.moving = true;
        Ok(())
    }

    /// Advance every task by one frame, dropping the finished ones.
    pub fn tick(&mut self, now: f64, ball: &mut Ball) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        self.tasks.retain_mut(|task| match task.step(now, ball) {
            Step::Continue => true,
            Step::Done(event) => {
                events.extend(event);
                false
            }
        });
        events
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        for task in &self.tasks {
            task.draw(surface);
        }
    }

    /// Drop every pending task, including a deferred message that has not fired.
    pub fn cancel_all(&mut self) {
        if !self.tasks.is_empty() {
            log::debug!("cancelling {} pending animation task(s)", self.tasks.len());
        }
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}
