//! Game state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::agent::{self, Move};
use super::collision::{CollisionResult, check_collision};
use crate::brain::NeuralNetwork;
use crate::consts::*;
use crate::error::BrainError;
use crate::platform::{Canvas, Color, Rect};
use crate::{direction, normalize_angle};

/// Playfield size in pixels (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
        }
    }
}

impl Field {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Which field edge a paddle defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

/// Ball speed and deflection limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallTuning {
    pub radius: f32,
    /// Speed after every serve (pixels per tick)
    pub base_speed: f32,
    pub max_speed: f32,
    pub paddle_boost: f32,
    pub max_deflection: f32,
}

impl Default for BallTuning {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            base_speed: BALL_START_SPEED,
            max_speed: BALL_MAX_SPEED,
            paddle_boost: PADDLE_BOOST,
            max_deflection: MAX_DEFLECTION,
        }
    }
}

/// The ball: position plus direction and speed kept separately
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Direction of travel (radians, normalized to [-π, π))
    pub angle: f32,
    /// Pixels per tick, 0..=max speed
    pub speed: f32,
    pub radius: f32,
}

impl Ball {
    pub fn new(pos: Vec2, radius: f32, speed: f32) -> Self {
        Self {
            pos,
            angle: 0.0,
            speed: speed.max(0.0),
            radius,
        }
    }

    /// Ball at the field center heading -45° at base speed
    pub fn served(field: &Field, tuning: &BallTuning) -> Self {
        let mut ball = Self::new(field.center(), tuning.radius, tuning.base_speed);
        ball.set_direction(BALL_SERVE_ANGLE);
        ball
    }

    /// Sets the direction only; the magnitude is `speed`
    pub fn set_direction(&mut self, angle: f32) {
        self.angle = normalize_angle(angle);
    }

    pub fn velocity(&self) -> Vec2 {
        direction(self.angle) * self.speed
    }

    pub fn advance(&mut self, delta_ticks: f32) {
        self.pos += self.velocity() * delta_ticks;
    }

    /// Move, then resolve collisions against the paddle (if any) and walls.
    ///
    /// A `Scored` result has already re-served the ball.
    pub fn update(
        &mut self,
        delta_ticks: f32,
        paddle: Option<&Paddle>,
        field: &Field,
        tuning: &BallTuning,
    ) -> CollisionResult {
        self.advance(delta_ticks);
        let result = check_collision(self, paddle, field, tuning.max_deflection);
        match result {
            CollisionResult::None => {}
            CollisionResult::PaddleHit { angle } => {
                self.set_direction(angle);
                self.speed = (self.speed * tuning.paddle_boost).clamp(0.0, tuning.max_speed);
                self.pos.y = self.pos.y.clamp(self.radius, field.height - self.radius);
            }
            CollisionResult::WallBounce { angle } => {
                self.set_direction(angle);
                self.pos.y = self.pos.y.clamp(self.radius, field.height - self.radius);
                self.pos.x = self.pos.x.clamp(self.radius, field.width - self.radius);
            }
            CollisionResult::Scored(side) => {
                log::debug!("Ball passed the {:?} paddle at y={:.1}", side, self.pos.y);
                *self = Self::served(field, tuning);
            }
        }
        result
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        canvas.fill_circle(self.pos, self.radius, Color::WHITE);
    }
}

/// Paddle geometry and movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleSpec {
    pub width: f32,
    pub height: f32,
    /// Gap between the back face and the defended field edge
    pub margin: f32,
    /// Pixels per tick
    pub speed: f32,
    pub side: Side,
}

impl Default for PaddleSpec {
    fn default() -> Self {
        Self {
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            margin: PADDLE_MARGIN,
            speed: PADDLE_SPEED,
            side: Side::Left,
        }
    }
}

/// The player's paddle, steered by its brain
#[derive(Debug, Clone)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub side: Side,
    pub speed: f32,
    brain: NeuralNetwork,
    last_move: Move,
}

impl Paddle {
    /// Vertically centered paddle. The brain must fit the observation/decision widths.
    pub fn new(spec: PaddleSpec, field: &Field, brain: NeuralNetwork) -> Result<Self, BrainError> {
        let x = match spec.side {
            Side::Left => spec.margin,
            Side::Right => field.width - spec.margin - spec.width,
        };
        let paddle = Self {
            pos: Vec2::new(x, (field.height - spec.height) / 2.0),
            size: Vec2::new(spec.width, spec.height),
            side: spec.side,
            speed: spec.speed,
            brain,
            last_move: Move::Stay,
        };
        paddle.check_brain_fits(&paddle.brain)?;
        Ok(paddle)
    }

    pub fn center_y(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    pub fn brain(&self) -> &NeuralNetwork {
        &self.brain
    }

    pub fn last_move(&self) -> Move {
        self.last_move
    }

    fn check_brain_fits(&self, brain: &NeuralNetwork) -> Result<(), BrainError> {
        if brain.input_width() != OBSERVATION_WIDTH {
            return Err(BrainError::DimensionMismatch {
                expected: OBSERVATION_WIDTH,
                actual: brain.input_width(),
            });
        }
        if brain.output_width() != DECISION_WIDTH {
            return Err(BrainError::DimensionMismatch {
                expected: DECISION_WIDTH,
                actual: brain.output_width(),
            });
        }
        Ok(())
    }

    /// Replace the brain (startup only, when a saved one is found)
    pub fn set_brain(&mut self, brain: NeuralNetwork) -> Result<(), BrainError> {
        self.check_brain_fits(&brain)?;
        self.brain = brain;
        Ok(())
    }

    /// Ask the brain for a move and apply it (or the manual override).
    ///
    /// The brain is evaluated even under manual control so its activations
    /// stay current for rendering and learning.
    pub fn update(
        &mut self,
        ball: &Ball,
        field: &Field,
        manual: Option<Move>,
    ) -> Result<Move, BrainError> {
        let observation = agent::observe(ball, self.center_y(), field);
        let outputs = self.brain.evaluate(&observation)?;
        let decided = manual.unwrap_or_else(|| Move::from_outputs(&outputs));

        self.pos.y = (self.pos.y + decided.dy() * self.speed).clamp(0.0, field.height - self.size.y);
        self.last_move = decided;
        log::trace!("paddle {:?} outputs={:?} y={:.1}", decided, outputs, self.pos.y);
        Ok(decided)
    }

    /// Train the last decision toward tracking `ball_y`, scaled by `magnitude`
    pub fn learn(&mut self, ball_y: f32, magnitude: f32, field: &Field) -> Result<(), BrainError> {
        let Some(outputs) = self.brain.activations().last().cloned() else {
            return Ok(());
        };
        let distance = ball_y - self.center_y();
        let target = agent::target_move(distance, self.size.y);
        let scale = (distance.abs() / (field.height / 2.0)).clamp(0.1, 1.0);
        let errors = agent::learning_errors(&outputs, target, magnitude * scale);
        self.brain.adjust(&errors)
    }

    /// Draws the paddle only; the brain is drawn by the scene renderer
    pub fn render(&self, canvas: &mut dyn Canvas) {
        canvas.fill_rect(self.rect(), Color::PADDLE);
    }
}

/// Rally counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Returns in the current rally (shown on screen)
    pub hits: u32,
    pub misses: u32,
    pub best_rally: u32,
    pub total_hits: u64,
}

impl Score {
    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.total_hits += 1;
        self.best_rally = self.best_rally.max(self.hits);
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
        self.hits = 0;
    }
}

/// Online learning signal strengths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningSignals {
    pub enabled: bool,
    pub hit_reward: f32,
    pub miss_penalty: f32,
    /// Per-tick shaping while the ball approaches
    pub tracking_rate: f32,
}

impl Default for LearningSignals {
    fn default() -> Self {
        Self {
            enabled: true,
            hit_reward: 0.5,
            miss_penalty: 2.0,
            tracking_rate: 0.1,
        }
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    PaddleHit { angle: f32 },
    WallBounce,
    Missed(Side),
}

/// Complete simulation state, mutated only by `tick`
#[derive(Debug, Clone)]
pub struct GameState {
    pub field: Field,
    pub tuning: BallTuning,
    pub learning: LearningSignals,
    pub manual_control: bool,
    pub ball: Ball,
    pub paddle: Paddle,
    pub score: Score,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events of the most recent tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(
        field: Field,
        tuning: BallTuning,
        spec: PaddleSpec,
        brain: NeuralNetwork,
    ) -> Result<Self, BrainError> {
        Ok(Self {
            field,
            tuning,
            learning: LearningSignals::default(),
            manual_control: false,
            ball: Ball::served(&field, &tuning),
            paddle: Paddle::new(spec, &field, brain)?,
            score: Score::default(),
            time_ticks: 0,
            events: Vec::new(),
        })
    }

    /// Default-sized game with a fresh seeded brain
    pub fn with_seed(seed: u64) -> Result<Self, BrainError> {
        let brain = NeuralNetwork::new(&agent::brain_topology(HIDDEN_WIDTH), seed)?;
        Self::new(
            Field::default(),
            BallTuning::default(),
            PaddleSpec::default(),
            brain,
        )
    }
}
