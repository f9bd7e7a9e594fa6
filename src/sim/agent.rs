//! What the brain sees and how its outputs become moves
//!
//! Observation (5 values, roughly in [-1, 1]):
//! `[ball_x, ball_y, cos(direction), sin(direction), paddle_center_y]`,
//! positions scaled from field pixels to [-1, 1].
//!
//! Decision (3 outputs): `[up, stay, down]`, argmax wins.

use super::state::{Ball, Field};
use crate::consts::{DECISION_WIDTH, OBSERVATION_WIDTH};
use crate::platform::{Key, KeySnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Stay,
    Down,
}

impl Move {
    pub const ALL: [Move; DECISION_WIDTH] = [Move::Up, Move::Stay, Move::Down];

    pub fn index(self) -> usize {
        match self {
            Move::Up => 0,
            Move::Stay => 1,
            Move::Down => 2,
        }
    }

    /// Vertical direction in screen space (up is negative y)
    pub fn dy(self) -> f32 {
        match self {
            Move::Up => -1.0,
            Move::Stay => 0.0,
            Move::Down => 1.0,
        }
    }

    /// Argmax over the decision outputs; ties go to the lower index
    pub fn from_outputs(outputs: &[f32]) -> Move {
        let mut best = 0;
        for (i, &v) in outputs.iter().enumerate().take(DECISION_WIDTH) {
            if v > outputs[best] {
                best = i;
            }
        }
        Move::ALL[best]
    }
}

/// Brain widths for a given hidden layer size
pub fn brain_topology(hidden: usize) -> [usize; 3] {
    [OBSERVATION_WIDTH, hidden, DECISION_WIDTH]
}

/// Build the observation vector for a paddle whose center is at `paddle_y`
pub fn observe(ball: &Ball, paddle_y: f32, field: &Field) -> [f32; OBSERVATION_WIDTH] {
    [
        ball.pos.x / field.width * 2.0 - 1.0,
        ball.pos.y / field.height * 2.0 - 1.0,
        ball.angle.cos(),
        ball.angle.sin(),
        paddle_y / field.height * 2.0 - 1.0,
    ]
}

/// The move that closes `distance` (ball y minus paddle center).
///
/// Within a quarter of the paddle height the paddle should hold still.
pub fn target_move(distance: f32, paddle_height: f32) -> Move {
    let dead_zone = paddle_height / 4.0;
    if distance < -dead_zone {
        Move::Up
    } else if distance > dead_zone {
        Move::Down
    } else {
        Move::Stay
    }
}

/// Per-output errors pushing the target unit toward +1 and the rest toward -1
pub fn learning_errors(outputs: &[f32], target: Move, magnitude: f32) -> [f32; DECISION_WIDTH] {
    let mut errors = [0.0; DECISION_WIDTH];
    for (i, (error, &out)) in errors.iter_mut().zip(outputs).enumerate() {
        let wanted = if i == target.index() { 1.0 } else { -1.0 };
        *error = (wanted - out) * magnitude;
    }
    errors
}

/// Manual override from the keyboard: Up/W and Down/S, both or neither hold still
pub fn manual_move(keys: KeySnapshot) -> Option<Move> {
    let up = keys.is_down(Key::Up) || keys.is_down(Key::W);
    let down = keys.is_down(Key::Down) || keys.is_down(Key::S);
    match (up, down) {
        (true, false) => Some(Move::Up),
        (false, true) => Some(Move::Down),
        (true, true) => Some(Move::Stay),
        (false, false) => None,
    }
}
