//! Nong - Pong played by a neural network that keeps learning between runs
//!
//! Core modules:
//! - `brain`: Fixed-topology feed-forward network and its binary format
//! - `sim`: Deterministic simulation (ball, paddle, collisions, scoring)
//! - `runtime`: Fixed-timestep loop thread with periodic brain saves
//! - `persistence`: Atomic brain files and the background save worker
//! - `platform`: Display surface and keyboard collaborators
//! - `renderer`: Scene drawing onto a display surface
//! - `settings`: JSON configuration

pub mod brain;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod runtime;
pub mod settings;
pub mod sim;

pub use brain::NeuralNetwork;
pub use error::{BrainError, LoopError, SettingsError};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Logical updates per second
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Playfield dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Pixels per tick
    pub const BALL_START_SPEED: f32 = 4.0;
    /// Maximum ball speed
    pub const BALL_MAX_SPEED: f32 = 9.0;
    /// Speed boost when ball hits paddle (multiplicative)
    pub const PADDLE_BOOST: f32 = 1.05;
    /// Direction the ball is served in after every reset (-45 degrees)
    pub const BALL_SERVE_ANGLE: f32 = -std::f32::consts::FRAC_PI_4;
    /// Largest deflection a paddle hit can impart (60 degrees)
    pub const MAX_DEFLECTION: f32 = std::f32::consts::FRAC_PI_3;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 10.0;
    pub const PADDLE_HEIGHT: f32 = 80.0;
    /// Gap between the paddle's back face and its field edge
    pub const PADDLE_MARGIN: f32 = 20.0;
    /// Pixels per tick
    pub const PADDLE_SPEED: f32 = 5.0;

    /// Brain defaults
    pub const OBSERVATION_WIDTH: usize = 5;
    pub const HIDDEN_WIDTH: usize = 6;
    pub const DECISION_WIDTH: usize = 3;
    pub const LEARNING_RATE: f32 = 0.05;
    pub const MAX_WEIGHT_STEP: f32 = 0.05;
    pub const WEIGHT_LIMIT: f32 = 8.0;

    /// Display buffering depth requested from the platform surface
    pub const SURFACE_BUFFERS: u32 = 3;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit direction vector for an angle (screen space, y grows downward)
#[inline]
pub fn direction(angle: f32) -> glam::Vec2 {
    glam::Vec2::new(angle.cos(), angle.sin())
}
