//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded brain initialization only
//! - No rendering or platform dependencies beyond the `Canvas` drawing hooks

pub mod agent;
pub mod collision;
pub mod state;
pub mod tick;

pub use agent::{Move, brain_topology, manual_move, observe};
pub use collision::{CollisionResult, check_collision, paddle_deflection};
pub use state::{
    Ball, BallTuning, Field, GameEvent, GameState, LearningSignals, Paddle, PaddleSpec, Score,
    Side,
};
pub use tick::{TickInput, tick};
