//! Fixed timestep simulation tick
//!
//! Advances the game by exactly one logical step: paddle decision, ball
//! movement and collisions, scoring, then the brain's learning feedback.

use super::agent::Move;
use super::collision::CollisionResult;
use super::state::{GameEvent, GameState, Side};
use crate::error::BrainError;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Direct control, honored only when manual control is enabled
    pub manual: Option<Move>,
}

/// Advance the game state by one tick.
///
/// Fails only when the brain rejects its observation, which means the
/// feature vector and topology disagree.
pub fn tick(state: &mut GameState, input: &TickInput) -> Result<(), BrainError> {
    state.events.clear();
    state.time_ticks += 1;

    let manual = if state.manual_control {
        input.manual
    } else {
        None
    };
    state.paddle.update(&state.ball, &state.field, manual)?;

    let before = state.ball.clone();
    let result = state
        .ball
        .update(1.0, Some(&state.paddle), &state.field, &state.tuning);
    // Where the ball was when the collision was resolved
    let contact_y = before.pos.y + before.velocity().y;

    let learning = state.learning;
    match result {
        CollisionResult::None => {}
        CollisionResult::WallBounce { .. } => state.events.push(GameEvent::WallBounce),
        CollisionResult::PaddleHit { angle } => {
            state.score.record_hit();
            state.events.push(GameEvent::PaddleHit { angle });
            log::debug!("Return #{} (angle {:.1}°)", state.score.hits, angle.to_degrees());
            if learning.enabled {
                state
                    .paddle
                    .learn(contact_y, learning.hit_reward, &state.field)?;
            }
        }
        CollisionResult::Scored(side) => {
            let rally = state.score.hits;
            state.score.record_miss();
            state.events.push(GameEvent::Missed(side));
            log::debug!("Missed after a rally of {} (best {})", rally, state.score.best_rally);
            if learning.enabled {
                state
                    .paddle
                    .learn(contact_y, learning.miss_penalty, &state.field)?;
            }
        }
    }

    // Shape the decision every tick while the ball is coming in
    let incoming = match state.paddle.side {
        Side::Left => before.velocity().x < 0.0,
        Side::Right => before.velocity().x > 0.0,
    };
    if learning.enabled && incoming && learning.tracking_rate > 0.0 {
        state
            .paddle
            .learn(before.pos.y, learning.tracking_rate, &state.field)?;
    }

    Ok(())
}
