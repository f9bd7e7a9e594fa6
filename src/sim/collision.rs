//! Collision detection and response for the ball
//!
//! Pure functions: nothing here mutates the ball or paddle. Resolution
//! order is paddle, then scoring, then walls, so a paddle save always wins
//! over a miss or a bounce in the same tick.

use std::f32::consts::PI;

use glam::Vec2;

use super::state::{Ball, Field, Paddle, Side};
use crate::{direction, normalize_angle};

/// Outcome of one collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionResult {
    None,
    /// Ball returned by the paddle, leaving at `angle`
    PaddleHit { angle: f32 },
    /// Ball bounced off one or more walls, leaving at `angle`
    WallBounce { angle: f32 },
    /// Ball got past the paddle defending `Side`
    Scored(Side),
}

/// Deflection for an impact offset in [-1, 1] (0 = paddle center)
#[inline]
pub fn paddle_deflection(offset: f32, max_deflection: f32) -> f32 {
    offset.clamp(-1.0, 1.0) * max_deflection
}

/// Whether the ball circle overlaps the paddle rectangle
pub fn ball_overlaps_paddle(ball: &Ball, paddle: &Paddle) -> bool {
    let min = paddle.pos;
    let max = paddle.pos + paddle.size;
    let closest = ball.pos.clamp(min, max);
    (ball.pos - closest).length_squared() <= ball.radius * ball.radius
}

/// Check the ball against the paddle (if present) and the field walls
pub fn check_collision(
    ball: &Ball,
    paddle: Option<&Paddle>,
    field: &Field,
    max_deflection: f32,
) -> CollisionResult {
    let heading = direction(ball.angle);

    if let Some(paddle) = paddle {
        let approaching = match paddle.side {
            Side::Left => heading.x < 0.0,
            Side::Right => heading.x > 0.0,
        };
        if approaching && ball_overlaps_paddle(ball, paddle) {
            let reach = paddle.size.y / 2.0 + ball.radius;
            let offset = (ball.pos.y - paddle.center_y()) / reach;
            let deflection = paddle_deflection(offset, max_deflection);
            let angle = match paddle.side {
                Side::Left => deflection,
                Side::Right => PI - deflection,
            };
            return CollisionResult::PaddleHit {
                angle: normalize_angle(angle),
            };
        }

        let passed = match paddle.side {
            Side::Left => ball.pos.x < paddle.pos.x,
            Side::Right => ball.pos.x > paddle.pos.x + paddle.size.x,
        };
        if passed {
            return CollisionResult::Scored(paddle.side);
        }
    }

    // Without a paddle every edge is a wall; with one, its own edge is open
    let (left_wall, right_wall) = match paddle.map(|p| p.side) {
        None => (true, true),
        Some(Side::Left) => (false, true),
        Some(Side::Right) => (true, false),
    };
    match wall_bounce(ball.pos, ball.radius, heading, field, left_wall, right_wall) {
        Some((flip_x, flip_y)) => {
            let mut angle = ball.angle;
            if flip_y {
                angle = -angle;
            }
            if flip_x {
                angle = PI - angle;
            }
            CollisionResult::WallBounce {
                angle: normalize_angle(angle),
            }
        }
        None => CollisionResult::None,
    }
}

/// Which velocity components a wall contact mirrors, if any.
///
/// Only walls the ball is moving into count, so a ball still overlapping a
/// wall after bouncing is not reflected back.
fn wall_bounce(
    pos: Vec2,
    radius: f32,
    heading: Vec2,
    field: &Field,
    left_wall: bool,
    right_wall: bool,
) -> Option<(bool, bool)> {
    let flip_y = (pos.y - radius <= 0.0 && heading.y < 0.0)
        || (pos.y + radius >= field.height && heading.y > 0.0);
    let flip_x = (left_wall && pos.x - radius <= 0.0 && heading.x < 0.0)
        || (right_wall && pos.x + radius >= field.width && heading.x > 0.0);
    (flip_x || flip_y).then_some((flip_x, flip_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::NeuralNetwork;
    use crate::consts::{MAX_DEFLECTION, PADDLE_HEIGHT};
    use crate::sim::state::PaddleSpec;
    use proptest::prelude::*;

    fn field() -> Field {
        Field::default()
    }

    fn paddle(side: Side) -> Paddle {
        let brain = NeuralNetwork::new(&[5, 6, 3], 1).unwrap();
        let spec = PaddleSpec {
            side,
            ..Default::default()
        };
        Paddle::new(spec, &field(), brain).unwrap()
    }

    fn ball_at(x: f32, y: f32, angle: f32) -> Ball {
        let mut ball = Ball::new(Vec2::new(x, y), 8.0, 4.0);
        ball.set_direction(angle);
        ball
    }

    #[test]
    fn test_dead_center_hit_leaves_straight() {
        let p = paddle(Side::Left);
        let ball = ball_at(p.pos.x + p.size.x + 5.0, p.center_y(), PI * 0.8);
        match check_collision(&ball, Some(&p), &field(), MAX_DEFLECTION) {
            CollisionResult::PaddleHit { angle } => assert!(angle.abs() < 1e-5),
            other => panic!("expected paddle hit, got {other:?}"),
        }
    }

    #[test]
    fn test_deflection_grows_with_offset() {
        let p = paddle(Side::Left);
        // Ball centered just past the bottom corner
        let ball = ball_at(p.pos.x + p.size.x + 2.0, p.pos.y + p.size.y + 4.0, PI);
        match check_collision(&ball, Some(&p), &field(), MAX_DEFLECTION) {
            CollisionResult::PaddleHit { angle } => {
                let reach = PADDLE_HEIGHT / 2.0 + 8.0;
                let expected = (PADDLE_HEIGHT / 2.0 + 4.0) / reach * MAX_DEFLECTION;
                assert!((angle - expected).abs() < 1e-5);
                assert!(angle > 0.0 && angle < MAX_DEFLECTION);
            }
            other => panic!("expected paddle hit, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_hit_gets_max_deflection() {
        let p = paddle(Side::Left);
        // Ball just grazing the top corner
        let ball = ball_at(p.pos.x + p.size.x, p.pos.y - 8.0, PI);
        match check_collision(&ball, Some(&p), &field(), MAX_DEFLECTION) {
            CollisionResult::PaddleHit { angle } => {
                assert!((angle + MAX_DEFLECTION).abs() < 1e-5);
            }
            other => panic!("expected paddle hit, got {other:?}"),
        }
    }

    #[test]
    fn test_right_paddle_reflects_leftward() {
        let p = paddle(Side::Right);
        let ball = ball_at(p.pos.x - 5.0, p.center_y(), 0.2);
        match check_collision(&ball, Some(&p), &field(), MAX_DEFLECTION) {
            CollisionResult::PaddleHit { angle } => {
                assert!(direction(angle).x < 0.0);
                assert!((angle.abs() - PI).abs() < 1e-5);
            }
            other => panic!("expected paddle hit, got {other:?}"),
        }
    }

    #[test]
    fn test_receding_ball_is_not_hit() {
        let p = paddle(Side::Left);
        let ball = ball_at(p.pos.x + p.size.x + 5.0, p.center_y(), 0.0);
        assert_eq!(
            check_collision(&ball, Some(&p), &field(), MAX_DEFLECTION),
            CollisionResult::None
        );
    }

    #[test]
    fn test_scored_when_past_back_face() {
        let p = paddle(Side::Left);
        let ball = ball_at(p.pos.x - 1.0, 20.0, PI);
        assert_eq!(
            check_collision(&ball, Some(&p), &field(), MAX_DEFLECTION),
            CollisionResult::Scored(Side::Left)
        );
    }

    #[test]
    fn test_paddle_save_beats_wall_and_score() {
        let mut p = paddle(Side::Left);
        p.pos.y = 0.0;
        // Touching the top wall, overlapping the paddle, center behind its front face
        let ball = ball_at(p.pos.x + 2.0, 4.0, -PI * 0.75);
        assert!(matches!(
            check_collision(&ball, Some(&p), &field(), MAX_DEFLECTION),
            CollisionResult::PaddleHit { .. }
        ));
    }

    #[test]
    fn test_top_wall_mirrors_vertical() {
        let ball = ball_at(400.0, 5.0, -PI / 4.0);
        match check_collision(&ball, Some(&paddle(Side::Left)), &field(), MAX_DEFLECTION) {
            CollisionResult::WallBounce { angle } => assert!((angle - PI / 4.0).abs() < 1e-6),
            other => panic!("expected wall bounce, got {other:?}"),
        }
    }

    #[test]
    fn test_far_wall_mirrors_horizontal() {
        let ball = ball_at(795.0, 300.0, -PI / 4.0);
        match check_collision(&ball, Some(&paddle(Side::Left)), &field(), MAX_DEFLECTION) {
            CollisionResult::WallBounce { angle } => {
                assert!((angle - (-3.0 * PI / 4.0)).abs() < 1e-5)
            }
            other => panic!("expected wall bounce, got {other:?}"),
        }
    }

    #[test]
    fn test_corner_mirrors_both() {
        let ball = ball_at(795.0, 5.0, -PI / 4.0);
        match check_collision(&ball, None, &field(), MAX_DEFLECTION) {
            CollisionResult::WallBounce { angle } => {
                assert!((angle - 3.0 * PI / 4.0).abs() < 1e-5)
            }
            other => panic!("expected wall bounce, got {other:?}"),
        }
    }

    #[test]
    fn test_without_paddle_left_edge_is_a_wall() {
        let ball = ball_at(5.0, 300.0, PI);
        assert!(matches!(
            check_collision(&ball, None, &field(), MAX_DEFLECTION),
            CollisionResult::WallBounce { .. }
        ));
    }

    #[test]
    fn test_open_field_is_quiet() {
        let ball = ball_at(400.0, 300.0, -PI / 4.0);
        assert_eq!(
            check_collision(&ball, Some(&paddle(Side::Left)), &field(), MAX_DEFLECTION),
            CollisionResult::None
        );
    }

    proptest! {
        #[test]
        fn prop_deflection_never_exceeds_max(offset in -10.0f32..10.0, max in 0.0f32..1.5) {
            prop_assert!(paddle_deflection(offset, max).abs() <= max + f32::EPSILON);
        }

        #[test]
        fn prop_left_paddle_hits_leave_rightward(y in 256.0f32..344.0) {
            let p = paddle(Side::Left);
            let ball = ball_at(p.pos.x + p.size.x + 4.0, y, PI);
            match check_collision(&ball, Some(&p), &field(), MAX_DEFLECTION) {
                CollisionResult::PaddleHit { angle } => {
                    prop_assert!(angle.abs() <= MAX_DEFLECTION + 1e-6);
                    prop_assert!(direction(angle).x > 0.0);
                }
                other => prop_assert!(false, "expected paddle hit, got {:?}", other),
            }
        }
    }
}
