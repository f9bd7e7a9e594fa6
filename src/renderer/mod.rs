//! Scene rendering
//!
//! Draws one frame of the game onto whatever `DisplaySurface` the platform
//! provides. The first call on a fresh surface only prepares its buffers.

use glam::Vec2;

use crate::consts::SURFACE_BUFFERS;
use crate::platform::{Color, DisplaySurface, Rect};
use crate::sim::GameState;

/// Baseline of the score text, measured from the top edge
pub const SCORE_TEXT_Y: f32 = 80.0;

/// Where the brain's activations are drawn
pub const BRAIN_REGION: Rect = Rect {
    x: 150.0,
    y: 0.0,
    w: 200.0,
    h: 250.0,
};

/// Render `game` and present it. Returns false when the frame was skipped
/// because the surface had to be prepared first.
pub fn render_scene(surface: &mut dyn DisplaySurface, game: &GameState) -> bool {
    if !surface.is_prepared() {
        surface.prepare(SURFACE_BUFFERS);
        return false;
    }

    let (width, height) = surface.size();
    let canvas = surface.begin_frame();
    canvas.fill_rect(Rect::new(0.0, 0.0, width, height), Color::BLACK);

    game.paddle.render(canvas);
    game.ball.render(canvas);
    canvas.draw_text(
        Vec2::new(width / 2.0, SCORE_TEXT_Y),
        &game.score.hits.to_string(),
        Color::WHITE,
    );
    game.paddle.brain().render(canvas, BRAIN_REGION);

    surface.present();
    true
}
