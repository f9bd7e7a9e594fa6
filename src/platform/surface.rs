//! Drawable surface capability and a recording implementation

use glam::Vec2;

/// RGBA color, components in 0-1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const PADDLE: Color = Color::rgb(0.2, 0.8, 0.4);
    pub const FRAME: Color = Color::rgb(0.3, 0.3, 0.4);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Neuron shade for an intensity in 0-1 (dark blue to bright green)
    pub fn intensity(t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgb(0.1 * (1.0 - t), 0.2 + 0.8 * t, 0.5 * (1.0 - t))
    }
}

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Drawing context for a single frame
pub trait Canvas {
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn draw_text(&mut self, pos: Vec2, text: &str, color: Color);
}

/// Platform-provided presentable surface
///
/// The render pass checks `is_prepared` first; an unprepared surface is
/// prepared with the requested buffering depth and that frame is skipped.
pub trait DisplaySurface {
    fn is_prepared(&self) -> bool;
    fn prepare(&mut self, buffers: u32);
    fn size(&self) -> (f32, f32);
    /// Drawing context for the next frame. Valid until `present`.
    fn begin_frame(&mut self) -> &mut dyn Canvas;
    fn present(&mut self);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect(Rect, Color),
    StrokeRect(Rect, Color),
    Circle { center: Vec2, radius: f32, color: Color },
    Text { pos: Vec2, text: String, color: Color },
}

#[derive(Debug, Default)]
struct CommandBuffer {
    commands: Vec<DrawCommand>,
}

impl Canvas for CommandBuffer {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::StrokeRect(rect, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn draw_text(&mut self, pos: Vec2, text: &str, color: Color) {
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.to_string(),
            color,
        });
    }
}

/// Surface without a window: keeps the last presented frame's commands
#[derive(Debug)]
pub struct HeadlessSurface {
    width: f32,
    height: f32,
    buffers: u32,
    back: CommandBuffer,
    front: Vec<DrawCommand>,
    frames_presented: u64,
}

impl HeadlessSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            buffers: 0,
            back: CommandBuffer::default(),
            front: Vec::new(),
            frames_presented: 0,
        }
    }

    pub fn buffers(&self) -> u32 {
        self.buffers
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Commands of the most recently presented frame
    pub fn last_frame(&self) -> &[DrawCommand] {
        &self.front
    }
}

impl DisplaySurface for HeadlessSurface {
    fn is_prepared(&self) -> bool {
        self.buffers > 0
    }

    fn prepare(&mut self, buffers: u32) {
        log::debug!("Headless surface prepared with {} buffers", buffers);
        self.buffers = buffers;
    }

    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn begin_frame(&mut self) -> &mut dyn Canvas {
        self.back.commands.clear();
        &mut self.back
    }

    fn present(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back.commands);
        self.frames_presented += 1;
    }
}
