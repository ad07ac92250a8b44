//! Minimal debug-drawing surface used by force fields to visualize themselves.

/// Drawing operations a debug target must support.
pub trait DebugDraw {
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn circle(&mut self, x: f64, y: f64, radius: f64);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Forget any buffered path. Called once per frame before fields draw.
    fn reset(&mut self) {}
}

/// One recorded drawing operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    Circle { x: f64, y: f64, radius: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
}

/// A [`DebugDraw`] that records commands for later replay or inspection.
#[derive(Clone, Debug, Default)]
pub struct DebugPath {
    commands: Vec<DrawCommand>,
}

impl DebugPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Take the recorded commands, leaving the path empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl DebugDraw for DebugPath {
    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::LineTo { x, y });
    }

    fn circle(&mut self, x: f64, y: f64, radius: f64) {
        self.commands.push(DrawCommand::Circle { x, y, radius });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::Rect { x, y, width, height });
    }

    fn reset(&mut self) {
        self.commands.clear();
    }
}
