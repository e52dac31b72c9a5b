//! Render-agnostic drawing primitives
//!
//! Entities push simple shapes into a [`DrawList`] during the draw pass. A
//! frontend walks the list and renders it however it likes; the engine never
//! touches a graphics API.

use crate::foundation::math::{Color, Point2};

/// One drawing primitive in world coordinates
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Line segment from start to end
    Line {
        /// First endpoint
        start: Point2,
        /// Second endpoint
        end: Point2,
        /// Line half-width in world units (0 = hairline)
        thickness: f32,
        /// Stroke color
        color: Color,
    },

    /// Circle at center with radius
    Circle {
        /// Center in world coordinates
        center: Point2,
        /// Radius in world units
        radius: f32,
        /// Fill color
        fill: Color,
        /// Optional outline color
        outline: Option<Color>,
    },

    /// Single point marker
    Dot {
        /// Marker position
        position: Point2,
        /// Marker color
        color: Color,
    },
}

/// Ordered list of draw commands for one frame
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a line segment
    pub fn line(&mut self, start: Point2, end: Point2, thickness: f32, color: Color) {
        self.commands.push(DrawCommand::Line { start, end, thickness, color });
    }

    /// Queue a filled circle
    pub fn circle(&mut self, center: Point2, radius: f32, fill: Color, outline: Option<Color>) {
        self.commands.push(DrawCommand::Circle { center, radius, fill, outline });
    }

    /// Queue a point marker
    pub fn dot(&mut self, position: Point2, color: Color) {
        self.commands.push(DrawCommand::Dot { position, color });
    }

    /// Commands in submission order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing was queued
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all commands, keeping the allocation
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}
