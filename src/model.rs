//! Annotation data model: tool kinds, the fixed style palette and the element
//! records held by the layers.

use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// The five annotation tools. A closed set; [`crate::tools::create`] maps each
/// kind to its implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Rect,
    Arrow,
    Pixelate,
    Text,
    Marker,
}

impl ToolKind {
    /// Kinds that expose a color/thickness style panel. Text always renders at
    /// the fixed font size and markers use the badge color.
    pub fn is_styled(self) -> bool {
        matches!(self, ToolKind::Rect | ToolKind::Arrow | ToolKind::Pixelate)
    }
}

/// Annotation palette offered by the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Blue,
    Red,
    Black,
}

impl Color {
    pub const fn rgba(self) -> [u8; 4] {
        match self {
            Color::Blue => [0, 120, 212, 255],
            Color::Red => [220, 53, 69, 255],
            Color::Black => [51, 51, 51, 255],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thickness {
    Thin,
    Medium,
    Thick,
}

impl Thickness {
    /// Stroke width in logical units for the shape tools.
    pub const fn stroke_width(self) -> f32 {
        match self {
            Thickness::Thin => 1.0,
            Thickness::Medium => 2.0,
            Thickness::Thick => 4.0,
        }
    }

    /// Pixelation stroke width. The mosaic trail is drawn this wide so each
    /// pass covers whole cells of the pre-rendered source.
    pub const fn block_size(self) -> f32 {
        match self {
            Thickness::Thin => 8.0,
            Thickness::Medium => 16.0,
            Thickness::Thick => 32.0,
        }
    }
}

/// Resolved color/thickness pair applied to the next drawn element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub color: Color,
    pub thickness: Thickness,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: Color::Blue,
            thickness: Thickness::Medium,
        }
    }
}

/// Last-used style per styled tool kind. Each kind keeps its own entry so
/// switching tools restores what that tool last drew with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StylePalette {
    pub rect: Style,
    pub arrow: Style,
    pub pixelate: Style,
}

impl StylePalette {
    pub fn style_for(&self, kind: ToolKind) -> Option<Style> {
        match kind {
            ToolKind::Rect => Some(self.rect),
            ToolKind::Arrow => Some(self.arrow),
            ToolKind::Pixelate => Some(self.pixelate),
            ToolKind::Text | ToolKind::Marker => None,
        }
    }

    pub fn set_style_for(&mut self, kind: ToolKind, style: Style) {
        match kind {
            ToolKind::Rect => self.rect = style,
            ToolKind::Arrow => self.arrow = style,
            ToolKind::Pixelate => self.pixelate = style,
            ToolKind::Text | ToolKind::Marker => {}
        }
    }
}

/// Side length of the numbered-marker badge in logical units.
pub const MARKER_BADGE_SIZE: f32 = 24.0;

/// Footprint reserved for a fresh text box so it opens fully inside bounds.
pub const TEXT_RESERVE_WIDTH: f32 = 50.0;
pub const TEXT_RESERVE_HEIGHT: f32 = 20.0;

/// Text annotation font size in logical units.
pub const TEXT_FONT_SIZE: f32 = 14.0;

/// One annotation element as stored on a layer. Coordinates are logical
/// viewport units; mapping into the exported bitmap happens at composite time.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Stroked, unfilled rectangle.
    Rect {
        rect: Rect,
        color: Color,
        thickness: Thickness,
    },
    /// Line segment with a filled triangular head at `end`.
    Arrow {
        start: Point,
        end: Point,
        color: Color,
        thickness: Thickness,
    },
    /// Freehand trail painted with the pre-rendered pixelation source.
    PixelStroke { points: Vec<Point>, width: f32 },
    /// Committed text run.
    Text {
        origin: Point,
        content: String,
        color: Color,
    },
    /// Circular badge labeled with its sequence number.
    Marker { origin: Point, number: u32 },
}
