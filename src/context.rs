//! Session-scoped context shared by all annotation tools.
//!
//! One context exists per locked selection. It owns the two layers, the undo
//! ledger, the marker counter and the pre-rendered pixelation source, and it
//! interprets ledger entries (the tools only record them). Torn down and
//! rebuilt whenever the selection is reset.

use crate::geometry::{Point, Rect};
use crate::layer::{ElementId, LayerKind, LayerSet};
use crate::ledger::{Ledger, LedgerEntry};
use crate::model::Style;
use crate::pixelate::PixelSource;

#[derive(Debug)]
pub struct ToolContext {
    bounds: Rect,
    current: Style,
    marker_counter: u32,
    pub layers: LayerSet,
    ledger: Ledger,
    pixel_source: PixelSource,
}

impl ToolContext {
    pub fn new(bounds: Rect, style: Style, pixel_source: PixelSource) -> Self {
        Self {
            bounds,
            current: style,
            marker_counter: 1,
            layers: LayerSet::new(),
            ledger: Ledger::new(),
            pixel_source,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Selection bounds can move while resize handles are dragged; existing
    /// elements keep their absolute positions.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn clamp_to_bounds(&self, p: Point) -> Point {
        self.bounds.clamp_point(p)
    }

    pub fn clamp_rect_to_bounds(&self, r: Rect) -> Rect {
        self.bounds.clamp_rect(r)
    }

    /// Style applied to the next drawn element.
    pub fn style(&self) -> Style {
        self.current
    }

    pub fn update_style(&mut self, style: Style) {
        self.current = style;
    }

    /// Mosaic paint for pixelation strokes.
    pub fn pixel_source(&self) -> &PixelSource {
        &self.pixel_source
    }

    /// Number the next marker badge will carry.
    pub fn marker_number(&self) -> u32 {
        self.marker_counter
    }

    /// Claims the current marker number and advances the counter.
    pub fn advance_marker(&mut self) -> u32 {
        let number = self.marker_counter;
        self.marker_counter += 1;
        number
    }

    /// Records a finished element with the ledger. `counter_delta` is non-zero
    /// only for marker badges.
    pub fn complete(&mut self, layer: LayerKind, element: ElementId, counter_delta: u32) {
        let Some(z_index) = self.layers.layer(layer).z_index(element) else {
            return;
        };
        self.ledger.push(LedgerEntry {
            layer,
            element,
            z_index,
            counter_delta,
        });
        tracing::debug!(?layer, z_index, counter_delta, "annotation completed");
    }

    /// Reverse-interprets the most recent ledger entry: the element leaves the
    /// draw order and the marker counter rolls back (floored at 1).
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.ledger.undo() else {
            return false;
        };
        self.layers.layer_mut(entry.layer).detach(entry.element);
        if entry.counter_delta > 0 {
            self.marker_counter = self
                .marker_counter
                .saturating_sub(entry.counter_delta)
                .max(1);
        }
        tracing::debug!(layer = ?entry.layer, "undo applied");
        true
    }

    /// Forward-interprets the most recent undone entry: the element re-enters
    /// the draw order at its recorded position and the counter re-advances.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.ledger.redo() else {
            return false;
        };
        self.layers
            .layer_mut(entry.layer)
            .attach(entry.element, entry.z_index);
        self.marker_counter += entry.counter_delta;
        tracing::debug!(layer = ?entry.layer, "redo applied");
        true
    }

    pub fn undo_len(&self) -> usize {
        self.ledger.undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.ledger.redo_len()
    }
}
