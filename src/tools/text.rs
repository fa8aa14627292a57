//! Text tool: click to open an in-place editor, commit to a static text run.
//!
//! The overlay's focused edit box is modeled as a pending buffer fed through
//! [`TextEdit`] events. Committing an empty or whitespace-only buffer discards
//! it without touching the ledger; clicking elsewhere commits the previous
//! buffer first, like the original edit box losing focus.

use super::{AnnotationTool, TextEdit};
use crate::context::ToolContext;
use crate::geometry::Point;
use crate::layer::LayerKind;
use crate::model::{Element, ToolKind, TEXT_RESERVE_HEIGHT, TEXT_RESERVE_WIDTH};

#[derive(Debug)]
struct PendingText {
    origin: Point,
    buffer: String,
}

#[derive(Debug, Default)]
pub struct TextTool {
    pending: Option<PendingText>,
    pressed: bool,
}

impl TextTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open buffer content, if an editor is active.
    pub fn pending_text(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.buffer.as_str())
    }

    fn commit(&mut self, ctx: &mut ToolContext) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if pending.buffer.trim().is_empty() {
            return;
        }
        let color = ctx.style().color;
        let id = ctx.layers.annotation.insert(Element::Text {
            origin: pending.origin,
            content: pending.buffer,
            color,
        });
        ctx.complete(LayerKind::Annotation, id, 0);
    }
}

impl AnnotationTool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn on_mouse_down(&mut self, ctx: &mut ToolContext, pos: Point) {
        // A click while editing commits the open buffer first.
        self.commit(ctx);

        let bounds = ctx.bounds();
        let p = ctx.clamp_to_bounds(pos);
        // Reserve the editor footprint so the box opens fully inside bounds.
        let origin = Point::new(
            p.x.min(bounds.right() - TEXT_RESERVE_WIDTH).max(bounds.x),
            p.y.min(bounds.bottom() - TEXT_RESERVE_HEIGHT).max(bounds.y),
        );
        self.pending = Some(PendingText {
            origin,
            buffer: String::new(),
        });
        self.pressed = true;
    }

    fn on_mouse_move(&mut self, _ctx: &mut ToolContext, _pos: Point) {}

    fn on_mouse_up(&mut self, _ctx: &mut ToolContext, _pos: Point) {
        self.pressed = false;
    }

    fn cancel(&mut self, _ctx: &mut ToolContext) {
        self.pending = None;
        self.pressed = false;
    }

    fn on_deselected(&mut self, ctx: &mut ToolContext) {
        self.commit(ctx);
    }

    fn is_drawing(&self) -> bool {
        self.pressed
    }

    fn on_text_edit(&mut self, ctx: &mut ToolContext, edit: TextEdit) {
        match edit {
            TextEdit::Insert(ch) => {
                if let Some(pending) = self.pending.as_mut() {
                    if !ch.is_control() {
                        pending.buffer.push(ch);
                    }
                }
            }
            TextEdit::Backspace => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.buffer.pop();
                }
            }
            TextEdit::Commit => self.commit(ctx),
        }
    }
}
