//! Annotation tool framework.
//!
//! Every tool runs the same finite lifecycle: `on_selected` → zero or more
//! mouse-down/move/up cycles → `on_deselected`, with `cancel` aborting a cycle
//! in progress. A tool that finishes one discrete annotation registers it with
//! the ledger through [`ToolContext::complete`]. The set is closed: exactly
//! five variants behind [`create`], no plugin loading.

mod arrow;
mod marker;
mod pixelate;
mod rect;
mod text;

pub use arrow::ArrowTool;
pub use marker::MarkerTool;
pub use pixelate::PixelateTool;
pub use rect::RectTool;
pub use text::TextTool;

use crate::context::ToolContext;
use crate::geometry::Point;
use crate::model::ToolKind;

/// Edit operations for the in-place text editor. Tools without one ignore
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit {
    Insert(char),
    Backspace,
    Commit,
}

pub trait AnnotationTool {
    fn kind(&self) -> ToolKind;

    /// The user activated this tool.
    fn on_selected(&mut self, _ctx: &mut ToolContext) {}

    /// Primary button pressed inside the selection. `pos` arrives pre-clamped
    /// to the selection bounds; tools with a larger footprint re-clamp so the
    /// whole element fits.
    fn on_mouse_down(&mut self, ctx: &mut ToolContext, pos: Point);

    fn on_mouse_move(&mut self, ctx: &mut ToolContext, pos: Point);

    fn on_mouse_up(&mut self, ctx: &mut ToolContext, pos: Point);

    /// Aborts the cycle in progress and removes any partial element. Nothing
    /// reaches the ledger.
    fn cancel(&mut self, ctx: &mut ToolContext);

    /// The user switched away. Drag tools abort the stroke in progress;
    /// pending text commits instead, matching the focus-loss behavior of the
    /// overlay's edit box.
    fn on_deselected(&mut self, _ctx: &mut ToolContext) {}

    /// True while a mouse-down cycle is open. The session keeps pointer
    /// capture and routes secondary-button cancels to the stroke while this
    /// holds.
    fn is_drawing(&self) -> bool;

    /// Keyboard traffic for the in-place text editor.
    fn on_text_edit(&mut self, _ctx: &mut ToolContext, _edit: TextEdit) {}
}

/// Maps a tool kind to a fresh instance.
pub fn create(kind: ToolKind) -> Box<dyn AnnotationTool> {
    match kind {
        ToolKind::Rect => Box::new(RectTool::new()),
        ToolKind::Arrow => Box::new(ArrowTool::new()),
        ToolKind::Pixelate => Box::new(PixelateTool::new()),
        ToolKind::Text => Box::new(TextTool::new()),
        ToolKind::Marker => Box::new(MarkerTool::new()),
    }
}
