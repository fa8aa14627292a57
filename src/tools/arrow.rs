//! Arrow tool: drag from tail to tip. The triangular head is derived from the
//! segment direction at render time, so updating the element is just moving
//! its endpoint.

use super::AnnotationTool;
use crate::context::ToolContext;
use crate::geometry::Point;
use crate::layer::{ElementId, LayerKind};
use crate::model::{Element, ToolKind};

#[derive(Debug, Default)]
pub struct ArrowTool {
    active: Option<ElementId>,
}

impl ArrowTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnnotationTool for ArrowTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Arrow
    }

    fn on_mouse_down(&mut self, ctx: &mut ToolContext, pos: Point) {
        let start = ctx.clamp_to_bounds(pos);
        let style = ctx.style();
        let id = ctx.layers.annotation.insert(Element::Arrow {
            start,
            end: start,
            color: style.color,
            thickness: style.thickness,
        });
        self.active = Some(id);
    }

    fn on_mouse_move(&mut self, ctx: &mut ToolContext, pos: Point) {
        let Some(id) = self.active else {
            return;
        };
        let current = ctx.clamp_to_bounds(pos);
        if let Some(Element::Arrow { end, .. }) = ctx.layers.annotation.get_mut(id) {
            *end = current;
        }
    }

    fn on_mouse_up(&mut self, ctx: &mut ToolContext, _pos: Point) {
        if let Some(id) = self.active.take() {
            ctx.complete(LayerKind::Annotation, id, 0);
        }
    }

    fn cancel(&mut self, ctx: &mut ToolContext) {
        if let Some(id) = self.active.take() {
            ctx.layers.annotation.remove(id);
        }
    }

    fn on_deselected(&mut self, ctx: &mut ToolContext) {
        self.cancel(ctx);
    }

    fn is_drawing(&self) -> bool {
        self.active.is_some()
    }
}
