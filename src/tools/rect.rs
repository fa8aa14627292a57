//! Rectangle tool: drag out a stroked rectangle in any direction.

use super::AnnotationTool;
use crate::context::ToolContext;
use crate::geometry::{Point, Rect};
use crate::layer::{ElementId, LayerKind};
use crate::model::{Element, ToolKind};

#[derive(Debug, Default)]
pub struct RectTool {
    start: Option<Point>,
    active: Option<ElementId>,
}

impl RectTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnnotationTool for RectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Rect
    }

    fn on_mouse_down(&mut self, ctx: &mut ToolContext, pos: Point) {
        let start = ctx.clamp_to_bounds(pos);
        let style = ctx.style();
        let id = ctx.layers.annotation.insert(Element::Rect {
            rect: Rect::new(start.x, start.y, 0.0, 0.0),
            color: style.color,
            thickness: style.thickness,
        });
        self.start = Some(start);
        self.active = Some(id);
    }

    fn on_mouse_move(&mut self, ctx: &mut ToolContext, pos: Point) {
        let (Some(start), Some(id)) = (self.start, self.active) else {
            return;
        };
        let current = ctx.clamp_to_bounds(pos);
        let shape = ctx.clamp_rect_to_bounds(Rect::from_corners(start, current));
        if let Some(Element::Rect { rect, .. }) = ctx.layers.annotation.get_mut(id) {
            *rect = shape;
        }
    }

    fn on_mouse_up(&mut self, ctx: &mut ToolContext, _pos: Point) {
        if let Some(id) = self.active.take() {
            ctx.complete(LayerKind::Annotation, id, 0);
        }
        self.start = None;
    }

    fn cancel(&mut self, ctx: &mut ToolContext) {
        if let Some(id) = self.active.take() {
            ctx.layers.annotation.remove(id);
        }
        self.start = None;
    }

    fn on_deselected(&mut self, ctx: &mut ToolContext) {
        self.cancel(ctx);
    }

    fn is_drawing(&self) -> bool {
        self.active.is_some()
    }
}
