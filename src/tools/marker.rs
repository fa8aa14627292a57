//! Numbered markers: one click stamps a circular badge carrying the session
//! counter, which advances with every badge and rolls back through undo.

use super::AnnotationTool;
use crate::context::ToolContext;
use crate::geometry::Point;
use crate::layer::LayerKind;
use crate::model::{Element, ToolKind, MARKER_BADGE_SIZE};

#[derive(Debug, Default)]
pub struct MarkerTool {
    pressed: bool,
}

impl MarkerTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnnotationTool for MarkerTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Marker
    }

    fn on_mouse_down(&mut self, ctx: &mut ToolContext, pos: Point) {
        let bounds = ctx.bounds();
        let p = ctx.clamp_to_bounds(pos);
        // Keep the whole badge inside the selection.
        let origin = Point::new(
            p.x.min(bounds.right() - MARKER_BADGE_SIZE).max(bounds.x),
            p.y.min(bounds.bottom() - MARKER_BADGE_SIZE).max(bounds.y),
        );

        let number = ctx.advance_marker();
        let id = ctx.layers.annotation.insert(Element::Marker { origin, number });
        // The badge is complete at the press; its ledger entry carries the
        // counter step so undo and redo keep numbering consistent.
        ctx.complete(LayerKind::Annotation, id, 1);
        self.pressed = true;
    }

    fn on_mouse_move(&mut self, _ctx: &mut ToolContext, _pos: Point) {}

    fn on_mouse_up(&mut self, _ctx: &mut ToolContext, _pos: Point) {
        self.pressed = false;
    }

    fn cancel(&mut self, _ctx: &mut ToolContext) {
        self.pressed = false;
    }

    fn is_drawing(&self) -> bool {
        self.pressed
    }
}

#[cfg(test)]
mod tests {
    use super::MarkerTool;
    use crate::context::ToolContext;
    use crate::geometry::{Point, Rect};
    use crate::model::{Element, Style};
    use crate::pixelate::PixelSource;
    use crate::tools::AnnotationTool;
    use image::{Rgba, RgbaImage};

    fn context() -> ToolContext {
        let background = RgbaImage::from_pixel(200, 200, Rgba([0, 0, 0, 255]));
        ToolContext::new(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Style::default(),
            PixelSource::render(&background, 1.0),
        )
    }

    fn click(tool: &mut MarkerTool, ctx: &mut ToolContext, pos: Point) {
        tool.on_mouse_down(ctx, pos);
        tool.on_mouse_up(ctx, pos);
    }

    fn badge_numbers(ctx: &ToolContext) -> Vec<u32> {
        ctx.layers
            .annotation
            .visible()
            .filter_map(|e| match e {
                Element::Marker { number, .. } => Some(*number),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn clicks_stamp_sequential_badges() {
        let mut ctx = context();
        let mut tool = MarkerTool::new();
        click(&mut tool, &mut ctx, Point::new(10.0, 10.0));
        click(&mut tool, &mut ctx, Point::new(30.0, 30.0));
        click(&mut tool, &mut ctx, Point::new(50.0, 50.0));

        assert_eq!(badge_numbers(&ctx), vec![1, 2, 3]);
        assert_eq!(ctx.marker_number(), 4);
        assert_eq!(ctx.undo_len(), 3);
    }

    #[test]
    fn undo_rolls_the_number_back_for_the_next_badge() {
        let mut ctx = context();
        let mut tool = MarkerTool::new();
        click(&mut tool, &mut ctx, Point::new(10.0, 10.0));
        click(&mut tool, &mut ctx, Point::new(30.0, 30.0));
        click(&mut tool, &mut ctx, Point::new(50.0, 50.0));

        assert!(ctx.undo());
        assert_eq!(badge_numbers(&ctx), vec![1, 2]);
        // The next click reuses the rolled-back number.
        click(&mut tool, &mut ctx, Point::new(70.0, 70.0));
        assert_eq!(badge_numbers(&ctx), vec![1, 2, 3]);
    }

    #[test]
    fn badge_is_clamped_to_fit_inside_bounds() {
        let mut ctx = context();
        let mut tool = MarkerTool::new();
        click(&mut tool, &mut ctx, Point::new(99.0, 99.0));

        let origin = ctx
            .layers
            .annotation
            .visible()
            .find_map(|e| match e {
                Element::Marker { origin, .. } => Some(*origin),
                _ => None,
            })
            .expect("badge");
        assert_eq!(origin, Point::new(76.0, 76.0));
    }
}
