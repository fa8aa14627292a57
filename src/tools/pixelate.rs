//! Freehand pixelation: a trajectory on the pixelation layer, painted with the
//! pre-rendered mosaic of the capture instead of a flat color.

use super::AnnotationTool;
use crate::context::ToolContext;
use crate::geometry::Point;
use crate::layer::{ElementId, LayerKind};
use crate::model::{Element, ToolKind};

#[derive(Debug, Default)]
pub struct PixelateTool {
    active: Option<ElementId>,
}

impl PixelateTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnnotationTool for PixelateTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pixelate
    }

    fn on_mouse_down(&mut self, ctx: &mut ToolContext, pos: Point) {
        let width = ctx.style().thickness.block_size();
        let id = ctx.layers.pixelation.insert(Element::PixelStroke {
            points: vec![pos],
            width,
        });
        self.active = Some(id);
    }

    fn on_mouse_move(&mut self, ctx: &mut ToolContext, pos: Point) {
        let Some(id) = self.active else {
            return;
        };
        // Every visited point is kept so the mosaic trail follows the pointer
        // exactly; the stroke is too wide for thinning to go unnoticed.
        if let Some(Element::PixelStroke { points, .. }) = ctx.layers.pixelation.get_mut(id) {
            points.push(pos);
        }
    }

    fn on_mouse_up(&mut self, ctx: &mut ToolContext, _pos: Point) {
        if let Some(id) = self.active.take() {
            ctx.complete(LayerKind::Pixelation, id, 0);
        }
    }

    fn cancel(&mut self, ctx: &mut ToolContext) {
        if let Some(id) = self.active.take() {
            ctx.layers.pixelation.remove(id);
        }
    }

    fn on_deselected(&mut self, ctx: &mut ToolContext) {
        self.cancel(ctx);
    }

    fn is_drawing(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::PixelateTool;
    use crate::context::ToolContext;
    use crate::geometry::{Point, Rect};
    use crate::model::{Element, Style, Thickness};
    use crate::pixelate::PixelSource;
    use crate::tools::AnnotationTool;
    use image::{Rgba, RgbaImage};

    fn context() -> ToolContext {
        let background = RgbaImage::from_pixel(200, 200, Rgba([0, 0, 0, 255]));
        ToolContext::new(
            Rect::new(0.0, 0.0, 200.0, 200.0),
            Style::default(),
            PixelSource::render(&background, 1.0),
        )
    }

    fn only_stroke(ctx: &ToolContext) -> (Vec<Point>, f32) {
        let mut strokes = ctx.layers.pixelation.visible().filter_map(|e| match e {
            Element::PixelStroke { points, width } => Some((points.clone(), *width)),
            _ => None,
        });
        let stroke = strokes.next().expect("one stroke");
        assert!(strokes.next().is_none());
        stroke
    }

    #[test]
    fn every_move_point_is_appended() {
        let mut ctx = context();
        let mut tool = PixelateTool::new();
        tool.on_mouse_down(&mut ctx, Point::new(10.0, 10.0));
        // Nearby points must not be thinned away.
        tool.on_mouse_move(&mut ctx, Point::new(10.5, 10.0));
        tool.on_mouse_move(&mut ctx, Point::new(11.0, 10.5));
        tool.on_mouse_move(&mut ctx, Point::new(11.0, 11.0));
        tool.on_mouse_up(&mut ctx, Point::new(11.0, 11.0));

        let (points, _) = only_stroke(&ctx);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], Point::new(10.0, 10.0));
        assert_eq!(points[3], Point::new(11.0, 11.0));
        assert_eq!(ctx.undo_len(), 1);
    }

    #[test]
    fn stroke_width_follows_the_block_size_mapping() {
        for (thickness, expected) in [
            (Thickness::Thin, 8.0),
            (Thickness::Medium, 16.0),
            (Thickness::Thick, 32.0),
        ] {
            let mut ctx = context();
            ctx.update_style(Style {
                thickness,
                ..Style::default()
            });
            let mut tool = PixelateTool::new();
            tool.on_mouse_down(&mut ctx, Point::new(5.0, 5.0));
            tool.on_mouse_up(&mut ctx, Point::new(5.0, 5.0));

            let (_, width) = only_stroke(&ctx);
            assert_eq!(width, expected);
        }
    }

    #[test]
    fn cancel_discards_the_trail() {
        let mut ctx = context();
        let mut tool = PixelateTool::new();
        tool.on_mouse_down(&mut ctx, Point::new(5.0, 5.0));
        tool.on_mouse_move(&mut ctx, Point::new(50.0, 50.0));
        tool.cancel(&mut ctx);

        assert!(ctx.layers.pixelation.is_empty());
        assert_eq!(ctx.undo_len(), 0);
    }
}
