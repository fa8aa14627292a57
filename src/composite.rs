//! Export pipeline.
//!
//! The final artifact is the cropped background with the pixelation layer and
//! then the annotation layer painted over it. Layers are rasterized straight
//! onto the output surface with a pure translation of their full-viewport
//! coordinates (the selection origin maps to surface (0,0)) and no rescaling
//! of content, so the result is pixel-identical at any device pixel ratio and
//! free of the double-offset errors that come from painting pre-clipped layer
//! snapshots.

use crate::geometry::{Point, Rect};
use crate::layer::LayerSet;
use crate::pixelate::PixelSource;
use crate::render;
use image::{imageops, Rgba, RgbaImage};

/// Neutral backdrop used where no capture pixels exist, either because the
/// screen grab failed or the selection reaches past the captured extent.
pub const PLACEHOLDER_COLOR: Rgba<u8> = Rgba([32, 32, 32, 255]);

/// Composites `selection` out of the session state at `scale` (device pixel
/// ratio). The output is sized exactly to the selection in physical pixels.
pub fn compose(
    background: Option<&RgbaImage>,
    layers: &LayerSet,
    source: &PixelSource,
    selection: Rect,
    scale: f32,
) -> RgbaImage {
    let phys = selection.scaled(scale);
    let out_w = phys.width.round().max(1.0) as u32;
    let out_h = phys.height.round().max(1.0) as u32;
    let phys_x = phys.x.round() as i64;
    let phys_y = phys.y.round() as i64;

    let mut surface = match background {
        Some(bg) => crop_background(bg, phys_x, phys_y, out_w, out_h),
        None => RgbaImage::from_pixel(out_w, out_h, PLACEHOLDER_COLOR),
    };

    let origin = Point::new(selection.x, selection.y);
    if !layers.pixelation.is_empty() {
        render::render_layer(&mut surface, &layers.pixelation, origin, scale, source);
    }
    render::render_layer(&mut surface, &layers.annotation, origin, scale, source);
    surface
}

/// Crops `background` to the physical rectangle, bounded by the capture's own
/// extent; uncovered output pixels keep the placeholder color.
fn crop_background(background: &RgbaImage, x: i64, y: i64, out_w: u32, out_h: u32) -> RgbaImage {
    let mut surface = RgbaImage::from_pixel(out_w, out_h, PLACEHOLDER_COLOR);

    let bg_w = background.width() as i64;
    let bg_h = background.height() as i64;
    let src_x = x.clamp(0, bg_w);
    let src_y = y.clamp(0, bg_h);
    let dst_x = (src_x - x).max(0);
    let dst_y = (src_y - y).max(0);
    let take_w = (bg_w - src_x).min(out_w as i64 - dst_x).max(0);
    let take_h = (bg_h - src_y).min(out_h as i64 - dst_y).max(0);
    if take_w == 0 || take_h == 0 {
        return surface;
    }

    let cropped = imageops::crop_imm(
        background,
        src_x as u32,
        src_y as u32,
        take_w as u32,
        take_h as u32,
    )
    .to_image();
    imageops::overlay(&mut surface, &cropped, dst_x, dst_y);
    surface
}

#[cfg(test)]
mod tests {
    use super::{compose, PLACEHOLDER_COLOR};
    use crate::geometry::{Point, Rect};
    use crate::layer::LayerSet;
    use crate::model::{Color, Element, Thickness};
    use crate::pixelate::PixelSource;
    use image::{Rgba, RgbaImage};

    fn checker_background(width: u32, height: u32) -> RgbaImage {
        let mut bg = RgbaImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                bg.put_pixel(x, y, Rgba([(x % 251) as u8, (y % 251) as u8, 7, 255]));
            }
        }
        bg
    }

    #[test]
    fn output_is_sized_to_the_selection_times_scale() {
        let bg = checker_background(800, 600);
        let source = PixelSource::render(&bg, 1.0);
        let layers = LayerSet::new();
        let selection = Rect::new(100.0, 100.0, 200.0, 150.0);

        let out = compose(Some(&bg), &layers, &source, selection, 1.0);
        assert_eq!(out.dimensions(), (200, 150));

        let out2 = compose(Some(&bg), &layers, &source, selection, 2.0);
        assert_eq!(out2.dimensions(), (400, 300));
    }

    #[test]
    fn background_pixels_map_one_to_one() {
        let bg = checker_background(400, 300);
        let source = PixelSource::render(&bg, 1.0);
        let layers = LayerSet::new();
        let selection = Rect::new(50.0, 40.0, 100.0, 80.0);

        let out = compose(Some(&bg), &layers, &source, selection, 1.0);
        // Output (20, 30) is capture (70, 70).
        assert_eq!(*out.get_pixel(20, 30), *bg.get_pixel(70, 70));
        assert_eq!(*out.get_pixel(0, 0), *bg.get_pixel(50, 40));
        assert_eq!(*out.get_pixel(99, 79), *bg.get_pixel(149, 119));
    }

    #[test]
    fn missing_background_composites_over_the_placeholder() {
        let placeholder_free = RgbaImage::from_pixel(64, 64, Rgba([1, 1, 1, 255]));
        let source = PixelSource::render(&placeholder_free, 1.0);
        let mut layers = LayerSet::new();
        layers.annotation.insert(Element::Rect {
            rect: Rect::new(12.0, 12.0, 8.0, 8.0),
            color: Color::Red,
            thickness: Thickness::Thin,
        });

        let out = compose(None, &layers, &source, Rect::new(10.0, 10.0, 20.0, 20.0), 1.0);
        assert_eq!(out.dimensions(), (20, 20));
        assert_eq!(*out.get_pixel(0, 0), PLACEHOLDER_COLOR);
        // The rectangle still renders, translated to (2,2)-(10,10).
        assert_eq!(*out.get_pixel(2, 5), Rgba(Color::Red.rgba()));
    }

    #[test]
    fn selection_past_the_capture_extent_falls_back_to_placeholder() {
        let bg = checker_background(100, 100);
        let source = PixelSource::render(&bg, 1.0);
        let layers = LayerSet::new();

        let out = compose(Some(&bg), &layers, &source, Rect::new(80.0, 80.0, 40.0, 40.0), 1.0);
        assert_eq!(out.dimensions(), (40, 40));
        assert_eq!(*out.get_pixel(0, 0), *bg.get_pixel(80, 80));
        assert_eq!(*out.get_pixel(25, 25), PLACEHOLDER_COLOR);
    }

    #[test]
    fn annotation_layer_paints_over_the_pixelation_layer() {
        let bg = RgbaImage::from_pixel(64, 64, Rgba([200, 200, 200, 255]));
        let source = PixelSource::render(&bg, 1.0);
        let mut layers = LayerSet::new();
        layers.pixelation.insert(Element::PixelStroke {
            points: vec![Point::new(16.0, 16.0), Point::new(48.0, 16.0)],
            width: 16.0,
        });
        layers.annotation.insert(Element::Rect {
            rect: Rect::new(10.0, 10.0, 44.0, 12.0),
            color: Color::Black,
            thickness: Thickness::Medium,
        });

        let out = compose(Some(&bg), &layers, &source, Rect::new(0.0, 0.0, 64.0, 64.0), 1.0);
        // A point on the rect's top edge wins over the mosaic beneath it.
        assert_eq!(*out.get_pixel(32, 10), Rgba(Color::Black.rgba()));
        // A mosaic-only point: uniform background keeps its color.
        assert_eq!(*out.get_pixel(32, 16), Rgba([200, 200, 200, 255]));
    }

    #[test]
    fn scale_two_doubles_annotation_placement() {
        let bg = checker_background(600, 500);
        let source = PixelSource::render(&bg, 2.0);
        let mut layers = LayerSet::new();
        layers.annotation.insert(Element::Rect {
            rect: Rect::new(120.0, 120.0, 80.0, 60.0),
            color: Color::Red,
            thickness: Thickness::Medium,
        });

        let selection = Rect::new(100.0, 100.0, 200.0, 150.0);
        let out = compose(Some(&bg), &layers, &source, selection, 2.0);
        assert_eq!(out.dimensions(), (400, 300));
        // Logical (120,120) lands at physical (40,40) in the output.
        let red = Rgba(Color::Red.rgba());
        assert_eq!(*out.get_pixel(100, 40), red);
        // Rect interior untouched: the background shows through.
        assert_eq!(*out.get_pixel(100, 100), *bg.get_pixel(300, 300));
    }
}
