//! CPU rasterization of annotation elements.
//!
//! Elements live in logical viewport coordinates; rendering maps them onto a
//! physical-pixel surface whose origin is the selection's top-left, scaling by
//! the device pixel ratio. Strokes are stamped circular brushes along stepped
//! segments, which gives the round caps and joins the overlay shows.

use crate::geometry::Point;
use crate::layer::Layer;
use crate::model::{Color, Element, MARKER_BADGE_SIZE, TEXT_FONT_SIZE};
use crate::pixelate::PixelSource;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

/// Badge label size in logical units, kept smaller than the badge itself.
const MARKER_FONT_SIZE: f32 = 12.0;

/// Paints every attached element of `layer` onto `surface`. `origin` is the
/// selection's logical top-left (it maps to surface (0,0)); `scale` the device
/// pixel ratio. Pixelation strokes sample `source` at absolute physical
/// coordinates, so overlapping strokes produce one seamless mosaic.
pub fn render_layer(
    surface: &mut RgbaImage,
    layer: &Layer,
    origin: Point,
    scale: f32,
    source: &PixelSource,
) {
    for element in layer.visible() {
        render_element(surface, element, origin, scale, source);
    }
}

fn render_element(
    surface: &mut RgbaImage,
    element: &Element,
    origin: Point,
    scale: f32,
    source: &PixelSource,
) {
    let map = |p: Point| ((p.x - origin.x) * scale, (p.y - origin.y) * scale);
    match element {
        Element::Rect {
            rect,
            color,
            thickness,
        } => {
            let (x0, y0) = map(Point::new(rect.x, rect.y));
            let (x1, y1) = map(Point::new(rect.right(), rect.bottom()));
            draw_rect_outline(
                surface,
                x0,
                y0,
                x1,
                y1,
                rgba(*color),
                thickness.stroke_width() * scale,
            );
        }
        Element::Arrow {
            start,
            end,
            color,
            thickness,
        } => {
            let (x0, y0) = map(*start);
            let (x1, y1) = map(*end);
            draw_arrow(
                surface,
                x0,
                y0,
                x1,
                y1,
                rgba(*color),
                thickness.stroke_width() * scale,
            );
        }
        Element::PixelStroke { points, width } => {
            let radius = width * scale / 2.0;
            let offset = (origin.x * scale, origin.y * scale);
            let mapped: Vec<(f32, f32)> = points.iter().map(|p| map(*p)).collect();
            if let Some(first) = mapped.first() {
                stamp_source_disc(surface, first.0, first.1, radius, source, offset);
            }
            for pair in mapped.windows(2) {
                stamp_source_segment(surface, pair[0], pair[1], radius, source, offset);
            }
        }
        Element::Text {
            origin: pos,
            content,
            color,
        } => {
            let (x, y) = map(*pos);
            let glyph_scale = ((TEXT_FONT_SIZE * scale) / 8.0).round().max(1.0) as u32;
            draw_glyph_text(surface, x, y, content, rgba(*color), glyph_scale);
        }
        Element::Marker {
            origin: pos,
            number,
        } => {
            let (x, y) = map(*pos);
            let radius = MARKER_BADGE_SIZE * scale / 2.0;
            let cx = x + radius;
            let cy = y + radius;
            draw_disc(surface, cx, cy, radius, rgba(Color::Blue));

            let label = number.to_string();
            let glyph_scale = (((MARKER_FONT_SIZE * scale) / 8.0).floor() as u32).max(1);
            let text_w = (label.chars().count() as u32 * 8 * glyph_scale) as f32;
            let text_h = (8 * glyph_scale) as f32;
            draw_glyph_text(
                surface,
                cx - text_w / 2.0,
                cy - text_h / 2.0,
                &label,
                Rgba([255, 255, 255, 255]),
                glyph_scale,
            );
        }
    }
}

fn rgba(color: Color) -> Rgba<u8> {
    Rgba(color.rgba())
}

/// Source-over blend of one pixel, skipping coordinates off the surface.
pub fn blend_pixel(surface: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= surface.width() as i64 || y >= surface.height() as i64 {
        return;
    }
    let px = surface.get_pixel_mut(x as u32, y as u32);
    let dst = px.0;
    let src = color.0;
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        px.0 = [0, 0, 0, 0];
        return;
    }
    let blend =
        |s: u8, d: u8| (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a).round() as u8;
    px.0 = [
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ];
}

/// Filled disc. Pixels are tested at their integer coordinate so a half-unit
/// radius still covers the pixel under the center, keeping 1-unit strokes
/// visible.
pub fn draw_disc(surface: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let r = radius.max(0.5);
    let min_x = (cx - r).floor() as i64;
    let max_x = (cx + r).ceil() as i64;
    let min_y = (cy - r).floor() as i64;
    let max_y = (cy + r).ceil() as i64;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= r * r {
                blend_pixel(surface, x, y, color);
            }
        }
    }
}

/// Thick segment as discs stamped along the longer axis.
pub fn draw_segment(
    surface: &mut RgbaImage,
    from: (f32, f32),
    to: (f32, f32),
    color: Rgba<u8>,
    width: f32,
) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let steps = dx.abs().max(dy.abs()).ceil() as i32;
    if steps == 0 {
        draw_disc(surface, from.0, from.1, width / 2.0, color);
        return;
    }
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        draw_disc(surface, from.0 + dx * t, from.1 + dy * t, width / 2.0, color);
    }
}

pub fn draw_rect_outline(
    surface: &mut RgbaImage,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    color: Rgba<u8>,
    width: f32,
) {
    let (left, right) = (x0.min(x1), x0.max(x1));
    let (top, bottom) = (y0.min(y1), y0.max(y1));
    draw_segment(surface, (left, top), (right, top), color, width);
    draw_segment(surface, (right, top), (right, bottom), color, width);
    draw_segment(surface, (right, bottom), (left, bottom), color, width);
    draw_segment(surface, (left, bottom), (left, top), color, width);
}

fn rotate_vec(v: (f32, f32), angle: f32) -> (f32, f32) {
    let (sin, cos) = angle.sin_cos();
    (v.0 * cos - v.1 * sin, v.0 * sin + v.1 * cos)
}

/// Shaft plus a filled triangular head at the tip. Head length grows with the
/// stroke width; half-angle is fixed at 30 degrees.
pub fn draw_arrow(
    surface: &mut RgbaImage,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    color: Rgba<u8>,
    width: f32,
) {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len = (dx * dx + dy * dy).sqrt();
    if len < f32::EPSILON {
        draw_disc(surface, x0, y0, width / 2.0, color);
        return;
    }
    draw_segment(surface, (x0, y0), (x1, y1), color, width);

    let head_len = 8.0 + width * 2.0;
    let unit = (dx / len, dy / len);
    let angle = 30f32.to_radians();
    let left_dir = rotate_vec(unit, angle);
    let right_dir = rotate_vec(unit, -angle);
    let left = (x1 - left_dir.0 * head_len, y1 - left_dir.1 * head_len);
    let right = (x1 - right_dir.0 * head_len, y1 - right_dir.1 * head_len);
    fill_triangle(surface, (x1, y1), left, right, color);
}

/// Filled triangle via a sign test of the three edge functions.
pub fn fill_triangle(
    surface: &mut RgbaImage,
    a: (f32, f32),
    b: (f32, f32),
    c: (f32, f32),
    color: Rgba<u8>,
) {
    let min_x = a.0.min(b.0).min(c.0).floor() as i64;
    let max_x = a.0.max(b.0).max(c.0).ceil() as i64;
    let min_y = a.1.min(b.1).min(c.1).floor() as i64;
    let max_y = a.1.max(b.1).max(c.1).ceil() as i64;

    let edge = |p: (f32, f32), q: (f32, f32), r: (f32, f32)| {
        (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    };
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = (x as f32, y as f32);
            let d0 = edge(a, b, p);
            let d1 = edge(b, c, p);
            let d2 = edge(c, a, p);
            let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
            let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
            if !(has_neg && has_pos) {
                blend_pixel(surface, x, y, color);
            }
        }
    }
}

/// Bitmap-font text run. `glyph_scale` multiplies the 8x8 base glyphs;
/// characters outside the basic table fall back to '?'.
pub fn draw_glyph_text(
    surface: &mut RgbaImage,
    x: f32,
    y: f32,
    text: &str,
    color: Rgba<u8>,
    glyph_scale: u32,
) {
    let scale = glyph_scale.max(1) as i64;
    let origin_x = x.round() as i64;
    let origin_y = y.round() as i64;
    let mut cursor_x = origin_x;
    for ch in text.chars() {
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'));
        let Some(glyph) = glyph else {
            cursor_x += 8 * scale;
            continue;
        };
        for (row_idx, row) in glyph.iter().enumerate() {
            let bits = *row;
            for col_idx in 0..8i64 {
                if (bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * scale;
                let py = origin_y + row_idx as i64 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        blend_pixel(surface, px + sx, py + sy, color);
                    }
                }
            }
        }
        cursor_x += 8 * scale;
    }
}

/// Disc filled from the mosaic source instead of a flat color. `offset` maps
/// surface pixels back to absolute physical capture coordinates.
fn stamp_source_disc(
    surface: &mut RgbaImage,
    cx: f32,
    cy: f32,
    radius: f32,
    source: &PixelSource,
    offset: (f32, f32),
) {
    let r = radius.max(0.5);
    let min_x = (cx - r).floor() as i64;
    let max_x = (cx + r).ceil() as i64;
    let min_y = (cy - r).floor() as i64;
    let max_y = (cy + r).ceil() as i64;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let sx = (x as f32 + offset.0).round() as i64;
            let sy = (y as f32 + offset.1).round() as i64;
            if let Some(color) = source.sample(sx, sy) {
                blend_pixel(surface, x, y, color);
            }
        }
    }
}

fn stamp_source_segment(
    surface: &mut RgbaImage,
    from: (f32, f32),
    to: (f32, f32),
    radius: f32,
    source: &PixelSource,
    offset: (f32, f32),
) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let steps = dx.abs().max(dy.abs()).ceil() as i32;
    if steps == 0 {
        stamp_source_disc(surface, from.0, from.1, radius, source, offset);
        return;
    }
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        stamp_source_disc(
            surface,
            from.0 + dx * t,
            from.1 + dy * t,
            radius,
            source,
            offset,
        );
    }
}
