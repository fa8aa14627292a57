//! Screen-capture boundary.
//!
//! The core consumes captures through a trait so OS backends stay with the
//! embedding application. All rectangles are logical units in viewport space:
//! (0,0) is the top-left of the virtual screen the provider covers.

use crate::geometry::Rect;
use anyhow::{bail, Result};
use image::RgbaImage;

pub trait ScreenCapture {
    /// Extent of the virtual screen in logical units, origin at (0,0).
    fn virtual_bounds(&self) -> Rect;

    /// Grabs `rect` as physical pixels. Implementations must reject requests
    /// with a non-positive width or height.
    fn capture_region(&mut self, rect: Rect) -> Result<RgbaImage>;
}

/// Shared argument check for capture providers.
pub fn ensure_capture_rect(rect: Rect) -> Result<()> {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        bail!(
            "capture region has no area: {}x{}",
            rect.width,
            rect.height
        );
    }
    Ok(())
}

/// Capture provider over one fixed frame, for tests and embeddings that
/// already hold a screenshot.
#[derive(Debug, Clone)]
pub struct StaticCapture {
    frame: RgbaImage,
    scale: f32,
}

impl StaticCapture {
    /// `frame` is physical pixels; `scale` the device pixel ratio mapping it
    /// to logical units.
    pub fn new(frame: RgbaImage, scale: f32) -> Self {
        Self { frame, scale }
    }
}

impl ScreenCapture for StaticCapture {
    fn virtual_bounds(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.frame.width() as f32 / self.scale,
            self.frame.height() as f32 / self.scale,
        )
    }

    fn capture_region(&mut self, rect: Rect) -> Result<RgbaImage> {
        ensure_capture_rect(rect)?;
        let phys = rect.scaled(self.scale);
        let x = (phys.x.round().max(0.0) as u32).min(self.frame.width());
        let y = (phys.y.round().max(0.0) as u32).min(self.frame.height());
        let w = (phys.width.round() as u32).min(self.frame.width() - x);
        let h = (phys.height.round() as u32).min(self.frame.height() - y);
        if w == 0 || h == 0 {
            bail!("capture region lies outside the frame");
        }
        Ok(image::imageops::crop_imm(&self.frame, x, y, w, h).to_image())
    }
}
