//! Pre-rendered pixelation source.
//!
//! The freehand pixelation tool paints with a mosaic of the captured
//! background rather than a flat color. The mosaic is produced once per locked
//! session by averaging the capture over a fixed cell grid, then sampled at
//! absolute physical coordinates while strokes are rasterized, so overlapping
//! strokes stay seamless.

use image::{Rgba, RgbaImage};

/// Mosaic cell size in logical units. Stroke thickness only changes the trail
/// width; the cell grid of the paint stays fixed for the whole session.
pub const CELL_SIZE: f32 = 16.0;

#[derive(Debug, Clone)]
pub struct PixelSource {
    image: RgbaImage,
}

impl PixelSource {
    /// Pre-renders the mosaic for `background`. `scale` is the device pixel
    /// ratio, so one cell covers [`CELL_SIZE`] logical units of the capture.
    pub fn render(background: &RgbaImage, scale: f32) -> Self {
        let cell = (CELL_SIZE * scale).round().max(1.0) as u32;
        Self {
            image: average_blocks(background, cell),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Mosaic color at an absolute physical pixel, if inside the capture.
    pub fn sample(&self, x: i64, y: i64) -> Option<Rgba<u8>> {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return None;
        }
        Some(*self.image.get_pixel(x as u32, y as u32))
    }
}

/// Replaces each `cell`-sized block with its mean color. Blocks at the right
/// and bottom edges may be partial and average over fewer pixels.
fn average_blocks(source: &RgbaImage, cell: u32) -> RgbaImage {
    let (width, height) = source.dimensions();
    let mut out = RgbaImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }
    let cell = cell.max(1);

    let mut block_y = 0;
    while block_y < height {
        let block_h = cell.min(height - block_y);
        let mut block_x = 0;
        while block_x < width {
            let block_w = cell.min(width - block_x);

            let mut sum = [0u64; 4];
            for y in block_y..block_y + block_h {
                for x in block_x..block_x + block_w {
                    let pixel = source.get_pixel(x, y);
                    for (acc, channel) in sum.iter_mut().zip(pixel.0.iter()) {
                        *acc += u64::from(*channel);
                    }
                }
            }
            let count = u64::from(block_w) * u64::from(block_h);
            let mean = Rgba([
                (sum[0] / count) as u8,
                (sum[1] / count) as u8,
                (sum[2] / count) as u8,
                (sum[3] / count) as u8,
            ]);

            for y in block_y..block_y + block_h {
                for x in block_x..block_x + block_w {
                    out.put_pixel(x, y, mean);
                }
            }
            block_x += cell;
        }
        block_y += cell;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{average_blocks, PixelSource};
    use image::{Rgba, RgbaImage};

    #[test]
    fn uniform_background_is_unchanged() {
        let background = RgbaImage::from_pixel(32, 32, Rgba([10, 20, 30, 255]));
        let source = PixelSource::render(&background, 1.0);
        assert_eq!(source.sample(0, 0), Some(Rgba([10, 20, 30, 255])));
        assert_eq!(source.sample(31, 31), Some(Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn cells_average_their_pixels() {
        // Left half red, right half blue; 16px cells split exactly in two.
        let mut background = RgbaImage::new(32, 16);
        for y in 0..16 {
            for x in 0..32 {
                let color = if x < 16 {
                    Rgba([200, 0, 0, 255])
                } else {
                    Rgba([0, 0, 200, 255])
                };
                background.put_pixel(x, y, color);
            }
        }

        let source = PixelSource::render(&background, 1.0);
        assert_eq!(source.sample(3, 3), Some(Rgba([200, 0, 0, 255])));
        assert_eq!(source.sample(15, 8), Some(Rgba([200, 0, 0, 255])));
        assert_eq!(source.sample(16, 8), Some(Rgba([0, 0, 200, 255])));
        assert_eq!(source.sample(31, 15), Some(Rgba([0, 0, 200, 255])));
    }

    #[test]
    fn mixed_cell_uses_the_mean() {
        // One 2px cell over one black and one white pixel per row.
        let mut background = RgbaImage::new(2, 2);
        background.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        background.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
        background.put_pixel(0, 1, Rgba([0, 0, 0, 255]));
        background.put_pixel(1, 1, Rgba([255, 255, 255, 255]));

        let averaged = average_blocks(&background, 2);
        let expected = Rgba([127, 127, 127, 255]);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(*averaged.get_pixel(x, y), expected);
            }
        }
    }

    #[test]
    fn partial_edge_blocks_average_fewer_pixels() {
        // 3px wide with 2px cells: the last column is its own block.
        let mut background = RgbaImage::new(3, 1);
        background.put_pixel(0, 0, Rgba([10, 10, 10, 255]));
        background.put_pixel(1, 0, Rgba([30, 30, 30, 255]));
        background.put_pixel(2, 0, Rgba([90, 90, 90, 255]));

        let averaged = average_blocks(&background, 2);
        assert_eq!(*averaged.get_pixel(0, 0), Rgba([20, 20, 20, 255]));
        assert_eq!(*averaged.get_pixel(1, 0), Rgba([20, 20, 20, 255]));
        assert_eq!(*averaged.get_pixel(2, 0), Rgba([90, 90, 90, 255]));
    }

    #[test]
    fn samples_outside_the_capture_are_none() {
        let background = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]));
        let source = PixelSource::render(&background, 1.0);
        assert_eq!(source.sample(-1, 0), None);
        assert_eq!(source.sample(8, 0), None);
        assert_eq!(source.sample(0, 8), None);
    }
}
