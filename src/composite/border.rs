use image::{Rgb, RgbImage};

use crate::color::codec::unpack_slice;
use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{BorderError, BorderResult};
use crate::sequence::descriptor::{EdgeColors, FrameDescriptor};

/// Output of [`composite_frame`].
#[derive(Clone, Debug)]
pub struct Composited {
    pub image: RgbImage,
    /// Distinct border locations written.
    pub pixels_applied: usize,
}

/// True when `(x, y)` is inside the raster and on its outer rectangle.
#[inline]
pub fn is_border_pixel(x: i64, y: i64, width: u32, height: u32) -> bool {
    let (w, h) = (i64::from(width), i64::from(height));
    let inside = (0..w).contains(&x) && (0..h).contains(&y);
    inside && (x == 0 || x == w - 1 || y == 0 || y == h - 1)
}

/// Take ownership of `image`, overlay `desc`, and hand the image back with the applied count.
pub fn composite_frame(mut image: RgbImage, desc: &FrameDescriptor) -> BorderResult<Composited> {
    let pixels_applied = apply_border(&mut image, desc)?;
    Ok(Composited {
        image,
        pixels_applied,
    })
}

/// Overlay border colors in place and return the number of distinct pixels written.
///
/// Off-border and out-of-range locations are skipped silently. Edge arrays are written in the
/// order `top, bottom, left, right`; the later edge wins at shared corners.
pub fn apply_border(image: &mut RgbImage, desc: &FrameDescriptor) -> BorderResult<usize> {
    let (width, height) = image.dimensions();
    let mut written = PerimeterMask::new(width, height);

    match desc {
        FrameDescriptor::Pixels(pixels) => {
            for p in pixels {
                let (x, y) = (i64::from(p.x), i64::from(p.y));
                if !is_border_pixel(x, y, width, height) {
                    continue;
                }
                image.put_pixel(p.x, p.y, Rgb([p.r, p.g, p.b]));
                written.mark(p.x, p.y);
            }
        }
        FrameDescriptor::Edges(edges) => {
            check_edge_shape(edges, width, height)?;
            let top = unpack_slice(&edges.top);
            let bottom = unpack_slice(&edges.bottom);
            let left = unpack_slice(&edges.left);
            let right = unpack_slice(&edges.right);

            let last_x = width.saturating_sub(1);
            let last_y = height.saturating_sub(1);
            write_run(image, &mut written, &top, |i| (i, 0));
            write_run(image, &mut written, &bottom, |i| (i, last_y));
            write_run(image, &mut written, &left, |i| (0, i));
            write_run(image, &mut written, &right, |i| (last_x, i));
        }
    }

    Ok(written.count())
}

fn check_edge_shape(edges: &EdgeColors, width: u32, height: u32) -> BorderResult<()> {
    let w = width as usize;
    let h = height as usize;
    if edges.top.len() != w
        || edges.bottom.len() != w
        || edges.left.len() != h
        || edges.right.len() != h
    {
        return Err(BorderError::frame_shape_mismatch(format!(
            "image is {width}x{height} but edges are top={} bottom={} left={} right={}",
            edges.top.len(),
            edges.bottom.len(),
            edges.left.len(),
            edges.right.len()
        )));
    }
    Ok(())
}

fn write_run(
    image: &mut RgbImage,
    written: &mut PerimeterMask,
    colors: &[Rgb8],
    at: impl Fn(u32) -> (u32, u32),
) {
    let (width, height) = image.dimensions();
    for (i, c) in colors.iter().enumerate() {
        let Ok(i) = u32::try_from(i) else {
            break;
        };
        let (x, y) = at(i);
        if !is_border_pixel(i64::from(x), i64::from(y), width, height) {
            continue;
        }
        image.put_pixel(x, y, Rgb(c.to_array()));
        written.mark(x, y);
    }
}

/// One bit per border location, so repeated writes to a pixel count once.
struct PerimeterMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
    count: usize,
}

impl PerimeterMask {
    fn new(width: u32, height: u32) -> Self {
        let len = if width == 0 || height == 0 {
            0
        } else {
            2 * width as usize + 2 * (height as usize).saturating_sub(2)
        };
        Self {
            width,
            height,
            bits: vec![false; len],
            count: 0,
        }
    }

    /// Caller guarantees `(x, y)` is a border pixel.
    fn slot(&self, x: u32, y: u32) -> usize {
        let (w, h) = (self.width as usize, self.height as usize);
        let (x, y) = (x as usize, y as usize);
        if y == 0 {
            x
        } else if y == h - 1 {
            w + x
        } else if x == 0 {
            2 * w + (y - 1)
        } else {
            2 * w + (h - 2) + (y - 1)
        }
    }

    fn mark(&mut self, x: u32, y: u32) {
        let slot = self.slot(x, y);
        if let Some(bit) = self.bits.get_mut(slot) {
            if !*bit {
                *bit = true;
                self.count += 1;
            }
        }
    }

    fn count(&self) -> usize {
        self.count
    }
}

/// Solid raster used when generating frames without a source image.
pub fn blank_canvas(canvas: Canvas, background: Rgb8) -> RgbImage {
    RgbImage::from_pixel(canvas.width, canvas.height, Rgb(background.to_array()))
}

#[cfg(test)]
#[path = "../../tests/unit/composite/border.rs"]
mod tests;
