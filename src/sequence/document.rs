//! Border document writer and sample sequence builders.

use std::fmt::Write as _;
use std::path::Path;

use crate::color::codec::pack;
use crate::foundation::core::{Canvas, FrameIndex, Rgb8};
use crate::foundation::error::{BorderError, BorderResult};
use crate::sequence::descriptor::{BorderPixel, EdgeColors, FrameDescriptor, SequenceDescriptor};

/// Serialize frames in ascending frame order. Invalid frames are not written.
pub fn write_sequence_xml(seq: &SequenceDescriptor) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version='1.0' encoding='utf-8'?>\n");
    xml.push_str("<image_sequence>\n");

    for (number, desc) in seq.frames() {
        match desc.as_ref() {
            FrameDescriptor::Pixels(pixels) if pixels.is_empty() => {
                let _ = writeln!(xml, "  <frame number=\"{number}\" />");
            }
            FrameDescriptor::Pixels(pixels) => {
                let _ = writeln!(xml, "  <frame number=\"{number}\">");
                for p in pixels {
                    let _ = writeln!(
                        xml,
                        "    <pixel x=\"{}\" y=\"{}\" r=\"{}\" g=\"{}\" b=\"{}\" />",
                        p.x, p.y, p.r, p.g, p.b
                    );
                }
                xml.push_str("  </frame>\n");
            }
            FrameDescriptor::Edges(edges) => {
                let _ = writeln!(xml, "  <frame number=\"{number}\">");
                for (name, values) in [
                    ("left", &edges.left),
                    ("right", &edges.right),
                    ("top", &edges.top),
                    ("bottom", &edges.bottom),
                ] {
                    let _ = writeln!(xml, "    <{name}>{}</{name}>", join_u32(values));
                }
                xml.push_str("  </frame>\n");
            }
        }
    }

    xml.push_str("</image_sequence>\n");
    xml
}

/// Write [`write_sequence_xml`] output to `path`, creating the parent directory.
pub fn save_sequence_xml(seq: &SequenceDescriptor, path: &Path) -> BorderResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            BorderError::directory_creation(format!("create '{}': {e}", parent.display()))
        })?;
    }
    std::fs::write(path, write_sequence_xml(seq))
        .map_err(|e| anyhow::anyhow!("write border document '{}': {e}", path.display()))?;
    Ok(())
}

fn join_u32(values: &[u32]) -> String {
    let mut out = String::with_capacity(values.len() * 9);
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{v}");
    }
    out
}

/// Pixel-variant sample: animated corner colors plus a strip on every 5th pixel of the top row.
pub fn sample_pixel_sequence(frames: u64, canvas: Canvas) -> SequenceDescriptor {
    let mut seq = SequenceDescriptor::new();
    let (w, h) = (canvas.width, canvas.height);

    for f in 0..frames {
        let red = cycle_channel(f, frames);
        let blue = 255 - red;

        let mut pixels = vec![
            BorderPixel::new(0, 0, Rgb8::new(red, 0, blue)),
            BorderPixel::new(w - 1, 0, Rgb8::new(blue, red, 0)),
            BorderPixel::new(0, h - 1, Rgb8::new(0, red, blue)),
            BorderPixel::new(w - 1, h - 1, Rgb8::new(red, blue, red)),
        ];
        for x in (0..w).step_by(5) {
            let offset = ((u64::from(x) + f * 10) % 255) as u8;
            pixels.push(BorderPixel::new(x, 0, Rgb8::new(offset, 255 - offset, 128)));
        }

        seq.insert(FrameIndex(f), FrameDescriptor::Pixels(pixels));
    }
    seq
}

/// Edge-variant sample: full-length edges whose hue shifts along the edge and across frames.
pub fn sample_edge_sequence(frames: u64, canvas: Canvas) -> BorderResult<SequenceDescriptor> {
    let mut seq = SequenceDescriptor::new();
    let (w, h) = (canvas.width as usize, canvas.height as usize);

    for f in 0..frames {
        let red = cycle_channel(f, frames);

        let top = (0..w).map(|i| pack(red, ramp(i, w), 0)).collect();
        let bottom = (0..w).map(|i| pack(0, ramp(i, w), red)).collect();
        let left = (0..h).map(|i| pack(red, 0, ramp(i, h))).collect();
        let right = (0..h).map(|i| pack(255 - red, ramp(i, h), 255)).collect();

        seq.insert(
            FrameIndex(f),
            FrameDescriptor::Edges(EdgeColors::new(top, bottom, left, right)?),
        );
    }
    Ok(seq)
}

/// 0..=255 along an edge of `len` pixels.
fn ramp(i: usize, len: usize) -> u8 {
    ((i * 255) / (len.max(2) - 1)).min(255) as u8
}

fn cycle_channel(frame: u64, frames: u64) -> u8 {
    if frames == 0 {
        return 0;
    }
    ((255 * frame) / frames).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/document.rs"]
mod tests;
