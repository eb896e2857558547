use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::foundation::core::{Canvas, FrameIndex, Rgb8};
use crate::foundation::error::{BorderError, BorderResult};

/// Child element names of an edge-array frame, in document order.
pub const EDGE_NAMES: [&str; 4] = ["left", "right", "top", "bottom"];

/// Which child shape to read from each `frame` element.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorFormat {
    /// Decide per frame from the children present.
    #[default]
    Auto,
    /// `<pixel x y r g b/>` children.
    Pixels,
    /// `<left/> <right/> <top/> <bottom/>` packed color lists.
    Edges,
}

/// One explicit pixel override. Border membership is checked when compositing, not here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BorderPixel {
    pub x: u32,
    pub y: u32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl BorderPixel {
    pub fn new(x: u32, y: u32, color: Rgb8) -> Self {
        Self {
            x,
            y,
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }

    pub fn color(self) -> Rgb8 {
        Rgb8::new(self.r, self.g, self.b)
    }
}

/// Packed colors along each edge, index 0 at the lowest coordinate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeColors {
    pub top: Vec<u32>,
    pub bottom: Vec<u32>,
    pub left: Vec<u32>,
    pub right: Vec<u32>,
}

impl EdgeColors {
    /// Opposite edges must agree in length.
    pub fn new(
        top: Vec<u32>,
        bottom: Vec<u32>,
        left: Vec<u32>,
        right: Vec<u32>,
    ) -> BorderResult<Self> {
        if top.len() != bottom.len() || left.len() != right.len() {
            return Err(BorderError::frame_shape_mismatch(format!(
                "edge lengths disagree: top={} bottom={} left={} right={}",
                top.len(),
                bottom.len(),
                left.len(),
                right.len()
            )));
        }
        Ok(Self {
            top,
            bottom,
            left,
            right,
        })
    }

    /// Raster size implied by the edges (`top.len()` x `left.len()`).
    pub fn canvas(&self) -> BorderResult<Canvas> {
        let width = u32::try_from(self.top.len())
            .map_err(|_| BorderError::frame_shape_mismatch("top edge is too long"))?;
        let height = u32::try_from(self.left.len())
            .map_err(|_| BorderError::frame_shape_mismatch("left edge is too long"))?;
        Canvas::new(width, height)
            .map_err(|_| BorderError::frame_shape_mismatch("edges describe an empty raster"))
    }
}

/// Parsed border data for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameDescriptor {
    Pixels(Vec<BorderPixel>),
    Edges(EdgeColors),
}

impl FrameDescriptor {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pixels(_) => "pixels",
            Self::Edges(_) => "edges",
        }
    }

    /// Raster size the descriptor carries on its own, if any.
    pub fn implied_canvas(&self) -> Option<Canvas> {
        match self {
            Self::Pixels(_) => None,
            Self::Edges(edges) => edges.canvas().ok(),
        }
    }
}

/// A frame excluded from the map at parse time.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct InvalidFrame {
    pub number: FrameIndex,
    pub reason: String,
}

/// Frame number -> border data for one batch run.
///
/// Duplicate frame numbers: the last valid occurrence wins. Invalid occurrences are reported in
/// [`SequenceDescriptor::invalid`] and never replace an earlier valid entry.
#[derive(Clone, Debug, Default)]
pub struct SequenceDescriptor {
    frames: BTreeMap<FrameIndex, Arc<FrameDescriptor>>,
    invalid: Vec<InvalidFrame>,
}

impl SequenceDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a border document from disk.
    pub fn from_path(path: &Path, format: DescriptorFormat) -> BorderResult<Self> {
        let xml = std::fs::read_to_string(path).map_err(|e| {
            BorderError::document_parse(format!("read '{}': {e}", path.display()))
        })?;
        Self::parse_str(&xml, format)
    }

    /// Parse a border document.
    ///
    /// ```xml
    /// <image_sequence>
    ///   <frame number="0">
    ///     <pixel x="0" y="0" r="255" g="0" b="0"/>
    ///   </frame>
    ///   <frame number="1">
    ///     <left>255,255</left><right>0,0</right>
    ///     <top>65280,65280,65280</top><bottom>16711680,16711680,16711680</bottom>
    ///   </frame>
    /// </image_sequence>
    /// ```
    #[tracing::instrument(skip(xml), fields(bytes = xml.len()))]
    pub fn parse_str(xml: &str, format: DescriptorFormat) -> BorderResult<Self> {
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| BorderError::document_parse(format!("XML parse error: {e}")))?;

        let mut out = Self::new();
        for frame in doc
            .root_element()
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "frame")
        {
            let number = frame_number(&frame)?;
            match parse_frame(&frame, number, format)? {
                Ok(desc) => {
                    out.insert(number, desc);
                }
                Err(reason) => {
                    tracing::warn!(frame = %number, %reason, "excluding invalid frame");
                    out.invalid.push(InvalidFrame { number, reason });
                }
            }
        }

        tracing::debug!(
            frames = out.frames.len(),
            invalid = out.invalid.len(),
            "parsed border document"
        );
        Ok(out)
    }

    /// Insert or replace a frame. Returns the replaced descriptor.
    pub fn insert(
        &mut self,
        number: FrameIndex,
        desc: FrameDescriptor,
    ) -> Option<Arc<FrameDescriptor>> {
        let prev = self.frames.insert(number, Arc::new(desc));
        if prev.is_some() {
            tracing::warn!(frame = %number, "duplicate frame number, last occurrence wins");
        }
        prev
    }

    pub fn get(&self, number: FrameIndex) -> Option<&Arc<FrameDescriptor>> {
        self.frames.get(&number)
    }

    /// Frames in ascending frame-number order.
    pub fn frames(&self) -> impl Iterator<Item = (FrameIndex, &Arc<FrameDescriptor>)> {
        self.frames.iter().map(|(k, v)| (*k, v))
    }

    pub fn invalid(&self) -> &[InvalidFrame] {
        &self.invalid
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn frame_number(node: &roxmltree::Node) -> BorderResult<FrameIndex> {
    let raw = node
        .attribute("number")
        .ok_or_else(|| BorderError::document_parse("<frame> has no 'number' attribute"))?;
    raw.trim().parse::<u64>().map(FrameIndex).map_err(|_| {
        BorderError::document_parse(format!(
            "<frame> number '{raw}' is not an unsigned integer"
        ))
    })
}

/// Outer error: fatal document error. Inner error: reason the frame is excluded.
fn parse_frame(
    frame: &roxmltree::Node,
    number: FrameIndex,
    format: DescriptorFormat,
) -> BorderResult<Result<FrameDescriptor, String>> {
    let has_pixels = frame
        .children()
        .any(|n| n.is_element() && n.tag_name().name() == "pixel");
    let has_edges = frame
        .children()
        .any(|n| n.is_element() && EDGE_NAMES.contains(&n.tag_name().name()));

    let use_edges = match format {
        DescriptorFormat::Pixels => false,
        DescriptorFormat::Edges => true,
        DescriptorFormat::Auto => {
            if has_pixels && has_edges {
                return Ok(Err(
                    "frame mixes <pixel> children with edge arrays".to_string()
                ));
            }
            has_edges
        }
    };

    if use_edges {
        parse_edges(frame, number)
    } else {
        parse_pixels(frame, number).map(|p| Ok(FrameDescriptor::Pixels(p)))
    }
}

fn parse_pixels(frame: &roxmltree::Node, number: FrameIndex) -> BorderResult<Vec<BorderPixel>> {
    let mut pixels = Vec::new();
    for px in frame
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "pixel")
    {
        pixels.push(BorderPixel {
            x: attr(&px, "x", number)?,
            y: attr(&px, "y", number)?,
            r: attr(&px, "r", number)?,
            g: attr(&px, "g", number)?,
            b: attr(&px, "b", number)?,
        });
    }
    Ok(pixels)
}

fn attr<T: FromStr>(node: &roxmltree::Node, name: &str, number: FrameIndex) -> BorderResult<T> {
    let raw = node.attribute(name).ok_or_else(|| {
        BorderError::document_parse(format!(
            "frame {number}: <pixel> is missing attribute '{name}'"
        ))
    })?;
    raw.trim().parse::<T>().map_err(|_| {
        BorderError::document_parse(format!(
            "frame {number}: <pixel> attribute {name}='{raw}' is out of range"
        ))
    })
}

fn parse_edges(
    frame: &roxmltree::Node,
    number: FrameIndex,
) -> BorderResult<Result<FrameDescriptor, String>> {
    let mut lists: [Option<Vec<u32>>; 4] = [None, None, None, None];
    for (slot, name) in lists.iter_mut().zip(EDGE_NAMES) {
        let Some(node) = frame
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == name)
        else {
            continue;
        };
        *slot = Some(parse_color_list(node.text().unwrap_or(""), number, name)?);
    }

    let missing: Vec<&str> = lists
        .iter()
        .zip(EDGE_NAMES)
        .filter(|(l, _)| l.is_none())
        .map(|(_, name)| name)
        .collect();
    if !missing.is_empty() {
        return Ok(Err(format!(
            "missing border tags: <{}>",
            missing.join(">, <")
        )));
    }

    let [Some(left), Some(right), Some(top), Some(bottom)] = lists else {
        return Ok(Err("missing border tags".to_string()));
    };
    Ok(EdgeColors::new(top, bottom, left, right)
        .map(FrameDescriptor::Edges)
        .map_err(|e| e.to_string()))
}

/// Comma-separated packed colors. Empty tokens are skipped.
pub fn parse_color_list(text: &str, number: FrameIndex, edge: &str) -> BorderResult<Vec<u32>> {
    text.split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<u32>().map_err(|_| {
                BorderError::document_parse(format!(
                    "frame {number}: <{edge}> value '{tok}' is not an unsigned 32-bit integer"
                ))
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/descriptor.rs"]
mod tests;
