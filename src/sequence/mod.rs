//! Border sequence documents: parsing into per-frame descriptors and writing them back.

/// Frame-number -> descriptor map read from XML.
pub mod descriptor;
/// XML writer and sample sequence generators.
pub mod document;
