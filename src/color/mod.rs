/// Packed `u32` <-> RGB conversion and hex colors.
pub mod codec;
