//! Packed 24-bit RGB encoding (`R << 16 | G << 8 | B`) used by edge-array border documents.

use crate::foundation::core::Rgb8;
use crate::foundation::error::{BorderError, BorderResult};

/// Pack three channels into the low 24 bits of a `u32`.
#[inline]
pub fn pack(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Unpack the low 24 bits of `packed`. Bits above 24 are ignored.
#[inline]
pub fn unpack(packed: u32) -> Rgb8 {
    Rgb8 {
        r: ((packed >> 16) & 0xFF) as u8,
        g: ((packed >> 8) & 0xFF) as u8,
        b: (packed & 0xFF) as u8,
    }
}

/// Bulk [`unpack`] over a whole edge.
pub fn unpack_slice(packed: &[u32]) -> Vec<Rgb8> {
    packed.iter().copied().map(unpack).collect()
}

/// Bulk [`unpack`] into a caller-owned buffer. Both slices must have the same length.
pub fn unpack_into(packed: &[u32], out: &mut [Rgb8]) -> BorderResult<()> {
    if packed.len() != out.len() {
        return Err(BorderError::validation(format!(
            "unpack_into length mismatch: {} packed values into {} slots",
            packed.len(),
            out.len()
        )));
    }
    for (dst, &src) in out.iter_mut().zip(packed) {
        *dst = unpack(src);
    }
    Ok(())
}

/// Bulk [`pack`].
pub fn pack_slice(colors: &[Rgb8]) -> Vec<u32> {
    colors.iter().map(|c| c.to_packed()).collect()
}

impl Rgb8 {
    /// See [`pack`].
    pub fn to_packed(self) -> u32 {
        pack(self.r, self.g, self.b)
    }

    /// Parse a six-digit hex color, with or without a leading `#`.
    pub fn from_hex(s: &str) -> BorderResult<Self> {
        let digits = s.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(BorderError::validation(format!(
                "invalid hex color '{s}': expected 6 hex digits such as #FF5733"
            )));
        }
        let v = u32::from_str_radix(digits, 16)
            .map_err(|e| BorderError::validation(format!("invalid hex color '{s}': {e}")))?;
        Ok(unpack(v))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.to_packed())
    }
}

impl TryFrom<String> for Rgb8 {
    type Error = BorderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgb8> for String {
    fn from(c: Rgb8) -> Self {
        c.to_hex()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/codec.rs"]
mod tests;
