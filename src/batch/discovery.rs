use std::path::{Path, PathBuf};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{BorderError, BorderResult};

/// Regular files matching `pattern`, sorted lexicographically by path.
pub fn discover_images(pattern: &str) -> BorderResult<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|e| {
        BorderError::validation(format!("invalid input pattern '{pattern}': {e}"))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "skipping unreadable path during discovery"),
        }
    }
    files.sort();
    tracing::debug!(pattern, count = files.len(), "discovered images");
    Ok(files)
}

/// Digits of the stem concatenated in order, e.g. `frame_007` -> 7, `a1b2` -> 12.
///
/// `None` when the stem has no digits or the number does not fit in a `u64`.
pub fn frame_number_from_stem(stem: &str) -> Option<FrameIndex> {
    let digits: String = stem.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok().map(FrameIndex)
}

/// Derive a frame number for each (already sorted) file, falling back to its position.
pub fn assign_frame_numbers(files: &[PathBuf]) -> Vec<(FrameIndex, PathBuf)> {
    files
        .iter()
        .enumerate()
        .map(|(pos, path)| {
            let frame = file_stem(path)
                .and_then(|s| frame_number_from_stem(&s))
                .unwrap_or(FrameIndex(pos as u64));
            (frame, path.clone())
        })
        .collect()
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
#[path = "../../tests/unit/batch/discovery.rs"]
mod tests;
