use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BorderError::document_parse("x")
            .to_string()
            .contains("document parse error:")
    );
    assert!(
        BorderError::frame_shape_mismatch("x")
            .to_string()
            .contains("frame shape mismatch:")
    );
    assert!(
        BorderError::image_decode("x")
            .to_string()
            .contains("image decode error:")
    );
    assert!(
        BorderError::image_encode("x")
            .to_string()
            .contains("image encode error:")
    );
    assert!(
        BorderError::directory_creation("x")
            .to_string()
            .contains("directory creation error:")
    );
    assert!(
        BorderError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn missing_frame_data_names_the_frame() {
    let err = BorderError::MissingFrameData(FrameIndex(42));
    assert_eq!(
        err.to_string(),
        "missing frame data: no descriptor for frame 42"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BorderError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
