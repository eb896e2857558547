use super::*;
use crate::sequence::descriptor::DescriptorFormat;

#[test]
fn written_document_parses_back_to_same_frames() {
    let canvas = Canvas::new(20, 12).unwrap();
    let mut seq = sample_pixel_sequence(3, canvas);
    for (number, desc) in sample_edge_sequence(2, canvas).unwrap().frames() {
        seq.insert(FrameIndex(number.0 + 10), desc.as_ref().clone());
    }
    seq.insert(FrameIndex(99), FrameDescriptor::Pixels(vec![]));

    let xml = write_sequence_xml(&seq);
    let back = SequenceDescriptor::parse_str(&xml, DescriptorFormat::Auto).unwrap();

    assert!(back.invalid().is_empty());
    assert_eq!(back.len(), seq.len());
    for ((ka, da), (kb, db)) in seq.frames().zip(back.frames()) {
        assert_eq!(ka, kb);
        assert_eq!(da, db);
    }
}

#[test]
fn pixel_sample_matches_corner_and_strip_layout() {
    let canvas = Canvas::new(200, 150).unwrap();
    let seq = sample_pixel_sequence(10, canvas);
    assert_eq!(seq.len(), 10);

    let FrameDescriptor::Pixels(pixels) = seq.get(FrameIndex(5)).unwrap().as_ref() else {
        panic!("expected pixels");
    };
    // 4 corners + one every 5th column of the top row.
    assert_eq!(pixels.len(), 4 + 40);

    let red = 127u8;
    assert_eq!(pixels[0], BorderPixel::new(0, 0, Rgb8::new(red, 0, 128)));
    assert_eq!(pixels[3], BorderPixel::new(199, 149, Rgb8::new(red, 128, red)));
    assert_eq!(pixels[4], BorderPixel::new(0, 0, Rgb8::new(50, 205, 128)));
    assert!(pixels[4..].iter().all(|p| p.y == 0 && p.x % 5 == 0));
}

#[test]
fn edge_sample_has_image_shaped_edges() {
    let canvas = Canvas::new(7, 4).unwrap();
    let seq = sample_edge_sequence(2, canvas).unwrap();
    for (_, desc) in seq.frames() {
        assert_eq!(desc.implied_canvas(), Some(canvas));
    }
}

#[test]
fn save_creates_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("seq.xml");
    let seq = sample_pixel_sequence(1, Canvas::new(4, 4).unwrap());
    save_sequence_xml(&seq, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("<?xml"));
    assert!(text.contains("<frame number=\"0\">"));
}
