use super::*;
use crate::foundation::core::FrameIndex;
use crate::sequence::descriptor::{DescriptorFormat, FrameDescriptor};

fn seq_with(frames: &[u64]) -> SequenceDescriptor {
    let mut seq = SequenceDescriptor::new();
    for f in frames {
        seq.insert(FrameIndex(*f), FrameDescriptor::Pixels(vec![]));
    }
    seq
}

#[test]
fn overlay_plan_pairs_images_by_filename_number() {
    let seq = seq_with(&[1, 2]);
    let images = vec![
        PathBuf::from("in/shot_001.png"),
        PathBuf::from("in/shot_002.png"),
        PathBuf::from("in/shot_003.png"),
    ];
    let plan = plan_overlay_jobs(&images, &seq, Path::new("out"));

    assert_eq!(plan.jobs.len(), 2);
    assert_eq!(plan.jobs[0].frame, FrameIndex(1));
    assert_eq!(plan.jobs[0].index, 0);
    assert_eq!(plan.jobs[1].index, 1);
    assert_eq!(plan.jobs[1].destination, PathBuf::from("out/shot_002.png"));
    assert_eq!(
        plan.jobs[0].source,
        JobSource::Image(PathBuf::from("in/shot_001.png"))
    );

    assert_eq!(plan.skipped.len(), 1);
    assert_eq!(plan.skipped[0].frame, FrameIndex(3));
    assert!(plan.skipped[0].reason.starts_with("missing frame data"));
}

#[test]
fn overlay_plan_never_shares_a_destination() {
    let seq = seq_with(&[7]);
    let images = vec![PathBuf::from("a/f7.png"), PathBuf::from("b/f7.png")];
    let plan = plan_overlay_jobs(&images, &seq, Path::new("out"));

    assert_eq!(plan.jobs.len(), 1);
    assert_eq!(plan.jobs[0].source, JobSource::Image(PathBuf::from("a/f7.png")));
    assert_eq!(plan.skipped.len(), 1);
    assert!(plan.skipped[0].reason.contains("duplicate output path"));
}

#[test]
fn overlay_plan_falls_back_to_position_without_digits() {
    let seq = seq_with(&[0, 1]);
    let images = vec![PathBuf::from("alpha.png"), PathBuf::from("beta.png")];
    let plan = plan_overlay_jobs(&images, &seq, Path::new("out"));
    let frames: Vec<FrameIndex> = plan.jobs.iter().map(|j| j.frame).collect();
    assert_eq!(frames, vec![FrameIndex(0), FrameIndex(1)]);
}

#[test]
fn generate_plan_covers_every_descriptor_in_order() {
    let xml = r#"<seq>
        <frame number="5"/>
        <frame number="2"/>
        <frame number="9"/>
    </seq>"#;
    let seq = SequenceDescriptor::parse_str(xml, DescriptorFormat::Auto).unwrap();
    let size = Canvas::new(4, 4).unwrap();
    let plan = plan_generate_jobs(&seq, Path::new("gen"), Some(size), Rgb8::BLACK);

    let names: Vec<PathBuf> = plan.jobs.iter().map(|j| j.destination.clone()).collect();
    assert_eq!(
        names,
        vec![
            PathBuf::from("gen/frame_0002.png"),
            PathBuf::from("gen/frame_0005.png"),
            PathBuf::from("gen/frame_0009.png"),
        ]
    );
    assert!(plan.skipped.is_empty());
    assert_eq!(
        plan.jobs[0].source,
        JobSource::Canvas {
            size: Some(size),
            background: Rgb8::BLACK
        }
    );
}

#[test]
fn output_dir_is_created_recursively() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    prepare_output_dir(&nested).unwrap();
    assert!(nested.is_dir());

    let file = dir.path().join("file");
    std::fs::write(&file, b"x").unwrap();
    let err = prepare_output_dir(&file.join("sub")).unwrap_err();
    assert!(err.to_string().starts_with("directory creation error:"));
}
