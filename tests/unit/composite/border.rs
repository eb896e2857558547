use super::*;
use crate::color::codec::pack;
use crate::sequence::descriptor::BorderPixel;

const GREY: Rgb<u8> = Rgb([50, 50, 50]);

fn grey(w: u32, h: u32) -> RgbImage {
    RgbImage::from_pixel(w, h, GREY)
}

fn edges(w: usize, h: usize, top: u32, bottom: u32, left: u32, right: u32) -> FrameDescriptor {
    FrameDescriptor::Edges(
        EdgeColors::new(vec![top; w], vec![bottom; w], vec![left; h], vec![right; h]).unwrap(),
    )
}

#[test]
fn border_membership_rule() {
    assert!(is_border_pixel(0, 5, 10, 10));
    assert!(is_border_pixel(9, 5, 10, 10));
    assert!(is_border_pixel(5, 0, 10, 10));
    assert!(is_border_pixel(5, 9, 10, 10));
    assert!(!is_border_pixel(5, 5, 10, 10));
    assert!(!is_border_pixel(10, 0, 10, 10));
    assert!(!is_border_pixel(-1, 0, 10, 10));
    assert!(!is_border_pixel(0, 0, 0, 0));
}

#[test]
fn off_border_pixel_is_left_unchanged_and_not_counted() {
    let mut img = grey(10, 10);
    let desc = FrameDescriptor::Pixels(vec![
        BorderPixel::new(5, 5, Rgb8::new(255, 0, 0)),
        BorderPixel::new(0, 3, Rgb8::new(0, 255, 0)),
    ]);
    let applied = apply_border(&mut img, &desc).unwrap();
    assert_eq!(applied, 1);
    assert_eq!(*img.get_pixel(5, 5), GREY);
    assert_eq!(*img.get_pixel(0, 3), Rgb([0, 255, 0]));
}

#[test]
fn out_of_range_pixels_are_skipped_silently() {
    let mut img = grey(4, 3);
    let desc = FrameDescriptor::Pixels(vec![
        BorderPixel::new(4, 0, Rgb8::WHITE),
        BorderPixel::new(0, 3, Rgb8::WHITE),
        BorderPixel::new(u32::MAX, u32::MAX, Rgb8::WHITE),
    ]);
    assert_eq!(apply_border(&mut img, &desc).unwrap(), 0);
    assert!(img.pixels().all(|p| *p == GREY));
}

#[test]
fn repeated_pixel_writes_count_once_and_last_wins() {
    let mut img = grey(4, 4);
    let desc = FrameDescriptor::Pixels(vec![
        BorderPixel::new(1, 0, Rgb8::new(1, 1, 1)),
        BorderPixel::new(1, 0, Rgb8::new(2, 2, 2)),
    ]);
    assert_eq!(apply_border(&mut img, &desc).unwrap(), 1);
    assert_eq!(*img.get_pixel(1, 0), Rgb([2, 2, 2]));
}

#[test]
fn edge_corners_follow_top_bottom_left_right_order() {
    let red = pack(255, 0, 0);
    let green = pack(0, 255, 0);
    let blue = pack(0, 0, 255);
    let yellow = pack(255, 255, 0);

    let out = composite_frame(grey(4, 4), &edges(4, 4, red, green, blue, yellow)).unwrap();
    let img = &out.image;

    assert_eq!(out.pixels_applied, 2 * 4 + 2 * 4 - 4);
    assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 255]));
    assert_eq!(*img.get_pixel(3, 0), Rgb([255, 255, 0]));
    assert_eq!(*img.get_pixel(0, 3), Rgb([0, 0, 255]));
    assert_eq!(*img.get_pixel(3, 3), Rgb([255, 255, 0]));
    assert_eq!(*img.get_pixel(1, 0), Rgb([255, 0, 0]));
    assert_eq!(*img.get_pixel(2, 3), Rgb([0, 255, 0]));
    assert_eq!(*img.get_pixel(1, 1), GREY);
    assert_eq!(*img.get_pixel(2, 2), GREY);
}

#[test]
fn edge_count_for_non_square_image() {
    let out = composite_frame(grey(7, 5), &edges(7, 5, 1, 2, 3, 4)).unwrap();
    assert_eq!(out.pixels_applied, 2 * 7 + 2 * 5 - 4);
    let interior = (1..6)
        .flat_map(|x| (1..4).map(move |y| (x, y)))
        .all(|(x, y)| *out.image.get_pixel(x, y) == GREY);
    assert!(interior);
}

#[test]
fn edge_length_mismatch_is_a_shape_error() {
    let mut img = grey(5, 4);
    let err = apply_border(&mut img, &edges(4, 4, 1, 1, 1, 1)).unwrap_err();
    assert!(matches!(err, BorderError::FrameShapeMismatch(_)));
    assert!(img.pixels().all(|p| *p == GREY));

    let err = apply_border(&mut img, &edges(5, 3, 1, 1, 1, 1)).unwrap_err();
    assert!(matches!(err, BorderError::FrameShapeMismatch(_)));
}

#[test]
fn single_row_image_bottom_overwrites_top() {
    let out = composite_frame(grey(3, 1), &edges(3, 1, 1, 2, 3, 4)).unwrap();
    assert_eq!(out.pixels_applied, 3);
    assert_eq!(*out.image.get_pixel(1, 0), Rgb([0, 0, 2]));
    assert_eq!(*out.image.get_pixel(0, 0), Rgb([0, 0, 3]));
    assert_eq!(*out.image.get_pixel(2, 0), Rgb([0, 0, 4]));
}

#[test]
fn blank_canvas_fills_background() {
    let img = blank_canvas(Canvas::new(3, 2).unwrap(), Rgb8::WHITE);
    assert_eq!(img.dimensions(), (3, 2));
    assert!(img.pixels().all(|p| *p == Rgb([255, 255, 255])));
}
