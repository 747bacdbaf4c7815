use super::*;
use crate::frame::reader::{FrameLayout, FrameReader};

const RED: Color = Color::from_rgba(255, 0, 0, 255);
const GREY: Color = Color::from_rgba(9, 9, 9, 255);

fn image(w: u32, h: u32, mip: u32) -> MipImage {
    MipImage::from_pixels(w, h, vec![GREY; w as usize * h as usize], mip).unwrap()
}

fn frames(img: &MipImage, fw: u32, fh: u32, layers: usize) -> Vec<Frame> {
    FrameReader::read(
        FrameLayout {
            image_width: img.width(),
            image_height: img.height(),
            frame_width: fw,
            frame_height: fh,
        },
        |d| Frame::from_image(img, &d, layers),
    )
    .unwrap()
}

#[test]
fn transform_changes_only_area_pixels() {
    let img = image(8, 8, 0);
    let mut f = frames(&img, 8, 8, 1).pop().unwrap();
    let area = Area::rect(2, 3, 3, 2).unwrap();
    f.apply_transform(&|_: i32, _: i32| RED, &area, 0).unwrap();

    for y in 0..8 {
        for x in 0..8 {
            let expected = if area.contains(x, y) { RED } else { GREY };
            assert_eq!(f.color(x, y, 0).unwrap(), expected, "({x}, {y})");
        }
    }
}

#[test]
fn transform_receives_frame_coordinates() {
    let img = image(8, 4, 0);
    let mut all = frames(&img, 4, 4, 1);
    let area = Area::rect(0, 0, 4, 4).unwrap();
    all[1]
        .apply_transform(
            &|x: i32, y: i32| Color::from_rgba(x as u8, y as u8, 0, 255),
            &area,
            0,
        )
        .unwrap();
    assert_eq!(all[1].color(3, 2, 0).unwrap(), Color::from_rgba(3, 2, 0, 255));
    // Frame 0 shares the plane but covers a different region.
    assert_eq!(all[0].color(3, 2, 0).unwrap(), GREY);
}

#[test]
fn out_of_bounds_area_is_rejected_before_writing() {
    let img = image(4, 4, 0);
    let mut f = frames(&img, 4, 4, 1).pop().unwrap();
    let area = Area::rect(2, 2, 3, 1).unwrap();
    let err = f.apply_transform(&|_: i32, _: i32| RED, &area, 0).unwrap_err();
    assert!(matches!(err, TextureError::PixelOutOfBounds { x: 4, y: 2 }));
    assert_eq!(f.color(2, 2, 0).unwrap(), GREY);
}

#[test]
fn pixel_access_is_bounds_checked() {
    let img = image(4, 4, 0);
    let mut f = frames(&img, 4, 4, 1).pop().unwrap();
    assert!(matches!(
        f.color(-1, 0, 0),
        Err(TextureError::PixelOutOfBounds { x: -1, y: 0 })
    ));
    assert!(matches!(
        f.set_color(0, 4, RED, 0),
        Err(TextureError::PixelOutOfBounds { x: 0, y: 4 })
    ));
    assert!(matches!(f.color(0, 0, 1), Err(TextureError::Dimension(_))));
}

#[test]
fn deeper_levels_take_aligned_samples() {
    let img = image(4, 4, 2);
    let mut f = frames(&img, 4, 4, 1).pop().unwrap();
    f.apply_transform(
        &|x: i32, y: i32| Color::from_rgba(x as u8, y as u8, 1, 255),
        &Area::rect(1, 0, 3, 4).unwrap(),
        0,
    )
    .unwrap();

    // Level 1 pixel (1, 0) maps to level-0 (2, 0), which lies in the area.
    assert_eq!(
        f.color_at_level(1, 1, 0, 0).unwrap(),
        Color::from_rgba(2, 0, 1, 255)
    );
    // Level 1 pixel (0, 0) maps to (0, 0), outside the area; untouched.
    assert_ne!(f.color_at_level(1, 0, 0, 0).unwrap().blue(), 1);
    // Level 2 has a single pixel mapping to (0, 0); untouched.
    assert_ne!(f.color_at_level(2, 0, 0, 0).unwrap().blue(), 1);
}

#[test]
fn large_areas_match_sequential_results() {
    let img = image(128, 64, 0);
    let mut f = frames(&img, 128, 64, 1).pop().unwrap();
    let area = Area::rect(0, 0, 128, 64).unwrap();
    f.apply_transform(
        &|x: i32, y: i32| Color::from_rgba(x as u8, y as u8, (x ^ y) as u8, 255),
        &area,
        0,
    )
    .unwrap();
    for p in area.iter().step_by(97) {
        let (x, y) = (p.x(), p.y());
        assert_eq!(
            f.color(x, y, 0).unwrap(),
            Color::from_rgba(x as u8, y as u8, (x ^ y) as u8, 255)
        );
    }
}

#[test]
fn extra_layers_start_transparent_and_composite_over_base() {
    let img = image(2, 2, 0);
    let mut f = frames(&img, 2, 2, 2).pop().unwrap();
    assert_eq!(f.layers(), 2);
    assert_eq!(f.color(0, 0, 1).unwrap(), Color::TRANSPARENT);
    assert_eq!(f.composite(0).unwrap(), vec![GREY; 4]);

    f.set_color(1, 1, RED, 1).unwrap();
    assert_eq!(f.composite(0).unwrap(), vec![GREY, GREY, GREY, RED]);
    assert_eq!(f.color(1, 1, 0).unwrap(), GREY);
}

#[test]
fn closing_one_frame_releases_all_sharing_frames() {
    let img = image(8, 4, 0);
    let all = frames(&img, 4, 4, 2);
    all[0].close();
    all[0].close();
    assert!(all[1].is_closed());
    assert!(matches!(all[1].color(0, 0, 0), Err(TextureError::ImageClosed)));
    assert!(matches!(all[1].color(0, 0, 1), Err(TextureError::ImageClosed)));
}

#[test]
fn detached_copy_is_independent() {
    let img = image(4, 4, 1);
    let base = frames(&img, 4, 4, 1).pop().unwrap();
    let mut copy = base.detached_copy().unwrap();
    copy.set_color(0, 0, RED, 0).unwrap();
    assert_eq!(base.color(0, 0, 0).unwrap(), GREY);

    base.close();
    assert!(!copy.is_closed());
    assert_eq!(copy.color(0, 0, 0).unwrap(), RED);
    assert_eq!(copy.color_at_level(1, 0, 0, 0).unwrap(), RED);
}

#[test]
fn copy_from_requires_matching_shape() {
    let mut a = Frame::blank(4, 4, 0, 1).unwrap();
    let b = Frame::blank(4, 2, 0, 1).unwrap();
    assert!(matches!(a.copy_from(&b), Err(TextureError::Dimension(_))));
}

#[test]
fn blank_frames_must_align_with_their_mip_levels() {
    assert!(matches!(
        Frame::blank(3, 3, 1, 1),
        Err(TextureError::Dimension(_))
    ));
    assert!(matches!(
        Frame::blank(4, 6, 2, 1),
        Err(TextureError::Dimension(_))
    ));
    assert!(Frame::blank(4, 4, 1, 1).is_ok());
}

#[test]
fn unaligned_tiles_are_rejected_instead_of_written_past_their_level() {
    let img = image(6, 6, 1);
    let result = FrameReader::read(
        FrameLayout {
            image_width: 6,
            image_height: 6,
            frame_width: 3,
            frame_height: 3,
        },
        |d| Frame::from_image(&img, &d, 1),
    );
    assert!(matches!(result, Err(TextureError::Dimension(_))));

    let offset = FrameDescriptor {
        index: 0,
        x_offset: 1,
        y_offset: 0,
        width: 4,
        height: 4,
    };
    let wide = image(6, 4, 1);
    assert!(matches!(
        Frame::from_image(&wide, &offset, 1),
        Err(TextureError::Dimension(_))
    ));
}

#[test]
fn full_frame_transform_on_aligned_tiles_stays_within_each_level() {
    let img = image(8, 4, 1);
    let mut tiles = frames(&img, 4, 4, 1);
    let mut left = tiles.remove(0);
    left.apply_transform(&|_: i32, _: i32| RED, &Area::rect(0, 0, 4, 4).unwrap(), 0)
        .unwrap();

    let right = &tiles[0];
    assert_eq!(left.color_at_level(1, 1, 1, 0).unwrap(), RED);
    assert_eq!(right.color_at_level(1, 0, 0, 0).unwrap(), GREY);
    assert_eq!(right.color(0, 0, 0).unwrap(), GREY);
}
