use super::*;

fn layout(iw: u32, ih: u32, fw: u32, fh: u32) -> FrameLayout {
    FrameLayout {
        image_width: iw,
        image_height: ih,
        frame_width: fw,
        frame_height: fh,
    }
}

#[test]
fn wide_image_yields_frames_left_to_right() {
    let frames = FrameReader::descriptors(layout(32, 16, 16, 16)).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!((frames[0].x_offset, frames[0].y_offset), (0, 0));
    assert_eq!((frames[1].x_offset, frames[1].y_offset), (16, 0));
    assert_eq!(frames[1].index, 1);
}

#[test]
fn grid_is_row_major() {
    let frames = FrameReader::descriptors(layout(8, 8, 4, 4)).unwrap();
    let offsets: Vec<_> = frames.iter().map(|f| (f.x_offset, f.y_offset)).collect();
    assert_eq!(offsets, vec![(0, 0), (4, 0), (0, 4), (4, 4)]);
}

#[test]
fn partial_tiles_are_ignored() {
    let l = layout(10, 7, 4, 4);
    assert_eq!(l.frame_count(), 2);
    assert_eq!(FrameReader::descriptors(l).unwrap().len(), 2);
}

#[test]
fn zero_or_oversized_frames_are_rejected() {
    assert!(matches!(
        FrameReader::descriptors(layout(16, 16, 0, 16)),
        Err(TextureError::Dimension(_))
    ));
    assert!(matches!(
        FrameReader::descriptors(layout(16, 16, 32, 16)),
        Err(TextureError::Dimension(_))
    ));
}

#[test]
fn factory_errors_stop_reading() {
    let mut calls = 0;
    let res: TextureResult<Vec<()>> = FrameReader::read(layout(64, 16, 16, 16), |d| {
        calls += 1;
        if d.index == 1 {
            return Err(TextureError::dimension("stop"));
        }
        Ok(())
    });
    assert!(res.is_err());
    assert_eq!(calls, 2);
}
