use super::*;
use crate::frame::layered::Frame;
use crate::spatial::area::Area;
use crate::texture::event_driven::EventDrivenTexture;

const RED: Color = Color::from_rgba(255, 0, 0, 255);

#[test]
fn memory_uploader_writes_sub_rectangles() {
    let device = MemoryUploader::new(4, 4, 1);
    device.upload(1, 2, 0, 2, 1, &[RED, RED]).unwrap();

    let level0 = device.level_pixels(0).unwrap();
    assert_eq!(level0[2 * 4 + 1], RED);
    assert_eq!(level0[2 * 4 + 2], RED);
    assert_eq!(level0.iter().filter(|c| **c == RED).count(), 2);
    assert_eq!(device.level_pixels(1).unwrap().len(), 4);
    assert_eq!(device.upload_count(), 1);
}

#[test]
fn memory_uploader_rejects_overhanging_uploads() {
    let device = MemoryUploader::new(4, 4, 0);
    let err = device.upload(3, 0, 0, 2, 1, &[RED, RED]).unwrap_err();
    assert!(matches!(err, TextureError::Dimension(_)));
    assert_eq!(device.upload_count(), 0);
}

#[test]
fn upload_component_sends_every_mip_level() {
    let mut frame = Frame::blank(4, 4, 1, 1).unwrap();
    frame
        .apply_transform(&|_: i32, _: i32| RED, &Area::rect(0, 0, 4, 4).unwrap(), 0)
        .unwrap();
    let device = Arc::new(MemoryUploader::new(8, 8, 1));
    let mut tex = EventDrivenTexture::builder()
        .frames(vec![frame], Frame::blank(4, 4, 1, 1).unwrap())
        .unwrap()
        .component(UploadComponent::new(device.clone(), 4, 0).unwrap(), 0)
        .build()
        .unwrap();

    assert!(tex.upload().unwrap());
    assert_eq!(device.upload_count(), 2);
    assert!(!tex.upload().unwrap());
    assert_eq!(device.upload_count(), 2);

    let level0 = device.level_pixels(0).unwrap();
    assert_eq!(level0[4], RED);
    assert_eq!(level0[3], Color::TRANSPARENT);
    let level1 = device.level_pixels(1).unwrap();
    assert_eq!(level1[2], RED);
    assert_eq!(level1[1], Color::TRANSPARENT);
}

#[test]
fn upload_component_rejects_negative_points() {
    let device: Arc<dyn GpuUploader> = Arc::new(MemoryUploader::new(4, 4, 0));
    assert!(matches!(
        UploadComponent::new(device, 0, -3),
        Err(TextureError::NegativeUploadPoint { x: 0, y: -3 })
    ));
}

#[test]
fn cleanup_runs_once() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let mut tex = EventDrivenTexture::builder()
        .frames(
            vec![Frame::blank(2, 2, 0, 1).unwrap()],
            Frame::blank(2, 2, 0, 1).unwrap(),
        )
        .unwrap()
        .component(
            CleanupComponent::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            0,
        )
        .build()
        .unwrap();

    tex.close();
    tex.close();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}
