use std::sync::Arc;

use parking_lot::Mutex;

use super::*;
use crate::frame::layered::Frame;
use crate::texture::component::{MemoryUploader, TextureComponent};
use crate::texture::event_driven::EventDrivenTexture;

const RED: Color = Color::from_rgba(255, 0, 0, 255);
const BLUE: Color = Color::from_rgba(0, 0, 255, 255);
const GREEN: Color = Color::from_rgba(0, 255, 0, 255);

fn solid(color: Color) -> Frame {
    let mut f = Frame::blank(4, 4, 0, 1).unwrap();
    f.apply_transform(&move |_: i32, _: i32| color, &Area::rect(0, 0, 4, 4).unwrap(), 0)
        .unwrap();
    f
}

struct OnTick<F>(F);

impl<F> TextureComponent for OnTick<F>
where
    F: FnMut(&CurrentFrameView, &FrameGroup<PersistentFrameView>) -> TextureResult<()> + Send,
{
    fn on_tick(
        &mut self,
        current: &CurrentFrameView,
        predefined: &FrameGroup<PersistentFrameView>,
    ) -> TextureResult<()> {
        (self.0)(current, predefined)
    }
}

fn texture_with<F>(f: F) -> EventDrivenTexture
where
    F: FnMut(&CurrentFrameView, &FrameGroup<PersistentFrameView>) -> TextureResult<()>
        + Send
        + 'static,
{
    EventDrivenTexture::builder()
        .frames(vec![solid(RED), solid(BLUE)], Frame::blank(4, 4, 0, 1).unwrap())
        .unwrap()
        .component(OnTick(f), 0)
        .build()
        .unwrap()
}

#[test]
fn replace_with_swaps_the_current_frame() {
    let mut tex = texture_with(|current, _| {
        assert_eq!(current.index()?, Some(0));
        assert_eq!(current.predefined_frames()?, 2);
        current.replace_with(1)
    });
    tex.upload().unwrap();
    assert!(!tex.needs_upload());

    tex.tick().unwrap();
    assert_eq!(tex.current_index(), Some(1));
    assert!(tex.needs_upload());
    assert_eq!(tex.current_pixels(0).unwrap()[0], BLUE);
}

#[test]
fn replace_with_rejects_unknown_frames() {
    let mut tex = texture_with(|current, _| current.replace_with(5));
    let err = tex.tick().unwrap_err();
    assert!(matches!(
        err,
        TextureError::FrameIndexOutOfBounds { index: 5, len: 2 }
    ));
    assert_eq!(tex.current_index(), Some(0));
}

#[test]
fn generate_with_seeds_from_the_current_frame() {
    let mut tex = texture_with(|current, _| {
        current.generate_with(&|_: i32, _: i32| GREEN, &Area::rect(0, 0, 2, 2)?)
    });
    tex.tick().unwrap();

    assert_eq!(tex.current_index(), None);
    let px = tex.current_pixels(0).unwrap();
    assert_eq!(px[0], GREEN);
    assert_eq!(px[5], GREEN);
    assert_eq!(px[15], RED);
}

#[test]
fn generate_with_outside_the_frame_changes_nothing() {
    let mut tex = texture_with(|current, _| {
        current.generate_with(&|_: i32, _: i32| GREEN, &Area::rect(3, 3, 2, 2)?)
    });
    let err = tex.tick().unwrap_err();
    assert!(matches!(err, TextureError::PixelOutOfBounds { .. }));
    assert_eq!(tex.current_index(), Some(0));
    assert_eq!(tex.current_pixels(0).unwrap()[15], RED);
}

#[test]
fn views_fail_after_their_event() {
    let kept: Arc<Mutex<Vec<(CurrentFrameView, PersistentFrameView)>>> = Arc::default();
    let sink = kept.clone();
    let mut tex = texture_with(move |current, predefined| {
        sink.lock().push((current.clone(), predefined.frame(1)?.clone()));
        Ok(())
    });
    tex.tick().unwrap();

    let (current, persistent) = kept.lock().pop().unwrap();
    for _ in 0..2 {
        assert!(matches!(current.width(), Err(TextureError::IllegalFrameReference)));
        assert!(matches!(current.index(), Err(TextureError::IllegalFrameReference)));
        assert!(matches!(current.color(0, 0), Err(TextureError::IllegalFrameReference)));
        assert!(matches!(
            current.replace_with(1),
            Err(TextureError::IllegalFrameReference)
        ));
        assert!(matches!(
            persistent.pixels(),
            Err(TextureError::IllegalFrameReference)
        ));
    }
    assert_eq!(tex.current_index(), Some(0));
}

#[test]
fn views_from_an_earlier_tick_fail_during_a_later_one() {
    let kept: Arc<Mutex<Option<CurrentFrameView>>> = Arc::default();
    let sink = kept.clone();
    let mut tex = texture_with(move |current, _| {
        let mut slot = sink.lock();
        match slot.take() {
            None => {
                *slot = Some(current.clone());
                Ok(())
            }
            Some(old) => {
                assert!(matches!(old.height(), Err(TextureError::IllegalFrameReference)));
                Ok(())
            }
        }
    });
    tex.tick().unwrap();
    tex.tick().unwrap();
    assert!(kept.lock().is_none());
}

#[test]
fn persistent_views_read_predefined_frames() {
    let mut tex = texture_with(|_, predefined| {
        assert_eq!(predefined.len(), 2);
        assert_eq!(predefined.frame(1)?.color(2, 2)?, BLUE);
        assert_eq!(predefined.frame(0)?.index()?, 0);
        assert!(matches!(
            predefined.frame(2),
            Err(TextureError::FrameIndexOutOfBounds { index: 2, len: 2 })
        ));
        Ok(())
    });
    tex.tick().unwrap();
}

#[test]
fn mutable_views_live_only_inside_edit_frames() {
    let builder = EventDrivenTexture::builder()
        .frames(vec![solid(RED), solid(BLUE)], Frame::blank(4, 4, 0, 1).unwrap())
        .unwrap();
    let kept = builder
        .edit_frames(0, |frames| {
            let second = frames.frame(1)?;
            second.transform(&|_: i32, _: i32| GREEN, &Area::rect(1, 1, 1, 1)?)?;
            assert_eq!(second.color(1, 1)?, GREEN);
            Ok(second.clone())
        })
        .unwrap();
    assert!(matches!(
        kept.transform(&|_: i32, _: i32| GREEN, &Area::rect(0, 0, 1, 1).unwrap()),
        Err(TextureError::IllegalFrameReference)
    ));

    let mut tex = builder
        .component(OnTick(|c: &CurrentFrameView, _: &FrameGroup<PersistentFrameView>| c.replace_with(1)), 0)
        .build()
        .unwrap();
    tex.tick().unwrap();
    let px = tex.current_pixels(0).unwrap();
    assert_eq!(px[5], GREEN);
    assert_eq!(px[0], BLUE);
}

#[test]
fn negative_upload_point_is_rejected() {
    struct Uploads;
    impl TextureComponent for Uploads {
        fn on_upload(&mut self, view: &UploadableFrameView) -> TextureResult<()> {
            let device = MemoryUploader::new(4, 4, 0);
            view.upload(&device, -1, 0)
        }
    }
    let mut tex = EventDrivenTexture::builder()
        .frames(vec![solid(RED)], Frame::blank(4, 4, 0, 1).unwrap())
        .unwrap()
        .component(Uploads, 0)
        .build()
        .unwrap();
    let err = tex.upload().unwrap_err();
    assert!(matches!(err, TextureError::NegativeUploadPoint { x: -1, y: 0 }));
}
