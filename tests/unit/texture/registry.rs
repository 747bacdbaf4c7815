use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::foundation::color::Color;
use crate::frame::layered::Frame;
use crate::spatial::area::Area;
use crate::texture::component::{CleanupComponent, MemoryUploader, TextureComponent, UploadComponent};
use crate::texture::render_thread::RenderThread;
use crate::texture::view::{CurrentFrameView, FrameGroup, PersistentFrameView};

const RED: Color = Color::from_rgba(255, 0, 0, 255);

fn loc(s: &str) -> ResourceLocation {
    ResourceLocation::parse(s).unwrap()
}

struct Flip;

impl TextureComponent for Flip {
    fn on_tick(
        &mut self,
        current: &CurrentFrameView,
        _predefined: &FrameGroup<PersistentFrameView>,
    ) -> TextureResult<()> {
        let frames = current.predefined_frames()?;
        let next = current.index()?.map_or(0, |i| (i + 1) % frames);
        current.replace_with(next)
    }
}

struct Broken;

impl TextureComponent for Broken {
    fn on_tick(
        &mut self,
        _current: &CurrentFrameView,
        _predefined: &FrameGroup<PersistentFrameView>,
    ) -> TextureResult<()> {
        Err(TextureError::metadata("broken"))
    }
}

fn texture(component: impl TextureComponent + 'static, device: &Arc<MemoryUploader>) -> EventDrivenTexture {
    let mut red = Frame::blank(2, 2, 0, 1).unwrap();
    red.apply_transform(&|_: i32, _: i32| RED, &Area::rect(0, 0, 2, 2).unwrap(), 0)
        .unwrap();
    EventDrivenTexture::builder()
        .frames(vec![Frame::blank(2, 2, 0, 1).unwrap(), red], Frame::blank(2, 2, 0, 1).unwrap())
        .unwrap()
        .component(component, 0)
        .component(UploadComponent::new(device.clone(), 0, 0).unwrap(), 0)
        .build()
        .unwrap()
}

#[test]
fn tick_all_isolates_failures() {
    let device = Arc::new(MemoryUploader::new(2, 2, 0));
    let mut reg = TextureRegistry::new();
    let good = reg.register(loc("textures/good.png"), texture(Flip, &device)).unwrap();
    reg.register(loc("textures/bad.png"), texture(Broken, &device)).unwrap();

    assert_eq!(reg.tick_all(), 1);
    assert_eq!(good.lock().current_index(), Some(1));
}

#[test]
fn bind_uploads_inline_or_defers() {
    let render = RenderThread::current();
    let device = Arc::new(MemoryUploader::new(2, 2, 0));
    let mut reg = TextureRegistry::new();
    let location = loc("textures/flip.png");
    reg.register(location.clone(), texture(Flip, &device)).unwrap();
    reg.tick_all();

    assert_eq!(reg.bind(&location, &render.handle()).unwrap(), Submission::Inline);
    assert_eq!(device.upload_count(), 1);
    assert_eq!(device.level_pixels(0).unwrap()[0], RED);

    reg.tick_all();
    let handle = render.handle();
    let reg = Arc::new(reg);
    let remote = reg.clone();
    let how = std::thread::spawn(move || remote.bind(&location, &handle).unwrap())
        .join()
        .unwrap();
    assert_eq!(how, Submission::Deferred);
    assert_eq!(device.upload_count(), 1);

    render.run_pending().unwrap();
    assert_eq!(device.upload_count(), 2);
    assert_eq!(device.level_pixels(0).unwrap()[0], Color::TRANSPARENT);
}

#[test]
fn bind_unknown_location_fails() {
    let render = RenderThread::current();
    let reg = TextureRegistry::new();
    assert!(matches!(
        reg.bind(&loc("textures/none.png"), &render.handle()),
        Err(TextureError::ResourceNotFound { .. })
    ));
}

#[test]
fn replacing_and_removing_close_textures() {
    let closes = Arc::new(AtomicUsize::new(0));
    let make = |closes: &Arc<AtomicUsize>| {
        let closes = closes.clone();
        EventDrivenTexture::builder()
            .frames(vec![Frame::blank(2, 2, 0, 1).unwrap()], Frame::blank(2, 2, 0, 1).unwrap())
            .unwrap()
            .component(
                CleanupComponent::new(move || {
                    closes.fetch_add(1, Ordering::SeqCst);
                }),
                0,
            )
            .build()
            .unwrap()
    };

    let mut reg = TextureRegistry::new();
    let a = loc("textures/a.png");
    reg.register(a.clone(), make(&closes)).unwrap();
    reg.register(a.clone(), make(&closes)).unwrap();
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert_eq!(reg.len(), 1);

    reg.register(loc("textures/b.png"), make(&closes)).unwrap();
    assert!(reg.remove(&a));
    assert!(!reg.remove(&a));
    assert_eq!(closes.load(Ordering::SeqCst), 2);

    reg.close_all();
    assert!(reg.is_empty());
    assert_eq!(closes.load(Ordering::SeqCst), 3);
}
