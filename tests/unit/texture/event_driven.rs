use std::sync::Arc;

use parking_lot::Mutex;

use super::*;
use crate::texture::view::{FrameGroup, PersistentFrameView};

fn blank(w: u32, h: u32) -> Frame {
    Frame::blank(w, h, 0, 2).unwrap()
}

struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    fail_tick: bool,
}

impl TextureComponent for Recorder {
    fn on_register(&mut self, info: &TextureInfo) -> TextureResult<()> {
        self.log
            .lock()
            .push(format!("{}:register:{}", self.name, info.predefined_frames));
        Ok(())
    }

    fn on_tick(
        &mut self,
        _current: &CurrentFrameView,
        _predefined: &FrameGroup<PersistentFrameView>,
    ) -> TextureResult<()> {
        self.log.lock().push(format!("{}:tick", self.name));
        if self.fail_tick {
            return Err(TextureError::metadata("tick refused"));
        }
        Ok(())
    }

    fn on_upload(&mut self, _view: &UploadableFrameView) -> TextureResult<()> {
        self.log.lock().push(format!("{}:upload", self.name));
        Ok(())
    }

    fn on_close(&mut self) {
        self.log.lock().push(format!("{}:close", self.name));
    }
}

fn recorded(fail_first: bool) -> (EventDrivenTexture, Arc<Mutex<Vec<String>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let tex = EventDrivenTexture::builder()
        .frames(vec![blank(2, 2), blank(2, 2), blank(2, 2)], blank(2, 2))
        .unwrap()
        .component(
            Recorder {
                name: "a",
                log: log.clone(),
                fail_tick: fail_first,
            },
            0,
        )
        .component(
            Recorder {
                name: "b",
                log: log.clone(),
                fail_tick: false,
            },
            1,
        )
        .build()
        .unwrap();
    (tex, log)
}

#[test]
fn events_reach_components_in_registration_order() {
    let (mut tex, log) = recorded(false);
    tex.register().unwrap();
    tex.tick().unwrap();
    assert!(tex.upload().unwrap());
    tex.close();

    assert_eq!(
        *log.lock(),
        vec![
            "a:register:3",
            "b:register:3",
            "a:tick",
            "b:tick",
            "a:upload",
            "b:upload",
            "a:close",
            "b:close",
        ]
    );
}

#[test]
fn failing_component_stops_the_dispatch_but_not_the_texture() {
    let (mut tex, log) = recorded(true);
    assert!(tex.tick().is_err());
    assert!(tex.tick().is_err());
    assert_eq!(*log.lock(), vec!["a:tick", "a:tick"]);
    assert!(tex.upload().unwrap());
}

#[test]
fn closed_textures_reject_events() {
    let (mut tex, _) = recorded(false);
    tex.close();
    assert!(tex.is_closed());
    assert!(matches!(tex.tick(), Err(TextureError::TextureClosed)));
    assert!(matches!(tex.upload(), Err(TextureError::TextureClosed)));
    assert!(matches!(tex.register(), Err(TextureError::TextureClosed)));
    assert!(matches!(
        tex.current_pixels(0),
        Err(TextureError::TextureClosed)
    ));
}

#[test]
fn register_schedules_an_upload() {
    let (mut tex, _) = recorded(false);
    assert!(tex.upload().unwrap());
    assert!(!tex.needs_upload());
    tex.register().unwrap();
    assert!(tex.needs_upload());
}

#[test]
fn build_requires_frames() {
    let err = TextureBuilder::new().build().unwrap_err();
    assert!(matches!(err, TextureError::Dimension(_)));
}

#[test]
fn build_rejects_components_on_missing_layers() {
    let err = EventDrivenTexture::builder()
        .frames(vec![blank(2, 2)], blank(2, 2))
        .unwrap()
        .component(CleanupComponentStub, 2)
        .build()
        .unwrap_err();
    assert!(matches!(err, TextureError::Dimension(_)));
}

struct CleanupComponentStub;

impl TextureComponent for CleanupComponentStub {}

#[test]
fn frames_must_share_one_shape() {
    let err = EventDrivenTexture::builder()
        .frames(vec![blank(2, 2), blank(4, 2)], blank(2, 2))
        .unwrap_err();
    assert!(matches!(err, TextureError::Dimension(_)));

    let err = EventDrivenTexture::builder()
        .frames(Vec::new(), blank(2, 2))
        .unwrap_err();
    assert!(matches!(err, TextureError::Dimension(_)));
}

#[test]
fn edit_frames_checks_the_layer() {
    let builder = EventDrivenTexture::builder()
        .frames(vec![blank(2, 2)], blank(2, 2))
        .unwrap();
    assert!(matches!(
        builder.edit_frames(2, |_| Ok(())),
        Err(TextureError::Dimension(_))
    ));
    assert_eq!(builder.edit_frames(1, |frames| Ok(frames.len())).unwrap(), 1);
    assert_eq!(builder.info().unwrap().layers, 2);
}
