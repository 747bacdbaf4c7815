use std::sync::Arc;

use parking_lot::Mutex;

use crate::foundation::error::{TextureError, TextureResult};
use crate::frame::layered::Frame;

/// Which frame a texture currently shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CurrentFrame {
    Predefined(usize),
    Generated,
}

/// Id of one event dispatch. Views carry the id of the dispatch that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EventId(u64);

pub(crate) type SharedState = Arc<Mutex<TextureState>>;

/// Frames and dispatch bookkeeping shared between a texture and the views it hands out.
#[derive(Debug)]
pub(crate) struct TextureState {
    pub(crate) predefined: Vec<Frame>,
    pub(crate) generated: Frame,
    pub(crate) current: CurrentFrame,
    pub(crate) needs_upload: bool,
    active_event: Option<EventId>,
    next_event: u64,
    closed: bool,
}

impl TextureState {
    pub(crate) fn new(predefined: Vec<Frame>, generated: Frame) -> TextureResult<Self> {
        if predefined.is_empty() {
            return Err(TextureError::dimension(
                "a texture needs at least one predefined frame",
            ));
        }
        for (index, frame) in predefined.iter().enumerate() {
            let same_shape = frame.width() == generated.width()
                && frame.height() == generated.height()
                && frame.layers() == generated.layers()
                && frame.mipmap_level() == generated.mipmap_level();
            if !same_shape {
                return Err(TextureError::dimension(format!(
                    "predefined frame {index} is {}x{} ({} layers, mip {}) but the generated \
                     frame is {}x{} ({} layers, mip {})",
                    frame.width(),
                    frame.height(),
                    frame.layers(),
                    frame.mipmap_level(),
                    generated.width(),
                    generated.height(),
                    generated.layers(),
                    generated.mipmap_level()
                )));
            }
        }
        Ok(Self {
            predefined,
            generated,
            current: CurrentFrame::Predefined(0),
            needs_upload: true,
            active_event: None,
            next_event: 0,
            closed: false,
        })
    }

    pub(crate) fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    /// Reject any view not issued by the dispatch in progress.
    pub(crate) fn check(&self, event: EventId) -> TextureResult<()> {
        if self.active_event == Some(event) {
            Ok(())
        } else {
            Err(TextureError::IllegalFrameReference)
        }
    }

    pub(crate) fn current_frame(&self) -> &Frame {
        match self.current {
            CurrentFrame::Predefined(i) => self.predefined.get(i).unwrap_or(&self.generated),
            CurrentFrame::Generated => &self.generated,
        }
    }

    pub(crate) fn current_index(&self) -> Option<usize> {
        match self.current {
            CurrentFrame::Predefined(i) => Some(i),
            CurrentFrame::Generated => None,
        }
    }

    pub(crate) fn predefined(&self, index: usize) -> TextureResult<&Frame> {
        let len = self.predefined.len();
        self.predefined
            .get(index)
            .ok_or(TextureError::FrameIndexOutOfBounds {
                index: index as i64,
                len,
            })
    }

    pub(crate) fn predefined_mut(&mut self, index: usize) -> TextureResult<&mut Frame> {
        let len = self.predefined.len();
        self.predefined
            .get_mut(index)
            .ok_or(TextureError::FrameIndexOutOfBounds {
                index: index as i64,
                len,
            })
    }

    /// Seed the generated frame with the predefined frame on screen, if any.
    pub(crate) fn refresh_generated(&mut self) -> TextureResult<()> {
        if let CurrentFrame::Predefined(i) = self.current {
            let Self {
                predefined,
                generated,
                ..
            } = self;
            if let Some(source) = predefined.get(i) {
                generated.copy_from(source)?;
            }
        }
        Ok(())
    }

    fn begin_event(&mut self) -> TextureResult<EventId> {
        if self.closed {
            return Err(TextureError::TextureClosed);
        }
        self.next_event += 1;
        let id = EventId(self.next_event);
        self.active_event = Some(id);
        Ok(id)
    }

    fn end_event(&mut self, id: EventId) {
        if self.active_event == Some(id) {
            self.active_event = None;
        }
    }

    /// Release every frame. Idempotent.
    pub(crate) fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.active_event = None;
        for frame in &self.predefined {
            frame.close();
        }
        self.generated.close();
    }
}

/// Marks one event dispatch as active for as long as it lives.
///
/// Dropping the scope invalidates every view issued under it, including when a component bails
/// out with an error halfway through the dispatch.
pub(crate) struct EventScope {
    state: SharedState,
    id: EventId,
}

impl EventScope {
    pub(crate) fn begin(state: &SharedState) -> TextureResult<Self> {
        let id = state.lock().begin_event()?;
        Ok(Self {
            state: state.clone(),
            id,
        })
    }

    pub(crate) fn id(&self) -> EventId {
        self.id
    }
}

impl Drop for EventScope {
    fn drop(&mut self) {
        self.state.lock().end_event(self.id);
    }
}
