use std::thread::ThreadId;

use crossbeam_channel::{Receiver, Sender};

use crate::foundation::error::{TextureError, TextureResult};

type Task = Box<dyn FnOnce() + Send>;

/// How a submitted task was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submission {
    /// Ran immediately; the caller is the render thread.
    Inline,
    /// Queued until the render thread calls [`RenderThread::run_pending`].
    Deferred,
}

/// The thread allowed to talk to the GPU, plus its queue of deferred work.
///
/// Created on the render thread itself. Other threads hold a [`RenderThreadHandle`] and never
/// run GPU work inline; their tasks wait in the queue instead.
pub struct RenderThread {
    thread: ThreadId,
    sender: Sender<Task>,
    receiver: Receiver<Task>,
}

impl RenderThread {
    /// Claim the calling thread as the render thread.
    pub fn current() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            thread: std::thread::current().id(),
            sender,
            receiver,
        }
    }

    /// Cloneable handle for submitting work from any thread.
    pub fn handle(&self) -> RenderThreadHandle {
        RenderThreadHandle {
            thread: self.thread,
            sender: self.sender.clone(),
        }
    }

    /// Return `true` on the render thread.
    pub fn is_current(&self) -> bool {
        std::thread::current().id() == self.thread
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Run every queued task in submission order and return how many ran.
    pub fn run_pending(&self) -> TextureResult<usize> {
        if !self.is_current() {
            return Err(TextureError::not_render_thread(
                "deferred render work can only be drained by the render thread",
            ));
        }
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(ran, "drained render queue");
        }
        Ok(ran)
    }
}

/// Submits work to the render thread.
#[derive(Clone)]
pub struct RenderThreadHandle {
    thread: ThreadId,
    sender: Sender<Task>,
}

impl RenderThreadHandle {
    /// Return `true` when called on the render thread.
    pub fn is_render_thread(&self) -> bool {
        std::thread::current().id() == self.thread
    }

    /// Fail with [`TextureError::NotRenderThread`] off the render thread.
    pub fn ensure_render_thread(&self, operation: &str) -> TextureResult<()> {
        if self.is_render_thread() {
            Ok(())
        } else {
            Err(TextureError::not_render_thread(format!(
                "{operation} must run on the render thread"
            )))
        }
    }

    /// Run `task` now on the render thread, otherwise queue it for the render thread.
    pub fn submit(&self, task: impl FnOnce() + Send + 'static) -> TextureResult<Submission> {
        if self.is_render_thread() {
            task();
            return Ok(Submission::Inline);
        }
        self.sender.send(Box::new(task)).map_err(|_| {
            TextureError::not_render_thread("render thread has shut down; task dropped")
        })?;
        Ok(Submission::Deferred)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/render_thread.rs"]
mod tests;
