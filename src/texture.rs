/// Component trait, core components and the GPU upload boundary.
pub mod component;
/// Event dispatch and the texture builder.
pub mod event_driven;
/// Texture registry for the render loop.
pub mod registry;
/// Render thread affinity and deferred work.
pub mod render_thread;
pub(crate) mod state;
/// Event-scoped frame views.
pub mod view;
