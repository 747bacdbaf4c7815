use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

#[test]
fn submit_runs_inline_on_the_render_thread() {
    let render = RenderThread::current();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let how = render
        .handle()
        .submit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert_eq!(how, Submission::Inline);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(render.pending(), 0);
}

#[test]
fn submit_defers_from_other_threads() {
    let render = RenderThread::current();
    let handle = render.handle();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let how = std::thread::spawn(move || {
        assert!(!handle.is_render_thread());
        handle
            .submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap()
    })
    .join()
    .unwrap();

    assert_eq!(how, Submission::Deferred);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(render.pending(), 1);
    assert_eq!(render.run_pending().unwrap(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn only_the_render_thread_drains_the_queue() {
    let render = Arc::new(RenderThread::current());
    let remote = render.clone();
    let err = std::thread::spawn(move || remote.run_pending().unwrap_err())
        .join()
        .unwrap();
    assert!(matches!(err, TextureError::NotRenderThread(_)));

    let handle = render.handle();
    assert!(handle.ensure_render_thread("bind").is_ok());
    let err = std::thread::spawn(move || handle.ensure_render_thread("bind").unwrap_err())
        .join()
        .unwrap();
    assert!(err.to_string().contains("bind must run on the render thread"));
}
