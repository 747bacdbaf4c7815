use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use super::*;

#[test]
fn subscribers_run_once_on_first_close() {
    let status = CloseStatus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    for _ in 0..3 {
        let hits = hits.clone();
        status.subscribe(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert!(status.close());
    assert!(!status.close());
    assert!(status.is_closed());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test]
fn late_subscriber_runs_immediately() {
    let status = CloseStatus::new();
    status.close();
    let hit = Arc::new(AtomicBool::new(false));
    let h = hit.clone();
    status.subscribe(move || h.store(true, Ordering::SeqCst));
    assert!(hit.load(Ordering::SeqCst));
}

#[test]
fn concurrent_close_notifies_once() {
    let status = Arc::new(CloseStatus::new());
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    status.subscribe(move || {
        h.fetch_add(1, Ordering::SeqCst);
    });

    let winners: usize = (0..8)
        .map(|_| {
            let status = status.clone();
            std::thread::spawn(move || status.close())
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|t| usize::from(t.join().unwrap()))
        .sum();
    assert_eq!(winners, 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
