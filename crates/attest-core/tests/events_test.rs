use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use attest_core::events::*;

struct Panicky;

impl LoopEventHandler for Panicky {
    fn on_iteration_started(&self, _event: &IterationStartedEvent) {
        panic!("handler bug");
    }
}

#[derive(Default)]
struct Recorder {
    started: AtomicUsize,
    finished: Mutex<Vec<String>>,
}

impl LoopEventHandler for Recorder {
    fn on_iteration_started(&self, _event: &IterationStartedEvent) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_run_finished(&self, event: &RunFinishedEvent) {
        self.finished.lock().unwrap().push(event.termination.clone());
    }
}

fn started(iteration: u32) -> IterationStartedEvent {
    IterationStartedEvent {
        iteration,
        snapshot_fingerprint: 42,
        file_count: 3,
    }
}

#[test]
fn panicking_handler_does_not_block_later_handlers() {
    let recorder = Arc::new(Recorder::default());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(Arc::new(Panicky));
    dispatcher.register(recorder.clone());
    assert_eq!(dispatcher.handler_count(), 2);

    dispatcher.emit_iteration_started(&started(1));
    dispatcher.emit_iteration_started(&started(2));
    assert_eq!(recorder.started.load(Ordering::SeqCst), 2);
}

#[test]
fn unhandled_events_are_no_ops() {
    let recorder = Arc::new(Recorder::default());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(recorder.clone());

    dispatcher.emit_claim_verified(&ClaimVerifiedEvent {
        iteration: 1,
        claim_id: "c-1".into(),
        verdict: "PASS".into(),
        checker_error: false,
    });
    dispatcher.emit_run_finished(&RunFinishedEvent {
        iterations: 1,
        termination: "CONVERGED".into(),
        complete: true,
        duration_ms: 5,
    });
    assert_eq!(recorder.started.load(Ordering::SeqCst), 0);
    assert_eq!(*recorder.finished.lock().unwrap(), vec!["CONVERGED".to_string()]);
}

#[test]
fn empty_dispatcher_accepts_events() {
    let dispatcher = EventDispatcher::new();
    dispatcher.emit_iteration_started(&started(1));
    assert_eq!(dispatcher.handler_count(), 0);
}
