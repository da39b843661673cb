//! End-to-end behaviour of an instrumented slot.

use std::sync::Arc;
use tower::service_fn;

use activity_indicator::{install, NetworkSlot, Phase};

mod common;

use common::{gated_slot, issue, run_pending_tasks, sleep_ms, timing, GateError};

#[tokio::test(start_paused = true)]
async fn single_call_walks_every_phase() {
    let slot = gated_slot();
    let installation = install(&slot, timing()).unwrap();

    let call = issue(&slot).await;
    assert_eq!(installation.in_flight(), 1);
    assert_eq!(installation.phase(), Phase::Start);

    sleep_ms(210).await;
    assert_eq!(installation.phase(), Phase::Waiting);

    assert_eq!(call.settle(Ok("done")).await, Ok("done"));
    assert_eq!(installation.in_flight(), 0);
    assert_eq!(installation.phase(), Phase::Complete);

    sleep_ms(410).await;
    assert_eq!(installation.phase(), Phase::Hidden);
}

#[tokio::test(start_paused = true)]
async fn failure_is_returned_unchanged_and_still_hides() {
    let slot = gated_slot();
    let installation = install(&slot, timing()).unwrap();

    let call = issue(&slot).await;
    assert_eq!(call.settle(Err(GateError("boom"))).await, Err(GateError("boom")));

    let counter = installation.counter();
    assert_eq!(counter.in_flight, 0);
    assert_eq!(counter.failed, 1);
    assert_eq!(installation.phase(), Phase::Complete);

    sleep_ms(410).await;
    assert_eq!(installation.phase(), Phase::Hidden);
}

#[tokio::test(start_paused = true)]
async fn no_calls_never_leave_hidden() {
    let slot = gated_slot();
    let installation = install(&slot, timing()).unwrap();

    sleep_ms(5_000).await;
    assert_eq!(installation.phase(), Phase::Hidden);
    assert_eq!(installation.progress().starts, 0);
}

#[tokio::test(start_paused = true)]
async fn concurrent_calls_start_once_and_hide_after_the_last() {
    let slot = gated_slot();
    let installation = install(&slot, timing()).unwrap();

    let mut calls = Vec::new();
    for _ in 0..5 {
        calls.push(issue(&slot).await);
    }
    assert_eq!(installation.in_flight(), 5);
    assert_eq!(installation.progress().starts, 1);

    let last = calls.pop().unwrap();
    for call in calls {
        call.settle(Ok("ok")).await.unwrap();
    }
    assert_eq!(installation.in_flight(), 1);
    assert!(installation.phase().is_visible());

    sleep_ms(1_000).await;
    assert_eq!(installation.phase(), Phase::Waiting);

    last.settle(Ok("ok")).await.unwrap();
    assert_eq!(installation.phase(), Phase::Complete);

    sleep_ms(410).await;
    assert_eq!(installation.phase(), Phase::Hidden);

    let progress = installation.progress();
    assert_eq!(progress.starts, 1);
    assert_eq!(progress.completions, 1);
    let counter = installation.counter();
    assert_eq!(counter.issued, 5);
    assert_eq!(counter.in_flight, 0);
}

#[tokio::test(start_paused = true)]
async fn overlapping_calls_hide_after_the_later_one() {
    let slot = gated_slot();
    let installation = install(&slot, timing()).unwrap();

    let first = issue(&slot).await;
    sleep_ms(100).await;
    let second = issue(&slot).await;

    // Debounce runs from the first call and is not restarted.
    sleep_ms(110).await;
    assert_eq!(installation.phase(), Phase::Waiting);

    first.settle(Ok("first")).await.unwrap();
    assert_eq!(installation.phase(), Phase::Waiting);

    sleep_ms(600).await;
    assert_eq!(installation.phase(), Phase::Waiting);

    second.settle(Ok("second")).await.unwrap();
    assert_eq!(installation.phase(), Phase::Complete);

    sleep_ms(410).await;
    assert_eq!(installation.phase(), Phase::Hidden);
    assert_eq!(installation.progress().starts, 1);
}

#[tokio::test(start_paused = true)]
async fn aborted_caller_still_settles() {
    let slot = gated_slot();
    let installation = install(&slot, timing()).unwrap();

    let call = issue(&slot).await;
    call.handle.abort();
    run_pending_tasks().await;

    let counter = installation.counter();
    assert_eq!(counter.in_flight, 0);
    assert_eq!(counter.cancelled, 1);
    assert_eq!(installation.phase(), Phase::Complete);
}

#[tokio::test(start_paused = true)]
async fn bursts_stay_visible_until_quiet() {
    let slot = gated_slot();
    let installation = install(&slot, timing()).unwrap();

    for _ in 0..10 {
        let call = issue(&slot).await;
        call.settle(Ok("ok")).await.unwrap();
        assert!(installation.phase().is_visible());

        sleep_ms(50).await;
        assert!(installation.phase().is_visible());
    }

    sleep_ms(410).await;
    assert_eq!(installation.phase(), Phase::Hidden);

    let counter = installation.counter();
    assert_eq!(counter.issued, 10);
    assert_eq!(counter.succeeded, 10);
}

#[tokio::test(start_paused = true)]
async fn uninstall_detaches_new_calls_but_settles_old_ones() {
    let slot = gated_slot();
    let installation = install(&slot, timing()).unwrap();
    let counter = installation.activity_counter();
    let indicator = installation.indicator();

    let before = issue(&slot).await;
    assert_eq!(counter.in_flight(), 1);

    installation.uninstall();
    assert!(!slot.is_instrumented());
    assert_eq!(indicator.phase(), Phase::Hidden);

    let after = issue(&slot).await;
    assert_eq!(counter.in_flight(), 1);
    assert_eq!(counter.snapshot().issued, 1);

    assert_eq!(before.settle(Ok("before")).await, Ok("before"));
    assert_eq!(counter.in_flight(), 0);
    assert_eq!(after.settle(Ok("after")).await, Ok("after"));
    assert_eq!(counter.snapshot().issued, 1);

    sleep_ms(1_000).await;
    assert_eq!(indicator.phase(), Phase::Hidden);
    assert_eq!(indicator.snapshot().completions, 0);
}

#[tokio::test(start_paused = true)]
async fn reinstall_starts_from_zero() {
    let slot = gated_slot();

    let first = install(&slot, timing()).unwrap();
    let call = issue(&slot).await;
    call.settle(Ok("ok")).await.unwrap();
    first.uninstall();

    let second = install(&slot, timing()).unwrap();
    assert_eq!(second.counter().issued, 0);
    assert_eq!(second.phase(), Phase::Hidden);

    let call = issue(&slot).await;
    assert_eq!(second.phase(), Phase::Start);
    call.settle(Ok("ok")).await.unwrap();
}

async fn crashing_primitive(_: u32) -> Result<u32, ()> {
    tokio::task::yield_now().await;
    panic!("primitive crashed");
}

#[tokio::test(start_paused = true)]
async fn panicking_call_settles_once_and_hides() {
    let slot = Arc::new(NetworkSlot::new(service_fn(crashing_primitive)));
    let installation = install(&slot, timing()).unwrap();

    let handle = tokio::spawn(slot.fetch(1));
    let joined = handle.await;
    assert!(joined.unwrap_err().is_panic());

    let counter = installation.counter();
    assert_eq!(counter.in_flight, 0);
    assert_eq!(counter.issued, 1);
    assert_eq!(counter.cancelled, 1);
    assert_eq!(installation.phase(), Phase::Complete);

    sleep_ms(410).await;
    assert_eq!(installation.phase(), Phase::Hidden);
}
