// Tests for the countdown timer driving a question's recording window.
//
// The clock is paused, so the one-second cadence is simulated and the
// tests complete instantly.

use vivavoce::timer::{CountdownTimer, TimerEvent};

#[tokio::test(start_paused = true)]
async fn counts_down_then_fires_deadline_once() {
    let mut handle = CountdownTimer::start(5);

    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }

    assert_eq!(
        events,
        vec![
            TimerEvent::Tick(5),
            TimerEvent::Tick(4),
            TimerEvent::Tick(3),
            TimerEvent::Tick(2),
            TimerEvent::Tick(1),
            TimerEvent::Deadline,
        ],
        "Ticks report remaining seconds before each decrement, then one deadline"
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_suppresses_all_remaining_events() {
    let mut handle = CountdownTimer::start(10);

    assert_eq!(handle.next_event().await, Some(TimerEvent::Tick(10)));
    assert_eq!(handle.next_event().await, Some(TimerEvent::Tick(9)));

    handle.cancel();

    assert_eq!(
        handle.next_event().await,
        None,
        "No residual ticks or deadline after cancel"
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_after_deadline_is_a_no_op() {
    let mut handle = CountdownTimer::start(1);

    assert_eq!(handle.next_event().await, Some(TimerEvent::Tick(1)));
    assert_eq!(handle.next_event().await, Some(TimerEvent::Deadline));

    // The deadline already won; cancel must not do anything
    handle.cancel();

    assert_eq!(handle.next_event().await, None);
}

#[tokio::test(start_paused = true)]
async fn double_cancel_is_a_no_op() {
    let mut handle = CountdownTimer::start(30);

    assert_eq!(handle.next_event().await, Some(TimerEvent::Tick(30)));

    handle.cancel();
    handle.cancel();

    assert_eq!(handle.next_event().await, None);
}

#[tokio::test(start_paused = true)]
async fn zero_budget_fires_deadline_immediately() {
    let mut handle = CountdownTimer::start(0);

    assert_eq!(handle.next_event().await, Some(TimerEvent::Deadline));
    assert_eq!(handle.next_event().await, None);
}
