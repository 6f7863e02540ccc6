use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Events emitted by a running countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Remaining whole seconds, reported before each decrement
    Tick(u32),
    /// The budget is exhausted; fires exactly once, then the timer stops
    Deadline,
}

/// One-second-granularity countdown bounded by a question's recording budget
///
/// The first tick reports the full budget, decreasing to 1; when the
/// remaining time would go below zero, `Deadline` fires once and the task
/// stops itself. `Deadline` and `cancel` are mutually exclusive for a given
/// start: whichever happens first wins and the loser is a no-op. After a
/// cancel, no further events fire.
pub struct CountdownTimer;

impl CountdownTimer {
    pub fn start(budget_secs: u32) -> CountdownHandle {
        let (event_tx, event_rx) = mpsc::channel(4);
        let (cancel_tx, cancel_rx) = oneshot::channel();

        tokio::spawn(run_countdown(budget_secs, event_tx, cancel_rx));

        CountdownHandle {
            events: event_rx,
            cancel: Some(cancel_tx),
        }
    }
}

/// Handle to a running countdown: event stream plus cancellation
pub struct CountdownHandle {
    events: mpsc::Receiver<TimerEvent>,
    cancel: Option<oneshot::Sender<()>>,
}

impl CountdownHandle {
    /// Next timer event; `None` once the countdown has stopped
    pub async fn next_event(&mut self) -> Option<TimerEvent> {
        self.events.recv().await
    }

    /// Stop the countdown; a no-op if the deadline already fired
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

async fn run_countdown(
    budget_secs: u32,
    events: mpsc::Sender<TimerEvent>,
    mut cancel: oneshot::Receiver<()>,
) {
    if budget_secs == 0 {
        let _ = events.send(TimerEvent::Deadline).await;
        return;
    }

    let mut remaining = budget_secs;

    loop {
        if events.send(TimerEvent::Tick(remaining)).await.is_err() {
            return;
        }

        tokio::select! {
            _ = &mut cancel => return,
            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
        }

        remaining -= 1;

        if remaining == 0 {
            let _ = events.send(TimerEvent::Deadline).await;
            return;
        }
    }
}
