use std::time::Duration;

use crossterm::event::{Event as TerminalEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::time::{Interval, MissedTickBehavior};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// The sampling interval elapsed.
    Tick,
    Resize,
}

impl Event {
    /// Key releases and repeats (reported on Windows) are dropped, as are
    /// mouse, focus and paste events.
    pub fn from_terminal(event: TerminalEvent) -> Option<Self> {
        match event {
            TerminalEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
            TerminalEvent::Resize(..) => Some(Event::Resize),
            _ => None,
        }
    }
}

/// Pulls terminal input and sampling ticks on the caller's task.
pub struct EventSource {
    terminal: EventStream,
    ticks: Interval,
}

impl EventSource {
    pub fn new(tick_rate: Duration) -> Self {
        let mut ticks = tokio::time::interval(tick_rate);
        // A slow sample delays the next tick instead of queueing a burst.
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        EventSource {
            terminal: EventStream::new(),
            ticks,
        }
    }

    /// Returns `None` once terminal input is gone.
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            tokio::select! {
                input = self.terminal.next() => match input? {
                    Ok(raw) => {
                        if let Some(event) = Event::from_terminal(raw) {
                            return Some(event);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "terminal input failed, stopping");
                        return None;
                    }
                },
                _ = self.ticks.tick() => return Some(Event::Tick),
            }
        }
    }
}
