//! Task that drives a [`TimerEngine`] once per second.
//!
//! The engine lives inside a single tokio task. Commands from any number of
//! [`TimerHandle`]s and the one-second ticks are handled one at a time by that
//! task, so they never interleave. The interval only exists while the engine
//! is running; it is dropped before a command's reply is sent, so once
//! `pause().await` returns no further tick can land.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::engine::TimerEngine;
use super::phase::Durations;
use crate::error::CoreError;
use crate::events::Event;

const TICK: Duration = Duration::from_secs(1);
const EVENT_CAPACITY: usize = 256;
const REQUEST_CAPACITY: usize = 32;

/// Manual timer controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Pause,
    Reset,
    Skip,
    ExtendBreak(u64),
}

impl TimerCommand {
    fn apply(self, engine: &mut TimerEngine) {
        match self {
            TimerCommand::Start => engine.start(),
            TimerCommand::Pause => engine.pause(),
            TimerCommand::Reset => engine.reset(),
            TimerCommand::Skip => engine.skip_to_next_phase(),
            TimerCommand::ExtendBreak(secs) => engine.extend_break(secs),
        }
    }
}

enum Request {
    Command(TimerCommand, oneshot::Sender<Event>),
    SetDurations(Durations, oneshot::Sender<Event>),
    Snapshot(oneshot::Sender<Event>),
    Shutdown(oneshot::Sender<()>),
}

enum Step {
    Tick,
    Request(Option<Request>),
}

pub struct TimerService;

impl TimerService {
    /// Move `engine` into a new task and return a handle to it.
    ///
    /// Must be called inside a tokio runtime. The task ends on
    /// [`TimerHandle::shutdown`] or when the last handle is dropped.
    pub fn spawn(engine: TimerEngine) -> TimerHandle {
        let (requests_tx, requests_rx) = mpsc::channel(REQUEST_CAPACITY);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        tokio::spawn(run(engine, requests_rx, events_tx.clone()));
        TimerHandle {
            requests: requests_tx,
            events: events_tx,
        }
    }
}

/// Imperative handle to a running [`TimerService`].
///
/// Every call resolves after the request has been applied and returns a
/// fresh [`Event::StateSnapshot`].
#[derive(Clone)]
pub struct TimerHandle {
    requests: mpsc::Sender<Request>,
    events: broadcast::Sender<Event>,
}

impl TimerHandle {
    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub async fn start(&self) -> Result<Event, CoreError> {
        self.command(TimerCommand::Start).await
    }

    pub async fn pause(&self) -> Result<Event, CoreError> {
        self.command(TimerCommand::Pause).await
    }

    pub async fn reset(&self) -> Result<Event, CoreError> {
        self.command(TimerCommand::Reset).await
    }

    pub async fn skip(&self) -> Result<Event, CoreError> {
        self.command(TimerCommand::Skip).await
    }

    pub async fn extend_break(&self, extra_secs: u64) -> Result<Event, CoreError> {
        self.command(TimerCommand::ExtendBreak(extra_secs)).await
    }

    pub async fn command(&self, command: TimerCommand) -> Result<Event, CoreError> {
        self.call(|reply| Request::Command(command, reply)).await
    }

    pub async fn set_durations(&self, durations: Durations) -> Result<Event, CoreError> {
        self.call(|reply| Request::SetDurations(durations, reply))
            .await
    }

    pub async fn snapshot(&self) -> Result<Event, CoreError> {
        self.call(Request::Snapshot).await
    }

    /// Stop the service. Other handles fail with [`CoreError::TimerStopped`]
    /// afterwards.
    pub async fn shutdown(&self) -> Result<(), CoreError> {
        self.call(Request::Shutdown).await
    }

    async fn call<T>(
        &self,
        request: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, CoreError> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(request(tx))
            .await
            .map_err(|_| CoreError::TimerStopped)?;
        rx.await.map_err(|_| CoreError::TimerStopped)
    }
}

async fn run(
    mut engine: TimerEngine,
    mut requests: mpsc::Receiver<Request>,
    events: broadcast::Sender<Event>,
) {
    let mut ticker: Option<Interval> = None;
    loop {
        let step = tokio::select! {
            biased;
            () = next_tick(&mut ticker) => Step::Tick,
            request = requests.recv() => Step::Request(request),
        };

        match step {
            Step::Tick => {
                engine.tick();
                settle(&mut engine, &events, &mut ticker);
            }
            Step::Request(None) => break,
            Step::Request(Some(Request::Command(command, reply))) => {
                command.apply(&mut engine);
                settle(&mut engine, &events, &mut ticker);
                let _ = reply.send(engine.snapshot());
            }
            Step::Request(Some(Request::SetDurations(durations, reply))) => {
                engine.set_durations(durations);
                settle(&mut engine, &events, &mut ticker);
                let _ = reply.send(engine.snapshot());
            }
            Step::Request(Some(Request::Snapshot(reply))) => {
                let _ = reply.send(engine.snapshot());
            }
            Step::Request(Some(Request::Shutdown(reply))) => {
                engine.pause();
                settle(&mut engine, &events, &mut ticker);
                let _ = reply.send(());
                break;
            }
        }
    }
    tracing::debug!("timer service stopped");
}

/// Publish queued events and make the interval match the running flag.
fn settle(
    engine: &mut TimerEngine,
    events: &broadcast::Sender<Event>,
    ticker: &mut Option<Interval>,
) {
    for event in engine.drain_events() {
        // No subscribers is fine.
        let _ = events.send(event);
    }
    match (engine.is_running(), ticker.is_some()) {
        (true, false) => {
            let mut interval = tokio::time::interval_at(Instant::now() + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            *ticker = Some(interval);
        }
        (false, true) => *ticker = None,
        _ => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
