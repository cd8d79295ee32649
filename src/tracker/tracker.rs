use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};

use super::error::{SourceError, TrackerError};
use super::simulation::SimulatedRoute;
use super::source::LocationSource;
use super::state::TrackerState;
use super::types::{EngineState, LatLng, RefreshOutcome, TrackerMode, ViewModel};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy)]
pub struct TrackerSettings {
    pub default_position: LatLng,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            default_position: super::simulation::DEFAULT_CENTER,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// What one tick of the poll loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollAction {
    Refreshed(RefreshOutcome),
    Simulated,
    Cancelled,
}

#[derive(Debug)]
struct Shared {
    state: TrackerState,
    engine: EngineState,
}

struct Inner<S> {
    source: S,
    simulation: SimulatedRoute,
    request_timeout: Duration,
    shared: StdMutex<Shared>,
    refresh_in_flight: AtomicBool,
}

impl<S> Inner<S> {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_stopped(&self) -> bool {
        self.lock().engine == EngineState::Stopped
    }
}

/// Held while a refresh is pending. Dropping it, including when the refresh
/// future is abandoned, frees the slot for the next request.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Cloneable access to a tracker's state and operations. The web layer and
/// the poll loop each hold one.
///
/// A handle goes inert once its `Tracker` is stopped or dropped: refreshes
/// return `Cancelled` and `advance_simulation` returns `false`.
pub struct TrackerHandle<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for TrackerHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: LocationSource> TrackerHandle<S> {
    pub fn view(&self) -> ViewModel {
        self.inner.lock().state.view()
    }

    pub fn state(&self) -> TrackerState {
        self.inner.lock().state.clone()
    }

    pub fn engine_state(&self) -> EngineState {
        self.inner.lock().engine
    }

    /// Pulls the latest records from the source and replaces the route, or
    /// falls back to simulation if the source cannot be used.
    pub async fn refresh_from_source(&self) -> RefreshOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.inner.refresh_in_flight) else {
            log::debug!("Refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };
        if self.inner.is_stopped() {
            return RefreshOutcome::Cancelled;
        }

        let limit = self.inner.request_timeout;
        let result = match timeout(limit, self.inner.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Unreachable(format!(
                "no response within {}",
                humantime::format_duration(limit)
            ))),
        };

        let mut locked = self.inner.lock();
        if locked.engine == EngineState::Stopped {
            log::debug!("Tracker stopped while refreshing, discarding response");
            return RefreshOutcome::Cancelled;
        }

        match result {
            Ok(samples) => {
                log::debug!("Applying {} location records", samples.len());
                locked.state.apply_samples(samples);
                RefreshOutcome::Live
            }
            Err(err) => {
                log::warn!("Location source failed: {}", err);
                locked.state.apply_failure();
                RefreshOutcome::Fallback
            }
        }
    }

    /// Steps the marker along the simulated route. Returns `false` once the
    /// tracker is stopped.
    pub fn advance_simulation(&self) -> bool {
        let mut locked = self.inner.lock();
        if locked.engine == EngineState::Stopped {
            return false;
        }
        locked.state.advance(&self.inner.simulation);
        true
    }

    /// Out-of-band refresh triggered by the user.
    pub async fn manual_reconnect(&self) -> RefreshOutcome {
        log::info!("Manual reconnect requested");
        self.refresh_from_source().await
    }

    /// The work of one regular tick: refresh while live, advance while
    /// simulated.
    pub async fn poll_once(&self) -> PollAction {
        let (engine, mode) = {
            let locked = self.inner.lock();
            (locked.engine, locked.state.mode)
        };
        if engine == EngineState::Stopped {
            return PollAction::Cancelled;
        }
        match mode {
            TrackerMode::Live => PollAction::Refreshed(self.refresh_from_source().await),
            TrackerMode::Simulated => {
                if self.advance_simulation() {
                    PollAction::Simulated
                } else {
                    PollAction::Cancelled
                }
            }
        }
    }
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Owns the poll loop. Dropping it stops the loop.
pub struct Tracker<S> {
    handle: TrackerHandle<S>,
    poll_interval: Duration,
    worker: Option<WorkerHandle>,
}

impl<S: LocationSource> Tracker<S> {
    pub fn new(source: S, simulation: SimulatedRoute, settings: TrackerSettings) -> Self {
        Self {
            handle: TrackerHandle {
                inner: Arc::new(Inner {
                    source,
                    simulation,
                    request_timeout: settings.request_timeout,
                    shared: StdMutex::new(Shared {
                        state: TrackerState::new(settings.default_position),
                        engine: EngineState::Idle,
                    }),
                    refresh_in_flight: AtomicBool::new(false),
                }),
            },
            poll_interval: settings.poll_interval,
            worker: None,
        }
    }

    pub fn handle(&self) -> TrackerHandle<S> {
        self.handle.clone()
    }

    pub fn start(&mut self) -> Result<(), TrackerError> {
        if self.worker.is_some() {
            return Err(TrackerError::AlreadyRunning);
        }
        {
            let mut locked = self.handle.inner.lock();
            if locked.engine == EngineState::Stopped {
                return Err(TrackerError::Stopped);
            }
            locked.engine = EngineState::Running;
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_poll_loop(
            self.handle.clone(),
            self.poll_interval,
            stop_rx,
        ));
        self.worker = Some(WorkerHandle { stop_tx, join });

        log::info!(
            "Tracker started, polling every {}",
            humantime::format_duration(self.poll_interval)
        );
        Ok(())
    }

    /// Cancels the poll loop and any pending request. Nothing mutates the
    /// tracker state after this returns.
    pub async fn stop(&mut self) {
        self.handle.inner.lock().engine = EngineState::Stopped;
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.join.await;
        }
        log::info!("Tracker stopped");
    }
}

impl<S> Drop for Tracker<S> {
    fn drop(&mut self) {
        self.handle.inner.lock().engine = EngineState::Stopped;
        if let Some(worker) = self.worker.take() {
            worker.join.abort();
        }
    }
}

async fn run_poll_loop<S: LocationSource>(
    handle: TrackerHandle<S>,
    period: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut first = true;

    loop {
        let should_stop = tokio::select! {
            _ = ticker.tick() => false,
            _ = &mut stop_rx => true,
        };
        if should_stop {
            break;
        }

        // The first tick always probes the source, whatever the mode.
        let initial = std::mem::replace(&mut first, false);
        let work = async {
            if initial {
                PollAction::Refreshed(handle.refresh_from_source().await)
            } else {
                handle.poll_once().await
            }
        };

        let action = tokio::select! {
            action = work => Some(action),
            _ = &mut stop_rx => None,
        };
        match action {
            None | Some(PollAction::Cancelled) => break,
            Some(action) => log::trace!("Poll tick: {:?}", action),
        }
    }
}
