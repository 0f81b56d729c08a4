//! Routes intents to pipelines under each kind's concurrency policy.
//!
//! # Design
//! Each intent kind owns a lane, created on first use:
//!
//! - A switch lane remembers the token of its in-flight run. A new intent
//!   bumps the lane generation, cancels the old token, reports the old run
//!   `Cancelled`, and spawns the new run.
//! - A queue lane feeds one worker task through an unbounded channel; the
//!   worker runs intents to completion in arrival order.
//!
//! A switch run delivers events only while its generation is current, and
//! that check happens under the same lock the dispatcher takes to supersede
//! it. Once a newer intent has been accepted, nothing from the older run can
//! reach the state container.
//!
//! `dispatch` spawns onto the ambient tokio runtime and must be called from
//! within one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::pipeline::{Pipelines, RunContext};
use crate::signal::{Intent, IntentKind, PipelineEvent, Policy, Signal};
use crate::types::{Activity, Location};

#[derive(Debug, Default)]
struct SwitchState {
    generation: u64,
    active: Option<CancellationToken>,
}

type SwitchLane = Arc<Mutex<SwitchState>>;

enum Lane {
    Switch(SwitchLane),
    Queue(mpsc::UnboundedSender<Intent>),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Delivers one run's events to the state container.
///
/// A gated emitter belongs to a switch-lane run and goes silent as soon as
/// that run is superseded; an ungated one always delivers.
#[derive(Clone)]
pub struct Emitter {
    events: mpsc::UnboundedSender<PipelineEvent>,
    gate: Option<(SwitchLane, u64)>,
}

impl Emitter {
    pub fn ungated(events: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        Self { events, gate: None }
    }

    fn gated(events: mpsc::UnboundedSender<PipelineEvent>, lane: SwitchLane, generation: u64) -> Self {
        Self {
            events,
            gate: Some((lane, generation)),
        }
    }

    /// Emits `signal`, or returns `Cancelled` if this run was superseded.
    pub fn signal(&self, signal: Signal) -> Result<(), ApiError> {
        self.commit_signal(|| {}, signal)
    }

    /// Applies `commit` and emits `signal` while holding the lane, so a
    /// superseded run does neither.
    pub fn commit_signal(&self, commit: impl FnOnce(), signal: Signal) -> Result<(), ApiError> {
        let _state = match &self.gate {
            None => None,
            Some((lane, generation)) => {
                let state = lock(lane);
                if state.generation != *generation {
                    return Err(ApiError::Cancelled);
                }
                Some(state)
            }
        };
        commit();
        self.send(PipelineEvent::Signal(signal));
        Ok(())
    }

    /// Reports how the run ended. A superseded run reports nothing: the
    /// dispatcher already sent its `Cancelled`.
    fn finish(&self, kind: IntentKind, result: Result<(), ApiError>) {
        let _state = match &self.gate {
            None => None,
            Some((lane, generation)) => {
                let mut state = lock(lane);
                if state.generation != *generation {
                    debug!(?kind, "dropping superseded run");
                    return;
                }
                state.active = None;
                Some(state)
            }
        };
        match result {
            Ok(()) => {
                info!(?kind, "pipeline succeeded");
                self.send(PipelineEvent::Succeeded(kind));
            }
            Err(ApiError::Cancelled) => {
                debug!(?kind, "pipeline cancelled");
                self.send(PipelineEvent::Cancelled(kind));
            }
            Err(error) => {
                warn!(?kind, %error, "pipeline failed");
                self.send(PipelineEvent::Failed(kind, error));
            }
        }
    }

    fn send(&self, event: PipelineEvent) {
        if self.events.send(event).is_err() {
            debug!("state container is gone; event dropped");
        }
    }
}

/// Entry point for UI intents.
#[derive(Clone)]
pub struct Dispatcher {
    pipelines: Arc<Pipelines>,
    events: mpsc::UnboundedSender<PipelineEvent>,
    lanes: Arc<Mutex<HashMap<IntentKind, Lane>>>,
}

impl Dispatcher {
    /// Returns the dispatcher and the receiving end of its event stream.
    pub fn new(pipelines: Pipelines) -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            pipelines: Arc::new(pipelines),
            events,
            lanes: Arc::new(Mutex::new(HashMap::new())),
        };
        (dispatcher, rx)
    }

    pub fn dispatch(&self, intent: Intent) {
        let kind = intent.kind();
        info!(?kind, "intent received");
        let mut lanes = lock(&self.lanes);
        match kind.policy() {
            Policy::SwitchToLatest => {
                let lane = match lanes.get(&kind) {
                    Some(Lane::Switch(lane)) => Arc::clone(lane),
                    _ => {
                        let lane = SwitchLane::default();
                        lanes.insert(kind, Lane::Switch(Arc::clone(&lane)));
                        lane
                    }
                };
                drop(lanes);
                self.switch_to(lane, kind, intent);
            }
            Policy::Queue => {
                let queue = match lanes.get(&kind) {
                    Some(Lane::Queue(queue)) => queue.clone(),
                    _ => {
                        let queue = self.spawn_queue_worker();
                        lanes.insert(kind, Lane::Queue(queue.clone()));
                        queue
                    }
                };
                drop(lanes);
                self.send(PipelineEvent::Started(kind));
                if queue.send(intent).is_err() {
                    self.send(PipelineEvent::Failed(
                        kind,
                        ApiError::Network("queue worker stopped".to_string()),
                    ));
                }
            }
        }
    }

    /// Fetches one activity and hands it back directly. No events are
    /// emitted and no lane is involved.
    pub async fn fetch_activity_by_id(&self, id: i64) -> Result<Activity, ApiError> {
        let ctx = RunContext::new(self.pipelines.location().snapshot());
        self.pipelines.fetch_activity_by_id(&ctx, id).await
    }

    /// Replaces the shared location and announces it. `None` clears it.
    pub fn set_location(&self, location: Option<Location>) {
        self.pipelines.location().set(location);
        self.send(PipelineEvent::Signal(Signal::SetLocation { location }));
    }

    pub fn clear_location(&self) {
        self.set_location(None);
    }

    pub fn location(&self) -> Option<Location> {
        self.pipelines.location().current()
    }

    fn switch_to(&self, lane: SwitchLane, kind: IntentKind, intent: Intent) {
        let token = CancellationToken::new();
        let generation = {
            let mut state = lock(&lane);
            state.generation += 1;
            if let Some(previous) = state.active.replace(token.clone()) {
                previous.cancel();
                debug!(?kind, "superseding in-flight run");
                self.send(PipelineEvent::Cancelled(kind));
            }
            self.send(PipelineEvent::Started(kind));
            state.generation
        };

        let emitter = Emitter::gated(self.events.clone(), lane, generation);
        let pipelines = Arc::clone(&self.pipelines);
        tokio::spawn(async move {
            let ctx = RunContext::with_token(pipelines.location().snapshot(), token);
            let result = pipelines.run(intent, &ctx, &emitter).await;
            emitter.finish(kind, result);
        });
    }

    fn spawn_queue_worker(&self) -> mpsc::UnboundedSender<Intent> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Intent>();
        let pipelines = Arc::clone(&self.pipelines);
        let emitter = Emitter::ungated(self.events.clone());
        tokio::spawn(async move {
            while let Some(intent) = rx.recv().await {
                let kind = intent.kind();
                let ctx = RunContext::new(pipelines.location().snapshot());
                let result = pipelines.run(intent, &ctx, &emitter).await;
                emitter.finish(kind, result);
            }
        });
        tx
    }

    fn send(&self, event: PipelineEvent) {
        if self.events.send(event).is_err() {
            debug!("state container is gone; event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::client::ActiveClient;
    use crate::geolocation::FixedGeolocator;
    use crate::http::{HttpRequest, HttpResponse, Transport};
    use crate::query::{LocationState, QueryParams};

    struct Offline;

    #[async_trait]
    impl Transport for Offline {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::Network("offline".to_string()))
        }
    }

    fn pipelines(here: Location) -> Pipelines {
        Pipelines::new(
            ActiveClient::new("http://mock.test"),
            Arc::new(Offline),
            Arc::new(FixedGeolocator::at(here)),
            LocationState::default(),
        )
    }

    #[tokio::test]
    async fn superseded_location_run_leaves_shared_location_alone() {
        let pipelines = pipelines(Location { lat: 1.0, lng: 2.0 });
        let (events, mut rx) = mpsc::unbounded_channel();
        let lane = SwitchLane::default();
        let emitter = Emitter::gated(events, Arc::clone(&lane), 1);
        lock(&lane).generation = 2;

        let ctx = RunContext::new(QueryParams::default());
        let result = pipelines.run(Intent::GetLocation, &ctx, &emitter).await;

        assert_eq!(result, Err(ApiError::Cancelled));
        assert_eq!(pipelines.location().current(), None);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn current_location_run_commits_and_announces() {
        let here = Location { lat: 1.0, lng: 2.0 };
        let pipelines = pipelines(here);
        let (events, mut rx) = mpsc::unbounded_channel();
        let lane = SwitchLane::default();
        lock(&lane).generation = 1;
        let emitter = Emitter::gated(events, lane, 1);

        let ctx = RunContext::new(QueryParams::default());
        pipelines.run(Intent::GetLocation, &ctx, &emitter).await.unwrap();

        assert_eq!(pipelines.location().current(), Some(here));
        assert_eq!(
            rx.try_recv().unwrap(),
            PipelineEvent::Signal(Signal::SetLocation { location: Some(here) })
        );
    }
}
