use crate::builder::{build, now_seconds};
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::events::{Activity, EventSource};
use crate::gate::DebounceGate;
use crate::model::Delivery;
use crate::project::Project;
use crate::transport::HeartBeatTransport;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Turns editor activity into heartbeats: build, debounce, dispatch.
pub struct Reporter<T> {
    project: Project,
    gate: Arc<DebounceGate>,
    dispatcher: Dispatcher<T>,
}

impl<T: HeartBeatTransport> Reporter<T> {
    pub const SUBSCRIPTION_KEY: &'static str = "wk-reporter";

    pub fn new(project: Project, transport: T, runtime: Handle) -> Self {
        let gate = Arc::new(DebounceGate::new());
        let dispatcher = Dispatcher::new(transport, Arc::clone(&gate), runtime);

        Self {
            project,
            gate,
            dispatcher,
        }
    }

    /// `None` when reporting is switched off or no api key is set.
    /// `make_transport` only runs once the api key is known.
    pub fn from_config(
        config: &Config,
        project: Project,
        make_transport: impl FnOnce(&str) -> anyhow::Result<T>,
        runtime: Handle,
    ) -> Option<Self> {
        if !config.enabled {
            tracing::info!("heartbeat reporting is disabled");
            return None;
        }

        let transport = match config.api_key().and_then(make_transport) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("heartbeat reporting not started: {:#}", e);
                return None;
            }
        };

        tracing::info!("reporting heartbeats for project \"{}\"", project.name);
        Some(Self::new(project, transport, runtime))
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn gate(&self) -> &DebounceGate {
        &self.gate
    }

    pub fn record(&self, activity: &Activity) -> Option<JoinHandle<Delivery>> {
        self.record_at(activity, now_seconds())
    }

    /// Never blocks. Returns the pending delivery when the heartbeat was
    /// admitted.
    pub fn record_at(&self, activity: &Activity, now: f64) -> Option<JoinHandle<Delivery>> {
        let heartbeat = build(
            activity.entity.as_deref(),
            activity.kind.is_write(),
            &self.project,
            now,
        );

        if !self.gate.admit(&heartbeat) {
            tracing::trace!("suppressed {:?} on {}", activity.kind, heartbeat.entity());
            return None;
        }

        tracing::debug!("sending {:?} heartbeat for {}", activity.kind, heartbeat.entity());
        Some(self.dispatcher.send(heartbeat))
    }

    pub fn attach(self: &Arc<Self>, source: &impl EventSource) {
        let reporter = Arc::clone(self);
        source.on_activity(
            Self::SUBSCRIPTION_KEY,
            Arc::new(move |activity: &Activity| {
                reporter.record(activity);
            }),
        );
    }

    pub fn detach(&self, source: &impl EventSource) {
        source.off_activity(Self::SUBSCRIPTION_KEY);
    }
}
