use crate::gate::DebounceGate;
use crate::model::{Delivery, HeartBeat};
use crate::transport::HeartBeatTransport;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Sends admitted heartbeats in the background and feeds acknowledgements
/// back into the gate.
pub struct Dispatcher<T> {
    transport: Arc<T>,
    gate: Arc<DebounceGate>,
    runtime: Handle,
}

impl<T: HeartBeatTransport> Dispatcher<T> {
    pub fn new(transport: T, gate: Arc<DebounceGate>, runtime: Handle) -> Self {
        Self {
            transport: Arc::new(transport),
            gate,
            runtime,
        }
    }

    /// Returns immediately. Dropping the handle does not cancel the send.
    pub fn send(&self, heartbeat: HeartBeat) -> JoinHandle<Delivery> {
        let transport = Arc::clone(&self.transport);
        let gate = Arc::clone(&self.gate);

        self.runtime.spawn(async move {
            let entity = heartbeat.entity().to_owned();

            let delivery = match transport.post(heartbeat).await {
                Ok(body) => Delivery::from_body(&body),
                Err(e) => {
                    tracing::debug!("heartbeat transport failed: {:#}", e);
                    Delivery::Unreachable
                }
            };

            complete(&gate, &entity, &delivery);
            delivery
        })
    }
}

fn complete(gate: &DebounceGate, entity: &str, delivery: &Delivery) {
    match delivery {
        Delivery::Unreachable => {
            tracing::warn!("could not reach the heartbeat server, is the network up?")
        }
        Delivery::Duplicate => tracing::debug!("server already has a heartbeat for {}", entity),
        Delivery::Rejected(e) => tracing::error!("heartbeat for {} rejected: {}", entity, e),
        Delivery::Accepted(ack) => {
            tracing::debug!("heartbeat {} accepted for {}", ack.id, ack.entity);
            gate.acknowledge(ack.clone());
        }
    }
}
