use crate::model::{HeartBeat, HeartBeatAck, COOLDOWN_SECONDS};
use parking_lot::Mutex;

/// Decides whether a heartbeat is worth sending, based on the last one the
/// server accepted.
///
/// Only acknowledgements move the window. Failed, unreachable and duplicate
/// sends leave it where it was, so the next event is judged against the last
/// confirmed heartbeat.
#[derive(Debug, Default)]
pub struct DebounceGate {
    last_ack: Mutex<Option<HeartBeatAck>>,
}

impl DebounceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&self, candidate: &HeartBeat) -> bool {
        let last = self.last_ack.lock();

        match &*last {
            None => true,
            Some(_) if candidate.is_write() => true,
            Some(ack) if ack.entity != candidate.entity() => true,
            Some(ack) => candidate.time() - ack.time >= COOLDOWN_SECONDS,
        }
    }

    /// Replaces the stored acknowledgement. Completions may land out of
    /// order; the last one applied wins.
    pub fn acknowledge(&self, ack: HeartBeatAck) {
        *self.last_ack.lock() = Some(ack);
    }

    pub fn last_ack(&self) -> Option<HeartBeatAck> {
        self.last_ack.lock().clone()
    }
}
