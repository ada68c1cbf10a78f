//! Reports editor activity to a WakaTime-compatible heartbeat endpoint.
//!
//! Activity flows through [`builder::build`], is filtered by
//! [`gate::DebounceGate`] and, when admitted, is sent in the background by
//! [`dispatch::Dispatcher`]. [`reporter::Reporter`] wires the three together.

pub mod agent;
pub mod builder;
pub mod config;
pub mod dispatch;
pub mod events;
pub mod gate;
pub mod model;
pub mod project;
pub mod reporter;
pub mod transport;

pub use crate::model::{Delivery, HeartBeat, HeartBeatAck};
pub use crate::reporter::Reporter;
