//! Background computation
//!
//! A single worker thread owns the pattern-table cache and runs one scoring
//! job at a time. Clients talk to it through correlated request/response
//! envelopes over channels.

pub mod client;
pub mod protocol;
mod service;

pub use client::{Call, WorkerClient, WorkerConfig};
pub use protocol::{Envelope, Request, Response, ScoreRequest, Tier};
pub use service::spawn_worker;
