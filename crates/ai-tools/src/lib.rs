//! Tooling primitives for goal-driven agents.
//!
//! Trace records are plain data so a host can collect them during simulation and render them in
//! whatever debug overlay it has. Nothing here is global: sinks are handed to the agents that
//! write into them.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{NullTraceSink, SharedTraceLog, TraceEvent, TraceLog, TraceSink};
