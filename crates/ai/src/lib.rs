//! Umbrella crate that re-exports the `ai-*` building blocks.
//!
//! `core` carries conditions, condition stores and atomic sub-actions; `fsm` the event-driven
//! state machine; `goap` the planner and the agent executor built on both; `tools` the trace
//! records agents emit.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use ai_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use ai_tools as tools;

#[cfg(feature = "fsm")]
#[cfg_attr(docsrs, doc(cfg(feature = "fsm")))]
pub use ai_fsm as fsm;

#[cfg(feature = "goap")]
#[cfg_attr(docsrs, doc(cfg(feature = "goap")))]
pub use ai_goap as goap;
