//! Engine-agnostic kernel primitives for goal-driven agents.
//!
//! Conditions and condition stores describe what an agent believes, atomic sub-actions describe
//! what it does, and everything is driven by an external caller one [`TickContext`] at a time.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod agent;
pub mod condition;
pub mod rng;
pub mod sequence;
pub mod store;
pub mod tick;
pub mod world;

pub use action::{ActionFactory, ActionOutcome, ActionStatus, AtomicAction};
pub use agent::AgentId;
pub use condition::Condition;
pub use rng::{DeterministicRng, SplitMix64};
pub use sequence::{AtomicSequence, SequenceStep};
pub use store::ConditionStore;
pub use tick::TickContext;
pub use world::WorldView;
