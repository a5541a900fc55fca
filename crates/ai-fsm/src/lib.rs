//! Finite state machine runtime built on `ai-core`.
//!
//! States own actions with an enter/update/exit lifecycle and map events to destination states.
//! Only the machine's current-state pointer mutates once it is built.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod error;
pub mod fsm;

pub use action::{FsmAction, FsmContext, TimedEvent};
pub use error::FsmError;
pub use fsm::{Fsm, FsmBuilder, FsmEvent, StateId, MAX_CHAINED_TRANSITIONS};
