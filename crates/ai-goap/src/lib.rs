//! Goal-oriented action planning.
//!
//! An [`ActionCatalog`] holds the actions (preconditions, effects, cost, atomic sub-action specs)
//! and the precondition resolvers shared by every agent. [`GoapPlanner`] chains backwards from a
//! goal condition to the cheapest sequence of actions, and [`GoapAgent`] executes that sequence
//! tick by tick on top of an `ai-fsm` lifecycle, replanning when execution fails.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod catalog;
pub mod error;
pub mod plan;
pub mod planner;

pub use agent::{tick_agents, AgentConfig, AgentState, GoapAgent};
pub use catalog::{ActionCatalog, ActionId, GoapAction, PlanContext, Resolver};
pub use error::{CatalogError, GoapError, Result};
pub use plan::{Plan, PlanFailure};
pub use planner::{GoapPlanner, PlannerConfig};
