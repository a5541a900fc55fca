//! The world and scripted sub-actions the CLI simulates domains with.

use ai_core::{
    ActionFactory, ActionStatus, AtomicAction, Condition, ConditionStore, TickContext, WorldView,
};
use serde::Deserialize;

/// A world made only of named boolean facts.
#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    pub facts: ConditionStore,
}

impl WorldView for SimWorld {
    type Agent = u64;
}

/// One scripted sub-action of a domain action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSpec {
    /// Keeps running for `ticks` updates after starting.
    Wait { ticks: u32 },
    /// Writes a fact into the world and the agent's beliefs.
    Set { fact: String, value: bool },
    /// Fails unless the world fact currently has `value`.
    Check { fact: String, value: bool },
    Succeed,
    Fail,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptFactory;

impl ActionFactory<SimWorld> for ScriptFactory {
    type Spec = StepSpec;

    fn build(
        &self,
        spec: &StepSpec,
        _ctx: &TickContext,
        _agent: u64,
        _world: &SimWorld,
    ) -> Box<dyn AtomicAction<SimWorld>> {
        match spec {
            StepSpec::Wait { ticks } => Box::new(Wait { remaining: *ticks }),
            StepSpec::Set { fact, value } => Box::new(Set(Condition::new(fact.as_str(), *value))),
            StepSpec::Check { fact, value } => {
                Box::new(Check(Condition::new(fact.as_str(), *value)))
            }
            StepSpec::Succeed => Box::new(Fixed(ActionStatus::Success)),
            StepSpec::Fail => Box::new(Fixed(ActionStatus::Failed)),
        }
    }
}

struct Wait {
    remaining: u32,
}

impl Wait {
    fn status(&self) -> ActionStatus {
        if self.remaining == 0 {
            ActionStatus::Success
        } else {
            ActionStatus::Running
        }
    }
}

impl AtomicAction<SimWorld> for Wait {
    fn start(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &mut SimWorld,
        _beliefs: &mut ConditionStore,
    ) -> ActionStatus {
        self.status()
    }

    fn update(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &mut SimWorld,
        _beliefs: &mut ConditionStore,
    ) -> ActionStatus {
        self.remaining = self.remaining.saturating_sub(1);
        self.status()
    }
}

struct Set(Condition);

impl AtomicAction<SimWorld> for Set {
    fn start(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut SimWorld,
        beliefs: &mut ConditionStore,
    ) -> ActionStatus {
        world.facts.set(self.0.name(), self.0.value());
        beliefs.set(self.0.name(), self.0.value());
        ActionStatus::Success
    }
}

struct Check(Condition);

impl AtomicAction<SimWorld> for Check {
    fn start(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut SimWorld,
        beliefs: &mut ConditionStore,
    ) -> ActionStatus {
        let actual = world.facts.get(self.0.name());
        // whatever the outcome, the agent now knows the real value
        beliefs.set(self.0.name(), actual);
        if actual == self.0.value() {
            ActionStatus::Success
        } else {
            ActionStatus::Failed
        }
    }
}

struct Fixed(ActionStatus);

impl AtomicAction<SimWorld> for Fixed {
    fn start(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &mut SimWorld,
        _beliefs: &mut ConditionStore,
    ) -> ActionStatus {
        self.0
    }
}
