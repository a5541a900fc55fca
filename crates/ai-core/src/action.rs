use crate::{ConditionStore, TickContext, WorldView};

/// Status reported by an atomic sub-action's `start`/`update` hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Running,
    Success,
    Failed,
}

/// Terminal result of a sub-action, action or whole plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Success,
    Failed,
}

impl From<ActionOutcome> for ActionStatus {
    fn from(value: ActionOutcome) -> Self {
        match value {
            ActionOutcome::Success => ActionStatus::Success,
            ActionOutcome::Failed => ActionStatus::Failed,
        }
    }
}

impl ActionStatus {
    pub fn outcome(self) -> Option<ActionOutcome> {
        match self {
            ActionStatus::Running => None,
            ActionStatus::Success => Some(ActionOutcome::Success),
            ActionStatus::Failed => Some(ActionOutcome::Failed),
        }
    }
}

/// Smallest executable unit of a planned action.
///
/// The executor calls `start` on the first step, `update` on every following step while the
/// sub-action keeps reporting [`ActionStatus::Running`], and `exit` exactly once afterwards:
/// after `Success`, after `Failed`, or when the surrounding plan is abandoned.
pub trait AtomicAction<W>: 'static
where
    W: WorldView + 'static,
{
    fn start(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        beliefs: &mut ConditionStore,
    ) -> ActionStatus;

    /// Defaults to polling `start` again.
    fn update(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        beliefs: &mut ConditionStore,
    ) -> ActionStatus {
        self.start(ctx, agent, world, beliefs)
    }

    fn exit(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _beliefs: &mut ConditionStore,
    ) {
    }
}

/// Build runtime sub-actions from immutable, shareable specs.
///
/// Catalog actions only store `Spec` values; every agent instantiates its own sub-actions when the
/// executor reaches them, so per-run state (timers, counters) never leaks between agents.
pub trait ActionFactory<W>: 'static
where
    W: WorldView + 'static,
{
    type Spec: Clone + 'static;

    fn build(
        &self,
        spec: &Self::Spec,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
    ) -> Box<dyn AtomicAction<W>>;
}
