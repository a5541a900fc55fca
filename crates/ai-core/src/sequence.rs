use crate::{ActionStatus, AtomicAction, ConditionStore, TickContext, WorldView};

/// Result of a single [`AtomicSequence::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStep {
    /// The active sub-action is still running.
    Running,
    /// A sub-action succeeded and the cursor moved to the next one.
    Advanced,
    /// The last sub-action succeeded (or the sequence was empty).
    Completed,
    /// The active sub-action failed; the sequence must not be stepped again.
    Failed,
}

/// Runs the atomic sub-actions of one planned action, one lifecycle call per step.
pub struct AtomicSequence<W>
where
    W: WorldView + 'static,
{
    steps: Vec<Box<dyn AtomicAction<W>>>,
    index: usize,
    started: bool,
    failed: bool,
}

impl<W> AtomicSequence<W>
where
    W: WorldView + 'static,
{
    pub fn new(steps: Vec<Box<dyn AtomicAction<W>>>) -> Self {
        Self {
            steps,
            index: 0,
            started: false,
            failed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Whether the sub-action at the cursor has been started and not yet exited.
    pub fn is_active(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.failed || self.index >= self.steps.len()
    }

    pub fn step(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        beliefs: &mut ConditionStore,
    ) -> SequenceStep {
        if self.failed {
            return SequenceStep::Failed;
        }
        let Some(current) = self.steps.get_mut(self.index) else {
            return SequenceStep::Completed;
        };

        let status = if self.started {
            current.update(ctx, agent, world, beliefs)
        } else {
            self.started = true;
            current.start(ctx, agent, world, beliefs)
        };

        match status {
            ActionStatus::Running => SequenceStep::Running,
            ActionStatus::Success => {
                current.exit(ctx, agent, world, beliefs);
                self.started = false;
                self.index += 1;
                if self.index >= self.steps.len() {
                    SequenceStep::Completed
                } else {
                    SequenceStep::Advanced
                }
            }
            ActionStatus::Failed => {
                current.exit(ctx, agent, world, beliefs);
                self.started = false;
                self.failed = true;
                SequenceStep::Failed
            }
        }
    }

    /// Abandon the sequence, giving the active sub-action its `exit` call.
    pub fn abort(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        beliefs: &mut ConditionStore,
    ) {
        if !self.started {
            return;
        }
        if let Some(current) = self.steps.get_mut(self.index) {
            current.exit(ctx, agent, world, beliefs);
        }
        self.started = false;
    }
}
