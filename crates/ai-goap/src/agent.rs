use std::sync::Arc;

use ai_core::{
    ActionFactory, ActionOutcome, AgentId, AtomicSequence, Condition, ConditionStore,
    SequenceStep, TickContext, WorldView,
};
use ai_fsm::{Fsm, FsmBuilder, FsmError, FsmEvent, StateId};
use ai_tools::{NullTraceSink, TraceEvent, TraceSink};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{ActionCatalog, CatalogError, GoapPlanner, Plan, PlanContext, Result};

const GOAL_SET: FsmEvent = FsmEvent("GoalSet");
const PLAN_FOUND: FsmEvent = FsmEvent("PlanFound");
const PLAN_FAILED: FsmEvent = FsmEvent("PlanFailed");
const FINISHED: FsmEvent = FsmEvent("Finished");
const FAILED: FsmEvent = FsmEvent("Failed");
const ABORT: FsmEvent = FsmEvent("Abort");
const REPLAN: FsmEvent = FsmEvent("Replan");
const SETTLE: FsmEvent = FsmEvent("Settle");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentState {
    Idle,
    Planning,
    Executing,
    Cleanup,
}

impl AgentState {
    pub fn name(self) -> &'static str {
        match self {
            AgentState::Idle => "Idle",
            AgentState::Planning => "Planning",
            AgentState::Executing => "Executing",
            AgentState::Cleanup => "Cleanup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct AgentConfig {
    /// Plan again for the same goals after a plan completes successfully.
    pub replan_on_success: bool,

    /// Failed plans tolerated in a row before the agent stops replanning and goes idle.
    ///
    /// Guards against loops where the same plan keeps failing at runtime because the catalog's
    /// modeled effects do not match what the sub-actions actually achieve.
    pub max_consecutive_failures: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
struct LifecycleStates {
    idle: StateId,
    planning: StateId,
    executing: StateId,
    cleanup: StateId,
}

fn lifecycle() -> std::result::Result<(Fsm<()>, LifecycleStates), FsmError> {
    let mut builder = FsmBuilder::new("goap-agent").delayed_transitions(true);
    let states = LifecycleStates {
        idle: builder.add_state(AgentState::Idle.name())?,
        planning: builder.add_state(AgentState::Planning.name())?,
        executing: builder.add_state(AgentState::Executing.name())?,
        cleanup: builder.add_state(AgentState::Cleanup.name())?,
    };

    builder.add_transition(states.idle, GOAL_SET, states.planning)?;
    builder.add_transition(states.planning, PLAN_FOUND, states.executing)?;
    builder.add_transition(states.planning, PLAN_FAILED, states.idle)?;
    builder.add_transition(states.planning, REPLAN, states.planning)?;
    builder.add_transition(states.executing, FINISHED, states.cleanup)?;
    builder.add_transition(states.executing, FAILED, states.cleanup)?;
    builder.add_transition(states.executing, ABORT, states.cleanup)?;
    builder.add_transition(states.cleanup, REPLAN, states.planning)?;
    builder.add_transition(states.cleanup, SETTLE, states.idle)?;

    Ok((builder.build(states.idle)?, states))
}

/// A goal-driven agent: plans against a shared catalog and executes the plan one atomic
/// sub-action step per tick.
///
/// The lifecycle runs on a delayed-transition state machine, so every state change requested
/// during a tick (or between ticks) takes effect at the start of the next one.
pub struct GoapAgent<W, F>
where
    W: WorldView + 'static,
    F: ActionFactory<W>,
{
    id: W::Agent,
    catalog: Arc<ActionCatalog<W, F::Spec>>,
    planner: GoapPlanner,
    factory: F,
    config: AgentConfig,

    goals: Vec<Condition>,
    beliefs: ConditionStore,
    plan: Plan,
    action_index: usize,
    current: Option<AtomicSequence<W>>,
    replan_requested: bool,
    consecutive_failures: u32,
    last_outcome: Option<ActionOutcome>,

    fsm: Fsm<()>,
    states: LifecycleStates,
    tick: TickContext,
    trace: Box<dyn TraceSink>,
}

impl<W, F> GoapAgent<W, F>
where
    W: WorldView + 'static,
    F: ActionFactory<W>,
{
    pub fn new(id: W::Agent, catalog: Arc<ActionCatalog<W, F::Spec>>, factory: F) -> Result<Self> {
        if !catalog.is_configured() {
            return Err(CatalogError::NotConfigured.into());
        }
        let (fsm, states) = lifecycle()?;

        Ok(Self {
            id,
            catalog,
            planner: GoapPlanner::default(),
            factory,
            config: AgentConfig::default(),
            goals: Vec::new(),
            beliefs: ConditionStore::new(),
            plan: Plan::empty(),
            action_index: 0,
            current: None,
            replan_requested: false,
            consecutive_failures: 0,
            last_outcome: None,
            fsm,
            states,
            tick: TickContext::new(0, 0.0),
            trace: Box::new(NullTraceSink),
        })
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_planner(mut self, planner: GoapPlanner) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_beliefs(mut self, beliefs: ConditionStore) -> Self {
        self.beliefs = beliefs;
        self
    }

    pub fn with_trace_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace = Box::new(sink);
        self
    }

    pub fn id(&self) -> W::Agent {
        self.id
    }

    pub fn catalog(&self) -> &ActionCatalog<W, F::Spec> {
        &self.catalog
    }

    pub fn state(&self) -> AgentState {
        self.agent_state(self.fsm.current_state())
    }

    fn agent_state(&self, current: StateId) -> AgentState {
        if current == self.states.planning {
            AgentState::Planning
        } else if current == self.states.executing {
            AgentState::Executing
        } else if current == self.states.cleanup {
            AgentState::Cleanup
        } else {
            AgentState::Idle
        }
    }

    pub fn state_name(&self) -> &str {
        self.fsm.current_state_name()
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// `(action index in the plan, sub-action index within that action)`.
    pub fn cursor(&self) -> (usize, usize) {
        let sub = self
            .current
            .as_ref()
            .map_or(0, AtomicSequence::current_index);
        (self.action_index, sub)
    }

    /// Main goal first, fallbacks after it.
    pub fn goals(&self) -> &[Condition] {
        &self.goals
    }

    pub fn beliefs(&self) -> &ConditionStore {
        &self.beliefs
    }

    pub fn beliefs_mut(&mut self) -> &mut ConditionStore {
        &mut self.beliefs
    }

    pub fn last_outcome(&self) -> Option<ActionOutcome> {
        self.last_outcome
    }

    pub fn is_replan_requested(&self) -> bool {
        self.replan_requested
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn add_goal(&mut self, goal: Condition) -> Result<()> {
        debug!(agent = ?self.id, goal = %goal, "goal added");
        self.goals.push(goal);
        if self.state() == AgentState::Idle {
            return self.send(GOAL_SET);
        }
        // A transition to idle may already be queued; the idle tick honours the flag.
        self.replan_requested = true;
        Ok(())
    }

    /// Replace every goal and replan.
    pub fn set_goals(&mut self, goals: Vec<Condition>) -> Result<()> {
        self.goals = goals;
        self.replan()
    }

    /// Drop every goal; a running plan is abandoned and the agent settles to idle.
    pub fn clear_goals(&mut self) -> Result<()> {
        self.goals.clear();
        self.replan()
    }

    /// Invalidate the current plan. A running sub-action gets its `exit` call in `Cleanup`
    /// before the agent plans again.
    ///
    /// Overrides whatever transition the last tick queued, so the request is never lost.
    pub fn replan(&mut self) -> Result<()> {
        self.replan_requested = true;
        let has_goals = !self.goals.is_empty();
        match self.state() {
            AgentState::Executing => self.send(ABORT),
            AgentState::Planning => self.send(REPLAN),
            // cleanup already ran and queued its settle
            AgentState::Cleanup if has_goals => self.send(REPLAN),
            AgentState::Idle if has_goals => self.send(GOAL_SET),
            AgentState::Idle | AgentState::Cleanup => Ok(()),
        }
    }

    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) -> Result<()> {
        self.tick = *ctx;
        self.fsm.update(&mut (), ctx)?;

        match self.state() {
            AgentState::Idle => self.run_idle(),
            AgentState::Planning => self.run_planning(ctx, world),
            AgentState::Executing => self.run_executing(ctx, world),
            AgentState::Cleanup => self.run_cleanup(ctx, world),
        }
    }

    fn run_idle(&mut self) -> Result<()> {
        if !self.replan_requested {
            return Ok(());
        }
        if self.goals.is_empty() {
            self.replan_requested = false;
            return Ok(());
        }
        debug!(agent = ?self.id, "pending replan picked up while idle");
        self.send(GOAL_SET)
    }

    fn run_planning(&mut self, ctx: &TickContext, world: &W) -> Result<()> {
        self.replan_requested = false;
        self.action_index = 0;
        self.current = None;

        let agent = self.id.stable_id();
        let context = PlanContext::new(ctx, self.id, world, &self.beliefs);
        let mut chosen = None;
        let mut last_attempt = None;

        for goal in &self.goals {
            self.trace.emit(
                TraceEvent::new(ctx.tick, agent, "goap.plan.call").with_detail(goal.to_string()),
            );
            let plan = self.planner.plan(&self.catalog, goal, &context)?;
            self.trace.emit(
                TraceEvent::new(ctx.tick, agent, "goap.plan.result")
                    .with_detail(plan.describe(&self.catalog)),
            );

            if plan.is_successful() {
                chosen = Some(plan);
                break;
            }
            last_attempt = Some(plan);
        }

        match chosen {
            Some(plan) => {
                debug!(agent = ?self.id, plan = %plan.describe(&self.catalog), "plan found");
                self.plan = plan;
                self.send(PLAN_FOUND)
            }
            None => {
                debug!(agent = ?self.id, goals = self.goals.len(), "no goal could be planned");
                self.trace
                    .emit(TraceEvent::new(ctx.tick, agent, "goap.plan.none"));
                self.plan = last_attempt.unwrap_or_default();
                self.send(PLAN_FAILED)
            }
        }
    }

    fn run_executing(&mut self, ctx: &TickContext, world: &mut W) -> Result<()> {
        let agent = self.id.stable_id();
        let Some(&action_id) = self.plan.steps().get(self.action_index) else {
            return self.finish(ActionOutcome::Success);
        };
        let action = self.catalog.action(action_id);

        if self.current.is_none() {
            let steps = action
                .atomics()
                .iter()
                .map(|spec| self.factory.build(spec, ctx, self.id, &*world))
                .collect();
            self.current = Some(AtomicSequence::new(steps));
            self.trace.emit(
                TraceEvent::new(ctx.tick, agent, "goap.action.start").with_detail(action.name()),
            );
        }
        let Some(sequence) = self.current.as_mut() else {
            return Ok(());
        };

        match sequence.step(ctx, self.id, world, &mut self.beliefs) {
            SequenceStep::Running | SequenceStep::Advanced => Ok(()),
            SequenceStep::Completed => {
                self.trace.emit(
                    TraceEvent::new(ctx.tick, agent, "goap.action.done").with_detail(action.name()),
                );
                self.current = None;
                self.action_index += 1;
                if self.action_index >= self.plan.len() {
                    self.finish(ActionOutcome::Success)
                } else {
                    Ok(())
                }
            }
            SequenceStep::Failed => {
                self.trace.emit(
                    TraceEvent::new(ctx.tick, agent, "goap.action.failed")
                        .with_detail(action.name()),
                );
                debug!(agent = ?self.id, action = action.name(), "atomic sub-action failed");
                self.current = None;
                self.finish(ActionOutcome::Failed)
            }
        }
    }

    fn finish(&mut self, outcome: ActionOutcome) -> Result<()> {
        self.last_outcome = Some(outcome);
        match outcome {
            ActionOutcome::Success => {
                self.consecutive_failures = 0;
                self.trace
                    .emit(TraceEvent::new(self.tick.tick, self.id.stable_id(), "goap.plan.done"));
                if self.config.replan_on_success {
                    self.replan_requested = true;
                }
                self.send(FINISHED)
            }
            ActionOutcome::Failed => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.replan_requested = true;
                self.send(FAILED)
            }
        }
    }

    fn run_cleanup(&mut self, ctx: &TickContext, world: &mut W) -> Result<()> {
        let agent = self.id.stable_id();
        if let Some(mut sequence) = self.current.take() {
            sequence.abort(ctx, self.id, world, &mut self.beliefs);
            self.trace
                .emit(TraceEvent::new(ctx.tick, agent, "goap.action.aborted"));
        }
        self.action_index = 0;

        let exhausted = self
            .config
            .max_consecutive_failures
            .is_some_and(|max| self.consecutive_failures > max);
        if self.replan_requested && exhausted {
            warn!(
                agent = ?self.id,
                failures = self.consecutive_failures,
                "failure budget exhausted; not replanning"
            );
            self.trace
                .emit(TraceEvent::new(ctx.tick, agent, "goap.budget_exhausted"));
            self.replan_requested = false;
        }

        if self.replan_requested && !self.goals.is_empty() {
            self.trace.emit(TraceEvent::new(ctx.tick, agent, "goap.replan"));
            self.send(REPLAN)
        } else {
            self.replan_requested = false;
            self.send(SETTLE)
        }
    }

    fn send(&mut self, event: FsmEvent) -> Result<()> {
        self.fsm.send_event(event, &mut (), &self.tick)?;
        Ok(())
    }
}

/// Tick every agent once, in stable-id order.
pub fn tick_agents<W, F>(
    ctx: &TickContext,
    world: &mut W,
    agents: &mut [GoapAgent<W, F>],
) -> Result<()>
where
    W: WorldView + 'static,
    F: ActionFactory<W>,
{
    agents.sort_by_key(|a| a.id().stable_id());
    for agent in agents.iter_mut() {
        agent.tick(ctx, world)?;
    }
    Ok(())
}
