use std::collections::BTreeMap;

use ai_core::{Condition, ConditionStore, WorldView};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{ActionCatalog, ActionId, CatalogError, Plan, PlanContext, PlanFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PlannerConfig {
    /// Candidate actions tried before the whole search gives up.
    pub max_expansions: usize,
    /// Longest chain of action-resolved conditions followed from the goal.
    pub max_depth: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: 4096,
            max_depth: 32,
        }
    }
}

/// Backward-chaining, depth-first GOAP planner.
///
/// Starting from the goal, each condition is satisfied by (in order): the effects of actions
/// already in the working plan, its resolver, the agent's beliefs (an unknown fact reads as
/// `false`), and finally the cheapest registered action producing it, whose own preconditions
/// are resolved first. Equal costs keep the action registered first, so planning is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct GoapPlanner {
    config: PlannerConfig,
}

impl GoapPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan for `goal`. Failing to find a plan is an `Ok` unsuccessful [`Plan`]; `Err` only
    /// reports an unconfigured catalog.
    pub fn plan<W, S>(
        &self,
        catalog: &ActionCatalog<W, S>,
        goal: &Condition,
        ctx: &PlanContext<'_, W>,
    ) -> Result<Plan, CatalogError>
    where
        W: WorldView,
    {
        if !catalog.is_configured() {
            return Err(CatalogError::NotConfigured);
        }

        let mut search = Search {
            catalog,
            ctx,
            config: self.config,
            expansions: 0,
            resolved: BTreeMap::new(),
        };
        let mut path = Vec::new();

        let plan = match search.satisfy(goal, &Branch::default(), &mut path) {
            Ok(Some(branch)) => {
                debug_assert!(branch.steps.is_empty() || branch.produced.satisfies(goal));
                Plan::succeeded(goal.clone(), branch.steps, branch.cost)
            }
            Ok(None) => Plan::failed(goal.clone(), PlanFailure::Unreachable),
            Err(BudgetExhausted) => {
                warn!(
                    goal = %goal,
                    expansions = search.expansions,
                    "planner expansion budget exhausted"
                );
                Plan::failed(
                    goal.clone(),
                    PlanFailure::SearchBudgetExhausted {
                        expansions: search.expansions,
                    },
                )
            }
        };

        debug!(
            goal = %goal,
            successful = plan.is_successful(),
            steps = plan.len(),
            cost = plan.cost(),
            expansions = search.expansions,
            "planning finished"
        );
        Ok(plan)
    }
}

/// Working plan along one branch of the search.
#[derive(Debug, Clone, Default)]
struct Branch {
    steps: Vec<ActionId>,
    /// Hypothesized state: every effect of `steps`, applied in order.
    produced: ConditionStore,
    cost: f32,
}

#[derive(Debug)]
struct BudgetExhausted;

struct Search<'a, W, S>
where
    W: WorldView,
{
    catalog: &'a ActionCatalog<W, S>,
    ctx: &'a PlanContext<'a, W>,
    config: PlannerConfig,
    expansions: usize,
    /// Resolvers run at most once per planning attempt.
    resolved: BTreeMap<String, bool>,
}

impl<'a, W, S> Search<'a, W, S>
where
    W: WorldView,
{
    fn satisfy(
        &mut self,
        condition: &Condition,
        branch: &Branch,
        path: &mut Vec<Condition>,
    ) -> Result<Option<Branch>, BudgetExhausted> {
        match branch.produced.value(condition.name()) {
            // Already produced by an earlier action of the working plan.
            Some(value) if value == condition.value() => return Ok(Some(branch.clone())),
            // An earlier action changed it; only another action can change it back.
            Some(_) => {}
            None if self.holds_initially(condition) => return Ok(Some(branch.clone())),
            None => {}
        }

        if path.contains(condition) {
            trace!(condition = %condition, "precondition cycle; branch abandoned");
            return Ok(None);
        }
        if path.len() >= self.config.max_depth {
            trace!(condition = %condition, depth = path.len(), "max depth reached");
            return Ok(None);
        }

        path.push(condition.clone());
        let best = self.best_candidate(condition, branch, path);
        path.pop();
        best
    }

    fn best_candidate(
        &mut self,
        condition: &Condition,
        branch: &Branch,
        path: &mut Vec<Condition>,
    ) -> Result<Option<Branch>, BudgetExhausted> {
        let catalog = self.catalog;
        let candidates = catalog.actions_with_effect(condition).unwrap_or(&[]);

        let mut best: Option<Branch> = None;
        for &id in candidates {
            let bound = best.as_ref().map(|b| b.cost);
            // costs are non-negative: nothing below can beat the bound any more
            if bound.is_some_and(|bound| branch.cost >= bound) {
                break;
            }

            self.expansions += 1;
            if self.expansions > self.config.max_expansions {
                return Err(BudgetExhausted);
            }

            if let Some(candidate) = self.try_action(id, condition, branch, path, bound)? {
                if bound.map_or(true, |bound| candidate.cost < bound) {
                    best = Some(candidate);
                }
            }
        }
        Ok(best)
    }

    fn try_action(
        &mut self,
        id: ActionId,
        condition: &Condition,
        branch: &Branch,
        path: &mut Vec<Condition>,
        bound: Option<f32>,
    ) -> Result<Option<Branch>, BudgetExhausted> {
        let catalog = self.catalog;
        let action = catalog.action(id);
        // partial cost only grows, so once it reaches the bound this candidate cannot win
        let beaten = |cost: f32| bound.is_some_and(|bound| cost >= bound);

        let mut next = branch.clone();
        for precondition in action.preconditions() {
            match self.satisfy(precondition, &next, path)? {
                Some(resolved) => next = resolved,
                None => return Ok(None),
            }
            if beaten(next.cost) {
                trace!(action = action.name(), cost = next.cost, "pruned by a cheaper sibling");
                return Ok(None);
            }
        }

        // A later precondition's actions may have undone an earlier one.
        let clobbered = action.preconditions().iter().any(|pre| {
            next.produced
                .value(pre.name())
                .is_some_and(|value| value != pre.value())
        });
        if clobbered {
            trace!(action = action.name(), "preconditions undone by sibling actions");
            return Ok(None);
        }

        // The chain pulled in for the preconditions already produced `condition`.
        if next.produced.satisfies(condition) {
            trace!(action = action.name(), condition = %condition, "redundant action skipped");
            return Ok(Some(next));
        }

        if beaten(next.cost + action.cost()) {
            trace!(action = action.name(), "pruned by a cheaper sibling");
            return Ok(None);
        }
        next.steps.push(id);
        next.cost += action.cost();
        next.produced.apply(action.effects());
        Ok(Some(next))
    }

    fn holds_initially(&mut self, condition: &Condition) -> bool {
        if let Some(&value) = self.resolved.get(condition.name()) {
            return value == condition.value();
        }

        let catalog = self.catalog;
        if let Some(resolver) = catalog.resolver(condition.name()) {
            let value = resolver(self.ctx);
            self.resolved.insert(condition.name().to_string(), value);
            return value == condition.value();
        }

        // closed world: a fact nobody resolved or believed reads as false
        self.ctx.beliefs.get(condition.name()) == condition.value()
    }
}
