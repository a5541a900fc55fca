use core::fmt;

use ai_core::{Condition, WorldView};

use crate::{ActionCatalog, ActionId};

/// Why a planning attempt produced no plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFailure {
    /// No chain of actions, resolvers and beliefs reaches the goal.
    Unreachable,
    /// The search was cut off after `expansions` candidate actions.
    SearchBudgetExhausted { expansions: usize },
}

impl fmt::Display for PlanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanFailure::Unreachable => f.write_str("unreachable"),
            PlanFailure::SearchBudgetExhausted { expansions } => {
                write!(f, "search budget exhausted after {expansions} expansions")
            }
        }
    }
}

/// Result of one planning attempt.
///
/// A plan is either successful with zero or more steps (prerequisites first), or unsuccessful
/// with no steps at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    goal: Option<Condition>,
    steps: Vec<ActionId>,
    cost: f32,
    successful: bool,
    failure: Option<PlanFailure>,
}

impl Plan {
    /// The placeholder an agent holds before it has planned anything.
    pub fn empty() -> Self {
        Self {
            goal: None,
            steps: Vec::new(),
            cost: 0.0,
            successful: false,
            failure: None,
        }
    }

    pub(crate) fn succeeded(goal: Condition, steps: Vec<ActionId>, cost: f32) -> Self {
        Self {
            goal: Some(goal),
            steps,
            cost,
            successful: true,
            failure: None,
        }
    }

    pub(crate) fn failed(goal: Condition, failure: PlanFailure) -> Self {
        Self {
            goal: Some(goal),
            steps: Vec::new(),
            cost: 0.0,
            successful: false,
            failure: Some(failure),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.successful
    }

    pub fn goal(&self) -> Option<&Condition> {
        self.goal.as_ref()
    }

    pub fn steps(&self) -> &[ActionId] {
        &self.steps
    }

    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn failure(&self) -> Option<PlanFailure> {
        self.failure
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn names<'c, W, S>(&self, catalog: &'c ActionCatalog<W, S>) -> Vec<&'c str>
    where
        W: WorldView,
    {
        self.steps
            .iter()
            .filter_map(|id| catalog.get(*id))
            .map(|action| action.name())
            .collect()
    }

    /// One-line rendering for logs and debug overlays.
    pub fn describe<W, S>(&self, catalog: &ActionCatalog<W, S>) -> String
    where
        W: WorldView,
    {
        let goal = self
            .goal
            .as_ref()
            .map_or_else(|| "-".to_string(), Condition::to_string);

        if !self.successful {
            return match self.failure {
                Some(failure) => format!("no plan for {goal} ({failure})"),
                None => "no plan".to_string(),
            };
        }
        if self.steps.is_empty() {
            return format!("{goal} already holds");
        }
        format!(
            "{} => {goal} (cost {})",
            self.names(catalog).join(" -> "),
            self.cost
        )
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::empty()
    }
}
