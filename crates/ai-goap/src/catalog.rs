use std::collections::BTreeMap;

use ai_core::{Condition, ConditionStore, DeterministicRng, TickContext, WorldView};
use tracing::debug;

use crate::CatalogError;

/// Index of an action inside the catalog that registered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(usize);

impl ActionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A plannable action: what it needs, what it changes, what it costs, and the atomic steps
/// (as factory specs) that carry it out.
#[derive(Debug, Clone)]
pub struct GoapAction<S> {
    name: String,
    cost: f32,
    preconditions: Vec<Condition>,
    effects: Vec<Condition>,
    atomics: Vec<S>,
}

impl<S> GoapAction<S> {
    pub fn new(name: impl Into<String>, cost: f32) -> Self {
        Self {
            name: name.into(),
            cost,
            preconditions: Vec::new(),
            effects: Vec::new(),
            atomics: Vec::new(),
        }
    }

    pub fn requires(mut self, condition: Condition) -> Self {
        self.preconditions.push(condition);
        self
    }

    pub fn produces(mut self, condition: Condition) -> Self {
        self.effects.push(condition);
        self
    }

    pub fn with_atomic(mut self, spec: S) -> Self {
        self.atomics.push(spec);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn preconditions(&self) -> &[Condition] {
        &self.preconditions
    }

    pub fn effects(&self) -> &[Condition] {
        &self.effects
    }

    pub fn atomics(&self) -> &[S] {
        &self.atomics
    }

    pub fn has_effect(&self, condition: &Condition) -> bool {
        self.effects.contains(condition)
    }
}

/// Everything a resolver may look at while the planner runs.
pub struct PlanContext<'a, W>
where
    W: WorldView,
{
    pub tick: &'a TickContext,
    pub agent: W::Agent,
    pub world: &'a W,
    pub beliefs: &'a ConditionStore,
}

impl<'a, W> PlanContext<'a, W>
where
    W: WorldView,
{
    pub fn new(
        tick: &'a TickContext,
        agent: W::Agent,
        world: &'a W,
        beliefs: &'a ConditionStore,
    ) -> Self {
        Self {
            tick,
            agent,
            world,
            beliefs,
        }
    }

    /// Deterministic probability roll, stable for a given tick, agent and stream.
    pub fn roll(&self, stream: u64, probability: f32) -> bool {
        self.tick
            .rng_for_agent(self.agent, stream)
            .chance(probability)
    }
}

/// Supplies a condition's value when no action is meant to produce it (sensors, constants,
/// probability rolls).
pub type Resolver<W> = Box<dyn Fn(&PlanContext<'_, W>) -> bool + Send + Sync>;

/// Action definitions and precondition resolvers, shared read-only by every agent once
/// [`ActionCatalog::configure`] has run.
pub struct ActionCatalog<W, S>
where
    W: WorldView,
{
    actions: Vec<GoapAction<S>>,
    resolvers: BTreeMap<String, Resolver<W>>,
    effect_index: BTreeMap<Condition, Vec<ActionId>>,
    configured: bool,
}

impl<W, S> Default for ActionCatalog<W, S>
where
    W: WorldView,
{
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            resolvers: BTreeMap::new(),
            effect_index: BTreeMap::new(),
            configured: false,
        }
    }
}

impl<W, S> ActionCatalog<W, S>
where
    W: WorldView,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(&mut self, action: GoapAction<S>) -> Result<ActionId, CatalogError> {
        if self.configured {
            return Err(CatalogError::AlreadyConfigured);
        }
        if self.actions.iter().any(|a| a.name == action.name) {
            return Err(CatalogError::DuplicateAction(action.name));
        }
        if !action.cost.is_finite() || action.cost < 0.0 {
            return Err(CatalogError::InvalidCost {
                action: action.name,
                cost: action.cost.to_string(),
            });
        }
        if let Some(conflict) = action
            .effects
            .iter()
            .find(|e| action.effects.contains(&e.negated()))
        {
            return Err(CatalogError::ConflictingEffects {
                action: action.name.clone(),
                condition: conflict.name().to_string(),
            });
        }

        self.actions.push(action);
        Ok(ActionId(self.actions.len() - 1))
    }

    pub fn add_precondition_resolver(
        &mut self,
        condition: impl Into<String>,
        resolver: impl Fn(&PlanContext<'_, W>) -> bool + Send + Sync + 'static,
    ) -> Result<(), CatalogError> {
        if self.configured {
            return Err(CatalogError::AlreadyConfigured);
        }
        let condition = condition.into();
        if self.resolvers.contains_key(&condition) {
            return Err(CatalogError::DuplicateResolver(condition));
        }
        self.resolvers.insert(condition, Box::new(resolver));
        Ok(())
    }

    /// Freeze the catalog and build the effect → actions index.
    pub fn configure(&mut self) -> Result<(), CatalogError> {
        if self.configured {
            return Err(CatalogError::AlreadyConfigured);
        }

        for (index, action) in self.actions.iter().enumerate() {
            for effect in &action.effects {
                self.effect_index
                    .entry(effect.clone())
                    .or_default()
                    .push(ActionId(index));
            }
        }
        self.configured = true;

        debug!(
            actions = self.actions.len(),
            resolvers = self.resolvers.len(),
            effects = self.effect_index.len(),
            "action catalog configured"
        );
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Actions whose effects contain exactly `condition`, in registration order.
    pub fn actions_with_effect(&self, condition: &Condition) -> Result<&[ActionId], CatalogError> {
        if !self.configured {
            return Err(CatalogError::NotConfigured);
        }
        Ok(self
            .effect_index
            .get(condition)
            .map_or(&[][..], Vec::as_slice))
    }

    /// Panics if `id` was issued by a different catalog.
    pub fn action(&self, id: ActionId) -> &GoapAction<S> {
        &self.actions[id.0]
    }

    pub fn get(&self, id: ActionId) -> Option<&GoapAction<S>> {
        self.actions.get(id.0)
    }

    pub fn action_by_name(&self, name: &str) -> Option<ActionId> {
        self.actions
            .iter()
            .position(|a| a.name == name)
            .map(ActionId)
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionId, &GoapAction<S>)> + '_ {
        self.actions
            .iter()
            .enumerate()
            .map(|(index, action)| (ActionId(index), action))
    }

    pub fn resolver(&self, condition: &str) -> Option<&Resolver<W>> {
        self.resolvers.get(condition)
    }

    pub fn has_resolver(&self, condition: &str) -> bool {
        self.resolvers.contains_key(condition)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
