use std::collections::BTreeSet;

use ai_core::{Condition, ConditionStore, TickContext};
use ai_goap::{ActionCatalog, GoapAction, GoapPlanner, PlanContext};
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

const FACTS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

#[derive(Debug, Clone)]
struct ActionDef {
    preconditions: Vec<(usize, bool)>,
    effects: Vec<(usize, bool)>,
    cost: u8,
}

#[derive(Debug, Clone)]
struct Domain {
    actions: Vec<ActionDef>,
    resolved: Vec<Option<bool>>,
    goal: (usize, bool),
}

fn fact() -> impl Strategy<Value = (usize, bool)> {
    (0..FACTS.len(), any::<bool>())
}

fn action_def() -> impl Strategy<Value = ActionDef> {
    (vec(fact(), 0..3), vec(fact(), 1..3), 0u8..10).prop_map(|(preconditions, effects, cost)| {
        ActionDef {
            preconditions,
            effects,
            cost,
        }
    })
}

fn domain() -> impl Strategy<Value = Domain> {
    (
        vec(action_def(), 1..8),
        vec(option::of(any::<bool>()), FACTS.len()),
        fact(),
    )
        .prop_map(|(actions, resolved, goal)| Domain {
            actions,
            resolved,
            goal,
        })
}

/// First occurrence of each fact wins.
fn dedupe(facts: &[(usize, bool)]) -> Vec<Condition> {
    let mut seen = BTreeSet::new();
    facts
        .iter()
        .filter(|(fact, _)| seen.insert(*fact))
        .map(|&(fact, value)| Condition::new(FACTS[fact], value))
        .collect()
}

fn build(domain: &Domain) -> ActionCatalog<(), ()> {
    let mut catalog = ActionCatalog::new();
    for (index, def) in domain.actions.iter().enumerate() {
        let mut action = GoapAction::new(format!("Act{index}"), f32::from(def.cost));
        for pre in dedupe(&def.preconditions) {
            action = action.requires(pre);
        }
        for effect in dedupe(&def.effects) {
            action = action.produces(effect);
        }
        catalog.add_action(action).unwrap();
    }
    for (fact, value) in domain.resolved.iter().enumerate() {
        if let Some(value) = *value {
            catalog
                .add_precondition_resolver(FACTS[fact], move |_| value)
                .unwrap();
        }
    }
    catalog.configure().unwrap();
    catalog
}

fn initial_state(domain: &Domain) -> ConditionStore {
    let mut state = ConditionStore::new();
    for (fact, value) in domain.resolved.iter().enumerate() {
        state.set(FACTS[fact], value.unwrap_or(false));
    }
    state
}

proptest! {
    #[test]
    fn successful_plans_are_executable(domain in domain()) {
        let catalog = build(&domain);
        let goal = Condition::new(FACTS[domain.goal.0], domain.goal.1);
        let tick = TickContext::new(0, 0.1);
        let beliefs = ConditionStore::new();
        let ctx = PlanContext::new(&tick, 1u64, &(), &beliefs);

        let plan = GoapPlanner::default().plan(&catalog, &goal, &ctx).unwrap();
        if !plan.is_successful() {
            prop_assert!(plan.is_empty());
            return Ok(());
        }

        let mut state = initial_state(&domain);
        let mut cost = 0.0;
        for &id in plan.steps() {
            let action = catalog.action(id);
            for pre in action.preconditions() {
                prop_assert!(
                    state.satisfies(pre),
                    "{} needs {} in {}",
                    action.name(),
                    pre,
                    plan.describe(&catalog)
                );
            }
            // a step whose effects all hold already repeats work an earlier step did
            prop_assert!(
                action.effects().iter().any(|effect| !state.satisfies(effect)),
                "{} is redundant in {}",
                action.name(),
                plan.describe(&catalog)
            );
            state.apply(action.effects());
            cost += action.cost();
        }
        prop_assert!(state.satisfies(&goal), "{}", plan.describe(&catalog));
        prop_assert_eq!(cost, plan.cost());
    }

    #[test]
    fn planning_is_deterministic(domain in domain()) {
        let catalog = build(&domain);
        let goal = Condition::new(FACTS[domain.goal.0], domain.goal.1);
        let tick = TickContext::new(0, 0.1);
        let beliefs = ConditionStore::new();
        let ctx = PlanContext::new(&tick, 1u64, &(), &beliefs);
        let planner = GoapPlanner::default();

        let first = planner.plan(&catalog, &goal, &ctx).unwrap();
        let second = planner.plan(&catalog, &goal, &ctx).unwrap();
        prop_assert_eq!(first, second);
    }
}
