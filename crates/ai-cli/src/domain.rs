//! YAML domain files: actions, resolvers, world facts and goals for one simulated agent.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use ai_core::rng::stream_for;
use ai_core::{Condition, ConditionStore};
use ai_goap::{ActionCatalog, AgentConfig, GoapAction, PlannerConfig};
use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::sim::{SimWorld, StepSpec};

pub type SimCatalog = ActionCatalog<SimWorld, StepSpec>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Domain {
    #[serde(default)]
    pub planner: PlannerConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    /// Initial world facts.
    #[serde(default)]
    pub world: BTreeMap<String, bool>,

    /// What the agent initially believes; may disagree with `world`.
    #[serde(default)]
    pub beliefs: BTreeMap<String, bool>,

    #[serde(default)]
    pub resolvers: BTreeMap<String, ResolverSpec>,

    #[serde(default)]
    pub actions: Vec<ActionSpec>,

    /// Main goal first, fallbacks after it. Each entry is `Name`, `Name=bool` or `!Name`.
    #[serde(default)]
    pub goals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolverSpec {
    Constant { value: bool },
    /// Rolled per tick and agent from the run seed.
    Chance { probability: f32 },
    /// Reads a world fact, by default the one named like the condition.
    Fact {
        #[serde(default)]
        fact: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSpec {
    pub name: String,
    pub cost: f32,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// Parse `Name`, `Name=true`, `Name=false` or `!Name`.
pub fn parse_condition(text: &str) -> Result<Condition> {
    let text = text.trim();
    let (name, value) = match text.split_once('=') {
        Some((name, value)) => match value.trim() {
            "true" => (name.trim(), true),
            "false" => (name.trim(), false),
            other => bail!("condition `{text}` has value `{other}`, expected true or false"),
        },
        None => match text.strip_prefix('!') {
            Some(name) => (name.trim(), false),
            None => (text, true),
        },
    };
    if name.is_empty() {
        bail!("condition `{text}` has no name");
    }
    Ok(Condition::new(name, value))
}

fn parse_all(texts: &[String]) -> Result<Vec<Condition>> {
    texts.iter().map(|text| parse_condition(text)).collect()
}

impl Domain {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read domain from {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse domain from {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let domain: Self = serde_yaml::from_str(content)?;
        domain.validate()?;
        Ok(domain)
    }

    fn validate(&self) -> Result<()> {
        for (name, resolver) in &self.resolvers {
            if let ResolverSpec::Chance { probability } = resolver {
                if !(0.0..=1.0).contains(probability) {
                    bail!("resolver `{name}` has probability {probability} outside [0, 1]");
                }
            }
        }
        for action in &self.actions {
            parse_all(&action.requires)
                .and(parse_all(&action.produces))
                .with_context(|| format!("action `{}`", action.name))?;
        }
        self.goal_conditions()?;
        Ok(())
    }

    pub fn goal_conditions(&self) -> Result<Vec<Condition>> {
        parse_all(&self.goals).context("goals")
    }

    pub fn initial_world(&self) -> SimWorld {
        SimWorld {
            facts: store_from(&self.world),
        }
    }

    pub fn initial_beliefs(&self) -> ConditionStore {
        store_from(&self.beliefs)
    }

    /// Register every action and resolver and configure the catalog.
    pub fn catalog(&self) -> Result<SimCatalog> {
        let mut catalog = SimCatalog::new();

        for spec in &self.actions {
            let mut action = GoapAction::new(spec.name.as_str(), spec.cost);
            for condition in parse_all(&spec.requires)? {
                action = action.requires(condition);
            }
            for condition in parse_all(&spec.produces)? {
                action = action.produces(condition);
            }
            for step in &spec.steps {
                action = action.with_atomic(step.clone());
            }
            catalog
                .add_action(action)
                .with_context(|| format!("action `{}`", spec.name))?;
        }

        for (name, spec) in &self.resolvers {
            let registered = match spec.clone() {
                ResolverSpec::Constant { value } => {
                    catalog.add_precondition_resolver(name.as_str(), move |_| value)
                }
                ResolverSpec::Chance { probability } => {
                    let stream = stream_for(name);
                    catalog.add_precondition_resolver(name.as_str(), move |ctx| {
                        ctx.roll(stream, probability)
                    })
                }
                ResolverSpec::Fact { fact } => {
                    let fact = fact.unwrap_or_else(|| name.clone());
                    catalog.add_precondition_resolver(name.as_str(), move |ctx| {
                        ctx.world.facts.get(&fact)
                    })
                }
            };
            registered.with_context(|| format!("resolver `{name}`"))?;
        }

        catalog.configure()?;
        Ok(catalog)
    }

    /// Preconditions and goals that nothing can ever make true: no action produces them, no
    /// resolver answers them, and neither the world nor the beliefs mention them.
    pub fn dead_conditions(&self) -> Result<Vec<Condition>> {
        let mut known: BTreeSet<Condition> = BTreeSet::new();
        for spec in &self.actions {
            known.extend(parse_all(&spec.produces)?);
        }
        let mut needed: BTreeSet<Condition> = BTreeSet::new();
        for spec in &self.actions {
            needed.extend(parse_all(&spec.requires)?);
        }
        needed.extend(self.goal_conditions()?);

        let dead = needed
            .into_iter()
            .filter(|condition| {
                let name = condition.name();
                !known.contains(condition)
                    && !self.resolvers.contains_key(name)
                    && !self.world.contains_key(name)
                    && !self.beliefs.contains_key(name)
                    // unknown facts read as false
                    && condition.value()
            })
            .collect();
        Ok(dead)
    }
}

fn store_from(facts: &BTreeMap<String, bool>) -> ConditionStore {
    let mut store = ConditionStore::new();
    for (name, value) in facts {
        store.set(name.as_str(), *value);
    }
    store
}
