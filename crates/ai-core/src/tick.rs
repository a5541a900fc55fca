use crate::{rng, AgentId, SplitMix64};

/// One discrete step of the host's update loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    pub seed: u64,
}

impl TickContext {
    pub fn new(tick: u64, dt_seconds: f32) -> Self {
        Self {
            tick,
            dt_seconds,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The context for the following tick, keeping `dt_seconds` and `seed`.
    pub fn next(self) -> Self {
        Self {
            tick: self.tick + 1,
            ..self
        }
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.tick as f32 * self.dt_seconds
    }

    /// Generator unique to `(seed, tick, agent, stream)`.
    pub fn rng_for_agent<A: AgentId>(&self, agent: A, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed ^ rng::mix64(self.tick), agent.stable_id(), stream);
        SplitMix64::new(seed)
    }
}
