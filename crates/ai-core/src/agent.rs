use core::fmt::Debug;

/// Stable identifier for an agent.
///
/// Agents are ticked in `Ord` order and `stable_id` seeds per-agent randomness and trace
/// records, so both must not depend on allocation order or addresses.
pub trait AgentId: Copy + Ord + Eq + Debug + 'static {
    fn stable_id(self) -> u64;
}

macro_rules! impl_agent_id {
    ($($ty:ty),*) => {
        $(
            impl AgentId for $ty {
                fn stable_id(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

impl_agent_id!(u64, u32, u16, usize);
