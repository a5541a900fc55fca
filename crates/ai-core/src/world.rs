use crate::AgentId;

/// The host world an agent lives in.
///
/// The core crate does not prescribe which queries a world exposes; resolvers and atomic
/// sub-actions are written against the concrete world type.
pub trait WorldView: 'static {
    type Agent: AgentId;
}

/// A world with nothing in it, for planners that only consult resolvers and beliefs.
impl WorldView for () {
    type Agent = u64;
}
