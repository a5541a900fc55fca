use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FsmError {
    #[error("state `{0}` is registered twice")]
    DuplicateState(String),

    #[error("unknown state id {0}")]
    UnknownState(usize),

    #[error("state `{state}` already has a transition for event `{event}`")]
    DuplicateTransition { state: String, event: &'static str },

    /// An exit callback asked for a transition. The state machine's action graph is broken.
    #[error("state `{state}` requested a transition on `{event}` while exiting")]
    TransitionDuringExit { state: String, event: &'static str },

    #[error("more than {limit} chained transitions in a single call")]
    TransitionLimit { limit: usize },
}
