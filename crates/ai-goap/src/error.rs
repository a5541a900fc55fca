use ai_fsm::FsmError;
use thiserror::Error;

/// Setup-time misuse of an [`crate::ActionCatalog`]. These are programming errors: fail fast.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog is already configured")]
    AlreadyConfigured,

    #[error("catalog must be configured before planning")]
    NotConfigured,

    #[error("action `{0}` is registered twice")]
    DuplicateAction(String),

    #[error("condition `{0}` already has a resolver")]
    DuplicateResolver(String),

    #[error("action `{action}` has invalid cost {cost}")]
    InvalidCost { action: String, cost: String },

    #[error("action `{action}` produces both values of `{condition}`")]
    ConflictingEffects { action: String, condition: String },
}

#[derive(Debug, Error)]
pub enum GoapError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Fsm(#[from] FsmError),
}

pub type Result<T> = std::result::Result<T, GoapError>;
