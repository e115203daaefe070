use crate::activation::ActivationError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced by the orchestration layer.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("store request failed: {0}")]
    Store(#[from] StoreError),

    #[error("invalid build parameters: {0}")]
    Plan(#[from] PlanError),

    #[error("activation rejected: {0}")]
    Activation(#[from] ActivationError),

    #[error("no control named {0:?}")]
    UnknownControl(String),

    #[error("control {0:?} is registered twice")]
    DuplicateControl(String),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejected planner parameters.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("{name} must be a positive finite number, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },

    #[error("{name} would produce more than {limit} objects")]
    TooMany { name: &'static str, limit: usize },
}

pub type SceneResult<T> = Result<T, SceneError>;
