use thiserror::Error;

/// Everything that can stop a sampling run.
///
/// All of these are fatal: a run either produces a complete [`crate::Sample`]
/// or fails before any particle data is handed back.
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("model has not converged, refusing to sample")]
    NotConverged,
    #[error("mass component {component} has zero stars")]
    ZeroStars { component: usize },
    #[error("invalid sampler settings: {0}")]
    InvalidSettings(String),
    #[error("invalid model tables: {0}")]
    InvalidModel(String),
    #[error(
        "velocity proposal inefficient: component {component} still has {pending} \
         pending particles after {rounds} rounds"
    )]
    ProposalInefficient {
        component: usize,
        rounds: u64,
        pending: usize,
    },
    #[error("direction-cosine solver did not converge (a = {a}, u = {u})")]
    DirectionSolve { a: f64, u: f64 },
    #[error("model evaluation failed")]
    Model(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SampleError>;
