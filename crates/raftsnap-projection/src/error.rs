/// Errors produced while configuring a projection run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("invalid prefix depth {depth}: must be at least 1")]
    InvalidDepth { depth: usize },
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;
