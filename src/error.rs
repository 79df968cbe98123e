use thiserror::Error;

#[derive(Error, Clone, Copy, Debug, PartialEq)]
pub enum BallError {
    #[error("mass must be positive, got {0}")]
    NonPositiveMass(f64),
    #[error("radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("position must be finite, got ({0}, {1})")]
    NonFinitePosition(f64, f64),
    #[error("velocity must be finite, got ({0}, {1})")]
    NonFiniteVelocity(f64, f64),
    #[error("pool supports at most {max} balls, got {actual}")]
    TooManyBalls { max: usize, actual: usize },
    #[error("no ball at pool index {0}")]
    NoSuchBall(usize),
}

#[derive(Error, Clone, Copy, Debug, PartialEq)]
pub enum EngineError {
    #[error("step did not converge after {iterations} iterations")]
    PathologicalStep { iterations: u32 },

    #[error("sticky clusters support at most two balls, got {active_balls}")]
    UnsupportedClusterArity { active_balls: usize },
}
