pub mod ball;
pub mod ball_system;
pub mod clock;
pub mod collision;
pub mod constants;
pub mod error;
pub mod play_area;
pub mod sticky;

pub use ball::Ball;
pub use ball_system::BallSystem;
pub use clock::{Clock, ClockConfig, SpeedFactor};
pub use collision::CollisionEngine;
pub use error::{BallError, EngineError};
pub use play_area::{Bounds, PlayArea};
pub use sticky::Cluster;
