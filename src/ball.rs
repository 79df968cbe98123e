use log::debug;
use nalgebra::Vector2;

use crate::error::BallError;

// index never changes once constructed; used for deterministic tie-breaking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ball {
    index: u32,
    mass: f64,
    radius: f64,
    position: Vector2<f64>,
    velocity: Vector2<f64>,
    user_controlled: bool,
}

impl Ball {
    pub fn new(
        index: u32,
        mass: f64,
        radius: f64,
        position: Vector2<f64>,
        velocity: Vector2<f64>,
    ) -> Result<Ball, BallError> {
        validate_mass(mass)?;
        validate_radius(radius)?;
        validate_position(position)?;
        validate_velocity(velocity)?;
        Ok(Ball {
            index,
            mass,
            radius,
            position,
            velocity,
            user_controlled: false,
        })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn position(&self) -> Vector2<f64> {
        self.position
    }

    pub fn velocity(&self) -> Vector2<f64> {
        self.velocity
    }

    pub fn user_controlled(&self) -> bool {
        self.user_controlled
    }

    pub fn momentum(&self) -> Vector2<f64> {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.norm_squared()
    }

    pub fn set_position(&mut self, position: Vector2<f64>) -> Result<(), BallError> {
        validate_position(position)?;
        self.position = position;
        Ok(())
    }

    pub fn set_velocity(&mut self, velocity: Vector2<f64>) -> Result<(), BallError> {
        validate_velocity(velocity)?;
        self.velocity = velocity;
        Ok(())
    }

    pub fn set_mass(&mut self, mass: f64) -> Result<(), BallError> {
        validate_mass(mass)?;
        self.mass = mass;
        Ok(())
    }

    pub fn set_user_controlled(&mut self, user_controlled: bool) {
        debug!("ball {} user_controlled -> {}", self.index, user_controlled);
        self.user_controlled = user_controlled;
    }

    pub fn advance(&mut self, dt: f64) {
        self.position += self.velocity * dt;
    }
}

fn validate_mass(mass: f64) -> Result<(), BallError> {
    if mass > 0.0 && mass.is_finite() {
        Ok(())
    } else {
        Err(BallError::NonPositiveMass(mass))
    }
}

fn validate_radius(radius: f64) -> Result<(), BallError> {
    if radius > 0.0 && radius.is_finite() {
        Ok(())
    } else {
        Err(BallError::NonPositiveRadius(radius))
    }
}

fn validate_position(position: Vector2<f64>) -> Result<(), BallError> {
    if position.x.is_finite() && position.y.is_finite() {
        Ok(())
    } else {
        Err(BallError::NonFinitePosition(position.x, position.y))
    }
}

fn validate_velocity(velocity: Vector2<f64>) -> Result<(), BallError> {
    if velocity.x.is_finite() && velocity.y.is_finite() {
        Ok(())
    } else {
        Err(BallError::NonFiniteVelocity(velocity.x, velocity.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vector2<f64> {
        Vector2::new(x, y)
    }

    #[test]
    fn rejects_non_positive_mass() {
        let err = Ball::new(1, 0.0, 0.15, v(0.0, 0.0), v(0.0, 0.0)).unwrap_err();
        assert_eq!(err, BallError::NonPositiveMass(0.0));
    }

    #[test]
    fn rejects_non_positive_radius() {
        let err = Ball::new(1, 1.0, -0.1, v(0.0, 0.0), v(0.0, 0.0)).unwrap_err();
        assert_eq!(err, BallError::NonPositiveRadius(-0.1));
    }

    #[test]
    fn rejects_non_finite_position() {
        let err = Ball::new(1, 1.0, 0.15, v(f64::NAN, 0.0), v(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, BallError::NonFinitePosition(_, _)));
    }

    #[test]
    fn rejects_non_finite_velocity() {
        let err = Ball::new(1, 1.0, 0.15, v(0.0, 0.0), v(f64::INFINITY, 0.0)).unwrap_err();
        assert!(matches!(err, BallError::NonFiniteVelocity(_, _)));
    }

    #[test]
    fn momentum_and_energy() {
        let ball = Ball::new(1, 2.0, 0.15, v(0.0, 0.0), v(3.0, 4.0)).unwrap();
        assert_eq!(ball.momentum(), v(6.0, 8.0));
        assert_eq!(ball.kinetic_energy(), 0.5 * 2.0 * 25.0);
    }

    #[test]
    fn advance_moves_by_uniform_motion() {
        let mut ball = Ball::new(1, 1.0, 0.15, v(1.0, 1.0), v(2.0, -1.0)).unwrap();
        ball.advance(0.5);
        assert_eq!(ball.position(), v(2.0, 0.5));
    }
}
