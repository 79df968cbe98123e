use log::debug;
use nalgebra::Vector2;

use crate::ball::Ball;
use crate::error::{BallError, EngineError};
use crate::sticky::Cluster;

pub const MAX_BALLS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
struct BallSnapshot {
    pool_index: usize,
    mass: f64,
    position: Vector2<f64>,
    velocity: Vector2<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BallSystem {
    pool: Vec<Ball>,
    active: Vec<usize>,
    constant_radius: Option<f64>,
    snapshot: Option<Vec<BallSnapshot>>,
    cluster: Option<Cluster>,
}

impl BallSystem {
    pub fn new(pool: Vec<Ball>) -> Result<BallSystem, BallError> {
        if pool.len() > MAX_BALLS {
            return Err(BallError::TooManyBalls {
                max: MAX_BALLS,
                actual: pool.len(),
            });
        }
        let active = (0..pool.len()).collect();
        Ok(BallSystem {
            pool,
            active,
            constant_radius: None,
            snapshot: None,
            cluster: None,
        })
    }

    pub fn pool(&self) -> &[Ball] {
        &self.pool
    }

    pub fn active_balls(&self) -> Vec<Ball> {
        self.active
            .iter()
            .map(|&i| self.displayed(&self.pool[i]))
            .collect()
    }

    pub fn active_indices(&self) -> &[usize] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn displayed(&self, ball: &Ball) -> Ball {
        match self.constant_radius {
            Some(radius) => shown_with_radius(*ball, radius),
            None => *ball,
        }
    }

    pub fn ball(&self, pool_index: usize) -> Result<&Ball, BallError> {
        self.pool.get(pool_index).ok_or(BallError::NoSuchBall(pool_index))
    }

    pub fn ball_mut(&mut self, pool_index: usize) -> Result<&mut Ball, BallError> {
        self.pool
            .get_mut(pool_index)
            .ok_or(BallError::NoSuchBall(pool_index))
    }

    pub fn set_active_count(&mut self, count: usize) -> Result<(), BallError> {
        if count > self.pool.len() {
            return Err(BallError::TooManyBalls {
                max: self.pool.len(),
                actual: count,
            });
        }
        debug!("active ball count -> {}", count);
        self.active = (0..count).collect();
        self.dissolve_cluster();
        Ok(())
    }

    pub fn activate(&mut self, pool_index: usize) -> Result<(), BallError> {
        if pool_index >= self.pool.len() {
            return Err(BallError::NoSuchBall(pool_index));
        }
        if !self.active.contains(&pool_index) {
            debug!("activating ball at pool index {}", pool_index);
            self.active.push(pool_index);
            self.dissolve_cluster();
        }
        Ok(())
    }

    pub fn deactivate(&mut self, pool_index: usize) {
        if let Some(pos) = self.active.iter().position(|&i| i == pool_index) {
            debug!("deactivating ball at pool index {}", pool_index);
            self.active.remove(pos);
            self.dissolve_cluster();
        }
    }

    pub fn constant_radius(&self) -> Option<f64> {
        self.constant_radius
    }

    pub fn set_constant_radius(&mut self, radius: Option<f64>) {
        debug!("constant radius mode -> {:?}", radius);
        self.constant_radius = radius;
    }

    pub fn any_user_controlled(&self) -> bool {
        self.active.iter().any(|&i| self.pool[i].user_controlled())
    }

    pub fn release_user_control(&mut self, pool_index: usize) -> Result<(), BallError> {
        self.ball_mut(pool_index)?.set_user_controlled(false);
        self.snapshot();
        Ok(())
    }

    pub fn begin_user_control(&mut self, pool_index: usize) -> Result<(), BallError> {
        self.ball_mut(pool_index)?.set_user_controlled(true);
        self.dissolve_cluster();
        Ok(())
    }

    pub fn set_ball_position(&mut self, pool_index: usize, position: Vector2<f64>) -> Result<(), BallError> {
        self.ball_mut(pool_index)?.set_position(position)?;
        self.dissolve_cluster();
        Ok(())
    }

    pub fn set_ball_velocity(&mut self, pool_index: usize, velocity: Vector2<f64>) -> Result<(), BallError> {
        self.ball_mut(pool_index)?.set_velocity(velocity)?;
        self.dissolve_cluster();
        Ok(())
    }

    pub fn set_ball_mass(&mut self, pool_index: usize, mass: f64) -> Result<(), BallError> {
        self.ball_mut(pool_index)?.set_mass(mass)?;
        self.dissolve_cluster();
        Ok(())
    }

    pub fn snapshot(&mut self) {
        debug!("snapshotting {} active balls", self.active.len());
        self.snapshot = Some(
            self.active
                .iter()
                .map(|&i| {
                    let ball = &self.pool[i];
                    BallSnapshot {
                        pool_index: i,
                        mass: ball.mass(),
                        position: ball.position(),
                        velocity: ball.velocity(),
                    }
                })
                .collect(),
        );
    }

    pub fn restore(&mut self) {
        let Some(snapshot) = self.snapshot.clone() else {
            return;
        };
        debug!("restoring {} balls from snapshot", snapshot.len());
        for entry in snapshot {
            if let Some(ball) = self.pool.get_mut(entry.pool_index) {
                let _ = ball.set_mass(entry.mass);
                let _ = ball.set_position(entry.position);
                let _ = ball.set_velocity(entry.velocity);
            }
        }
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn center_of_mass_position(&self) -> Vector2<f64> {
        weighted_average(self.active.iter().map(|&i| &self.pool[i]), |b| b.position())
    }

    pub fn center_of_mass_velocity(&self) -> Vector2<f64> {
        weighted_average(self.active.iter().map(|&i| &self.pool[i]), |b| b.velocity())
    }

    pub fn total_momentum(&self) -> Vector2<f64> {
        self.active
            .iter()
            .map(|&i| self.pool[i].momentum())
            .fold(Vector2::zeros(), |acc, p| acc + p)
    }

    pub fn total_kinetic_energy(&self) -> f64 {
        self.active.iter().map(|&i| self.pool[i].kinetic_energy()).sum()
    }

    pub fn cluster(&self) -> Option<&Cluster> {
        self.cluster.as_ref()
    }

    pub fn cluster_mut(&mut self) -> Option<&mut Cluster> {
        self.cluster.as_mut()
    }

    pub fn form_cluster(&mut self, pool_index_a: usize, pool_index_b: usize) -> Result<(), EngineError> {
        if self.active.len() != 2 {
            return Err(EngineError::UnsupportedClusterArity {
                active_balls: self.active.len(),
            });
        }
        let cluster = Cluster::form(
            (pool_index_a, &self.pool[pool_index_a]),
            (pool_index_b, &self.pool[pool_index_b]),
        );
        debug!(
            "formed sticky cluster from balls {} and {}: omega={}",
            pool_index_a,
            pool_index_b,
            cluster.angular_velocity()
        );
        self.cluster = Some(cluster);
        self.sync_cluster_into_pool();
        Ok(())
    }

    pub fn advance_cluster(&mut self, dt: f64) {
        if let Some(cluster) = self.cluster.as_mut() {
            cluster.advance(dt);
        }
        self.sync_cluster_into_pool();
    }

    pub fn dissolve_cluster(&mut self) {
        if self.cluster.take().is_some() {
            debug!("dissolving sticky cluster");
        }
    }

    fn sync_cluster_into_pool(&mut self) {
        if let Some(cluster) = &self.cluster {
            for (pool_index, position, velocity) in cluster.dissolve() {
                if let Some(ball) = self.pool.get_mut(pool_index) {
                    let _ = ball.set_position(position);
                    let _ = ball.set_velocity(velocity);
                }
            }
        }
    }
}

fn shown_with_radius(ball: Ball, radius: f64) -> Ball {
    // Ball has no public radius setter (radius is fixed at construction);
    // the constant-radius mode only affects what is *reported*, so we
    // reconstruct a display-only copy instead of mutating the pool ball.
    Ball::new(ball.index(), ball.mass(), radius, ball.position(), ball.velocity())
        .unwrap_or(ball)
}

fn weighted_average<'a>(
    balls: impl Iterator<Item = &'a Ball>,
    extract: impl Fn(&Ball) -> Vector2<f64>,
) -> Vector2<f64> {
    let mut total_mass = 0.0;
    let mut weighted = Vector2::zeros();
    for ball in balls {
        total_mass += ball.mass();
        weighted += extract(ball) * ball.mass();
    }
    if total_mass == 0.0 {
        Vector2::zeros()
    } else {
        weighted / total_mass
    }
}
