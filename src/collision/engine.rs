use log::{debug, warn};

use crate::ball::Ball;
use crate::ball_system::BallSystem;
use crate::collision::detect::{pair_collision_delay, wall_collision_delay};
use crate::collision::response::{ball_ball_response, touched_walls, wall_response};
use crate::constants::{MAX_ITERATIONS, TIE_EPSILON};
use crate::error::EngineError;
use crate::play_area::{Bounds, PlayArea};

#[derive(Clone, Copy, Debug, PartialEq)]
enum SlotEvent {
    Pair(usize, usize),
    Wall(usize),
}

struct Candidate {
    delay: f64,
    event: SlotEvent,
    tie_key: (u32, u32),
}

// redetects from scratch every call; cheaper than invalidation tracking at <=5 balls.
pub struct CollisionEngine;

impl CollisionEngine {
    pub fn step(ball_system: &mut BallSystem, play_area: &PlayArea, dt: f64, elapsed_time: f64) -> Result<(), EngineError> {
        Self::step_with_cap(ball_system, play_area, dt, elapsed_time, MAX_ITERATIONS)
    }

    pub fn step_with_cap(
        ball_system: &mut BallSystem,
        play_area: &PlayArea,
        dt: f64,
        elapsed_time: f64,
        max_iterations: u32,
    ) -> Result<(), EngineError> {
        if dt == 0.0 {
            return Ok(());
        }
        debug!("step: dt={} elapsed_time={}", dt, elapsed_time);

        if ball_system.cluster().is_some() {
            if play_area.elasticity() != 0.0 {
                ball_system.dissolve_cluster();
            } else {
                return Self::step_cluster(ball_system, play_area, dt, max_iterations);
            }
        }

        let slots = ball_system.active_indices().to_vec();
        let mut working: Vec<Ball> = ball_system.active_balls();
        let bounds = play_area.bounds();
        let direction = dt.signum();
        let mut remaining = dt.abs();

        let mut iterations = 0u32;
        loop {
            if remaining <= 0.0 {
                break;
            }

            let candidate = Self::earliest_event(&working, bounds, play_area.reflecting_border(), direction);

            let Some(candidate) = candidate else {
                Self::advance_all(&mut working, remaining * direction);
                break;
            };

            if candidate.delay > remaining {
                Self::advance_all(&mut working, remaining * direction);
                break;
            }

            Self::advance_all(&mut working, candidate.delay * direction);
            remaining -= candidate.delay;

            let simultaneous = Self::simultaneous_events(&working, bounds, play_area.reflecting_border(), direction, &candidate);

            for event in &simultaneous {
                match *event {
                    SlotEvent::Pair(i, j) => {
                        if play_area.is_perfectly_inelastic() && play_area.is_sticky() {
                            Self::write_back(ball_system, &slots, &working);
                            return Self::begin_sticking(ball_system, play_area, slots[i], slots[j], dt.signum() * remaining, max_iterations.saturating_sub(iterations));
                        }
                        let (va, vb) = ball_ball_response(
                            working[i].position(),
                            working[j].position(),
                            working[i].velocity(),
                            working[j].velocity(),
                            working[i].mass(),
                            working[j].mass(),
                            play_area.elasticity(),
                        );
                        let _ = working[i].set_velocity(va);
                        let _ = working[j].set_velocity(vb);
                        debug!("resolved ball-ball collision between slots {} and {}", i, j);
                    }
                    SlotEvent::Wall(i) => {
                        let contact = touched_walls(working[i].position(), working[i].radius(), bounds, 1e-6);
                        let reflected = wall_response(working[i].velocity(), contact, play_area.elasticity());
                        let _ = working[i].set_velocity(reflected);
                        debug!("resolved ball-wall collision at slot {}", i);
                    }
                }
            }

            iterations += 1;
            if iterations >= max_iterations {
                Self::write_back(ball_system, &slots, &working);
                warn!("step aborted after {} iterations without converging", iterations);
                return Err(EngineError::PathologicalStep { iterations });
            }
        }

        Self::write_back(ball_system, &slots, &working);
        Ok(())
    }

    fn earliest_event(
        working: &[Ball],
        bounds: Bounds,
        reflecting_border: bool,
        direction: f64,
    ) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;

        for i in 0..working.len() {
            for j in (i + 1)..working.len() {
                if let Some(delay) = pair_collision_delay(
                    working[i].position(),
                    working[i].velocity(),
                    working[i].radius(),
                    working[j].position(),
                    working[j].velocity(),
                    working[j].radius(),
                    direction,
                ) {
                    let candidate = Candidate {
                        delay,
                        event: SlotEvent::Pair(i, j),
                        tie_key: (working[i].index(), working[j].index()),
                    };
                    best = Self::sooner(best, candidate);
                }
            }

            if reflecting_border {
                if let Some(delay) = wall_collision_delay(
                    working[i].position(),
                    working[i].velocity(),
                    working[i].radius(),
                    bounds,
                    direction,
                ) {
                    let candidate = Candidate {
                        delay,
                        event: SlotEvent::Wall(i),
                        tie_key: (working[i].index(), u32::MAX),
                    };
                    best = Self::sooner(best, candidate);
                }
            }
        }

        best
    }

    fn sooner(best: Option<Candidate>, candidate: Candidate) -> Option<Candidate> {
        match best {
            None => Some(candidate),
            Some(current) => {
                if candidate.delay + TIE_EPSILON < current.delay {
                    Some(candidate)
                } else if current.delay + TIE_EPSILON < candidate.delay {
                    Some(current)
                } else if candidate.tie_key < current.tie_key {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        }
    }

    fn simultaneous_events(
        working: &[Ball],
        bounds: Bounds,
        reflecting_border: bool,
        direction: f64,
        selected: &Candidate,
    ) -> Vec<SlotEvent> {
        let mut events = vec![selected.event];
        for i in 0..working.len() {
            for j in (i + 1)..working.len() {
                if (i, j) == Self::pair_of(selected.event) {
                    continue;
                }
                if let Some(delay) = pair_collision_delay(
                    working[i].position(),
                    working[i].velocity(),
                    working[i].radius(),
                    working[j].position(),
                    working[j].velocity(),
                    working[j].radius(),
                    direction,
                ) {
                    if (delay - selected.delay).abs() < TIE_EPSILON {
                        events.push(SlotEvent::Pair(i, j));
                    }
                }
            }
            if reflecting_border
                && !matches!(selected.event, SlotEvent::Wall(s) if s == i)
            {
                if let Some(delay) = wall_collision_delay(
                    working[i].position(),
                    working[i].velocity(),
                    working[i].radius(),
                    bounds,
                    direction,
                ) {
                    if (delay - selected.delay).abs() < TIE_EPSILON {
                        events.push(SlotEvent::Wall(i));
                    }
                }
            }
        }
        events
    }

    fn pair_of(event: SlotEvent) -> (usize, usize) {
        match event {
            SlotEvent::Pair(i, j) => (i, j),
            SlotEvent::Wall(_) => (usize::MAX, usize::MAX),
        }
    }

    fn advance_all(working: &mut [Ball], dt: f64) {
        for ball in working.iter_mut() {
            ball.advance(dt);
        }
    }

    fn write_back(ball_system: &mut BallSystem, slots: &[usize], working: &[Ball]) {
        for (&pool_index, ball) in slots.iter().zip(working.iter()) {
            if let Ok(target) = ball_system.ball_mut(pool_index) {
                let _ = target.set_position(ball.position());
                let _ = target.set_velocity(ball.velocity());
            }
        }
    }

    fn begin_sticking(
        ball_system: &mut BallSystem,
        play_area: &PlayArea,
        pool_index_a: usize,
        pool_index_b: usize,
        remaining_dt: f64,
        iterations_left: u32,
    ) -> Result<(), EngineError> {
        ball_system.form_cluster(pool_index_a, pool_index_b)?;
        Self::step_cluster(ball_system, play_area, remaining_dt, iterations_left.max(1))
    }

    fn step_cluster(
        ball_system: &mut BallSystem,
        play_area: &PlayArea,
        dt: f64,
        max_iterations: u32,
    ) -> Result<(), EngineError> {
        if dt == 0.0 {
            return Ok(());
        }

        let direction = dt.signum();
        let mut remaining = dt.abs();
        let bounds = play_area.bounds();
        let mut iterations = 0u32;

        loop {
            if remaining <= 0.0 {
                break;
            }

            let cluster = ball_system.cluster().copied();
            let Some(cluster) = cluster else { break };

            let delay = if play_area.reflecting_border() {
                (0..2)
                    .filter_map(|slot| {
                        wall_collision_delay(
                            cluster.ball_position(slot),
                            cluster.ball_velocity(slot),
                            cluster.ball_radius(slot),
                            bounds,
                            direction,
                        )
                    })
                    .fold(None, |soonest: Option<f64>, t| match soonest {
                        Some(s) if s <= t => Some(s),
                        _ => Some(t),
                    })
            } else {
                None
            };

            match delay {
                Some(delay) if delay <= remaining => {
                    ball_system.advance_cluster(delay * direction);
                    remaining -= delay;
                    if let Some(cluster) = ball_system.cluster_mut() {
                        let members = cluster_members_after(cluster, bounds, 1e-6);
                        cluster.reflect_velocity(members.0, members.1, play_area.elasticity());
                    }
                    ball_system.advance_cluster(0.0);
                    debug!("sticky cluster reflected off wall, {} s remaining", remaining);
                }
                _ => {
                    ball_system.advance_cluster(remaining * direction);
                    break;
                }
            }

            iterations += 1;
            if iterations >= max_iterations {
                warn!("sticky cluster step aborted after {} iterations without converging", iterations);
                return Err(EngineError::PathologicalStep { iterations });
            }
        }

        Ok(())
    }
}

fn cluster_members_after(
    cluster: &crate::sticky::Cluster,
    bounds: Bounds,
    tolerance: f64,
) -> (bool, bool) {
    let mut hit_x = false;
    let mut hit_y = false;
    for slot in 0..2 {
        let contact = touched_walls(cluster.ball_position(slot), cluster.ball_radius(slot), bounds, tolerance);
        hit_x |= contact.x;
        hit_y |= contact.y;
    }
    (hit_x, hit_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::Ball;
    use crate::ball_system::BallSystem;
    use nalgebra::Vector2;

    fn area(reflecting: bool, elasticity: f64, sticky: bool) -> PlayArea {
        PlayArea::new(Bounds::new(-1.6, 1.6, -0.8, 0.8), elasticity, reflecting, sticky)
    }

    #[test]
    fn head_on_equal_mass_elastic_exchanges_velocities_after_full_step() {
        let pool = vec![
            Ball::new(1, 1.0, 0.15, Vector2::new(-0.5, 0.0), Vector2::new(1.0, 0.0)).unwrap(),
            Ball::new(2, 1.0, 0.15, Vector2::new(0.5, 0.0), Vector2::new(-1.0, 0.0)).unwrap(),
        ];
        let mut system = BallSystem::new(pool).unwrap();
        let play_area = area(true, 1.0, false);
        CollisionEngine::step(&mut system, &play_area, 1.0, 0.0).unwrap();

        let a = system.ball(0).unwrap();
        let b = system.ball(1).unwrap();
        assert!((a.velocity() - Vector2::new(-1.0, 0.0)).norm() < 1e-6);
        assert!((b.velocity() - Vector2::new(1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn wall_reflection_matches_scenario_five() {
        let pool = vec![Ball::new(1, 1.0, 0.15, Vector2::new(0.0, 0.6), Vector2::new(0.0, 1.0)).unwrap()];
        let mut system = BallSystem::new(pool).unwrap();
        let play_area = area(true, 1.0, false);
        CollisionEngine::step(&mut system, &play_area, 0.1, 0.0).unwrap();

        let ball = system.ball(0).unwrap();
        assert!((ball.position() - Vector2::new(0.0, 0.75)).norm() < 1e-6);
        assert!((ball.velocity() - Vector2::new(0.0, -1.0)).norm() < 1e-6);
    }

    #[test]
    fn zero_step_is_a_no_op() {
        let pool = vec![Ball::new(1, 1.0, 0.15, Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)).unwrap()];
        let mut system = BallSystem::new(pool).unwrap();
        let play_area = area(true, 1.0, false);
        let before = system.ball(0).unwrap().position();
        CollisionEngine::step(&mut system, &play_area, 0.0, 0.0).unwrap();
        assert_eq!(system.ball(0).unwrap().position(), before);
    }

    #[test]
    fn time_reversal_returns_to_entry_state() {
        let pool = vec![
            Ball::new(1, 1.0, 0.15, Vector2::new(-0.5, 0.0), Vector2::new(1.0, 0.0)).unwrap(),
            Ball::new(2, 1.0, 0.15, Vector2::new(0.5, 0.0), Vector2::new(-1.0, 0.0)).unwrap(),
        ];
        let mut system = BallSystem::new(pool).unwrap();
        let play_area = area(true, 1.0, false);
        CollisionEngine::step(&mut system, &play_area, 1.0, 0.0).unwrap();
        CollisionEngine::step(&mut system, &play_area, -1.0, 1.0).unwrap();

        assert!((system.ball(0).unwrap().position() - Vector2::new(-0.5, 0.0)).norm() < 1e-6);
        assert!((system.ball(1).unwrap().position() - Vector2::new(0.5, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn perfectly_inelastic_sticky_forms_cluster_with_spin() {
        let pool = vec![
            Ball::new(1, 1.0, 0.15, Vector2::new(0.0, 0.15), Vector2::new(0.5, 0.0)).unwrap(),
            Ball::new(2, 1.0, 0.15, Vector2::new(0.3, -0.15), Vector2::new(-0.5, 0.0)).unwrap(),
        ];
        let mut system = BallSystem::new(pool).unwrap();
        let play_area = area(true, 0.0, true);
        CollisionEngine::step(&mut system, &play_area, 0.5, 0.0).unwrap();
        assert!(system.cluster().is_some());
    }
}
