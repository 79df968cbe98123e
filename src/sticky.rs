use nalgebra::Vector2;

use crate::ball::Ball;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cluster {
    balls: [usize; 2],
    radii: [f64; 2],
    center: Vector2<f64>,
    velocity: Vector2<f64>,
    angular_velocity: f64,
    moment_of_inertia: f64,
    offsets: [Vector2<f64>; 2],
}

impl Cluster {
    pub fn form(a: (usize, &Ball), b: (usize, &Ball)) -> Cluster {
        let (index_a, ball_a) = a;
        let (index_b, ball_b) = b;
        let m1 = ball_a.mass();
        let m2 = ball_b.mass();
        let total_mass = m1 + m2;

        let center = (ball_a.position() * m1 + ball_b.position() * m2) / total_mass;
        let velocity = (ball_a.velocity() * m1 + ball_b.velocity() * m2) / total_mass;

        let offset_a = ball_a.position() - center;
        let offset_b = ball_b.position() - center;
        let moment_of_inertia = m1 * offset_a.norm_squared() + m2 * offset_b.norm_squared();

        let rel_v1 = ball_a.velocity() - velocity;
        let rel_v2 = ball_b.velocity() - velocity;
        let angular_momentum = m1 * cross2(offset_a, rel_v1) + m2 * cross2(offset_b, rel_v2);
        let angular_velocity = if moment_of_inertia > 0.0 {
            angular_momentum / moment_of_inertia
        } else {
            0.0
        };

        Cluster {
            balls: [index_a, index_b],
            radii: [ball_a.radius(), ball_b.radius()],
            center,
            velocity,
            angular_velocity,
            moment_of_inertia,
            offsets: [offset_a, offset_b],
        }
    }

    pub fn pool_indices(&self) -> [usize; 2] {
        self.balls
    }

    pub fn ball_radius(&self, slot: usize) -> f64 {
        self.radii[slot]
    }

    pub fn center(&self) -> Vector2<f64> {
        self.center
    }

    pub fn velocity(&self) -> Vector2<f64> {
        self.velocity
    }

    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    pub fn moment_of_inertia(&self) -> f64 {
        self.moment_of_inertia
    }

    pub fn ball_position(&self, slot: usize) -> Vector2<f64> {
        self.center + self.offsets[slot]
    }

    pub fn ball_velocity(&self, slot: usize) -> Vector2<f64> {
        self.velocity + self.angular_velocity * perp(self.offsets[slot])
    }

    pub fn advance(&mut self, dt: f64) {
        self.center += self.velocity * dt;
        let angle = self.angular_velocity * dt;
        let (sin, cos) = angle.sin_cos();
        for offset in &mut self.offsets {
            *offset = Vector2::new(cos * offset.x - sin * offset.y, sin * offset.x + cos * offset.y);
        }
    }

    pub fn reflect_velocity(&mut self, hit_x_wall: bool, hit_y_wall: bool, elasticity: f64) {
        if hit_x_wall {
            self.velocity.x = -elasticity * self.velocity.x;
        }
        if hit_y_wall {
            self.velocity.y = -elasticity * self.velocity.y;
        }
    }

    pub fn dissolve(&self) -> [(usize, Vector2<f64>, Vector2<f64>); 2] {
        [
            (self.balls[0], self.ball_position(0), self.ball_velocity(0)),
            (self.balls[1], self.ball_position(1), self.ball_velocity(1)),
        ]
    }
}

fn cross2(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

fn perp(v: Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(mass: f64, px: f64, py: f64, vx: f64, vy: f64) -> Ball {
        Ball::new(1, mass, 0.15, Vector2::new(px, py), Vector2::new(vx, vy)).unwrap()
    }

    #[test]
    fn forms_with_conserved_com_velocity_and_nonzero_spin() {
        let a = ball(1.0, 0.0, 0.15, 0.5, 0.0);
        let b = ball(1.0, 0.3, -0.15, -0.5, 0.0);
        let cluster = Cluster::form((0, &a), (1, &b));

        assert_eq!(cluster.center(), Vector2::new(0.15, 0.0));
        assert_eq!(cluster.velocity(), Vector2::new(0.0, 0.0));
        assert!((cluster.moment_of_inertia() - 0.09).abs() < 1e-12);
        assert!((cluster.angular_velocity() - (-0.15 / 0.09)).abs() < 1e-9);
    }

    #[test]
    fn advance_rotates_offsets_rigidly_about_moving_center() {
        let a = ball(1.0, -0.15, 0.0, 0.0, 1.0);
        let b = ball(1.0, 0.15, 0.0, 0.0, -1.0);
        let mut cluster = Cluster::form((0, &a), (1, &b));
        let separation_before = (cluster.ball_position(0) - cluster.ball_position(1)).norm();
        cluster.advance(0.1);
        let separation_after = (cluster.ball_position(0) - cluster.ball_position(1)).norm();
        assert!((separation_before - separation_after).abs() < 1e-9);
    }

    #[test]
    fn dissolve_reports_both_balls_current_kinematics() {
        let a = ball(1.0, -0.15, 0.0, 0.0, 1.0);
        let b = ball(2.0, 0.15, 0.0, 0.0, -1.0);
        let cluster = Cluster::form((3, &a), (4, &b));
        let dissolved = cluster.dissolve();
        assert_eq!(dissolved[0].0, 3);
        assert_eq!(dissolved[1].0, 4);
    }
}
