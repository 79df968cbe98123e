use nalgebra::Vector2;

use crate::constants::NORMAL_SNAP;
use crate::play_area::Bounds;

fn snap(speed: f64) -> f64 {
    if speed.abs() < NORMAL_SNAP {
        0.0
    } else {
        speed
    }
}

pub fn ball_ball_response(
    position_a: Vector2<f64>,
    position_b: Vector2<f64>,
    velocity_a: Vector2<f64>,
    velocity_b: Vector2<f64>,
    mass_a: f64,
    mass_b: f64,
    elasticity: f64,
) -> (Vector2<f64>, Vector2<f64>) {
    let normal = (position_b - position_a).normalize();
    let tangent = Vector2::new(-normal.y, normal.x);

    let v1n = velocity_a.dot(&normal);
    let v1t = velocity_a.dot(&tangent);
    let v2n = velocity_b.dot(&normal);
    let v2t = velocity_b.dot(&tangent);

    let total_mass = mass_a + mass_b;
    let v1n_post = snap(
        ((mass_a - mass_b * elasticity) * v1n + mass_b * (1.0 + elasticity) * v2n) / total_mass,
    );
    let v2n_post = snap(
        ((mass_b - mass_a * elasticity) * v2n + mass_a * (1.0 + elasticity) * v1n) / total_mass,
    );

    (
        normal * v1n_post + tangent * v1t,
        normal * v2n_post + tangent * v2t,
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct WallContact {
    pub x: bool,
    pub y: bool,
}

impl WallContact {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

pub fn touched_walls(
    position: Vector2<f64>,
    radius: f64,
    bounds: Bounds,
    tolerance: f64,
) -> WallContact {
    let touches_left = (position.x - radius - bounds.xmin).abs() <= tolerance;
    let touches_right = (bounds.xmax - (position.x + radius)).abs() <= tolerance;
    let touches_bottom = (position.y - radius - bounds.ymin).abs() <= tolerance;
    let touches_top = (bounds.ymax - (position.y + radius)).abs() <= tolerance;
    WallContact {
        x: touches_left || touches_right,
        y: touches_bottom || touches_top,
    }
}

pub fn wall_response(velocity: Vector2<f64>, contact: WallContact, elasticity: f64) -> Vector2<f64> {
    Vector2::new(
        if contact.x { -elasticity * velocity.x } else { velocity.x },
        if contact.y { -elasticity * velocity.y } else { velocity.y },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_on_equal_mass_elastic_exchanges_velocities() {
        let (v1, v2) = ball_ball_response(
            Vector2::new(-0.15, 0.0),
            Vector2::new(0.15, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(-1.0, 0.0),
            1.0,
            1.0,
            1.0,
        );
        assert!((v1 - Vector2::new(-1.0, 0.0)).norm() < 1e-9);
        assert!((v2 - Vector2::new(1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn perfectly_inelastic_head_on_balls_stop() {
        let (v1, v2) = ball_ball_response(
            Vector2::new(-0.15, 0.0),
            Vector2::new(0.15, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(-1.0, 0.0),
            1.0,
            1.0,
            0.0,
        );
        assert!(v1.norm() < 1e-9);
        assert!(v2.norm() < 1e-9);
    }

    #[test]
    fn momentum_is_conserved_for_unequal_masses() {
        let mass_a = 0.5;
        let mass_b = 1.5;
        let velocity_a = Vector2::new(1.0, 0.3);
        let velocity_b = Vector2::new(-0.5, -0.5);
        let before = velocity_a * mass_a + velocity_b * mass_b;
        let (v1, v2) = ball_ball_response(
            Vector2::new(-1.0, 0.0),
            Vector2::new(0.0, 0.5),
            velocity_a,
            velocity_b,
            mass_a,
            mass_b,
            1.0,
        );
        let after = v1 * mass_a + v2 * mass_b;
        assert!((before - after).norm() < 1e-9);
    }

    #[test]
    fn wall_response_reflects_only_touched_axis() {
        let contact = WallContact { x: false, y: true };
        let reflected = wall_response(Vector2::new(2.0, -3.0), contact, 1.0);
        assert_eq!(reflected, Vector2::new(2.0, 3.0));
    }

    #[test]
    fn touched_walls_detects_corner_contact() {
        let bounds = Bounds::new(-1.6, 1.6, -0.8, 0.8);
        let contact = touched_walls(Vector2::new(1.45, 0.65), 0.15, bounds, 1e-6);
        assert!(contact.x);
        assert!(contact.y);
    }
}
