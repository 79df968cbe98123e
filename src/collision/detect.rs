use nalgebra::Vector2;

use crate::constants::{CONTACT_EPSILON, ZERO_THRESHOLD};
use crate::play_area::Bounds;

fn clamp_contact(delay: f64) -> f64 {
    if delay < 0.0 && delay > -CONTACT_EPSILON {
        0.0
    } else {
        delay
    }
}

pub fn pair_collision_delay(
    position_a: Vector2<f64>,
    velocity_a: Vector2<f64>,
    radius_a: f64,
    position_b: Vector2<f64>,
    velocity_b: Vector2<f64>,
    radius_b: f64,
    direction: f64,
) -> Option<f64> {
    let delta_r = position_b - position_a;
    let delta_v = (velocity_b - velocity_a) * direction;
    let r_sum = radius_a + radius_b;

    let proj = delta_r.dot(&delta_v);
    if proj.abs() < ZERO_THRESHOLD {
        return None;
    }

    let a = delta_v.dot(&delta_v);
    let b = 2.0 * proj;
    let c = clamp_contact(delta_r.dot(&delta_r) - r_sum * r_sum);

    if a.abs() < ZERO_THRESHOLD {
        return None;
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let root0 = (-b - sqrt_disc) / (2.0 * a);
    let root1 = (-b + sqrt_disc) / (2.0 * a);

    let candidates = [root0, root1];
    candidates
        .into_iter()
        .filter(|t| *t >= 0.0)
        .fold(None, |best: Option<f64>, t| match best {
            Some(b) if b <= t => Some(b),
            _ => Some(t),
        })
}

pub fn wall_collision_delay(
    position: Vector2<f64>,
    velocity: Vector2<f64>,
    radius: f64,
    bounds: Bounds,
    direction: f64,
) -> Option<f64> {
    let vx = velocity.x * direction;
    let vy = velocity.y * direction;

    let t_left = clamp_contact((bounds.xmin - (position.x - radius)) / vx);
    let t_right = clamp_contact((bounds.xmax - (position.x + radius)) / vx);
    let t_bottom = clamp_contact((bounds.ymin - (position.y - radius)) / vy);
    let t_top = clamp_contact((bounds.ymax - (position.y + radius)) / vy);

    let horizontal = later_finite(t_left, t_right);
    let vertical = later_finite(t_bottom, t_top);

    [horizontal, vertical]
        .into_iter()
        .flatten()
        .fold(None, |soonest: Option<f64>, t| match soonest {
            Some(s) if s <= t => Some(s),
            _ => Some(t),
        })
}

fn later_finite(a: f64, b: f64) -> Option<f64> {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => Some(a.max(b)),
        (true, false) => Some(a),
        (false, true) => Some(b),
        (false, false) => None,
    }
}
