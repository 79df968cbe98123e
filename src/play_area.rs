use log::debug;
use nalgebra::Vector2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bounds {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Bounds {
        Bounds {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    pub fn contains_shrunk(&self, point: Vector2<f64>, radius: f64, tolerance: f64) -> bool {
        point.x >= self.xmin + radius - tolerance
            && point.x <= self.xmax - radius + tolerance
            && point.y >= self.ymin + radius - tolerance
            && point.y <= self.ymax - radius + tolerance
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayArea {
    bounds: Bounds,
    elasticity: f64,
    reflecting_border: bool,
    is_sticky: bool,
}

impl PlayArea {
    pub fn new(bounds: Bounds, elasticity: f64, reflecting_border: bool, is_sticky: bool) -> PlayArea {
        let clamped = elasticity.clamp(0.0, 1.0);
        if clamped != elasticity {
            debug!("elasticity {} clamped to {}", elasticity, clamped);
        }
        PlayArea {
            bounds,
            elasticity: clamped,
            reflecting_border,
            is_sticky,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn elasticity(&self) -> f64 {
        self.elasticity
    }

    pub fn reflecting_border(&self) -> bool {
        self.reflecting_border
    }

    pub fn is_sticky(&self) -> bool {
        self.is_sticky
    }

    pub fn is_perfectly_inelastic(&self) -> bool {
        self.elasticity == 0.0
    }

    pub fn set_elasticity(&mut self, elasticity: f64) {
        let clamped = elasticity.clamp(0.0, 1.0);
        if clamped != elasticity {
            debug!("elasticity {} clamped to {}", elasticity, clamped);
        }
        self.elasticity = clamped;
    }

    pub fn set_reflecting_border(&mut self, reflecting_border: bool) {
        debug!("reflecting_border -> {}", reflecting_border);
        self.reflecting_border = reflecting_border;
    }

    pub fn set_is_sticky(&mut self, is_sticky: bool) {
        debug!("is_sticky -> {}", is_sticky);
        self.is_sticky = is_sticky;
    }
}
