use log::debug;

pub const DEFAULT_MANUAL_STEP: f64 = 1.0 / 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedFactor {
    Full,
    Slow,
}

impl SpeedFactor {
    pub fn value(&self) -> f64 {
        match self {
            SpeedFactor::Full => 1.0,
            SpeedFactor::Slow => 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockConfig {
    pub manual_step: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            manual_step: DEFAULT_MANUAL_STEP,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clock {
    time: f64,
    direction: i8,
    manual_step: f64,
    speed_factor: SpeedFactor,
}

impl Clock {
    pub fn new(config: ClockConfig) -> Clock {
        Clock {
            time: 0.0,
            direction: 1,
            manual_step: config.manual_step,
            speed_factor: SpeedFactor::Full,
        }
    }

    // nonnegative: reversal only changes the sign of future deltas.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn direction(&self) -> i8 {
        self.direction
    }

    pub fn speed_factor(&self) -> SpeedFactor {
        self.speed_factor
    }

    pub fn set_speed_factor(&mut self, speed_factor: SpeedFactor) {
        self.speed_factor = speed_factor;
    }

    pub fn would_flip(&self, reversed: bool) -> bool {
        let next_direction: i8 = if reversed { -1 } else { 1 };
        next_direction != self.direction
    }

    pub fn manual_step(&mut self, reversed: bool) -> (f64, f64) {
        self.apply(self.manual_step, reversed)
    }

    pub fn accumulate(&mut self, real_dt: f64, reversed: bool) -> (f64, f64) {
        self.apply(real_dt * self.speed_factor.value(), reversed)
    }

    fn apply(&mut self, magnitude: f64, reversed: bool) -> (f64, f64) {
        let direction: i8 = if reversed { -1 } else { 1 };
        if direction != self.direction {
            debug!("clock direction flip: {} -> {}", self.direction, direction);
        }
        self.direction = direction;
        let dt = magnitude * direction as f64;
        let elapsed_before = self.time;
        self.time = (self.time + dt).max(0.0);
        (dt, elapsed_before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_step_advances_forward_by_default() {
        let mut clock = Clock::new(ClockConfig::default());
        let (dt, elapsed_before) = clock.manual_step(false);
        assert_eq!(dt, DEFAULT_MANUAL_STEP);
        assert_eq!(elapsed_before, 0.0);
        assert_eq!(clock.time(), DEFAULT_MANUAL_STEP);
        assert_eq!(clock.direction(), 1);
    }

    #[test]
    fn reversal_produces_negative_delta_and_clamps_time_at_zero() {
        let mut clock = Clock::new(ClockConfig::default());
        let (dt, _) = clock.manual_step(true);
        assert_eq!(dt, -DEFAULT_MANUAL_STEP);
        assert_eq!(clock.direction(), -1);
        assert_eq!(clock.time(), 0.0);
    }

    #[test]
    fn slow_speed_scales_accumulated_delta() {
        let mut clock = Clock::new(ClockConfig::default());
        clock.set_speed_factor(SpeedFactor::Slow);
        let (dt, _) = clock.accumulate(1.0, false);
        assert_eq!(dt, 0.3);
    }

    #[test]
    fn would_flip_detects_direction_change() {
        let clock = Clock::new(ClockConfig::default());
        assert!(!clock.would_flip(false));
        assert!(clock.would_flip(true));
    }
}
