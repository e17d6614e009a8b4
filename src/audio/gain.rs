use std::time::Duration;

/// Time constant of the master volume glide.
pub(crate) const VOLUME_TIME_CONSTANT: Duration = Duration::from_millis(100);

const SETTLE_EPSILON: f32 = 1e-5;

/// Master gain that glides exponentially toward its target, one step per frame.
///
/// After one time constant the gain has covered ~63% of the distance to the
/// target, which keeps volume changes free of clicks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GainRamp {
    current: f32,
    target: f32,
    coefficient: f32,
}

impl GainRamp {
    pub(crate) fn new(level: f32, sample_rate: u32) -> Self {
        let level = clamp_level(level);
        Self {
            current: level,
            target: level,
            coefficient: smoothing_coefficient(sample_rate, VOLUME_TIME_CONSTANT),
        }
    }

    pub(crate) fn set_target(&mut self, level: f32) {
        self.target = clamp_level(level);
    }

    /// Advance one frame and return the gain to apply to it.
    pub(crate) fn next_gain(&mut self) -> f32 {
        if self.current != self.target {
            self.current += (self.target - self.current) * self.coefficient;
            if (self.target - self.current).abs() < SETTLE_EPSILON {
                self.current = self.target;
            }
        }
        self.current
    }

    pub(crate) fn current(&self) -> f32 {
        self.current
    }

    pub(crate) fn target(&self) -> f32 {
        self.target
    }
}

pub(crate) fn clamp_level(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn smoothing_coefficient(sample_rate: u32, time_constant: Duration) -> f32 {
    if sample_rate == 0 || time_constant.is_zero() {
        return 1.0;
    }
    let frames = time_constant.as_secs_f32() * sample_rate as f32;
    1.0 - (-1.0 / frames).exp()
}
