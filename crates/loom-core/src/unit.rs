//! # Units and frame configuration
//!
//! Layout code talks in device-independent values and converts them to
//! pixels exactly once, through the [`Config`] delivered with each frame:
//!
//! ```rust,ignore
//! let pad = gtx.px(dp(16.0));     // round(16 * px_per_dp)
//! let text = gtx.px(sp(14.0));    // round(14 * px_per_sp)
//! ```
//!
//! Conversion always rounds to the nearest pixel, so laying out the same tree
//! with the same configuration yields the same pixels every time.

use web_time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    /// Device pixels.
    Px,
    /// Density-independent pixels.
    Dp,
    /// Scaled pixels, used for text.
    Sp,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Value {
    pub v: f32,
    pub unit: Unit,
}

impl Value {
    pub fn scale(self, s: f32) -> Value {
        Value {
            v: self.v * s,
            unit: self.unit,
        }
    }
}

pub fn px(v: f32) -> Value {
    Value { v, unit: Unit::Px }
}

pub fn dp(v: f32) -> Value {
    Value { v, unit: Unit::Dp }
}

pub fn sp(v: f32) -> Value {
    Value { v, unit: Unit::Sp }
}

/// Per-frame configuration supplied by the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// dp→px multiplier.
    pub px_per_dp: f32,
    /// sp→px multiplier (density times the user's text scale).
    pub px_per_sp: f32,
    /// Frame time, used for animations.
    pub now: Instant,
}

impl Config {
    pub fn new(scale: f32, now: Instant) -> Self {
        Self {
            px_per_dp: scale,
            px_per_sp: scale,
            now,
        }
    }

    pub fn with_text_scale(mut self, text_scale: f32) -> Self {
        self.px_per_sp = self.px_per_dp * text_scale;
        self
    }

    pub fn px(&self, v: Value) -> i32 {
        let scale = match v.unit {
            Unit::Px => 1.0,
            Unit::Dp => self.px_per_dp,
            Unit::Sp => self.px_per_sp,
        };
        (v.v * scale).round() as i32
    }

    pub fn now(&self) -> Instant {
        self.now
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(1.0, Instant::now())
    }
}
