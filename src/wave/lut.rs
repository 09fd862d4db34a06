//! Const-evaluable sine for table generation
//!
//! `core` has no `sin` under `no_std`, and the immutable tables are built at
//! compile time, so this is a folded Taylor series instead of libm.

use core::f64::consts::{FRAC_PI_2, PI, TAU};

/// Sine of `x` (radians), accurate to ~1e-7.
///
/// Folds into [-π/2, π/2] before expanding, so the truncated series stays
/// well inside one quantization step at any amplitude used here.
pub const fn const_sin(x: f64) -> f64 {
    // Normalize to [-π, π]
    let mut x = x;
    while x > PI {
        x -= TAU;
    }
    while x < -PI {
        x += TAU;
    }

    // sin(π - x) = sin(x)
    if x > FRAC_PI_2 {
        x = PI - x;
    } else if x < -FRAC_PI_2 {
        x = -PI - x;
    }

    // x - x³/3! + x⁵/5! - x⁷/7! + x⁹/9! - x¹¹/11!, Horner form
    let x2 = x * x;
    x * (1.0
        - x2 / 6.0
            * (1.0 - x2 / 20.0 * (1.0 - x2 / 42.0 * (1.0 - x2 / 72.0 * (1.0 - x2 / 110.0)))))
}

/// Round a non-negative level to the nearest integer, saturating at 0.
#[inline]
pub const fn round_level(v: f64) -> u16 {
    if v <= 0.0 {
        0
    } else {
        (v + 0.5) as u16
    }
}
