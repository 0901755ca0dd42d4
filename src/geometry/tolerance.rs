// Centralized tolerances and helpers for robust geometry

pub const EPS_DENOM: f64 = 1e-10;         // denominator guard for intersection/ratios
pub const EPS_POS: f64 = 1e-9;            // point coincidence threshold (px)
pub const EPS_LEN: f64 = 1e-12;           // zero-length vector threshold

#[inline] pub fn near_zero(x: f64, eps: f64) -> bool { x.abs() <= eps }
#[inline] pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool { (a - b).abs() <= eps }
