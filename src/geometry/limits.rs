// Centralized ingestion limits to harden against untrusted documents

pub const MAX_STRANDS: usize = 100_000;
pub const MAX_DELETION_RECTS_PER_MASK: usize = 10_000;

// Numeric bounds
pub const COORD_MIN: f64 = -10_000_000.0;
pub const COORD_MAX: f64 = 10_000_000.0;
pub const WIDTH_MAX: f64 = 10_000.0;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool {
    x.is_finite() && (COORD_MIN..=COORD_MAX).contains(&x)
}

#[inline]
pub fn in_width_bounds(w: f64) -> bool {
    w.is_finite() && w > 0.0 && w <= WIDTH_MAX
}
