use std::f64::consts::PI;

pub const TWOPI: f64 = 2. * PI;

/// Significant digits of numbers written to ASCII tables.
pub const DEFAULT_PRECISION: usize = 12;
