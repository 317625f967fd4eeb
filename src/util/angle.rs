//! Angle normalization in degrees.
//!
//! Headings and bearings from the host are never trusted to be in range;
//! everything passes through one of these before it is used.

/// Normalize to a relative angle in (-180, 180].
pub fn normalize_relative(angle: f64) -> f64 {
    let a = normalize_absolute(angle);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}

/// Normalize to an absolute heading in [0, 360).
pub fn normalize_absolute(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Unit vector (cos, sin) for a heading in degrees.
pub fn to_unit_vector(degrees: f64) -> (f64, f64) {
    let rad = degrees.to_radians();
    (rad.cos(), rad.sin())
}

/// Heading in [0, 360) of the vector (x, y).
pub fn vector_heading(x: f64, y: f64) -> f64 {
    normalize_absolute(y.atan2(x).to_degrees())
}

/// `value / max` clamped to [0, 1]; zero for a non-positive max or non-finite input.
pub fn clamp_ratio(value: f64, max: f64) -> f64 {
    if !(max > 0.0) || !value.is_finite() {
        return 0.0;
    }
    (value / max).clamp(0.0, 1.0)
}
