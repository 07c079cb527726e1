use rand::Rng;

/// Sign with no zero: collapses 0.0 to +1 so axis selection never stalls.
#[inline]
pub fn sign_nonzero(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

#[inline]
pub fn random_range(rng: &mut impl Rng, lo: f64, hi: f64) -> f64 {
    rng.gen_range(lo..=hi)
}
