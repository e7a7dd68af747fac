use glam::DVec2;

/// Band around unit length inside which a vector counts as already
/// normalized and the sqrt is skipped. Tight enough that a rescaled velocity
/// stays within 1e-9 relative of the speed constant.
const UNIT_TOLERANCE: f64 = 1e-9;

/// Returns the unit vector along `v`, `v` itself when it is already unit
/// length, and zero for the zero vector.
pub fn normalize(v: DVec2) -> DVec2 {
    let mag_sq = v.length_squared();

    if (mag_sq - 1.).abs() <= UNIT_TOLERANCE {
        return v;
    }

    if mag_sq > 0. {
        v * (1. / mag_sq.sqrt())
    } else {
        DVec2::ZERO
    }
}

/// Normalize then stretch to `speed`. The zero vector stays zero, so a
/// degenerate blend stalls a boid for a tick instead of minting NaNs that
/// would corrupt its sector key.
pub fn rescale(v: DVec2, speed: f64) -> DVec2 {
    normalize(v) * speed
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::DVec2;

    use super::{normalize, rescale};

    macro_rules! assert_eqf64 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-12_f64)
        };
    }

    #[test]
    fn normalize_zero_stays_zero() {
        assert_eq!(normalize(DVec2::ZERO), DVec2::ZERO);
    }

    #[test]
    fn normalize_unit_vector_is_identity() {
        let v = DVec2::new(0.6, 0.8);
        // bit-for-bit, the sqrt must not run
        assert_eq!(normalize(v), v);
    }

    #[test]
    fn normalize_scales_to_unit_length() {
        let v = normalize(DVec2::new(3., -4.));
        assert_eqf64!(v.x, 0.6);
        assert_eqf64!(v.y, -0.8);
        assert_eqf64!(v.length(), 1.);
    }

    #[test]
    fn rescale_pins_magnitude() {
        let v = rescale(DVec2::new(-7., 2.5), 2.);
        assert_relative_eq!(v.length(), 2., max_relative = 1e-9);
    }

    #[test]
    fn rescale_zero_stays_zero() {
        assert_eq!(rescale(DVec2::ZERO, 3.), DVec2::ZERO);
    }
}
