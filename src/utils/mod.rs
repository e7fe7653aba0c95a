/// Maps any angular difference in degrees into `(-180, 180]`.
///
/// An exact half turn always comes out as `+180`, so a target directly
/// behind the vehicle is reached by turning in the positive direction.
pub fn wrap_degrees(angle: f64) -> f64 {
    // fmod keeps the sign of `angle`, leaving a value in (-360, 360)
    let rem = libm::fmod(angle, 360.0);
    if rem > 180.0 {
        rem - 360.0
    } else if rem <= -180.0 {
        rem + 360.0
    } else {
        rem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_into_half_open_range() {
        let mut x = -2000.0;
        while x <= 2000.0 {
            let w = wrap_degrees(x);
            assert!(w > -180.0 && w <= 180.0, "wrap({x}) = {w}");
            x += 7.3;
        }
    }

    #[test]
    fn half_turn_wraps_positive() {
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert_eq!(wrap_degrees(540.0), 180.0);
        assert_eq!(wrap_degrees(-540.0), 180.0);
    }

    #[test]
    fn shortest_path() {
        assert_eq!(wrap_degrees(350.0), -10.0);
        assert_eq!(wrap_degrees(-350.0), 10.0);
        assert_eq!(wrap_degrees(90.0), 90.0);
        assert_eq!(wrap_degrees(720.0), 0.0);
    }
}
