use super::FuzzyOrd;
use static_aabb2d_index::IndexableNum;

/// Trait representing a real number that can be fuzzy compared, ordered and used as the
/// coordinate type of a spatial index.
pub trait Real:
    num_traits::real::Real
    + num_traits::Bounded
    + FuzzyOrd
    + std::default::Default
    + std::fmt::Debug
    + IndexableNum
    + 'static
{
    /// Convert an `f64` literal into this type (used for constants in generic code).
    #[inline]
    fn constant(value: f64) -> Self {
        <Self as num_traits::NumCast>::from(value).unwrap_or_else(Self::zero)
    }

    #[inline]
    fn pi() -> Self {
        Self::constant(std::f64::consts::PI)
    }

    #[inline]
    fn tau() -> Self {
        Self::constant(std::f64::consts::TAU)
    }

    #[inline]
    fn half_pi() -> Self {
        Self::constant(std::f64::consts::FRAC_PI_2)
    }

    #[inline]
    fn two() -> Self {
        Self::one() + Self::one()
    }

    #[inline]
    fn four() -> Self {
        Self::two() + Self::two()
    }

    /// Returns true if the value is neither NaN nor infinite.
    #[inline]
    fn is_finite(self) -> bool {
        self.abs() <= <Self as num_traits::Bounded>::max_value()
    }
}

impl Real for f32 {
    #[inline]
    fn constant(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn pi() -> Self {
        std::f32::consts::PI
    }

    #[inline]
    fn tau() -> Self {
        std::f32::consts::TAU
    }

    #[inline]
    fn half_pi() -> Self {
        std::f32::consts::FRAC_PI_2
    }

    #[inline]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }
}

impl Real for f64 {
    #[inline]
    fn constant(value: f64) -> Self {
        value
    }

    #[inline]
    fn pi() -> Self {
        std::f64::consts::PI
    }

    #[inline]
    fn tau() -> Self {
        std::f64::consts::TAU
    }

    #[inline]
    fn half_pi() -> Self {
        std::f64::consts::FRAC_PI_2
    }

    #[inline]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generic_is_finite<T: Real>(value: T) -> bool {
        value.is_finite()
    }

    #[test]
    fn finiteness_through_the_trait() {
        assert!(generic_is_finite(1.5f64));
        assert!(generic_is_finite(-2.0f32));
        assert!(!generic_is_finite(f64::NAN));
        assert!(!generic_is_finite(f64::NEG_INFINITY));
        assert!(!generic_is_finite(f32::INFINITY));
    }
}
