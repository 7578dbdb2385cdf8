use crate::math::Real;
use core::fmt;
use core::ops::Sub;
use na::RealField;

/// A closed interval `[self.0, self.1]`.
///
/// Used throughout this crate to describe time ranges: the portion of the unit
/// shutter interval `[0, 1]` during which a bound is valid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Interval<T>(pub T, pub T);

impl<T> Interval<T> {
    /// Create the interval `[min(a, b), max(a, b)]`.
    #[must_use]
    pub fn sort(a: T, b: T) -> Self
    where
        T: PartialOrd,
    {
        if a < b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// Create the interval `[e, e]` (single value).
    #[must_use]
    pub fn splat(e: T) -> Self
    where
        T: Clone,
    {
        Self(e.clone(), e)
    }

    /// Does this interval contain the given value?
    #[must_use]
    pub fn contains(&self, t: T) -> bool
    where
        T: PartialOrd<T>,
    {
        self.0 <= t && self.1 >= t
    }

    /// The width of this interval.
    #[must_use]
    pub fn width(self) -> T::Output
    where
        T: Sub<T>,
    {
        self.1 - self.0
    }

    /// The average of the two interval endpoints.
    #[must_use]
    pub fn midpoint(self) -> T
    where
        T: RealField + Copy,
    {
        let two: T = na::convert(2.0);
        (self.0 + self.1) / two
    }

    /// Computes a new interval that contains both `self` and `t`.
    #[must_use]
    pub fn enclose(self, t: T) -> Self
    where
        T: PartialOrd,
    {
        if t < self.0 {
            Interval(t, self.1)
        } else if t > self.1 {
            Interval(self.0, t)
        } else {
            self
        }
    }

    /// Computes the intersection between two intervals.
    ///
    /// Returns `None` if the intervals are disjoint.
    #[must_use]
    pub fn intersect(self, rhs: Self) -> Option<Self>
    where
        T: PartialOrd,
    {
        let lower = if self.0 >= rhs.0 { self.0 } else { rhs.0 };
        let upper = if self.1 <= rhs.1 { self.1 } else { rhs.1 };

        if lower > upper {
            None
        } else {
            Some(Interval(lower, upper))
        }
    }
}

impl Interval<Real> {
    /// The unit time interval `[0, 1]`.
    pub const UNIT: Self = Interval(0.0, 1.0);

    /// The empty time interval `[+inf, -inf]`.
    ///
    /// It contains no value and any intersection with it is empty.
    pub const EMPTY: Self = Interval(Real::INFINITY, Real::NEG_INFINITY);

    /// Is this exactly the unit interval `[0, 1]`?
    #[inline]
    pub fn is_unit(&self) -> bool {
        self.0 == 0.0 && self.1 == 1.0
    }

    /// Is `self.0 > self.1`?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 > self.1
    }

    /// Is this a non-empty sub-range of `[0, 1]`?
    #[inline]
    pub fn is_valid_time_range(&self) -> bool {
        0.0 <= self.0 && self.0 <= self.1 && self.1 <= 1.0
    }
}

impl<T: fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.0, self.1)
    }
}
