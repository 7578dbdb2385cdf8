use crate::bounding_volume::aabb::half_area_of_extents;
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Point, Real, DIM};
use crate::utils::Interval;
use approx::{AbsDiffEq, RelativeEq};
use core::fmt;

/// An AABB moving linearly through time.
///
/// The box at time `t` is `lerp(bounds0, bounds1, t)`. Whether `t` is measured over the
/// whole shutter interval or over a child's own time range depends on where the bound
/// comes from: builders produce bounds *local* to a time range, while nodes store them
/// *globally* over `[0, 1]` (see [`LinearAabb::global`]).
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct LinearAabb {
    /// The box at `t = 0`.
    pub bounds0: Aabb,
    /// The box at `t = 1`.
    pub bounds1: Aabb,
}

impl LinearAabb {
    /// A linear bound moving from `bounds0` to `bounds1`.
    #[inline]
    pub fn new(bounds0: Aabb, bounds1: Aabb) -> Self {
        Self { bounds0, bounds1 }
    }

    /// A linear bound that doesn’t move.
    #[inline]
    pub fn from_aabb(aabb: Aabb) -> Self {
        Self::new(aabb, aabb)
    }

    /// A linear bound empty at all times.
    #[inline]
    pub fn new_invalid() -> Self {
        Self::from_aabb(Aabb::new_invalid())
    }

    /// The box at time `t`.
    #[inline]
    pub fn interpolate(&self, t: Real) -> Aabb {
        self.bounds0.lerp(&self.bounds1, t)
    }

    /// The static box enclosing this bound at every time of `[0, 1]`.
    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds0.merged(&self.bounds1)
    }

    /// Are both endpoint boxes valid?
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.bounds0.is_valid() && self.bounds1.is_valid()
    }

    /// Re-expresses a bound local to the time range `dt` as a bound over `[0, 1]`.
    ///
    /// `self` maps `dt.0` to `bounds0` and `dt.1` to `bounds1`. The result is the same
    /// line, reparametrized so that it maps `0` and `1` to its endpoints:
    /// `result.interpolate(t) == self.interpolate((t - dt.0) / (dt.1 - dt.0))`.
    /// Outside of `dt` the result extrapolates the motion, so it is only meaningful
    /// together with `dt`.
    ///
    /// The result is widened by a rounding margin proportional to the extrapolation
    /// factor, so that it contains `self.interpolate(u)` for all `u` in `[0, 1]` when
    /// evaluated at `dt.0 + u * (dt.1 - dt.0)`.
    ///
    /// If `dt` is degenerate (zero width) there is no line to extend and the result
    /// is the static box enclosing both endpoints.
    pub fn global(&self, dt: Interval<Real>) -> Self {
        let width = dt.width();

        if width <= 0.0 {
            return Self::from_aabb(self.bounds());
        }

        if dt.is_unit() {
            return *self;
        }

        let u0 = -dt.0 / width;
        let u1 = (1.0 - dt.0) / width;
        let mut result = Self::new(self.interpolate(u0), self.interpolate(u1));

        if self.is_valid() {
            // Both the extrapolation and the evaluation at `t` round coordinates whose
            // magnitude grows with `max(|u0|, |u1|)`.
            let stretch = 1.0 + 2.0 * u0.abs().max(u1.abs());
            let magnitude = self
                .bounds0
                .mins
                .coords
                .abs()
                .sup(&self.bounds0.maxs.coords.abs())
                .sup(&self.bounds1.mins.coords.abs())
                .sup(&self.bounds1.maxs.coords.abs());
            let margin = magnitude * (8.0 * Real::EPSILON * stretch);

            for aabb in [&mut result.bounds0, &mut result.bounds1] {
                aabb.mins -= margin;
                aabb.maxs += margin;
            }
        }

        result
    }

    /// The expected half area of the box when `t` is sampled uniformly in `[0, 1]`.
    ///
    /// The extents vary linearly, so the half area is a quadratic in `t` and its mean
    /// has the closed form `(ha(d0) + ha(d1)) / 3 + cross(d0, d1) / 6`.
    pub fn expected_half_area(&self) -> Real {
        let d0 = self.bounds0.extents();
        let d1 = self.bounds1.extents();
        let cross = d0.x * d1.y + d1.x * d0.y + d0.y * d1.z + d1.y * d0.z + d0.z * d1.x
            + d1.z * d0.x;

        (half_area_of_extents(&d0) + half_area_of_extents(&d1)) / 3.0 + cross / 6.0
    }

    /// The expected half area of the box when `t` is sampled uniformly in `dt`.
    pub fn expected_half_area_in(&self, dt: Interval<Real>) -> Real {
        Self::new(self.interpolate(dt.0), self.interpolate(dt.1)).expected_half_area()
    }

    /// The sub-range of `[0, 1]` during which `self` and `other` overlap.
    ///
    /// Both bounds move linearly, so along each axis the overlap condition holds on a
    /// single interval; the result is the intersection of those intervals.
    pub fn overlap_time_range(&self, other: &Self) -> Option<Interval<Real>> {
        let mut range = Interval::UNIT;

        for i in 0..DIM {
            // self.mins <= other.maxs
            let below = non_positive_range(
                self.bounds0.mins[i] - other.bounds0.maxs[i],
                self.bounds1.mins[i] - other.bounds1.maxs[i],
            )?;
            // other.mins <= self.maxs
            let above = non_positive_range(
                other.bounds0.mins[i] - self.bounds0.maxs[i],
                other.bounds1.mins[i] - self.bounds1.maxs[i],
            )?;
            range = range.intersect(below)?.intersect(above)?;
        }

        Some(range)
    }
}

/// The sub-range of `[0, 1]` where `lerp(f0, f1, t) <= 0`.
fn non_positive_range(f0: Real, f1: Real) -> Option<Interval<Real>> {
    match (f0 <= 0.0, f1 <= 0.0) {
        (true, true) => Some(Interval::UNIT),
        (false, false) => None,
        (start, _) => {
            let t = (f0 / (f0 - f1)).clamp(0.0, 1.0);
            if start {
                Some(Interval(0.0, t))
            } else {
                Some(Interval(t, 1.0))
            }
        }
    }
}

impl BoundingVolume for LinearAabb {
    #[inline]
    fn center(&self) -> Point<Real> {
        self.interpolate(0.5).center()
    }

    #[inline]
    fn intersects(&self, other: &Self) -> bool {
        self.overlap_time_range(other).is_some()
    }

    /// Containment at both endpoints implies containment at all times in between.
    #[inline]
    fn contains(&self, other: &Self) -> bool {
        self.bounds0.contains(&other.bounds0) && self.bounds1.contains(&other.bounds1)
    }

    #[inline]
    fn merge(&mut self, other: &Self) {
        self.bounds0.merge(&other.bounds0);
        self.bounds1.merge(&other.bounds1);
    }

    #[inline]
    fn merged(&self, other: &Self) -> Self {
        Self::new(
            self.bounds0.merged(&other.bounds0),
            self.bounds1.merged(&other.bounds1),
        )
    }

    #[inline]
    fn loosen(&mut self, amount: Real) {
        self.bounds0.loosen(amount);
        self.bounds1.loosen(amount);
    }

    #[inline]
    fn loosened(&self, amount: Real) -> Self {
        Self::new(self.bounds0.loosened(amount), self.bounds1.loosened(amount))
    }
}

impl fmt::Display for LinearAabb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "LinearAabb {{ bounds0 = {}, bounds1 = {} }}",
            self.bounds0, self.bounds1
        )
    }
}

impl AbsDiffEq for LinearAabb {
    type Epsilon = Real;

    fn default_epsilon() -> Real {
        <Real as AbsDiffEq>::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Real) -> bool {
        self.bounds0.abs_diff_eq(&other.bounds0, epsilon)
            && self.bounds1.abs_diff_eq(&other.bounds1, epsilon)
    }
}

impl RelativeEq for LinearAabb {
    fn default_max_relative() -> Real {
        <Real as RelativeEq>::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Real, max_relative: Real) -> bool {
        self.bounds0.relative_eq(&other.bounds0, epsilon, max_relative)
            && self.bounds1.relative_eq(&other.bounds1, epsilon, max_relative)
    }
}

#[cfg(test)]
mod test {
    use super::LinearAabb;
    use crate::bounding_volume::{Aabb, BoundingVolume};
    use crate::math::{Point, Real, Vector};
    use crate::utils::Interval;
    use approx::assert_relative_eq;

    fn moving_box() -> LinearAabb {
        LinearAabb::new(
            Aabb::from_half_extents(Point::new(0.0, 1.0, 2.0), Vector::new(1.0, 0.5, 0.25)),
            Aabb::from_half_extents(Point::new(4.0, -1.0, 2.0), Vector::new(2.0, 1.5, 0.25)),
        )
    }

    #[test]
    fn global_bound_passes_through_local_endpoints() {
        let local = moving_box();

        for dt in [
            Interval(0.0 as Real, 0.5),
            Interval(0.25, 1.0),
            Interval(0.3, 0.7),
            Interval::UNIT,
        ] {
            let global = local.global(dt);
            assert_relative_eq!(global.interpolate(dt.0), local.bounds0, epsilon = 1.0e-4);
            assert_relative_eq!(global.interpolate(dt.1), local.bounds1, epsilon = 1.0e-4);
        }

        assert_relative_eq!(local.global(Interval::UNIT), local);
    }

    #[test]
    fn global_bound_contains_local_endpoints_over_narrow_ranges() {
        fn rand_point(rng: &mut oorandom::Rand32) -> Point<Real> {
            Point::from(Vector::from_fn(|_, _| rng.rand_float() as Real * 24.0 - 12.0))
        }

        let mut rng = oorandom::Rand32::new(1234);

        for _ in 0..2000 {
            let rand_aabb = |rng: &mut oorandom::Rand32| {
                let center = rand_point(rng);
                Aabb::from_points([center, center + Vector::repeat(0.01)])
            };
            let local = LinearAabb::new(rand_aabb(&mut rng), rand_aabb(&mut rng));
            let t0 = rng.rand_float() as Real * 0.99;
            let dt = Interval(t0, t0 + 0.01);

            let global = local.global(dt);
            assert!(global.interpolate(dt.0).contains(&local.bounds0));
            assert!(global.interpolate(dt.1).contains(&local.bounds1));
        }
    }

    #[test]
    fn global_bound_of_degenerate_range_is_static() {
        let local = moving_box();
        let global = local.global(Interval::splat(0.5));
        assert_eq!(global.bounds0, local.bounds());
        assert_eq!(global.bounds1, local.bounds());
    }

    #[test]
    fn expected_half_area_of_static_box() {
        let aabb = Aabb::from_half_extents(Point::origin(), Vector::new(1.0, 2.0, 3.0));
        let lbox = LinearAabb::from_aabb(aabb);
        assert_relative_eq!(lbox.expected_half_area(), aabb.half_area());
        assert_relative_eq!(
            lbox.expected_half_area_in(Interval(0.1, 0.3)),
            aabb.half_area(),
            max_relative = 1.0e-5
        );
    }

    #[test]
    fn expected_half_area_matches_simpson_rule() {
        // The half area is quadratic in `t`, so Simpson's rule is exact.
        let lbox = moving_box();
        let simpson = (lbox.interpolate(0.0).half_area()
            + 4.0 * lbox.interpolate(0.5).half_area()
            + lbox.interpolate(1.0).half_area())
            / 6.0;
        assert_relative_eq!(lbox.expected_half_area(), simpson, max_relative = 1.0e-5);

        let dt = Interval(0.25 as Real, 0.75);
        let simpson = (lbox.interpolate(0.25).half_area()
            + 4.0 * lbox.interpolate(0.5).half_area()
            + lbox.interpolate(0.75).half_area())
            / 6.0;
        assert_relative_eq!(lbox.expected_half_area_in(dt), simpson, max_relative = 1.0e-5);
    }

    #[test]
    fn moving_boxes_overlap_time_range() {
        // A unit box moving from x = -4 to x = 4 overlaps a static unit box at the origin
        // while its center is in [-2, 2], i.e., for t in [0.25, 0.75].
        let unit = Vector::repeat(1.0);
        let moving = LinearAabb::new(
            Aabb::from_half_extents(Point::new(-4.0, 0.0, 0.0), unit),
            Aabb::from_half_extents(Point::new(4.0, 0.0, 0.0), unit),
        );
        let fixed = LinearAabb::from_aabb(Aabb::from_half_extents(Point::origin(), unit));

        let range = moving.overlap_time_range(&fixed).unwrap();
        assert_relative_eq!(range.0, 0.25);
        assert_relative_eq!(range.1, 0.75);
        assert!(moving.intersects(&fixed));

        let far = LinearAabb::from_aabb(Aabb::from_half_extents(Point::new(0.0, 5.0, 0.0), unit));
        assert!(!moving.intersects(&far));
        assert!(moving.merged(&far).contains(&moving));
    }
}
