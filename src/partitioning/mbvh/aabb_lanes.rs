use crate::bounding_volume::Aabb;
use crate::math::{Lanes, Point, Real};

/// `N` AABBs represented as a single SoA AABB.
///
/// Lane `i` holds the box of the `i`-th child of a node. Keeping each coordinate in its
/// own lane vector lets traversal test a ray or a box against all children at once.
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Zeroable)]
#[repr(C)]
pub struct AabbLanes<const N: usize> {
    /// Min x coordinates of the `N` boxes.
    pub lower_x: Lanes<N>,
    /// Max x coordinates of the `N` boxes.
    pub upper_x: Lanes<N>,
    /// Min y coordinates of the `N` boxes.
    pub lower_y: Lanes<N>,
    /// Max y coordinates of the `N` boxes.
    pub upper_y: Lanes<N>,
    /// Min z coordinates of the `N` boxes.
    pub lower_z: Lanes<N>,
    /// Max z coordinates of the `N` boxes.
    pub upper_z: Lanes<N>,
}

impl<const N: usize> AabbLanes<N> {
    /// `N` empty boxes (`+inf` mins, `-inf` maxs).
    pub fn new_invalid() -> Self {
        Self::splat(&Aabb::new_invalid())
    }

    /// `N` copies of `aabb`.
    pub fn splat(aabb: &Aabb) -> Self {
        Self {
            lower_x: Lanes::repeat(aabb.mins.x),
            upper_x: Lanes::repeat(aabb.maxs.x),
            lower_y: Lanes::repeat(aabb.mins.y),
            upper_y: Lanes::repeat(aabb.maxs.y),
            lower_z: Lanes::repeat(aabb.mins.z),
            upper_z: Lanes::repeat(aabb.maxs.z),
        }
    }

    /// The box stored in lane `i`.
    #[inline]
    pub fn extract(&self, i: usize) -> Aabb {
        Aabb::new(
            Point::new(self.lower_x[i], self.lower_y[i], self.lower_z[i]),
            Point::new(self.upper_x[i], self.upper_y[i], self.upper_z[i]),
        )
    }

    /// Replace the box stored in lane `i` by `aabb`.
    #[inline]
    pub fn replace(&mut self, i: usize, aabb: &Aabb) {
        self.lower_x[i] = aabb.mins.x;
        self.upper_x[i] = aabb.maxs.x;
        self.lower_y[i] = aabb.mins.y;
        self.upper_y[i] = aabb.maxs.y;
        self.lower_z[i] = aabb.mins.z;
        self.upper_z[i] = aabb.maxs.z;
    }

    /// Lane-wise linear interpolation between `self` (at `t = 0`) and `end` (at `t = 1`).
    pub fn lerp(&self, end: &Self, t: Real) -> Self {
        Self {
            lower_x: self.lower_x.lerp(&end.lower_x, t),
            upper_x: self.upper_x.lerp(&end.upper_x, t),
            lower_y: self.lower_y.lerp(&end.lower_y, t),
            upper_y: self.upper_y.lerp(&end.upper_y, t),
            lower_z: self.lower_z.lerp(&end.lower_z, t),
            upper_z: self.upper_z.lerp(&end.upper_z, t),
        }
    }

    /// Lane-wise check of which boxes intersect `aabb`.
    ///
    /// Empty lanes never intersect anything.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> [bool; N] {
        core::array::from_fn(|i| {
            self.lower_x[i] <= aabb.maxs.x
                && aabb.mins.x <= self.upper_x[i]
                && self.lower_y[i] <= aabb.maxs.y
                && aabb.mins.y <= self.upper_y[i]
                && self.lower_z[i] <= aabb.maxs.z
                && aabb.mins.z <= self.upper_z[i]
        })
    }

    /// Lane-wise check of which boxes contain `point`.
    pub fn contains_local_point(&self, point: &Point<Real>) -> [bool; N] {
        self.intersects_aabb(&Aabb::new(*point, *point))
    }
}

#[cfg(test)]
mod test {
    use super::AabbLanes;
    use crate::bounding_volume::Aabb;
    use crate::math::{Point, Vector};

    #[test]
    fn replace_and_extract_lanes() {
        let mut lanes = AabbLanes::<4>::new_invalid();
        let aabb = Aabb::new(Point::new(1.0, 2.0, 3.0), Point::new(4.0, 5.0, 6.0));
        lanes.replace(2, &aabb);

        assert_eq!(lanes.extract(2), aabb);
        assert!(lanes.extract(0).is_empty());
        assert_eq!(
            lanes.contains_local_point(&Point::new(2.0, 3.0, 4.0)),
            [false, false, true, false]
        );
    }

    #[test]
    fn lanes_lerp_matches_aabb_lerp() {
        let a = Aabb::from_half_extents(Point::origin(), Vector::repeat(1.0));
        let b = Aabb::from_half_extents(Point::new(3.0, 2.0, 1.0), Vector::repeat(0.5));
        let mut start = AabbLanes::<8>::new_invalid();
        let mut end = AabbLanes::<8>::new_invalid();
        start.replace(5, &a);
        end.replace(5, &b);

        assert_eq!(start.lerp(&end, 0.25).extract(5), a.lerp(&b, 0.25));
        assert_eq!(
            start.lerp(&end, 0.5).intersects_aabb(&a.lerp(&b, 0.5)),
            [false, false, false, false, false, true, false, false]
        );
    }
}
