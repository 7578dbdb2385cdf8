use crate::math::{Point, Real};

/// Trait of bounding volumes.
///
/// Implemented both by static boxes and by boxes moving linearly through the shutter
/// interval. Two bounding volumes of the same kind can always be merged into a bigger
/// one that encloses both.
pub trait BoundingVolume {
    /// A point inside of this bounding volume, ideally its center.
    ///
    /// For moving volumes this is the center at the middle of the time interval.
    fn center(&self) -> Point<Real>;

    /// Checks if this bounding volume intersect with another one.
    fn intersects(&self, _: &Self) -> bool;

    /// Checks if this bounding volume contains another one.
    fn contains(&self, _: &Self) -> bool;

    /// Merges this bounding volume with another one. The merge is done in-place.
    fn merge(&mut self, _: &Self);

    /// Merges this bounding volume with another one.
    fn merged(&self, _: &Self) -> Self;

    /// Enlarges this bounding volume by `amount` on every side.
    fn loosen(&mut self, amount: Real);

    /// Creates a new, enlarged version, of this bounding volume.
    fn loosened(&self, amount: Real) -> Self;
}
