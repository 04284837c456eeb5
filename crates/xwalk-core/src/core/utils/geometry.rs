use nalgebra::{Point3, Vector3};

/// Two coordinates closer than this are considered coincident (Ångström).
pub const COORD_TOLERANCE: f64 = 1.0e-4;

/// Axis-aligned bounding box over a set of points in Ångström space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Computes the bounding box of an iterator of points.
    ///
    /// # Return
    ///
    /// Returns `None` if the iterator yields no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = *first;
        let mut max = *first;
        for p in iter {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some(Self { min, max })
    }

    /// Returns a new box with every face pushed outward by `margin`.
    pub fn expanded(&self, margin: f64) -> Self {
        let m = Vector3::new(margin, margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Returns the intersection of two boxes, or `None` if they do not overlap.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = self.min.sup(&other.min);
        let max = self.max.inf(&other.max);
        if min.x < max.x && min.y < max.y && min.z < max.z {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// Extent of the box along each axis.
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// The largest of the three axis extents.
    pub fn max_dimension(&self) -> f64 {
        let e = self.extent();
        e.x.max(e.y).max(e.z)
    }

    /// Whether `point` lies inside the box (inclusive of faces).
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.y >= self.min.y
            && point.z >= self.min.z
            && point.x <= self.max.x
            && point.y <= self.max.y
            && point.z <= self.max.z
    }
}

/// Whether two points agree within [`COORD_TOLERANCE`] on every coordinate.
pub fn points_coincide(a: &Point3<f64>, b: &Point3<f64>) -> bool {
    (a.x - b.x).abs() <= COORD_TOLERANCE
        && (a.y - b.y).abs() <= COORD_TOLERANCE
        && (a.z - b.z).abs() <= COORD_TOLERANCE
}
