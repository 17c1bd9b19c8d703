//! 2D value types for road and building layout
//!
//! Points and segments are small `Copy` values; every operation returns a new
//! value instead of mutating its inputs.

use std::ops::{Add, Mul, Sub};

/// Denominators smaller than this are treated as parallel lines.
const PARALLEL_EPSILON: f64 = 1e-12;

/// A point (or vector) in the horizontal world plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians, counter-clockwise from +x).
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point2) -> f64 {
        (other - self).length()
    }

    /// Direction of this vector, `atan2(y, x)`.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// True if both coordinates lie in `[-half_extent, half_extent]`.
    pub fn within_square(self, half_extent: f64) -> bool {
        (-half_extent..=half_extent).contains(&self.x)
            && (-half_extent..=half_extent).contains(&self.y)
    }
}

impl Add for Point2 {
    type Output = Point2;

    fn add(self, other: Point2) -> Point2 {
        Point2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;

    fn sub(self, other: Point2) -> Point2 {
        Point2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point2 {
    type Output = Point2;

    fn mul(self, factor: f64) -> Point2 {
        Point2::new(self.x * factor, self.y * factor)
    }
}

/// A straight road piece from `start` to `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Point2,
    pub end: Point2,
}

/// Where two segments cross, with the parameter along each of them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub point: Point2,
    /// Position along the first segment (0 at start, 1 at end)
    pub t_a: f64,
    /// Position along the second segment
    pub t_b: f64,
}

impl Segment {
    pub const fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Segment of `length` starting at `start` heading along `angle`.
    pub fn from_polar(start: Point2, angle: f64, length: f64) -> Self {
        Self::new(start, start + Point2::from_angle(angle) * length)
    }

    pub fn delta(&self) -> Point2 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn angle(&self) -> f64 {
        self.delta().angle()
    }

    /// Point at parameter `t` along the segment.
    pub fn point_at(&self, t: f64) -> Point2 {
        self.start + self.delta() * t
    }

    /// Same start, new end.
    pub fn with_end(&self, end: Point2) -> Self {
        Self::new(self.start, end)
    }

    /// Intersect two segments using the parametric line-line formula.
    ///
    /// Only crossings strictly inside both segments count: each parameter must
    /// lie in `(epsilon, 1 - epsilon)`, so touching a tip is not a crossing.
    /// Parallel and collinear segments never intersect.
    pub fn intersect(&self, other: &Segment, epsilon: f64) -> Option<Intersection> {
        let (x1, y1) = (self.start.x, self.start.y);
        let (x2, y2) = (self.end.x, self.end.y);
        let (x3, y3) = (other.start.x, other.start.y);
        let (x4, y4) = (other.end.x, other.end.y);

        let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t_a = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
        let t_b = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denom;

        let inside = |t: f64| t > epsilon && t < 1.0 - epsilon;
        if inside(t_a) && inside(t_b) {
            Some(Intersection {
                point: self.point_at(t_a),
                t_a,
                t_b,
            })
        } else {
            None
        }
    }
}

/// Linear interpolation from `min` to `max` by `amount`.
pub fn lerp(min: f64, max: f64, amount: f64) -> f64 {
    min + amount * (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EP: f64 = 1e-4;

    #[test]
    fn test_crossing_segments_meet_in_middle() {
        let a = Segment::new(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        let b = Segment::new(Point2::new(1.0, -1.0), Point2::new(1.0, 1.0));

        let hit = a.intersect(&b, EP).expect("segments cross");
        assert!((hit.point.x - 1.0).abs() < 1e-12);
        assert!(hit.point.y.abs() < 1e-12);
        assert!((hit.t_a - 0.5).abs() < 1e-12);
        assert!((hit.t_b - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_segments_do_not_intersect() {
        let a = Segment::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        let b = Segment::new(Point2::new(2.0, -1.0), Point2::new(2.0, 1.0));
        assert!(a.intersect(&b, EP).is_none());
    }

    #[test]
    fn test_parallel_and_collinear_segments_are_ignored() {
        let a = Segment::new(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        let parallel = Segment::new(Point2::new(0.0, 1.0), Point2::new(2.0, 1.0));
        let collinear = Segment::new(Point2::new(1.0, 0.0), Point2::new(3.0, 0.0));
        assert!(a.intersect(&parallel, EP).is_none());
        assert!(a.intersect(&collinear, EP).is_none());
    }

    #[test]
    fn test_touching_a_tip_is_not_a_crossing() {
        // b starts exactly on a's interior; t_b == 0
        let a = Segment::new(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        let b = Segment::new(Point2::new(1.0, 0.0), Point2::new(1.0, 1.0));
        assert!(a.intersect(&b, EP).is_none());

        // a ends exactly on b; t_a == 1
        let a = Segment::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        let b = Segment::new(Point2::new(1.0, -1.0), Point2::new(1.0, 1.0));
        assert!(a.intersect(&b, EP).is_none());
    }

    #[test]
    fn test_polar_segment_and_angle() {
        let seg = Segment::from_polar(Point2::new(1.0, 1.0), std::f64::consts::FRAC_PI_2, 2.0);
        assert!((seg.end.x - 1.0).abs() < 1e-12);
        assert!((seg.end.y - 3.0).abs() < 1e-12);
        assert!((seg.length() - 2.0).abs() < 1e-12);
        assert!((seg.angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_within_square_is_inclusive() {
        assert!(Point2::new(5.0, -5.0).within_square(5.0));
        assert!(!Point2::new(10.0, 0.0).within_square(5.0));
        assert!(!Point2::new(0.0, -5.01).within_square(5.0));
    }

    #[test]
    fn test_lerp_endpoints() {
        assert!((lerp(0.2, 3.0, 0.0) - 0.2).abs() < 1e-12);
        assert!((lerp(0.2, 3.0, 1.0) - 3.0).abs() < 1e-12);
        assert!((lerp(0.0, 2.0, 0.25) - 0.5).abs() < 1e-12);
    }
}
