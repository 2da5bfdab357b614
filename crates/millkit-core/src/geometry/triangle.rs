use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::{BARYCENTRIC_EPSILON, PARAM_EPSILON, PLANE_EPSILON};

/// Crossing points closer than this are the same point (a vertex shared by two edges).
const DUPLICATE_EPSILON: f64 = 1e-9;

/// A straight 3D segment produced by intersecting a triangle with a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Segment {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// A closed range `[start, end]` along a scanline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Direction of a raster scanline in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanAxis {
    /// Rows parallel to X, one per Y value.
    #[default]
    X,
    /// Columns parallel to Y, one per X value.
    Y,
}

impl ScanAxis {
    /// Index of the coordinate held constant along a scanline.
    pub fn fixed_index(self) -> usize {
        match self {
            Self::X => 1,
            Self::Y => 0,
        }
    }

    /// Index of the coordinate that varies along a scanline.
    pub fn along_index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
        }
    }
}

impl std::fmt::Display for ScanAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Y => write!(f, "Y"),
        }
    }
}

/// A mesh triangle. The normal is not stored; see [`Triangle::normal`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Point3<f64>,
    pub b: Point3<f64>,
    pub c: Point3<f64>,
}

impl Triangle {
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { a, b, c }
    }

    pub fn vertices(&self) -> [Point3<f64>; 3] {
        [self.a, self.b, self.c]
    }

    /// Unnormalized face normal `(B - A) x (C - A)`.
    pub fn normal(&self) -> Vector3<f64> {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    /// Zero-area triangles are kept in meshes but never produce geometry.
    pub fn is_degenerate(&self) -> bool {
        self.normal().norm() < PLANE_EPSILON
    }

    pub fn is_finite(&self) -> bool {
        self.vertices().iter().all(is_finite_point)
    }

    /// Segment where the triangle crosses the horizontal plane `z = z0`.
    ///
    /// Returns `None` when the triangle lies entirely above or below the plane,
    /// or only touches it at a single point.
    pub fn intersect_plane_z(&self, z0: f64) -> Option<Segment> {
        let points = self.crossings(2, z0);
        if points.len() < 2 {
            return None;
        }
        Some(Segment::new(points[0], points[1]))
    }

    /// Sorted coordinates along `axis` where the triangle's edges cross the
    /// scanline at `value`.
    pub fn scanline_crossings(&self, axis: ScanAxis, value: f64) -> Vec<f64> {
        let along = axis.along_index();
        let mut coords: Vec<f64> = self
            .crossings(axis.fixed_index(), value)
            .iter()
            .map(|p| p[along])
            .collect();
        coords.sort_by(f64::total_cmp);
        coords.dedup_by(|a, b| (*a - *b).abs() < DUPLICATE_EPSILON);
        coords
    }

    /// Span of the scanline covered by this triangle, if it has positive length.
    pub fn scanline_span(&self, axis: ScanAxis, value: f64) -> Option<Interval> {
        let coords = self.scanline_crossings(axis, value);
        match (coords.first(), coords.last()) {
            (Some(&start), Some(&end)) if end - start > DUPLICATE_EPSILON => {
                Some(Interval::new(start, end))
            }
            _ => None,
        }
    }

    /// Height at which a vertical ray through `(x, y)` hits this triangle.
    pub fn sample_z_at_xy(&self, x: f64, y: f64) -> Option<f64> {
        let n = self.normal();
        if n.z.abs() < PLANE_EPSILON {
            return None;
        }

        let a = self.a;
        let z = a.z - (n.x * (x - a.x) + n.y * (y - a.y)) / n.z;
        if !z.is_finite() {
            return None;
        }

        let p = Point3::new(x, y, z);
        if self.contains_coplanar_point(&p, &n) {
            Some(z)
        } else {
            None
        }
    }

    /// Barycentric containment test for a point already on the triangle's plane.
    ///
    /// Projects onto the two axes orthogonal to the dominant normal component.
    fn contains_coplanar_point(&self, p: &Point3<f64>, n: &Vector3<f64>) -> bool {
        let (nx, ny, nz) = (n.x.abs(), n.y.abs(), n.z.abs());
        let (i, j) = if nx >= ny && nx >= nz {
            (1, 2)
        } else if ny >= nz {
            (0, 2)
        } else {
            (0, 1)
        };

        let (ax, ay) = (self.a[i], self.a[j]);
        let v0 = (self.c[i] - ax, self.c[j] - ay);
        let v1 = (self.b[i] - ax, self.b[j] - ay);
        let v2 = (p[i] - ax, p[j] - ay);

        let dot00 = v0.0 * v0.0 + v0.1 * v0.1;
        let dot01 = v0.0 * v1.0 + v0.1 * v1.1;
        let dot02 = v0.0 * v2.0 + v0.1 * v2.1;
        let dot11 = v1.0 * v1.0 + v1.1 * v1.1;
        let dot12 = v1.0 * v2.0 + v1.1 * v2.1;

        let denom = dot00 * dot11 - dot01 * dot01;
        if denom.abs() < PLANE_EPSILON {
            return false;
        }

        let u = (dot11 * dot02 - dot01 * dot12) / denom;
        let v = (dot00 * dot12 - dot01 * dot02) / denom;
        let w = 1.0 - u - v;

        u >= -BARYCENTRIC_EPSILON && v >= -BARYCENTRIC_EPSILON && w >= -BARYCENTRIC_EPSILON
    }

    /// Distinct edge crossings with the plane `p[axis] == value`.
    fn crossings(&self, axis: usize, value: f64) -> Vec<Point3<f64>> {
        let vertices = self.vertices();
        let deltas = vertices.map(|v| v[axis] - value);
        if deltas.iter().all(|d| *d > PLANE_EPSILON) || deltas.iter().all(|d| *d < -PLANE_EPSILON)
        {
            return Vec::new();
        }

        let mut points: Vec<Point3<f64>> = Vec::with_capacity(3);
        for i in 0..3 {
            let Some(p) = edge_crossing(&vertices[i], &vertices[(i + 1) % 3], axis, value) else {
                continue;
            };
            if points.iter().all(|q| (p - *q).norm() >= DUPLICATE_EPSILON) {
                points.push(p);
            }
        }
        points
    }
}

/// Point where the edge `v1 -> v2` crosses `p[axis] == value`.
fn edge_crossing(
    v1: &Point3<f64>,
    v2: &Point3<f64>,
    axis: usize,
    value: f64,
) -> Option<Point3<f64>> {
    let span = v2[axis] - v1[axis];
    if span.abs() < PLANE_EPSILON {
        return None;
    }

    let d1 = v1[axis] - value;
    let d2 = v2[axis] - value;
    if (d1 > 0.0 && d2 > 0.0) || (d1 < 0.0 && d2 < 0.0) {
        return None;
    }

    let t = (value - v1[axis]) / span;
    if !(-PARAM_EPSILON..=1.0 + PARAM_EPSILON).contains(&t) {
        return None;
    }

    let mut p = *v1 + (*v2 - *v1) * t;
    p[axis] = value;
    if is_finite_point(&p) {
        Some(p)
    } else {
        None
    }
}

fn is_finite_point(p: &Point3<f64>) -> bool {
    p.coords.iter().all(|c| c.is_finite())
}
