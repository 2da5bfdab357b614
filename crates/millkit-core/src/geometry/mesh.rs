use nalgebra::{Point3, Vector3};
use tracing::trace;

use super::triangle::{Interval, ScanAxis, Segment, Triangle};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Grow the box to include `p`.
    pub fn include(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }
}

/// An immutable triangle soup.
///
/// Degenerate triangles are kept; every query skips what it cannot use.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounding box over all finite vertices, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb> {
        let mut vertices = self
            .triangles
            .iter()
            .filter(|t| t.is_finite())
            .flat_map(|t| t.vertices());

        let first = vertices.next()?;
        let mut bounds = Aabb {
            min: first,
            max: first,
        };
        for v in vertices {
            bounds.include(&v);
        }
        Some(bounds)
    }

    /// Raw, unordered segments where the mesh crosses `z = z0`.
    pub fn slice_at_z(&self, z0: f64) -> Vec<Segment> {
        let segments: Vec<Segment> = self
            .triangles
            .iter()
            .filter_map(|t| t.intersect_plane_z(z0))
            .collect();
        trace!("slice z={:.4}: {} segments", z0, segments.len());
        segments
    }

    /// Inside-material intervals along one scanline, sorted and disjoint.
    ///
    /// Every crossing triangle contributes the span between its own edge
    /// crossings; overlapping spans are merged. On a closed solid the top and
    /// bottom skins cover the same span, so the merge yields the material
    /// extent without depending on crossing parity.
    pub fn scanline_intervals(&self, axis: ScanAxis, value: f64) -> Vec<Interval> {
        let mut spans: Vec<Interval> = self
            .triangles
            .iter()
            .filter_map(|t| t.scanline_span(axis, value))
            .collect();
        spans.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut merged: Vec<Interval> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if span.start <= last.end + 1e-9 => {
                    last.end = last.end.max(span.end);
                }
                _ => merged.push(span),
            }
        }
        merged
    }

    /// Height of the topmost surface above `(x, y)`, if any triangle covers it.
    pub fn sample_top_z(&self, x: f64, y: f64) -> Option<f64> {
        self.triangles
            .iter()
            .filter_map(|t| t.sample_z_at_xy(x, y))
            .max_by(f64::total_cmp)
    }
}

impl From<Vec<Triangle>> for Mesh {
    fn from(triangles: Vec<Triangle>) -> Self {
        Self::new(triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    /// Two stacked horizontal squares, the upper one at z = 3.
    fn two_floors() -> Mesh {
        Mesh::new(vec![
            Triangle::new(p(0.0, 0.0, 1.0), p(2.0, 0.0, 1.0), p(2.0, 2.0, 1.0)),
            Triangle::new(p(0.0, 0.0, 1.0), p(2.0, 2.0, 1.0), p(0.0, 2.0, 1.0)),
            Triangle::new(p(0.0, 0.0, 3.0), p(2.0, 0.0, 3.0), p(2.0, 2.0, 3.0)),
            Triangle::new(p(0.0, 0.0, 3.0), p(2.0, 2.0, 3.0), p(0.0, 2.0, 3.0)),
        ])
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        let mesh = Mesh::default();
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_none());
        assert!(mesh.slice_at_z(0.0).is_empty());
        assert!(mesh.sample_top_z(0.0, 0.0).is_none());
    }

    #[test]
    fn test_bounds_skip_non_finite_triangles() {
        let mut triangles = two_floors().triangles().to_vec();
        triangles.push(Triangle::new(
            p(f64::NAN, 0.0, 0.0),
            p(100.0, 0.0, 0.0),
            p(0.0, 100.0, 0.0),
        ));
        let bounds = Mesh::new(triangles).bounds().unwrap();
        assert_eq!(bounds.min, p(0.0, 0.0, 1.0));
        assert_eq!(bounds.max, p(2.0, 2.0, 3.0));
        assert_eq!(bounds.size(), Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_highest_surface_wins() {
        let mesh = two_floors();
        assert_eq!(mesh.sample_top_z(0.5, 1.5), Some(3.0));
        assert!(mesh.sample_top_z(5.0, 5.0).is_none());
    }

    #[test]
    fn test_overlapping_spans_merge() {
        let mesh = two_floors();
        let intervals = mesh.scanline_intervals(ScanAxis::X, 1.0);
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].start - 0.0).abs() < 1e-9);
        assert!((intervals[0].end - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_spans_stay_separate() {
        let mesh = Mesh::new(vec![
            Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 2.0, 0.0)),
            Triangle::new(p(5.0, 0.0, 0.0), p(6.0, 0.0, 0.0), p(6.0, 2.0, 0.0)),
        ]);
        let intervals = mesh.scanline_intervals(ScanAxis::X, 1.0);
        assert_eq!(intervals.len(), 2);
        assert!(intervals[0].end < intervals[1].start);
    }
}
